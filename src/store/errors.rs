//! Query service error types
//!
//! Error codes:
//! - STORE_MALFORMED_STAGE (ERROR)
//! - STORE_DUPLICATE_ID (ERROR)
//! - STORE_INVALID_DOCUMENT (ERROR)
//! - STORE_UNAVAILABLE (ERROR)
//!
//! Views never reinterpret these; they reach the caller unchanged.

use std::fmt;

/// Query service error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// A stage or match expression the service cannot evaluate
    StoreMalformedStage,
    /// Insert of an identifier that already exists
    StoreDuplicateId,
    /// Insert of a document without a usable `_id`
    StoreInvalidDocument,
    /// Backend could not be reached or refused the request
    StoreUnavailable,
}

impl StoreErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::StoreMalformedStage => "STORE_MALFORMED_STAGE",
            StoreErrorCode::StoreDuplicateId => "STORE_DUPLICATE_ID",
            StoreErrorCode::StoreInvalidDocument => "STORE_INVALID_DOCUMENT",
            StoreErrorCode::StoreUnavailable => "STORE_UNAVAILABLE",
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query service error with context
#[derive(Debug, Clone)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
    /// Stage kind the error arose in, if any
    stage: Option<&'static str>,
}

impl StoreError {
    /// Create a malformed stage error
    pub fn malformed_stage(stage: &'static str, reason: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::StoreMalformedStage,
            message: reason.into(),
            stage: Some(stage),
        }
    }

    /// Create a duplicate identifier error
    pub fn duplicate_id(id: impl fmt::Display) -> Self {
        Self {
            code: StoreErrorCode::StoreDuplicateId,
            message: format!("Sample '{}' already exists", id),
            stage: None,
        }
    }

    /// Create an invalid document error
    pub fn invalid_document(reason: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::StoreInvalidDocument,
            message: reason.into(),
            stage: None,
        }
    }

    /// Create an unavailable error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::StoreUnavailable,
            message: reason.into(),
            stage: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the stage kind if applicable
    pub fn stage(&self) -> Option<&'static str> {
        self.stage
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: ", self.code.code())?;
        if let Some(stage) = self.stage {
            write!(f, "${} ", stage)?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StoreError {}

/// Result type for query service operations
pub type StoreResult<T> = Result<T, StoreError>;
