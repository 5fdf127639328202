//! View error types
//!
//! Error codes:
//! - VIEW_NOT_FOUND
//! - VIEW_UNIMPLEMENTED
//! - VIEW_INVALID_ARGUMENT
//! - VIEW_MALFORMED_RESULT
//! - VIEW_DESERIALIZE_FAILED
//!
//! Query service failures are carried unchanged in `ViewError::Store`.

use thiserror::Error;

use crate::sample::{InvalidSampleId, SampleId};
use crate::store::StoreError;

/// Result type for view operations
pub type ViewResult<T> = Result<T, ViewError>;

/// View errors
#[derive(Debug, Error)]
pub enum ViewError {
    /// Lookup by id matched nothing in the view
    #[error("No sample found with ID '{0}'")]
    NotFound(SampleId),

    /// Selector reserved for schema-aware filtering
    #[error("Filtering by {0} is not yet implemented")]
    Unimplemented(&'static str),

    /// Arguments that cannot be turned into a stage
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Query service answered with an unexpected document shape
    #[error("Malformed result: {0}")]
    MalformedResult(String),

    /// Sample constructor rejected a result document
    #[error("Failed to deserialize sample: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// Failure raised by the query service
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ViewError {
    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ViewError::NotFound(_) => "VIEW_NOT_FOUND",
            ViewError::Unimplemented(_) => "VIEW_UNIMPLEMENTED",
            ViewError::InvalidArgument(_) => "VIEW_INVALID_ARGUMENT",
            ViewError::MalformedResult(_) => "VIEW_MALFORMED_RESULT",
            ViewError::Deserialize(_) => "VIEW_DESERIALIZE_FAILED",
            ViewError::Store(e) => e.code().code(),
        }
    }

    /// Returns true for a lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, ViewError::NotFound(_))
    }
}

impl From<InvalidSampleId> for ViewError {
    fn from(e: InvalidSampleId) -> Self {
        ViewError::InvalidArgument(e.to_string())
    }
}
