//! Query service boundary
//!
//! A query service accepts a staged pipeline and returns a lazy cursor over
//! the matching documents. Cursors are finite and single-pass; reading
//! again means issuing the request again.

use serde_json::Value;

use crate::pipeline::Stage;

use super::errors::StoreResult;

/// A raw result document
pub type Document = Value;

/// Lazy, single-pass sequence of result documents.
///
/// Items are fallible: a service may fail mid-stream.
pub type DocumentCursor<'a> = Box<dyn Iterator<Item = StoreResult<Document>> + 'a>;

/// Trait for backends that evaluate aggregation pipelines
pub trait QueryService {
    /// Submit `pipeline` and return a cursor over its results.
    ///
    /// Errors returned here concern the request as a whole; errors found
    /// while streaming surface from the cursor.
    fn aggregate<'a>(&'a self, pipeline: &[Stage]) -> StoreResult<DocumentCursor<'a>>;
}
