//! Query service subsystem for sampleview
//!
//! The document store is consumed through [`QueryService`]: a staged
//! pipeline goes in, a lazy cursor of documents comes out.
//!
//! [`MemoryStore`] is the in-process backend. It evaluates the full stage
//! vocabulary over JSON documents.

mod errors;
mod filters;
mod memory;
mod service;
mod sorter;

pub use errors::{StoreError, StoreErrorCode, StoreResult};
pub use filters::{resolve_path, MatchFilter};
pub use memory::MemoryStore;
pub use service::{Document, DocumentCursor, QueryService};
pub use sorter::DocumentSorter;
