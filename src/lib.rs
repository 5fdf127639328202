//! sampleview - Lazily evaluated, chainable views over sample collections
//!
//! A view is an ordered list of query-pipeline stages over an immutable
//! dataset. Building a view never touches the store; reads compile the
//! stages and hand them to the dataset's query service.

pub mod config;
pub mod dataset;
pub mod observability;
pub mod pipeline;
pub mod sample;
pub mod store;
pub mod view;

pub use config::{Config, ConfigError};
pub use dataset::{Dataset, MemoryDataset};
pub use pipeline::{MatchExpr, SortOrder, Stage};
pub use sample::{Sample, SampleId};
pub use store::{MemoryStore, QueryService, StoreError};
pub use view::{View, ViewError, ViewFilter, ViewResult};
