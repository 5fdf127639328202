//! Dataset collaborators
//!
//! A [`Dataset`] supplies the query service and sample constructor that
//! views read through. [`MemoryDataset`] is the in-memory implementation.

mod dataset;
mod memory;

pub use dataset::Dataset;
pub use memory::MemoryDataset;
