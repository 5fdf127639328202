//! Sample records and their identifiers

mod id;
mod sample;

pub use id::{InvalidSampleId, SampleId};
pub use sample::{Sample, ID_FIELD, TAGS_FIELD};
