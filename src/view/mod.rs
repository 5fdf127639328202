//! Views
//!
//! A [`View`] is an ordered list of pipeline stages over a [`Dataset`].
//! Chain methods build new views; reads (`count`, `iter_samples`,
//! `lookup_by_id`, `distinct_tags`, `summary`) send the pipeline to the
//! dataset's query service.
//!
//! [`Dataset`]: crate::dataset::Dataset
//!
//! ```ignore
//! let dataset = MemoryDataset::from_samples("quickstart", samples)?;
//! let page = dataset.view().filter_tag("validation").sort_by("filepath", false).offset(20).take(10, false);
//! for item in page.iter_samples_with_index()? {
//!     let (index, sample) = item?;
//! }
//! ```

mod errors;
mod iter;
mod read;
mod summary;
mod view;

pub use errors::{ViewError, ViewResult};
pub use iter::{IndexedSamples, Samples};
pub use view::{View, ViewFilter};
