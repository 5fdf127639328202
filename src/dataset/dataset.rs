//! Dataset trait

use crate::sample::SampleId;
use crate::store::{Document, QueryService};
use crate::view::{View, ViewResult};

/// The backing collection a view reads from.
///
/// A dataset owns the handle to its query service and knows how to turn
/// result documents into samples.
pub trait Dataset {
    /// Type the dataset materializes documents into
    type Sample;

    /// Dataset name, for logs and summaries
    fn name(&self) -> &str;

    /// Handle to the service that evaluates pipelines for this dataset
    fn query_service(&self) -> &dyn QueryService;

    /// Sample constructor for raw result documents
    fn sample_from_document(&self, document: Document) -> ViewResult<Self::Sample>;

    /// Canonical single-item lookup. Misses are `ViewError::NotFound`.
    fn get_by_id(&self, id: &SampleId) -> ViewResult<Self::Sample>;

    /// A view over the whole dataset with an empty pipeline
    fn view(&self) -> View<'_, Self>
    where
        Self: Sized,
    {
        View::new(self)
    }
}
