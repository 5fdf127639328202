//! Sample iteration

use std::fmt;

use super::errors::ViewResult;
use super::view::View;
use crate::dataset::Dataset;
use crate::store::DocumentCursor;

/// Samples of a view, materialized one document at a time
pub struct Samples<'a, D: Dataset> {
    dataset: &'a D,
    cursor: DocumentCursor<'a>,
}

impl<'a, D: Dataset> Iterator for Samples<'a, D> {
    type Item = ViewResult<D::Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        let document = match self.cursor.next()? {
            Ok(document) => document,
            Err(e) => return Some(Err(e.into())),
        };
        Some(self.dataset.sample_from_document(document))
    }
}

impl<'a, D: Dataset> fmt::Debug for Samples<'a, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Samples")
            .field("dataset", &self.dataset.name())
            .finish_non_exhaustive()
    }
}

/// Samples paired with their absolute position in the dataset ordering.
///
/// Positions start at the view's latest offset. Failed items do not
/// consume a position.
pub struct IndexedSamples<'a, D: Dataset> {
    samples: Samples<'a, D>,
    next_index: usize,
}

impl<'a, D: Dataset> IndexedSamples<'a, D> {
    /// Position the next sample will be given
    pub fn next_index(&self) -> usize {
        self.next_index
    }
}

impl<'a, D: Dataset> Iterator for IndexedSamples<'a, D> {
    type Item = ViewResult<(usize, D::Sample)>;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = match self.samples.next()? {
            Ok(sample) => sample,
            Err(e) => return Some(Err(e)),
        };
        let index = self.next_index;
        self.next_index += 1;
        Some(Ok((index, sample)))
    }
}

impl<'a, D: Dataset> View<'a, D> {
    /// Lazily materialized samples of the view
    pub fn iter_samples(&self) -> ViewResult<Samples<'a, D>> {
        Ok(Samples {
            dataset: self.dataset,
            cursor: self.execute(&[])?,
        })
    }

    /// Like [`View::iter_samples`], with absolute indices
    pub fn iter_samples_with_index(&self) -> ViewResult<IndexedSamples<'a, D>> {
        Ok(IndexedSamples {
            samples: self.iter_samples()?,
            next_index: self.latest_offset(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::dataset::{Dataset, MemoryDataset};
    use crate::sample::Sample;
    use serde_json::json;

    fn numbered(n: usize) -> MemoryDataset {
        let samples = (0..n).map(|i| Sample::new(format!("/data/{:02}.jpg", i)).with_field("n", json!(i)));
        MemoryDataset::from_samples("numbered", samples).unwrap()
    }

    #[test]
    fn test_iter_samples_in_order() {
        let dataset = numbered(4);
        let paths: Vec<String> = dataset
            .view()
            .iter_samples()
            .unwrap()
            .map(|s| s.unwrap().filepath)
            .collect();
        assert_eq!(
            paths,
            vec!["/data/00.jpg", "/data/01.jpg", "/data/02.jpg", "/data/03.jpg"]
        );
    }

    #[test]
    fn test_indices_start_at_offset() {
        let dataset = numbered(10);
        let indexed: Vec<(usize, String)> = dataset
            .view()
            .offset(3)
            .take(2, false)
            .iter_samples_with_index()
            .unwrap()
            .map(|item| {
                let (i, s) = item.unwrap();
                (i, s.filepath)
            })
            .collect();
        assert_eq!(
            indexed,
            vec![(3, "/data/03.jpg".to_string()), (4, "/data/04.jpg".to_string())]
        );
    }

    #[test]
    fn test_indices_without_offset() {
        let dataset = numbered(3);
        let indices: Vec<usize> = dataset
            .view()
            .iter_samples_with_index()
            .unwrap()
            .map(|item| item.unwrap().0)
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_store_error_surfaces_as_item() {
        let dataset = numbered(2);
        let mut samples = dataset
            .view()
            .filter_expr(json!({"n": {"$near": 1}}))
            .iter_samples_with_index()
            .unwrap();
        let err = samples.next().unwrap().unwrap_err();
        assert_eq!(err.code(), "STORE_MALFORMED_STAGE");
        assert_eq!(samples.next_index(), 0);
    }

    #[test]
    fn test_zero_take_yields_nothing() {
        let dataset = numbered(5);
        assert_eq!(dataset.view().take(0, false).iter_samples().unwrap().count(), 0);
        assert_eq!(dataset.view().take(0, true).iter_samples().unwrap().count(), 0);
    }
}
