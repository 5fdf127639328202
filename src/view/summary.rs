//! Human-readable view summary

use std::collections::BTreeSet;
use std::fmt::{self, Write};

use super::errors::{ViewError, ViewResult};
use super::view::View;
use crate::dataset::Dataset;
use crate::observability::{log_event_with_fields, Event};

impl<'a, D: Dataset> View<'a, D> {
    /// Multi-line description of the view.
    ///
    /// Counts and tags are recomputed on every call.
    pub fn summary(&self) -> ViewResult<String> {
        let count = self.count()?;
        let tags = self.distinct_tags()?;

        let mut out = String::new();
        // Formatting into a String only fails if a Display impl does
        self.render(&mut out, count, &tags)
            .map_err(|_| ViewError::MalformedResult("summary formatting failed".into()))?;

        let num_stages = self.stages.len().to_string();
        log_event_with_fields(
            Event::ViewSummary,
            &[("dataset", self.dataset.name()), ("stages", num_stages.as_str())],
        );
        Ok(out)
    }

    fn render(&self, out: &mut impl Write, count: u64, tags: &BTreeSet<String>) -> fmt::Result {
        let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
        writeln!(out, "Dataset:        {}", self.dataset.name())?;
        writeln!(out, "Num samples:    {}", count)?;
        writeln!(out, "Tags:           [{}]", tags.join(", "))?;
        write!(out, "Pipeline stages:")?;
        if self.stages.is_empty() {
            write!(out, "\n    (none)")?;
        }
        for (i, stage) in self.stages.iter().enumerate() {
            write!(out, "\n    {}. {}", i + 1, stage)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dataset::{Dataset, MemoryDataset};
    use crate::sample::Sample;

    #[test]
    fn test_summary_of_full_dataset() {
        let samples = vec![
            Sample::new("/a.jpg").with_tag("train"),
            Sample::new("/b.jpg").with_tag("val"),
        ];
        let dataset = MemoryDataset::from_samples("quickstart", samples).unwrap();
        let summary = dataset.view().summary().unwrap();

        assert_eq!(
            summary,
            "Dataset:        quickstart\n\
             Num samples:    2\n\
             Tags:           [train, val]\n\
             Pipeline stages:\n    \
             (none)"
        );
    }

    #[test]
    fn test_summary_lists_stages() {
        let dataset = MemoryDataset::from_samples("d", vec![Sample::new("/a.jpg")]).unwrap();
        let summary = dataset.view().offset(1).take(5, false).summary().unwrap();

        assert!(summary.contains("Num samples:    0"));
        assert!(summary.contains("Tags:           []"));
        assert!(summary.contains("    1. {\"$skip\":1}"));
        assert!(summary.contains("    2. {\"$limit\":5}"));
    }
}
