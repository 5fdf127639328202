//! View structure and pipeline builder
//!
//! Every chain method borrows the receiver immutably and returns a new
//! view whose stages are the receiver's stages plus the new ones.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;

use super::errors::{ViewError, ViewResult};
use crate::dataset::Dataset;
use crate::observability::{log_event_with_fields, Event};
use crate::pipeline::{MatchExpr, SortOrder, Stage};
use crate::sample::SampleId;

/// Selectors accepted by [`View::filter`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewFilter {
    /// Keep samples carrying this tag
    pub tag: Option<String>,
    /// Reserved
    pub insight_group: Option<String>,
    /// Reserved
    pub label_group: Option<String>,
    /// Raw match document
    pub expr: Option<Value>,
}

impl ViewFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_expr(mut self, expr: Value) -> Self {
        self.expr = Some(expr);
        self
    }

    pub fn with_insight_group(mut self, group: impl Into<String>) -> Self {
        self.insight_group = Some(group.into());
        self
    }

    pub fn with_label_group(mut self, group: impl Into<String>) -> Self {
        self.label_group = Some(group.into());
        self
    }

    fn unsupported_selector(&self) -> Option<&'static str> {
        if self.insight_group.is_some() {
            Some("insight group")
        } else if self.label_group.is_some() {
            Some("label group")
        } else {
            None
        }
    }
}

/// A read-only, lazily evaluated pipeline over a dataset
pub struct View<'a, D: Dataset> {
    pub(super) dataset: &'a D,
    pub(super) stages: Vec<Stage>,
}

impl<'a, D: Dataset> View<'a, D> {
    /// A view of the whole dataset
    pub fn new(dataset: &'a D) -> Self {
        Self {
            dataset,
            stages: Vec::new(),
        }
    }

    pub fn dataset(&self) -> &'a D {
        self.dataset
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// New view with `stage` appended
    pub fn derive(&self, stage: Stage) -> Self {
        let mut stages = self.stages.clone();
        stages.push(stage);
        Self {
            dataset: self.dataset,
            stages,
        }
    }

    /// Skip amount of the most recent skip stage, or 0.
    ///
    /// Earlier skips still affect results but do not move the baseline.
    pub fn latest_offset(&self) -> usize {
        self.stages
            .iter()
            .rev()
            .find_map(Stage::as_skip)
            .unwrap_or(0)
    }

    /// Appends a tag match then a raw match, for whichever is set
    pub fn filter(&self, filter: ViewFilter) -> ViewResult<Self> {
        if let Some(selector) = filter.unsupported_selector() {
            log_event_with_fields(Event::ViewRejected, &[("selector", selector)]);
            return Err(ViewError::Unimplemented(selector));
        }

        let mut stages = self.stages.clone();
        if let Some(tag) = filter.tag {
            stages.push(Stage::match_tag(tag));
        }
        if let Some(expr) = filter.expr {
            stages.push(Stage::match_raw(expr));
        }
        Ok(Self {
            dataset: self.dataset,
            stages,
        })
    }

    pub fn filter_tag(&self, tag: impl Into<String>) -> Self {
        self.derive(Stage::match_tag(tag))
    }

    pub fn filter_expr(&self, expr: Value) -> Self {
        self.derive(Stage::match_raw(expr))
    }

    /// Sorted by `field`, ascending unless `reverse`
    pub fn sort_by(&self, field: impl Into<String>, reverse: bool) -> Self {
        self.derive(Stage::sort(field, SortOrder::from_reverse(reverse)))
    }

    /// At most `size` samples; a uniform random subset when `random`
    pub fn take(&self, size: usize, random: bool) -> Self {
        if random {
            self.derive(Stage::Sample { size })
        } else {
            self.derive(Stage::Limit(size))
        }
    }

    /// Skips the first `n` samples
    pub fn offset(&self, n: usize) -> Self {
        self.derive(Stage::Skip(n))
    }

    /// Only the samples with the given IDs. Duplicates are ignored.
    pub fn select<I, S>(&self, ids: I) -> ViewResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.select_ids(parse_ids(ids)?))
    }

    /// All samples except those with the given IDs
    pub fn exclude<I, S>(&self, ids: I) -> ViewResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.exclude_ids(parse_ids(ids)?))
    }

    pub fn select_ids(&self, ids: impl IntoIterator<Item = SampleId>) -> Self {
        self.derive(Stage::Match(MatchExpr::IdIn(ids.into_iter().collect())))
    }

    pub fn exclude_ids(&self, ids: impl IntoIterator<Item = SampleId>) -> Self {
        self.derive(Stage::Match(MatchExpr::IdNotIn(ids.into_iter().collect())))
    }
}

fn parse_ids<I, S>(ids: I) -> ViewResult<BTreeSet<SampleId>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter()
        .map(|id| SampleId::parse(id.as_ref()).map_err(ViewError::from))
        .collect()
}

impl<'a, D: Dataset> Clone for View<'a, D> {
    fn clone(&self) -> Self {
        Self {
            dataset: self.dataset,
            stages: self.stages.clone(),
        }
    }
}

impl<'a, D: Dataset> fmt::Debug for View<'a, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("dataset", &self.dataset.name())
            .field("stages", &self.stages)
            .finish()
    }
}
