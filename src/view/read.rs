//! Terminal reads
//!
//! Nothing touches the query service until one of these is called.

use std::collections::BTreeSet;

use serde_json::Value;

use super::errors::{ViewError, ViewResult};
use super::view::View;
use crate::dataset::Dataset;
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::pipeline::{self, Accumulator, GroupSpec, Projection, Stage};
use crate::sample::{SampleId, TAGS_FIELD};
use crate::store::DocumentCursor;

const COUNT_FIELD: &str = "count";
const ALL_TAGS_FIELD: &str = "all_tags";

impl<'a, D: Dataset> View<'a, D> {
    /// Runs the view's stages followed by `extra_stages`.
    ///
    /// The returned cursor is lazy and single-pass; store errors surface
    /// either here or as cursor items.
    pub fn execute(&self, extra_stages: &[Stage]) -> ViewResult<DocumentCursor<'a>> {
        let mut stages = self.stages.clone();
        stages.extend_from_slice(extra_stages);

        if Logger::enabled_for(Severity::Trace) {
            let dataset = self.dataset.name();
            let compiled = pipeline::compile_to_value(&stages).to_string();
            log_event_with_fields(
                Event::ViewExecute,
                &[("dataset", dataset), ("pipeline", compiled.as_str())],
            );
        }

        let dataset: &'a D = self.dataset;
        Ok(dataset.query_service().aggregate(&stages)?)
    }

    /// Number of samples in the view
    pub fn count(&self) -> ViewResult<u64> {
        let mut cursor = self.execute(&[Stage::count(COUNT_FIELD)])?;
        let count = match cursor.next().transpose()? {
            None => 0,
            Some(doc) => doc
                .get(COUNT_FIELD)
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    ViewError::MalformedResult(format!("expected numeric '{}' in {}", COUNT_FIELD, doc))
                })?,
        };

        let count_str = count.to_string();
        log_event_with_fields(
            Event::ViewCount,
            &[("dataset", self.dataset.name()), ("count", count_str.as_str())],
        );
        Ok(count)
    }

    /// The sample with the given ID, if it is part of this view
    pub fn lookup_by_id(&self, id: &str) -> ViewResult<D::Sample> {
        let id = SampleId::parse(id)?;
        self.get(&id)
    }

    /// Typed form of [`View::lookup_by_id`]
    pub fn get(&self, id: &SampleId) -> ViewResult<D::Sample> {
        let mut cursor = self.execute(&[Stage::match_id(*id), Stage::Limit(1)])?;
        if cursor.next().transpose()?.is_none() {
            let id_str = id.to_canonical();
            log_event_with_fields(
                Event::ViewLookupMiss,
                &[("dataset", self.dataset.name()), ("id", id_str.as_str())],
            );
            return Err(ViewError::NotFound(*id));
        }
        self.dataset.get_by_id(id)
    }

    /// Union of the tags of every sample in the view
    pub fn distinct_tags(&self) -> ViewResult<BTreeSet<String>> {
        let stages = [
            Stage::Project(vec![Projection::field(TAGS_FIELD)]),
            Stage::Unwind(TAGS_FIELD.to_string()),
            Stage::Group(
                GroupSpec::all().with(ALL_TAGS_FIELD, Accumulator::AddToSet(TAGS_FIELD.to_string())),
            ),
        ];
        let mut cursor = self.execute(&stages)?;

        let tags = match cursor.next().transpose()? {
            None => BTreeSet::new(),
            Some(doc) => parse_tags(&doc)?,
        };

        let num_tags = tags.len().to_string();
        log_event_with_fields(
            Event::ViewDistinctTags,
            &[("dataset", self.dataset.name()), ("num_tags", num_tags.as_str())],
        );
        Ok(tags)
    }

    /// Aggregation-dialect form of the view's stages
    pub fn pipeline_documents(&self) -> Vec<Value> {
        pipeline::compile(&self.stages)
    }
}

fn parse_tags(doc: &Value) -> ViewResult<BTreeSet<String>> {
    let malformed = || {
        ViewError::MalformedResult(format!("expected string array '{}' in {}", ALL_TAGS_FIELD, doc))
    };
    let values = doc
        .get(ALL_TAGS_FIELD)
        .and_then(Value::as_array)
        .ok_or_else(malformed)?;
    values
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(malformed))
        .collect()
}
