//! View Seam Tests
//!
//! Tests for the Dataset / QueryService contract with a scripted backend:
//! - Request-level service failures reach every read unchanged
//! - Lookups return the dataset's canonical record, not the pipeline document
//! - Unexpected result shapes are reported as malformed

use sampleview::pipeline::Stage;
use sampleview::store::{Document, DocumentCursor, StoreErrorCode, StoreResult};
use sampleview::{Dataset, QueryService, Sample, SampleId, StoreError, ViewError, ViewResult};
use serde_json::{json, Value};
use std::sync::Mutex;

// =============================================================================
// Helper Types
// =============================================================================

/// Backend that answers every request with the same response and records
/// the pipelines it was sent.
struct Scripted {
    response: Result<Vec<Value>, StoreError>,
    canonical: Option<Sample>,
    requests: Mutex<Vec<Vec<Stage>>>,
}

impl Scripted {
    fn answering(documents: Vec<Value>) -> Self {
        Self {
            response: Ok(documents),
            canonical: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing(error: StoreError) -> Self {
        Self {
            response: Err(error),
            canonical: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn with_canonical(mut self, sample: Sample) -> Self {
        self.canonical = Some(sample);
        self
    }

    fn requests(&self) -> Vec<Vec<Stage>> {
        self.requests.lock().unwrap().clone()
    }
}

impl QueryService for Scripted {
    fn aggregate<'a>(&'a self, pipeline: &[Stage]) -> StoreResult<DocumentCursor<'a>> {
        self.requests.lock().unwrap().push(pipeline.to_vec());
        match &self.response {
            Ok(documents) => Ok(Box::new(documents.clone().into_iter().map(Ok))),
            Err(e) => Err(e.clone()),
        }
    }
}

impl Dataset for Scripted {
    type Sample = Sample;

    fn name(&self) -> &str {
        "scripted"
    }

    fn query_service(&self) -> &dyn QueryService {
        self
    }

    fn sample_from_document(&self, document: Document) -> ViewResult<Sample> {
        Ok(Sample::from_document(document)?)
    }

    fn get_by_id(&self, id: &SampleId) -> ViewResult<Sample> {
        self.canonical
            .clone()
            .filter(|sample| sample.id == *id)
            .ok_or(ViewError::NotFound(*id))
    }
}

fn assert_unavailable(err: ViewError) {
    assert_eq!(err.code(), "STORE_UNAVAILABLE");
    assert!(err.to_string().contains("connection reset"));
    match err {
        ViewError::Store(inner) => {
            assert_eq!(inner.code(), StoreErrorCode::StoreUnavailable);
            assert_eq!(inner.message(), "connection reset");
        }
        other => panic!("expected a store error, got {:?}", other),
    }
}

// =============================================================================
// Request Failure Tests
// =============================================================================

/// A failed aggregate request surfaces from every read as the same error.
#[test]
fn test_request_failure_reaches_every_read() {
    let dataset = Scripted::failing(StoreError::unavailable("connection reset"));
    let view = dataset.view().filter_tag("a");
    let id = SampleId::new().to_canonical();

    assert_unavailable(view.execute(&[]).err().unwrap());
    assert_unavailable(view.count().unwrap_err());
    assert_unavailable(view.distinct_tags().unwrap_err());
    assert_unavailable(view.iter_samples().err().unwrap());
    assert_unavailable(view.iter_samples_with_index().err().unwrap());
    assert_unavailable(view.lookup_by_id(&id).unwrap_err());
    assert_unavailable(view.summary().unwrap_err());
}

/// Chain calls never reach the backend.
#[test]
fn test_building_sends_no_requests() {
    let dataset = Scripted::failing(StoreError::unavailable("connection reset"));
    let view = dataset.view().filter_tag("a").sort_by("filepath", false).offset(2);

    assert_eq!(view.stages().len(), 3);
    assert!(dataset.requests().is_empty());
}

// =============================================================================
// Lookup Tests
// =============================================================================

/// Membership comes from the pipeline; the returned record from get_by_id.
#[test]
fn test_lookup_returns_canonical_record() {
    let id = SampleId::new();
    let dataset = Scripted::answering(vec![json!({
        "_id": id.to_canonical(),
        "filepath": "from-pipeline",
    })])
    .with_canonical(Sample::with_id(id, "canonical"));

    let view = dataset.view().filter_tag("a");
    let sample = view.lookup_by_id(&id.to_canonical()).unwrap();
    assert_eq!(sample.filepath, "canonical");

    assert_eq!(
        dataset.requests(),
        vec![vec![Stage::match_tag("a"), Stage::match_id(id), Stage::Limit(1)]]
    );
}

/// An empty membership query is a miss even if the dataset holds the id.
#[test]
fn test_lookup_miss_skips_dataset_lookup() {
    let id = SampleId::new();
    let dataset = Scripted::answering(Vec::new()).with_canonical(Sample::with_id(id, "canonical"));

    let err = dataset.view().get(&id).unwrap_err();
    assert!(matches!(err, ViewError::NotFound(missing) if missing == id));
}

/// Iteration materializes the pipeline documents themselves.
#[test]
fn test_iteration_uses_pipeline_documents() {
    let id = SampleId::new();
    let dataset = Scripted::answering(vec![json!({
        "_id": id.to_canonical(),
        "filepath": "from-pipeline",
    })])
    .with_canonical(Sample::with_id(id, "canonical"));

    let samples: Vec<Sample> = dataset
        .view()
        .iter_samples()
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].filepath, "from-pipeline");
}

// =============================================================================
// Result Shape Tests
// =============================================================================

#[test]
fn test_count_with_non_numeric_count() {
    let dataset = Scripted::answering(vec![json!({"count": "x"})]);

    let err = dataset.view().count().unwrap_err();
    assert!(matches!(err, ViewError::MalformedResult(_)));
    assert_eq!(err.code(), "VIEW_MALFORMED_RESULT");

    assert_eq!(
        dataset.requests(),
        vec![vec![Stage::count("count")]]
    );
}

#[test]
fn test_count_without_result_document_is_zero() {
    let dataset = Scripted::answering(Vec::new());
    assert_eq!(dataset.view().offset(4).count().unwrap(), 0);
}

#[test]
fn test_undecodable_document_fails_item() {
    let dataset = Scripted::answering(vec![json!({"_id": "not-a-uuid", "filepath": "x"})]);

    let mut samples = dataset.view().iter_samples_with_index().unwrap();
    let err = samples.next().unwrap().unwrap_err();
    assert_eq!(err.code(), "VIEW_DESERIALIZE_FAILED");
    assert_eq!(samples.next_index(), 0);
    assert!(samples.next().is_none());
}
