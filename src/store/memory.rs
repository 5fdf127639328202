//! In-memory query service
//!
//! Holds documents in insertion order and evaluates pipelines over them.
//!
//! Execution model:
//! - match, skip, limit, project, unwind are lazy cursor adapters
//! - sort, sample, group, count buffer their whole input
//! - a blocking stage stops at the first upstream error and yields it

use std::collections::HashMap;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde_json::{json, Map, Value};

use super::errors::{StoreError, StoreResult};
use super::filters::{resolve_path, MatchFilter};
use super::service::{Document, DocumentCursor, QueryService};
use super::sorter::DocumentSorter;
use crate::observability::{log_event_with_fields, Event};
use crate::pipeline::{Accumulator, GroupSpec, Projection, Stage};
use crate::sample::{SampleId, ID_FIELD};

/// In-memory document collection implementing [`QueryService`]
pub struct MemoryStore {
    documents: Vec<Document>,
    by_id: HashMap<SampleId, usize>,
    rng: Mutex<StdRng>,
}

impl MemoryStore {
    /// Creates an empty store with an entropy-seeded sampler
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates an empty store whose `$sample` draws are reproducible
    pub fn with_sample_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            documents: Vec::new(),
            by_id: HashMap::new(),
            rng: Mutex::new(rng),
        }
    }

    /// Appends a document. Its `_id` must be a valid, unused sample ID;
    /// the stored `_id` is rewritten to canonical form.
    pub fn insert(&mut self, document: Document) -> StoreResult<SampleId> {
        let mut fields = match document {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::invalid_document(format!(
                    "expected a document, got {}",
                    other
                )))
            }
        };

        let id = match fields.get(ID_FIELD) {
            Some(Value::String(raw)) => SampleId::parse(raw)
                .map_err(|e| StoreError::invalid_document(e.to_string()))?,
            _ => return Err(StoreError::invalid_document("missing string '_id'")),
        };
        if self.by_id.contains_key(&id) {
            return Err(StoreError::duplicate_id(id));
        }

        fields.insert(ID_FIELD.to_string(), Value::String(id.to_canonical()));
        self.by_id.insert(id, self.documents.len());
        self.documents.push(Value::Object(fields));

        let canonical = id.to_canonical();
        log_event_with_fields(Event::StoreInsert, &[("id", canonical.as_str())]);
        Ok(id)
    }

    /// Direct lookup by identifier
    pub fn get(&self, id: &SampleId) -> Option<&Document> {
        self.by_id.get(id).map(|&i| &self.documents[i])
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents are stored
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Stored documents in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    fn apply<'a>(&'a self, stage: Stage, input: DocumentCursor<'a>) -> DocumentCursor<'a> {
        match stage {
            Stage::Match(expr) => Box::new(input.filter_map(move |item| match item {
                Ok(doc) => match MatchFilter::matches(&doc, &expr) {
                    Ok(true) => Some(Ok(doc)),
                    Ok(false) => None,
                    Err(e) => Some(Err(e)),
                },
                Err(e) => Some(Err(e)),
            })),
            Stage::Skip(n) => {
                let mut remaining = n;
                Box::new(input.filter(move |item| {
                    if item.is_ok() && remaining > 0 {
                        remaining -= 1;
                        false
                    } else {
                        true
                    }
                }))
            }
            Stage::Limit(n) => {
                let mut input = input;
                let mut remaining = n;
                Box::new(std::iter::from_fn(move || {
                    if remaining == 0 {
                        return None;
                    }
                    let item = input.next()?;
                    if item.is_ok() {
                        remaining -= 1;
                    }
                    Some(item)
                }))
            }
            Stage::Project(fields) => {
                Box::new(input.map(move |item| item.map(|doc| project(&doc, &fields))))
            }
            Stage::Unwind(path) => Box::new(input.flat_map(move |item| match item {
                Ok(doc) => unwind(doc, &path).into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(e)],
            })),
            Stage::Sort { field, order } => blocking(input, move |mut docs| {
                DocumentSorter::sort(&mut docs, &field, order);
                docs
            }),
            Stage::Sample { size } => blocking(input, move |docs| self.sample(docs, size)),
            Stage::Group(spec) => blocking(input, move |docs| group(docs, &spec)),
            Stage::Count(field) => blocking(input, move |docs| {
                if docs.is_empty() {
                    return Vec::new();
                }
                let mut out = Map::new();
                out.insert(field.clone(), json!(docs.len()));
                vec![Value::Object(out)]
            }),
        }
    }

    /// Uniform sample without replacement, in random order
    fn sample(&self, docs: Vec<Document>, size: usize) -> Vec<Document> {
        let amount = size.min(docs.len());
        let picked = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            index::sample(&mut *rng, docs.len(), amount)
        };
        let mut slots: Vec<Option<Document>> = docs.into_iter().map(Some).collect();
        picked
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryService for MemoryStore {
    fn aggregate<'a>(&'a self, pipeline: &[Stage]) -> StoreResult<DocumentCursor<'a>> {
        let documents = self.documents.len().to_string();
        let stages = pipeline.len().to_string();
        log_event_with_fields(
            Event::StoreAggregate,
            &[("documents", documents.as_str()), ("stages", stages.as_str())],
        );

        let mut cursor: DocumentCursor<'a> = Box::new(self.documents.iter().cloned().map(Ok));
        for stage in pipeline {
            cursor = self.apply(stage.clone(), cursor);
        }
        Ok(cursor)
    }
}

/// Buffers the whole input, then transforms it.
///
/// The first upstream error becomes the only item.
fn blocking<'a, F>(input: DocumentCursor<'a>, transform: F) -> DocumentCursor<'a>
where
    F: FnOnce(Vec<Document>) -> Vec<Document> + 'a,
{
    let mut pending = Some((input, transform));
    let mut output: Option<std::vec::IntoIter<Document>> = None;
    Box::new(std::iter::from_fn(move || {
        if let Some((input, transform)) = pending.take() {
            match input.collect::<StoreResult<Vec<_>>>() {
                Ok(docs) => output = Some(transform(docs).into_iter()),
                Err(e) => return Some(Err(e)),
            }
        }
        output.as_mut()?.next().map(Ok)
    }))
}

/// `$project`: keeps `_id` plus the listed fields; missing sources are
/// omitted
fn project(doc: &Document, fields: &[Projection]) -> Document {
    let mut out = Map::new();
    if let Some(id) = doc.get(ID_FIELD) {
        out.insert(ID_FIELD.to_string(), id.clone());
    }
    for p in fields {
        if let Some(value) = resolve_path(doc, &p.source) {
            out.insert(p.name.clone(), value.clone());
        }
    }
    Value::Object(out)
}

/// `$unwind`: one document per array element. Missing, null and empty
/// arrays produce nothing; other values pass through.
fn unwind(doc: Document, path: &str) -> Vec<Document> {
    let items = match resolve_path(&doc, path) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => return vec![doc],
    };
    items
        .into_iter()
        .map(|item| {
            let mut copy = doc.clone();
            set_path(&mut copy, path, item);
            copy
        })
        .collect()
}

fn set_path(doc: &mut Value, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = match segments.pop() {
        Some(last) => last,
        None => return,
    };
    let mut current = doc;
    for segment in segments {
        current = match current.get_mut(segment) {
            Some(next) => next,
            None => return,
        };
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }
}

enum AccState {
    Set(Vec<Value>),
    Sum { int: i64, float: f64, is_float: bool },
    Count(u64),
}

impl AccState {
    fn new(acc: &Accumulator) -> Self {
        match acc {
            Accumulator::AddToSet(_) => AccState::Set(Vec::new()),
            Accumulator::Sum(_) => AccState::Sum {
                int: 0,
                float: 0.0,
                is_float: false,
            },
            Accumulator::Count => AccState::Count(0),
        }
    }

    fn feed(&mut self, acc: &Accumulator, doc: &Document) {
        match (self, acc) {
            (AccState::Set(values), Accumulator::AddToSet(field)) => {
                if let Some(v) = resolve_path(doc, field) {
                    if !values.contains(v) {
                        values.push(v.clone());
                    }
                }
            }
            (AccState::Sum { int, float, is_float }, Accumulator::Sum(field)) => {
                if let Some(Value::Number(n)) = resolve_path(doc, field) {
                    match n.as_i64() {
                        Some(i) if !*is_float => match int.checked_add(i) {
                            Some(total) => *int = total,
                            None => {
                                *is_float = true;
                                *float = *int as f64 + i as f64;
                            }
                        },
                        _ => {
                            if !*is_float {
                                *is_float = true;
                                *float = *int as f64;
                            }
                            *float += n.as_f64().unwrap_or(0.0);
                        }
                    }
                }
            }
            (AccState::Count(n), Accumulator::Count) => *n += 1,
            _ => {}
        }
    }

    fn finish(self) -> Value {
        match self {
            AccState::Set(values) => Value::Array(values),
            AccState::Sum { int, float, is_float } => {
                if is_float {
                    json!(float)
                } else {
                    json!(int)
                }
            }
            AccState::Count(n) => json!(n),
        }
    }
}

/// `$group`: groups appear in first-seen key order. Empty input yields
/// no groups.
fn group(docs: Vec<Document>, spec: &GroupSpec) -> Vec<Document> {
    let mut groups: Vec<(Value, Vec<AccState>)> = Vec::new();

    for doc in &docs {
        let key = match &spec.key {
            Some(field) => resolve_path(doc, field).cloned().unwrap_or(Value::Null),
            None => Value::Null,
        };
        let slot = match groups.iter().position(|(k, _)| *k == key) {
            Some(i) => i,
            None => {
                let states = spec.accumulators.iter().map(|(_, a)| AccState::new(a)).collect();
                groups.push((key, states));
                groups.len() - 1
            }
        };
        for (state, (_, acc)) in groups[slot].1.iter_mut().zip(&spec.accumulators) {
            state.feed(acc, doc);
        }
    }

    groups
        .into_iter()
        .map(|(key, states)| {
            let mut out = Map::new();
            out.insert(ID_FIELD.to_string(), key);
            for (state, (name, _)) in states.into_iter().zip(&spec.accumulators) {
                out.insert(name.clone(), state.finish());
            }
            Value::Object(out)
        })
        .collect()
}
