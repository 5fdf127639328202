//! Translation of typed stages to the aggregation dialect
//!
//! This is the only place where pipeline stages become loosely-typed
//! query documents.

use serde_json::{json, Map, Value};

use crate::sample::{SampleId, ID_FIELD, TAGS_FIELD};

use super::stage::{Accumulator, GroupSpec, MatchExpr, Stage};

/// Compiles a pipeline into dialect documents, preserving stage order
pub fn compile(stages: &[Stage]) -> Vec<Value> {
    stages.iter().map(stage_document).collect()
}

/// Compiles a pipeline into a single JSON array
pub fn compile_to_value(stages: &[Stage]) -> Value {
    Value::Array(compile(stages))
}

pub(crate) fn stage_document(stage: &Stage) -> Value {
    match stage {
        Stage::Match(expr) => json!({ "$match": match_document(expr) }),
        Stage::Sort { field, order } => {
            let mut spec = Map::new();
            spec.insert(field.clone(), json!(order.as_i32()));
            json!({ "$sort": spec })
        }
        Stage::Skip(n) => json!({ "$skip": n }),
        Stage::Limit(n) => json!({ "$limit": n }),
        Stage::Sample { size } => json!({ "$sample": { "size": size } }),
        Stage::Project(fields) => {
            let mut spec = Map::new();
            for p in fields {
                spec.insert(p.name.clone(), Value::String(field_ref(&p.source)));
            }
            json!({ "$project": spec })
        }
        Stage::Unwind(path) => json!({ "$unwind": field_ref(path) }),
        Stage::Group(spec) => json!({ "$group": group_document(spec) }),
        Stage::Count(field) => json!({ "$count": field }),
    }
}

fn match_document(expr: &MatchExpr) -> Value {
    match expr {
        MatchExpr::Tag(tag) => json!({ TAGS_FIELD: tag }),
        MatchExpr::IdEq(id) => json!({ ID_FIELD: id.to_canonical() }),
        MatchExpr::IdIn(ids) => json!({ ID_FIELD: { "$in": id_array(ids) } }),
        MatchExpr::IdNotIn(ids) => {
            json!({ ID_FIELD: { "$not": { "$in": id_array(ids) } } })
        }
        MatchExpr::Raw(value) => value.clone(),
    }
}

fn group_document(spec: &GroupSpec) -> Value {
    let mut doc = Map::new();
    let key = match &spec.key {
        Some(field) => Value::String(field_ref(field)),
        None => Value::Null,
    };
    doc.insert(ID_FIELD.to_string(), key);
    for (name, acc) in &spec.accumulators {
        let operand = match acc {
            Accumulator::AddToSet(field) | Accumulator::Sum(field) => {
                Value::String(field_ref(field))
            }
            Accumulator::Count => json!(1),
        };
        let mut op = Map::new();
        op.insert(format!("${}", acc.op_name()), operand);
        doc.insert(name.clone(), Value::Object(op));
    }
    Value::Object(doc)
}

fn id_array<'a>(ids: impl IntoIterator<Item = &'a SampleId>) -> Vec<Value> {
    ids.into_iter()
        .map(|id| Value::String(id.to_canonical()))
        .collect()
}

fn field_ref(path: &str) -> String {
    format!("${}", path)
}
