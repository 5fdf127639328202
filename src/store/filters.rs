//! Match evaluation for the memory backend
//!
//! Typed match expressions are evaluated directly. Raw query documents
//! support a fixed operator subset; anything else fails loudly with
//! STORE_MALFORMED_STAGE when the stage is evaluated.
//!
//! Comparison is type-strict: `"123"` never equals `123`, but integers and
//! floats compare numerically.

use std::cmp::Ordering;

use regex::RegexBuilder;
use serde_json::{Map, Value};

use super::errors::{StoreError, StoreResult};
use super::sorter::DocumentSorter;
use crate::pipeline::MatchExpr;
use crate::sample::{SampleId, ID_FIELD, TAGS_FIELD};

/// Resolves a dotted field path (`metadata.size_bytes`, `frame_size.0`)
pub fn resolve_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Evaluates match expressions against documents
pub struct MatchFilter;

impl MatchFilter {
    /// Checks if a document satisfies a match expression
    pub fn matches(document: &Value, expr: &MatchExpr) -> StoreResult<bool> {
        Ok(match expr {
            MatchExpr::Tag(tag) => {
                Self::value_eq(resolve_path(document, TAGS_FIELD), &Value::String(tag.clone()))
            }
            MatchExpr::IdEq(id) => Self::document_id(document) == Some(*id),
            MatchExpr::IdIn(ids) => Self::document_id(document).map_or(false, |id| ids.contains(&id)),
            MatchExpr::IdNotIn(ids) => {
                Self::document_id(document).map_or(true, |id| !ids.contains(&id))
            }
            MatchExpr::Raw(query) => Self::matches_query(document, query)?,
        })
    }

    /// Checks if a document satisfies a raw query document
    pub fn matches_query(document: &Value, query: &Value) -> StoreResult<bool> {
        let clauses = match query {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::malformed_stage(
                    "match",
                    format!("query must be a document, got {}", other),
                ))
            }
        };

        // All clauses must match (AND semantics)
        for (key, condition) in clauses {
            let matched = match key.as_str() {
                "$and" => Self::all_of(document, condition)?,
                "$or" => Self::any_of(document, condition)?,
                "$nor" => !Self::any_of(document, condition)?,
                op if op.starts_with('$') => {
                    return Err(StoreError::malformed_stage(
                        "match",
                        format!("unknown top-level operator '{}'", op),
                    ))
                }
                path => Self::matches_condition(resolve_path(document, path), condition)?,
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn document_id(document: &Value) -> Option<SampleId> {
        document
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| SampleId::parse(s).ok())
    }

    fn subqueries<'q>(operator: &str, condition: &'q Value) -> StoreResult<&'q Vec<Value>> {
        match condition {
            Value::Array(items) if !items.is_empty() => Ok(items),
            _ => Err(StoreError::malformed_stage(
                "match",
                format!("'{}' needs a non-empty array of documents", operator),
            )),
        }
    }

    fn all_of(document: &Value, condition: &Value) -> StoreResult<bool> {
        for query in Self::subqueries("$and", condition)? {
            if !Self::matches_query(document, query)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn any_of(document: &Value, condition: &Value) -> StoreResult<bool> {
        for query in Self::subqueries("$or", condition)? {
            if Self::matches_query(document, query)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn is_operator_document(condition: &Value) -> Option<&Map<String, Value>> {
        match condition {
            Value::Object(map) if !map.is_empty() && map.keys().all(|k| k.starts_with('$')) => {
                Some(map)
            }
            _ => None,
        }
    }

    /// Evaluates one field condition: either an operator document or an
    /// implicit equality
    fn matches_condition(actual: Option<&Value>, condition: &Value) -> StoreResult<bool> {
        let operators = match Self::is_operator_document(condition) {
            Some(ops) => ops,
            None => return Ok(Self::value_eq(actual, condition)),
        };

        for (op, operand) in operators {
            let matched = match op.as_str() {
                "$eq" => Self::value_eq(actual, operand),
                "$ne" => !Self::value_eq(actual, operand),
                "$gt" => Self::compare_any(actual, operand, |o| o == Ordering::Greater),
                "$gte" => Self::compare_any(actual, operand, |o| o != Ordering::Less),
                "$lt" => Self::compare_any(actual, operand, |o| o == Ordering::Less),
                "$lte" => Self::compare_any(actual, operand, |o| o != Ordering::Greater),
                "$in" => Self::in_list(actual, operand)?,
                "$nin" => !Self::in_list(actual, operand)?,
                "$exists" => match operand {
                    Value::Bool(flag) => actual.is_some() == *flag,
                    _ => {
                        return Err(StoreError::malformed_stage(
                            "match",
                            "'$exists' needs a boolean",
                        ))
                    }
                },
                "$regex" => Self::regex_match(actual, operand, operators.get("$options"))?,
                "$options" => {
                    if !operators.contains_key("$regex") {
                        return Err(StoreError::malformed_stage(
                            "match",
                            "'$options' without '$regex'",
                        ));
                    }
                    true
                }
                "$not" => {
                    if Self::is_operator_document(operand).is_none() {
                        return Err(StoreError::malformed_stage(
                            "match",
                            "'$not' needs an operator document",
                        ));
                    }
                    !Self::matches_condition(actual, operand)?
                }
                other => {
                    return Err(StoreError::malformed_stage(
                        "match",
                        format!("unknown operator '{}'", other),
                    ))
                }
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Equality with array membership: a scalar matches an array field
    /// containing it. A missing field equals `null`.
    fn value_eq(actual: Option<&Value>, expected: &Value) -> bool {
        match actual {
            None => expected.is_null(),
            Some(Value::Array(items)) if !expected.is_array() => {
                items.iter().any(|item| Self::scalar_eq(item, expected))
            }
            Some(value) => Self::scalar_eq(value, expected),
        }
    }

    fn scalar_eq(actual: &Value, expected: &Value) -> bool {
        match (actual, expected) {
            (Value::Number(_), Value::Number(_)) => {
                DocumentSorter::compare_values(Some(actual), Some(expected)) == Ordering::Equal
            }
            _ => actual == expected,
        }
    }

    /// Range comparison within one type bracket (numbers or strings).
    /// Array fields match if any element does.
    fn compare_any(actual: Option<&Value>, bound: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
        let comparable = |v: &Value| match (v, bound) {
            (Value::Number(_), Value::Number(_)) | (Value::String(_), Value::String(_)) => {
                accept(DocumentSorter::compare_values(Some(v), Some(bound)))
            }
            _ => false,
        };

        match actual {
            None => false,
            Some(Value::Array(items)) => items.iter().any(comparable),
            Some(value) => comparable(value),
        }
    }

    fn in_list(actual: Option<&Value>, operand: &Value) -> StoreResult<bool> {
        match operand {
            Value::Array(candidates) => Ok(candidates.iter().any(|c| Self::value_eq(actual, c))),
            _ => Err(StoreError::malformed_stage("match", "'$in' needs an array")),
        }
    }

    fn regex_match(
        actual: Option<&Value>,
        pattern: &Value,
        options: Option<&Value>,
    ) -> StoreResult<bool> {
        let pattern = pattern
            .as_str()
            .ok_or_else(|| StoreError::malformed_stage("match", "'$regex' needs a string"))?;
        let options = match options {
            None => "",
            Some(Value::String(s)) => s.as_str(),
            Some(_) => {
                return Err(StoreError::malformed_stage("match", "'$options' needs a string"))
            }
        };

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(options.contains('i'))
            .multi_line(options.contains('m'))
            .dot_matches_new_line(options.contains('s'))
            .build()
            .map_err(|e| StoreError::malformed_stage("match", format!("bad '$regex': {}", e)))?;

        let is_match = |v: &Value| v.as_str().map_or(false, |s| regex.is_match(s));
        Ok(match actual {
            None => false,
            Some(Value::Array(items)) => items.iter().any(is_match),
            Some(value) => is_match(value),
        })
    }
}
