//! Document ordering for the memory backend
//!
//! Sorts are stable and deterministic across mixed types.

use std::cmp::Ordering;

use serde_json::Value;

use super::filters::resolve_path;
use super::service::Document;
use crate::pipeline::SortOrder;

/// Sorts result documents
pub struct DocumentSorter;

impl DocumentSorter {
    /// Sorts documents by a (possibly dotted) field path.
    ///
    /// The sort is stable: ties keep their input order.
    pub fn sort(documents: &mut [Document], field: &str, order: SortOrder) {
        documents.sort_by(|a, b| {
            let ordering = Self::compare_values(resolve_path(a, field), resolve_path(b, field));
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
    }

    /// Compares two JSON values.
    ///
    /// Ordering rules:
    /// - missing < null < bool < number < string < array < object
    /// - For same types, natural ordering; arrays and objects compare
    ///   element by element
    pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => Self::compare_present(a_val, b_val),
        }
    }

    fn compare_present(a: &Value, b: &Value) -> Ordering {
        let type_order = |v: &Value| -> u8 {
            match v {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Number(_) => 2,
                Value::String(_) => 3,
                Value::Array(_) => 4,
                Value::Object(_) => 5,
            }
        };

        let a_type = type_order(a);
        let b_type = type_order(b);
        if a_type != b_type {
            return a_type.cmp(&b_type);
        }

        match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Number(x), Value::Number(y)) => {
                if let (Some(xi), Some(yi)) = (x.as_i64(), y.as_i64()) {
                    return xi.cmp(&yi);
                }
                let xf = x.as_f64().unwrap_or(0.0);
                let yf = y.as_f64().unwrap_or(0.0);
                xf.partial_cmp(&yf).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Array(x), Value::Array(y)) => {
                for (xe, ye) in x.iter().zip(y.iter()) {
                    let ord = Self::compare_present(xe, ye);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                x.len().cmp(&y.len())
            }
            (Value::Object(x), Value::Object(y)) => {
                for ((xk, xv), (yk, yv)) in x.iter().zip(y.iter()) {
                    let ord = xk.cmp(yk).then_with(|| Self::compare_present(xv, yv));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                x.len().cmp(&y.len())
            }
            _ => Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d["_id"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_sort_ascending() {
        let mut docs = vec![
            json!({"_id": "c", "age": 30}),
            json!({"_id": "a", "age": 20}),
            json!({"_id": "b", "age": 25}),
        ];
        DocumentSorter::sort(&mut docs, "age", SortOrder::Ascending);
        assert_eq!(ids(&docs), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_descending() {
        let mut docs = vec![
            json!({"_id": "c", "age": 30}),
            json!({"_id": "a", "age": 20}),
            json!({"_id": "b", "age": 25}),
        ];
        DocumentSorter::sort(&mut docs, "age", SortOrder::Descending);
        assert_eq!(ids(&docs), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_stable() {
        let mut docs = vec![
            json!({"_id": "a", "age": 25}),
            json!({"_id": "b", "age": 25}),
            json!({"_id": "c", "age": 25}),
        ];
        DocumentSorter::sort(&mut docs, "age", SortOrder::Ascending);
        assert_eq!(ids(&docs), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_by_dotted_path() {
        let mut docs = vec![
            json!({"_id": "big", "metadata": {"size_bytes": 900}}),
            json!({"_id": "none"}),
            json!({"_id": "small", "metadata": {"size_bytes": 10}}),
        ];
        DocumentSorter::sort(&mut docs, "metadata.size_bytes", SortOrder::Ascending);
        assert_eq!(ids(&docs), vec!["none", "small", "big"]);
    }

    #[test]
    fn test_mixed_type_ordering() {
        let null = json!(null);
        let flag = json!(true);
        let num = json!(1.5);
        let text = json!("x");
        assert_eq!(DocumentSorter::compare_values(None, Some(&null)), Ordering::Less);
        assert_eq!(DocumentSorter::compare_values(Some(&null), Some(&flag)), Ordering::Less);
        assert_eq!(DocumentSorter::compare_values(Some(&flag), Some(&num)), Ordering::Less);
        assert_eq!(DocumentSorter::compare_values(Some(&num), Some(&text)), Ordering::Less);
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let a = json!(9_007_199_254_740_993i64);
        let b = json!(9_007_199_254_740_992i64);
        assert_eq!(DocumentSorter::compare_values(Some(&a), Some(&b)), Ordering::Greater);
    }
}
