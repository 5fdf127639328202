//! Pipeline stage structures
//!
//! Stages are immutable values. A view accumulates them in execution order;
//! they are only translated to the aggregation dialect in `compile`.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;

use crate::sample::SampleId;

/// Sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Order implied by a `reverse` flag
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }

    /// Dialect value (`1` / `-1`)
    pub fn as_i32(&self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

/// Predicate of a match stage
#[derive(Debug, Clone, PartialEq)]
pub enum MatchExpr {
    /// Tag list contains the given tag
    Tag(String),
    /// Identifier equals
    IdEq(SampleId),
    /// Identifier is one of
    IdIn(BTreeSet<SampleId>),
    /// Identifier is none of
    IdNotIn(BTreeSet<SampleId>),
    /// Caller-supplied query document, passed through untouched
    Raw(Value),
}

/// One output field of a projection: `name <- $source`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub name: String,
    pub source: String,
}

impl Projection {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Projects a field onto itself
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: name.clone(),
            name,
        }
    }
}

/// Group accumulators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accumulator {
    /// Distinct values of a field
    AddToSet(String),
    /// Numeric sum of a field
    Sum(String),
    /// Number of documents in the group
    Count,
}

impl Accumulator {
    pub fn op_name(&self) -> &'static str {
        match self {
            Accumulator::AddToSet(_) => "addToSet",
            Accumulator::Sum(_) | Accumulator::Count => "sum",
        }
    }
}

/// Group specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    /// Grouping field; `None` collapses everything into one group
    pub key: Option<String>,
    /// Output field name and its accumulator, in output order
    pub accumulators: Vec<(String, Accumulator)>,
}

impl GroupSpec {
    /// A single group over all input documents
    pub fn all() -> Self {
        Self {
            key: None,
            accumulators: Vec::new(),
        }
    }

    /// Groups by the given field
    pub fn by(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            accumulators: Vec::new(),
        }
    }

    /// Adds an accumulator
    pub fn with(mut self, name: impl Into<String>, accumulator: Accumulator) -> Self {
        self.accumulators.push((name.into(), accumulator));
        self
    }
}

/// A single declarative pipeline step
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(MatchExpr),
    Sort { field: String, order: SortOrder },
    Skip(usize),
    Limit(usize),
    /// Uniform random sample without replacement
    Sample { size: usize },
    Project(Vec<Projection>),
    /// Flatten an array field into one document per element
    Unwind(String),
    Group(GroupSpec),
    /// Replace the stream with `{field: n}`
    Count(String),
}

impl Stage {
    pub fn match_tag(tag: impl Into<String>) -> Self {
        Stage::Match(MatchExpr::Tag(tag.into()))
    }

    pub fn match_raw(expr: Value) -> Self {
        Stage::Match(MatchExpr::Raw(expr))
    }

    pub fn match_id(id: SampleId) -> Self {
        Stage::Match(MatchExpr::IdEq(id))
    }

    pub fn sort(field: impl Into<String>, order: SortOrder) -> Self {
        Stage::Sort {
            field: field.into(),
            order,
        }
    }

    pub fn count(field: impl Into<String>) -> Self {
        Stage::Count(field.into())
    }

    /// Short stage kind name, as used in the dialect without the `$`
    pub fn kind(&self) -> &'static str {
        match self {
            Stage::Match(_) => "match",
            Stage::Sort { .. } => "sort",
            Stage::Skip(_) => "skip",
            Stage::Limit(_) => "limit",
            Stage::Sample { .. } => "sample",
            Stage::Project(_) => "project",
            Stage::Unwind(_) => "unwind",
            Stage::Group(_) => "group",
            Stage::Count(_) => "count",
        }
    }

    /// Skip amount if this is a skip stage
    pub fn as_skip(&self) -> Option<usize> {
        match self {
            Stage::Skip(n) => Some(*n),
            _ => None,
        }
    }

    /// Dialect document for this stage
    pub fn to_document(&self) -> Value {
        super::compile::stage_document(self)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_document())
    }
}
