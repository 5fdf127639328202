//! Query pipeline vocabulary for sampleview
//!
//! A pipeline is an ordered sequence of stages. Stage order defines
//! execution order and is preserved everywhere: on derivation, on copy,
//! and in the compiled dialect.
//!
//! # Vocabulary
//!
//! match, sort, skip, limit, sample, project, unwind, group, count

mod compile;
mod stage;

pub use compile::{compile, compile_to_value};
pub use stage::{Accumulator, GroupSpec, MatchExpr, Projection, SortOrder, Stage};
