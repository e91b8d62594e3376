//! Declarative constraints and their compiled evaluators.
//!
//! The declarative layer ([`Constraint`] and friends) is what the
//! configuration collaborator ships over the wire. [`compile`] turns it
//! into per-record precomputed evaluators so the annealing loop never
//! re-interprets filter logic.

mod compiler;
mod types;

pub use compiler::{compile, CompiledConstraint};
pub use types::{
    Comparison, Constraint, ConstraintKind, CountRule, Filter, LimitBias, Priority,
    SimilarityBias, SizeCondition,
};
