//! Unified error type for the crate.
//!
//! Fatal conditions abort a partition's run and surface to the caller;
//! everything recoverable (inapplicable constraints, degenerate strata)
//! is ordinary control flow and never reaches this enum.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("record set is empty")]
    EmptyRecordSet,

    #[error("row {row} has {got} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("row {row}, column {column}: expected a {expected} cell")]
    CellType {
        row: usize,
        column: usize,
        expected: &'static str,
    },

    #[error("no identifier column declared")]
    NoIdColumn,

    #[error("more than one identifier column declared")]
    MultipleIdColumns,

    #[error("constraint references unknown column index {0}")]
    UnknownColumn(usize),

    #[error("constraint on column '{column}' expects a {expected} column")]
    ColumnTypeMismatch {
        column: String,
        expected: &'static str,
    },

    #[error("constraint references unknown stratum '{0}'")]
    UnknownStratum(String),

    #[error("invalid size range for stratum '{stratum}': min {min}, ideal {ideal}, max {max}")]
    InvalidSizeRange {
        stratum: String,
        min: usize,
        ideal: usize,
        max: usize,
    },

    #[error(
        "stratum '{stratum}' requires groups of exactly {size} but {units} units leave a remainder"
    )]
    ExactSizeMismatch {
        stratum: String,
        size: usize,
        units: usize,
    },

    #[error(
        "stratum '{stratum}' cannot hold {units} units with {groups} groups of {min}..={max}"
    )]
    InfeasibleSizing {
        stratum: String,
        units: usize,
        groups: usize,
        min: usize,
        max: usize,
    },

    /// Internal invariant violation: a corrupted tree build, not bad input.
    #[error("child windows are not contiguous at offset {offset} (expected {expected})")]
    NonContiguousChildren { offset: usize, expected: usize },

    #[error(
        "temperature calibration collected {collected} of {needed} uphill samples \
         within {cap} iterations; cost variance is too low to anneal"
    )]
    CalibrationFailed {
        collected: usize,
        needed: usize,
        cap: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
