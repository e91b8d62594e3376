//! Multi-partition solving.
//!
//! A partition key splits the record set into independent sub-problems.
//! Each partition owns its arena and tree outright, so partitions run
//! with no locking — in parallel under the `parallel` feature, one
//! rayon task per partition.

use crate::anneal::AnnealConfig;
use crate::constraints::Constraint;
use crate::error::{Result, SolverError};
use crate::records::{ColumnDescriptor, RawCell};
use crate::solve::{solve, Solution};
use crate::tree::StratumSpec;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One partition's key and its solved assignment.
#[derive(Debug, Clone)]
pub struct PartitionSolution {
    pub key: String,
    pub solution: Solution,
}

/// Groups rows by the rendered value of one column, preserving the
/// order in which keys first appear.
pub fn split_by_key(
    rows: Vec<Vec<RawCell>>,
    key_column: usize,
) -> Vec<(String, Vec<Vec<RawCell>>)> {
    let mut partitions: Vec<(String, Vec<Vec<RawCell>>)> = Vec::new();
    for row in rows {
        let key = render_key(&row[key_column]);
        match partitions.iter_mut().find(|(k, _)| *k == key) {
            Some((_, bucket)) => bucket.push(row),
            None => partitions.push((key, vec![row])),
        }
    }
    partitions
}

/// Solves every partition of the record set independently.
pub fn solve_partitions(
    columns: &[ColumnDescriptor],
    rows: Vec<Vec<RawCell>>,
    key_column: usize,
    strata: &[StratumSpec],
    constraints: &[Constraint],
    config: &AnnealConfig,
) -> Result<Vec<PartitionSolution>> {
    if key_column >= columns.len() {
        return Err(SolverError::UnknownColumn(key_column));
    }
    let partitions = split_by_key(rows, key_column);
    log::debug!(
        "solving {} partitions keyed by '{}'",
        partitions.len(),
        columns[key_column].label
    );

    #[cfg(feature = "parallel")]
    return partitions
        .into_par_iter()
        .map(|(key, rows)| solve_one(columns, key, rows, strata, constraints, config))
        .collect();

    #[cfg(not(feature = "parallel"))]
    partitions
        .into_iter()
        .map(|(key, rows)| solve_one(columns, key, rows, strata, constraints, config))
        .collect()
}

fn solve_one(
    columns: &[ColumnDescriptor],
    key: String,
    rows: Vec<Vec<RawCell>>,
    strata: &[StratumSpec],
    constraints: &[Constraint],
    config: &AnnealConfig,
) -> Result<PartitionSolution> {
    let solution = solve(columns.to_vec(), rows, strata, constraints, config)?;
    Ok(PartitionSolution { key, solution })
}

fn render_key(cell: &RawCell) -> String {
    match cell {
        RawCell::Number(v) if v.fract() == 0.0 && v.is_finite() => format!("{}", *v as i64),
        RawCell::Number(v) => format!("{v}"),
        RawCell::Text(s) => s.clone(),
        RawCell::Missing => String::new(),
    }
}
