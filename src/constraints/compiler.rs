//! Constraint compilation.
//!
//! Each declarative constraint becomes a specialized evaluator holding a
//! per-record precomputed array (filter satisfaction, raw numeric value,
//! or interned pointer). Per-iteration cost evaluation is then a tight
//! scan over a node's window indexed by record pointer, with none of the
//! original filter logic left to re-interpret.

use std::collections::HashSet;

use crate::error::{Result, SolverError};
use crate::interner::StringInterner;
use crate::records::{Cell, ColumnInfo, RawCell, RecordStore};
use crate::tree::GroupTree;

use super::types::{
    Comparison, Constraint, ConstraintKind, Filter, LimitBias, SimilarityBias, SizeCondition,
};

/// Sentinel for a missing text cell in a precomputed pointer array.
const MISSING_TEXT: u32 = u32::MAX;

/// A filter value after column resolution. Text values that were never
/// interned can match no record and keep their `None`.
#[derive(Debug, Clone, Copy)]
enum FilterValue {
    Number(f64),
    Text(Option<u32>),
    Missing,
}

/// One compiled evaluator.
#[derive(Debug, Clone)]
pub struct CompiledConstraint {
    index: usize,
    stratum: usize,
    weight: f64,
    applicability: Vec<SizeCondition>,
    kind: CompiledKind,
}

#[derive(Debug, Clone)]
enum CompiledKind {
    Count {
        satisfied: Vec<bool>,
        comparison: Comparison,
        value: usize,
    },
    Limit {
        satisfied: Vec<bool>,
        bias: LimitBias,
    },
    SimilarNumber {
        values: Vec<f64>,
        range: f64,
        bias: SimilarityBias,
    },
    SimilarText {
        values: Vec<u32>,
        bias: SimilarityBias,
    },
}

impl CompiledConstraint {
    /// Position of the source constraint in the declared list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Index of the stratum this constraint scores.
    pub fn stratum(&self) -> usize {
        self.stratum
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Whether every applicability condition holds for a node of this
    /// size. An inapplicable pair costs exactly zero and is excluded
    /// from satisfaction statistics.
    pub fn applicable(&self, node_len: usize) -> bool {
        self.applicability.iter().all(|c| c.holds(node_len))
    }

    /// Number of filter-satisfying pointers in a window. Zero for
    /// similarity constraints, which have no filter.
    pub fn satisfying_count(&self, window: &[u32]) -> usize {
        match &self.kind {
            CompiledKind::Count { satisfied, .. } | CompiledKind::Limit { satisfied, .. } => {
                window.iter().filter(|&&p| satisfied[p as usize]).count()
            }
            _ => 0,
        }
    }

    pub fn is_limit(&self) -> bool {
        matches!(self.kind, CompiledKind::Limit { .. })
    }

    /// Raw (unweighted) cost of one node window.
    ///
    /// `pow15` is the shared `x^1.5` table indexed by integer count.
    pub fn unweighted_cost(&self, window: &[u32], pow15: &[f64]) -> f64 {
        match &self.kind {
            CompiledKind::Count {
                satisfied,
                comparison,
                value,
            } => {
                let count = window.iter().filter(|&&p| satisfied[p as usize]).count();
                if comparison.compare_usize(count, *value) {
                    0.0
                } else {
                    1.0
                }
            }

            CompiledKind::Limit { satisfied, bias } => {
                let count = window.iter().filter(|&&p| satisfied[p as usize]).count();
                match bias {
                    LimitBias::Low => pow15[count],
                    LimitBias::High => pow15[window.len() - count],
                }
            }

            CompiledKind::SimilarNumber {
                values,
                range,
                bias,
            } => {
                let window_values: Vec<f64> = window
                    .iter()
                    .map(|&p| values[p as usize])
                    .filter(|v| !v.is_nan())
                    .collect();
                if *range == 0.0 || window_values.len() < 2 {
                    // Too little information to judge spread: can never
                    // be unsatisfied for Similar, never satisfied for
                    // Different.
                    return match bias {
                        SimilarityBias::Similar => 0.0,
                        SimilarityBias::Different => 1.0,
                    };
                }
                let spread = 2.0 * population_stddev(&window_values);
                match bias {
                    SimilarityBias::Similar => spread / range,
                    SimilarityBias::Different => ((range - spread) / range).max(0.0),
                }
            }

            CompiledKind::SimilarText { values, bias } => {
                let present: Vec<u32> = window
                    .iter()
                    .map(|&p| values[p as usize])
                    .filter(|&v| v != MISSING_TEXT)
                    .collect();
                let distinct = present.iter().collect::<HashSet<_>>().len();
                match bias {
                    SimilarityBias::Similar => distinct.saturating_sub(1) as f64,
                    SimilarityBias::Different => (present.len() - distinct) as f64,
                }
            }
        }
    }

    /// Weight-scaled cost, zero when the node is out of scope.
    pub fn weighted_cost(&self, window: &[u32], pow15: &[f64]) -> f64 {
        if !self.applicable(window.len()) {
            return 0.0;
        }
        self.unweighted_cost(window, pow15) * self.weight
    }
}

/// Compiles all constraints against the loaded record set and the built
/// tree, validating column and stratum references up front.
pub fn compile(
    constraints: &[Constraint],
    store: &RecordStore,
    interner: &StringInterner,
    tree: &GroupTree,
) -> Result<Vec<CompiledConstraint>> {
    constraints
        .iter()
        .enumerate()
        .map(|(index, constraint)| {
            let stratum = tree
                .stratum_index(&constraint.stratum)
                .ok_or_else(|| SolverError::UnknownStratum(constraint.stratum.clone()))?;

            let kind = match &constraint.kind {
                ConstraintKind::Count { filter, rule } => CompiledKind::Count {
                    satisfied: compile_filter(filter, store, interner)?,
                    comparison: rule.comparison,
                    value: rule.value,
                },
                ConstraintKind::Limit { filter, bias } => CompiledKind::Limit {
                    satisfied: compile_filter(filter, store, interner)?,
                    bias: *bias,
                },
                ConstraintKind::Similarity { column, bias } => {
                    compile_similarity(*column, *bias, store)?
                }
            };

            Ok(CompiledConstraint {
                index,
                stratum,
                weight: constraint.priority.weight(),
                applicability: constraint.applicability.clone(),
                kind,
            })
        })
        .collect()
}

/// Precomputes the per-record filter-satisfaction array.
fn compile_filter(
    filter: &Filter,
    store: &RecordStore,
    interner: &StringInterner,
) -> Result<Vec<bool>> {
    let descriptor = store
        .column(filter.column)
        .ok_or(SolverError::UnknownColumn(filter.column))?;

    let ordered = !matches!(filter.comparison, Comparison::Eq | Comparison::Ne);
    if ordered {
        match filter.values.first() {
            Some(RawCell::Number(_)) => {}
            _ => {
                return Err(SolverError::ColumnTypeMismatch {
                    column: descriptor.label.clone(),
                    expected: "number",
                })
            }
        }
    }

    let values: Vec<FilterValue> = filter
        .values
        .iter()
        .map(|v| match v {
            RawCell::Number(n) => FilterValue::Number(*n),
            RawCell::Text(s) => FilterValue::Text(interner.get(s)),
            RawCell::Missing => FilterValue::Missing,
        })
        .collect();

    Ok((0..store.len())
        .map(|record| cell_matches(store.cell(record, filter.column), filter.comparison, &values))
        .collect())
}

fn cell_matches(cell: Cell, comparison: Comparison, values: &[FilterValue]) -> bool {
    if matches!(cell, Cell::Missing) {
        return false;
    }
    match comparison {
        Comparison::Eq => values.iter().any(|v| value_eq(cell, v)),
        Comparison::Ne => values.iter().all(|v| !value_eq(cell, v)),
        ordered => match (cell, values.first()) {
            (Cell::Number(a), Some(FilterValue::Number(b))) => ordered.compare_f64(a, *b),
            _ => false,
        },
    }
}

fn value_eq(cell: Cell, value: &FilterValue) -> bool {
    match (cell, value) {
        (Cell::Number(a), FilterValue::Number(b)) => a == *b,
        (Cell::Text(p), FilterValue::Text(Some(q))) => p == *q,
        _ => false,
    }
}

/// Precomputes the raw value array for a similarity constraint. The
/// evaluator family follows the column's declared type.
fn compile_similarity(
    column: usize,
    bias: SimilarityBias,
    store: &RecordStore,
) -> Result<CompiledKind> {
    let info = *store
        .column_info(column)
        .ok_or(SolverError::UnknownColumn(column))?;

    match info {
        ColumnInfo::Number { range, .. } => {
            let values = (0..store.len())
                .map(|record| match store.cell(record, column) {
                    Cell::Number(v) => v,
                    _ => f64::NAN,
                })
                .collect();
            Ok(CompiledKind::SimilarNumber {
                values,
                range,
                bias,
            })
        }
        ColumnInfo::Text { .. } => {
            let values = (0..store.len())
                .map(|record| match store.cell(record, column) {
                    Cell::Text(ptr) => ptr,
                    _ => MISSING_TEXT,
                })
                .collect();
            Ok(CompiledKind::SimilarText { values, bias })
        }
    }
}

fn population_stddev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    variance.sqrt()
}
