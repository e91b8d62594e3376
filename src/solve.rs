//! End-to-end solve for one partition.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::anneal::{AnnealConfig, AnnealResult, AnnealRunner};
use crate::arena::PointerArena;
use crate::constraints::Constraint;
use crate::cost::CostEngine;
use crate::error::Result;
use crate::interner::StringInterner;
use crate::output::AssignmentTree;
use crate::records::{ColumnDescriptor, RawCell, RecordStore};
use crate::report::SatisfactionReport;
use crate::tree::{GroupTree, StratumSpec};

/// Everything a caller gets back for one partition.
#[derive(Debug, Clone)]
pub struct Solution {
    pub tree: AssignmentTree,
    pub report: SatisfactionReport,
    pub anneal: AnnealResult,
}

/// Loads the records, builds the hierarchy, anneals, and exports.
pub fn solve(
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Vec<RawCell>>,
    strata: &[StratumSpec],
    constraints: &[Constraint],
    config: &AnnealConfig,
) -> Result<Solution> {
    solve_with_cancel(columns, rows, strata, constraints, config, None)
}

/// [`solve`] with a cancellation token, checked at round boundaries.
pub fn solve_with_cancel(
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Vec<RawCell>>,
    strata: &[StratumSpec],
    constraints: &[Constraint],
    config: &AnnealConfig,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<Solution> {
    let mut interner = StringInterner::new();
    let store = RecordStore::from_rows(columns, rows, &mut interner)?;
    let mut tree = GroupTree::build(store.len(), strata)?;
    let engine = CostEngine::new(&tree, constraints, &store, &interner)?;
    debug!(
        "solving {} records across {} strata under {} constraints",
        store.len(),
        strata.len(),
        constraints.len()
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut arena = PointerArena::new(store.len());
    arena.shuffle(&mut rng);

    let anneal =
        AnnealRunner::run_with_rng(&mut tree, &mut arena, &engine, config, cancel, &mut rng)?;
    let report = SatisfactionReport::build(&tree, &arena, &engine);
    let tree = AssignmentTree::from_tree(&tree, &arena, &store, &interner);

    Ok(Solution {
        tree,
        report,
        anneal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anneal::StopReason;
    use crate::constraints::{
        Comparison, ConstraintKind, CountRule, Filter, Priority, SimilarityBias,
    };
    use crate::output::AssignmentNode;
    use crate::tree::SizeRange;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::text("name").id(),
            ColumnDescriptor::text("level"),
            ColumnDescriptor::number("age"),
        ]
    }

    /// 12 people, levels cycling junior/senior, ages in two clusters.
    fn rows() -> Vec<Vec<RawCell>> {
        (0..12)
            .map(|i| {
                vec![
                    RawCell::Text(format!("p{i}")),
                    RawCell::Text(if i % 2 == 0 {
                        "junior".into()
                    } else {
                        "senior".into()
                    }),
                    RawCell::Number(if i < 6 { 20.0 + i as f64 } else { 50.0 + i as f64 }),
                ]
            })
            .collect()
    }

    #[test]
    fn test_end_to_end_balanced_teams() {
        let strata = [
            StratumSpec::new("team", SizeRange::new(2, 4, 5)),
            StratumSpec::new("table", SizeRange::new(1, 3, 3)),
        ];
        // Every team wants exactly two juniors.
        let constraints = [Constraint::new(
            "team",
            Priority::MustHave,
            ConstraintKind::Count {
                filter: Filter {
                    column: 1,
                    comparison: Comparison::Eq,
                    values: vec![RawCell::Text("junior".into())],
                },
                rule: CountRule {
                    comparison: Comparison::Eq,
                    value: 2,
                },
            },
        )];
        let config = AnnealConfig::default()
            .with_calibration_samples(20)
            .with_seed(42);

        let solution = solve(columns(), rows(), &strata, &constraints, &config).unwrap();

        assert_eq!(solution.anneal.final_cost, 0.0);
        assert_eq!(solution.anneal.stop, StopReason::CostZero);
        assert_eq!(solution.report.passed, solution.report.total);
        assert_eq!(solution.report.total, 3);

        // One table of three teams, each leaf listing 4 member ids.
        assert_eq!(solution.tree.children.len(), 1);
        let AssignmentNode::Group { stratum, children } = &solution.tree.children[0] else {
            panic!("expected a table group");
        };
        assert_eq!(stratum, "table");
        assert_eq!(children.len(), 3);

        let mut seen: Vec<String> = Vec::new();
        for team in children {
            let AssignmentNode::Leaf { stratum, members } = team else {
                panic!("expected a team leaf");
            };
            assert_eq!(stratum, "team");
            assert_eq!(members.len(), 4);
            seen.extend(members.iter().cloned());
        }
        seen.sort();
        let mut expected: Vec<String> = (0..12).map(|i| format!("p{i}")).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_similarity_solve_runs_to_completion() {
        let strata = [StratumSpec::new("team", SizeRange::new(2, 6, 7))];
        let constraints = [Constraint::new(
            "team",
            Priority::ShouldHave,
            ConstraintKind::Similarity {
                column: 2,
                bias: SimilarityBias::Similar,
            },
        )];
        let config = AnnealConfig::default()
            .with_calibration_samples(20)
            .with_max_rounds(20)
            .with_seed(7);

        let solution = solve(columns(), rows(), &strata, &constraints, &config).unwrap();

        // Two age clusters fit two teams; the search should at least
        // improve on the shuffled start.
        assert!(solution.anneal.final_cost <= solution.anneal.initial_cost);
        assert_eq!(solution.report.constraints.len(), 1);
        assert_eq!(solution.report.constraints[0].total, 2);
    }

    #[test]
    fn test_input_errors_surface() {
        let strata = [StratumSpec::new("team", SizeRange::new(2, 4, 5))];
        let config = AnnealConfig::default();

        let err = solve(columns(), Vec::new(), &strata, &[], &config).unwrap_err();
        assert!(matches!(err, crate::SolverError::EmptyRecordSet));

        let bad_stratum = [Constraint::new(
            "room",
            Priority::MustHave,
            ConstraintKind::Count {
                filter: Filter {
                    column: 1,
                    comparison: Comparison::Eq,
                    values: vec![RawCell::Text("junior".into())],
                },
                rule: CountRule {
                    comparison: Comparison::Ge,
                    value: 1,
                },
            },
        )];
        let err = solve(columns(), rows(), &strata, &bad_stratum, &config).unwrap_err();
        assert!(matches!(err, crate::SolverError::UnknownStratum(_)));
    }
}
