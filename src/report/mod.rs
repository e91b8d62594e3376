//! Constraint-satisfaction reporting.
//!
//! Distinct from the cost driving the search: the report is a binary
//! pass/fail per (constraint, node), for human-facing output. Pairs a
//! constraint is inapplicable to (by node size) are `None` — excluded
//! from the aggregates, never scored as failing.

use crate::arena::PointerArena;
use crate::constraints::CompiledConstraint;
use crate::cost::CostEngine;
use crate::tree::GroupTree;

/// Pass/fail verdicts for one constraint across its stratum's nodes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintReport {
    /// Position of the constraint in the declared list.
    pub constraint: usize,
    /// Stratum id the constraint scores.
    pub stratum: String,
    /// One verdict per node, in node order. `None` = inapplicable.
    pub verdicts: Vec<Option<bool>>,
    pub passed: usize,
    pub total: usize,
}

/// Full satisfaction report for one partition.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SatisfactionReport {
    pub constraints: Vec<ConstraintReport>,
    pub passed: usize,
    pub total: usize,
}

impl SatisfactionReport {
    /// Scores the final assignment. Count and Similarity constraints
    /// pass where their raw node cost is zero; Limit constraints pass
    /// where the node's satisfying count falls within the pigeonhole
    /// expectation across the applicable sibling nodes.
    pub fn build(tree: &GroupTree, arena: &PointerArena, engine: &CostEngine) -> Self {
        let mut constraints: Vec<ConstraintReport> = Vec::new();

        for (level, stratum) in tree.strata().iter().enumerate() {
            for compiled in engine.constraints_for(level) {
                let verdicts = if compiled.is_limit() {
                    limit_verdicts(compiled, tree, level, arena)
                } else {
                    stratum
                        .nodes
                        .iter()
                        .map(|node| {
                            if !compiled.applicable(node.len()) {
                                return None;
                            }
                            let window = node.records(arena);
                            Some(compiled.unweighted_cost(window, engine.pow15()) == 0.0)
                        })
                        .collect()
                };

                let passed = verdicts.iter().filter(|v| **v == Some(true)).count();
                let total = verdicts.iter().filter(|v| v.is_some()).count();
                constraints.push(ConstraintReport {
                    constraint: compiled.index(),
                    stratum: stratum.id.clone(),
                    verdicts,
                    passed,
                    total,
                });
            }
        }

        // Report in declaration order, not stratum order.
        constraints.sort_by_key(|report| report.constraint);

        let passed = constraints.iter().map(|c| c.passed).sum();
        let total = constraints.iter().map(|c| c.total).sum();
        Self {
            constraints,
            passed,
            total,
        }
    }
}

/// A Limit constraint has no per-node threshold; it is judged across
/// all applicable siblings at once. With `t` satisfying records over
/// `k` applicable nodes, most nodes should hold `t / k` and the
/// remainder one more; a node fails when its count leaves that band.
fn limit_verdicts(
    compiled: &CompiledConstraint,
    tree: &GroupTree,
    level: usize,
    arena: &PointerArena,
) -> Vec<Option<bool>> {
    let nodes = &tree.strata()[level].nodes;

    let counts: Vec<Option<usize>> = nodes
        .iter()
        .map(|node| {
            compiled
                .applicable(node.len())
                .then(|| compiled.satisfying_count(node.records(arena)))
        })
        .collect();

    let applicable = counts.iter().flatten().count();
    if applicable == 0 {
        return counts.iter().map(|_| None).collect();
    }
    let total: usize = counts.iter().flatten().sum();
    let floor = total / applicable;
    let ceiling = if total % applicable > 0 {
        floor + 1
    } else {
        floor
    };

    counts
        .into_iter()
        .map(|count| count.map(|c| (floor..=ceiling).contains(&c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{
        Comparison, Constraint, ConstraintKind, CountRule, Filter, LimitBias, Priority,
        SimilarityBias,
    };
    use crate::interner::StringInterner;
    use crate::records::{ColumnDescriptor, RawCell, RecordStore};
    use crate::tree::{SizeRange, StratumSpec};

    fn fixture(constraints: Vec<Constraint>) -> (GroupTree, PointerArena, CostEngine) {
        let mut interner = StringInterner::new();
        let columns = vec![
            ColumnDescriptor::text("name").id(),
            ColumnDescriptor::text("flag"),
            ColumnDescriptor::number("score"),
        ];
        // Records 0..5 carry "A"; scores ascend 0..10.
        let rows = (0..10)
            .map(|i| {
                vec![
                    RawCell::Text(format!("r{i}")),
                    RawCell::Text(if i < 5 { "A".into() } else { "B".into() }),
                    RawCell::Number(i as f64),
                ]
            })
            .collect();
        let store = RecordStore::from_rows(columns, rows, &mut interner).unwrap();
        let tree = GroupTree::build(
            10,
            &[StratumSpec::new("team", SizeRange::new(2, 5, 6))],
        )
        .unwrap();
        let engine = CostEngine::new(&tree, &constraints, &store, &interner).unwrap();
        let arena = PointerArena::new(10);
        (tree, arena, engine)
    }

    fn flag_filter() -> Filter {
        Filter {
            column: 1,
            comparison: Comparison::Eq,
            values: vec![RawCell::Text("A".into())],
        }
    }

    #[test]
    fn test_count_verdicts() {
        // Teams [0..5] and [5..10] under identity: 5 and 0 "A"s.
        let constraint = Constraint::new(
            "team",
            Priority::MustHave,
            ConstraintKind::Count {
                filter: flag_filter(),
                rule: CountRule {
                    comparison: Comparison::Ge,
                    value: 1,
                },
            },
        );
        let (tree, arena, engine) = fixture(vec![constraint]);
        let report = SatisfactionReport::build(&tree, &arena, &engine);

        assert_eq!(report.constraints.len(), 1);
        assert_eq!(report.constraints[0].verdicts, vec![Some(true), Some(false)]);
        assert_eq!(report.passed, 1);
        assert_eq!(report.total, 2);
    }

    #[test]
    fn test_limit_pigeonhole_verdicts() {
        // 5 satisfying records over 2 nodes: expected 2 or 3 per node.
        // Identity order puts 5 in one node and 0 in the other, both
        // outside the band.
        let constraint = Constraint::new(
            "team",
            Priority::ShouldHave,
            ConstraintKind::Limit {
                filter: flag_filter(),
                bias: LimitBias::Low,
            },
        );
        let (tree, mut arena, engine) = fixture(vec![constraint]);
        let report = SatisfactionReport::build(&tree, &arena, &engine);
        assert_eq!(
            report.constraints[0].verdicts,
            vec![Some(false), Some(false)]
        );

        // Rebalance to 3 / 2: both within expectation.
        let balanced: Vec<u32> = vec![0, 1, 2, 5, 6, 3, 4, 7, 8, 9];
        arena.working_mut().copy_from_slice(&balanced);
        let report = SatisfactionReport::build(&tree, &arena, &engine);
        assert_eq!(report.constraints[0].verdicts, vec![Some(true), Some(true)]);
    }

    #[test]
    fn test_inapplicable_pairs_are_excluded() {
        let constraint = Constraint::new(
            "team",
            Priority::MustHave,
            ConstraintKind::Count {
                filter: flag_filter(),
                rule: CountRule {
                    comparison: Comparison::Ge,
                    value: 1,
                },
            },
        )
        .when_size(Comparison::Gt, 50);
        let (tree, arena, engine) = fixture(vec![constraint]);
        let report = SatisfactionReport::build(&tree, &arena, &engine);

        assert_eq!(report.constraints[0].verdicts, vec![None, None]);
        assert_eq!(report.total, 0);
        assert_eq!(report.passed, 0);
    }

    #[test]
    fn test_similarity_verdict_requires_zero_cost() {
        let constraint = Constraint::new(
            "team",
            Priority::CouldHave,
            ConstraintKind::Similarity {
                column: 2,
                bias: SimilarityBias::Similar,
            },
        );
        let (tree, arena, engine) = fixture(vec![constraint]);
        let report = SatisfactionReport::build(&tree, &arena, &engine);

        // Ascending scores have nonzero spread in both teams.
        assert_eq!(
            report.constraints[0].verdicts,
            vec![Some(false), Some(false)]
        );
    }

    #[test]
    fn test_reports_follow_declaration_order() {
        let count = Constraint::new(
            "team",
            Priority::MustHave,
            ConstraintKind::Count {
                filter: flag_filter(),
                rule: CountRule {
                    comparison: Comparison::Ge,
                    value: 0,
                },
            },
        );
        let similar = Constraint::new(
            "team",
            Priority::CouldHave,
            ConstraintKind::Similarity {
                column: 2,
                bias: SimilarityBias::Similar,
            },
        );
        let (tree, arena, engine) = fixture(vec![similar, count]);
        let report = SatisfactionReport::build(&tree, &arena, &engine);

        assert_eq!(report.constraints[0].constraint, 0);
        assert_eq!(report.constraints[1].constraint, 1);
    }
}
