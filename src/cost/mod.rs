//! Node cost computation and caching.
//!
//! Every node caches its weighted cost next to its window. A total-cost
//! pass only recomputes nodes whose cache was invalidated, so the cost
//! of one annealing iteration is proportional to the number of *changed*
//! records, not to the whole tree.

use crate::arena::PointerArena;
use crate::constraints::{compile, CompiledConstraint, Constraint};
use crate::error::Result;
use crate::interner::StringInterner;
use crate::records::RecordStore;
use crate::tree::GroupTree;

pub struct CostEngine {
    /// Compiled constraints grouped by stratum index, leaf to root.
    by_stratum: Vec<Vec<CompiledConstraint>>,
    /// `x^1.5` for integer x up to N. Limit costs hit the same small set
    /// of integer inputs throughout the search.
    pow15: Vec<f64>,
}

impl CostEngine {
    pub fn new(
        tree: &GroupTree,
        constraints: &[Constraint],
        store: &RecordStore,
        interner: &StringInterner,
    ) -> Result<Self> {
        let compiled = compile(constraints, store, interner, tree)?;
        let mut by_stratum = vec![Vec::new(); tree.strata().len()];
        for constraint in compiled {
            by_stratum[constraint.stratum()].push(constraint);
        }
        let pow15 = (0..=tree.n_records())
            .map(|i| (i as f64).powf(1.5))
            .collect();
        Ok(Self { by_stratum, pow15 })
    }

    pub fn pow15(&self) -> &[f64] {
        &self.pow15
    }

    pub fn constraints_for(&self, stratum: usize) -> &[CompiledConstraint] {
        &self.by_stratum[stratum]
    }

    /// Total weighted cost of the current assignment, filling any unset
    /// node caches along the way.
    pub fn total(&self, tree: &mut GroupTree, arena: &PointerArena) -> f64 {
        let mut total = 0.0;
        for (level, stratum) in tree.strata_mut().iter_mut().enumerate() {
            let constraints = &self.by_stratum[level];
            for node in &mut stratum.nodes {
                let cost = match node.cached_cost() {
                    Some(cached) => cached,
                    None => {
                        let window = node.records(arena);
                        let computed = constraints
                            .iter()
                            .map(|c| c.weighted_cost(window, &self.pow15))
                            .sum();
                        node.set_cost(computed);
                        computed
                    }
                };
                total += cost;
            }
        }
        total
    }

    /// Clears the cache of the single node per stratum whose window
    /// contains each changed working-set index.
    pub fn invalidate(&self, tree: &mut GroupTree, changed: &[usize]) {
        for stratum in tree.strata_mut() {
            for &index in changed {
                if let Some(node) = stratum.locate(index) {
                    stratum.nodes[node].clear_cost();
                }
            }
        }
    }
}
