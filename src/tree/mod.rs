//! The group tree: per-stratum node windows over the pointer arena.
//!
//! Built once, bottom-up, from the leaf stratum's record count through
//! each declared stratum's size bounds. The tree itself never moves
//! after construction — only the pointers *inside* the windows do.

mod node;
mod sizing;
mod stratum;

pub use node::StratumNode;
pub use stratum::{SizeRange, Stratum, StratumSpec};

use crate::error::{Result, SolverError};

/// All strata, ordered leaf to root.
#[derive(Debug, Clone)]
pub struct GroupTree {
    strata: Vec<Stratum>,
    n_records: usize,
}

impl GroupTree {
    /// Builds the hierarchy for `n_records` under the declared strata.
    ///
    /// The leaf stratum slices `[0, N)` directly; each later stratum
    /// groups the previous stratum's nodes under its own size bounds
    /// and takes its record windows from those children.
    pub fn build(n_records: usize, specs: &[StratumSpec]) -> Result<Self> {
        if specs.is_empty() {
            return Err(SolverError::InvalidConfig(
                "at least one stratum is required".into(),
            ));
        }
        for spec in specs {
            spec.size.validate(&spec.id)?;
        }

        let mut strata: Vec<Stratum> = Vec::with_capacity(specs.len());
        for (level, spec) in specs.iter().enumerate() {
            let nodes = if level == 0 {
                let groups = sizing::group_count(&spec.id, n_records, &spec.size)?;
                let mut offset = 0;
                sizing::window_sizes(n_records, groups)
                    .into_iter()
                    .map(|len| {
                        let node = StratumNode::new(offset, len);
                        offset += len;
                        node
                    })
                    .collect()
            } else {
                let children = &strata[level - 1].nodes;
                let groups = sizing::group_count(&spec.id, children.len(), &spec.size)?;
                let mut taken = 0;
                sizing::window_sizes(children.len(), groups)
                    .into_iter()
                    .map(|count| {
                        let node = StratumNode::from_children(&children[taken..taken + count]);
                        taken += count;
                        node
                    })
                    .collect::<Result<Vec<_>>>()?
            };
            strata.push(Stratum {
                id: spec.id.clone(),
                size: spec.size,
                nodes,
            });
        }

        Ok(Self { strata, n_records })
    }

    pub fn n_records(&self) -> usize {
        self.n_records
    }

    pub fn strata(&self) -> &[Stratum] {
        &self.strata
    }

    pub fn strata_mut(&mut self) -> &mut [Stratum] {
        &mut self.strata
    }

    pub fn stratum_index(&self, id: &str) -> Option<usize> {
        self.strata.iter().position(|s| s.id == id)
    }

    /// Clears every node's cached cost. Used after whole-arena restores,
    /// where tracking individual changed indices is pointless.
    pub fn wipe_all_costs(&mut self) {
        for stratum in &mut self.strata {
            for node in &mut stratum.nodes {
                node.clear_cost();
            }
        }
    }
}
