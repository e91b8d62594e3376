//! Strata: named levels of the group hierarchy.

use crate::error::{Result, SolverError};

use super::node::StratumNode;

/// User-declared group-size bounds for one stratum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeRange {
    pub min: usize,
    pub ideal: usize,
    pub max: usize,
}

impl SizeRange {
    pub fn new(min: usize, ideal: usize, max: usize) -> Self {
        Self { min, ideal, max }
    }

    /// Exact size: groups of precisely `n`.
    pub fn exact(n: usize) -> Self {
        Self {
            min: n,
            ideal: n,
            max: n,
        }
    }

    pub(crate) fn validate(&self, stratum: &str) -> Result<()> {
        if self.min == 0 || self.min > self.ideal || self.ideal > self.max {
            return Err(SolverError::InvalidSizeRange {
                stratum: stratum.to_owned(),
                min: self.min,
                ideal: self.ideal,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// One entry of the leaf-to-root stratum declaration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StratumSpec {
    pub id: String,
    pub size: SizeRange,
}

impl StratumSpec {
    pub fn new(id: impl Into<String>, size: SizeRange) -> Self {
        Self {
            id: id.into(),
            size,
        }
    }
}

/// A built stratum: its declaration plus the ordered node windows.
///
/// Windows are disjoint, ordered, and contiguous; together they span
/// `[0, N)`, so any working-set index belongs to exactly one node.
#[derive(Debug, Clone)]
pub struct Stratum {
    pub id: String,
    pub size: SizeRange,
    pub nodes: Vec<StratumNode>,
}

impl Stratum {
    /// Index of the node whose window contains `index`.
    ///
    /// Binary search over the ordered windows; used to route cache
    /// invalidation after a mutation.
    pub fn locate(&self, index: usize) -> Option<usize> {
        let found = self
            .nodes
            .partition_point(|node| node.offset() + node.len() <= index);
        self.nodes
            .get(found)
            .filter(|node| node.contains(index))
            .map(|_| found)
    }
}
