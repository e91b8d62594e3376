//! Neighbor generation.
//!
//! The primary move swaps one record pointer between two nodes of the
//! same stratum, leaving every window size untouched — the working set
//! stays a permutation by construction. Move kinds are picked by a
//! weighted roulette draw so alternative moves can be mixed in without
//! changing the loop.

use rand::Rng;

use crate::arena::PointerArena;
use crate::tree::GroupTree;

/// The available neighbor moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Swap one pointer between two nodes of the same stratum.
    Swap,
    /// Explicit no-op.
    Stay,
}

/// Probability weights over [`MoveKind`]. Default mass sits entirely on
/// `Swap`; `Stay` exists for callers that want occasional idle steps.
#[derive(Debug, Clone, Copy)]
pub struct MoveTable {
    pub swap: f64,
    pub stay: f64,
}

impl Default for MoveTable {
    fn default() -> Self {
        Self {
            swap: 1.0,
            stay: 0.0,
        }
    }
}

impl MoveTable {
    /// Roulette draw over the kind weights.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> MoveKind {
        let total = self.swap + self.stay;
        if total <= 0.0 {
            return MoveKind::Stay;
        }
        let roll = rng.random_range(0.0..total);
        if roll < self.swap {
            MoveKind::Swap
        } else {
            MoveKind::Stay
        }
    }
}

/// Applies one move. Returns the two changed working-set indices, or
/// `None` when nothing moved (a `Stay`, or a degenerate stratum).
pub fn apply<R: Rng>(
    kind: MoveKind,
    tree: &GroupTree,
    arena: &mut PointerArena,
    rng: &mut R,
) -> Option<(usize, usize)> {
    match kind {
        MoveKind::Swap => swap_between_nodes(tree, arena, rng),
        MoveKind::Stay => None,
    }
}

/// Swaps one random pointer between two distinct random nodes of a
/// random stratum.
///
/// The second node sits at a nonzero circular offset from the first, so
/// the pair is distinct without rejection sampling. A stratum with
/// fewer than two nodes cannot host a swap and yields a no-op, letting
/// the search proceed at other strata.
pub fn swap_between_nodes<R: Rng>(
    tree: &GroupTree,
    arena: &mut PointerArena,
    rng: &mut R,
) -> Option<(usize, usize)> {
    let stratum = &tree.strata()[rng.random_range(0..tree.strata().len())];
    let groups = stratum.nodes.len();
    if groups < 2 {
        return None;
    }

    let a = rng.random_range(0..groups);
    let b = (a + rng.random_range(1..groups)) % groups;
    let node_a = &stratum.nodes[a];
    let node_b = &stratum.nodes[b];

    let i = node_a.offset() + rng.random_range(0..node_a.len());
    let j = node_b.offset() + rng.random_range(0..node_b.len());
    arena.swap(i, j);
    Some((i, j))
}
