//! The pointer arena.
//!
//! One contiguous `u32` buffer of length `3 × N` holding the active
//! assignment (the *working set*) and two snapshot stores. Saving and
//! restoring the whole assignment is a block copy, which is what makes
//! per-iteration rollback and per-round rollback cheap enough to sit
//! inside the annealing loop.
//!
//! The working set is always a permutation of `0..N`: every record
//! pointer appears exactly once. Group membership is positional — a
//! stratum node is an `(offset, len)` window over this region.

use rand::Rng;

/// `3 × N` buffer: working set, store A, store B.
#[derive(Debug, Clone)]
pub struct PointerArena {
    buf: Vec<u32>,
    n: usize,
}

impl PointerArena {
    /// Creates an arena over `n` records, working set in identity order,
    /// both stores zeroed.
    pub fn new(n: usize) -> Self {
        let mut buf = vec![0u32; n * 3];
        for (i, slot) in buf[..n].iter_mut().enumerate() {
            *slot = i as u32;
        }
        Self { buf, n }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// The live assignment. Windows handed out by stratum nodes alias
    /// this slice.
    pub fn working(&self) -> &[u32] {
        &self.buf[..self.n]
    }

    pub fn working_mut(&mut self) -> &mut [u32] {
        &mut self.buf[..self.n]
    }

    /// Swaps two working-set slots. Both indices must be `< n`.
    pub fn swap(&mut self, i: usize, j: usize) {
        debug_assert!(i < self.n && j < self.n);
        self.buf.swap(i, j);
    }

    /// Fisher–Yates shuffle of the working set only. Run once at setup
    /// so the initial grouping carries no input-order bias.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        for i in (1..self.n).rev() {
            let j = rng.random_range(0..=i);
            self.buf.swap(i, j);
        }
    }

    pub fn save_to_a(&mut self) {
        let n = self.n;
        self.buf.copy_within(0..n, n);
    }

    pub fn save_to_b(&mut self) {
        let n = self.n;
        self.buf.copy_within(0..n, n * 2);
    }

    pub fn load_from_a(&mut self) {
        let n = self.n;
        self.buf.copy_within(n..n * 2, 0);
    }

    pub fn load_from_b(&mut self) {
        let n = self.n;
        self.buf.copy_within(n * 2..n * 3, 0);
    }
}
