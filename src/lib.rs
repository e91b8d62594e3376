//! Hierarchical group assignment via simulated annealing.
//!
//! Distributes a flat set of records into nested groups ("strata" —
//! e.g. teams within tables within rooms) under per-level size bounds
//! and weighted soft constraints (counts, limits, similarity). The
//! search is simulated annealing over a pointer arena: random swap
//! moves, Metropolis acceptance, geometric cooling, and an adaptive
//! round schedule, with a starting temperature calibrated from the
//! problem's own cost landscape.
//!
//! # Architecture
//!
//! - [`records`] / [`interner`]: the immutable record set with derived
//!   column metadata; text cells interned to integers.
//! - [`arena`]: one `3 × N` buffer — working set plus two snapshot
//!   stores — making whole-assignment save/restore a block copy.
//! - [`tree`]: per-stratum group nodes as contiguous windows over the
//!   working set, built bottom-up from size bounds.
//! - [`constraints`] / [`cost`]: declarative constraints compiled into
//!   per-record evaluators; node costs cached and selectively
//!   invalidated.
//! - [`anneal`]: calibration, search rounds, and termination.
//! - [`report`] / [`output`]: human-facing pass/fail scoring and the
//!   exported assignment tree.
//!
//! Ingestion (CSV, type detection), configuration UIs, and transport
//! are external collaborators: this crate starts at loaded rows and
//! ends at an assignment tree plus a satisfaction report.
//!
//! # Example
//!
//! ```
//! use strata_anneal::anneal::AnnealConfig;
//! use strata_anneal::records::{ColumnDescriptor, RawCell};
//! use strata_anneal::tree::{SizeRange, StratumSpec};
//!
//! let columns = vec![ColumnDescriptor::text("name").id()];
//! let rows: Vec<Vec<RawCell>> = (0..6)
//!     .map(|i| vec![RawCell::Text(format!("p{i}"))])
//!     .collect();
//! let strata = [StratumSpec::new("pair", SizeRange::exact(2))];
//! let config = AnnealConfig::default().with_seed(42);
//!
//! let solution = strata_anneal::solve(columns, rows, &strata, &[], &config).unwrap();
//! assert_eq!(solution.tree.children.len(), 3);
//! ```

pub mod anneal;
pub mod arena;
pub mod constraints;
pub mod cost;
pub mod error;
pub mod interner;
pub mod output;
pub mod partition;
pub mod records;
pub mod report;
pub mod solve;
pub mod tree;

pub use error::{Result, SolverError};
pub use solve::{solve, solve_with_cancel, Solution};
