//! Immutable record storage.
//!
//! Rows of numeric or text cells plus per-column metadata (numeric
//! min/max/range, text distinct-value counts) computed once over the
//! full record set. Everything here is read-only for the life of a
//! partition's search; only the pointer arena moves.

mod column;
mod store;

pub use column::{ColumnDescriptor, ColumnInfo, ColumnType};
pub use store::{Cell, RawCell, RecordStore};
