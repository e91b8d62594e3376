//! The record store.

use std::collections::HashSet;

use crate::error::{Result, SolverError};
use crate::interner::StringInterner;

use super::column::{ColumnDescriptor, ColumnInfo, ColumnType};

/// A cell as supplied by the ingestion collaborator, before interning.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawCell {
    Number(f64),
    Text(String),
    Missing,
}

/// A stored cell. Text carries an interned pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(u32),
    Missing,
}

/// Immutable row-oriented record set with per-column metadata.
///
/// Records are addressed by their *record pointer*: the zero-based
/// position in the original input. Pointers never change; only their
/// location in the [`PointerArena`](crate::arena::PointerArena) does.
#[derive(Debug, Clone)]
pub struct RecordStore {
    columns: Vec<ColumnDescriptor>,
    info: Vec<ColumnInfo>,
    rows: Vec<Vec<Cell>>,
    id_column: usize,
}

impl RecordStore {
    /// Validates, interns, and loads a record set.
    ///
    /// Fails on an empty set, ragged rows, cells that contradict their
    /// column's declared type, or anything other than exactly one
    /// identifier column.
    pub fn from_rows(
        columns: Vec<ColumnDescriptor>,
        raw_rows: Vec<Vec<RawCell>>,
        interner: &mut StringInterner,
    ) -> Result<Self> {
        if raw_rows.is_empty() {
            return Err(SolverError::EmptyRecordSet);
        }

        let id_column = {
            let mut ids = columns.iter().enumerate().filter(|(_, c)| c.is_id);
            let first = ids.next().ok_or(SolverError::NoIdColumn)?.0;
            if ids.next().is_some() {
                return Err(SolverError::MultipleIdColumns);
            }
            first
        };

        let width = columns.len();
        let mut rows = Vec::with_capacity(raw_rows.len());
        for (r, raw) in raw_rows.into_iter().enumerate() {
            if raw.len() != width {
                return Err(SolverError::RowWidth {
                    row: r,
                    expected: width,
                    got: raw.len(),
                });
            }
            let mut row = Vec::with_capacity(width);
            for (c, cell) in raw.into_iter().enumerate() {
                let stored = match (cell, columns[c].column_type) {
                    (RawCell::Number(v), ColumnType::Number) => Cell::Number(v),
                    (RawCell::Text(s), ColumnType::Text) => Cell::Text(interner.intern(&s)),
                    (RawCell::Missing, _) => Cell::Missing,
                    (RawCell::Number(_), ColumnType::Text) => {
                        return Err(SolverError::CellType {
                            row: r,
                            column: c,
                            expected: "text",
                        })
                    }
                    (RawCell::Text(_), ColumnType::Number) => {
                        return Err(SolverError::CellType {
                            row: r,
                            column: c,
                            expected: "number",
                        })
                    }
                };
                row.push(stored);
            }
            rows.push(row);
        }

        let info = compute_column_info(&columns, &rows);

        Ok(Self {
            columns,
            info,
            rows,
            id_column,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    pub fn column_info(&self, index: usize) -> Option<&ColumnInfo> {
        self.info.get(index)
    }

    pub fn cell(&self, record: usize, column: usize) -> Cell {
        self.rows[record][column]
    }

    /// Renders the identifier cell of a record for the exported tree.
    ///
    /// Integral numbers render without a fractional part so ids like
    /// `42` survive the f64 round trip unchanged.
    pub fn id_of(&self, record: usize, interner: &StringInterner) -> String {
        match self.rows[record][self.id_column] {
            Cell::Number(v) if v.fract() == 0.0 && v.is_finite() => format!("{}", v as i64),
            Cell::Number(v) => format!("{v}"),
            Cell::Text(ptr) => interner.resolve(ptr).unwrap_or_default().to_owned(),
            Cell::Missing => String::new(),
        }
    }
}

fn compute_column_info(columns: &[ColumnDescriptor], rows: &[Vec<Cell>]) -> Vec<ColumnInfo> {
    columns
        .iter()
        .enumerate()
        .map(|(c, desc)| match desc.column_type {
            ColumnType::Number => {
                let mut min = f64::INFINITY;
                let mut max = f64::NEG_INFINITY;
                let mut seen = false;
                for row in rows {
                    if let Cell::Number(v) = row[c] {
                        min = min.min(v);
                        max = max.max(v);
                        seen = true;
                    }
                }
                if !seen {
                    ColumnInfo::Number {
                        min: 0.0,
                        max: 0.0,
                        range: 0.0,
                    }
                } else {
                    ColumnInfo::Number {
                        min,
                        max,
                        range: max - min,
                    }
                }
            }
            ColumnType::Text => {
                let distinct: HashSet<u32> = rows
                    .iter()
                    .filter_map(|row| match row[c] {
                        Cell::Text(ptr) => Some(ptr),
                        _ => None,
                    })
                    .collect();
                ColumnInfo::Text {
                    distinct: distinct.len(),
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::text("name").id(),
            ColumnDescriptor::number("age"),
            ColumnDescriptor::text("team"),
        ]
    }

    fn row(name: &str, age: f64, team: &str) -> Vec<RawCell> {
        vec![
            RawCell::Text(name.into()),
            RawCell::Number(age),
            RawCell::Text(team.into()),
        ]
    }

    #[test]
    fn test_load_and_metadata() {
        let mut interner = StringInterner::new();
        let store = RecordStore::from_rows(
            columns(),
            vec![
                row("ann", 30.0, "red"),
                row("bob", 40.0, "blue"),
                row("cyd", 35.0, "red"),
            ],
            &mut interner,
        )
        .unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(
            store.column_info(1),
            Some(&ColumnInfo::Number {
                min: 30.0,
                max: 40.0,
                range: 10.0
            })
        );
        assert_eq!(store.column_info(2), Some(&ColumnInfo::Text { distinct: 2 }));
        assert_eq!(store.id_of(1, &interner), "bob");
    }

    #[test]
    fn test_ragged_row_rejected() {
        let mut interner = StringInterner::new();
        let err = RecordStore::from_rows(
            columns(),
            vec![vec![RawCell::Text("ann".into())]],
            &mut interner,
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::RowWidth { row: 0, .. }));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut interner = StringInterner::new();
        let err = RecordStore::from_rows(
            columns(),
            vec![vec![
                RawCell::Text("ann".into()),
                RawCell::Text("not a number".into()),
                RawCell::Text("red".into()),
            ]],
            &mut interner,
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::CellType { column: 1, .. }));
    }

    #[test]
    fn test_exactly_one_id_column() {
        let mut interner = StringInterner::new();
        let no_id = vec![ColumnDescriptor::text("name")];
        let err = RecordStore::from_rows(
            no_id,
            vec![vec![RawCell::Text("ann".into())]],
            &mut interner,
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::NoIdColumn));

        let two_ids = vec![
            ColumnDescriptor::text("a").id(),
            ColumnDescriptor::text("b").id(),
        ];
        let err = RecordStore::from_rows(
            two_ids,
            vec![vec![RawCell::Text("x".into()), RawCell::Text("y".into())]],
            &mut interner,
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::MultipleIdColumns));
    }

    #[test]
    fn test_missing_cells_skip_metadata() {
        let mut interner = StringInterner::new();
        let store = RecordStore::from_rows(
            columns(),
            vec![
                row("ann", 30.0, "red"),
                vec![
                    RawCell::Text("bob".into()),
                    RawCell::Missing,
                    RawCell::Missing,
                ],
            ],
            &mut interner,
        )
        .unwrap();

        assert_eq!(
            store.column_info(1),
            Some(&ColumnInfo::Number {
                min: 30.0,
                max: 30.0,
                range: 0.0
            })
        );
        assert_eq!(store.column_info(2), Some(&ColumnInfo::Text { distinct: 1 }));
    }

    #[test]
    fn test_numeric_id_renders_without_fraction() {
        let mut interner = StringInterner::new();
        let cols = vec![ColumnDescriptor::number("id").id()];
        let store = RecordStore::from_rows(
            cols,
            vec![vec![RawCell::Number(42.0)], vec![RawCell::Number(7.5)]],
            &mut interner,
        )
        .unwrap();
        assert_eq!(store.id_of(0, &interner), "42");
        assert_eq!(store.id_of(1, &interner), "7.5");
    }
}
