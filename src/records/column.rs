//! Column descriptors and derived metadata.

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnType {
    Number,
    Text,
}

/// Caller-declared shape of one column.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnDescriptor {
    /// Human-readable label, echoed in errors and output.
    pub label: String,

    pub column_type: ColumnType,

    /// Whether this column identifies records in the exported tree.
    /// Exactly one column must set this.
    pub is_id: bool,
}

impl ColumnDescriptor {
    pub fn number(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            column_type: ColumnType::Number,
            is_id: false,
        }
    }

    pub fn text(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            column_type: ColumnType::Text,
            is_id: false,
        }
    }

    pub fn id(mut self) -> Self {
        self.is_id = true;
        self
    }
}

/// Metadata derived once over the full record set.
///
/// Similarity constraints need the numeric range (to normalize spread)
/// or the global distinct count; both are fixed after loading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnInfo {
    Number {
        min: f64,
        max: f64,
        /// `max - min`; 0.0 when the column is constant or all missing.
        range: f64,
    },
    Text {
        distinct: usize,
    },
}
