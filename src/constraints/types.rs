//! Declarative constraint descriptors.
//!
//! These are the wire-level inputs from the configuration collaborator.
//! Nothing here is evaluated directly during the search; the compiler
//! turns each descriptor into a specialized evaluator first.

use crate::records::RawCell;

/// Comparison operator shared by filters, count rules, and
/// applicability conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub(crate) fn compare_usize(self, a: usize, b: usize) -> bool {
        match self {
            Comparison::Eq => a == b,
            Comparison::Ne => a != b,
            Comparison::Lt => a < b,
            Comparison::Le => a <= b,
            Comparison::Gt => a > b,
            Comparison::Ge => a >= b,
        }
    }

    pub(crate) fn compare_f64(self, a: f64, b: f64) -> bool {
        match self {
            Comparison::Eq => a == b,
            Comparison::Ne => a != b,
            Comparison::Lt => a < b,
            Comparison::Le => a <= b,
            Comparison::Gt => a > b,
            Comparison::Ge => a >= b,
        }
    }
}

/// Record filter for Count and Limit constraints.
///
/// `Eq` matches when the cell equals *any* listed value; `Ne` when it
/// differs from all of them. Ordered comparisons are numeric-only and
/// compare against the first value. Missing cells never match.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Filter {
    pub column: usize,
    pub comparison: Comparison,
    pub values: Vec<RawCell>,
}

/// Threshold on the number of filter-satisfying records in a group.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CountRule {
    pub comparison: Comparison,
    pub value: usize,
}

/// Which direction a Limit constraint pushes the satisfying count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LimitBias {
    /// As few satisfying records per group as possible.
    Low,
    /// As many satisfying records per group as possible.
    High,
}

/// Whether a Similarity constraint rewards homogeneous or mixed groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SimilarityBias {
    Similar,
    Different,
}

/// Constraint priority. The fixed magnitudes keep a must-have violation
/// worth more than any number of nice-to-have ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Priority {
    MustHave,
    ShouldHave,
    CouldHave,
    NiceToHave,
}

impl Priority {
    pub fn weight(self) -> f64 {
        match self {
            Priority::MustHave => 1000.0,
            Priority::ShouldHave => 100.0,
            Priority::CouldHave => 10.0,
            Priority::NiceToHave => 1.0,
        }
    }
}

/// Applicability gate: a predicate on node size. When any condition
/// fails for a node, the constraint contributes zero cost there and the
/// pair is left out of satisfaction statistics.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeCondition {
    pub comparison: Comparison,
    pub value: usize,
}

impl SizeCondition {
    pub(crate) fn holds(&self, node_len: usize) -> bool {
        self.comparison.compare_usize(node_len, self.value)
    }
}

/// The three constraint families.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintKind {
    /// The satisfying count per group must meet a threshold.
    Count { filter: Filter, rule: CountRule },

    /// Push the satisfying count per group toward zero or toward the
    /// group size.
    Limit { filter: Filter, bias: LimitBias },

    /// Reward groups whose values in a column are homogeneous (or
    /// mixed).
    Similarity {
        column: usize,
        bias: SimilarityBias,
    },
}

/// One declarative constraint, bound to a stratum by id.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    pub stratum: String,
    pub priority: Priority,
    #[cfg_attr(feature = "serde", serde(default))]
    pub applicability: Vec<SizeCondition>,
    pub kind: ConstraintKind,
}

impl Constraint {
    pub fn new(stratum: impl Into<String>, priority: Priority, kind: ConstraintKind) -> Self {
        Self {
            stratum: stratum.into(),
            priority,
            applicability: Vec::new(),
            kind,
        }
    }

    pub fn when_size(mut self, comparison: Comparison, value: usize) -> Self {
        self.applicability.push(SizeCondition { comparison, value });
        self
    }
}
