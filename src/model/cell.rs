//! Cell value and kind

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a cell's value for display and aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    #[default]
    Text,
    Number,
    Currency,
}

impl CellKind {
    pub fn all() -> Vec<CellKind> {
        vec![CellKind::Text, CellKind::Number, CellKind::Currency]
    }

    pub fn name(&self) -> &str {
        match self {
            CellKind::Text => "text",
            CellKind::Number => "number",
            CellKind::Currency => "currency",
        }
    }

    /// Short marker shown next to a cell in the grid
    pub fn marker(&self) -> &str {
        match self {
            CellKind::Text => "T",
            CellKind::Number => "#",
            CellKind::Currency => "$",
        }
    }

    /// Next kind in the text -> number -> currency cycle
    pub fn cycle(&self) -> CellKind {
        match self {
            CellKind::Text => CellKind::Number,
            CellKind::Number => CellKind::Currency,
            CellKind::Currency => CellKind::Text,
        }
    }

    /// Whether cells of this kind take part in column totals
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellKind::Number | CellKind::Currency)
    }

    /// Parse a kind name, ignoring case and surrounding whitespace
    pub fn parse(name: &str) -> Option<CellKind> {
        let name = name.trim();
        CellKind::all()
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single grid cell. The value is always kept as the raw typed text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub value: String,
    pub kind: CellKind,
}

impl Cell {
    pub fn new(value: impl Into<String>, kind: CellKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(value, CellKind::Text)
    }
}
