use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::cell_ref::{encode_address, resolve_address};

/// Zero-based cell position. (0,0) is the top-left cell of the sheet.
///
/// Serializes as its A1-style reference so it can key JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for CellAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode_address(*self))
    }
}

impl Serialize for CellAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&encode_address(*self))
    }
}

impl<'de> Deserialize<'de> for CellAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let reference = String::deserialize(deserializer)?;
        resolve_address(&reference).map_err(serde::de::Error::custom)
    }
}

/// Inclusive rectangle of cells rendered as one.
///
/// Invariant: `start.row <= end.row` and `start.col <= end.col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergedRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl MergedRange {
    /// Build a range from two corners in any order.
    pub fn from_corners(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    pub fn contains(&self, addr: CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    pub fn is_start(&self, addr: CellAddress) -> bool {
        self.start == addr
    }

    /// Height in cells.
    pub fn row_span(&self) -> u32 {
        self.end.row.saturating_sub(self.start.row) + 1
    }

    /// Width in cells.
    pub fn col_span(&self) -> u32 {
        self.end.col.saturating_sub(self.start.col) + 1
    }
}

/// One populated cell of a worksheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetCell {
    /// 1-based column number.
    pub col: u32,
    /// Display text: formatted numbers, cached formula results, strings as stored.
    pub text: String,
    /// Index into the workbook's cellXfs.
    pub style_idx: Option<u32>,
}

/// A worksheet row as stored in the package.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetRow {
    /// 1-based row number.
    pub number: u32,
    /// Populated cells, ordered by column.
    pub cells: Vec<SheetCell>,
}

impl SheetRow {
    /// Highest populated column number (1-based), or 0 for an empty row.
    pub fn last_col(&self) -> u32 {
        self.cells.iter().map(|c| c.col).max().unwrap_or(0)
    }

    pub fn cell(&self, col: u32) -> Option<&SheetCell> {
        self.cells.iter().find(|c| c.col == col)
    }
}
