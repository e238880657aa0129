use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::*;

/// A parsed workbook package.
///
/// Held only while a file is active and replaced wholesale by the next load.
#[derive(Debug, Default)]
pub struct Workbook {
    /// Worksheets in workbook order.
    pub sheets: Vec<Worksheet>,
    /// Resolved formatting for each cellXfs entry, indexed by style index.
    pub formats: Vec<CellFormat>,
    /// Theme palette as #RRGGBB, in the order theme color indices address it.
    pub theme_colors: Vec<String>,
    /// Whether the workbook uses the 1904 date system.
    pub date1904: bool,
}

impl Workbook {
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn first_sheet(&self) -> Option<&Worksheet> {
        self.sheets.first()
    }

    /// Formatting for a cell's style index.
    ///
    /// Index 0 is the workbook default and carries no explicit formatting.
    pub fn cell_format(&self, style_idx: Option<u32>) -> Option<&CellFormat> {
        match style_idx {
            None | Some(0) => None,
            Some(idx) => self.formats.get(usize::try_from(idx).ok()?),
        }
    }
}

/// Visibility state of a worksheet tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SheetState {
    #[default]
    Visible,
    Hidden,
    VeryHidden,
}

impl SheetState {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("hidden") => Self::Hidden,
            Some("veryHidden") => Self::VeryHidden,
            _ => Self::Visible,
        }
    }
}

/// One worksheet as read from the package.
#[derive(Debug, Default, Clone)]
pub struct Worksheet {
    pub name: String,
    pub state: SheetState,
    /// Rows in ascending row-number order.
    pub rows: Vec<SheetRow>,
    /// Merge declarations as written, e.g. `"A1:B2"`.
    pub merge_refs: Vec<String>,
    /// Pictures anchored by the sheet's drawing, in document order.
    pub images: Vec<ImageAnchor>,
    /// Highest populated column, styled empty cells included. `<dimension>`
    /// does not contribute.
    pub column_count: u32,
}

/// Immutable snapshot of one worksheet, ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetView {
    pub sheet_name: String,
    /// Texts of row 1.
    pub headers: Vec<String>,
    /// Rows 2..N; `rows[i]` holds sheet row number `i + 2`.
    pub rows: Vec<Vec<String>>,
    pub column_count: u32,
    pub styles: HashMap<CellAddress, CellStyle>,
    pub merges: Vec<MergedRange>,
    pub images: HashMap<CellAddress, ImageAttachment>,
}

impl SheetView {
    /// Text at a zero-based sheet position, with the header row at row 0.
    pub fn text_at(&self, addr: CellAddress) -> Option<&str> {
        let col = usize::try_from(addr.col).ok()?;
        if addr.row == 0 {
            return self.headers.get(col).map(String::as_str);
        }
        let body_row = usize::try_from(addr.row - 1).ok()?;
        self.rows.get(body_row)?.get(col).map(String::as_str)
    }

    pub fn style_at(&self, addr: CellAddress) -> Option<&CellStyle> {
        self.styles.get(&addr)
    }

    /// The merge whose rectangle covers `addr`, if any.
    pub fn merge_at(&self, addr: CellAddress) -> Option<&MergedRange> {
        self.merges.iter().find(|m| m.contains(addr))
    }

    pub fn image_at(&self, addr: CellAddress) -> Option<&ImageAttachment> {
        self.images.get(&addr)
    }
}
