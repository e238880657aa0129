//! Main XLSX parser
//!
//! Orchestrates the parsing of all components from the ZIP archive.

pub(crate) mod relationships;
pub(crate) mod styles;
mod worksheet;

use std::io::Cursor;
use zip::ZipArchive;

use crate::drawings::sheet_images;
use crate::error::Result;
use crate::types::{CellFormat, Workbook};

use relationships::{
    get_sheet_info, parse_shared_strings, parse_stylesheet, parse_theme,
    parse_workbook_relationships,
};
use styles::resolve_cell_format;
use worksheet::{parse_sheet, SheetContext};

/// Parse an XLSX file from bytes.
///
/// # Errors
/// Fails when the bytes are not a zip archive, when `xl/workbook.xml` or a
/// sheet part it lists is missing, or when one of those parts is malformed.
/// Optional parts (theme, shared strings, styles, drawings) degrade to
/// defaults.
pub fn parse(data: &[u8]) -> Result<Workbook> {
    let cursor = Cursor::new(data);
    let mut archive = ZipArchive::new(cursor)?;

    // Parse workbook relationships first to get actual file paths
    let relationships = parse_workbook_relationships(&mut archive);

    let theme_colors = parse_theme(&mut archive, relationships.theme.as_deref());
    let shared_strings =
        parse_shared_strings(&mut archive, relationships.shared_strings.as_deref());
    let stylesheet = parse_stylesheet(&mut archive, relationships.styles.as_deref())?;

    let (sheet_info, date1904) = get_sheet_info(&mut archive, &relationships.worksheets)?;
    log::debug!(
        "workbook: {} sheets, {} shared strings, {} cell formats",
        sheet_info.len(),
        shared_strings.len(),
        stylesheet.cell_xfs.len()
    );

    let formats: Vec<CellFormat> = stylesheet
        .cell_xfs
        .iter()
        .map(|xf| resolve_cell_format(xf, &stylesheet, &theme_colors))
        .collect();

    let ctx = SheetContext {
        shared_strings: &shared_strings,
        stylesheet: &stylesheet,
        date1904,
    };

    let mut sheets = Vec::with_capacity(sheet_info.len());
    for info in &sheet_info {
        let mut sheet = parse_sheet(&mut archive, info, &ctx)?;
        sheet.images = sheet_images(&mut archive, &info.path);
        log::debug!(
            "sheet {:?}: {} rows, {} columns, {} merges, {} images",
            sheet.name,
            sheet.rows.len(),
            sheet.column_count,
            sheet.merge_refs.len(),
            sheet.images.len()
        );
        sheets.push(sheet);
    }

    Ok(Workbook {
        sheets,
        formats,
        theme_colors,
        date1904,
    })
}
