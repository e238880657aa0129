//! Shapes one worksheet of a parsed [`Workbook`] into a [`SheetView`].

use std::collections::HashMap;

use crate::cell_ref::resolve_range;
use crate::cell_style::{extract_cell_style, plain_cell_style};
use crate::error::{LogsheetError, Result};
use crate::types::{
    CellAddress, CellStyle, ImageAttachment, MergedRange, SheetRow, SheetView, Workbook, Worksheet,
};

/// Build the view of `sheet_name`, or of the first worksheet when `None`.
///
/// Malformed merge declarations, anchors whose media is missing and unknown
/// style indices are logged and skipped; they never fail the load.
///
/// # Errors
/// [`LogsheetError::SheetNotFound`] when the name is unknown or the workbook
/// has no worksheets.
pub fn load_sheet(workbook: &Workbook, sheet_name: Option<&str>) -> Result<SheetView> {
    let sheet = match sheet_name {
        Some(name) => workbook
            .sheet(name)
            .ok_or_else(|| LogsheetError::SheetNotFound(name.to_string()))?,
        None => workbook
            .first_sheet()
            .ok_or_else(|| LogsheetError::SheetNotFound("<first sheet>".to_string()))?,
    };

    let merges = collect_merges(sheet);
    let images = collect_images(sheet);

    let column_count = sheet.column_count;
    let width = usize::try_from(column_count).unwrap_or(usize::MAX);

    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut styles: HashMap<CellAddress, CellStyle> = HashMap::new();

    for row in &sheet.rows {
        let Some(row_idx) = row.number.checked_sub(1) else {
            log::warn!("sheet {:?}: ignoring row numbered 0", sheet.name);
            continue;
        };

        let texts = visit_row(workbook, row, row_idx, &mut styles);

        if row_idx == 0 {
            headers = texts;
        } else {
            let body_idx = usize::try_from(row_idx - 1).unwrap_or(usize::MAX);
            if rows.len() <= body_idx {
                rows.resize_with(body_idx + 1, Vec::new);
            }
            if let Some(slot) = rows.get_mut(body_idx) {
                *slot = texts;
            }
        }
    }

    for row in &mut rows {
        if row.len() < width {
            row.resize(width, String::new());
        }
    }

    log::debug!(
        "loaded sheet {:?}: {} body rows, {} columns, {} merges, {} images",
        sheet.name,
        rows.len(),
        column_count,
        merges.len(),
        images.len()
    );

    Ok(SheetView {
        sheet_name: sheet.name.clone(),
        headers,
        rows,
        column_count,
        styles,
        merges,
        images,
    })
}

/// Texts of columns 1..=last populated column, gaps included. Records a
/// style for every visited position.
fn visit_row(
    workbook: &Workbook,
    row: &SheetRow,
    row_idx: u32,
    styles: &mut HashMap<CellAddress, CellStyle>,
) -> Vec<String> {
    let last_col = row.last_col();
    let mut texts = Vec::with_capacity(usize::try_from(last_col).unwrap_or_default());
    let mut cells = row.cells.iter().peekable();

    for col in 1..=last_col {
        let cell = cells.next_if(|c| c.col == col);
        let text = cell.map(|c| c.text.clone()).unwrap_or_default();
        let style = cell.map_or_else(plain_cell_style, |c| style_for(workbook, c.style_idx));
        styles.insert(CellAddress::new(row_idx, col - 1), style);
        texts.push(text);

        // duplicate column entries: the first one wins
        while cells.next_if(|c| c.col == col).is_some() {}
    }

    texts
}

fn style_for(workbook: &Workbook, style_idx: Option<u32>) -> CellStyle {
    match workbook.cell_format(style_idx) {
        Some(format) => extract_cell_style(format),
        None => {
            if let Some(idx) = style_idx.filter(|idx| *idx != 0) {
                log::warn!("unknown style index {idx}, rendering without formatting");
            }
            plain_cell_style()
        }
    }
}

fn collect_merges(sheet: &Worksheet) -> Vec<MergedRange> {
    sheet
        .merge_refs
        .iter()
        .filter_map(|reference| match resolve_range(reference) {
            Ok(range) => Some(range),
            Err(err) => {
                log::warn!("sheet {:?}: skipping merge {reference:?}: {err}", sheet.name);
                None
            }
        })
        .collect()
}

fn collect_images(sheet: &Worksheet) -> HashMap<CellAddress, ImageAttachment> {
    let mut images = HashMap::new();
    for anchor in &sheet.images {
        let Some(data) = &anchor.data else {
            log::warn!(
                "sheet {:?}: image {} is missing from the package",
                sheet.name,
                anchor.media_path
            );
            continue;
        };
        // later anchors at the same cell replace earlier ones
        images.insert(
            CellAddress::new(anchor.from_row, anchor.from_col),
            ImageAttachment {
                data: data.clone(),
                extension: anchor.extension.clone(),
            },
        );
    }
    images
}
