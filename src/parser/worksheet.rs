//! Worksheet parsing - reads one sheet part into a [`Worksheet`].

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufRead, BufReader, Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::cell_ref::resolve_address;
use crate::error::{LogsheetError, Result};
use crate::types::{SheetCell, SheetRow, SheetState, StyleSheet, Worksheet};
use crate::xml_helpers::attr_string;

use super::styles::resolve_cell_value;

/// Sheet metadata from workbook.xml
#[derive(Debug, Clone)]
pub(super) struct SheetInfo {
    pub name: String,
    pub path: String,
    pub state: SheetState,
}

/// Workbook-level data every sheet needs to turn raw values into text.
pub(super) struct SheetContext<'a> {
    pub shared_strings: &'a [String],
    pub stylesheet: &'a StyleSheet,
    pub date1904: bool,
}

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    Default,
}

pub(super) fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"b" => CellTypeTag::Bool,
        b"e" => CellTypeTag::Error,
        b"str" => CellTypeTag::Str,
        b"inlineStr" => CellTypeTag::Inline,
        _ => CellTypeTag::Default,
    }
}

pub(super) fn parse_u32_bytes(value: &[u8]) -> Option<u32> {
    let mut num: u32 = 0;
    let mut seen = false;
    for &b in value {
        if !b.is_ascii_digit() {
            return None;
        }
        seen = true;
        num = num.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }
    seen.then_some(num)
}

/// Parse a single worksheet part from the package.
///
/// # Errors
/// [`LogsheetError::MissingPart`] when the sheet part is absent, or an XML
/// error when it is malformed.
pub(super) fn parse_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    info: &SheetInfo,
    ctx: &SheetContext<'_>,
) -> Result<Worksheet> {
    let file = match archive.by_name(&info.path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Err(LogsheetError::MissingPart(info.path.clone())),
        Err(err) => return Err(err.into()),
    };

    let mut sheet = parse_sheet_xml(BufReader::new(file), ctx)?;
    sheet.name.clone_from(&info.name);
    sheet.state = info.state;
    Ok(sheet)
}

/// Parse worksheet XML. Name and state are left for the caller to fill in.
#[allow(clippy::too_many_lines)]
pub(super) fn parse_sheet_xml<B: BufRead>(reader: B, ctx: &SheetContext<'_>) -> Result<Worksheet> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut sheet = Worksheet::default();

    let mut buf = Vec::new();
    let mut cell_buf = Vec::new();
    let mut current_row: Option<SheetRow> = None;
    let mut last_row_number: u32 = 0;

    loop {
        match xml.read_event_into(&mut buf)? {
            ref event @ (Event::Start(ref e) | Event::Empty(ref e)) => {
                let is_start_event = matches!(event, Event::Start(_));

                match e.local_name().as_ref() {
                    b"row" => {
                        if let Some(row) = current_row.take() {
                            sheet.rows.push(row);
                        }
                        let number = attr_string(e, b"r")
                            .and_then(|r| parse_u32_bytes(r.as_bytes()))
                            .unwrap_or(last_row_number.saturating_add(1));
                        last_row_number = number;
                        let row = SheetRow {
                            number,
                            cells: Vec::new(),
                        };
                        if is_start_event {
                            current_row = Some(row);
                        } else {
                            sheet.rows.push(row);
                        }
                    }

                    b"c" => {
                        let mut col: Option<u32> = None;
                        let mut cell_type = CellTypeTag::Default;
                        let mut style_idx: Option<u32> = None;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    let reference = String::from_utf8_lossy(&attr.value);
                                    match resolve_address(&reference) {
                                        Ok(addr) => col = Some(addr.col.saturating_add(1)),
                                        Err(err) => log::warn!("cell without usable reference: {err}"),
                                    }
                                }
                                b"t" => cell_type = parse_cell_type_tag(&attr.value),
                                b"s" => style_idx = parse_u32_bytes(&attr.value),
                                _ => {}
                            }
                        }

                        let value = if is_start_event {
                            read_cell_value(&mut xml, &mut cell_buf)?
                        } else {
                            None
                        };

                        let row = current_row.get_or_insert_with(|| {
                            last_row_number = last_row_number.saturating_add(1);
                            SheetRow {
                                number: last_row_number,
                                cells: Vec::new(),
                            }
                        });
                        let col = col.unwrap_or_else(|| row.last_col().saturating_add(1));
                        let text = resolve_cell_value(value.as_deref(), cell_type, style_idx, ctx);
                        row.cells.push(SheetCell {
                            col,
                            text,
                            style_idx,
                        });
                    }

                    b"mergeCell" => {
                        if let Some(reference) = attr_string(e, b"ref") {
                            sheet.merge_refs.push(reference);
                        }
                    }

                    _ => {}
                }
            }

            Event::End(ref e) => {
                if e.local_name().as_ref() == b"row" {
                    if let Some(row) = current_row.take() {
                        sheet.rows.push(row);
                    }
                }
            }

            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(row) = current_row.take() {
        sheet.rows.push(row);
    }

    sheet.rows.sort_by_key(|row| row.number);
    for row in &mut sheet.rows {
        row.cells.sort_by_key(|cell| cell.col);
    }

    // only written cells count, `<dimension>` is not consulted
    sheet.column_count = sheet.rows.iter().map(SheetRow::last_col).max().unwrap_or(0);

    Ok(sheet)
}

/// Read the children of a `<c>` element up to its end tag and return the raw
/// value: `<v>` for stored values, the concatenated `<t>` runs of `<is>` for
/// inline strings. The formula text in `<f>` is skipped.
fn read_cell_value<B: BufRead>(xml: &mut Reader<B>, buf: &mut Vec<u8>) -> Result<Option<String>> {
    let mut value: Option<String> = None;
    let mut in_value = false;
    let mut in_inline = false;
    let mut in_phonetic = false;

    loop {
        buf.clear();
        match xml.read_event_into(buf)? {
            Event::Start(ref inner) => match inner.local_name().as_ref() {
                b"v" => in_value = true,
                b"is" => in_inline = true,
                b"rPh" => in_phonetic = true,
                b"t" if in_inline && !in_phonetic => {
                    in_value = true;
                    value.get_or_insert_with(String::new);
                }
                _ => {}
            },
            Event::Text(ref text) if in_value => {
                let text = text.unescape()?;
                value.get_or_insert_with(String::new).push_str(&text);
            }
            Event::End(ref inner) => match inner.local_name().as_ref() {
                b"c" => break,
                b"v" | b"t" => in_value = false,
                b"is" => in_inline = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(value)
}
