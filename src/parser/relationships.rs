//! Relationship parsing - workbook relationships, sheet list, shared strings, theme, stylesheet.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::color::{normalize_argb, DEFAULT_THEME_COLORS};
use crate::error::{LogsheetError, Result};
use crate::styles::parse_styles;
use crate::types::{SheetState, StyleSheet};
use crate::xml_helpers::{attr_string, attr_string_local, attr_val};

use super::worksheet::SheetInfo;

/// One `<Relationship>` entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub target: String,
    pub rel_type: String,
}

/// Workbook relationships parsed from xl/_rels/workbook.xml.rels
///
/// Paths are resolved relative to the xl/ directory and stored as full paths.
#[derive(Default, Debug)]
pub(super) struct WorkbookRelationships {
    /// rId -> full path, e.g. "rId1" -> "xl/worksheets/sheet1.xml"
    pub worksheets: HashMap<String, String>,
    pub shared_strings: Option<String>,
    pub styles: Option<String>,
    pub theme: Option<String>,
}

/// Read every relationship in a `.rels` part. A missing part yields no entries.
pub(crate) fn read_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    rels_path: &str,
) -> Vec<Relationship> {
    let Ok(file) = archive.by_name(rels_path) else {
        return Vec::new();
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut rels = Vec::new();
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e) | Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let id = attr_string(e, b"Id").unwrap_or_default();
                    let target = attr_string(e, b"Target").unwrap_or_default();
                    let rel_type = attr_string(e, b"Type").unwrap_or_default();
                    if !target.is_empty() {
                        rels.push(Relationship {
                            id,
                            target,
                            rel_type,
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                log::warn!("skipping rest of {rels_path}: {err}");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    rels
}

/// Path of the relationships part that belongs to `file_path`,
/// e.g. "xl/drawings/drawing1.xml" -> "xl/drawings/_rels/drawing1.xml.rels"
pub(crate) fn rels_path_for(file_path: &str) -> String {
    match file_path.rsplit_once('/') {
        Some((dir, filename)) => format!("{dir}/_rels/{filename}.rels"),
        None => format!("_rels/{file_path}.rels"),
    }
}

/// Resolve a relationship target against the directory of its source part.
///
/// Handles targets like "../media/image1.png" relative to "xl/drawings".
pub(crate) fn resolve_relative_path(base_dir: &str, relative: &str) -> String {
    if let Some(stripped) = relative.strip_prefix('/') {
        return stripped.to_string();
    }

    let mut components: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for part in relative.split('/') {
        match part {
            ".." => {
                components.pop();
            }
            "." | "" => {}
            _ => components.push(part),
        }
    }
    components.join("/")
}

/// Directory portion of a package path ("" for top-level parts).
pub(crate) fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Parse workbook relationships from xl/_rels/workbook.xml.rels
pub(super) fn parse_workbook_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> WorkbookRelationships {
    let mut rels = WorkbookRelationships::default();

    for rel in read_relationships(archive, "xl/_rels/workbook.xml.rels") {
        let full_path = resolve_relative_path("xl", &rel.target);

        if rel.rel_type.ends_with("/worksheet") && !rel.id.is_empty() {
            rels.worksheets.insert(rel.id, full_path);
        } else if rel.rel_type.ends_with("/sharedStrings") {
            rels.shared_strings = Some(full_path);
        } else if rel.rel_type.ends_with("/styles") {
            rels.styles = Some(full_path);
        } else if rel.rel_type.ends_with("/theme") {
            rels.theme = Some(full_path);
        }
    }

    rels
}

/// Get sheet names, paths and states from xl/workbook.xml, plus the date1904 flag.
///
/// # Errors
/// [`LogsheetError::MissingPart`] when the package has no workbook part, or an
/// XML error when it is malformed.
pub(super) fn get_sheet_info<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    relationships: &HashMap<String, String>,
) -> Result<(Vec<SheetInfo>, bool)> {
    let file = match archive.by_name("xl/workbook.xml") {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => {
            return Err(LogsheetError::MissingPart("xl/workbook.xml".to_string()))
        }
        Err(err) => return Err(err.into()),
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut sheets = Vec::new();
    let mut date1904 = false;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) => match e.local_name().as_ref() {
                b"workbookPr" => {
                    date1904 = attr_string(e, b"date1904")
                        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
                }
                b"sheet" => {
                    if let Some(name) = attr_string(e, b"name").filter(|n| !n.is_empty()) {
                        let state = SheetState::from_attr(attr_string(e, b"state").as_deref());
                        let r_id = attr_string_local(e, b"id").unwrap_or_default();

                        // fall back to the conventional part name
                        let path = relationships.get(&r_id).cloned().unwrap_or_else(|| {
                            let idx = sheets.len() + 1;
                            format!("xl/worksheets/sheet{idx}.xml")
                        });
                        sheets.push(SheetInfo { name, path, state });
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((sheets, date1904))
}

/// Parse the theme color scheme into a palette addressed by theme color index.
///
/// Index order: lt1, dk1, lt2, dk2, accent1-6, hlink, folHlink. Colors the
/// theme does not define keep the Office defaults.
pub(super) fn parse_theme<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Vec<String> {
    let mut colors: Vec<String> = DEFAULT_THEME_COLORS
        .iter()
        .map(ToString::to_string)
        .collect();

    let theme_path = path.unwrap_or("xl/theme/theme1.xml");
    let Ok(file) = archive.by_name(theme_path) else {
        return colors;
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let color_elements: [&[u8]; 12] = [
        b"lt1", b"dk1", b"lt2", b"dk2", b"accent1", b"accent2", b"accent3", b"accent4",
        b"accent5", b"accent6", b"hlink", b"folHlink",
    ];

    let mut buf = Vec::new();
    let mut in_clr_scheme = false;
    let mut color_index: Option<usize> = None;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => {
                let local_name = e.local_name();
                let name = local_name.as_ref();

                if name == b"clrScheme" {
                    in_clr_scheme = true;
                } else if in_clr_scheme {
                    if let Some(idx) = color_elements.iter().position(|n| *n == name) {
                        color_index = Some(idx);
                    } else if name == b"srgbClr" || name == b"sysClr" {
                        let value = if name == b"sysClr" {
                            attr_string(e, b"lastClr").or_else(|| attr_val(e))
                        } else {
                            attr_val(e)
                        };
                        if let (Some(idx), Some(color)) =
                            (color_index, value.as_deref().and_then(normalize_argb))
                        {
                            if let Some(slot) = colors.get_mut(idx) {
                                *slot = color;
                            }
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name = e.local_name();
                if local_name.as_ref() == b"clrScheme" {
                    in_clr_scheme = false;
                } else if color_elements.contains(&local_name.as_ref()) {
                    color_index = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                log::warn!("theme part is malformed, keeping default palette: {err}");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    colors
}

/// Parse the shared string table. Rich text runs are concatenated; phonetic
/// runs are left out.
pub(super) fn parse_shared_strings<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Vec<String> {
    let sst_path = path.unwrap_or("xl/sharedStrings.xml");
    let Ok(file) = archive.by_name(sst_path) else {
        return Vec::new();
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current_string = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current_string.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_si && !in_phonetic => in_t = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                // <si/> still occupies an index
                if e.local_name().as_ref() == b"si" {
                    strings.push(String::new());
                }
            }
            Ok(Event::Text(ref e)) if in_t => {
                if let Ok(text) = e.unescape() {
                    current_string.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(std::mem::take(&mut current_string));
                    in_si = false;
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => {
                log::warn!("shared string table truncated at entry {}: {err}", strings.len());
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    strings
}

/// Parse stylesheet from styles file
pub(super) fn parse_stylesheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Result<StyleSheet> {
    let styles_path = path.unwrap_or("xl/styles.xml");
    let Ok(file) = archive.by_name(styles_path) else {
        return Ok(StyleSheet::default());
    };

    let reader = BufReader::new(file);
    parse_styles(reader)
}
