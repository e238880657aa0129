//! Drawing and image anchor parsing
//!
//! Pictures live in `xl/drawings/drawing*.xml`, referenced from the sheet via
//! `xl/worksheets/_rels/sheet*.xml.rels`. Each `twoCellAnchor` or
//! `oneCellAnchor` holds an `xdr:from` marker (0-based column and row) and,
//! for pictures, an `a:blip` whose `r:embed` id resolves through
//! `xl/drawings/_rels/drawing*.xml.rels` to a part in `xl/media/`.
//! Absolute anchors have no cell position and are ignored.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Seek};
use zip::ZipArchive;

use crate::parser::relationships::{parent_dir, read_relationships, rels_path_for, resolve_relative_path};
use crate::types::ImageAnchor;
use crate::xml_helpers::attr_string_local;

/// Picture anchor as written in the drawing part, before media lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPictureAnchor {
    pub from_row: u32,
    pub from_col: u32,
    /// Relationship id from `r:embed`.
    pub embed_id: String,
}

/// Get the drawing part path from the sheet's relationships.
pub fn get_drawing_path<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet_path: &str,
) -> Option<String> {
    let sheet_path = sheet_path.trim_start_matches('/');
    read_relationships(archive, &rels_path_for(sheet_path))
        .into_iter()
        .find(|rel| rel.rel_type.ends_with("/drawing"))
        .map(|rel| resolve_relative_path(parent_dir(sheet_path), &rel.target))
}

/// Map of relationship id to media part path for a drawing.
fn get_image_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    drawing_path: &str,
) -> HashMap<String, String> {
    let base_dir = parent_dir(drawing_path);
    read_relationships(archive, &rels_path_for(drawing_path))
        .into_iter()
        .filter(|rel| rel.rel_type.ends_with("/image") && !rel.id.is_empty())
        .map(|rel| (rel.id, resolve_relative_path(base_dir, &rel.target)))
        .collect()
}

/// Parse the picture anchors of a drawing part in document order.
///
/// Malformed XML ends the scan; anchors read so far are kept.
pub fn parse_picture_anchors<B: BufRead>(reader: B) -> Vec<RawPictureAnchor> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut anchors = Vec::new();
    let mut buf = Vec::new();

    let mut current: Option<RawPictureAnchor> = None;
    let mut has_picture = false;
    let mut in_from = false;
    let mut marker_field: Option<&'static str> = None;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"twoCellAnchor" | b"oneCellAnchor" => {
                    current = Some(RawPictureAnchor::default());
                    has_picture = false;
                }
                b"from" if current.is_some() => in_from = true,
                b"col" if in_from => marker_field = Some("col"),
                b"row" if in_from => marker_field = Some("row"),
                b"pic" => has_picture = true,
                b"blip" if has_picture => {
                    if let (Some(anchor), Some(embed)) =
                        (current.as_mut(), attr_string_local(e, b"embed"))
                    {
                        anchor.embed_id = embed;
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref t)) => {
                if let (Some(field), Some(anchor)) = (marker_field, current.as_mut()) {
                    let value = t
                        .unescape()
                        .ok()
                        .and_then(|s| s.trim().parse::<u32>().ok())
                        .unwrap_or(0);
                    if field == "col" {
                        anchor.from_col = value;
                    } else {
                        anchor.from_row = value;
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"from" => in_from = false,
                b"col" | b"row" => marker_field = None,
                b"twoCellAnchor" | b"oneCellAnchor" => {
                    if let Some(anchor) = current.take() {
                        if has_picture && !anchor.embed_id.is_empty() {
                            anchors.push(anchor);
                        }
                    }
                    has_picture = false;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => {
                log::warn!("drawing part is malformed, keeping {} anchors: {err}", anchors.len());
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    anchors
}

/// Read a media part. Returns `None` when the part is absent or unreadable.
pub fn read_media<R: Read + Seek>(archive: &mut ZipArchive<R>, media_path: &str) -> Option<Vec<u8>> {
    let mut file = archive.by_name(media_path.trim_start_matches('/')).ok()?;
    let mut data = Vec::new();
    file.read_to_end(&mut data).ok()?;
    Some(data)
}

/// Extension of a part name, lowercased, e.g. "png" for "xl/media/image1.PNG".
pub fn media_extension(media_path: &str) -> String {
    let file_name = media_path.rsplit('/').next().unwrap_or(media_path);
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Collect the image anchors of a worksheet with their media bytes.
///
/// Anchors whose relationship id cannot be resolved are dropped with a
/// warning. Anchors whose media part is absent are kept with `data: None`.
pub fn sheet_images<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet_path: &str,
) -> Vec<ImageAnchor> {
    let Some(drawing_path) = get_drawing_path(archive, sheet_path) else {
        return Vec::new();
    };

    let image_rels = get_image_relationships(archive, &drawing_path);
    let raw_anchors = match archive.by_name(&drawing_path) {
        Ok(file) => parse_picture_anchors(BufReader::new(file)),
        Err(err) => {
            log::warn!("drawing {drawing_path} referenced by {sheet_path} is unreadable: {err}");
            return Vec::new();
        }
    };

    let mut images = Vec::with_capacity(raw_anchors.len());
    for anchor in raw_anchors {
        let Some(media_path) = image_rels.get(&anchor.embed_id) else {
            log::warn!(
                "picture at row {} col {} in {drawing_path} references unknown relationship {}",
                anchor.from_row,
                anchor.from_col,
                anchor.embed_id
            );
            continue;
        };
        images.push(ImageAnchor {
            from_row: anchor.from_row,
            from_col: anchor.from_col,
            media_path: media_path.clone(),
            data: read_media(archive, media_path),
            extension: media_extension(media_path),
        });
    }

    log::debug!("{sheet_path}: {} image anchors", images.len());
    images
}
