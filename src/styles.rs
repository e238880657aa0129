//! Parsing of xl/styles.xml
//!
//! Reads the parts of the stylesheet a rendered cell depends on: fonts, fills,
//! borders, cell formats (`cellXfs`), custom number formats and the optional
//! indexed color palette.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::BufRead;

use crate::color::normalize_argb;
use crate::error::Result;
use crate::types::{
    CellXf, RawAlignment, RawBorder, RawBorderSide, RawFill, RawFont, StyleSheet,
};
use crate::xml_helpers::{attr_f64, attr_string, attr_u32, attr_val, parse_color_attrs, toggle_val};

/// Which border edge the parser is currently inside.
#[derive(Clone, Copy)]
enum BorderEdge {
    Left,
    Right,
    Top,
    Bottom,
    Other,
}

impl BorderEdge {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"left" | b"start" => Some(Self::Left),
            b"right" | b"end" => Some(Self::Right),
            b"top" => Some(Self::Top),
            b"bottom" => Some(Self::Bottom),
            b"diagonal" | b"vertical" | b"horizontal" => Some(Self::Other),
            _ => None,
        }
    }

    fn slot(self, border: &mut RawBorder) -> Option<&mut Option<RawBorderSide>> {
        match self {
            Self::Left => Some(&mut border.left),
            Self::Right => Some(&mut border.right),
            Self::Top => Some(&mut border.top),
            Self::Bottom => Some(&mut border.bottom),
            Self::Other => None,
        }
    }
}

/// Parse styles.xml content
///
/// # Errors
/// Returns an error only for malformed XML; unknown elements are ignored.
#[allow(clippy::too_many_lines)]
pub fn parse_styles<R: BufRead>(reader: R) -> Result<StyleSheet> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut stylesheet = StyleSheet::default();
    let mut buf = Vec::new();

    let mut in_fonts = false;
    let mut in_fills = false;
    let mut in_borders = false;
    let mut in_cell_xfs = false;
    let mut in_num_fmts = false;
    let mut in_indexed_colors = false;

    let mut current_font: Option<RawFont> = None;
    let mut current_fill: Option<RawFill> = None;
    let mut current_border: Option<RawBorder> = None;
    let mut current_edge: Option<BorderEdge> = None;
    let mut current_xf: Option<CellXf> = None;
    let mut indexed_colors: Vec<String> = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            ref event @ (Event::Start(ref e) | Event::Empty(ref e)) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = e.local_name();

                match name.as_ref() {
                    b"numFmts" => in_num_fmts = !is_empty,
                    b"fonts" => in_fonts = !is_empty,
                    b"fills" => in_fills = !is_empty,
                    b"borders" => in_borders = !is_empty,
                    b"cellXfs" => in_cell_xfs = !is_empty,
                    b"indexedColors" => in_indexed_colors = !is_empty,

                    b"rgbColor" if in_indexed_colors => {
                        if let Some(color) = attr_string(e, b"rgb").and_then(|v| normalize_argb(&v))
                        {
                            indexed_colors.push(color);
                        }
                    }

                    b"numFmt" if in_num_fmts => {
                        if let (Some(id), Some(code)) =
                            (attr_u32(e, b"numFmtId"), attr_string(e, b"formatCode"))
                        {
                            stylesheet.num_fmts.push((id, code));
                        }
                    }

                    // Fonts
                    b"font" if in_fonts => {
                        if is_empty {
                            stylesheet.fonts.push(RawFont::default());
                        } else {
                            current_font = Some(RawFont::default());
                        }
                    }
                    b"sz" => {
                        if let Some(font) = current_font.as_mut() {
                            font.size = attr_f64(e, b"val");
                        }
                    }
                    b"name" => {
                        if let Some(font) = current_font.as_mut() {
                            font.name = attr_val(e);
                        }
                    }
                    b"b" => {
                        if let Some(font) = current_font.as_mut() {
                            font.bold = toggle_val(e);
                        }
                    }
                    b"i" => {
                        if let Some(font) = current_font.as_mut() {
                            font.italic = toggle_val(e);
                        }
                    }
                    b"u" => {
                        if let Some(font) = current_font.as_mut() {
                            // <u/> is single underline
                            font.underline = attr_val(e).as_deref() != Some("none");
                        }
                    }

                    // Fills
                    b"fill" if in_fills => {
                        if is_empty {
                            stylesheet.fills.push(RawFill::default());
                        } else {
                            current_fill = Some(RawFill::default());
                        }
                    }
                    b"patternFill" => {
                        if let Some(fill) = current_fill.as_mut() {
                            fill.pattern_type = attr_string(e, b"patternType");
                        }
                    }
                    b"fgColor" => {
                        if let Some(fill) = current_fill.as_mut() {
                            fill.fg_color = Some(parse_color_attrs(e));
                        }
                    }
                    b"bgColor" => {
                        if let Some(fill) = current_fill.as_mut() {
                            fill.bg_color = Some(parse_color_attrs(e));
                        }
                    }

                    // Borders
                    b"border" if in_borders => {
                        if is_empty {
                            stylesheet.borders.push(RawBorder::default());
                        } else {
                            current_border = Some(RawBorder::default());
                        }
                    }
                    edge_name @ (b"left" | b"right" | b"top" | b"bottom" | b"start" | b"end"
                    | b"diagonal" | b"vertical" | b"horizontal")
                        if current_border.is_some() =>
                    {
                        let edge = BorderEdge::from_name(edge_name);
                        let style = attr_string(e, b"style").filter(|s| s != "none");
                        if let (Some(edge), Some(style), Some(border)) =
                            (edge, style, current_border.as_mut())
                        {
                            if let Some(slot) = edge.slot(border) {
                                *slot = Some(RawBorderSide { style, color: None });
                            }
                        }
                        current_edge = if is_empty { None } else { edge };
                    }

                    b"color" => {
                        if let Some(font) = current_font.as_mut() {
                            font.color = Some(parse_color_attrs(e));
                        } else if let (Some(edge), Some(border)) =
                            (current_edge, current_border.as_mut())
                        {
                            if let Some(Some(side)) = edge.slot(border) {
                                side.color = Some(parse_color_attrs(e));
                            }
                        }
                    }

                    // Cell formats
                    b"xf" if in_cell_xfs => {
                        let xf = CellXf {
                            font_id: attr_u32(e, b"fontId"),
                            fill_id: attr_u32(e, b"fillId"),
                            border_id: attr_u32(e, b"borderId"),
                            num_fmt_id: attr_u32(e, b"numFmtId"),
                            alignment: None,
                        };
                        if is_empty {
                            stylesheet.cell_xfs.push(xf);
                        } else {
                            current_xf = Some(xf);
                        }
                    }
                    b"alignment" => {
                        if let Some(xf) = current_xf.as_mut() {
                            xf.alignment = Some(RawAlignment {
                                horizontal: attr_string(e, b"horizontal"),
                                vertical: attr_string(e, b"vertical"),
                            });
                        }
                    }

                    _ => {}
                }
            }

            Event::End(ref e) => match e.local_name().as_ref() {
                b"numFmts" => in_num_fmts = false,
                b"fonts" => in_fonts = false,
                b"fills" => in_fills = false,
                b"borders" => in_borders = false,
                b"cellXfs" => in_cell_xfs = false,
                b"indexedColors" => in_indexed_colors = false,
                b"font" => {
                    if let Some(font) = current_font.take() {
                        stylesheet.fonts.push(font);
                    }
                }
                b"fill" => {
                    if let Some(fill) = current_fill.take() {
                        stylesheet.fills.push(fill);
                    }
                }
                b"border" => {
                    if let Some(border) = current_border.take() {
                        stylesheet.borders.push(border);
                    }
                    current_edge = None;
                }
                b"left" | b"right" | b"top" | b"bottom" | b"start" | b"end" | b"diagonal"
                | b"vertical" | b"horizontal" => current_edge = None,
                b"xf" => {
                    if let Some(xf) = current_xf.take() {
                        stylesheet.cell_xfs.push(xf);
                    }
                }
                _ => {}
            },

            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !indexed_colors.is_empty() {
        stylesheet.indexed_colors = Some(indexed_colors);
    }

    Ok(stylesheet)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="0.0%"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><color theme="1"/><name val="Calibri"/></font>
    <font><b/><i val="0"/><u/><sz val="14"/><color rgb="FFFF0000"/><name val="Arial"/></font>
  </fonts>
  <fills count="3">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FF000000"/><bgColor indexed="64"/></patternFill></fill>
  </fills>
  <borders count="2">
    <border><left/><right/><top/><bottom/><diagonal/></border>
    <border>
      <left style="thick"><color rgb="FF00FF00"/></left>
      <right style="dotted"/>
      <top/>
      <bottom style="thin"><color indexed="10"/></bottom>
      <diagonal/>
    </border>
  </borders>
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    <xf numFmtId="164" fontId="1" fillId="2" borderId="1" applyAlignment="1">
      <alignment horizontal="center"/>
    </xf>
  </cellXfs>
  <colors><indexedColors><rgbColor rgb="FF123456"/></indexedColors></colors>
</styleSheet>"#;

    #[test]
    fn test_parse_fonts() {
        let sheet = parse_styles(STYLES.as_bytes()).unwrap();
        assert_eq!(sheet.fonts.len(), 2);
        let plain = &sheet.fonts[0];
        assert!(!plain.bold);
        assert_eq!(plain.size, Some(11.0));
        assert_eq!(plain.color.as_ref().unwrap().theme, Some(1));

        let fancy = &sheet.fonts[1];
        assert!(fancy.bold);
        assert!(!fancy.italic);
        assert!(fancy.underline);
        assert_eq!(fancy.size, Some(14.0));
        assert_eq!(fancy.name.as_deref(), Some("Arial"));
        assert_eq!(fancy.color.as_ref().unwrap().rgb.as_deref(), Some("FFFF0000"));
    }

    #[test]
    fn test_parse_fills() {
        let sheet = parse_styles(STYLES.as_bytes()).unwrap();
        assert_eq!(sheet.fills.len(), 3);
        assert_eq!(sheet.fills[1].pattern_type.as_deref(), Some("gray125"));
        let solid = &sheet.fills[2];
        assert_eq!(solid.pattern_type.as_deref(), Some("solid"));
        assert_eq!(solid.fg_color.as_ref().unwrap().rgb.as_deref(), Some("FF000000"));
        assert_eq!(solid.bg_color.as_ref().unwrap().indexed, Some(64));
    }

    #[test]
    fn test_parse_borders() {
        let sheet = parse_styles(STYLES.as_bytes()).unwrap();
        assert_eq!(sheet.borders.len(), 2);
        assert!(sheet.borders[0].left.is_none());

        let border = &sheet.borders[1];
        let left = border.left.as_ref().unwrap();
        assert_eq!(left.style, "thick");
        assert_eq!(left.color.as_ref().unwrap().rgb.as_deref(), Some("FF00FF00"));
        let right = border.right.as_ref().unwrap();
        assert_eq!(right.style, "dotted");
        assert!(right.color.is_none());
        assert!(border.top.is_none());
        assert_eq!(border.bottom.as_ref().unwrap().color.as_ref().unwrap().indexed, Some(10));
    }

    #[test]
    fn test_parse_cell_xfs_and_num_fmts() {
        let sheet = parse_styles(STYLES.as_bytes()).unwrap();
        assert_eq!(sheet.cell_xfs.len(), 2);
        let xf = &sheet.cell_xfs[1];
        assert_eq!(xf.font_id, Some(1));
        assert_eq!(xf.fill_id, Some(2));
        assert_eq!(xf.border_id, Some(1));
        assert_eq!(xf.num_fmt_id, Some(164));
        let alignment = xf.alignment.as_ref().unwrap();
        assert_eq!(alignment.horizontal.as_deref(), Some("center"));
        assert!(alignment.vertical.is_none());

        assert_eq!(sheet.format_code(164), Some("0.0%"));
        assert_eq!(sheet.format_code(0), Some("General"));
    }

    #[test]
    fn test_parse_indexed_palette() {
        let sheet = parse_styles(STYLES.as_bytes()).unwrap();
        assert_eq!(sheet.indexed_colors, Some(vec!["#123456".to_string()]));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(parse_styles("<styleSheet><fonts></styleSheet>".as_bytes()).is_err());
    }
}
