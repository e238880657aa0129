//! Test fixtures for generating valid XLSX files in memory.
//!
//! This module provides builders for creating XLSX files programmatically,
//! useful for testing the loader and renderer with known inputs.
//!
//! # Example
//!
//! ```rust
//! use fixtures::{SheetBuilder, StyleBuilder, XlsxBuilder};
//!
//! let xlsx = XlsxBuilder::new()
//!     .sheet(
//!         SheetBuilder::new("Log")
//!             .cell("A1", "Date", Some(StyleBuilder::new().bold()))
//!             .cell("B2", 42.0, None)
//!             .merge("A1:B1")
//!             .image("C2", PNG_BYTES.to_vec(), "png"),
//!     )
//!     .build();
//!
//! let workbook = logsheet::parser::parse(&xlsx).unwrap();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

/// Smallest PNG signature plus IHDR start; enough for sniffing.
pub const PNG_BYTES: [u8; 16] = [
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
const REL_DRAWING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

// ============================================================================
// Style Builder
// ============================================================================

/// A border side definition.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderSide {
    pub style: String,
    pub color: Option<String>,
}

impl BorderSide {
    /// Create a new border side with the given style.
    #[must_use]
    pub fn new(style: &str) -> Self {
        Self {
            style: style.to_string(),
            color: None,
        }
    }

    /// Set the border color as #RRGGBB or AARRGGBB.
    #[must_use]
    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(normalize_color(color));
        self
    }
}

/// Builder for creating cell styles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleBuilder {
    pub font_size: Option<f64>,
    pub font_color: Option<String>,
    /// Raw `<color .../>` attributes, e.g. `theme="4" tint="0.4"`.
    pub font_color_attrs: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,

    pub bg_color: Option<String>,
    pub pattern_type: Option<String>,

    pub border_top: Option<BorderSide>,
    pub border_right: Option<BorderSide>,
    pub border_bottom: Option<BorderSide>,
    pub border_left: Option<BorderSide>,

    /// `Some` emits an `<alignment>` element even when both values are unset.
    pub alignment: Option<(Option<String>, Option<String>)>,

    pub number_format: Option<String>,
}

impl StyleBuilder {
    /// Create a new empty style builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font size in points.
    #[must_use]
    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Set the font color as #RRGGBB or AARRGGBB.
    #[must_use]
    pub fn font_color(mut self, color: &str) -> Self {
        self.font_color = Some(normalize_color(color));
        self
    }

    /// Set the font color to a theme slot with a tint.
    #[must_use]
    pub fn font_theme_color(mut self, theme: u32, tint: f64) -> Self {
        self.font_color_attrs = Some(format!(r#"theme="{theme}" tint="{tint}""#));
        self
    }

    /// Make the font bold.
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Make the font italic.
    #[must_use]
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Add underline to the font.
    #[must_use]
    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Set the background fill color (solid fill).
    #[must_use]
    pub fn bg_color(mut self, color: &str) -> Self {
        self.bg_color = Some(normalize_color(color));
        if self.pattern_type.is_none() {
            self.pattern_type = Some("solid".to_string());
        }
        self
    }

    /// Set the fill pattern type.
    #[must_use]
    pub fn pattern(mut self, pattern_type: &str) -> Self {
        self.pattern_type = Some(pattern_type.to_string());
        self
    }

    /// Set all four borders to the same style.
    #[must_use]
    pub fn border_all(mut self, style: &str, color: Option<&str>) -> Self {
        let mut side = BorderSide::new(style);
        if let Some(c) = color {
            side = side.color(c);
        }
        self.border_top = Some(side.clone());
        self.border_right = Some(side.clone());
        self.border_bottom = Some(side.clone());
        self.border_left = Some(side);
        self
    }

    #[must_use]
    pub fn border_top(mut self, side: BorderSide) -> Self {
        self.border_top = Some(side);
        self
    }

    #[must_use]
    pub fn border_right(mut self, side: BorderSide) -> Self {
        self.border_right = Some(side);
        self
    }

    #[must_use]
    pub fn border_bottom(mut self, side: BorderSide) -> Self {
        self.border_bottom = Some(side);
        self
    }

    #[must_use]
    pub fn border_left(mut self, side: BorderSide) -> Self {
        self.border_left = Some(side);
        self
    }

    /// Set horizontal and/or vertical alignment.
    #[must_use]
    pub fn align(mut self, horizontal: Option<&str>, vertical: Option<&str>) -> Self {
        self.alignment = Some((
            horizontal.map(str::to_string),
            vertical.map(str::to_string),
        ));
        self
    }

    /// Set the number format code.
    #[must_use]
    pub fn number_format(mut self, format: &str) -> Self {
        self.number_format = Some(format.to_string());
        self
    }
}

// ============================================================================
// Cell Value
// ============================================================================

/// Represents a cell value that can be added to a sheet.
#[derive(Debug, Clone)]
pub enum CellValue {
    /// A shared string.
    String(String),
    Number(f64),
    Boolean(bool),
    /// An error value (e.g., "#DIV/0!").
    Error(String),
    /// An inline string (not shared).
    InlineString(String),
    /// A formula with its cached string result.
    FormulaString(String, String),
    /// An empty cell (style only).
    Empty,
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

// ============================================================================
// Sheet Builder
// ============================================================================

/// A cell in the sheet.
#[derive(Debug, Clone)]
pub struct CellEntry {
    pub cell_ref: String,
    pub value: CellValue,
    pub style: Option<StyleBuilder>,
}

/// A picture anchored at a cell.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub cell_ref: String,
    pub data: Vec<u8>,
    pub extension: String,
    /// Reference the media part without writing it.
    pub omit_media: bool,
}

/// Builder for a single worksheet.
#[derive(Debug, Clone, Default)]
pub struct SheetBuilder {
    pub name: String,
    pub state: Option<String>,
    pub dimension: Option<String>,
    pub cells: Vec<CellEntry>,
    pub merges: Vec<String>,
    pub images: Vec<ImageEntry>,
}

impl SheetBuilder {
    /// Create a new sheet builder with the given name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Add a cell with a value and optional style.
    #[must_use]
    pub fn cell<V: Into<CellValue>>(
        mut self,
        cell_ref: &str,
        value: V,
        style: Option<StyleBuilder>,
    ) -> Self {
        self.cells.push(CellEntry {
            cell_ref: cell_ref.to_string(),
            value: value.into(),
            style,
        });
        self
    }

    /// Add an empty cell with only a style.
    #[must_use]
    pub fn styled_cell(mut self, cell_ref: &str, style: StyleBuilder) -> Self {
        self.cells.push(CellEntry {
            cell_ref: cell_ref.to_string(),
            value: CellValue::Empty,
            style: Some(style),
        });
        self
    }

    /// Add a merge range (e.g., "A1:B2"). Written verbatim, so malformed
    /// ranges can be tested too.
    #[must_use]
    pub fn merge(mut self, range: &str) -> Self {
        self.merges.push(range.to_string());
        self
    }

    /// Set the `<dimension ref>` of the sheet.
    #[must_use]
    pub fn dimension(mut self, range: &str) -> Self {
        self.dimension = Some(range.to_string());
        self
    }

    /// Set the sheet state ("hidden", "veryHidden").
    #[must_use]
    pub fn state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }

    /// Anchor a picture at a cell.
    #[must_use]
    pub fn image(mut self, cell_ref: &str, data: Vec<u8>, extension: &str) -> Self {
        self.images.push(ImageEntry {
            cell_ref: cell_ref.to_string(),
            data,
            extension: extension.to_string(),
            omit_media: false,
        });
        self
    }

    /// Anchor a picture whose media part is missing from the package.
    #[must_use]
    pub fn broken_image(mut self, cell_ref: &str, extension: &str) -> Self {
        self.images.push(ImageEntry {
            cell_ref: cell_ref.to_string(),
            data: Vec::new(),
            extension: extension.to_string(),
            omit_media: true,
        });
        self
    }
}

// ============================================================================
// XLSX Builder
// ============================================================================

/// Builder for creating complete XLSX files.
#[derive(Debug, Default)]
pub struct XlsxBuilder {
    sheets: Vec<SheetBuilder>,
    theme_colors: Option<Vec<String>>,
    date1904: bool,
    extra_parts: Vec<(String, Vec<u8>)>,
    skipped_parts: Vec<String>,
}

impl XlsxBuilder {
    /// Create a new XLSX builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet.
    #[must_use]
    pub fn sheet(mut self, sheet: SheetBuilder) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// Set custom theme colors (#RRGGBB, in clrScheme order).
    #[must_use]
    pub fn theme_colors(mut self, colors: Vec<String>) -> Self {
        self.theme_colors = Some(colors);
        self
    }

    /// Use the 1904 date system.
    #[must_use]
    pub fn date1904(mut self) -> Self {
        self.date1904 = true;
        self
    }

    /// Write an additional part, or replace a generated one.
    #[must_use]
    pub fn part(mut self, path: &str, content: &[u8]) -> Self {
        self.extra_parts.push((path.to_string(), content.to_vec()));
        self
    }

    /// Leave a generated part out of the package.
    #[must_use]
    pub fn without_part(mut self, path: &str) -> Self {
        self.skipped_parts.push(path.to_string());
        self
    }

    /// Build the XLSX file as bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut styles_collector = StylesCollector::new();
        let mut shared_strings: Vec<String> = Vec::new();

        for sheet in &self.sheets {
            for cell in &sheet.cells {
                if let Some(ref style) = cell.style {
                    styles_collector.add_style(style);
                }
                if let CellValue::String(ref s) = cell.value {
                    if !shared_strings.contains(s) {
                        shared_strings.push(s.clone());
                    }
                }
            }
        }

        let mut parts: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        let mut put = |path: String, content: String| {
            parts.insert(path, content.into_bytes());
        };

        put("[Content_Types].xml".to_string(), generate_content_types(self.sheets.len()));
        put("_rels/.rels".to_string(), generate_rels());
        put(
            "xl/_rels/workbook.xml.rels".to_string(),
            generate_workbook_rels(self.sheets.len()),
        );
        put(
            "xl/workbook.xml".to_string(),
            generate_workbook(&self.sheets, self.date1904),
        );
        put("xl/styles.xml".to_string(), styles_collector.generate_styles_xml());
        if !shared_strings.is_empty() {
            put(
                "xl/sharedStrings.xml".to_string(),
                generate_shared_strings(&shared_strings),
            );
        }
        put(
            "xl/theme/theme1.xml".to_string(),
            generate_theme(self.theme_colors.as_deref()),
        );

        let mut media_counter = 0;
        let mut media: Vec<(String, Vec<u8>)> = Vec::new();
        for (i, sheet) in self.sheets.iter().enumerate() {
            let n = i + 1;
            put(
                format!("xl/worksheets/sheet{n}.xml"),
                generate_sheet_xml(sheet, &shared_strings, &styles_collector),
            );
            if sheet.images.is_empty() {
                continue;
            }

            put(
                format!("xl/worksheets/_rels/sheet{n}.xml.rels"),
                relationships(&[(
                    "rId1".to_string(),
                    REL_DRAWING,
                    format!("../drawings/drawing{n}.xml"),
                )]),
            );

            let mut drawing_rels = Vec::new();
            for (k, image) in sheet.images.iter().enumerate() {
                media_counter += 1;
                let file_name = format!("image{media_counter}.{}", image.extension);
                drawing_rels.push((
                    format!("rId{}", k + 1),
                    REL_IMAGE,
                    format!("../media/{file_name}"),
                ));
                if !image.omit_media {
                    media.push((format!("xl/media/{file_name}"), image.data.clone()));
                }
            }
            put(
                format!("xl/drawings/_rels/drawing{n}.xml.rels"),
                relationships(&drawing_rels),
            );
            put(format!("xl/drawings/drawing{n}.xml"), generate_drawing(&sheet.images));
        }

        for (path, data) in media {
            parts.insert(path, data);
        }
        for (path, data) in self.extra_parts {
            parts.insert(path, data);
        }
        for path in &self.skipped_parts {
            parts.remove(path);
        }

        let cursor = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(cursor);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (path, data) in &parts {
            let _ = zip.start_file(path.as_str(), options);
            let _ = zip.write_all(data);
        }

        let cursor = zip.finish().expect("Failed to finish ZIP");
        cursor.into_inner()
    }
}

// ============================================================================
// Styles Collector
// ============================================================================

/// Collects and deduplicates styles for the XLSX file.
#[derive(Debug, Default)]
struct StylesCollector {
    fonts: Vec<FontDef>,
    fills: Vec<FillDef>,
    borders: Vec<BorderDef>,
    num_fmts: Vec<(u32, String)>,
    cell_xfs: Vec<CellXfDef>,
    style_map: Vec<(StyleBuilder, u32)>,
}

#[derive(Debug, Clone, PartialEq)]
struct FontDef {
    size: f64,
    color: Option<String>,
    color_attrs: Option<String>,
    bold: bool,
    italic: bool,
    underline: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct FillDef {
    pattern_type: String,
    fg_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct BorderDef {
    top: Option<BorderSide>,
    right: Option<BorderSide>,
    bottom: Option<BorderSide>,
    left: Option<BorderSide>,
}

#[derive(Debug, Clone)]
struct CellXfDef {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    num_fmt_id: Option<u32>,
    alignment: Option<(Option<String>, Option<String>)>,
}

impl StylesCollector {
    fn new() -> Self {
        let mut collector = Self::default();

        collector.fonts.push(FontDef {
            size: 11.0,
            color: None,
            color_attrs: None,
            bold: false,
            italic: false,
            underline: false,
        });

        // Required fills (none and gray125)
        collector.fills.push(FillDef {
            pattern_type: "none".to_string(),
            fg_color: None,
        });
        collector.fills.push(FillDef {
            pattern_type: "gray125".to_string(),
            fg_color: None,
        });

        collector.borders.push(BorderDef {
            top: None,
            right: None,
            bottom: None,
            left: None,
        });

        collector.cell_xfs.push(CellXfDef {
            font_id: 0,
            fill_id: 0,
            border_id: 0,
            num_fmt_id: None,
            alignment: None,
        });

        collector
    }

    fn add_style(&mut self, style: &StyleBuilder) -> u32 {
        if let Some(idx) = self.find_style(style) {
            return idx;
        }

        let xf = CellXfDef {
            font_id: self.add_font(style),
            fill_id: self.add_fill(style),
            border_id: self.add_border(style),
            num_fmt_id: self.add_num_fmt(style),
            alignment: style.alignment.clone(),
        };

        let idx = self.cell_xfs.len() as u32;
        self.cell_xfs.push(xf);
        self.style_map.push((style.clone(), idx));
        idx
    }

    fn find_style(&self, style: &StyleBuilder) -> Option<u32> {
        self.style_map
            .iter()
            .find(|(existing, _)| existing == style)
            .map(|(_, idx)| *idx)
    }

    fn add_font(&mut self, style: &StyleBuilder) -> u32 {
        let font = FontDef {
            size: style.font_size.unwrap_or(11.0),
            color: style.font_color.clone(),
            color_attrs: style.font_color_attrs.clone(),
            bold: style.bold,
            italic: style.italic,
            underline: style.underline,
        };
        intern(&mut self.fonts, font)
    }

    fn add_fill(&mut self, style: &StyleBuilder) -> u32 {
        if style.bg_color.is_none() && style.pattern_type.is_none() {
            return 0;
        }
        let fill = FillDef {
            pattern_type: style
                .pattern_type
                .clone()
                .unwrap_or_else(|| "solid".to_string()),
            fg_color: style.bg_color.clone(),
        };
        intern(&mut self.fills, fill)
    }

    fn add_border(&mut self, style: &StyleBuilder) -> u32 {
        let border = BorderDef {
            top: style.border_top.clone(),
            right: style.border_right.clone(),
            bottom: style.border_bottom.clone(),
            left: style.border_left.clone(),
        };
        if border == self.borders[0] {
            return 0;
        }
        intern(&mut self.borders, border)
    }

    fn add_num_fmt(&mut self, style: &StyleBuilder) -> Option<u32> {
        let format = style.number_format.as_ref()?;
        if let Some(id) = get_builtin_format_id(format) {
            return Some(id);
        }
        if let Some((id, _)) = self.num_fmts.iter().find(|(_, code)| code == format) {
            return Some(*id);
        }
        // custom formats start at 164
        let id = 164 + self.num_fmts.len() as u32;
        self.num_fmts.push((id, format.clone()));
        Some(id)
    }

    fn generate_styles_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !self.num_fmts.is_empty() {
            xml.push_str(&format!(r#"<numFmts count="{}">"#, self.num_fmts.len()));
            for (id, code) in &self.num_fmts {
                xml.push_str(&format!(
                    r#"<numFmt numFmtId="{}" formatCode="{}"/>"#,
                    id,
                    escape_xml(code)
                ));
            }
            xml.push_str("</numFmts>");
        }

        xml.push_str(&format!(r#"<fonts count="{}">"#, self.fonts.len()));
        for font in &self.fonts {
            xml.push_str("<font>");
            if font.bold {
                xml.push_str("<b/>");
            }
            if font.italic {
                xml.push_str("<i/>");
            }
            if font.underline {
                xml.push_str("<u/>");
            }
            xml.push_str(&format!(r#"<sz val="{}"/>"#, font.size));
            if let Some(ref color) = font.color {
                xml.push_str(&format!(r#"<color rgb="{color}"/>"#));
            } else if let Some(ref attrs) = font.color_attrs {
                xml.push_str(&format!("<color {attrs}/>"));
            }
            xml.push_str(r#"<name val="Calibri"/>"#);
            xml.push_str("</font>");
        }
        xml.push_str("</fonts>");

        xml.push_str(&format!(r#"<fills count="{}">"#, self.fills.len()));
        for fill in &self.fills {
            xml.push_str(&format!(
                r#"<fill><patternFill patternType="{}">"#,
                fill.pattern_type
            ));
            if let Some(ref color) = fill.fg_color {
                xml.push_str(&format!(r#"<fgColor rgb="{color}"/><bgColor indexed="64"/>"#));
            }
            xml.push_str("</patternFill></fill>");
        }
        xml.push_str("</fills>");

        xml.push_str(&format!(r#"<borders count="{}">"#, self.borders.len()));
        for border in &self.borders {
            xml.push_str("<border>");
            xml.push_str(&format_border_side("left", border.left.as_ref()));
            xml.push_str(&format_border_side("right", border.right.as_ref()));
            xml.push_str(&format_border_side("top", border.top.as_ref()));
            xml.push_str(&format_border_side("bottom", border.bottom.as_ref()));
            xml.push_str("<diagonal/>");
            xml.push_str("</border>");
        }
        xml.push_str("</borders>");

        xml.push_str(r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#);

        xml.push_str(&format!(r#"<cellXfs count="{}">"#, self.cell_xfs.len()));
        for xf in &self.cell_xfs {
            let mut attrs = format!(
                r#"numFmtId="{}" fontId="{}" fillId="{}" borderId="{}" xfId="0""#,
                xf.num_fmt_id.unwrap_or(0),
                xf.font_id,
                xf.fill_id,
                xf.border_id
            );
            if xf.num_fmt_id.is_some() {
                attrs.push_str(r#" applyNumberFormat="1""#);
            }

            match xf.alignment {
                Some((ref horizontal, ref vertical)) => {
                    xml.push_str(&format!(r#"<xf {attrs} applyAlignment="1"><alignment"#));
                    if let Some(h) = horizontal {
                        xml.push_str(&format!(r#" horizontal="{h}""#));
                    }
                    if let Some(v) = vertical {
                        xml.push_str(&format!(r#" vertical="{v}""#));
                    }
                    xml.push_str("/></xf>");
                }
                None => xml.push_str(&format!("<xf {attrs}/>")),
            }
        }
        xml.push_str("</cellXfs>");

        xml.push_str(r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#);
        xml.push_str("</styleSheet>");
        xml
    }
}

/// Index of `item` in `items`, appending it when absent.
fn intern<T: PartialEq>(items: &mut Vec<T>, item: T) -> u32 {
    if let Some(i) = items.iter().position(|existing| existing == &item) {
        return i as u32;
    }
    items.push(item);
    (items.len() - 1) as u32
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Normalize color to ARGB format (without #).
fn normalize_color(color: &str) -> String {
    let color = color.trim_start_matches('#');
    if color.len() == 8 {
        color.to_uppercase()
    } else {
        format!("FF{}", color.to_uppercase())
    }
}

/// Get built-in number format ID.
fn get_builtin_format_id(format: &str) -> Option<u32> {
    match format {
        "General" => Some(0),
        "0" => Some(1),
        "0.00" => Some(2),
        "#,##0" => Some(3),
        "#,##0.00" => Some(4),
        "0%" => Some(9),
        "0.00%" => Some(10),
        "0.00E+00" => Some(11),
        "mm-dd-yy" => Some(14),
        "d-mmm-yy" => Some(15),
        "h:mm AM/PM" => Some(18),
        "h:mm:ss" => Some(21),
        "@" => Some(49),
        _ => None,
    }
}

/// Escape XML special characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Format a border side element.
fn format_border_side(name: &str, side: Option<&BorderSide>) -> String {
    match side {
        Some(side) => {
            let mut xml = format!(r#"<{} style="{}">"#, name, side.style);
            if let Some(ref c) = side.color {
                xml.push_str(&format!(r#"<color rgb="{c}"/>"#));
            }
            xml.push_str(&format!("</{name}>"));
            xml
        }
        None => format!("<{name}/>"),
    }
}

/// Generate [Content_Types].xml
fn generate_content_types(sheet_count: usize) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Default Extension="png" ContentType="image/png"/>"#);
    xml.push_str(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#);
    xml.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

/// Generate _rels/.rels
fn generate_rels() -> String {
    relationships(&[(
        "rId1".to_string(),
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
        "xl/workbook.xml".to_string(),
    )])
}

/// Generate a relationships part from (id, type, target) triples.
fn relationships(rels: &[(String, &str, String)]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, rel_type, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{rel_type}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// Generate xl/_rels/workbook.xml.rels
fn generate_workbook_rels(sheet_count: usize) -> String {
    let mut rels: Vec<(String, &str, String)> = (1..=sheet_count)
        .map(|i| (format!("rId{i}"), REL_WORKSHEET, format!("worksheets/sheet{i}.xml")))
        .collect();
    let next = sheet_count + 1;
    rels.push((format!("rId{next}"), REL_STYLES, "styles.xml".to_string()));
    rels.push((
        format!("rId{}", next + 1),
        REL_SHARED_STRINGS,
        "sharedStrings.xml".to_string(),
    ));
    rels.push((format!("rId{}", next + 2), REL_THEME, "theme/theme1.xml".to_string()));
    relationships(&rels)
}

/// Generate xl/workbook.xml
fn generate_workbook(sheets: &[SheetBuilder], date1904: bool) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);
    if date1904 {
        xml.push_str(r#"<workbookPr date1904="1"/>"#);
    }
    xml.push_str("<sheets>");
    for (i, sheet) in sheets.iter().enumerate() {
        let state = sheet
            .state
            .as_ref()
            .map(|s| format!(r#" state="{s}""#))
            .unwrap_or_default();
        xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}"{} r:id="rId{}"/>"#,
            escape_xml(&sheet.name),
            i + 1,
            state,
            i + 1
        ));
    }
    xml.push_str("</sheets>");
    xml.push_str("</workbook>");
    xml
}

/// Generate xl/sharedStrings.xml
fn generate_shared_strings(strings: &[String]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(&format!(
        r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
        strings.len(),
        strings.len()
    ));
    for s in strings {
        xml.push_str(&format!(
            r#"<si><t xml:space="preserve">{}</t></si>"#,
            escape_xml(s)
        ));
    }
    xml.push_str("</sst>");
    xml
}

/// Generate xl/theme/theme1.xml
fn generate_theme(colors: Option<&[String]>) -> String {
    let default_colors = [
        "000000", "FFFFFF", "44546A", "E7E6E6", "4472C4", "ED7D31", "A5A5A5", "FFC000", "5B9BD5",
        "70AD47", "0563C1", "954F72",
    ];
    let color_names = [
        "dk1", "lt1", "dk2", "lt2", "accent1", "accent2", "accent3", "accent4", "accent5",
        "accent6", "hlink", "folHlink",
    ];
    let colors = colors.unwrap_or(&[]);

    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">"#);
    xml.push_str("<a:themeElements>");
    xml.push_str(r#"<a:clrScheme name="Office">"#);
    for (i, name) in color_names.iter().enumerate() {
        let color = colors
            .get(i)
            .map_or(default_colors[i], |c| c.trim_start_matches('#'));
        xml.push_str(&format!(r#"<a:{name}><a:srgbClr val="{color}"/></a:{name}>"#));
    }
    xml.push_str("</a:clrScheme>");
    xml.push_str(r#"<a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/></a:minorFont></a:fontScheme>"#);
    xml.push_str("</a:themeElements>");
    xml.push_str("</a:theme>");
    xml
}

/// Generate a sheet XML file
fn generate_sheet_xml(
    sheet: &SheetBuilder,
    shared_strings: &[String],
    styles: &StylesCollector,
) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);

    if let Some(ref dimension) = sheet.dimension {
        xml.push_str(&format!(r#"<dimension ref="{dimension}"/>"#));
    }

    xml.push_str("<sheetData>");

    // Group cells by row, ordered by column within a row
    let mut rows: BTreeMap<u32, Vec<&CellEntry>> = BTreeMap::new();
    for cell in &sheet.cells {
        let (_, row) = parse_cell_ref(&cell.cell_ref);
        rows.entry(row).or_default().push(cell);
    }

    for (row_num, mut cells) in rows {
        cells.sort_by_key(|c| parse_cell_ref(&c.cell_ref).0);
        xml.push_str(&format!(r#"<row r="{row_num}">"#));

        for cell in cells {
            let mut cell_attrs = format!(r#"r="{}""#, cell.cell_ref);
            if let Some(idx) = cell.style.as_ref().and_then(|s| styles.find_style(s)) {
                cell_attrs.push_str(&format!(r#" s="{idx}""#));
            }

            match &cell.value {
                CellValue::String(s) => {
                    let idx = shared_strings.iter().position(|x| x == s).unwrap_or(0);
                    xml.push_str(&format!(r#"<c {cell_attrs} t="s"><v>{idx}</v></c>"#));
                }
                CellValue::Number(n) => {
                    xml.push_str(&format!(r#"<c {cell_attrs}><v>{n}</v></c>"#));
                }
                CellValue::Boolean(b) => {
                    let v = if *b { "1" } else { "0" };
                    xml.push_str(&format!(r#"<c {cell_attrs} t="b"><v>{v}</v></c>"#));
                }
                CellValue::Error(e) => {
                    xml.push_str(&format!(
                        r#"<c {cell_attrs} t="e"><v>{}</v></c>"#,
                        escape_xml(e)
                    ));
                }
                CellValue::InlineString(s) => {
                    xml.push_str(&format!(
                        r#"<c {cell_attrs} t="inlineStr"><is><t>{}</t></is></c>"#,
                        escape_xml(s)
                    ));
                }
                CellValue::FormulaString(formula, cached) => {
                    xml.push_str(&format!(
                        r#"<c {cell_attrs} t="str"><f>{}</f><v>{}</v></c>"#,
                        escape_xml(formula),
                        escape_xml(cached)
                    ));
                }
                CellValue::Empty => {
                    xml.push_str(&format!("<c {cell_attrs}/>"));
                }
            }
        }

        xml.push_str("</row>");
    }

    xml.push_str("</sheetData>");

    if !sheet.merges.is_empty() {
        xml.push_str(&format!(r#"<mergeCells count="{}">"#, sheet.merges.len()));
        for merge in &sheet.merges {
            xml.push_str(&format!(r#"<mergeCell ref="{}"/>"#, escape_xml(merge)));
        }
        xml.push_str("</mergeCells>");
    }

    if !sheet.images.is_empty() {
        xml.push_str(r#"<drawing r:id="rId1"/>"#);
    }

    xml.push_str("</worksheet>");
    xml
}

/// Generate a drawing part with one picture anchor per image.
fn generate_drawing(images: &[ImageEntry]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);
    for (k, image) in images.iter().enumerate() {
        let (col, row) = parse_cell_ref(&image.cell_ref);
        let (col0, row0) = (col.saturating_sub(1), row.saturating_sub(1));
        xml.push_str(r#"<xdr:twoCellAnchor editAs="oneCell">"#);
        xml.push_str(&format!(
            "<xdr:from><xdr:col>{col0}</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>{row0}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>"
        ));
        xml.push_str(&format!(
            "<xdr:to><xdr:col>{}</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to>",
            col0 + 1,
            row0 + 1
        ));
        xml.push_str(&format!(
            r#"<xdr:pic><xdr:nvPicPr><xdr:cNvPr id="{}" name="Picture {}"/><xdr:cNvPicPr/></xdr:nvPicPr><xdr:blipFill><a:blip r:embed="rId{}"/><a:stretch><a:fillRect/></a:stretch></xdr:blipFill><xdr:spPr/></xdr:pic>"#,
            k + 2,
            k + 1,
            k + 1
        ));
        xml.push_str("<xdr:clientData/></xdr:twoCellAnchor>");
    }
    xml.push_str("</xdr:wsDr>");
    xml
}

/// Parse a cell reference like "A1" into (col, row) as 1-indexed.
fn parse_cell_ref(cell_ref: &str) -> (u32, u32) {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut in_letters = true;

    for c in cell_ref.chars() {
        if in_letters && c.is_ascii_alphabetic() {
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        } else {
            in_letters = false;
            if c.is_ascii_digit() {
                row = row * 10 + (c as u32 - '0' as u32);
            }
        }
    }

    (col, row)
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Create a minimal valid XLSX with a single empty sheet.
#[must_use]
pub fn minimal_xlsx() -> Vec<u8> {
    XlsxBuilder::new().sheet(SheetBuilder::new("Sheet1")).build()
}

/// Create an XLSX with a single cell containing text.
#[must_use]
pub fn xlsx_with_text(text: &str) -> Vec<u8> {
    XlsxBuilder::new()
        .sheet(SheetBuilder::new("Sheet1").cell("A1", text, None))
        .build()
}

/// Create an XLSX with a styled cell at A1.
#[must_use]
pub fn xlsx_with_styled_cell<V: Into<CellValue>>(value: V, style: StyleBuilder) -> Vec<u8> {
    XlsxBuilder::new()
        .sheet(SheetBuilder::new("Sheet1").cell("A1", value, Some(style)))
        .build()
}

/// A log sheet with a header row and `rows` body rows of `cols` columns.
#[must_use]
pub fn log_sheet(name: &str, rows: u32, cols: u32) -> SheetBuilder {
    let mut sheet = SheetBuilder::new(name);
    let header_style = StyleBuilder::new()
        .bold()
        .bg_color("#1F4E78")
        .border_all("thin", Some("#000000"));
    for c in 1..=cols {
        let col = col_letters(c);
        sheet = sheet.cell(&format!("{col}1"), format!("Column {col}"), Some(header_style.clone()));
        for r in 2..=rows + 1 {
            let value: CellValue = if c % 2 == 0 {
                CellValue::Number(f64::from(r * c))
            } else {
                CellValue::String(format!("entry {r}-{c}"))
            };
            sheet = sheet.cell(&format!("{col}{r}"), value, None);
        }
    }
    sheet
}

/// Convert column number (1-indexed) to letter(s).
#[must_use]
pub fn col_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}
