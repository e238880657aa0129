use serde::{Deserialize, Serialize};

// ============================================================================
// Visual style produced for the renderer
// ============================================================================

/// Visual attributes of one rendered cell. Unset fields inherit the table default.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_right: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_bottom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
}

impl CellStyle {
    /// Serialize the set fields as a CSS declaration list in a fixed order.
    pub fn to_css(&self) -> String {
        let declarations = [
            ("background-color", &self.background_color),
            ("color", &self.text_color),
            ("font-weight", &self.font_weight),
            ("font-style", &self.font_style),
            ("text-decoration", &self.text_decoration),
            ("font-size", &self.font_size),
            ("text-align", &self.text_align),
            ("vertical-align", &self.vertical_align),
            ("border-top", &self.border_top),
            ("border-right", &self.border_right),
            ("border-bottom", &self.border_bottom),
            ("border-left", &self.border_left),
            ("padding", &self.padding),
        ];

        let mut css = String::new();
        for (property, value) in declarations {
            if let Some(value) = value {
                if !css.is_empty() {
                    css.push(' ');
                }
                css.push_str(property);
                css.push_str(": ");
                css.push_str(value);
                css.push(';');
            }
        }
        css
    }
}

// ============================================================================
// Resolved formatting of one cell (colors already normalized to #RRGGBB)
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CellFormat {
    pub fill: Option<FillFormat>,
    pub font: Option<FontFormat>,
    pub alignment: Option<AlignmentFormat>,
    pub border: Option<BorderFormat>,
}

impl CellFormat {
    pub fn is_empty(&self) -> bool {
        self.fill.is_none() && self.font.is_none() && self.alignment.is_none() && self.border.is_none()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FillFormat {
    /// `patternType` as written, e.g. "solid", "gray125".
    pub pattern: Option<String>,
    pub fg_color: Option<String>,
    pub bg_color: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FontFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Point size as stored.
    pub size: Option<f64>,
    pub color: Option<String>,
    /// How `color` was declared. Only `Rgb` counts as an explicit font color.
    pub color_source: Option<ColorSource>,
}

/// The attribute a `<color>` element resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSource {
    Rgb,
    Theme,
    Indexed,
    Auto,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AlignmentFormat {
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BorderFormat {
    pub top: Option<BorderSideFormat>,
    pub right: Option<BorderSideFormat>,
    pub bottom: Option<BorderSideFormat>,
    pub left: Option<BorderSideFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderSideFormat {
    /// Line style name, e.g. "thin", "thick", "dotted".
    pub style: String,
    pub color: Option<String>,
}

// ============================================================================
// Internal types for parsing styles.xml
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorSpec {
    pub rgb: Option<String>,
    pub theme: Option<u32>,
    pub tint: Option<f64>,
    pub indexed: Option<u32>,
    pub auto: bool,
}

impl ColorSpec {
    /// The attribute color resolution reads first.
    pub fn source(&self) -> Option<ColorSource> {
        if self.rgb.is_some() {
            Some(ColorSource::Rgb)
        } else if self.theme.is_some() {
            Some(ColorSource::Theme)
        } else if self.indexed.is_some() {
            Some(ColorSource::Indexed)
        } else if self.auto {
            Some(ColorSource::Auto)
        } else {
            None
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct RawFont {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub color: Option<ColorSpec>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

#[derive(Debug, Default, Clone)]
pub struct RawFill {
    pub pattern_type: Option<String>,
    pub fg_color: Option<ColorSpec>,
    pub bg_color: Option<ColorSpec>,
}

#[derive(Debug, Default, Clone)]
pub struct RawBorder {
    pub left: Option<RawBorderSide>,
    pub right: Option<RawBorderSide>,
    pub top: Option<RawBorderSide>,
    pub bottom: Option<RawBorderSide>,
}

#[derive(Debug, Clone)]
pub struct RawBorderSide {
    pub style: String,
    pub color: Option<ColorSpec>,
}

#[derive(Debug, Default, Clone)]
pub struct RawAlignment {
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
}

/// Cell format (xf) from cellXfs.
#[derive(Debug, Default, Clone)]
pub struct CellXf {
    pub font_id: Option<u32>,
    pub fill_id: Option<u32>,
    pub border_id: Option<u32>,
    pub num_fmt_id: Option<u32>,
    pub alignment: Option<RawAlignment>,
}

/// Parsed contents of styles.xml.
#[derive(Debug, Default)]
pub struct StyleSheet {
    pub fonts: Vec<RawFont>,
    pub fills: Vec<RawFill>,
    pub borders: Vec<RawBorder>,
    pub cell_xfs: Vec<CellXf>,
    pub num_fmts: Vec<(u32, String)>, // (numFmtId, formatCode)
    /// Custom indexed colors from `<colors><indexedColors>` (if present)
    pub indexed_colors: Option<Vec<String>>,
}

impl StyleSheet {
    /// Format code for a numFmtId, checking custom formats before built-ins.
    pub fn format_code(&self, num_fmt_id: u32) -> Option<&str> {
        self.num_fmts
            .iter()
            .find(|(id, _)| *id == num_fmt_id)
            .map(|(_, code)| code.as_str())
            .or_else(|| crate::numfmt::builtin_format(num_fmt_id))
    }
}
