//! Maps a cell's raw formatting to the visual attributes the table renders.

use crate::color::brightness_sum;
use crate::types::{BorderSideFormat, CellFormat, CellStyle, ColorSource};

/// Channel sum above which a background counts as light.
const LIGHT_BACKGROUND_THRESHOLD: u32 = 600;

const CELL_PADDING: &str = "8px";

/// Build the [`CellStyle`] for one cell.
///
/// Rules run in order: background, contrast text color, font, alignment,
/// borders, padding. Only an rgb font color overrides the contrast pick; theme
/// and indexed font colors are what Excel writes for its default font.
pub fn extract_cell_style(format: &CellFormat) -> CellStyle {
    let mut style = CellStyle::default();

    if let Some(fill) = &format.fill {
        if fill.pattern.as_deref() == Some("solid") {
            if let Some(color) = &fill.fg_color {
                style.background_color = Some(color.clone());
                style.text_color = brightness_sum(color).map(|sum| {
                    if sum > LIGHT_BACKGROUND_THRESHOLD {
                        "#000000".to_string()
                    } else {
                        "#FFFFFF".to_string()
                    }
                });
            }
        }
    }

    if let Some(font) = &format.font {
        style.font_weight = Some(if font.bold { "bold" } else { "normal" }.to_string());
        style.font_style = Some(if font.italic { "italic" } else { "normal" }.to_string());
        style.text_decoration = Some(if font.underline { "underline" } else { "none" }.to_string());
        if font.color_source == Some(ColorSource::Rgb) {
            if let Some(color) = &font.color {
                style.text_color = Some(color.clone());
            }
        }
        if let Some(size) = font.size {
            style.font_size = Some(format!("{size}px"));
        }
    }

    if let Some(alignment) = &format.alignment {
        style.text_align = Some(alignment.horizontal.clone().unwrap_or_else(|| "left".to_string()));
        style.vertical_align =
            Some(alignment.vertical.clone().unwrap_or_else(|| "middle".to_string()));
    }

    if let Some(border) = &format.border {
        style.border_top = Some(border_css(border.top.as_ref()));
        style.border_right = Some(border_css(border.right.as_ref()));
        style.border_bottom = Some(border_css(border.bottom.as_ref()));
        style.border_left = Some(border_css(border.left.as_ref()));
    }

    style.padding = Some(CELL_PADDING.to_string());
    style
}

/// The style every cell without explicit formatting gets.
pub fn plain_cell_style() -> CellStyle {
    extract_cell_style(&CellFormat::default())
}

fn border_css(side: Option<&BorderSideFormat>) -> String {
    let Some(side) = side else {
        return "none".to_string();
    };
    let width = if side.style == "thick" { "2px" } else { "1px" };
    let line = if side.style == "dotted" { "dotted" } else { "solid" };
    let color = side.color.as_deref().unwrap_or("#000000");
    format!("{width} {line} {color}")
}
