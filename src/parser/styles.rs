//! Style and value resolution - turns cellXfs entries into [`CellFormat`]s and
//! raw cell values into display text.

use crate::color::resolve_color;
use crate::numfmt::format_number;
use crate::types::{
    AlignmentFormat, BorderFormat, BorderSideFormat, CellFormat, CellXf, ColorSpec, FillFormat,
    FontFormat, RawBorderSide, StyleSheet,
};

use super::worksheet::{CellTypeTag, SheetContext};

/// Resolve one cellXfs entry into the formatting a cell carries.
///
/// The font always applies. Fill and border apply only when the xf points past
/// the default entry (index 0); alignment only when the xf has an
/// `<alignment>` element.
pub(super) fn resolve_cell_format(
    xf: &CellXf,
    stylesheet: &StyleSheet,
    theme_colors: &[String],
) -> CellFormat {
    let indexed = stylesheet.indexed_colors.as_deref();
    let color = |spec: Option<&ColorSpec>| spec.and_then(|c| resolve_color(c, theme_colors, indexed));

    let font = stylesheet
        .fonts
        .get(index(xf.font_id.unwrap_or(0)))
        .map(|font| FontFormat {
            bold: font.bold,
            italic: font.italic,
            underline: font.underline,
            size: font.size,
            color: color(font.color.as_ref()),
            color_source: font.color.as_ref().and_then(ColorSpec::source),
        });

    let fill = xf
        .fill_id
        .filter(|id| *id != 0)
        .and_then(|id| stylesheet.fills.get(index(id)))
        .map(|fill| FillFormat {
            pattern: fill.pattern_type.clone(),
            fg_color: color(fill.fg_color.as_ref()),
            bg_color: color(fill.bg_color.as_ref()),
        });

    let border = xf
        .border_id
        .filter(|id| *id != 0)
        .and_then(|id| stylesheet.borders.get(index(id)))
        .map(|border| {
            let side = |side: Option<&RawBorderSide>| {
                side.map(|s| BorderSideFormat {
                    style: s.style.clone(),
                    color: color(s.color.as_ref()),
                })
            };
            BorderFormat {
                top: side(border.top.as_ref()),
                right: side(border.right.as_ref()),
                bottom: side(border.bottom.as_ref()),
                left: side(border.left.as_ref()),
            }
        });

    let alignment = xf.alignment.as_ref().map(|a| AlignmentFormat {
        horizontal: a.horizontal.clone(),
        vertical: a.vertical.as_deref().map(css_vertical_align),
    });

    CellFormat {
        fill,
        font,
        alignment,
        border,
    }
}

/// OOXML names vertical centering `center`; CSS calls it `middle`.
fn css_vertical_align(value: &str) -> String {
    match value {
        "center" => "middle".to_string(),
        other => other.to_string(),
    }
}

fn index(id: u32) -> usize {
    usize::try_from(id).unwrap_or(usize::MAX)
}

/// Display text of a cell from its raw `<v>`/`<is>` content and type tag.
pub(super) fn resolve_cell_value(
    raw_value: Option<&str>,
    cell_type: CellTypeTag,
    style_idx: Option<u32>,
    ctx: &SheetContext<'_>,
) -> String {
    let Some(raw) = raw_value else {
        return String::new();
    };

    match cell_type {
        CellTypeTag::Shared => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|idx| ctx.shared_strings.get(idx))
            .cloned()
            .unwrap_or_else(|| {
                log::warn!("shared string index {raw:?} out of range");
                String::new()
            }),
        CellTypeTag::Str | CellTypeTag::Inline | CellTypeTag::Error => raw.to_string(),
        CellTypeTag::Bool => match raw.trim() {
            "1" | "true" => "TRUE".to_string(),
            "0" | "false" => "FALSE".to_string(),
            other => other.to_string(),
        },
        CellTypeTag::Default => match raw.trim().parse::<f64>() {
            Ok(number) => {
                let code = number_format_code(style_idx, ctx.stylesheet);
                format_number(number, code, ctx.date1904)
            }
            Err(_) => raw.to_string(),
        },
    }
}

/// Format code applying to a style index; General when none is declared.
fn number_format_code(style_idx: Option<u32>, stylesheet: &StyleSheet) -> &str {
    style_idx
        .and_then(|idx| stylesheet.cell_xfs.get(index(idx)))
        .and_then(|xf| xf.num_fmt_id)
        .and_then(|id| stylesheet.format_code(id))
        .unwrap_or("General")
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
    use crate::types::{ColorSource, RawAlignment, RawBorder, RawFill, RawFont};

    fn rgb(value: &str) -> Option<ColorSpec> {
        Some(ColorSpec {
            rgb: Some(value.to_string()),
            ..ColorSpec::default()
        })
    }

    fn sample_stylesheet() -> StyleSheet {
        StyleSheet {
            fonts: vec![
                RawFont {
                    size: Some(11.0),
                    ..RawFont::default()
                },
                RawFont {
                    bold: true,
                    size: Some(14.0),
                    color: rgb("FFFF0000"),
                    ..RawFont::default()
                },
            ],
            fills: vec![
                RawFill::default(),
                RawFill {
                    pattern_type: Some("solid".to_string()),
                    fg_color: rgb("FF000000"),
                    bg_color: None,
                },
            ],
            borders: vec![
                RawBorder::default(),
                RawBorder {
                    left: Some(RawBorderSide {
                        style: "thick".to_string(),
                        color: rgb("FF00FF00"),
                    }),
                    ..RawBorder::default()
                },
            ],
            cell_xfs: vec![
                CellXf::default(),
                CellXf {
                    font_id: Some(1),
                    fill_id: Some(1),
                    border_id: Some(1),
                    num_fmt_id: Some(10),
                    alignment: Some(RawAlignment {
                        horizontal: Some("center".to_string()),
                        vertical: Some("center".to_string()),
                    }),
                },
                CellXf {
                    font_id: Some(0),
                    fill_id: Some(0),
                    border_id: Some(0),
                    num_fmt_id: Some(164),
                    alignment: None,
                },
            ],
            num_fmts: vec![(164, "0.0".to_string())],
            indexed_colors: None,
        }
    }

    #[test]
    fn test_resolve_full_format() {
        let stylesheet = sample_stylesheet();
        let format = resolve_cell_format(&stylesheet.cell_xfs[1], &stylesheet, &[]);

        let font = format.font.unwrap();
        assert!(font.bold);
        assert_eq!(font.size, Some(14.0));
        assert_eq!(font.color.as_deref(), Some("#FF0000"));
        assert_eq!(font.color_source, Some(ColorSource::Rgb));

        let fill = format.fill.unwrap();
        assert_eq!(fill.pattern.as_deref(), Some("solid"));
        assert_eq!(fill.fg_color.as_deref(), Some("#000000"));

        let border = format.border.unwrap();
        let left = border.left.unwrap();
        assert_eq!(left.style, "thick");
        assert_eq!(left.color.as_deref(), Some("#00FF00"));
        assert!(border.top.is_none());

        let alignment = format.alignment.unwrap();
        assert_eq!(alignment.horizontal.as_deref(), Some("center"));
        assert_eq!(alignment.vertical.as_deref(), Some("middle"));
    }

    #[test]
    fn test_theme_font_color_keeps_its_source() {
        let mut stylesheet = sample_stylesheet();
        stylesheet.fonts[0].color = Some(ColorSpec {
            theme: Some(1),
            ..ColorSpec::default()
        });
        let format = resolve_cell_format(&stylesheet.cell_xfs[2], &stylesheet, &[]);
        let font = format.font.unwrap();
        assert_eq!(font.color.as_deref(), Some("#000000"));
        assert_eq!(font.color_source, Some(ColorSource::Theme));
    }

    #[test]
    fn test_vertical_values_other_than_center_pass_through() {
        assert_eq!(css_vertical_align("top"), "top");
        assert_eq!(css_vertical_align("bottom"), "bottom");
        assert_eq!(css_vertical_align("center"), "middle");
    }

    #[test]
    fn test_default_entries_carry_only_font() {
        let stylesheet = sample_stylesheet();
        let format = resolve_cell_format(&stylesheet.cell_xfs[2], &stylesheet, &[]);
        assert!(format.font.is_some());
        assert!(format.fill.is_none());
        assert!(format.border.is_none());
        assert!(format.alignment.is_none());
    }

    #[test]
    fn test_values_by_type() {
        let stylesheet = sample_stylesheet();
        let strings = vec!["alpha".to_string()];
        let ctx = SheetContext {
            shared_strings: &strings,
            stylesheet: &stylesheet,
            date1904: false,
        };

        assert_eq!(resolve_cell_value(Some("0"), CellTypeTag::Shared, None, &ctx), "alpha");
        assert_eq!(resolve_cell_value(Some("7"), CellTypeTag::Shared, None, &ctx), "");
        assert_eq!(resolve_cell_value(Some("1"), CellTypeTag::Bool, None, &ctx), "TRUE");
        assert_eq!(resolve_cell_value(Some("0"), CellTypeTag::Bool, None, &ctx), "FALSE");
        assert_eq!(resolve_cell_value(Some("#N/A"), CellTypeTag::Error, None, &ctx), "#N/A");
        assert_eq!(resolve_cell_value(None, CellTypeTag::Default, None, &ctx), "");
    }

    #[test]
    fn test_numbers_use_style_format() {
        let stylesheet = sample_stylesheet();
        let ctx = SheetContext {
            shared_strings: &[],
            stylesheet: &stylesheet,
            date1904: false,
        };

        assert_eq!(resolve_cell_value(Some("0.25"), CellTypeTag::Default, Some(1), &ctx), "25.00%");
        assert_eq!(resolve_cell_value(Some("2.345"), CellTypeTag::Default, Some(2), &ctx), "2.3");
        assert_eq!(resolve_cell_value(Some("2.5"), CellTypeTag::Default, None, &ctx), "2.5");
        assert_eq!(resolve_cell_value(Some("2.5"), CellTypeTag::Default, Some(99), &ctx), "2.5");
    }
}
