//! Color resolution utilities
//!
//! Turns SpreadsheetML color references (ARGB, theme + tint, indexed) into
//! `#RRGGBB` strings and exposes channel math for contrast decisions.

use crate::types::ColorSpec;

/// Excel's 64 indexed colors (legacy palette)
pub const INDEXED_COLORS: [&str; 64] = [
    "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
    "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
    "#800000", "#008000", "#000080", "#808000", "#800080", "#008080", "#C0C0C0", "#808080",
    "#9999FF", "#993366", "#FFFFCC", "#CCFFFF", "#660066", "#FF8080", "#0066CC", "#CCCCFF",
    "#000080", "#FF00FF", "#FFFF00", "#00FFFF", "#800080", "#800000", "#008080", "#0000FF",
    "#00CCFF", "#CCFFFF", "#CCFFCC", "#FFFF99", "#99CCFF", "#FF99CC", "#CC99FF", "#FFCC99",
    "#3366FF", "#33CCCC", "#99CC00", "#FFCC00", "#FF9900", "#FF6600", "#666699", "#969696",
    "#003366", "#339966", "#003300", "#333300", "#993300", "#993366", "#333399", "#333333",
];

/// Office theme palette, indexed the way `theme="n"` attributes address it:
/// lt1, dk1, lt2, dk2, accent1-6, hlink, folHlink.
pub const DEFAULT_THEME_COLORS: [&str; 12] = [
    "#FFFFFF", "#000000", "#E7E6E6", "#44546A", "#4472C4", "#ED7D31", "#A5A5A5", "#FFC000",
    "#5B9BD5", "#70AD47", "#0563C1", "#954F72",
];

/// Resolve a `ColorSpec` to an uppercase `#RRGGBB` string.
///
/// Priority: rgb > theme (+tint) > indexed. `auto` resolves to `None` so the
/// renderer default applies.
pub fn resolve_color(
    color: &ColorSpec,
    theme_colors: &[String],
    indexed_colors: Option<&[String]>,
) -> Option<String> {
    if let Some(rgb) = &color.rgb {
        return normalize_argb(rgb);
    }

    if let Some(theme_idx) = color.theme {
        let idx = usize::try_from(theme_idx).ok()?;
        let base = theme_colors
            .get(idx)
            .map(String::as_str)
            .or_else(|| DEFAULT_THEME_COLORS.get(idx).copied())?;

        return match color.tint {
            Some(tint) if tint.abs() > f64::EPSILON => Some(apply_tint(base, tint)),
            _ => normalize_argb(base),
        };
    }

    if let Some(indexed) = color.indexed {
        // 64 is the system foreground
        if indexed == 64 {
            return Some("#000000".to_string());
        }
        let idx = usize::try_from(indexed).ok()?;
        let custom = indexed_colors.and_then(|palette| palette.get(idx)).cloned();
        return custom.or_else(|| INDEXED_COLORS.get(idx).map(|c| (*c).to_string()));
    }

    None
}

/// Normalize `AARRGGBB`, `RRGGBB` or `#RRGGBB` to `#RRGGBB`.
///
/// The alpha byte of ARGB input is dropped. Returns `None` for anything that
/// is not six or eight hex digits.
pub fn normalize_argb(value: &str) -> Option<String> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let rgb = match hex.len() {
        8 => hex.get(2..)?,
        6 => hex,
        _ => return None,
    };
    Some(format!("#{}", rgb.to_ascii_uppercase()))
}

/// Split `#RRGGBB` into its channels.
pub fn rgb_channels(hex_color: &str) -> Option<(u8, u8, u8)> {
    let hex = hex_color.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some((r, g, b))
}

/// Sum of the red, green and blue channels (0..=765).
pub fn brightness_sum(hex_color: &str) -> Option<u32> {
    rgb_channels(hex_color).map(|(r, g, b)| u32::from(r) + u32::from(g) + u32::from(b))
}

/// Apply a tint value to a color
/// tint < 0: shade (darken)
/// tint > 0: tint (lighten)
#[allow(clippy::many_single_char_names)]
pub fn apply_tint(hex_color: &str, tint: f64) -> String {
    let (r, g, b) = rgb_channels(hex_color).unwrap_or((0, 0, 0));
    let (h, s, l) = rgb_to_hsl(r, g, b);

    let new_l = if tint < 0.0 {
        l * (1.0 + tint)
    } else {
        (1.0 - l).mul_add(tint, l)
    };

    let (r, g, b) = hsl_to_rgb(h, s, new_l.clamp(0.0, 1.0));
    format!("#{r:02X}{g:02X}{b:02X}")
}

#[allow(clippy::many_single_char_names)]
fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < f64::EPSILON {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h / 6.0, s, l)
}

#[allow(clippy::many_single_char_names)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    // channel values are clamped to 0..=1 before scaling
    let to_byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

    if s.abs() < f64::EPSILON {
        let v = to_byte(l);
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l.mul_add(-s, l + s)
    };
    let p = 2.0f64.mul_add(l, -q);

    (
        to_byte(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_byte(hue_to_rgb(p, q, h)),
        to_byte(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        return ((q - p) * 6.0).mul_add(t, p);
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return ((q - p) * (2.0 / 3.0 - t)).mul_add(6.0, p);
    }
    p
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

    fn rgb(value: &str) -> ColorSpec {
        ColorSpec {
            rgb: Some(value.to_string()),
            ..ColorSpec::default()
        }
    }

    fn theme_palette() -> Vec<String> {
        DEFAULT_THEME_COLORS.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn test_argb_alpha_is_dropped() {
        assert_eq!(
            resolve_color(&rgb("FFFFFF00"), &[], None),
            Some("#FFFF00".to_string())
        );
        assert_eq!(
            resolve_color(&rgb("ff00ff00"), &[], None),
            Some("#00FF00".to_string())
        );
    }

    #[test]
    fn test_six_digit_and_hash_forms() {
        assert_eq!(normalize_argb("FF0000"), Some("#FF0000".to_string()));
        assert_eq!(normalize_argb("#00ff00"), Some("#00FF00".to_string()));
        assert_eq!(normalize_argb("FFF"), None);
        assert_eq!(normalize_argb("GGGGGGGG"), None);
    }

    #[test]
    fn test_theme_color_without_tint() {
        let color = ColorSpec {
            theme: Some(4),
            ..ColorSpec::default()
        };
        assert_eq!(
            resolve_color(&color, &theme_palette(), None),
            Some("#4472C4".to_string())
        );
    }

    #[test]
    fn test_theme_falls_back_to_default_palette() {
        let color = ColorSpec {
            theme: Some(1),
            ..ColorSpec::default()
        };
        assert_eq!(resolve_color(&color, &[], None), Some("#000000".to_string()));
    }

    #[test]
    fn test_tint_lighten_and_darken() {
        assert_eq!(apply_tint("#000000", 0.5), "#808080");
        assert_eq!(apply_tint("#FFFFFF", -0.5), "#808080");
    }

    #[test]
    fn test_indexed_colors() {
        let color = ColorSpec {
            indexed: Some(2),
            ..ColorSpec::default()
        };
        assert_eq!(resolve_color(&color, &[], None), Some("#FF0000".to_string()));

        let custom = vec!["#111111".to_string(), "#222222".to_string(), "#333333".to_string()];
        assert_eq!(
            resolve_color(&color, &[], Some(custom.as_slice())),
            Some("#333333".to_string())
        );

        let system = ColorSpec {
            indexed: Some(64),
            ..ColorSpec::default()
        };
        assert_eq!(resolve_color(&system, &[], None), Some("#000000".to_string()));
    }

    #[test]
    fn test_auto_and_empty_resolve_to_none() {
        let auto = ColorSpec {
            auto: true,
            ..ColorSpec::default()
        };
        assert_eq!(resolve_color(&auto, &[], None), None);
        assert_eq!(resolve_color(&ColorSpec::default(), &[], None), None);
    }

    #[test]
    fn test_brightness_sum() {
        assert_eq!(brightness_sum("#FFFFFF"), Some(765));
        assert_eq!(brightness_sum("#000000"), Some(0));
        assert_eq!(brightness_sum("#C8C8C9"), Some(601));
        assert_eq!(brightness_sum("nope"), None);
    }
}
