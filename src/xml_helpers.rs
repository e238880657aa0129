//! Attribute extraction helpers shared by the package readers.
//!
//! Values are unescaped. Missing attributes, invalid UTF-8 and bad entity
//! references all yield `None`.

use std::borrow::Cow;

use quick_xml::events::BytesStart;

use crate::types::ColorSpec;

/// Extract a string attribute value by its full (possibly prefixed) key.
pub fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(Cow::into_owned))
}

/// Extract a string attribute by local name, ignoring any namespace prefix.
///
/// Needed for `r:id` / `r:embed`, whose prefix varies between producers.
pub fn attr_string_local(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(Cow::into_owned))
}

pub fn attr_u32(e: &BytesStart, key: &[u8]) -> Option<u32> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

pub fn attr_f64(e: &BytesStart, key: &[u8]) -> Option<f64> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

/// Extract a boolean attribute. `"1"` and `"true"` are true, anything else false.
pub fn attr_bool(e: &BytesStart, key: &[u8]) -> Option<bool> {
    attr_string(e, key).map(|s| matches!(s.as_str(), "1" | "true"))
}

/// The `val` attribute, ubiquitous in SpreadsheetML.
pub fn attr_val(e: &BytesStart) -> Option<String> {
    attr_string(e, b"val")
}

/// Toggle elements such as `<b/>` or `<i val="0"/>`: present means on unless `val` says otherwise.
pub fn toggle_val(e: &BytesStart) -> bool {
    attr_bool(e, b"val").unwrap_or(true)
}

/// Parse `rgb`, `theme`, `tint`, `indexed` and `auto` into a [`ColorSpec`].
pub fn parse_color_attrs(e: &BytesStart) -> ColorSpec {
    ColorSpec {
        rgb: attr_string(e, b"rgb"),
        theme: attr_u32(e, b"theme"),
        tint: attr_f64(e, b"tint"),
        indexed: attr_u32(e, b"indexed"),
        auto: attr_bool(e, b"auto").unwrap_or(false),
    }
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

    fn make_start(xml: &str) -> BytesStart<'_> {
        let content = xml
            .trim_start_matches('<')
            .trim_end_matches('>')
            .trim_end_matches('/')
            .trim_end();
        BytesStart::from_content(content, content.find(' ').unwrap_or(content.len()))
    }

    #[test]
    fn test_attr_string() {
        let e = make_start(r#"<sheet name="Log" />"#);
        assert_eq!(attr_string(&e, b"name"), Some("Log".to_string()));
        assert_eq!(attr_string(&e, b"missing"), None);
    }

    #[test]
    fn test_attr_string_unescapes_entities() {
        let e = make_start(r#"<sheet name="R&amp;D &lt;2024&gt;" />"#);
        assert_eq!(attr_string(&e, b"name"), Some("R&D <2024>".to_string()));
    }

    #[test]
    fn test_attr_string_local_ignores_prefix() {
        let e = make_start(r#"<a:blip r:embed="rId3" />"#);
        assert_eq!(attr_string(&e, b"embed"), None);
        assert_eq!(attr_string_local(&e, b"embed"), Some("rId3".to_string()));
    }

    #[test]
    fn test_attr_numbers() {
        let e = make_start(r#"<c s="7" sz="10.5" />"#);
        assert_eq!(attr_u32(&e, b"s"), Some(7));
        assert_eq!(attr_f64(&e, b"sz"), Some(10.5));
        assert_eq!(attr_u32(&e, b"sz"), None);
    }

    #[test]
    fn test_toggle_val() {
        assert!(toggle_val(&make_start("<b/>")));
        assert!(toggle_val(&make_start(r#"<b val="1"/>"#)));
        assert!(!toggle_val(&make_start(r#"<b val="0"/>"#)));
        assert!(!toggle_val(&make_start(r#"<i val="false"/>"#)));
    }

    #[test]
    fn test_parse_color_attrs() {
        let e = make_start(r#"<color rgb="FFFF0000" theme="1" tint="0.5" />"#);
        let color = parse_color_attrs(&e);
        assert_eq!(color.rgb, Some("FFFF0000".to_string()));
        assert_eq!(color.theme, Some(1));
        assert_eq!(color.tint, Some(0.5));
        assert_eq!(color.indexed, None);
        assert!(!color.auto);
    }
}
