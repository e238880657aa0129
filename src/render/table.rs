//! `SheetView` to `<table>` markup.

use super::html::{push_attr, push_text};
use super::image::image_data_uri;
use super::RenderOptions;
use crate::types::{CellAddress, MergedRange, SheetView};

const LOGO_FALLBACK_SCRIPT: &str =
    "this.style.display='none';this.nextElementSibling.style.display='block';";

#[derive(Debug, Clone, Copy)]
enum CellTag {
    Header,
    Body,
}

impl CellTag {
    const fn name(self) -> &'static str {
        match self {
            Self::Header => "th",
            Self::Body => "td",
        }
    }

    const fn class(self) -> &'static str {
        match self {
            Self::Header => "border font-semibold text-left",
            Self::Body => "border",
        }
    }
}

/// Render the view as an HTML table.
///
/// Positions are sheet coordinates: the header is row 0 and `view.rows[i]`
/// is row `i + 1`. Cells covered by a merge, other than its start, are not
/// emitted. A merge that crosses from the header into the body is split at
/// that boundary, since spans do not carry across `<thead>` and `<tbody>`.
pub fn render_table(view: &SheetView, options: &RenderOptions) -> String {
    let cells = view.rows.len().saturating_add(1).saturating_mul(view.headers.len());
    let mut out = String::with_capacity(cells.saturating_mul(64));

    out.push_str("<table class=\"min-w-full border-collapse\">");
    out.push_str("<thead><tr>");
    for (col, text) in view.headers.iter().enumerate() {
        push_cell(&mut out, view, options, CellTag::Header, address(0, col), text);
    }
    out.push_str("</tr></thead>");

    out.push_str("<tbody>");
    for (body_idx, row) in view.rows.iter().enumerate() {
        out.push_str("<tr>");
        for (col, text) in row.iter().enumerate() {
            let addr = address(body_idx.saturating_add(1), col);
            push_cell(&mut out, view, options, CellTag::Body, addr, text);
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");

    out
}

fn address(row: usize, col: usize) -> CellAddress {
    CellAddress::new(
        u32::try_from(row).unwrap_or(u32::MAX),
        u32::try_from(col).unwrap_or(u32::MAX),
    )
}

fn push_cell(
    out: &mut String,
    view: &SheetView,
    options: &RenderOptions,
    tag: CellTag,
    addr: CellAddress,
    text: &str,
) {
    let merge = view.merge_at(addr).map(|range| section_part(*range, tag));
    if merge.is_some_and(|range| !range.is_start(addr)) {
        return;
    }

    out.push('<');
    out.push_str(tag.name());
    if let Some(range) = merge {
        if range.row_span() > 1 {
            push_attr(out, "rowspan", &range.row_span().to_string());
        }
        if range.col_span() > 1 {
            push_attr(out, "colspan", &range.col_span().to_string());
        }
    }
    push_attr(out, "class", tag.class());
    let css = match view.style_at(addr) {
        Some(style) => style.to_css(),
        None => format!("padding: {};", options.cell_padding),
    };
    push_attr(out, "style", &css);
    out.push('>');

    push_content(out, view, options, addr, text);

    out.push_str("</");
    out.push_str(tag.name());
    out.push('>');
}

/// The part of `range` inside the table section a cell of `tag` belongs to.
fn section_part(range: MergedRange, tag: CellTag) -> MergedRange {
    match tag {
        CellTag::Header => MergedRange {
            start: range.start,
            end: CellAddress::new(0, range.end.col),
        },
        CellTag::Body => MergedRange {
            start: CellAddress::new(range.start.row.max(1), range.start.col),
            end: range.end,
        },
    }
}

/// Brand logo at A1, then an anchored image, then the text.
fn push_content(
    out: &mut String,
    view: &SheetView,
    options: &RenderOptions,
    addr: CellAddress,
    text: &str,
) {
    if addr == CellAddress::new(0, 0) && contains_brand_marker(text, &options.brand_marker) {
        push_logo(out, options, text);
        return;
    }

    if let Some(image) = view.image_at(addr) {
        match image_data_uri(image) {
            Ok(uri) => {
                out.push_str("<img");
                push_attr(out, "src", &uri);
                push_attr(out, "alt", &format!("Cell content at {},{}", addr.row, addr.col));
                push_attr(out, "class", "max-w-full h-auto");
                push_attr(out, "style", &format!("max-height: {};", options.image_max_height));
                out.push('>');
            }
            Err(err) => log::warn!("image at {addr} not rendered: {err}"),
        }
        return;
    }

    push_text(out, text);
}

fn contains_brand_marker(text: &str, marker: &str) -> bool {
    !marker.is_empty() && text.to_lowercase().contains(&marker.to_lowercase())
}

fn push_logo(out: &mut String, options: &RenderOptions, text: &str) {
    out.push_str("<div class=\"flex items-center\"><img");
    push_attr(out, "src", &options.logo_src);
    push_attr(out, "alt", &options.logo_alt);
    push_attr(out, "class", "h-8 w-auto");
    push_attr(out, "onerror", LOGO_FALLBACK_SCRIPT);
    out.push_str("><span class=\"ml-2\" style=\"display: none;\">");
    push_text(out, text);
    out.push_str("</span></div>");
}
