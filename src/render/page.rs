//! Page chrome around the table: title bar, file input, file details, sheet
//! tabs and the error banner.

use super::html::{push_attr, push_text};
use super::table::render_table;
use super::RenderOptions;
use crate::file_info::{FileInfo, ACCEPTED_EXTENSIONS};
use crate::types::{SheetView, Workbook};

/// Everything the page shows, borrowed from the viewer state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageModel<'a> {
    /// Present while a file is loaded; drives the sheet tabs.
    pub workbook: Option<&'a Workbook>,
    pub active_sheet: Option<&'a str>,
    pub file_info: Option<&'a FileInfo>,
    /// Message of the last failed load or switch.
    pub error: Option<&'a str>,
    pub view: Option<&'a SheetView>,
}

/// Render the page body as an HTML fragment.
pub fn render_page(model: &PageModel<'_>, options: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"App p-4\"><div class=\"max-w-6xl mx-auto\">");

    out.push_str("<div class=\"flex items-center justify-between mb-6 border-b pb-4\">");
    out.push_str("<div class=\"text-2xl font-bold\">");
    push_text(&mut out, &options.title);
    out.push_str("</div><div class=\"text-gray-500\">");
    push_text(&mut out, &options.brand_label);
    out.push_str("</div></div>");

    out.push_str("<div class=\"mb-6\"><input type=\"file\"");
    push_attr(&mut out, "accept", ACCEPTED_EXTENSIONS);
    push_attr(&mut out, "class", "block w-full text-sm text-gray-500");
    out.push_str("></div>");

    if let Some(info) = model.file_info {
        push_file_info(&mut out, info);
    }

    if let Some(workbook) = model.workbook {
        out.push_str("<div class=\"flex gap-2 mb-4 overflow-x-auto\">");
        for name in workbook.sheet_names() {
            push_tab(&mut out, name, model.active_sheet == Some(name));
        }
        out.push_str("</div>");
    }

    if let Some(error) = model.error {
        out.push_str("<div class=\"mb-4 p-4 rounded-lg bg-red-50 text-red-700\" role=\"alert\">");
        push_text(&mut out, error);
        out.push_str("</div>");
    }

    if let Some(view) = model.view {
        out.push_str("<div class=\"overflow-x-auto border rounded-lg shadow\">");
        out.push_str(&render_table(view, options));
        out.push_str("</div>");
    }

    out.push_str("</div></div>");
    out
}

/// Render a standalone HTML document around [`render_page`].
pub fn render_document(model: &PageModel<'_>, options: &RenderOptions) -> String {
    let mut out = String::from("<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>");
    push_text(&mut out, &options.title);
    out.push_str("</title></head><body>");
    out.push_str(&render_page(model, options));
    out.push_str("</body></html>\n");
    out
}

fn push_file_info(out: &mut String, info: &FileInfo) {
    out.push_str("<div class=\"mb-6 p-4 bg-gray-50 rounded-lg\">");
    out.push_str("<h3 class=\"font-semibold mb-2\">File Information:</h3>");
    out.push_str("<ul class=\"space-y-1 text-sm\">");
    let items = [
        ("Name", info.name.clone()),
        ("Format", info.format_label().to_string()),
        ("Size", info.size_display()),
        ("Last Modified", info.last_modified_display()),
        ("Type", info.mime_type.clone()),
    ];
    for (label, value) in items {
        out.push_str("<li><strong>");
        out.push_str(label);
        out.push_str(":</strong> ");
        push_text(out, &value);
        out.push_str("</li>");
    }
    out.push_str("</ul></div>");
}

fn push_tab(out: &mut String, name: &str, active: bool) {
    let class = if active {
        "px-4 py-2 rounded whitespace-nowrap active bg-blue-500 text-white"
    } else {
        "px-4 py-2 rounded whitespace-nowrap bg-gray-200 hover:bg-gray-300"
    };
    out.push_str("<button type=\"button\"");
    push_attr(out, "data-sheet", name);
    push_attr(out, "class", class);
    out.push('>');
    push_text(out, name);
    out.push_str("</button>");
}
