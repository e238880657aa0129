//! HTML rendering.
//!
//! This module provides:
//! - `render_table`: a [`SheetView`](crate::types::SheetView) as a `<table>`
//! - `render_page`: the viewer page (title, file details, sheet tabs, table)
//! - data URI encoding for inline images
//! - HTML escaping

mod html;
mod image;
mod page;
mod table;

pub use html::{escape_attr, escape_text};
pub use image::{decode_data_uri, image_data_uri};
pub use page::{render_document, render_page, PageModel};
pub use table::render_table;

/// Presentation settings for the page and the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Page title.
    pub title: String,
    /// Label shown at the right of the title bar.
    pub brand_label: String,
    /// Case-insensitive substring that turns cell A1 into the logo.
    /// Empty disables the logo.
    pub brand_marker: String,
    pub logo_src: String,
    pub logo_alt: String,
    /// CSS `max-height` of inline images.
    pub image_max_height: String,
    /// CSS padding of cells that have no style of their own.
    pub cell_padding: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "Document Log Sheet".to_string(),
            brand_label: "PS DESIGN".to_string(),
            brand_marker: "psdesign".to_string(),
            logo_src: "/logo.png".to_string(),
            logo_alt: "PS DESIGN".to_string(),
            image_max_height: "100px".to_string(),
            cell_padding: "8px".to_string(),
        }
    }
}
