//! logsheet - spreadsheet log viewer
//!
//! Loads an XLSX workbook and renders one worksheet as a styled HTML table:
//! - Fill colors, fonts, alignment and borders
//! - Merged cells and embedded images
//! - Multiple sheets with tabs
//!
//! Runs natively (library and `logsheet_cli`) or in the browser via
//! WebAssembly.
//!
//! # Usage (Rust)
//!
//! ```no_run
//! let bytes = std::fs::read("log.xlsx")?;
//! let workbook = logsheet::parser::parse(&bytes)?;
//! let view = logsheet::load_sheet(&workbook, None)?;
//! let html = logsheet::render_table(&view, &logsheet::RenderOptions::default());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { SheetViewer } from 'logsheet';
//! await init();
//! const viewer = new SheetViewer();
//! viewer.mount(document.getElementById('app'));
//! ```

// Parsing modules
pub mod cell_ref;
pub mod color;
pub mod drawings;
pub mod error;
pub mod numfmt;
pub mod parser;
pub mod styles;
pub mod types;
pub mod xml_helpers;

// View modules
pub mod cell_style;
pub mod file_info;
pub mod loader;
pub mod render;
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use cell_ref::{column_letters, encode_address, resolve_address, resolve_range};
pub use cell_style::extract_cell_style;
pub use error::{LogsheetError, Result};
pub use file_info::{FileInfo, ACCEPTED_EXTENSIONS};
pub use loader::load_sheet;
pub use render::{render_page, render_table, PageModel, RenderOptions};
pub use viewer::{SheetViewer, ViewerState};

pub use types::*;

/// Render the first worksheet of an XLSX file as an HTML table.
///
/// # Errors
/// Returns an error if the XLSX file is invalid or has no worksheets.
#[wasm_bindgen(js_name = "renderXlsx")]
pub fn render_xlsx(data: &[u8]) -> std::result::Result<String, JsValue> {
    render_first_sheet(data).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Native counterpart of [`render_xlsx`].
///
/// # Errors
/// Returns an error if the XLSX file is invalid or has no worksheets.
pub fn render_first_sheet(data: &[u8]) -> Result<String> {
    let workbook = parser::parse(data)?;
    let view = load_sheet(&workbook, None)?;
    Ok(render_table(&view, &RenderOptions::default()))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
