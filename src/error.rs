//! Structured error types for logsheet.

/// All errors that can occur while loading and rendering a workbook.
#[derive(Debug, thiserror::Error)]
pub enum LogsheetError {
    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A cell reference that is not `<letters><digits>`.
    #[error("Invalid cell address: {0:?}")]
    InvalidAddress(String),

    /// The requested worksheet does not exist in the workbook.
    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),

    /// A package part the workbook cannot be read without.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// An image attachment that cannot be turned into an inline image.
    #[error("Image decode failed: {0}")]
    ImageDecode(String),

    /// General parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A newer load was started before this one finished.
    #[error("Load superseded by a newer request")]
    Superseded,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LogsheetError>;

impl From<String> for LogsheetError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for LogsheetError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<LogsheetError> for wasm_bindgen::JsValue {
    fn from(e: LogsheetError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
