//! Metadata about the uploaded file, shown next to the rendered sheet.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Value for the file input's `accept` attribute. Only the XLSX family parses.
pub const ACCEPTED_EXTENSIONS: &str = ".xlsx,.xls,.csv,.ods,.xlsm,.xlsb,.xml";

const XLSX_FORMAT_LABEL: &str = "XLSX (Office 2007+ XML Format)";
const UNKNOWN_FORMAT_LABEL: &str = "Unknown Format";

/// Name, size, type and modification time of a loaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type as declared by the browser or guessed from the name.
    pub mime_type: String,
    /// Milliseconds since the Unix epoch.
    pub last_modified_ms: i64,
}

impl FileInfo {
    pub fn new(
        name: impl Into<String>,
        size: u64,
        mime_type: impl Into<String>,
        last_modified_ms: i64,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            last_modified_ms,
        }
    }

    /// Size in kibibytes.
    #[allow(clippy::cast_precision_loss)]
    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }

    /// e.g. "12.50 KB".
    pub fn size_display(&self) -> String {
        format!("{:.2} KB", self.size_kb())
    }

    pub fn format_label(&self) -> &'static str {
        if self.name.ends_with(".xlsx") {
            XLSX_FORMAT_LABEL
        } else {
            UNKNOWN_FORMAT_LABEL
        }
    }

    /// Modification time in the local time zone, or an empty string when the
    /// timestamp is out of range.
    pub fn last_modified_display(&self) -> String {
        self.last_modified_local()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }

    fn last_modified_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.last_modified_ms).single()
    }
}

/// MIME type for a file name, used when the caller has none to offer.
pub fn mime_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xlsm" => "application/vnd.ms-excel.sheet.macroEnabled.12",
        "xlsb" => "application/vnd.ms-excel.sheet.binary.macroEnabled.12",
        "xls" => "application/vnd.ms-excel",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "csv" => "text/csv",
        "xml" => "application/xml",
        _ => "application/octet-stream",
    }
}
