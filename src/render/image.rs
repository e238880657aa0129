//! Inline images as base64 `data:` URIs.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::{LogsheetError, Result};
use crate::types::{ImageAttachment, ImageFormat};

const DATA_URI_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

/// Encode an attachment as `data:image/{ext};base64,{payload}`.
///
/// An attachment without an extension falls back to the format sniffed from
/// its leading bytes.
///
/// # Errors
/// [`LogsheetError::ImageDecode`] when the payload is empty or the extension
/// is not usable as a media subtype.
pub fn image_data_uri(image: &ImageAttachment) -> Result<String> {
    if image.data.is_empty() {
        return Err(LogsheetError::ImageDecode("empty image payload".to_string()));
    }
    let subtype = media_subtype(image)?;
    Ok(format!(
        "{DATA_URI_PREFIX}{subtype}{BASE64_MARKER}{}",
        BASE64.encode(&image.data)
    ))
}

/// Split a `data:image/...;base64,...` URI into its subtype and bytes.
///
/// # Errors
/// [`LogsheetError::ImageDecode`] when the URI is not a base64 image URI or
/// the payload is not valid base64.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| LogsheetError::ImageDecode("not an image data URI".to_string()))?;
    let (subtype, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or_else(|| LogsheetError::ImageDecode("data URI is not base64".to_string()))?;
    if !is_subtype_token(subtype) {
        return Err(LogsheetError::ImageDecode(format!(
            "invalid media subtype {subtype:?}"
        )));
    }
    let data = BASE64
        .decode(payload)
        .map_err(|e| LogsheetError::ImageDecode(e.to_string()))?;
    Ok((subtype.to_string(), data))
}

fn media_subtype(image: &ImageAttachment) -> Result<String> {
    let ext = image.extension.trim();
    if ext.is_empty() {
        return ImageFormat::from_magic_bytes(&image.data)
            .map(|format| format.extension().to_string())
            .ok_or_else(|| {
                LogsheetError::ImageDecode("no extension and unrecognised payload".to_string())
            });
    }
    if is_subtype_token(ext) {
        Ok(ext.to_ascii_lowercase())
    } else {
        Err(LogsheetError::ImageDecode(format!("invalid image extension {ext:?}")))
    }
}

fn is_subtype_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
