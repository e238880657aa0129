//! Conversion between A1-style cell references and zero-based addresses.

use crate::error::{LogsheetError, Result};
use crate::types::{CellAddress, MergedRange};

/// Resolve a reference like `"AB12"` into a zero-based [`CellAddress`].
///
/// The reference must be ASCII letters followed by ASCII digits. `$` markers
/// and surrounding whitespace are ignored; letters may be lowercase.
///
/// # Errors
/// Returns [`LogsheetError::InvalidAddress`] for anything else, including row
/// `0` and values that overflow `u32`.
pub fn resolve_address(reference: &str) -> Result<CellAddress> {
    parse_ref_bytes(reference.trim().as_bytes())
        .ok_or_else(|| LogsheetError::InvalidAddress(reference.to_string()))
}

/// Resolve `"TL:BR"` (or a single reference) into a [`MergedRange`].
///
/// Reversed corners are normalized.
///
/// # Errors
/// Returns [`LogsheetError::InvalidAddress`] if either endpoint is malformed.
pub fn resolve_range(reference: &str) -> Result<MergedRange> {
    match reference.split_once(':') {
        Some((start, end)) => {
            let start = resolve_address(start)?;
            let end = resolve_address(end)?;
            Ok(MergedRange::from_corners(start, end))
        }
        None => {
            let addr = resolve_address(reference)?;
            Ok(MergedRange::from_corners(addr, addr))
        }
    }
}

/// Encode a zero-based address back to its A1-style reference.
pub fn encode_address(addr: CellAddress) -> String {
    let mut out = column_letters(addr.col);
    out.push_str(&(u64::from(addr.row) + 1).to_string());
    out
}

/// Convert a 0-based column index to letters (A, B, ..., Z, AA, AB, ...).
#[allow(clippy::cast_possible_truncation)]
pub fn column_letters(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = u64::from(col) + 1;
    while n > 0 {
        n -= 1;
        // n % 26 < 26, always fits in u8
        letters.push(char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect()
}

fn parse_ref_bytes(bytes: &[u8]) -> Option<CellAddress> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for &b in bytes {
        match b {
            b'$' => {}
            b'A'..=b'Z' | b'a'..=b'z' if !saw_row => {
                let digit = u32::from(b.to_ascii_uppercase() - b'A') + 1;
                col = col.checked_mul(26)?.checked_add(digit)?;
                saw_col = true;
            }
            b'0'..=b'9' if saw_col => {
                row = row.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
                saw_row = true;
            }
            _ => return None,
        }
    }

    if !saw_col || !saw_row || row == 0 {
        return None;
    }

    Some(CellAddress::new(row - 1, col - 1))
}
