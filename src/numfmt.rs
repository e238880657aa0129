//! Number format application
//!
//! Turns a numeric cell value plus its format code into display text. Covers
//! the codes log sheets actually use: General, fixed decimals, thousands
//! separators, percentages, currency symbols, scientific notation and
//! date/time patterns. Up to three `;`-separated sections are honored
//! (positive, negative, zero). Color and condition brackets are ignored.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// Built-in number format IDs (0-49 are predefined by Excel).
pub const fn builtin_format(id: u32) -> Option<&'static str> {
    match id {
        0 => Some("General"),
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        5 => Some("$#,##0_);($#,##0)"),
        6 => Some("$#,##0_);[Red]($#,##0)"),
        7 => Some("$#,##0.00_);($#,##0.00)"),
        8 => Some("$#,##0.00_);[Red]($#,##0.00)"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00E+00"),
        12 => Some("# ?/?"),
        13 => Some("# ??/??"),
        14 => Some("mm-dd-yy"),
        15 => Some("d-mmm-yy"),
        16 => Some("d-mmm"),
        17 => Some("mmm-yy"),
        18 => Some("h:mm AM/PM"),
        19 => Some("h:mm:ss AM/PM"),
        20 => Some("h:mm"),
        21 => Some("h:mm:ss"),
        22 => Some("m/d/yy h:mm"),
        37 => Some("#,##0 ;(#,##0)"),
        38 => Some("#,##0 ;[Red](#,##0)"),
        39 => Some("#,##0.00;(#,##0.00)"),
        40 => Some("#,##0.00;[Red](#,##0.00)"),
        41 => Some("_(* #,##0_);_(* (#,##0);_(* \"-\"_);_(@_)"),
        42 => Some("_($* #,##0_);_($* (#,##0);_($* \"-\"_);_(@_)"),
        43 => Some("_(* #,##0.00_);_(* (#,##0.00);_(* \"-\"??_);_(@_)"),
        44 => Some("_($* #,##0.00_);_($* (#,##0.00);_($* \"-\"??_);_(@_)"),
        45 => Some("mm:ss"),
        46 => Some("[h]:mm:ss"),
        47 => Some("mmss.0"),
        48 => Some("##0.0E+0"),
        49 => Some("@"),
        _ => None,
    }
}

/// Format a numeric value with a format code.
pub fn format_number(value: f64, format_code: &str, date1904: bool) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let sections = split_sections(format_code);
    let (section, value) = match sections.as_slice() {
        [_, negative, ..] if value < 0.0 => (*negative, value.abs()),
        [_, _, zero, ..] if value == 0.0 => (*zero, value),
        [first, ..] => (*first, value),
        [] => ("General", value),
    };

    let section = section.trim();
    if section.is_empty() || section.eq_ignore_ascii_case("General") || section == "@" {
        return format_general(value);
    }

    if is_date_format(section) {
        return format_date(value, section, date1904).unwrap_or_else(|| format_general(value));
    }

    if section.contains("E+") || section.contains("e+") || section.contains("E-") {
        return format_scientific(value, section);
    }

    if section.contains('?') && section.contains('/') {
        // fractions are shown as plain numbers
        return format_general(value);
    }

    format_numeric(value, section)
}

/// Check if a format code is a date/time format.
pub fn is_date_format(format_code: &str) -> bool {
    let cleaned = strip_literals(&format_code.to_ascii_lowercase());
    let has_digit_placeholder = cleaned.contains('0') || cleaned.contains('#');

    cleaned.contains('y')
        || cleaned.contains('d')
        || cleaned.contains('h')
        || (cleaned.contains('m') && !has_digit_placeholder)
        || (cleaned.contains('s') && cleaned.contains(':'))
        || elapsed_marker(format_code)
}

/// Split a format code on `;` outside of quotes.
fn split_sections(format_code: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (idx, ch) in format_code.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                sections.push(format_code.get(start..idx).unwrap_or_default());
                start = idx + 1;
            }
            _ => {}
        }
    }
    sections.push(format_code.get(start..).unwrap_or_default());
    sections
}

/// Drop quoted text, bracketed codes and escaped characters.
fn strip_literals(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut chars = code.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            '\\' | '_' | '*' if !in_quotes && !in_brackets => {
                chars.next();
            }
            _ if !in_quotes && !in_brackets => out.push(ch),
            _ => {}
        }
    }
    out
}

fn elapsed_marker(code: &str) -> bool {
    let lower = code.to_ascii_lowercase();
    ["[h]", "[hh]", "[m]", "[mm]", "[s]", "[ss]"]
        .iter()
        .any(|marker| lower.contains(marker))
}

/// General format: integers as-is, otherwise up to ten decimals with trailing
/// zeros trimmed; very large or very small magnitudes use scientific notation.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn format_general(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e11 {
        // integral and within i64 range
        format!("{}", value as i64)
    } else if value.abs() >= 1e11 || (value.abs() < 1e-4 && value != 0.0) {
        format!("{value:.5E}")
    } else {
        let fixed = format!("{value:.10}");
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Numeric pattern such as `#,##0.00`, `0%` or `$#,##0_);($#,##0)`.
fn format_numeric(value: f64, section: &str) -> String {
    let (prefix, core, suffix) = split_numeric_core(section);

    let percent_count = prefix.matches('%').count() + suffix.matches('%').count();
    let mut scaled = value;
    for _ in 0..percent_count {
        scaled *= 100.0;
    }

    let (int_pattern, frac_pattern) = core.split_once('.').unwrap_or((core, ""));
    let min_decimals = frac_pattern.matches('0').count();
    let max_decimals = min_decimals + frac_pattern.matches(|c| c == '#' || c == '?').count();
    let min_int_digits = int_pattern.matches('0').count();
    let thousands = int_pattern.contains(',');

    let fixed = format!("{:.prec$}", scaled.abs(), prec = max_decimals.min(15));
    let (int_digits, frac_digits) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut frac = frac_digits.to_string();
    while frac.len() > min_decimals && frac.ends_with('0') {
        frac.pop();
    }

    let int_digits = int_digits.trim_start_matches('0');
    let mut int_text = if int_digits.len() < min_int_digits {
        format!("{int_digits:0>min_int_digits$}")
    } else {
        int_digits.to_string()
    };
    if thousands {
        int_text = group_thousands(&int_text);
    }

    let mut number = int_text;
    if !frac.is_empty() {
        number.push('.');
        number.push_str(&frac);
    }

    let negative = scaled < 0.0 && number.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&render_literals(prefix));
    out.push_str(&number);
    out.push_str(&render_literals(suffix));
    out
}

/// Split a numeric section into literal prefix, digit pattern and literal suffix.
fn split_numeric_core(section: &str) -> (&str, &str, &str) {
    let is_core = |ch: char| matches!(ch, '0' | '#' | '?' | '.' | ',');
    let start = section.find(is_core);
    let end = section.rfind(is_core);
    match (start, end) {
        (Some(start), Some(end)) => (
            section.get(..start).unwrap_or_default(),
            section.get(start..=end).unwrap_or_default(),
            section.get(end + 1..).unwrap_or_default(),
        ),
        _ => (section, "", ""),
    }
}

/// Render the literal parts of a section: quoted text and escapes are kept,
/// spacing (`_x`), fill (`*x`) and bracket codes are dropped.
fn render_literals(part: &str) -> String {
    let mut out = String::new();
    let mut chars = part.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => out.extend(chars.by_ref().take_while(|c| *c != '"')),
            '\\' => out.extend(chars.next()),
            '_' | '*' => {
                chars.next();
            }
            '[' => {
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Scientific notation such as `0.00E+00`.
#[allow(clippy::cast_possible_truncation)]
fn format_scientific(value: f64, section: &str) -> String {
    let upper = section.to_ascii_uppercase();
    let e_pos = upper.find('E').unwrap_or(upper.len());
    let mantissa_part = upper.get(..e_pos).unwrap_or_default();
    let exponent_part = upper.get(e_pos..).unwrap_or_default();

    let decimals = mantissa_part
        .split_once('.')
        .map_or(0, |(_, frac)| frac.matches(|c| c == '0' || c == '#').count());
    let exp_width = exponent_part.matches('0').count().max(2);

    let (mantissa, exponent) = if value == 0.0 {
        (0.0, 0)
    } else {
        // log10 of a finite non-zero f64 lies well within i32
        let exponent = value.abs().log10().floor() as i32;
        (value / 10f64.powi(exponent), exponent)
    };

    let sign = if exponent < 0 { '-' } else { '+' };
    format!(
        "{mantissa:.decimals$}E{sign}{:0>exp_width$}",
        exponent.unsigned_abs()
    )
}

#[derive(Debug, Clone, PartialEq)]
enum DateToken {
    Year(usize),
    Month(usize),
    Day(usize),
    Hour(usize),
    Minute(usize),
    Second(usize),
    AmPm { short: bool },
    ElapsedHours,
    ElapsedMinutes,
    ElapsedSeconds,
    Literal(String),
}

/// Convert an Excel serial number to a date-time.
///
/// The 1900 system counts 1900-02-29 as a real day, so serials below 60 are
/// shifted by one.
#[allow(clippy::cast_possible_truncation)]
pub fn serial_to_datetime(serial: f64, date1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_466.0 {
        return None;
    }
    let epoch = if date1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if serial < 60.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    // bounded above, fits in i64
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.and_hms_opt(0, 0, 0)?.checked_add_signed(Duration::seconds(seconds))
}

#[allow(clippy::cast_possible_truncation)]
fn format_date(value: f64, section: &str, date1904: bool) -> Option<String> {
    let dt = serial_to_datetime(value, date1904)?;
    let tokens = tokenize_date(section);
    let twelve_hour = tokens.iter().any(|t| matches!(t, DateToken::AmPm { .. }));

    let mut out = String::new();
    for token in &tokens {
        match token {
            DateToken::Year(n) if *n <= 2 => out.push_str(&dt.format("%y").to_string()),
            DateToken::Year(_) => out.push_str(&dt.format("%Y").to_string()),
            DateToken::Month(1) => out.push_str(&dt.format("%-m").to_string()),
            DateToken::Month(2) => out.push_str(&dt.format("%m").to_string()),
            DateToken::Month(3) => out.push_str(&dt.format("%b").to_string()),
            DateToken::Month(4) => out.push_str(&dt.format("%B").to_string()),
            DateToken::Month(_) => out.extend(dt.format("%B").to_string().chars().take(1)),
            DateToken::Day(1) => out.push_str(&dt.format("%-d").to_string()),
            DateToken::Day(2) => out.push_str(&dt.format("%d").to_string()),
            DateToken::Day(3) => out.push_str(&dt.format("%a").to_string()),
            DateToken::Day(_) => out.push_str(&dt.format("%A").to_string()),
            DateToken::Hour(n) => {
                let hour = if twelve_hour {
                    dt.hour12().1
                } else {
                    dt.hour()
                };
                push_padded(&mut out, hour, *n);
            }
            DateToken::Minute(n) => push_padded(&mut out, dt.minute(), *n),
            DateToken::Second(n) => push_padded(&mut out, dt.second(), *n),
            DateToken::AmPm { short } => {
                let pm = dt.hour12().0;
                out.push_str(match (pm, short) {
                    (true, false) => "PM",
                    (false, false) => "AM",
                    (true, true) => "P",
                    (false, true) => "A",
                });
            }
            // value is non-negative and bounded by serial_to_datetime
            DateToken::ElapsedHours => out.push_str(&((value * 24.0).floor() as i64).to_string()),
            DateToken::ElapsedMinutes => {
                out.push_str(&((value * 1_440.0).floor() as i64).to_string());
            }
            DateToken::ElapsedSeconds => {
                out.push_str(&((value * 86_400.0).round() as i64).to_string());
            }
            DateToken::Literal(text) => out.push_str(text),
        }
    }
    Some(out)
}

fn push_padded(out: &mut String, value: u32, width: usize) {
    if width >= 2 {
        out.push_str(&format!("{value:02}"));
    } else {
        out.push_str(&value.to_string());
    }
}

fn tokenize_date(section: &str) -> Vec<DateToken> {
    let chars: Vec<char> = section.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while let Some(&ch) = chars.get(i) {
        let lower = ch.to_ascii_lowercase();
        match lower {
            '"' => {
                let literal: String = chars
                    .iter()
                    .skip(i + 1)
                    .take_while(|c| **c != '"')
                    .collect();
                i += literal.chars().count() + 2;
                tokens.push(DateToken::Literal(literal));
            }
            '\\' => {
                if let Some(next) = chars.get(i + 1) {
                    tokens.push(DateToken::Literal(next.to_string()));
                }
                i += 2;
            }
            '_' | '*' => i += 2,
            '[' => {
                let inner: String = chars
                    .iter()
                    .skip(i + 1)
                    .take_while(|c| **c != ']')
                    .collect();
                i += inner.chars().count() + 2;
                match inner.to_ascii_lowercase().as_str() {
                    "h" | "hh" => tokens.push(DateToken::ElapsedHours),
                    "m" | "mm" => tokens.push(DateToken::ElapsedMinutes),
                    "s" | "ss" => tokens.push(DateToken::ElapsedSeconds),
                    _ => {}
                }
            }
            'a' if starts_with_ignore_case(&chars, i, "am/pm") => {
                tokens.push(DateToken::AmPm { short: false });
                i += 5;
            }
            'a' if starts_with_ignore_case(&chars, i, "a/p") => {
                tokens.push(DateToken::AmPm { short: true });
                i += 3;
            }
            'y' | 'm' | 'd' | 'h' | 's' => {
                let run = chars
                    .iter()
                    .skip(i)
                    .take_while(|c| c.to_ascii_lowercase() == lower)
                    .count();
                tokens.push(match lower {
                    'y' => DateToken::Year(run),
                    'm' => DateToken::Month(run),
                    'd' => DateToken::Day(run),
                    'h' => DateToken::Hour(run),
                    _ => DateToken::Second(run),
                });
                i += run;
            }
            _ => {
                tokens.push(DateToken::Literal(ch.to_string()));
                i += 1;
            }
        }
    }

    resolve_minutes(&mut tokens);
    tokens
}

fn starts_with_ignore_case(chars: &[char], at: usize, pattern: &str) -> bool {
    pattern
        .chars()
        .enumerate()
        .all(|(offset, p)| chars.get(at + offset).is_some_and(|c| c.eq_ignore_ascii_case(&p)))
}

/// An `m` run directly after an hour or directly before a second is minutes.
fn resolve_minutes(tokens: &mut [DateToken]) {
    let mut minute_positions = Vec::new();
    for (idx, token) in tokens.iter().enumerate() {
        let DateToken::Month(run) = token else {
            continue;
        };
        if *run > 2 {
            continue;
        }
        let before = tokens
            .get(..idx)
            .and_then(|head| head.iter().rev().find(|t| !matches!(t, DateToken::Literal(_))));
        let after = tokens
            .get(idx + 1..)
            .and_then(|tail| tail.iter().find(|t| !matches!(t, DateToken::Literal(_))));
        let after_hour =
            before.is_some_and(|t| matches!(t, DateToken::Hour(_) | DateToken::ElapsedHours));
        let before_second = after.is_some_and(|t| matches!(t, DateToken::Second(_)));
        if after_hour || before_second {
            minute_positions.push((idx, *run));
        }
    }

    for (idx, run) in minute_positions {
        if let Some(token) = tokens.get_mut(idx) {
            *token = DateToken::Minute(run);
        }
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

    #[test]
    fn test_builtin_format_lookup() {
        assert_eq!(builtin_format(0), Some("General"));
        assert_eq!(builtin_format(14), Some("mm-dd-yy"));
        assert_eq!(builtin_format(49), Some("@"));
        assert_eq!(builtin_format(30), None);
        assert_eq!(builtin_format(164), None);
    }

    #[test]
    fn test_general() {
        assert_eq!(format_number(42.0, "General", false), "42");
        assert_eq!(format_number(1234.5, "General", false), "1234.5");
        assert_eq!(format_number(0.1 + 0.2, "General", false), "0.3");
        assert_eq!(format_number(-7.0, "General", false), "-7");
        assert_eq!(format_number(12.0, "@", false), "12");
    }

    #[test]
    fn test_fixed_decimals_and_thousands() {
        assert_eq!(format_number(3.14159, "0.00", false), "3.14");
        assert_eq!(format_number(2.0, "0", false), "2");
        assert_eq!(format_number(1_234_567.0, "#,##0", false), "1,234,567");
        assert_eq!(format_number(1234.5, "#,##0.00", false), "1,234.50");
        assert_eq!(format_number(-1234.5, "#,##0.00", false), "-1,234.50");
        assert_eq!(format_number(0.5, "#.00", false), ".50");
    }

    #[test]
    fn test_percent() {
        assert_eq!(format_number(0.256, "0%", false), "26%");
        assert_eq!(format_number(0.25, "0.00%", false), "25.00%");
    }

    #[test]
    fn test_sections_and_currency() {
        let code = builtin_format(7).unwrap();
        assert_eq!(format_number(1234.5, code, false), "$1,234.50");
        assert_eq!(format_number(-1234.5, code, false), "($1,234.50)");
        assert_eq!(format_number(0.0, "0.00;-0.00;\"zero\"", false), "zero");
    }

    #[test]
    fn test_scientific() {
        assert_eq!(format_number(12345.0, "0.00E+00", false), "1.23E+04");
        assert_eq!(format_number(0.00012, "0.0E+00", false), "1.2E-04");
    }

    #[test]
    fn test_dates() {
        assert_eq!(format_number(45292.0, "mm-dd-yy", false), "01-01-24");
        assert_eq!(format_number(45292.0, "d-mmm-yy", false), "1-Jan-24");
        assert_eq!(format_number(45292.0, "yyyy-mm-dd", false), "2024-01-01");
        assert_eq!(format_number(45292.5, "yyyy-mm-dd hh:mm", false), "2024-01-01 12:00");
        assert_eq!(format_number(45292.0, "dddd", false), "Monday");
        assert_eq!(format_number(1.0, "yyyy-mm-dd", false), "1900-01-01");
    }

    #[test]
    fn test_times() {
        assert_eq!(format_number(0.75, "h:mm AM/PM", false), "6:00 PM");
        assert_eq!(format_number(0.25, "h:mm:ss", false), "6:00:00");
        assert_eq!(format_number(1.5, "[h]:mm:ss", false), "36:00:00");
        assert_eq!(format_number(0.0, "mm:ss", false), "00:00");
    }

    #[test]
    fn test_1904_system() {
        assert_eq!(format_number(0.0, "yyyy-mm-dd", true), "1904-01-01");
    }

    #[test]
    fn test_is_date_format() {
        assert!(is_date_format("yyyy-mm-dd"));
        assert!(is_date_format("h:mm"));
        assert!(is_date_format("[h]:mm:ss"));
        assert!(!is_date_format("0.00"));
        assert!(!is_date_format("#,##0"));
        assert!(!is_date_format("\"Day\" 0"));
    }
}
