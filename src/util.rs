// Utility helpers for parsing and number formatting.
//
// This module centralizes the "dirty" CSV cell handling so the rest of the
// code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a spreadsheet cell into `f64` while being forgiving about
/// formatting issues common in statistical exports.
///
/// - Trims whitespace.
/// - Treats empty cells and the usual placeholders (`n/a`, `--`, `..`) as missing.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that does not parse to a finite number.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if matches!(s.to_ascii_lowercase().as_str(), "n/a" | "na" | "nan" | "--" | "..") {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>().ok()
}

/// A header is a year column when it is made only of digits.
pub fn parse_year_header(h: &str) -> Option<i32> {
    let h = h.trim();
    if h.is_empty() || !h.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    parse_i32_safe(Some(h))
}

pub fn format_number(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return "n/a".to_string();
    }
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // `num-format` inserts the thousands separators.
    let mut res = match int_part.parse::<i64>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// `format_number` for optional values, rendering missing as an empty cell.
pub fn format_opt(n: Option<f64>, decimals: usize) -> String {
    n.map(|v| format_number(v, decimals)).unwrap_or_default()
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
