//! Kind-driven display formatting for cells and totals
//!
//! Numbers are rendered the way an en-US locale does: comma thousands
//! separators, up to three fraction digits for plain numbers and exactly two
//! for US-dollar amounts.

use super::cell::{Cell, CellKind};

/// Maximum fraction digits for plain number formatting
const NUMBER_MAX_FRACTION_DIGITS: usize = 3;

/// Fraction digits for currency formatting
const CURRENCY_FRACTION_DIGITS: usize = 2;

/// Parse a raw cell value as a finite decimal number
///
/// Surrounding whitespace is ignored. Empty strings, non-numeric text and
/// values that overflow to infinity (or spell out `inf`/`NaN`) are failures.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a cell for display according to its kind
///
/// Numeric kinds whose value does not parse fall back to the raw text.
pub fn format_for_display(cell: &Cell) -> String {
    match cell.kind {
        CellKind::Text => cell.value.clone(),
        CellKind::Number | CellKind::Currency => match parse_numeric(&cell.value) {
            Some(n) => format_value(n, cell.kind),
            None => cell.value.clone(),
        },
    }
}

/// Format an already-parsed number using the formatter for `kind`
pub fn format_value(value: f64, kind: CellKind) -> String {
    match kind {
        CellKind::Currency => format_currency(value),
        CellKind::Number | CellKind::Text => format_number(value),
    }
}

/// `1234.5` -> `$1,234.50`, `-3` -> `-$3.00`
pub fn format_currency(value: f64) -> String {
    let (negative, digits) = fixed_digits(value, CURRENCY_FRACTION_DIGITS);
    let (int_part, frac_part) = split_fraction(&digits);
    let sign = if negative { "-" } else { "" };
    format!("{}${}.{}", sign, group_thousands(int_part), frac_part)
}

/// `1234.5` -> `1,234.5`, `0.12345` -> `0.123`, `1000` -> `1,000`
pub fn format_number(value: f64) -> String {
    let (negative, digits) = fixed_digits(value, NUMBER_MAX_FRACTION_DIGITS);
    let (int_part, frac_part) = split_fraction(&digits);
    let frac_part = frac_part.trim_end_matches('0');
    let sign = if negative { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{}{}", sign, group_thousands(int_part))
    } else {
        format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
    }
}

/// Render `|value|` with a fixed number of decimals, reporting whether a
/// minus sign is needed. Values that round to zero are never negative.
fn fixed_digits(value: f64, decimals: usize) -> (bool, String) {
    let digits = format!("{:.*}", decimals, value.abs());
    let is_zero = digits.chars().all(|c| c == '0' || c == '.');
    (value < 0.0 && !is_zero, digits)
}

fn split_fraction(digits: &str) -> (&str, &str) {
    match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (digits, ""),
    }
}

/// Insert a comma between every group of three integer digits
fn group_thousands(int_digits: &str) -> String {
    let len = int_digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in int_digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
