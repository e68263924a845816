//! Parsing of completion responses into a replacement table
//!
//! The completion service is asked for a JSON object of the form:
//! ```text
//! {
//!   "headers": ["Feature", "Acme", "Globex"],
//!   "rows": [
//!     {"feature": "Price", "kind": "currency", "vendor1": "49", "vendor2": "59"}
//!   ]
//! }
//! ```
//! Language models like to wrap that object in prose or Markdown fences, so
//! extraction tries the raw text first, then a fenced block, then the
//! outermost pair of braces.

use super::cell::{Cell, CellKind};
use super::table::{Table, DEFAULT_HEADERS};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;

/// Matches a ```json ... ``` (or bare ```) fenced block
static FENCED_JSON_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*\})\s*```").unwrap());

/// Number of columns a generated table always has: feature plus two vendors
pub const GENERATED_COLUMN_COUNT: usize = 3;

/// Errors raised while turning a completion into a table
#[derive(Debug, Error)]
pub enum PopulateError {
    #[error("the response did not contain a JSON object")]
    NoPayload,

    #[error("the response is not a valid comparison table: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("the response contained no rows")]
    NoRows,

    #[error("row {row} has unknown kind '{kind}' (expected text, number or currency)")]
    UnknownKind { row: usize, kind: String },

    #[error("row {row} has a non-scalar value for '{field}'")]
    InvalidValue { row: usize, field: &'static str },
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    feature: serde_json::Value,
    kind: String,
    vendor1: serde_json::Value,
    vendor2: serde_json::Value,
}

/// Parse raw completion text into a three-column table
pub fn parse_completion(raw: &str) -> Result<Table, PopulateError> {
    let payload = extract_payload(raw)?;
    build_table(payload)
}

fn extract_payload(raw: &str) -> Result<RawPayload, PopulateError> {
    let trimmed = raw.trim();

    let mut candidates: Vec<&str> = vec![trimmed];
    if let Some(captures) = FENCED_JSON_REGEX.captures(trimmed) {
        if let Some(block) = captures.get(1) {
            candidates.push(block.as_str());
        }
    }
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            candidates.push(&trimmed[start..=end]);
        }
    }

    let mut last_error = None;
    for candidate in candidates {
        if !candidate.starts_with('{') {
            continue;
        }
        match serde_json::from_str::<RawPayload>(candidate) {
            Ok(payload) => return Ok(payload),
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => Err(PopulateError::Malformed(e)),
        None => Err(PopulateError::NoPayload),
    }
}

fn build_table(payload: RawPayload) -> Result<Table, PopulateError> {
    if payload.rows.is_empty() {
        return Err(PopulateError::NoRows);
    }

    let headers: Vec<String> = (0..GENERATED_COLUMN_COUNT)
        .map(|i| match payload.headers.get(i).map(|h| h.trim()) {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => DEFAULT_HEADERS[i].to_string(),
        })
        .collect();

    let mut rows = Vec::with_capacity(payload.rows.len());
    for (index, raw_row) in payload.rows.into_iter().enumerate() {
        let row_number = index + 1;
        let kind = CellKind::parse(&raw_row.kind).ok_or_else(|| PopulateError::UnknownKind {
            row: row_number,
            kind: raw_row.kind.clone(),
        })?;

        let feature = scalar_text(&raw_row.feature, row_number, "feature")?;
        let vendor1 = scalar_text(&raw_row.vendor1, row_number, "vendor1")?;
        let vendor2 = scalar_text(&raw_row.vendor2, row_number, "vendor2")?;

        rows.push(vec![
            Cell::text(feature),
            Cell::new(vendor1, kind),
            Cell::new(vendor2, kind),
        ]);
    }

    Ok(Table::from_parts(headers, rows))
}

/// Render a JSON scalar as the raw text a user would have typed
fn scalar_text(
    value: &serde_json::Value,
    row: usize,
    field: &'static str,
) -> Result<String, PopulateError> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Err(PopulateError::InvalidValue { row, field })
        }
    }
}
