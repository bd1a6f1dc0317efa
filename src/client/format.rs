//! Cell display formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::config::{CellFormat, GridLabels};

/// Formats one cell value for display.
///
/// `null` is always blank. Values a format cannot interpret (a word in a
/// number column, an unparseable date) fall back to their text form.
#[must_use]
pub fn format_value(value: &Value, format: CellFormat, labels: &GridLabels) -> String {
    if value.is_null() {
        return String::new();
    }

    let formatted = match format {
        CellFormat::Text => None,
        CellFormat::Number => format_number(value),
        CellFormat::Currency => format_currency(value, &labels.currency_suffix),
        CellFormat::Boolean => Some(if is_truthy(value) {
            labels.yes.clone()
        } else {
            labels.no.clone()
        }),
        CellFormat::Date => parse_datetime(value).map(|dt| dt.format("%Y-%m-%d").to_string()),
        CellFormat::DateTime => {
            parse_datetime(value).map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        },
    };

    formatted.unwrap_or_else(|| as_text(value))
}

/// Plain text form: strings verbatim, everything else as JSON.
#[must_use]
pub fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_number(value: &Value) -> Option<String> {
    if let Some(i) = value.as_i64() {
        return Some(group_thousands(&i.to_string()));
    }
    let n = as_f64(value)?;
    Some(group_thousands(&format!("{:.0}", unsigned_zero(n.round()))))
}

fn format_currency(value: &Value, suffix: &str) -> Option<String> {
    let n = as_f64(value)?;
    let cents = unsigned_zero((n * 100.0).round() / 100.0);
    let fixed = format!("{cents:.2}");
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let amount = format!("{}.{frac}", group_thousands(int_part));
    if suffix.is_empty() {
        Some(amount)
    } else {
        Some(format!("{amount} {suffix}"))
    }
}

/// Maps `-0.0` to `0.0` so a rounded-away negative prints without a sign.
fn unsigned_zero(n: f64) -> f64 {
    if n == 0.0 { 0.0 } else { n }
}

fn as_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Inserts `,` every three digits of an optionally signed integer string.
fn group_thousands(digits: &str) -> String {
    let (sign, digits) = digits
        .strip_prefix('-')
        .map_or(("", digits), |rest| ("-", rest));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false")
        },
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn parse_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc()),
        Value::String(s) => parse_datetime_str(s.trim()),
        _ => None,
    }
}

fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
