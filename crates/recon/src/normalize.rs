//! Record normalizer: coerces raw field values into typed deals and companies.
//!
//! Nothing in here fails. Absent, blank or unparsable values fall back to a
//! documented default (0, `None`, `false`, an empty list or a placeholder).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::config::ReconConfig;
use crate::model::{Company, Deal, RawRecord};

/// Trimmed text, or `None` when absent, null or blank.
///
/// Integral numbers render without a fractional part so that `10`, `10.0`
/// and `"10"` all yield `"10"`.
pub fn text(value: Option<&Value>) -> Option<String> {
    let s = match value? {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Text with a placeholder for blank values.
pub fn text_or(value: Option<&Value>, placeholder: &str) -> String {
    text(value).unwrap_or_else(|| placeholder.to_string())
}

/// Monetary value in cents. Accepts numbers and numeric-looking strings
/// (currency symbols, thousands separators, surrounding whitespace).
/// Anything else is 0.
pub fn amount_cents(value: Option<&Value>) -> i64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_decimal(s),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => {
            let cents = (v * 100.0).round();
            if cents.abs() < i64::MAX as f64 {
                cents as i64
            } else {
                0
            }
        }
        _ => 0,
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    // Accounting negatives: "(1,200.00)"
    let (negative, body) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };
    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '€' | '£' | ' ' | '\u{a0}'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let v: f64 = cleaned.parse().ok()?;
    Some(if negative { -v } else { v })
}

/// Boolean-ish flag. `true`, `yes`, `y`, `t` and `1` (any case) are true.
pub fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "t" | "1"
        ),
        _ => false,
    }
}

/// Calendar date from the common CRM export shapes, else `None`.
pub fn date(value: Option<&Value>) -> Option<NaiveDate> {
    let s = text(value)?;
    if let Ok(d) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(&s, "%m/%d/%Y").ok()
}

/// Split a multi-valued field, trimming segments and dropping empty ones.
pub fn split_multi(value: Option<&Value>, delimiter: char) -> Vec<String> {
    match text(value) {
        Some(s) => s
            .split(delimiter)
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

impl Deal {
    /// Normalize one raw deal row. `row` is the 1-based position, used as
    /// the identifier when the record ID is blank.
    pub fn from_raw(raw: &RawRecord, row: usize, config: &ReconConfig) -> Self {
        let col = &config.deal_columns;
        let ph = &config.placeholders;
        let delim = config.delimiter_char();

        let brands = split_multi(raw.get(&col.brand), delim);
        Self {
            id: text(raw.get(&col.record_id)).unwrap_or_else(|| format!("row-{row}")),
            name: text_or(raw.get(&col.name), &ph.unnamed_deal),
            budget_cents: amount_cents(raw.get(&col.budget)),
            amount_cents: amount_cents(raw.get(&col.amount)),
            brand: text(raw.get(&col.brand)).unwrap_or_default(),
            brands,
            stage: text_or(raw.get(&col.stage), &ph.unknown),
            pipeline: text_or(raw.get(&col.pipeline), &ph.unknown),
            primary_company: text(raw.get(&col.primary_company)),
            associated_companies: split_multi(raw.get(&col.associated_companies), delim),
            close_date: date(raw.get(&col.close_date)),
            create_date: date(raw.get(&col.create_date)),
            is_closed_won: flag(raw.get(&col.is_closed_won)),
        }
    }
}

impl Company {
    pub fn from_raw(raw: &RawRecord, row: usize, config: &ReconConfig) -> Self {
        let col = &config.company_columns;
        Self {
            id: text(raw.get(&col.record_id)).unwrap_or_else(|| format!("row-{row}")),
            name: text_or(raw.get(&col.name), &config.placeholders.unnamed_company),
            domain: text(raw.get(&col.domain)),
            total_revenue_cents: amount_cents(raw.get(&col.total_revenue)),
        }
    }
}

/// Warn about configured columns absent from a table's first record.
/// Absent columns read as blank; they are never an error.
fn warn_missing_columns(table: &str, records: &[RawRecord], expected: &[(&str, &str)]) {
    let Some(first) = records.first() else {
        return;
    };
    for (field, column) in expected {
        if !first.fields.contains_key(*column) {
            log::warn!("{table}: column '{column}' ({field}) not found; values default to blank");
        }
    }
}

/// Normalize both tables.
pub fn normalize_input(
    deals: &[RawRecord],
    companies: &[RawRecord],
    config: &ReconConfig,
) -> (Vec<Deal>, Vec<Company>) {
    warn_missing_columns("deals", deals, &config.deal_columns.all());
    warn_missing_columns("companies", companies, &config.company_columns.all());

    let deals: Vec<Deal> = deals
        .iter()
        .enumerate()
        .map(|(i, r)| Deal::from_raw(r, i + 1, config))
        .collect();
    let companies: Vec<Company> = companies
        .iter()
        .enumerate()
        .map(|(i, r)| Company::from_raw(r, i + 1, config))
        .collect();

    let unnamed = deals.iter().filter(|d| d.name == config.placeholders.unnamed_deal).count();
    if !deals.is_empty() && unnamed == deals.len() {
        log::warn!(
            "every deal fell back to '{}'; is deal_columns.name ('{}') correct?",
            config.placeholders.unnamed_deal,
            config.deal_columns.name
        );
    }

    (deals, companies)
}
