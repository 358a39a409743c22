//! Boundary between the untyped search response and [`CardRecord`].
//!
//! Every "field may be missing or mistyped" decision lives here. Nothing in
//! this module fails: bad input degrades to absent fields or the numeric
//! sentinel.

use crate::card::{CardRecord, RawCardRecord, SearchPayload};
use serde_json::{Number, Value};

const UNKNOWN_SET: &str = "unknown-set";
const UNKNOWN_NUMBER: &str = "unknown-number";

/// Extracts and normalizes the card list of a search response. A `data`
/// value that is not an array is an empty result, not an error.
pub fn normalize_payload(payload: &SearchPayload) -> Vec<CardRecord> {
    match &payload.data {
        Value::Array(items) => items.iter().map(normalize_value).collect(),
        _ => Vec::new(),
    }
}

/// Normalizes one element of the `data` array. Anything that is not a JSON
/// object yields a record with every field absent.
pub fn normalize_value(value: &Value) -> CardRecord {
    match value {
        Value::Object(raw) => normalize_card(raw),
        _ => normalize_card(&RawCardRecord::new()),
    }
}

pub fn normalize_card(raw: &RawCardRecord) -> CardRecord {
    let set = text(raw, "Set");
    let number = text(raw, "Number");
    let id = format!(
        "{}-{}",
        truthy_text(raw.get("Set")).unwrap_or_else(|| UNKNOWN_SET.to_string()),
        truthy_text(raw.get("Number")).unwrap_or_else(|| UNKNOWN_NUMBER.to_string()),
    );

    CardRecord {
        set,
        number,
        name: text(raw, "Name"),
        card_type: text(raw, "Type"),
        aspects: list(raw, "Aspects"),
        traits: list(raw, "Traits"),
        arenas: list(raw, "Arenas"),
        cost: integer(raw, "Cost"),
        power: integer(raw, "Power"),
        hp: integer(raw, "HP"),
        front_text: text(raw, "FrontText"),
        double_sided: flag(raw, "DoubleSided"),
        rarity: text(raw, "Rarity"),
        unique: flag(raw, "Unique"),
        artist: text(raw, "Artist"),
        variant_type: text(raw, "VariantType"),
        market_price: text(raw, "MarketPrice"),
        foil_price: text(raw, "FoilPrice"),
        front_art: text(raw, "FrontArt"),
        id,
    }
}

fn text(raw: &RawCardRecord, key: &str) -> Option<String> {
    raw.get(key).and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// Integral floats print without a fractional part, so `5.0` keys the same
// as `5` in an id.
fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

// Id parts: absent, null, "", zero, `false`, arrays and objects fall back.
fn truthy_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64().map_or(false, |f| f == 0.0 || f.is_nan()) => None,
        Value::Bool(false) => None,
        other => scalar_text(other),
    }
}

fn list(raw: &RawCardRecord, key: &str) -> Option<Vec<String>> {
    match raw.get(key)? {
        Value::Array(items) => Some(items.iter().filter_map(scalar_text).collect()),
        Value::String(s) => Some(vec![s.clone()]),
        _ => None,
    }
}

fn flag(raw: &RawCardRecord, key: &str) -> Option<bool> {
    match raw.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn integer(raw: &RawCardRecord, key: &str) -> Option<i64> {
    match raw.get(key)? {
        Value::String(s) => parse_int_prefix(s),
        Value::Number(n) => parse_int_prefix(&number_text(n)),
        _ => None,
    }
}

/// Base-10 prefix parse: leading whitespace, an optional sign, then as many
/// ASCII digits as follow. Trailing text is ignored; no digits at all is the
/// sentinel. Out-of-range values saturate.
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let mut value: i64 = 0;
    for digit in digits.bytes().map(|b| i64::from(b - b'0')) {
        value = value.saturating_mul(10);
        value = if negative {
            value.saturating_sub(digit)
        } else {
            value.saturating_add(digit)
        };
    }
    Some(value)
}

#[cfg(test)]
#[path = "tests/normalizer_tests.rs"]
mod tests;
