use crate::models::FieldValue;
use serde_json::Value;

/// Keep only the ASCII digits of a price string, e.g. `"$1.234.000"` -> `"1234000"`.
/// Text without digits yields an empty value; empty or non-text input is unresolved.
pub fn clean_price(value: Option<&str>) -> FieldValue {
    match value {
        Some(text) if !text.is_empty() => {
            FieldValue::Text(text.chars().filter(|c| c.is_ascii_digit()).collect())
        }
        _ => FieldValue::Unresolved,
    }
}

/// Parse a float and truncate it toward zero, e.g. `"55.7"` -> `55`.
pub fn extract_number(value: Option<&str>) -> FieldValue {
    match value.map(str::trim).and_then(|text| text.parse::<f64>().ok()) {
        Some(number) => truncate(number),
        None => FieldValue::Unresolved,
    }
}

/// Raw attribute passthrough; absent becomes unresolved.
pub fn passthrough(value: Option<&str>) -> FieldValue {
    FieldValue::from(value)
}

pub fn clean_price_json(value: Option<&Value>) -> FieldValue {
    match value {
        Some(Value::String(text)) => clean_price(Some(text.as_str())),
        _ => FieldValue::Unresolved,
    }
}

/// JSON variant of [`extract_number`]: numeric strings and JSON numbers both count,
/// and booleans read as `1`/`0`.
pub fn extract_number_json(value: Option<&Value>) -> FieldValue {
    match value {
        Some(Value::String(text)) => extract_number(Some(text.as_str())),
        Some(Value::Bool(flag)) => FieldValue::Integer(i64::from(*flag)),
        Some(Value::Number(number)) => match number.as_f64() {
            Some(n) => truncate(n),
            None => FieldValue::Unresolved,
        },
        _ => FieldValue::Unresolved,
    }
}

/// Strings and numbers are kept as they are; `null` or a missing key is unresolved.
pub fn passthrough_json(value: Option<&Value>) -> FieldValue {
    match value {
        None | Some(Value::Null) => FieldValue::Unresolved,
        Some(Value::String(text)) => FieldValue::text(text.as_str()),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(n) => FieldValue::Integer(n),
            None => FieldValue::Text(number.to_string()),
        },
        Some(other) => FieldValue::Text(other.to_string()),
    }
}

fn truncate(number: f64) -> FieldValue {
    // NaN, infinities and anything outside i64 have no integer form
    if !number.is_finite() || number >= i64::MAX as f64 || number < i64::MIN as f64 {
        return FieldValue::Unresolved;
    }
    FieldValue::Integer(number.trunc() as i64)
}
