//! Value -> JSON conversion and old-format rewriting

use crate::{Value, convert::old_to_new, output::format_real};

use super::CliError;

/// Convert a ClassAd value to `serde_json::Value`.
///
/// Undefined becomes `null`. Error and non-finite reals have no JSON form
/// and are rendered as their ClassAd text.
pub fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Undefined => serde_json::Value::Null,
        Value::Error => serde_json::Value::String("error".to_string()),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Real(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(format_real(*f))),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::ClassAd(ad) => serde_json::Value::Object(
            ad.iter()
                .map(|(name, _)| (name.to_string(), value_to_json(&ad.evaluate_attr(name))))
                .collect(),
        ),
    }
}

/// Rewrites old-format records as bracketed records.
pub fn execute_convert(text: &str) -> Result<String, CliError> {
    Ok(old_to_new(text)?)
}
