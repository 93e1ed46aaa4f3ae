//! Form-input normalization for condition values.
//!
//! The rules UI submits loosely-typed values: comma-joined lists, string
//! booleans, numbers typed into text inputs. Coercion happens here, once,
//! at the save boundary; the evaluator only ever sees typed
//! [`ConditionValue`]s. All coercions are idempotent: feeding an
//! already-normalized value back through is a no-op.

use serde_json::Value;

use crate::facts::FieldDomain;
use crate::rule::{ConditionValue, Operator};

/// Coerce a raw JSON value into the typed condition value required by
/// the operator and field domain. Returns a human-readable message on
/// failure; the validator attaches it to the offending condition.
pub fn coerce_value(
    domain: FieldDomain,
    operator: Operator,
    raw: &Value,
) -> Result<ConditionValue, String> {
    if operator.is_list_valued() {
        return coerce_list(raw).map(ConditionValue::List);
    }
    match domain {
        FieldDomain::Boolean => coerce_bool(raw).map(ConditionValue::Bool),
        FieldDomain::Number => coerce_number(raw).map(ConditionValue::Number),
        FieldDomain::Text | FieldDomain::List => coerce_text(raw).map(ConditionValue::Text),
    }
}

/// Split a comma-joined string into trimmed, non-empty elements. An
/// existing string array is passed through untouched.
fn coerce_list(raw: &Value) -> Result<Vec<String>, String> {
    match raw {
        Value::String(s) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(format!("list elements must be strings, got {other}")),
            })
            .collect(),
        other => Err(format!(
            "expected a comma-separated string or a list of strings, got {other}"
        )),
    }
}

/// Accept native booleans and the string literals `"true"` / `"false"`.
fn coerce_bool(raw: &Value) -> Result<bool, String> {
    match raw {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(format!("expected 'true' or 'false', got '{other}'")),
        },
        other => Err(format!("expected a boolean, got {other}")),
    }
}

/// Accept native numbers and numeric strings.
fn coerce_number(raw: &Value) -> Result<f64, String> {
    match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("number {n} is out of range")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("expected a number, got '{s}'")),
        other => Err(format!("expected a number, got {other}")),
    }
}

fn coerce_text(raw: &Value) -> Result<String, String> {
    match raw {
        Value::String(s) => Ok(s.clone()),
        other => Err(format!("expected a string, got {other}")),
    }
}
