use crate::error::FieldCoercionAnomaly;
use crate::graph::{Field, FieldType, FieldValue, FileRef, NodeId};
use serde_json::{Number, Value, json};

/// Result of coercing one field: the value to emit, plus the anomaly when a
/// fallback had to be used.
pub struct Coerced {
    pub value: Value,
    pub anomaly: Option<FieldCoercionAnomaly>,
}

impl Coerced {
    fn ok(value: Value) -> Self {
        Self { value, anomaly: None }
    }
}

pub fn coerce_field(node_id: &NodeId, field: &Field) -> Coerced {
    let value = field.value.as_ref();
    let fallback = |fallback: Value, found: &FieldValue| Coerced {
        value: fallback,
        anomaly: Some(FieldCoercionAnomaly {
            node_id: node_id.clone(),
            label: field.label.clone(),
            expected: field.field_type,
            found: describe(found),
        }),
    };

    match field.field_type {
        FieldType::File => match value {
            None => Coerced::ok(Value::Null),
            Some(FieldValue::File(file)) => Coerced::ok(file_value(file)),
            Some(FieldValue::Text(s)) if s.is_empty() => Coerced::ok(Value::Null),
            Some(other) => fallback(Value::Null, other),
        },
        FieldType::Number => match value {
            None => Coerced::ok(Value::Null),
            Some(FieldValue::Text(s)) if s.trim().is_empty() => Coerced::ok(Value::Null),
            Some(found @ FieldValue::Number(n)) => match number_value(*n) {
                Some(v) => Coerced::ok(v),
                None => fallback(Value::Null, found),
            },
            Some(found @ FieldValue::Text(s)) => match s.trim().parse::<f64>().ok().and_then(number_value) {
                Some(v) => Coerced::ok(v),
                None => fallback(Value::Null, found),
            },
            Some(other) => fallback(Value::Null, other),
        },
        FieldType::Boolean => match value {
            None => Coerced::ok(Value::Bool(false)),
            Some(FieldValue::Bool(b)) => Coerced::ok(Value::Bool(*b)),
            Some(FieldValue::Text(s)) if s == "true" => Coerced::ok(Value::Bool(true)),
            Some(FieldValue::Text(s)) if s.is_empty() || s == "false" => Coerced::ok(Value::Bool(false)),
            Some(other) => fallback(Value::Bool(false), other),
        },
        FieldType::Array => match value {
            None => Coerced::ok(json!([])),
            Some(FieldValue::List(items)) => Coerced::ok(json!(items)),
            // An untouched input means no items, not one empty item.
            Some(FieldValue::Text(s)) if s.is_empty() => Coerced::ok(json!([])),
            Some(FieldValue::Text(s)) => Coerced::ok(json!(s.split(',').collect::<Vec<_>>())),
            Some(other) => fallback(json!([]), other),
        },
        FieldType::Text => match value {
            None => Coerced::ok(Value::String(String::new())),
            Some(FieldValue::Text(s)) => Coerced::ok(Value::String(s.clone())),
            Some(FieldValue::Bool(b)) => Coerced::ok(Value::Bool(*b)),
            Some(FieldValue::Number(n)) => Coerced::ok(number_value(*n).unwrap_or(Value::Null)),
            Some(FieldValue::List(items)) => Coerced::ok(json!(items)),
            Some(FieldValue::File(file)) => Coerced::ok(file_value(file)),
        },
    }
}

/// `{name, type, size, lastModified, content}`; content is `null` until loaded.
pub fn file_value(file: &FileRef) -> Value {
    serde_json::to_value(file).unwrap_or(Value::Null)
}

/// Finite numbers only. Whole values become JSON integers so `"5"` compiles to `5`.
fn number_value(n: f64) -> Option<Value> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Some(Value::Number(Number::from(n as i64)));
    }
    Number::from_f64(n).map(Value::Number)
}

fn describe(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => format!("string {:?}", s),
        FieldValue::Number(n) => format!("number {}", n),
        FieldValue::Bool(b) => format!("boolean {}", b),
        other => other.kind().to_string(),
    }
}
