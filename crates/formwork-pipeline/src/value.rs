//! Value predicates and coercions shared by the runner and the rule catalog.

use formwork_types::Equality;
use serde_json::Value;

/// A value is "empty" when it is null or the empty string. Absent paths
/// resolve to `""` through the accessor, so absence is covered too.
pub fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Display-style string coercion: strings pass through unquoted, scalars
/// format naturally, null becomes the empty string, containers serialize.
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Trim a string value; anything else passes through unchanged.
pub fn trim_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other,
    }
}

/// Compare two values under the given [`Equality`] mode.
///
/// `Coerce` reproduces loose form-validator comparison: numbers equal their
/// numeric-string renderings, booleans equal 0/1. `Strict` is plain JSON
/// equality.
pub fn values_equal(a: &Value, b: &Value, mode: Equality) -> bool {
    match mode {
        Equality::Strict => a == b,
        Equality::Coerce => loose_eq(a, b),
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            s.trim().parse::<f64>().ok() == n.as_f64()
        }
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Bool(flag), Value::Number(n)) | (Value::Number(n), Value::Bool(flag)) => {
            n.as_f64() == Some(if *flag { 1.0 } else { 0.0 })
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_values() {
        assert!(!has_value(&json!(null)));
        assert!(!has_value(&json!("")));
        assert!(has_value(&json!(" ")));
        assert!(has_value(&json!(0)));
        assert!(has_value(&json!(false)));
        assert!(has_value(&json!([])));
    }

    #[test]
    fn string_coercion() {
        assert_eq!(coerce_string(&json!("abc")), "abc");
        assert_eq!(coerce_string(&json!(12.5)), "12.5");
        assert_eq!(coerce_string(&json!(true)), "true");
        assert_eq!(coerce_string(&json!(null)), "");
    }

    #[test]
    fn trim_only_affects_strings() {
        assert_eq!(trim_value(json!("  abc ")), json!("abc"));
        assert_eq!(trim_value(json!(7)), json!(7));
        assert_eq!(trim_value(json!(null)), json!(null));
    }

    #[test]
    fn coerce_equality_crosses_types() {
        assert!(values_equal(&json!(5), &json!("5"), Equality::Coerce));
        assert!(values_equal(&json!("5.0"), &json!(5), Equality::Coerce));
        assert!(values_equal(&json!(true), &json!(1), Equality::Coerce));
        assert!(!values_equal(&json!("5x"), &json!(5), Equality::Coerce));
    }

    #[test]
    fn strict_equality_does_not_coerce() {
        assert!(!values_equal(&json!(5), &json!("5"), Equality::Strict));
        assert!(values_equal(&json!("win"), &json!("win"), Equality::Strict));
    }
}
