//! Built-in rule catalog: validator, transform, and custom-adapter
//! constructors.
//!
//! Every constructor returns an [`Operation`] ready to append to a field's
//! chain. Each validator embeds its default message template; pass
//! `Some("...")` to override it. `%s` in a template is replaced with the
//! field label at emission time.

use std::future::Future;

use email_address::EmailAddress;
use formwork_types::Equality;
use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::operation::{Operation, StepError, Verdict};
use crate::path;
use crate::value::{coerce_string, has_value, trim_value, values_equal};

fn check(
    name: &'static str,
    template: String,
    test: impl Fn(&Value, &Value) -> bool + Send + Sync + 'static,
) -> Operation {
    Operation::validate(name, move |value, source| {
        if test(value, source) {
            Verdict::Valid
        } else {
            Verdict::Reject(template.clone())
        }
    })
}

fn message_or(message: Option<&str>, default: &str) -> String {
    message.unwrap_or(default).to_string()
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

pub fn email(message: Option<&str>) -> Operation {
    let template = message_or(message, "%s is not an email address");
    check("email", template, |value, _| {
        value.as_str().is_some_and(EmailAddress::is_valid)
    })
}

pub fn url(message: Option<&str>) -> Operation {
    let template = message_or(message, "%s is not a URL");
    check("url", template, |value, _| {
        value.as_str().is_some_and(|s| Url::parse(s).is_ok())
    })
}

pub fn ip(message: Option<&str>) -> Operation {
    let template = message_or(message, "%s is not an IP address");
    check("ip", template, |value, _| {
        value
            .as_str()
            .is_some_and(|s| s.parse::<std::net::IpAddr>().is_ok())
    })
}

/// Accepts RFC 3339 timestamps and `YYYY-MM-DD` calendar dates.
pub fn date(message: Option<&str>) -> Operation {
    let template = message_or(message, "%s is not a date");
    check("date", template, |value, _| {
        value.as_str().is_some_and(|s| {
            chrono::DateTime::parse_from_rfc3339(s).is_ok()
                || chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        })
    })
}

pub fn alpha(message: Option<&str>) -> Operation {
    let template = message_or(message, "%s contains non-letter characters");
    check("alpha", template, |value, _| {
        let s = coerce_string(value);
        !s.is_empty() && s.chars().all(char::is_alphabetic)
    })
}

pub fn alphanumeric(message: Option<&str>) -> Operation {
    let template = message_or(message, "%s contains non alpha-numeric characters");
    check("alphanumeric", template, |value, _| {
        let s = coerce_string(value);
        !s.is_empty() && s.chars().all(char::is_alphanumeric)
    })
}

/// Any numeric value is valid, not just integers.
pub fn numeric(message: Option<&str>) -> Operation {
    let template = message_or(message, "%s is not a number");
    check("numeric", template, |value, _| match value {
        Value::Number(_) => true,
        Value::String(s) => is_numeric_str(s, false),
        _ => false,
    })
}

pub fn integer(message: Option<&str>) -> Operation {
    let template = message_or(message, "%s is not an integer");
    check("integer", template, |value, _| match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => s.parse::<i64>().is_ok(),
        _ => false,
    })
}

/// A number with a fractional part, or a string with an explicit decimal
/// point. Integers are not decimals.
pub fn decimal(message: Option<&str>) -> Operation {
    let template = message_or(message, "%s is not a decimal");
    check("decimal", template, |value, _| match value {
        Value::Number(n) => n.as_f64().is_some_and(|f| f.fract() != 0.0),
        Value::String(s) => is_numeric_str(s, true),
        _ => false,
    })
}

pub fn lowercase(message: Option<&str>) -> Operation {
    let template = message_or(message, "%s contains uppercase letters");
    check("lowercase", template, |value, _| {
        !coerce_string(value).chars().any(char::is_uppercase)
    })
}

pub fn uppercase(message: Option<&str>) -> Operation {
    let template = message_or(message, "%s contains lowercase letters");
    check("uppercase", template, |value, _| {
        !coerce_string(value).chars().any(char::is_lowercase)
    })
}

pub fn is_string(message: Option<&str>) -> Operation {
    let template = message_or(message, "%s is not a string");
    check("is_string", template, |value, _| value.is_string())
}

pub fn not_empty(message: Option<&str>) -> Operation {
    let template = message_or(message, "%s has no value or is only whitespace");
    check("not_empty", template, |value, _| {
        !coerce_string(value).trim().is_empty()
    })
}

/// Rejects empty values, and values equal to `placeholder` when one is given
/// (useful for "select one..." sentinel entries).
pub fn required(placeholder: Option<Value>, message: Option<&str>) -> Operation {
    let template = message_or(message, "%s is required");
    check("required", template, move |value, _| {
        if !has_value(value) {
            return false;
        }
        match &placeholder {
            Some(p) => !values_equal(value, p, Equality::Coerce),
            None => true,
        }
    })
}

pub fn min_length(length: usize, message: Option<&str>) -> Operation {
    let template = message_or(message, "%s is too short");
    check("min_length", template, move |value, _| {
        coerce_string(value).chars().count() >= length
    })
}

pub fn max_length(length: usize, message: Option<&str>) -> Operation {
    let template = message_or(message, "%s is too long");
    check("max_length", template, move |value, _| {
        coerce_string(value).chars().count() <= length
    })
}

/// Length bounds checked against the value itself. One override message, if
/// given, replaces both defaults.
pub fn length_between(from: usize, to: usize, message: Option<&str>) -> Operation {
    let too_short = message_or(message, "%s is too short");
    let too_long = message_or(message, "%s is too long");
    Operation::validate("length_between", move |value, _| {
        let count = coerce_string(value).chars().count();
        if count < from {
            Verdict::Reject(too_short.clone())
        } else if count > to {
            Verdict::Reject(too_long.clone())
        } else {
            Verdict::Valid
        }
    })
}

pub fn equals(expected: Value, mode: Equality, message: Option<&str>) -> Operation {
    let template = message.map(str::to_string);
    Operation::validate("equals", move |value, _| {
        if values_equal(value, &expected, mode) {
            Verdict::Valid
        } else {
            let fallback = format!("%s does not equal {}", coerce_string(&expected));
            Verdict::Reject(template.clone().unwrap_or(fallback))
        }
    })
}

/// Compares against another field's value, resolved from the source at run
/// time.
pub fn equals_field(other: &str, mode: Equality, message: Option<&str>) -> Operation {
    let other = other.to_string();
    let template = message.map(str::to_string);
    Operation::validate("equals_field", move |value, source| {
        let expected = path::get(&other, source);
        if values_equal(value, &expected, mode) {
            Verdict::Valid
        } else {
            let fallback = format!("%s does not equal {}", coerce_string(&expected));
            Verdict::Reject(template.clone().unwrap_or(fallback))
        }
    })
}

pub fn contains(needle: &str, message: Option<&str>) -> Operation {
    let template = message_or(message, "%s does not contain required characters");
    let needle = needle.to_string();
    check("contains", template, move |value, _| {
        coerce_string(value).contains(&needle)
    })
}

pub fn not_contains(needle: &str, message: Option<&str>) -> Operation {
    let template = message_or(message, "%s contains invalid characters");
    let needle = needle.to_string();
    check("not_contains", template, move |value, _| {
        !coerce_string(value).contains(&needle)
    })
}

/// Takes a compiled pattern so malformed patterns fail at the declaration
/// site, not at run time.
pub fn matches(pattern: Regex, message: Option<&str>) -> Operation {
    let template = message_or(message, "%s has invalid characters");
    check("matches", template, move |value, _| {
        pattern.is_match(&coerce_string(value))
    })
}

pub fn not_matches(pattern: Regex, message: Option<&str>) -> Operation {
    let template = message_or(message, "%s has invalid characters");
    check("not_matches", template, move |value, _| {
        !pattern.is_match(&coerce_string(value))
    })
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

/// Trim surrounding whitespace from string values; pass anything else
/// through. Also applied ahead of the chain when `RunOptions::auto_trim` is
/// set.
pub fn trim() -> Operation {
    Operation::transform("trim", |value, _| trim_value(value.clone()))
}

pub fn if_null(replacement: Value) -> Operation {
    Operation::transform("if_null", move |value, _| {
        if has_value(value) {
            value.clone()
        } else {
            replacement.clone()
        }
    })
}

pub fn to_upper() -> Operation {
    Operation::transform("to_upper", |value, _| {
        Value::String(coerce_string(value).to_uppercase())
    })
}

pub fn to_lower() -> Operation {
    Operation::transform("to_lower", |value, _| {
        Value::String(coerce_string(value).to_lowercase())
    })
}

/// Shorten to `length` characters, replacing the tail with `...`.
pub fn truncate(length: usize) -> Operation {
    Operation::transform("truncate", move |value, _| {
        let s = coerce_string(value);
        if s.chars().count() <= length {
            return Value::String(s);
        }
        if length <= 3 {
            return Value::String("...".to_string());
        }
        let kept: String = s.chars().take(length - 3).collect();
        Value::String(format!("{kept}..."))
    })
}

// ---------------------------------------------------------------------------
// Custom adapters
// ---------------------------------------------------------------------------

fn adapter_message(explicit: Option<&str>, raised: &str) -> String {
    match explicit {
        Some(m) => m.to_string(),
        None if !raised.is_empty() => raised.to_string(),
        None => "%s is invalid".to_string(),
    }
}

/// Wrap a user-supplied sync function. `Ok(Some(v))` filters, `Ok(None)`
/// passes, `Err(e)` fails with the message cascade: explicit `message`, then
/// the raised message, then `"%s is invalid"`.
pub fn custom(
    f: impl Fn(&Value, &Value) -> std::result::Result<Option<Value>, String> + Send + Sync + 'static,
    message: Option<&str>,
) -> Operation {
    let message = message.map(str::to_string);
    Operation::validate("custom", move |value, source| match f(value, source) {
        Ok(Some(replacement)) => Verdict::Replace(replacement),
        Ok(None) => Verdict::Valid,
        Err(raised) => Verdict::Reject(adapter_message(message.as_deref(), &raised)),
    })
}

/// Wrap a user-supplied suspending function of `(value, source)`.
pub fn custom_async<F, Fut>(f: F, message: Option<&str>) -> Operation
where
    F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Option<Value>, String>> + Send + 'static,
{
    let message = message.map(str::to_string);
    Operation::suspend("custom", move |value, source| {
        let fut = f(value, source);
        let message = message.clone();
        Box::pin(async move {
            match fut.await {
                Ok(replacement) => Ok(replacement),
                Err(raised) => Err(StepError::new(adapter_message(message.as_deref(), &raised))),
            }
        })
    })
}

/// Wrap a user-supplied suspending function of `(value, source, context)`.
pub fn custom_async_ctx<F, Fut>(f: F, message: Option<&str>) -> Operation
where
    F: Fn(Value, Value, formwork_types::RunContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Option<Value>, String>> + Send + 'static,
{
    let message = message.map(str::to_string);
    Operation::suspend_ctx("custom", move |value, source, context| {
        let fut = f(value, source, context);
        let message = message.clone();
        Box::pin(async move {
            match fut.await {
                Ok(replacement) => Ok(replacement),
                Err(raised) => Err(StepError::new(adapter_message(message.as_deref(), &raised))),
            }
        })
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Signed digit run with an optional (or, for decimals, mandatory) dot.
fn is_numeric_str(s: &str, require_dot: bool) -> bool {
    let body = s.strip_prefix(['-', '+']).unwrap_or(s);
    let Some((int_part, frac_part)) = body.split_once('.') else {
        return !require_dot && !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit());
    };
    if frac_part.is_empty() {
        return false;
    }
    int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}
