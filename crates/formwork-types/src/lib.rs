//! Shared types for the formwork field-pipeline engine.
//!
//! This crate provides the foundational types used by the pipeline crate:
//! - `FormworkError` — declaration-time error taxonomy
//! - `RunOptions` — per-run configuration threaded into every execution
//! - `RunContext` — opaque request data passed through to context-aware operations
//! - `RunOutcome` — final value plus collected error messages for one chain run
//! - `Equality` — explicit comparison mode for equality rules
//! - `render_message` — `%s` label substitution for error templates

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Errors surfaced while declaring fields and building operation chains.
///
/// Run-time rule failures never appear here — they are collected as
/// human-readable strings in [`RunOutcome::errors`]. Only programming errors
/// in chain construction (unknown rule names, malformed arguments, bad
/// patterns) are reported through `Result`.
#[derive(Debug, thiserror::Error)]
pub enum FormworkError {
    #[error("Unknown rule '{0}'")]
    UnknownRule(String),

    #[error("Rule '{rule}' given invalid arguments: {message}")]
    RuleArgs { rule: String, message: String },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenience alias for `Result<T, FormworkError>`.
pub type Result<T> = std::result::Result<T, FormworkError>;

// ---------------------------------------------------------------------------
// RunOptions — per-run configuration
// ---------------------------------------------------------------------------

/// Configuration for one pipeline run, supplied explicitly by the caller.
///
/// There is no process-wide configuration: every `run` call receives its own
/// options, so the same field declaration behaves deterministically under
/// different callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOptions {
    /// Trim leading/trailing whitespace from string values before the
    /// declared chain runs. Non-string values pass through unchanged.
    #[serde(default)]
    pub auto_trim: bool,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_trim(mut self, enabled: bool) -> Self {
        self.auto_trim = enabled;
        self
    }
}

// ---------------------------------------------------------------------------
// RunContext — opaque pass-through request data
// ---------------------------------------------------------------------------

/// Caller-supplied data handed to context-aware suspending operations.
///
/// Built once before a run and read-only for its duration. Cloning is cheap
/// enough for per-step handoff; a run never mutates it.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    values: HashMap<String, serde_json::Value>,
}

impl RunContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key before the run starts.
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.values.insert(key.into(), value);
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.insert(key, value);
        self
    }

    /// Read a value by key.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Convenience accessor that returns a `&str`, or `default` when the key
    /// is absent or not a JSON string.
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.values
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }
}

// ---------------------------------------------------------------------------
// Equality — comparison mode for equality rules
// ---------------------------------------------------------------------------

/// How equality rules compare the checked value against the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equality {
    /// Cross-type coercion: numbers compare to numeric strings, booleans to
    /// 0/1. Matches the loose comparison of classic form validators.
    Coerce,
    /// Values are equal only when their JSON representations are identical.
    Strict,
}

// ---------------------------------------------------------------------------
// RunOutcome — result of one chain run
// ---------------------------------------------------------------------------

/// The result of driving one value through an operation chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    /// The final, possibly transformed value.
    pub value: serde_json::Value,
    /// Error messages in emission order. Empty means the value passed.
    pub errors: Vec<String>,
}

impl RunOutcome {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Message rendering
// ---------------------------------------------------------------------------

/// Substitute every literal `%s` in an error template with the field label.
pub fn render_message(template: &str, label: &str) -> String {
    template.replace("%s", label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_rule() {
        let err = FormworkError::UnknownRule("frobnicate".into());
        assert_eq!(err.to_string(), "Unknown rule 'frobnicate'");
    }

    #[test]
    fn error_display_rule_args() {
        let err = FormworkError::RuleArgs {
            rule: "min_length".into(),
            message: "expected an integer".into(),
        };
        assert_eq!(
            err.to_string(),
            "Rule 'min_length' given invalid arguments: expected an integer"
        );
    }

    #[test]
    fn error_from_regex_error() {
        let bad = regex::Regex::new("[unclosed").unwrap_err();
        let err: FormworkError = bad.into();
        assert!(matches!(err, FormworkError::Pattern(_)));
    }

    #[test]
    fn run_options_default_has_auto_trim_off() {
        let options = RunOptions::default();
        assert!(!options.auto_trim);
        assert!(RunOptions::new().auto_trim(true).auto_trim);
    }

    #[test]
    fn run_options_deserializes_missing_auto_trim() {
        let options: RunOptions = serde_json::from_str("{}").unwrap();
        assert!(!options.auto_trim);
    }

    #[test]
    fn context_insert_and_get() {
        let ctx = RunContext::new().with("user_id", serde_json::json!("u-42"));
        assert_eq!(ctx.get("user_id"), Some(&serde_json::json!("u-42")));
        assert_eq!(ctx.get_str("user_id", "anonymous"), "u-42");
        assert_eq!(ctx.get_str("missing", "anonymous"), "anonymous");
    }

    #[test]
    fn context_get_str_non_string_falls_back() {
        let ctx = RunContext::new().with("n", serde_json::json!(7));
        assert_eq!(ctx.get_str("n", "default"), "default");
    }

    #[test]
    fn outcome_passed() {
        let ok = RunOutcome {
            value: serde_json::json!("x"),
            errors: Vec::new(),
        };
        assert!(ok.passed());

        let bad = RunOutcome {
            value: serde_json::json!("x"),
            errors: vec!["field is not an email address".into()],
        };
        assert!(!bad.passed());
    }

    #[test]
    fn render_message_substitutes_label() {
        assert_eq!(
            render_message("%s is not an email address", "email"),
            "email is not an email address"
        );
        // Every occurrence is replaced.
        assert_eq!(render_message("%s and %s", "x"), "x and x");
        // No placeholder — message passes through.
        assert_eq!(render_message("bad value", "x"), "bad value");
    }

    #[test]
    fn equality_serializes_to_snake_case() {
        assert_eq!(serde_json::to_string(&Equality::Coerce).unwrap(), "\"coerce\"");
        assert_eq!(serde_json::to_string(&Equality::Strict).unwrap(), "\"strict\"");
    }
}
