//! The closed rule catalog: a name→constructor table registered once.
//!
//! Config-driven callers declare chains by rule name instead of calling the
//! typed constructors in [`rules`](crate::rules) directly. The table is the
//! complete set of available rules — there is no reflection and no dynamic
//! extension beyond [`RuleRegistry::register`]. Malformed arguments (a bad
//! pattern string, a missing length) surface here, at declaration time.

use std::collections::HashMap;

use formwork_types::{Equality, FormworkError, Result};
use serde_json::Value;

use crate::operation::Operation;
use crate::rules;

/// Arguments for constructing one rule by name.
#[derive(Debug, Clone, Default)]
pub struct RuleParams {
    args: Vec<Value>,
    message: Option<String>,
}

impl RuleParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arg(mut self, arg: Value) -> Self {
        self.args.push(arg);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    fn str_arg(&self, index: usize, rule: &str) -> Result<&str> {
        self.arg(index)
            .and_then(Value::as_str)
            .ok_or_else(|| FormworkError::RuleArgs {
                rule: rule.to_string(),
                message: format!("argument {index} must be a string"),
            })
    }

    fn usize_arg(&self, index: usize, rule: &str) -> Result<usize> {
        self.arg(index)
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .ok_or_else(|| FormworkError::RuleArgs {
                rule: rule.to_string(),
                message: format!("argument {index} must be a non-negative integer"),
            })
    }

    fn value_arg(&self, index: usize, rule: &str) -> Result<Value> {
        self.arg(index).cloned().ok_or_else(|| FormworkError::RuleArgs {
            rule: rule.to_string(),
            message: format!("argument {index} is required"),
        })
    }

    fn equality_arg(&self, index: usize, rule: &str) -> Result<Equality> {
        match self.arg(index) {
            None => Ok(Equality::Coerce),
            Some(Value::String(s)) if s == "coerce" => Ok(Equality::Coerce),
            Some(Value::String(s)) if s == "strict" => Ok(Equality::Strict),
            Some(_) => Err(FormworkError::RuleArgs {
                rule: rule.to_string(),
                message: format!("argument {index} must be \"coerce\" or \"strict\""),
            }),
        }
    }
}

/// Constructor for one named rule.
pub type RuleFactory = fn(&RuleParams) -> Result<Operation>;

/// The name→constructor table.
pub struct RuleRegistry {
    factories: HashMap<&'static str, RuleFactory>,
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// The registry pre-loaded with every built-in rule.
    pub fn builtin() -> Self {
        let mut reg = Self::new();

        reg.register("email", |p| Ok(rules::email(p.message())));
        reg.register("url", |p| Ok(rules::url(p.message())));
        reg.register("ip", |p| Ok(rules::ip(p.message())));
        reg.register("date", |p| Ok(rules::date(p.message())));
        reg.register("alpha", |p| Ok(rules::alpha(p.message())));
        reg.register("alphanumeric", |p| Ok(rules::alphanumeric(p.message())));
        reg.register("numeric", |p| Ok(rules::numeric(p.message())));
        reg.register("integer", |p| Ok(rules::integer(p.message())));
        reg.register("decimal", |p| Ok(rules::decimal(p.message())));
        reg.register("lowercase", |p| Ok(rules::lowercase(p.message())));
        reg.register("uppercase", |p| Ok(rules::uppercase(p.message())));
        reg.register("is_string", |p| Ok(rules::is_string(p.message())));
        reg.register("not_empty", |p| Ok(rules::not_empty(p.message())));
        reg.register("required", |p| {
            Ok(rules::required(p.arg(0).cloned(), p.message()))
        });
        reg.register("min_length", |p| {
            Ok(rules::min_length(p.usize_arg(0, "min_length")?, p.message()))
        });
        reg.register("max_length", |p| {
            Ok(rules::max_length(p.usize_arg(0, "max_length")?, p.message()))
        });
        reg.register("length_between", |p| {
            Ok(rules::length_between(
                p.usize_arg(0, "length_between")?,
                p.usize_arg(1, "length_between")?,
                p.message(),
            ))
        });
        reg.register("equals", |p| {
            Ok(rules::equals(
                p.value_arg(0, "equals")?,
                p.equality_arg(1, "equals")?,
                p.message(),
            ))
        });
        reg.register("equals_field", |p| {
            Ok(rules::equals_field(
                p.str_arg(0, "equals_field")?,
                p.equality_arg(1, "equals_field")?,
                p.message(),
            ))
        });
        reg.register("contains", |p| {
            Ok(rules::contains(p.str_arg(0, "contains")?, p.message()))
        });
        reg.register("not_contains", |p| {
            Ok(rules::not_contains(p.str_arg(0, "not_contains")?, p.message()))
        });
        reg.register("matches", |p| {
            let pattern = regex::Regex::new(p.str_arg(0, "matches")?)?;
            Ok(rules::matches(pattern, p.message()))
        });
        reg.register("not_matches", |p| {
            let pattern = regex::Regex::new(p.str_arg(0, "not_matches")?)?;
            Ok(rules::not_matches(pattern, p.message()))
        });
        reg.register("trim", |_| Ok(rules::trim()));
        reg.register("if_null", |p| Ok(rules::if_null(p.value_arg(0, "if_null")?)));
        reg.register("to_upper", |_| Ok(rules::to_upper()));
        reg.register("to_lower", |_| Ok(rules::to_lower()));
        reg.register("truncate", |p| {
            Ok(rules::truncate(p.usize_arg(0, "truncate")?))
        });

        reg
    }

    pub fn register(&mut self, name: &'static str, factory: RuleFactory) {
        self.factories.insert(name, factory);
    }

    /// Construct the named rule, or fail at declaration time.
    pub fn make(&self, name: &str, params: &RuleParams) -> Result<Operation> {
        match self.factories.get(name) {
            Some(factory) => factory(params),
            None => Err(FormworkError::UnknownRule(name.to_string())),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered rule names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_registry_knows_the_catalog() {
        let reg = RuleRegistry::builtin();
        for name in [
            "email", "url", "required", "min_length", "matches", "equals_field", "to_upper",
            "truncate",
        ] {
            assert!(reg.has(name), "missing rule {name}");
        }
        assert!(!reg.has("frobnicate"));
        assert!(reg.names().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn unknown_rule_is_a_declaration_error() {
        let reg = RuleRegistry::builtin();
        let err = reg.make("frobnicate", &RuleParams::new()).unwrap_err();
        assert!(matches!(err, FormworkError::UnknownRule(name) if name == "frobnicate"));
    }

    #[test]
    fn make_builds_a_working_rule() {
        let reg = RuleRegistry::builtin();
        let op = reg.make("email", &RuleParams::new()).unwrap();
        assert_eq!(op.name(), "email");
    }

    #[test]
    fn malformed_pattern_fails_at_declaration_time() {
        let reg = RuleRegistry::builtin();
        let params = RuleParams::new().with_arg(json!("[unclosed"));
        let err = reg.make("matches", &params).unwrap_err();
        assert!(matches!(err, FormworkError::Pattern(_)));
    }

    #[test]
    fn missing_length_argument_is_rejected() {
        let reg = RuleRegistry::builtin();
        let err = reg.make("min_length", &RuleParams::new()).unwrap_err();
        assert!(matches!(
            err,
            FormworkError::RuleArgs { rule, .. } if rule == "min_length"
        ));

        let params = RuleParams::new().with_arg(json!("three"));
        assert!(reg.make("min_length", &params).is_err());
    }

    #[test]
    fn equality_argument_parses_or_rejects() {
        let reg = RuleRegistry::builtin();

        let coerce = RuleParams::new().with_arg(json!(5));
        assert!(reg.make("equals", &coerce).is_ok());

        let strict = RuleParams::new().with_arg(json!(5)).with_arg(json!("strict"));
        assert!(reg.make("equals", &strict).is_ok());

        let bogus = RuleParams::new().with_arg(json!(5)).with_arg(json!("fuzzy"));
        assert!(reg.make("equals", &bogus).is_err());
    }

    #[test]
    fn custom_registration_extends_the_table() {
        let mut reg = RuleRegistry::new();
        reg.register("always_fail", |p| {
            Ok(rules::custom(
                |_, _| Err("nope".into()),
                p.message(),
            ))
        });
        assert!(reg.has("always_fail"));
        assert!(reg.make("always_fail", &RuleParams::new()).is_ok());
    }

    #[test]
    fn message_override_threads_through() {
        let reg = RuleRegistry::builtin();
        let params = RuleParams::new().with_message("%s looks wrong");
        let op = reg.make("email", &params).unwrap();
        // The override is observable when the rule rejects.
        match op.kind() {
            crate::operation::OpKind::Validate(f) => {
                match f(&json!("not-an-email"), &json!({})) {
                    crate::operation::Verdict::Reject(m) => assert_eq!(m, "%s looks wrong"),
                    other => panic!("expected rejection, got {other:?}"),
                }
            }
            _ => panic!("expected a validate op"),
        }
    }
}
