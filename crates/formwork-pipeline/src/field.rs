//! Field declaration and the chain-building surface.
//!
//! A [`Field`] names one value in the input/output structures and owns the
//! ordered operation chain that will process it. Chain-building methods
//! consume and return the field, so declarations read as one fluent
//! expression:
//!
//! ```
//! use formwork_pipeline::Field;
//!
//! let field = Field::new("user[email]").required().email().to_lower();
//! assert_eq!(field.name(), "user[email]");
//! assert_eq!(field.chain_len(), 3);
//! ```
//!
//! Once declared, a field is immutable and reusable: `run` borrows it, so
//! the same declaration can serve any number of requests.

use std::future::Future;

use formwork_types::{Equality, RunContext};
use regex::Regex;
use serde_json::Value;

use crate::operation::{Operation, StepReply, Verdict};
use crate::rules;

/// One named value and its processing chain.
pub struct Field {
    pub(crate) name: String,
    pub(crate) label: String,
    pub(crate) required: bool,
    pub(crate) array: bool,
    pub(crate) chain: Vec<Operation>,
}

impl Field {
    /// Declare a field by path. The label (used in messages) defaults to the
    /// path itself.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = name.clone();
        Self {
            name,
            label,
            required: false,
            array: false,
            chain: Vec::new(),
        }
    }

    /// Declare a field with a human-readable label for error messages.
    pub fn with_label(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_array(&self) -> bool {
        self.array
    }

    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }

    // -----------------------------------------------------------------------
    // Core chain-building surface
    // -----------------------------------------------------------------------

    /// Append any operation to the chain. Order of execution is exactly
    /// order of declaration.
    pub fn add(mut self, op: Operation) -> Self {
        self.chain.push(op);
        self
    }

    /// Append a pure transform: `(value, source) -> value`.
    pub fn add_transform(
        self,
        f: impl Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.add(Operation::transform("transform", f))
    }

    /// Append a sync validator: `(value, source) -> Verdict`.
    pub fn add_validate(
        self,
        f: impl Fn(&Value, &Value) -> Verdict + Send + Sync + 'static,
    ) -> Self {
        self.add(Operation::validate("validate", f))
    }

    /// Append a suspending operation of `(value, source)`.
    pub fn add_suspending<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StepReply> + Send + 'static,
    {
        self.add(Operation::suspend("suspend", move |value, source| {
            Box::pin(f(value, source))
        }))
    }

    /// Append a suspending operation of `(value, source, context)`.
    pub fn add_suspending_ctx<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Value, Value, RunContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StepReply> + Send + 'static,
    {
        self.add(Operation::suspend_ctx("suspend", move |value, source, ctx| {
            Box::pin(f(value, source, ctx))
        }))
    }

    /// Treat the resolved value as a list: the chain runs independently over
    /// each element, in order.
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    // -----------------------------------------------------------------------
    // Fluent rule sugar (default messages; use `add` + `rules::*` to
    // override a message)
    // -----------------------------------------------------------------------

    /// Mark the field required and append the required-presence check.
    /// Required fields never suppress validation errors on empty values.
    pub fn required(mut self) -> Self {
        self.required = true;
        self.add(rules::required(None, None))
    }

    /// Like [`required`](Self::required), but also rejecting a sentinel
    /// placeholder value.
    pub fn required_unless(mut self, placeholder: Value) -> Self {
        self.required = true;
        self.add(rules::required(Some(placeholder), None))
    }

    pub fn email(self) -> Self {
        self.add(rules::email(None))
    }

    pub fn url(self) -> Self {
        self.add(rules::url(None))
    }

    pub fn ip(self) -> Self {
        self.add(rules::ip(None))
    }

    pub fn date(self) -> Self {
        self.add(rules::date(None))
    }

    pub fn alpha(self) -> Self {
        self.add(rules::alpha(None))
    }

    pub fn alphanumeric(self) -> Self {
        self.add(rules::alphanumeric(None))
    }

    pub fn numeric(self) -> Self {
        self.add(rules::numeric(None))
    }

    pub fn integer(self) -> Self {
        self.add(rules::integer(None))
    }

    pub fn decimal(self) -> Self {
        self.add(rules::decimal(None))
    }

    pub fn lowercase(self) -> Self {
        self.add(rules::lowercase(None))
    }

    pub fn uppercase(self) -> Self {
        self.add(rules::uppercase(None))
    }

    pub fn is_string(self) -> Self {
        self.add(rules::is_string(None))
    }

    pub fn not_empty(self) -> Self {
        self.add(rules::not_empty(None))
    }

    pub fn min_length(self, length: usize) -> Self {
        self.add(rules::min_length(length, None))
    }

    pub fn max_length(self, length: usize) -> Self {
        self.add(rules::max_length(length, None))
    }

    pub fn length_between(self, from: usize, to: usize) -> Self {
        self.add(rules::length_between(from, to, None))
    }

    /// Compare against a fixed value with coercing equality.
    pub fn equals(self, expected: Value) -> Self {
        self.add(rules::equals(expected, Equality::Coerce, None))
    }

    /// Compare against a fixed value under an explicit equality mode.
    pub fn equals_with(self, expected: Value, mode: Equality) -> Self {
        self.add(rules::equals(expected, mode, None))
    }

    /// Compare against another field's value. Declaring a cross-field
    /// comparison also marks this field required.
    pub fn equals_field(mut self, other: &str) -> Self {
        self.required = true;
        self.add(rules::equals_field(other, Equality::Coerce, None))
    }

    pub fn contains(self, needle: &str) -> Self {
        self.add(rules::contains(needle, None))
    }

    pub fn not_contains(self, needle: &str) -> Self {
        self.add(rules::not_contains(needle, None))
    }

    pub fn matches(self, pattern: Regex) -> Self {
        self.add(rules::matches(pattern, None))
    }

    pub fn not_matches(self, pattern: Regex) -> Self {
        self.add(rules::not_matches(pattern, None))
    }

    pub fn trim(self) -> Self {
        self.add(rules::trim())
    }

    pub fn if_null(self, replacement: Value) -> Self {
        self.add(rules::if_null(replacement))
    }

    pub fn to_upper(self) -> Self {
        self.add(rules::to_upper())
    }

    pub fn to_lower(self) -> Self {
        self.add(rules::to_lower())
    }

    pub fn truncate(self, length: usize) -> Self {
        self.add(rules::truncate(length))
    }

    pub fn custom(
        self,
        f: impl Fn(&Value, &Value) -> Result<Option<Value>, String> + Send + Sync + 'static,
    ) -> Self {
        self.add(rules::custom(f, None))
    }

    pub fn custom_async<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, String>> + Send + 'static,
    {
        self.add(rules::custom_async(f, None))
    }

    pub fn custom_async_ctx<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Value, Value, RunContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, String>> + Send + 'static,
    {
        self.add(rules::custom_async_ctx(f, None))
    }

    pub(crate) fn has_required_check(&self) -> bool {
        self.chain.iter().any(Operation::is_required_check)
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("required", &self.required)
            .field("array", &self.array)
            .field("chain", &self.chain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn label_defaults_to_name() {
        let field = Field::new("user[email]");
        assert_eq!(field.name(), "user[email]");
        assert_eq!(field.label(), "user[email]");

        let labeled = Field::with_label("user[email]", "Email address");
        assert_eq!(labeled.label(), "Email address");
    }

    #[test]
    fn chain_preserves_declaration_order() {
        let field = Field::new("x").trim().email().to_lower();
        let names: Vec<_> = field.chain.iter().map(|op| op.name()).collect();
        assert_eq!(names, vec!["trim", "email", "to_lower"]);
    }

    #[test]
    fn required_sets_flag_and_appends_check() {
        let field = Field::new("x");
        assert!(!field.is_required());
        let field = field.required();
        assert!(field.is_required());
        assert!(field.has_required_check());
    }

    #[test]
    fn equals_field_marks_required_without_adding_a_required_check() {
        let field = Field::new("confirm").equals_field("password");
        assert!(field.is_required());
        assert!(!field.has_required_check());
    }

    #[test]
    fn array_mode_flag() {
        assert!(!Field::new("tags").is_array());
        assert!(Field::new("tags").array().is_array());
    }

    #[test]
    fn generic_adders_tag_operations() {
        let field = Field::new("x")
            .add_transform(|v, _| v.clone())
            .add_validate(|_, _| Verdict::Valid)
            .add_suspending(|_, _| async { Ok(None) })
            .add_suspending_ctx(|_, _, _| async { Ok(None) });
        assert_eq!(field.chain_len(), 4);
    }
}
