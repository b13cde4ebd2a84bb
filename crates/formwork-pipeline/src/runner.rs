//! Pipeline runner: drives a resolved value through a field's chain.
//!
//! Execution is strictly serial. Each operation — sync or suspending — is
//! resolved to completion before the next one starts, and in array mode
//! element `i + 1` never starts before element `i` finishes, so error
//! ordering is deterministic: element order first, chain order within an
//! element.

use formwork_types::{render_message, RunContext, RunOptions, RunOutcome};
use serde_json::Value;

use crate::executor::{execute, StepOutcome};
use crate::field::Field;
use crate::path;
use crate::value::{has_value, trim_value};

impl Field {
    /// Run this field's chain against `source`, writing the final value into
    /// `dest` at the field's path.
    ///
    /// The value is resolved from `dest` first (a previous write wins), then
    /// from `source`. Returns every error message collected during the run,
    /// in emission order, with `%s` replaced by the field label. The run
    /// completes the whole chain even when errors accumulate; the
    /// destination receives the final value regardless of validity.
    pub async fn run(
        &self,
        source: &Value,
        dest: &mut Value,
        context: &RunContext,
        options: &RunOptions,
    ) -> Vec<String> {
        let mut value = path::get(&self.name, dest);
        if !has_value(&value) {
            value = path::get(&self.name, source);
        }

        tracing::debug!(
            field = %self.name,
            operations = self.chain.len(),
            array = self.array,
            "running field pipeline"
        );

        let errors = if self.array {
            self.run_array(value, source, dest, context, options).await
        } else {
            self.run_scalar(value, source, dest, context, options).await
        };

        if !errors.is_empty() {
            tracing::debug!(field = %self.name, errors = errors.len(), "field pipeline collected errors");
        }
        errors
    }

    async fn run_scalar(
        &self,
        mut value: Value,
        source: &Value,
        dest: &mut Value,
        context: &RunContext,
        options: &RunOptions,
    ) -> Vec<String> {
        // A list-valued input for a scalar field flattens to its first element.
        if let Value::Array(items) = value {
            value = items.into_iter().next().unwrap_or(Value::Null);
        }
        let outcome = self.run_chain(value, source, context, options).await;
        path::set(&self.name, dest, outcome.value);
        outcome.errors
    }

    async fn run_array(
        &self,
        value: Value,
        source: &Value,
        dest: &mut Value,
        context: &RunContext,
        options: &RunOptions,
    ) -> Vec<String> {
        if !has_value(&value) {
            if self.has_required_check() {
                // Raw field name here, not the label.
                return vec![format!("{} is required", self.name)];
            }
            path::set(&self.name, dest, Value::Array(Vec::new()));
            return Vec::new();
        }

        let elements = match value {
            Value::Array(items) => items,
            scalar => vec![scalar],
        };

        let mut errors = Vec::new();
        let mut results = Vec::with_capacity(elements.len());
        for element in elements {
            let outcome = self.run_chain(element, source, context, options).await;
            errors.extend(outcome.errors);
            results.push(outcome.value);
        }
        path::set(&self.name, dest, Value::Array(results));
        errors
    }

    /// Drive one value through the whole chain, serially.
    pub async fn run_chain(
        &self,
        mut value: Value,
        source: &Value,
        context: &RunContext,
        options: &RunOptions,
    ) -> RunOutcome {
        let mut errors = Vec::new();

        if options.auto_trim {
            value = trim_value(value);
        }

        for op in &self.chain {
            match execute(op, &value, source, context).await {
                StepOutcome::Unchanged => {}
                StepOutcome::Replaced(replacement) => value = replacement,
                StepOutcome::Rejected(template) => {
                    // Optional fields ignore rejections of empty values.
                    if self.required || has_value(&value) {
                        tracing::trace!(field = %self.name, rule = op.name(), "operation rejected value");
                        errors.push(render_message(&template, &self.label));
                    }
                }
                StepOutcome::Failed(template) => {
                    tracing::trace!(field = %self.name, rule = op.name(), "operation failed");
                    errors.push(render_message(&template, &self.label));
                }
            }
        }

        RunOutcome { value, errors }
    }
}
