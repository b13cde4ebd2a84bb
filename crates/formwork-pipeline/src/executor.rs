//! Step executor: runs one operation against one value.
//!
//! Normalizes the four operation shapes into a single [`StepOutcome`] so the
//! runner's loop never cares which shape it just executed.

use formwork_types::RunContext;
use serde_json::Value;

use crate::operation::{OpKind, Operation, Verdict};

/// Normalized result of executing one operation.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Passed; value unchanged.
    Unchanged,
    /// The operation produced a replacement value.
    Replaced(Value),
    /// A sync validate rule rejected the value. Suppressible for optional
    /// fields with an empty value.
    Rejected(String),
    /// A suspending operation or custom adapter failed. Always recorded.
    Failed(String),
}

/// Execute `op` against `value`. Suspending shapes are awaited to completion
/// before returning; the caller therefore never observes a step in flight.
pub async fn execute(
    op: &Operation,
    value: &Value,
    source: &Value,
    context: &RunContext,
) -> StepOutcome {
    match op.kind() {
        OpKind::Transform(f) => StepOutcome::Replaced(f(value, source)),
        OpKind::Validate(f) => match f(value, source) {
            Verdict::Valid => StepOutcome::Unchanged,
            Verdict::Reject(message) => StepOutcome::Rejected(message),
            Verdict::Replace(replacement) => StepOutcome::Replaced(replacement),
        },
        OpKind::Suspend(f) => match f(value.clone(), source.clone()).await {
            Ok(Some(replacement)) => StepOutcome::Replaced(replacement),
            Ok(None) => StepOutcome::Unchanged,
            Err(e) => StepOutcome::Failed(e.message().to_string()),
        },
        OpKind::SuspendCtx(f) => {
            match f(value.clone(), source.clone(), context.clone()).await {
                Ok(Some(replacement)) => StepOutcome::Replaced(replacement),
                Ok(None) => StepOutcome::Unchanged,
                Err(e) => StepOutcome::Failed(e.message().to_string()),
            }
        }
    }
}
