//! The operation model: one step in a field's chain.
//!
//! Each operation carries an explicit variant tag ([`OpKind`]) declaring its
//! execution shape — pure transform, sync validate, or one of the two
//! suspending forms. Dispatch is always on the tag, never on inspection of
//! the function itself.

use formwork_types::RunContext;
use futures_core::future::BoxFuture;
use serde_json::Value;

/// Result of a synchronous validate step.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Value passed; unchanged.
    Valid,
    /// Value rejected; carries a message template (`%s` = field label).
    Reject(String),
    /// The rule acted as a filter and produced a replacement value.
    Replace(Value),
}

/// Failure reported by a suspending operation or custom adapter.
///
/// Carries the message template that will be rendered with the field label.
#[derive(Debug, Clone)]
pub struct StepError {
    message: String,
}

impl StepError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What a suspending operation resolves to.
///
/// The future resolving is the operation's one-shot continuation:
/// - `Err(e)` — record `e`'s message, continue with the value unchanged
/// - `Ok(Some(v))` — replace the value with `v`
/// - `Ok(None)` — passed, value unchanged
pub type StepReply = std::result::Result<Option<Value>, StepError>;

pub type TransformFn = Box<dyn Fn(&Value, &Value) -> Value + Send + Sync>;
pub type ValidateFn = Box<dyn Fn(&Value, &Value) -> Verdict + Send + Sync>;
pub type SuspendFn = Box<dyn Fn(Value, Value) -> BoxFuture<'static, StepReply> + Send + Sync>;
pub type SuspendCtxFn =
    Box<dyn Fn(Value, Value, RunContext) -> BoxFuture<'static, StepReply> + Send + Sync>;

/// The four execution shapes an operation can declare.
pub enum OpKind {
    /// `(value, source) -> value`; always succeeds, always replaces.
    Transform(TransformFn),
    /// `(value, source) -> Verdict`.
    Validate(ValidateFn),
    /// Suspending, `(value, source)`.
    Suspend(SuspendFn),
    /// Suspending, `(value, source, context)`.
    SuspendCtx(SuspendCtxFn),
}

/// One step in an operation chain.
pub struct Operation {
    name: &'static str,
    kind: OpKind,
}

impl Operation {
    pub fn transform(
        name: &'static str,
        f: impl Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            kind: OpKind::Transform(Box::new(f)),
        }
    }

    pub fn validate(
        name: &'static str,
        f: impl Fn(&Value, &Value) -> Verdict + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            kind: OpKind::Validate(Box::new(f)),
        }
    }

    pub fn suspend(
        name: &'static str,
        f: impl Fn(Value, Value) -> BoxFuture<'static, StepReply> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            kind: OpKind::Suspend(Box::new(f)),
        }
    }

    pub fn suspend_ctx(
        name: &'static str,
        f: impl Fn(Value, Value, RunContext) -> BoxFuture<'static, StepReply> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            kind: OpKind::SuspendCtx(Box::new(f)),
        }
    }

    /// The rule name this operation was declared under.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared execution shape. Dispatch always goes through this tag.
    pub fn kind(&self) -> &OpKind {
        &self.kind
    }

    /// Whether this operation is the required-presence check. Array-mode
    /// execution consults this to short-circuit empty required fields.
    pub fn is_required_check(&self) -> bool {
        self.name == "required"
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shape = match self.kind {
            OpKind::Transform(_) => "transform",
            OpKind::Validate(_) => "validate",
            OpKind::Suspend(_) => "suspend",
            OpKind::SuspendCtx(_) => "suspend_ctx",
        };
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("shape", &shape)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constructors_tag_the_right_shape() {
        let t = Operation::transform("to_upper", |v, _| v.clone());
        assert!(matches!(t.kind(), OpKind::Transform(_)));
        assert_eq!(t.name(), "to_upper");

        let v = Operation::validate("email", |_, _| Verdict::Valid);
        assert!(matches!(v.kind(), OpKind::Validate(_)));

        let s = Operation::suspend("custom", |_, _| Box::pin(async { Ok(None) }));
        assert!(matches!(s.kind(), OpKind::Suspend(_)));

        let sc = Operation::suspend_ctx("custom", |_, _, _| Box::pin(async { Ok(None) }));
        assert!(matches!(sc.kind(), OpKind::SuspendCtx(_)));
    }

    #[test]
    fn required_check_is_detected_by_name() {
        let required = Operation::validate("required", |_, _| Verdict::Valid);
        assert!(required.is_required_check());

        let other = Operation::validate("email", |_, _| Verdict::Valid);
        assert!(!other.is_required_check());
    }

    #[test]
    fn debug_shows_name_and_shape() {
        let op = Operation::validate("email", |_, _| Verdict::Valid);
        let rendered = format!("{op:?}");
        assert!(rendered.contains("email"));
        assert!(rendered.contains("validate"));
    }

    #[tokio::test]
    async fn suspend_future_resolves_to_reply() {
        let op = Operation::suspend("custom", |value, _| {
            Box::pin(async move { Ok(Some(json!(format!("{}!", value.as_str().unwrap_or(""))))) })
        });
        let OpKind::Suspend(f) = op.kind() else {
            panic!("expected suspend");
        };
        let reply = f(json!("hey"), json!({})).await;
        assert_eq!(reply.unwrap(), Some(json!("hey!")));
    }
}
