//! Field pipeline engine: nested-path access, operation chains, and the
//! strictly serial executor.
//!
//! This crate implements the formwork core: a [`Field`] names one value in a
//! JSON structure and carries an ordered chain of transform/validate
//! operations — some synchronous, some suspending — that a run drives
//! serially, collecting every error instead of stopping at the first. Array
//! fields broadcast the chain over each element in order. The rule catalog
//! lives in [`rules`]; the closed name→constructor table in [`registry`].

pub mod executor;
pub mod field;
pub mod operation;
pub mod path;
pub mod registry;
pub mod rules;
pub mod runner;
pub mod value;

pub use executor::{execute, StepOutcome};
pub use field::Field;
pub use operation::{OpKind, Operation, StepError, StepReply, Verdict};
pub use registry::{RuleParams, RuleRegistry};

pub use formwork_types::{
    render_message, Equality, FormworkError, Result, RunContext, RunOptions, RunOutcome,
};
