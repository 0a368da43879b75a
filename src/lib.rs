//! Character-level taint tracking and injection-sink validation.
//!
//! A host runtime (or an instrumentation layer in front of one) keeps a
//! [`TaintSet`] in lock-step with every piece of text that contains
//! untrusted input. At each dangerous operation this crate decides whether
//! the untrusted characters could change the operation's *structure*:
//!
//! - [`sql::SqlValidator`] tokenizes a query under a [`sql::DialectConfig`]
//!   and rejects taint anywhere that moves token boundaries;
//! - [`html::HtmlObserver`] flags (without aborting) any tainted chunk that
//!   reaches a response body;
//! - [`path::validate_path`] keeps an untrusted path suffix inside its
//!   trusted prefix directory;
//! - [`command::validate_command`] requires a fully trusted program name.
//!
//! Validators are immutable and freely shared across threads; `TaintSet`
//! is a single-owner mutable value.

pub mod command;
pub mod config;
pub mod errors;
pub mod html;
pub mod path;
pub mod report;
pub mod sql;
pub mod taint;

pub use command::{validate_command, validate_invocation};
pub use config::GuardConfig;
pub use errors::{GuardError, GuardResult, IndexError, SecurityViolation, ViolationKind};
pub use html::{HtmlObserver, html_observer, validate_html_write};
pub use path::{PathValidator, validate_path};
pub use report::Severity;
pub use sql::{DialectConfig, SqlValidator, validate_sql};
pub use taint::TaintSet;
