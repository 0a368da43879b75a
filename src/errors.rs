use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type GuardResult<T, E = GuardError> = core::result::Result<T, E>;

/// Out-of-range access to a `TaintSet`. Always a programmer error on the
/// instrumentation side; never caught inside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("position {index} out of range for taint length {len}")]
pub struct IndexError {
  pub index: usize,
  pub len: usize,
}

/// What kind of structure the offending character sits in: the SQL token
/// classification at the violating offset, or the sink family for the
/// non-SQL validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
  StringLiteral,
  QuotedIdentifier,
  QuoteDelimitedLiteral,
  DollarQuotedLiteral,
  Number,
  LineComment,
  BlockComment,
  BooleanLiteral,
  Other,
  PathTraversal,
  CommandExec,
}

impl fmt::Display for ViolationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match *self {
      ViolationKind::StringLiteral => "string literal",
      ViolationKind::QuotedIdentifier => "quoted identifier",
      ViolationKind::QuoteDelimitedLiteral => "quote-delimited literal",
      ViolationKind::DollarQuotedLiteral => "dollar-quoted literal",
      ViolationKind::Number => "numeric literal",
      ViolationKind::LineComment => "line comment",
      ViolationKind::BlockComment => "block comment",
      ViolationKind::BooleanLiteral => "boolean literal",
      ViolationKind::Other => "SQL text",
      ViolationKind::PathTraversal => "path traversal",
      ViolationKind::CommandExec => "command execution",
    };
    f.write_str(s)
  }
}

/// Untrusted characters in a structurally dangerous position. The caller
/// must abort the sink operation; there is no recovery path.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind} violation at offset {offset}: {message}")]
pub struct SecurityViolation {
  pub kind: ViolationKind,
  /// Character (not byte) offset into the sink text.
  pub offset: usize,
  pub message: String,
}

impl SecurityViolation {
  pub fn new(kind: ViolationKind, offset: usize, message: impl Into<String>) -> Self {
    Self {
      kind,
      offset,
      message: message.into(),
    }
  }
}

#[derive(Debug, Error)]
pub enum GuardError {
  #[error("taint error: {0}")]
  Index(#[from] IndexError),

  #[error("security violation: {0}")]
  Violation(#[from] SecurityViolation),

  #[error("unknown SQL dialect: {0}")]
  UnknownDialect(String),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("config parse error: {0}")]
  Config(#[from] toml::de::Error),
}

#[test]
fn violation_display_names_the_token() {
  let v = SecurityViolation::new(ViolationKind::StringLiteral, 7, "tainted closing quote");
  assert_eq!(
    v.to_string(),
    "string literal violation at offset 7: tainted closing quote"
  );
}

#[test]
fn index_error_display() {
  let e = IndexError { index: 12, len: 4 };
  assert_eq!(e.to_string(), "position 12 out of range for taint length 4");
}
