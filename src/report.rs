use crate::errors::{SecurityViolation, ViolationKind};
use console::style;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Severity::High => style("HIGH").red().bold().to_string(),
            Severity::Medium => style("MEDIUM").yellow().bold().to_string(),
            Severity::Low => style("LOW").cyan().bold().to_string(),
        };
        f.write_str(&s)
    }
}

impl Severity {
    /// Plain textual value for logs and persistence.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

/// How bad a violation of this kind tends to be. Numeric and boolean
/// positions only let an attacker swap one value for another of the same
/// shape; everything else hands over statement or process structure.
pub fn severity_of(kind: ViolationKind) -> Severity {
    match kind {
        ViolationKind::Number | ViolationKind::BooleanLiteral => Severity::Medium,
        _ => Severity::High,
    }
}

/// One-line operator-facing rendering of a violation.
pub fn render(violation: &SecurityViolation) -> String {
    format!(
        "{} {} at offset {}: {}",
        severity_of(violation.kind),
        violation.kind,
        violation.offset,
        violation.message
    )
}

#[test]
fn severity_follows_the_violation_kind() {
    assert_eq!(severity_of(ViolationKind::StringLiteral), Severity::High);
    assert_eq!(severity_of(ViolationKind::PathTraversal), Severity::High);
    assert_eq!(severity_of(ViolationKind::CommandExec), Severity::High);
    assert_eq!(severity_of(ViolationKind::Number), Severity::Medium);
    assert_eq!(severity_of(ViolationKind::BooleanLiteral), Severity::Medium);
    assert!(Severity::High < Severity::Low);
}

#[test]
fn render_includes_kind_offset_and_message() {
    let violation = SecurityViolation::new(ViolationKind::DollarQuotedLiteral, 12, "tainted tag");
    let line = render(&violation);
    assert!(line.contains("dollar-quoted literal"));
    assert!(line.contains("offset 12"));
    assert!(line.contains("tainted tag"));
}
