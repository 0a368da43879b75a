use crate::errors::{SecurityViolation, ViolationKind};
use crate::taint::TaintSet;
use tracing::debug;

/// The program name decides *what* runs; any untrusted character in it is a
/// takeover. Arguments are passed to the process as discrete values and may
/// be tainted freely.
pub fn validate_command(program: &str, taint: &TaintSet) -> Result<(), SecurityViolation> {
  let len = program.chars().count();
  if taint.len() != len {
    return Err(SecurityViolation::new(
      ViolationKind::CommandExec,
      0,
      format!(
        "taint length {} does not match program-name length {len}",
        taint.len()
      ),
    ));
  }
  if let Some(at) = taint.first_tainted() {
    return Err(SecurityViolation::new(
      ViolationKind::CommandExec,
      at,
      "untrusted character in program name",
    ));
  }
  Ok(())
}

/// Validates a whole spawn: the program name must be fully trusted, the
/// arguments only get counted for the audit log.
pub fn validate_invocation(
  program: &str,
  taint: &TaintSet,
  args: &[(&str, &TaintSet)],
) -> Result<(), SecurityViolation> {
  validate_command(program, taint)?;
  let tainted_args = args.iter().filter(|(_, t)| t.is_tainted()).count();
  debug!(target: "command", "spawn {program}: {} args, {tainted_args} tainted", args.len());
  Ok(())
}

#[test]
fn untainted_program_name_passes() {
  let taint = TaintSet::new("/usr/bin/convert".chars().count());
  assert!(validate_command("/usr/bin/convert", &taint).is_ok());
}

#[test]
fn any_taint_in_the_program_name_is_rejected() {
  let program = "/usr/bin/convert";
  let mut taint = TaintSet::new(program.chars().count());
  taint.set(9).unwrap();
  let violation = validate_command(program, &taint).unwrap_err();
  assert_eq!(violation.kind, ViolationKind::CommandExec);
  assert_eq!(violation.offset, 9);
}

#[test]
fn tainted_arguments_are_allowed() {
  let program = "convert";
  let program_taint = TaintSet::new(program.chars().count());
  let arg = "upload.png";
  let arg_taint = TaintSet::filled(true, arg.chars().count());
  assert!(validate_invocation(program, &program_taint, &[(arg, &arg_taint)]).is_ok());
}

#[test]
fn length_mismatch_fails_closed() {
  assert!(validate_command("sh", &TaintSet::new(5)).is_err());
}
