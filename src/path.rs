use crate::errors::{SecurityViolation, ViolationKind};
use crate::taint::TaintSet;
use tracing::debug;

/// Checks that the untrusted tail of a filesystem path cannot climb out of
/// the directory named by its trusted head.
///
/// The comparison is purely lexical: `.`/`..` segments are resolved and
/// repeated separators collapsed without touching the filesystem, so the
/// verdict is the same whether or not the path exists yet.
#[derive(Debug, Clone, Copy)]
pub struct PathValidator {
    reject_embedded_nul: bool,
}

impl Default for PathValidator {
    fn default() -> Self {
        Self {
            reject_embedded_nul: true,
        }
    }
}

impl PathValidator {
    pub fn new(reject_embedded_nul: bool) -> Self {
        Self {
            reject_embedded_nul,
        }
    }

    pub fn validate(&self, path: &str, taint: &TaintSet) -> Result<(), SecurityViolation> {
        let chars: Vec<char> = path.chars().collect();
        if taint.len() != chars.len() {
            return Err(SecurityViolation::new(
                ViolationKind::PathTraversal,
                0,
                format!(
                    "taint length {} does not match path length {}",
                    taint.len(),
                    chars.len()
                ),
            ));
        }
        let Some(first_tainted) = taint.first_tainted() else {
            return Ok(());
        };
        if first_tainted == 0 {
            return Err(SecurityViolation::new(
                ViolationKind::PathTraversal,
                0,
                "path begins with untrusted data",
            ));
        }
        if self.reject_embedded_nul
            && let Some(nul) = chars
                .iter()
                .zip(taint.iter())
                .position(|(c, t)| *c == '\0' && t)
        {
            return Err(SecurityViolation::new(
                ViolationKind::PathTraversal,
                nul,
                "untrusted NUL byte in path",
            ));
        }

        let prefix: String = chars[..first_tainted].iter().collect();
        let canon_full = lexical_canonicalize(path);
        let canon_prefix = lexical_canonicalize(&prefix);

        // A prefix that collapses to the root (or to nothing, for relative
        // paths) leaves no boundary to defend.
        if canon_prefix.is_empty() || canon_prefix == "/" {
            return Err(SecurityViolation::new(
                ViolationKind::PathTraversal,
                first_tainted,
                "untrusted data directly below the filesystem root",
            ));
        }

        let contained = canon_full.starts_with(&canon_prefix)
            || (canon_prefix.ends_with('/')
                && canon_full.starts_with(&canon_prefix[..canon_prefix.len() - 1]));
        if contained {
            debug!(target: "path", "accepted {canon_full:?} under {canon_prefix:?}");
            Ok(())
        } else {
            Err(SecurityViolation::new(
                ViolationKind::PathTraversal,
                first_tainted,
                format!("canonical path {canon_full:?} escapes trusted prefix {canon_prefix:?}"),
            ))
        }
    }
}

/// One-shot form of [`PathValidator::validate`] with the default policy.
pub fn validate_path(path: &str, taint: &TaintSet) -> Result<(), SecurityViolation> {
    PathValidator::default().validate(path, taint)
}

/// Lexical canonicalization: collapse `//`, drop `.`, resolve `..` against
/// the segment stack. `..` at an absolute root stays at the root; on a
/// relative path it is preserved. A trailing separator survives so callers
/// can tell a directory prefix from a file prefix.
fn lexical_canonicalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if stack.last().is_some_and(|s| *s != "..") {
                    stack.pop();
                } else if !absolute {
                    stack.push("..");
                }
            }
            s => stack.push(s),
        }
    }
    let mut out = String::new();
    if absolute {
        out.push('/');
    }
    out.push_str(&stack.join("/"));
    if trailing && !stack.is_empty() {
        out.push('/');
    }
    out
}

#[cfg(test)]
fn taint_after(path: &str, trusted_prefix: &str) -> TaintSet {
    assert!(path.starts_with(trusted_prefix));
    let start = trusted_prefix.chars().count();
    let mut taint = TaintSet::new(path.chars().count());
    taint.set_range(start, taint.len()).unwrap();
    taint
}

#[test]
fn canonicalization_is_lexical() {
    let cases = [
        ("/var/www/../../etc/passwd", "/etc/passwd"),
        ("/var/www/", "/var/www/"),
        ("//var//www", "/var/www"),
        ("/..", "/"),
        ("/", "/"),
        ("a/../../b", "../b"),
        ("./x/./y", "x/y"),
        (".", ""),
        ("uploads/img.png", "uploads/img.png"),
    ];
    for (input, expected) in cases {
        assert_eq!(lexical_canonicalize(input), expected, "case: {input}");
    }
}

#[test]
fn untainted_paths_always_pass() {
    let path = "/etc/passwd";
    assert!(validate_path(path, &TaintSet::new(path.chars().count())).is_ok());
}

#[test]
fn traversal_out_of_the_trusted_prefix_is_rejected() {
    let path = "/var/www/../../etc/passwd";
    let taint = taint_after(path, "/var/www/");
    let violation = validate_path(path, &taint).unwrap_err();
    assert_eq!(violation.kind, ViolationKind::PathTraversal);
    assert_eq!(violation.offset, 9);
}

#[test]
fn untrusted_file_name_inside_the_prefix_passes() {
    let path = "/var/www/app/file.txt";
    let taint = taint_after(path, "/var/www/app/");
    assert!(validate_path(path, &taint).is_ok());
}

#[test]
fn dotdot_that_stays_inside_the_prefix_passes() {
    let path = "/var/www/uploads/../cache/x";
    let taint = taint_after(path, "/var/www/");
    assert!(validate_path(path, &taint).is_ok());
}

#[test]
fn resolving_back_to_the_prefix_directory_itself_passes() {
    // canon(full) equals the prefix minus its trailing separator; the
    // stripped-separator relaxation accepts it
    let path = "/var/www/x/..";
    let taint = taint_after(path, "/var/www/");
    assert!(validate_path(path, &taint).is_ok());
}

#[test]
fn tainted_first_character_is_rejected() {
    let path = "/var/www/a";
    let taint = TaintSet::filled(true, path.chars().count());
    let violation = validate_path(path, &taint).unwrap_err();
    assert_eq!(violation.offset, 0);
}

#[test]
fn root_prefix_gives_no_sandbox() {
    let path = "/uploads/file";
    let taint = taint_after(path, "/");
    assert!(validate_path(path, &taint).is_err());
}

#[test]
fn untrusted_nul_byte_is_rejected() {
    let path = "/var/www/fi\0le.txt";
    let taint = taint_after(path, "/var/www/");
    let violation = validate_path(path, &taint).unwrap_err();
    assert_eq!(violation.offset, 11);
    // a host that pre-filters NULs can turn the check off
    let lax = PathValidator::new(false);
    assert!(lax.validate(path, &taint).is_ok());
}

#[test]
fn relative_paths_enforce_their_prefix() {
    let ok = "uploads/img.png";
    assert!(validate_path(ok, &taint_after(ok, "uploads/")).is_ok());

    let escape = "uploads/../secret";
    assert!(validate_path(escape, &taint_after(escape, "uploads/")).is_err());

    // "./" collapses to nothing: no boundary to defend
    let bare = "./anything";
    assert!(validate_path(bare, &taint_after(bare, "./")).is_err());
}

#[test]
fn length_mismatch_fails_closed() {
    assert!(validate_path("/var/www/x", &TaintSet::filled(true, 3)).is_err());
}
