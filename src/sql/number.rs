use super::dialect::DialectConfig;

/// Whether `span`, taken in isolation, is one complete numeric literal:
/// `[+|-] (digits [. [digits]] | . digits) [(e|E) [+|-] digits] [f|F|d|D]`,
/// the trailing binary-float suffix only under `BINARY_FLOAT_SUFFIXES`.
///
/// This is the acceptance test for a tainted span outside string/comment
/// context: untrusted characters that can only ever re-lex as a single
/// number cannot change the statement's shape.
pub(crate) fn is_numeric_literal(span: &[char], config: DialectConfig) -> bool {
    let mut i = 0;
    let len = span.len();

    if i < len && (span[i] == '+' || span[i] == '-') {
        i += 1;
    }

    let int_digits = digit_run(span, &mut i);
    let mut frac_digits = 0;
    if i < len && span[i] == '.' {
        i += 1;
        frac_digits = digit_run(span, &mut i);
    }
    if int_digits == 0 && frac_digits == 0 {
        return false;
    }
    // `1.` is accepted (Oracle and PostgreSQL both lex it as a number) but
    // a bare `.` was already rejected above.

    if i < len && (span[i] == 'e' || span[i] == 'E') {
        i += 1;
        if i < len && (span[i] == '+' || span[i] == '-') {
            i += 1;
        }
        if digit_run(span, &mut i) == 0 {
            return false;
        }
    }

    if config.contains(DialectConfig::BINARY_FLOAT_SUFFIXES)
        && i < len
        && matches!(span[i], 'f' | 'F' | 'd' | 'D')
    {
        i += 1;
    }

    i == len
}

fn digit_run(span: &[char], i: &mut usize) -> usize {
    let start = *i;
    while *i < span.len() && span[*i].is_ascii_digit() {
        *i += 1;
    }
    *i - start
}

#[cfg(test)]
fn accepts(s: &str, config: DialectConfig) -> bool {
    let chars: Vec<char> = s.chars().collect();
    is_numeric_literal(&chars, config)
}

#[test]
fn numeric_literal_grammar() {
    let ansi = DialectConfig::ANSI;
    let cases = [
        ("1", true),
        ("42", true),
        ("+1", true),
        ("-2.5", true),
        (".5", true),
        ("1.", true),
        ("1e5", true),
        ("1E+10", true),
        ("1.5e-3", true),
        ("", false),
        ("-", false),
        (".", false),
        ("1x", false),
        ("1e", false),
        ("1e+", false),
        ("1.2.3", false),
        ("1 ", false),
        ("--1", false),
        ("0x1f", false),
    ];

    for (input, expected) in cases {
        assert_eq!(accepts(input, ansi), expected, "case: {input:?}");
    }
}

#[test]
fn binary_float_suffix_is_dialect_gated() {
    assert!(accepts("1.5f", DialectConfig::ORACLE));
    assert!(accepts("3d", DialectConfig::ORACLE));
    assert!(accepts("2E4D", DialectConfig::ORACLE));
    assert!(!accepts("1.5f", DialectConfig::ANSI));
    assert!(!accepts("3d", DialectConfig::POSTGRESQL));
    assert!(!accepts("1.5ff", DialectConfig::ORACLE));
}
