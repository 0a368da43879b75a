pub mod dialect;
mod number;

pub use dialect::DialectConfig;

use crate::errors::{SecurityViolation, ViolationKind};
use crate::taint::TaintSet;
use tracing::debug;

/// Validates that the untrusted characters of a SQL query cannot alter the
/// query's structure. Immutable after construction; one instance is shared
/// freely across threads and calls.
///
/// The validator tokenizes the query left to right, guided by the dialect
/// flags, and applies a per-token taint rule: literal *content* may be
/// untrusted, everything that decides where a token starts or ends may not.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlValidator {
    config: DialectConfig,
}

impl SqlValidator {
    pub fn new(config: DialectConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> DialectConfig {
        self.config
    }

    pub fn validate(&self, text: &str, taint: &TaintSet) -> Result<(), SecurityViolation> {
        let chars: Vec<char> = text.chars().collect();
        if taint.len() != chars.len() {
            // Corrupted taint metadata at a sink fails closed.
            return Err(SecurityViolation::new(
                ViolationKind::Other,
                0,
                format!(
                    "taint length {} does not match text length {}",
                    taint.len(),
                    chars.len()
                ),
            ));
        }
        debug!(target: "sql", "validating {} chars, {} tainted, dialect {}", chars.len(), taint.cardinality(), self.config);

        let tainted: Vec<bool> = taint.iter().collect();
        let mut scanner = Scanner {
            chars: &chars,
            tainted: &tainted,
            config: self.config,
            pos: 0,
        };
        scanner.run().inspect_err(|violation| {
            debug!(target: "sql", "rejected: {violation}");
        })
    }
}

/// One-shot form of [`SqlValidator::validate`].
pub fn validate_sql(
    text: &str,
    taint: &TaintSet,
    config: DialectConfig,
) -> Result<(), SecurityViolation> {
    SqlValidator::new(config).validate(text, taint)
}

/// Block-comment scanner states. `/` and `*` only pair up across two
/// consecutive characters, so one remembered character is enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentScan {
    Plain,
    SeenSlash,
    SeenStar,
}

struct Scanner<'a> {
    chars: &'a [char],
    tainted: &'a [bool],
    config: DialectConfig,
    pos: usize,
}

impl Scanner<'_> {
    /// Scans the whole input; token boundaries depend on content, so the
    /// text is always consumed in full rather than bailing at the first
    /// untainted prefix.
    fn run(&mut self) -> Result<(), SecurityViolation> {
        let len = self.chars.len();
        let mut region_start = 0;
        while self.pos < len {
            let c = self.chars[self.pos];
            if c == '\'' {
                self.default_region(region_start, self.pos)?;
                self.string_literal(self.pos, None)?;
                region_start = self.pos;
            } else if c == '"' {
                self.default_region(region_start, self.pos)?;
                self.quoted_identifier()?;
                region_start = self.pos;
            } else if c == '-' && self.peek(1) == Some('-') {
                self.default_region(region_start, self.pos)?;
                self.line_comment()?;
                region_start = self.pos;
            } else if c == '/' && self.peek(1) == Some('*') {
                self.default_region(region_start, self.pos)?;
                self.block_comment()?;
                region_start = self.pos;
            } else if c == '$'
                && self.config.contains(DialectConfig::DOLLAR_QUOTED_STRINGS)
                && let Some(open_close) = self.dollar_tag_close(self.pos)
            {
                self.default_region(region_start, self.pos)?;
                self.dollar_quoted(self.pos, open_close)?;
                region_start = self.pos;
            } else if is_word_start(c) {
                let word_end = self.word_end(self.pos);
                if word_end == self.pos + 1 && self.peek(1) == Some('\'') && matches!(c, 'e' | 'E')
                {
                    // E'...' disables standard-conforming behavior locally
                    self.default_region(region_start, self.pos)?;
                    self.string_literal(self.pos + 1, Some(self.pos))?;
                    region_start = self.pos;
                } else if word_end == self.pos + 1
                    && self.peek(1) == Some('\'')
                    && matches!(c, 'q' | 'Q')
                    && self.config.contains(DialectConfig::QUOTE_DELIMITED_STRINGS)
                {
                    self.default_region(region_start, self.pos)?;
                    self.quote_delimited()?;
                    region_start = self.pos;
                } else {
                    self.pos = word_end;
                }
            } else {
                self.pos += 1;
            }
        }
        self.default_region(region_start, len)
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn word_end(&self, pos: usize) -> usize {
        let mut i = pos + 1;
        while i < self.chars.len() && is_word_char(self.chars[i]) {
            i += 1;
        }
        i
    }

    /// `'...'`, with an optional `E`/`e` prefix position. The delimiting
    /// quotes are structural; so is each escape pair, whose two characters
    /// must agree in taint (an attacker who controls exactly one half of
    /// `''` or `\x` moves the literal's end).
    fn string_literal(
        &mut self,
        quote: usize,
        prefix: Option<usize>,
    ) -> Result<(), SecurityViolation> {
        let backslash_escapes = prefix.is_some()
            || !self
                .config
                .contains(DialectConfig::STANDARD_CONFORMING_STRINGS);
        if let Some(p) = prefix
            && self.tainted[p]
        {
            return Err(SecurityViolation::new(
                ViolationKind::StringLiteral,
                p,
                "tainted escape-string prefix",
            ));
        }
        if self.tainted[quote] {
            return Err(SecurityViolation::new(
                ViolationKind::StringLiteral,
                quote,
                "tainted opening quote",
            ));
        }
        let len = self.chars.len();
        let mut i = quote + 1;
        while i < len {
            match self.chars[i] {
                '\\' if backslash_escapes => {
                    if i + 1 >= len {
                        i += 1;
                        break;
                    }
                    if self.tainted[i] != self.tainted[i + 1] {
                        return Err(SecurityViolation::new(
                            ViolationKind::StringLiteral,
                            i,
                            "escape pair with mismatched taint",
                        ));
                    }
                    i += 2;
                }
                '\'' => {
                    if i + 1 < len && self.chars[i + 1] == '\'' {
                        if self.tainted[i] != self.tainted[i + 1] {
                            return Err(SecurityViolation::new(
                                ViolationKind::StringLiteral,
                                i,
                                "doubled quote with mismatched taint",
                            ));
                        }
                        i += 2;
                    } else {
                        if self.tainted[i] {
                            return Err(SecurityViolation::new(
                                ViolationKind::StringLiteral,
                                i,
                                "tainted closing quote",
                            ));
                        }
                        self.pos = i + 1;
                        return Ok(());
                    }
                }
                _ => i += 1,
            }
        }
        // unterminated: the literal runs to end of input, no closer to check
        self.pos = len;
        Ok(())
    }

    /// `"..."` names objects, columns, tables. Partial trust is never
    /// acceptable here, so any taint anywhere in the token rejects.
    fn quoted_identifier(&mut self) -> Result<(), SecurityViolation> {
        let start = self.pos;
        let len = self.chars.len();
        let mut end = len;
        let mut i = start + 1;
        while i < len {
            if self.chars[i] == '"' {
                if i + 1 < len && self.chars[i + 1] == '"' {
                    i += 2;
                    continue;
                }
                end = i + 1;
                break;
            }
            i += 1;
        }
        for j in start..end {
            if self.tainted[j] {
                return Err(SecurityViolation::new(
                    ViolationKind::QuotedIdentifier,
                    j,
                    "tainted quoted identifier",
                ));
            }
        }
        self.pos = end;
        Ok(())
    }

    /// `q'X...Y'` where `Y` is `X`'s paired closer. Only the five
    /// delimiter-defining characters are structural; content taint is fine.
    fn quote_delimited(&mut self) -> Result<(), SecurityViolation> {
        let start = self.pos;
        let len = self.chars.len();
        for j in start..(start + 3).min(len) {
            if self.tainted[j] {
                return Err(SecurityViolation::new(
                    ViolationKind::QuoteDelimitedLiteral,
                    j,
                    "tainted quote-delimited opener",
                ));
            }
        }
        if start + 2 >= len {
            self.pos = len;
            return Ok(());
        }
        let closer = match self.chars[start + 2] {
            '[' => ']',
            '{' => '}',
            '<' => '>',
            '(' => ')',
            c => c,
        };
        let mut i = start + 3;
        while i + 1 < len {
            if self.chars[i] == closer && self.chars[i + 1] == '\'' {
                if self.tainted[i] || self.tainted[i + 1] {
                    let at = if self.tainted[i] { i } else { i + 1 };
                    return Err(SecurityViolation::new(
                        ViolationKind::QuoteDelimitedLiteral,
                        at,
                        "tainted quote-delimited closer",
                    ));
                }
                self.pos = i + 2;
                return Ok(());
            }
            i += 1;
        }
        self.pos = len;
        Ok(())
    }

    /// Index of the `$` closing the opening delimiter, if `pos` really
    /// starts a `$tag$`. Tags are identifier-like, so `$1` parameters never
    /// match.
    fn dollar_tag_close(&self, pos: usize) -> Option<usize> {
        let len = self.chars.len();
        let mut j = pos + 1;
        if j < len && self.chars[j] == '$' {
            return Some(j);
        }
        if j >= len || !(self.chars[j].is_alphabetic() || self.chars[j] == '_') {
            return None;
        }
        j += 1;
        while j < len && (self.chars[j].is_alphanumeric() || self.chars[j] == '_') {
            j += 1;
        }
        if j < len && self.chars[j] == '$' { Some(j) } else { None }
    }

    /// `$tag$...$tag$`. A tainted tag character lets an attacker redefine
    /// where the literal ends, so both delimiter occurrences must be fully
    /// trusted; content may be tainted freely.
    fn dollar_quoted(&mut self, start: usize, open_close: usize) -> Result<(), SecurityViolation> {
        for j in start..=open_close {
            if self.tainted[j] {
                return Err(SecurityViolation::new(
                    ViolationKind::DollarQuotedLiteral,
                    j,
                    "tainted dollar-quote delimiter",
                ));
            }
        }
        let tag_len = open_close - start - 1;
        let close_len = tag_len + 2;
        let len = self.chars.len();
        let mut i = open_close + 1;
        while i + close_len <= len {
            if self.chars[i] == '$'
                && self.chars[i + 1..i + 1 + tag_len] == self.chars[start + 1..open_close]
                && self.chars[i + 1 + tag_len] == '$'
            {
                for j in i..i + close_len {
                    if self.tainted[j] {
                        return Err(SecurityViolation::new(
                            ViolationKind::DollarQuotedLiteral,
                            j,
                            "tainted dollar-quote delimiter",
                        ));
                    }
                }
                self.pos = i + close_len;
                return Ok(());
            }
            i += 1;
        }
        self.pos = len;
        Ok(())
    }

    /// `--` to end of line. A tainted terminator could extend or truncate
    /// the comment.
    fn line_comment(&mut self) -> Result<(), SecurityViolation> {
        let len = self.chars.len();
        let mut i = self.pos + 2;
        while i < len && !matches!(self.chars[i], '\n' | '\r') {
            i += 1;
        }
        if i < len {
            if self.tainted[i] {
                return Err(SecurityViolation::new(
                    ViolationKind::LineComment,
                    i,
                    "tainted line-comment terminator",
                ));
            }
            self.pos = i + 1;
        } else {
            self.pos = len;
        }
        Ok(())
    }

    /// `/* ... */`, nesting per dialect. Every pair that opens or closes a
    /// nesting level is structural, the outermost one included.
    fn block_comment(&mut self) -> Result<(), SecurityViolation> {
        let start = self.pos;
        let nested = self.config.contains(DialectConfig::NESTED_BLOCK_COMMENTS);
        self.comment_pair(start, "tainted block-comment opener")?;
        let len = self.chars.len();
        let mut depth = 1usize;
        let mut state = CommentScan::Plain;
        let mut i = start + 2;
        while i < len {
            state = match (state, self.chars[i]) {
                (CommentScan::SeenSlash, '*') if nested => {
                    self.comment_pair(i - 1, "tainted nested-comment opener")?;
                    depth += 1;
                    CommentScan::Plain
                }
                (CommentScan::SeenStar, '/') => {
                    self.comment_pair(i - 1, "tainted block-comment closer")?;
                    depth -= 1;
                    if depth == 0 {
                        self.pos = i + 1;
                        return Ok(());
                    }
                    CommentScan::Plain
                }
                (_, '/') if nested => CommentScan::SeenSlash,
                (_, '*') => CommentScan::SeenStar,
                _ => CommentScan::Plain,
            };
            i += 1;
        }
        self.pos = len;
        Ok(())
    }

    fn comment_pair(&self, first: usize, message: &str) -> Result<(), SecurityViolation> {
        if self.tainted[first] || self.tainted[first + 1] {
            let at = if self.tainted[first] { first } else { first + 1 };
            return Err(SecurityViolation::new(
                ViolationKind::BlockComment,
                at,
                message,
            ));
        }
        Ok(())
    }

    /// Everything between special tokens: operators, bare identifiers,
    /// keywords, numbers, whitespace. Each maximal tainted run must re-lex
    /// as one complete numeric literal, or be exactly a boolean keyword.
    fn default_region(&self, begin: usize, end: usize) -> Result<(), SecurityViolation> {
        let mut i = begin;
        while i < end {
            if !self.tainted[i] {
                i += 1;
                continue;
            }
            let run_start = i;
            while i < end && self.tainted[i] {
                i += 1;
            }
            self.check_tainted_run(run_start, i)?;
        }
        Ok(())
    }

    fn check_tainted_run(&self, begin: usize, end: usize) -> Result<(), SecurityViolation> {
        if number::is_numeric_literal(&self.chars[begin..end], self.config) {
            return Ok(());
        }
        if self.is_boolean_word(begin, end) {
            return Ok(());
        }
        let (kind, message) = self.classify_rejected_run(begin, end);
        Err(SecurityViolation::new(kind, begin, message))
    }

    /// A fully tainted `true`/`false` standing alone as a word. Attacker
    /// choice between the two booleans does not change query shape.
    fn is_boolean_word(&self, begin: usize, end: usize) -> bool {
        let bounded = (begin == 0 || !is_word_char(self.chars[begin - 1]))
            && (end == self.chars.len() || !is_word_char(self.chars[end]));
        bounded && is_boolean_text(&self.chars[begin..end])
    }

    fn classify_rejected_run(&self, begin: usize, end: usize) -> (ViolationKind, &'static str) {
        let mut wb = begin;
        while wb > 0 && is_word_char(self.chars[wb - 1]) {
            wb -= 1;
        }
        let mut we = end;
        while we < self.chars.len() && is_word_char(self.chars[we]) {
            we += 1;
        }
        if (wb < begin || we > end) && is_boolean_text(&self.chars[wb..we]) {
            return (
                ViolationKind::BooleanLiteral,
                "partially tainted boolean literal",
            );
        }
        let first = self.chars[begin];
        let numeric_shaped = first.is_ascii_digit()
            || (matches!(first, '.' | '+' | '-')
                && self.chars[begin..end].iter().any(|c| c.is_ascii_digit()));
        if numeric_shaped {
            (
                ViolationKind::Number,
                "tainted span is not a complete numeric literal",
            )
        } else {
            (ViolationKind::Other, "tainted SQL text outside a literal")
        }
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_boolean_text(span: &[char]) -> bool {
    let word: String = span.iter().collect();
    word.eq_ignore_ascii_case("true") || word.eq_ignore_ascii_case("false")
}

#[cfg(test)]
fn untainted(text: &str) -> TaintSet {
    TaintSet::new(text.chars().count())
}

#[cfg(test)]
fn taint_on(text: &str, needle: &str) -> TaintSet {
    let byte_start = text.find(needle).expect("needle not found");
    let start = text[..byte_start].chars().count();
    let mut taint = untainted(text);
    taint
        .set_range(start, start + needle.chars().count())
        .unwrap();
    taint
}

#[cfg(test)]
fn taint_at(text: &str, index: usize) -> TaintSet {
    let mut taint = untainted(text);
    taint.set(index).unwrap();
    taint
}

#[cfg(test)]
fn kind_of(result: Result<(), SecurityViolation>) -> ViolationKind {
    result.expect_err("expected a violation").kind
}

#[test]
fn untainted_query_passes() {
    let text = "SELECT * FROM t WHERE x = 'abc'";
    assert!(validate_sql(text, &untainted(text), DialectConfig::ANSI).is_ok());
}

#[test]
fn fully_tainted_query_is_rejected() {
    let text = "SELECT * FROM t";
    let taint = TaintSet::filled(true, text.chars().count());
    assert_eq!(
        kind_of(validate_sql(text, &taint, DialectConfig::ANSI)),
        ViolationKind::Other
    );
}

#[test]
fn string_content_taint_passes() {
    let text = "SELECT * FROM t WHERE x = 'abc'";
    let taint = taint_on(text, "abc");
    assert!(validate_sql(text, &taint, DialectConfig::ANSI).is_ok());
}

#[test]
fn tainted_closing_quote_is_rejected() {
    let text = "SELECT * FROM t WHERE x = 'abc'";
    let taint = taint_at(text, text.chars().count() - 1);
    let violation = validate_sql(text, &taint, DialectConfig::ANSI).unwrap_err();
    assert_eq!(violation.kind, ViolationKind::StringLiteral);
    assert_eq!(violation.offset, text.chars().count() - 1);
}

#[test]
fn tainted_opening_quote_is_rejected() {
    let text = "SELECT 'abc'";
    let taint = taint_at(text, 7);
    assert_eq!(
        kind_of(validate_sql(text, &taint, DialectConfig::ANSI)),
        ViolationKind::StringLiteral
    );
}

#[test]
fn doubled_quote_needs_matching_taint() {
    let text = "SELECT 'a''b'";
    // both halves tainted: the attacker supplied a properly escaped quote
    assert!(validate_sql(text, &taint_on(text, "a''b"), DialectConfig::ANSI).is_ok());
    // only one half tainted: the literal's end is attacker-movable
    assert_eq!(
        kind_of(validate_sql(text, &taint_at(text, 9), DialectConfig::ANSI)),
        ViolationKind::StringLiteral
    );
}

#[test]
fn backslash_escape_pair_needs_matching_taint() {
    let text = r"SELECT 'a\'b'";
    // mariadb-style literals treat backslash as an escape
    assert!(validate_sql(text, &taint_on(text, r"a\'b"), DialectConfig::MARIADB).is_ok());
    let backslash = text.chars().position(|c| c == '\\').unwrap();
    assert_eq!(
        kind_of(validate_sql(
            text,
            &taint_at(text, backslash),
            DialectConfig::MARIADB
        )),
        ViolationKind::StringLiteral
    );
}

#[test]
fn escape_prefix_enables_backslash_escapes_locally() {
    let text = r"SELECT E'a\'b'";
    // under standard-conforming strings the E prefix still turns escapes on
    assert!(validate_sql(text, &taint_on(text, r"a\'b"), DialectConfig::POSTGRESQL).is_ok());
    let backslash = text.chars().position(|c| c == '\\').unwrap();
    assert!(validate_sql(text, &taint_at(text, backslash), DialectConfig::POSTGRESQL).is_err());
    // the prefix character itself is structural
    let prefix = text.chars().position(|c| c == 'E').unwrap();
    assert_eq!(
        kind_of(validate_sql(
            text,
            &taint_at(text, prefix),
            DialectConfig::POSTGRESQL
        )),
        ViolationKind::StringLiteral
    );
}

#[test]
fn quoted_identifier_rejects_any_taint() {
    let text = "SELECT \"col name\" FROM t";
    assert!(validate_sql(text, &untainted(text), DialectConfig::ANSI).is_ok());
    assert_eq!(
        kind_of(validate_sql(text, &taint_on(text, "col"), DialectConfig::ANSI)),
        ViolationKind::QuotedIdentifier
    );
    // delimiters are no better than content
    assert_eq!(
        kind_of(validate_sql(text, &taint_at(text, 7), DialectConfig::ANSI)),
        ViolationKind::QuotedIdentifier
    );
}

#[test]
fn quote_delimited_content_taint_passes() {
    let text = "SELECT q'[it's fine]' FROM dual";
    assert!(validate_sql(text, &taint_on(text, "it's fine"), DialectConfig::ORACLE).is_ok());
}

#[test]
fn quote_delimited_delimiters_must_be_untainted() {
    let text = "SELECT q'[abc]' FROM dual";
    let open_bracket = text.chars().position(|c| c == '[').unwrap();
    assert_eq!(
        kind_of(validate_sql(
            text,
            &taint_at(text, open_bracket),
            DialectConfig::ORACLE
        )),
        ViolationKind::QuoteDelimitedLiteral
    );
    let close_bracket = text.chars().position(|c| c == ']').unwrap();
    assert_eq!(
        kind_of(validate_sql(
            text,
            &taint_at(text, close_bracket),
            DialectConfig::ORACLE
        )),
        ViolationKind::QuoteDelimitedLiteral
    );
}

#[test]
fn quote_delimited_pairs_and_identity_delimiters() {
    for text in [
        "SELECT q'{ab}' FROM dual",
        "SELECT q'<ab>' FROM dual",
        "SELECT q'(ab)' FROM dual",
        "SELECT q'#ab#' FROM dual",
    ] {
        assert!(
            validate_sql(text, &taint_on(text, "ab"), DialectConfig::ORACLE).is_ok(),
            "case: {text}"
        );
    }
}

#[test]
fn quote_delimited_is_dialect_gated() {
    // without the flag, q'...' is a bare identifier plus a plain string
    let text = "SELECT q'[abc]'";
    assert!(validate_sql(text, &taint_on(text, "abc"), DialectConfig::ANSI).is_ok());
    let q = text.chars().position(|c| c == 'q').unwrap();
    assert_eq!(
        kind_of(validate_sql(text, &taint_at(text, q), DialectConfig::ANSI)),
        ViolationKind::Other
    );
}

#[test]
fn dollar_quoted_content_taint_passes() {
    let text = "SELECT $tag$abc$tag$";
    assert!(validate_sql(text, &taint_on(text, "abc"), DialectConfig::POSTGRESQL).is_ok());
}

#[test]
fn dollar_quoted_tag_taint_is_rejected() {
    let text = "SELECT $tag$abc$tag$";
    let open_tag_char = text.chars().position(|c| c == 't').unwrap();
    assert_eq!(
        kind_of(validate_sql(
            text,
            &taint_at(text, open_tag_char),
            DialectConfig::POSTGRESQL
        )),
        ViolationKind::DollarQuotedLiteral
    );
    // closing delimiter too
    let taint = taint_at(text, text.chars().count() - 1);
    assert_eq!(
        kind_of(validate_sql(text, &taint, DialectConfig::POSTGRESQL)),
        ViolationKind::DollarQuotedLiteral
    );
}

#[test]
fn anonymous_dollar_quotes_protect_their_delimiters() {
    let text = "SELECT $$a'b$$";
    assert!(validate_sql(text, &taint_on(text, "a'b"), DialectConfig::POSTGRESQL).is_ok());
    let taint = taint_at(text, 7);
    assert_eq!(
        kind_of(validate_sql(text, &taint, DialectConfig::POSTGRESQL)),
        ViolationKind::DollarQuotedLiteral
    );
}

#[test]
fn dollar_parameters_are_not_dollar_quotes() {
    let text = "SELECT * FROM t WHERE id = $1";
    assert!(validate_sql(text, &untainted(text), DialectConfig::POSTGRESQL).is_ok());
}

#[test]
fn line_comment_terminator_must_be_untainted() {
    let text = "SELECT 1 -- note\nSELECT 2";
    assert!(validate_sql(text, &taint_on(text, "note"), DialectConfig::ANSI).is_ok());
    let newline = text.chars().position(|c| c == '\n').unwrap();
    let violation = validate_sql(text, &taint_at(text, newline), DialectConfig::ANSI).unwrap_err();
    assert_eq!(violation.kind, ViolationKind::LineComment);
    assert_eq!(violation.offset, newline);
    // a comment that runs to end of input has no terminator to police
    let open_ended = "SELECT 1 -- note";
    assert!(validate_sql(open_ended, &taint_on(open_ended, "note"), DialectConfig::ANSI).is_ok());
}

#[test]
fn block_comment_content_taint_passes() {
    let text = "SELECT 1 /* hint */";
    assert!(validate_sql(text, &taint_on(text, "hint"), DialectConfig::ANSI).is_ok());
}

#[test]
fn block_comment_delimiters_must_be_untainted() {
    let text = "SELECT 1 /* hint */";
    let open_slash = text.chars().position(|c| c == '/').unwrap();
    assert_eq!(
        kind_of(validate_sql(
            text,
            &taint_at(text, open_slash),
            DialectConfig::ANSI
        )),
        ViolationKind::BlockComment
    );
    let close_star = text.chars().count() - 2;
    assert_eq!(
        kind_of(validate_sql(
            text,
            &taint_at(text, close_star),
            DialectConfig::ANSI
        )),
        ViolationKind::BlockComment
    );
}

#[test]
fn nested_comment_pairs_are_structural_when_nesting_is_on() {
    let text = "SELECT 1 /* a /* b */ c */";
    let inner_open = text.find("/* b").unwrap();
    let inner_open = text[..inner_open].chars().count();
    // postgresql nests: the inner pair opens a level and is structural
    assert_eq!(
        kind_of(validate_sql(
            text,
            &taint_at(text, inner_open),
            DialectConfig::POSTGRESQL
        )),
        ViolationKind::BlockComment
    );
    assert!(validate_sql(text, &taint_on(text, "b"), DialectConfig::POSTGRESQL).is_ok());
}

#[test]
fn inner_comment_pairs_are_content_when_nesting_is_off() {
    // ansi does not nest: the comment ends at the first */ and the inner
    // /* is plain content
    let text = "SELECT 1 /* a /* b */ + 2";
    let inner_open = text.find("/* b").unwrap();
    let inner_open = text[..inner_open].chars().count();
    assert!(validate_sql(text, &taint_at(text, inner_open), DialectConfig::ANSI).is_ok());
    assert!(validate_sql(text, &untainted(text), DialectConfig::ANSI).is_ok());
}

#[test]
fn tainted_boolean_is_all_or_nothing() {
    let text = "SELECT * FROM t WHERE ok = true";
    assert!(validate_sql(text, &taint_on(text, "true"), DialectConfig::ANSI).is_ok());
    assert_eq!(
        kind_of(validate_sql(text, &taint_on(text, "ru"), DialectConfig::ANSI)),
        ViolationKind::BooleanLiteral
    );
    let upper = "SELECT * FROM t WHERE ok = FALSE";
    assert!(validate_sql(upper, &taint_on(upper, "FALSE"), DialectConfig::ANSI).is_ok());
}

#[test]
fn boolean_text_inside_a_longer_word_is_not_a_boolean() {
    let text = "SELECT istrue FROM t";
    assert_eq!(
        kind_of(validate_sql(text, &taint_on(text, "true"), DialectConfig::ANSI)),
        ViolationKind::Other
    );
}

#[test]
fn tainted_numeric_literal_passes() {
    let text = "SELECT 1";
    assert!(validate_sql(text, &taint_on(text, "1"), DialectConfig::ANSI).is_ok());
    let float = "SELECT 1.5e-3 FROM t";
    assert!(validate_sql(float, &taint_on(float, "1.5e-3"), DialectConfig::ANSI).is_ok());
}

#[test]
fn tainted_span_that_is_not_a_number_is_rejected() {
    let text = "SELECT 1x";
    let violation = validate_sql(text, &taint_on(text, "1x"), DialectConfig::ANSI).unwrap_err();
    assert_eq!(violation.kind, ViolationKind::Number);
    assert_eq!(violation.offset, 7);
}

#[test]
fn partial_digit_taint_inside_a_number_passes() {
    let text = "SELECT 123 FROM t";
    assert!(validate_sql(text, &taint_on(text, "2"), DialectConfig::ANSI).is_ok());
}

#[test]
fn binary_float_suffix_follows_the_dialect() {
    let text = "SELECT 1.5f FROM dual";
    assert!(validate_sql(text, &taint_on(text, "1.5f"), DialectConfig::ORACLE).is_ok());
    assert!(validate_sql(text, &taint_on(text, "1.5f"), DialectConfig::ANSI).is_err());
}

#[test]
fn tainted_operator_is_rejected() {
    let text = "SELECT a = b FROM t";
    assert_eq!(
        kind_of(validate_sql(text, &taint_on(text, "="), DialectConfig::ANSI)),
        ViolationKind::Other
    );
}

#[test]
fn tainted_whitespace_is_rejected() {
    let text = "SELECT 1 + 2";
    let mut taint = untainted(text);
    taint.set(8).unwrap(); // the space after "1"
    assert_eq!(
        kind_of(validate_sql(text, &taint, DialectConfig::ANSI)),
        ViolationKind::Other
    );
}

#[test]
fn taint_length_mismatch_fails_closed() {
    let text = "SELECT 1";
    let taint = TaintSet::new(3);
    let violation = validate_sql(text, &taint, DialectConfig::ANSI).unwrap_err();
    assert_eq!(violation.kind, ViolationKind::Other);
    assert_eq!(violation.offset, 0);
}

#[test]
fn unterminated_string_tolerates_content_taint() {
    let text = "SELECT 'abc";
    assert!(validate_sql(text, &taint_on(text, "abc"), DialectConfig::ANSI).is_ok());
    let quote = text.chars().position(|c| c == '\'').unwrap();
    assert!(validate_sql(text, &taint_at(text, quote), DialectConfig::ANSI).is_err());
}

#[test]
fn multibyte_text_uses_character_offsets() {
    let text = "SELECT 'héllo' FROM tä";
    let taint = taint_on(text, "héllo");
    assert!(validate_sql(text, &taint, DialectConfig::ANSI).is_ok());
    let closing = text.chars().position(|c| c == '\'').unwrap() + 6;
    assert_eq!(text.chars().nth(closing), Some('\''));
    assert!(validate_sql(text, &taint_at(text, closing), DialectConfig::ANSI).is_err());
}
