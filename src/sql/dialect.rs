use crate::errors::GuardError;
use bitflags::bitflags;
use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Lexical switches that distinguish one SQL engine from another. The
    /// scanning state machine itself is shared; dialect variation lives
    /// entirely in these flags, fixed at validator construction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DialectConfig: u8 {
        /// Backslash is an ordinary character inside `'...'` literals.
        const STANDARD_CONFORMING_STRINGS = 0b0000_0001;
        /// `/* ... /* ... */ ... */` nests.
        const NESTED_BLOCK_COMMENTS       = 0b0000_0010;
        /// `$tag$...$tag$` literals.
        const DOLLAR_QUOTED_STRINGS       = 0b0000_0100;
        /// `q'[...]'` literals.
        const QUOTE_DELIMITED_STRINGS     = 0b0000_1000;
        /// `f`/`d` suffixes on numeric literals.
        const BINARY_FLOAT_SUFFIXES       = 0b0001_0000;
    }
}

impl DialectConfig {
    pub const ANSI: Self = Self::STANDARD_CONFORMING_STRINGS;
    pub const ORACLE: Self = Self::STANDARD_CONFORMING_STRINGS
        .union(Self::QUOTE_DELIMITED_STRINGS)
        .union(Self::BINARY_FLOAT_SUFFIXES);
    pub const POSTGRESQL: Self = Self::STANDARD_CONFORMING_STRINGS
        .union(Self::NESTED_BLOCK_COMMENTS)
        .union(Self::DOLLAR_QUOTED_STRINGS);
    pub const DB2: Self = Self::STANDARD_CONFORMING_STRINGS.union(Self::NESTED_BLOCK_COMMENTS);
    pub const MARIADB: Self = Self::empty();
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self::ANSI
    }
}

static DIALECTS: Map<&'static str, DialectConfig> = phf_map! {
    "ansi"       => DialectConfig::ANSI,
    "default"    => DialectConfig::ANSI,
    "oracle"     => DialectConfig::ORACLE,
    "postgres"   => DialectConfig::POSTGRESQL,
    "postgresql" => DialectConfig::POSTGRESQL,
    "db2"        => DialectConfig::DB2,
    "mariadb"    => DialectConfig::MARIADB,
    "mysql"      => DialectConfig::MARIADB,
};

/// Look up a stock dialect profile by its registry name (case-insensitive).
pub fn lookup(name: &str) -> Option<DialectConfig> {
    DIALECTS.get(name.to_ascii_lowercase().as_str()).copied()
}

impl FromStr for DialectConfig {
    type Err = GuardError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        lookup(input).ok_or_else(|| GuardError::UnknownDialect(input.to_owned()))
    }
}

impl fmt::Display for DialectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = if *self == Self::ANSI {
            "ansi"
        } else if *self == Self::ORACLE {
            "oracle"
        } else if *self == Self::POSTGRESQL {
            "postgresql"
        } else if *self == Self::DB2 {
            "db2"
        } else if *self == Self::MARIADB {
            "mariadb"
        } else {
            return write!(f, "custom({:#07b})", self.bits());
        };
        f.write_str(s)
    }
}

#[test]
fn stock_profiles_resolve_by_name() {
    assert_eq!(lookup("oracle"), Some(DialectConfig::ORACLE));
    assert_eq!(lookup("PostgreSQL"), Some(DialectConfig::POSTGRESQL));
    assert_eq!(lookup("db2"), Some(DialectConfig::DB2));
    assert_eq!(lookup("mysql"), Some(DialectConfig::MARIADB));
    assert_eq!(lookup("mssql"), None);
}

#[test]
fn from_str_rejects_unknown_names() {
    assert_eq!(
        "Oracle".parse::<DialectConfig>().unwrap(),
        DialectConfig::ORACLE
    );
    assert!(matches!(
        "sybase".parse::<DialectConfig>(),
        Err(GuardError::UnknownDialect(name)) if name == "sybase"
    ));
}

#[test]
fn profile_flags_match_their_engines() {
    assert!(DialectConfig::ORACLE.contains(DialectConfig::QUOTE_DELIMITED_STRINGS));
    assert!(!DialectConfig::ORACLE.contains(DialectConfig::DOLLAR_QUOTED_STRINGS));
    assert!(DialectConfig::POSTGRESQL.contains(DialectConfig::DOLLAR_QUOTED_STRINGS));
    assert!(DialectConfig::POSTGRESQL.contains(DialectConfig::NESTED_BLOCK_COMMENTS));
    assert!(!DialectConfig::MARIADB.contains(DialectConfig::STANDARD_CONFORMING_STRINGS));
    assert_eq!(DialectConfig::default(), DialectConfig::ANSI);
    assert_eq!(DialectConfig::POSTGRESQL.to_string(), "postgresql");
}
