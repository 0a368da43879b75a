use crate::errors::{GuardError, GuardResult};
use crate::html::HtmlObserver;
use crate::path::PathValidator;
use crate::sql::SqlValidator;
use crate::sql::dialect::{self, DialectConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SqlPolicy {
    /// Named dialect profile from the registry.
    pub dialect: String,

    /// Per-flag overrides applied on top of the named profile.
    pub standard_conforming_strings: Option<bool>,
    pub nested_block_comments: Option<bool>,
    pub dollar_quoted_strings: Option<bool>,
    pub quote_delimited_strings: Option<bool>,
    pub binary_float_suffixes: Option<bool>,
}

impl Default for SqlPolicy {
    fn default() -> Self {
        Self {
            dialect: "ansi".into(),
            standard_conforming_strings: None,
            nested_block_comments: None,
            dollar_quoted_strings: None,
            quote_delimited_strings: None,
            binary_float_suffixes: None,
        }
    }
}

impl SqlPolicy {
    /// The named profile with this policy's overrides folded in.
    pub fn resolve(&self) -> GuardResult<DialectConfig> {
        let mut flags = dialect::lookup(&self.dialect)
            .ok_or_else(|| GuardError::UnknownDialect(self.dialect.clone()))?;
        let overrides = [
            (
                DialectConfig::STANDARD_CONFORMING_STRINGS,
                self.standard_conforming_strings,
            ),
            (
                DialectConfig::NESTED_BLOCK_COMMENTS,
                self.nested_block_comments,
            ),
            (
                DialectConfig::DOLLAR_QUOTED_STRINGS,
                self.dollar_quoted_strings,
            ),
            (
                DialectConfig::QUOTE_DELIMITED_STRINGS,
                self.quote_delimited_strings,
            ),
            (
                DialectConfig::BINARY_FLOAT_SUFFIXES,
                self.binary_float_suffixes,
            ),
        ];
        for (flag, value) in overrides {
            if let Some(value) = value {
                flags.set(flag, value);
            }
        }
        Ok(flags)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HtmlPolicy {
    /// Whether response-body writes are observed at all.
    pub enabled: bool,
}

impl Default for HtmlPolicy {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PathPolicy {
    /// Off only for hosts that strip NUL bytes before the sink.
    pub reject_embedded_nul: bool,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self {
            reject_embedded_nul: true,
        }
    }
}

/// Enforcement policy for all sinks, usually loaded once at startup from a
/// TOML file shipped with the embedding application.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct GuardConfig {
    pub sql: SqlPolicy,
    pub html: HtmlPolicy,
    pub path: PathPolicy,
}

impl GuardConfig {
    pub fn from_toml_str(input: &str) -> GuardResult<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> GuardResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn sql_validator(&self) -> GuardResult<SqlValidator> {
        Ok(SqlValidator::new(self.sql.resolve()?))
    }

    pub fn html_observer(&self) -> HtmlObserver {
        HtmlObserver::new(self.html.enabled)
    }

    pub fn path_validator(&self) -> PathValidator {
        PathValidator::new(self.path.reject_embedded_nul)
    }
}

#[test]
fn defaults_resolve_to_the_ansi_profile() {
    let config = GuardConfig::default();
    assert_eq!(config.sql.resolve().unwrap(), DialectConfig::ANSI);
    assert!(config.html.enabled);
    assert!(config.path.reject_embedded_nul);
}

#[test]
fn toml_overrides_change_the_resolved_flags() {
    let config = GuardConfig::from_toml_str(
        r#"
        [sql]
        dialect = "postgresql"
        nested_block_comments = false

        [html]
        enabled = false
    "#,
    )
    .unwrap();

    let flags = config.sql.resolve().unwrap();
    assert!(flags.contains(DialectConfig::DOLLAR_QUOTED_STRINGS));
    assert!(!flags.contains(DialectConfig::NESTED_BLOCK_COMMENTS));
    assert!(!config.html.enabled);
    assert!(config.path.reject_embedded_nul);
}

#[test]
fn unknown_dialect_names_are_rejected() {
    let config = GuardConfig::from_toml_str("[sql]\ndialect = \"sybase\"").unwrap();
    assert!(matches!(
        config.sql.resolve(),
        Err(GuardError::UnknownDialect(name)) if name == "sybase"
    ));
}

#[test]
fn load_reads_a_policy_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("sinkguard.toml");
    fs::write(&file, "[sql]\ndialect = \"oracle\"\n").unwrap();

    let config = GuardConfig::load(&file).expect("GuardConfig::load should succeed");
    assert_eq!(config.sql.resolve().unwrap(), DialectConfig::ORACLE);
    assert!(config.sql_validator().is_ok());

    assert!(GuardConfig::load(&dir.path().join("missing.toml")).is_err());
}
