//! Environment variable expansion inside DSNs.
//!
//! Lets a DSN template keep secrets out of source:
//!
//! ```rust
//! use snowflake_dsn::env::{EnvExpander, MapEnvSource};
//!
//! let source = MapEnvSource::new()
//!     .set("SF_USER", "jsmith")
//!     .set("SF_PASSWORD", "secret");
//! let expander = EnvExpander::with_source(source);
//!
//! let cfg = expander
//!     .parse("${SF_USER}:${SF_PASSWORD}@acme/sales?warehouse=${SF_WAREHOUSE:-etl}")
//!     .unwrap();
//! assert_eq!(cfg.user, "jsmith");
//! assert_eq!(cfg.warehouse, "etl");
//! ```

use crate::config::Config;
use crate::error::{DsnError, DsnResult};
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;
use tracing::debug;

/// Source for environment variables.
pub trait EnvSource: Send + Sync {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;

    /// Check if a variable exists.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Expands environment variable references in DSN templates.
///
/// Supported syntax:
/// - `$VAR` - required variable
/// - `${VAR}` - required variable
/// - `${VAR:-default}` - variable with a fallback
/// - `${VAR:?message}` - required, failing with `message`
/// - `${VAR:+alt}` - `alt` when the variable is set, empty otherwise
///
/// A `$` not followed by a letter, `_` or `{` is kept literally. Values are
/// inserted verbatim, so a value destined for the query string must already
/// be percent-encoded.
#[derive(Debug, Clone)]
pub struct EnvExpander<S: EnvSource = StdEnvSource> {
    source: S,
}

impl EnvExpander<StdEnvSource> {
    /// Create an expander over the process environment.
    pub fn new() -> Self {
        Self {
            source: StdEnvSource,
        }
    }
}

impl Default for EnvExpander<StdEnvSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EnvSource> EnvExpander<S> {
    /// Create an expander with a custom environment source.
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Expand every variable reference in `input`.
    pub fn expand(&self, input: &str) -> DsnResult<String> {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some('{') => {
                    chars.next();
                    result.push_str(&self.expand_braced(&mut chars)?);
                }
                Some(&next) if next.is_alphabetic() || next == '_' => {
                    result.push_str(&self.expand_simple(&mut chars)?);
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }

    /// Expand `template` and parse the result.
    pub fn parse(&self, template: &str) -> DsnResult<Config> {
        let dsn = self.expand(template)?;
        debug!(
            variables = has_variables(template),
            "Expanded DSN template"
        );
        crate::parser::parse_dsn(&dsn)
    }

    fn expand_braced(&self, chars: &mut Peekable<Chars<'_>>) -> DsnResult<String> {
        let mut name = String::new();
        let mut modifier = None;
        let mut argument = String::new();
        let mut closed = false;

        while let Some(c) = chars.next() {
            if c == '}' {
                closed = true;
                break;
            } else if c == ':' && modifier.is_none() {
                // `${VAR:}` has no modifier and reads as `${VAR}`.
                modifier = match chars.peek() {
                    Some('}') => Some(':'),
                    _ => chars.next(),
                };
            } else if modifier.is_some() {
                argument.push(c);
            } else {
                name.push(c);
            }
        }

        if name.is_empty() {
            return Err(DsnError::InvalidEnvValue {
                name: String::new(),
                message: "empty variable name".to_string(),
            });
        }
        if !closed {
            return Err(DsnError::InvalidEnvValue {
                name,
                message: "missing closing '}'".to_string(),
            });
        }

        let value = self.source.get(&name).filter(|v| !v.is_empty());
        match (modifier, value) {
            (Some('+'), Some(_)) => Ok(argument),
            (Some('+'), None) => Ok(String::new()),
            (_, Some(value)) => Ok(value),
            (Some('-'), None) => Ok(argument),
            (Some('?'), None) => Err(DsnError::InvalidEnvValue {
                message: if argument.is_empty() {
                    format!("required variable '{name}' is not set")
                } else {
                    argument
                },
                name,
            }),
            (_, None) => Err(DsnError::EnvNotFound(name)),
        }
    }

    fn expand_simple(&self, chars: &mut Peekable<Chars<'_>>) -> DsnResult<String> {
        let mut name = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                chars.next();
            } else {
                break;
            }
        }

        self.source.get(&name).ok_or(DsnError::EnvNotFound(name))
    }
}

/// Check if a string contains environment variable references.
pub fn has_variables(input: &str) -> bool {
    input.contains('$')
}

/// Expand variables using the process environment.
pub fn expand_env(input: &str) -> DsnResult<String> {
    EnvExpander::new().expand(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_source() -> MapEnvSource {
        MapEnvSource::new()
            .set("SF_ACCOUNT", "acme")
            .set("SF_USER", "jsmith")
            .set("SF_PASSWORD", "secret")
            .set("EMPTY", "")
    }

    #[test]
    fn test_expand_simple() {
        let expander = EnvExpander::with_source(test_source());
        assert_eq!(
            expander.expand("$SF_USER:$SF_PASSWORD@$SF_ACCOUNT").unwrap(),
            "jsmith:secret@acme"
        );
    }

    #[test]
    fn test_expand_braced() {
        let expander = EnvExpander::with_source(test_source());
        assert_eq!(
            expander.expand("${SF_USER}:${SF_PASSWORD}@${SF_ACCOUNT}/db").unwrap(),
            "jsmith:secret@acme/db"
        );
    }

    #[test]
    fn test_expand_default() {
        let expander = EnvExpander::with_source(test_source());
        assert_eq!(expander.expand("${SF_ACCOUNT:-other}").unwrap(), "acme");
        assert_eq!(expander.expand("${MISSING:-other}").unwrap(), "other");
        assert_eq!(expander.expand("${EMPTY:-other}").unwrap(), "other");
    }

    #[test]
    fn test_expand_required() {
        let expander = EnvExpander::with_source(test_source());
        assert_eq!(expander.expand("${SF_ACCOUNT:?need account}").unwrap(), "acme");

        let err = expander.expand("${MISSING:?need account}").unwrap_err();
        assert!(err.to_string().contains("need account"));

        let err = expander.expand("${MISSING:?}").unwrap_err();
        assert!(err.to_string().contains("MISSING"));
    }

    #[test]
    fn test_expand_alternate() {
        let expander = EnvExpander::with_source(test_source());
        assert_eq!(expander.expand("${SF_ACCOUNT:+set}").unwrap(), "set");
        assert_eq!(expander.expand("${MISSING:+set}").unwrap(), "");
    }

    #[test]
    fn test_expand_missing() {
        let expander = EnvExpander::with_source(test_source());
        assert!(matches!(
            expander.expand("${MISSING}"),
            Err(DsnError::EnvNotFound(name)) if name == "MISSING"
        ));
        assert!(matches!(
            expander.expand("$MISSING"),
            Err(DsnError::EnvNotFound(_))
        ));
    }

    #[test]
    fn test_expand_malformed() {
        let expander = EnvExpander::with_source(test_source());
        assert!(matches!(
            expander.expand("${}"),
            Err(DsnError::InvalidEnvValue { .. })
        ));
        assert!(matches!(
            expander.expand("${SF_USER"),
            Err(DsnError::InvalidEnvValue { .. })
        ));
    }

    #[test]
    fn test_expand_empty_modifier() {
        let expander = EnvExpander::with_source(test_source());
        assert_eq!(expander.expand("${SF_USER:}@acme").unwrap(), "jsmith@acme");
        assert!(matches!(
            expander.expand("${MISSING:}"),
            Err(DsnError::EnvNotFound(name)) if name == "MISSING"
        ));
    }

    #[test]
    fn test_source_contains() {
        let source = test_source();
        assert!(source.contains("SF_USER"));
        assert!(source.contains("EMPTY"));
        assert!(!source.contains("MISSING"));
    }

    #[test]
    fn test_expand_env_process_environment() {
        assert_eq!(expand_env("u:p@acme/db").unwrap(), "u:p@acme/db");
        assert_eq!(expand_env("${SNOWFLAKE_DSN_UNSET_VAR:-acme}").unwrap(), "acme");
    }

    #[test]
    fn test_literal_dollar() {
        let expander = EnvExpander::with_source(test_source());
        assert_eq!(expander.expand("p$5@acme").unwrap(), "p$5@acme");
        assert_eq!(expander.expand("trailing$").unwrap(), "trailing$");
    }

    #[test]
    fn test_parse_template() {
        let expander = EnvExpander::with_source(test_source());
        let cfg = expander
            .parse("${SF_USER}:${SF_PASSWORD}@${SF_ACCOUNT}/sales/${SCHEMA:-reporting}")
            .unwrap();

        assert_eq!(cfg.account, "acme");
        assert_eq!(cfg.user, "jsmith");
        assert_eq!(cfg.password, "secret");
        assert_eq!(cfg.database, "sales");
        assert_eq!(cfg.schema, "reporting");
    }

    #[test]
    fn test_has_variables() {
        assert!(has_variables("${VAR}"));
        assert!(has_variables("$VAR"));
        assert!(!has_variables("u:p@acme"));
    }
}
