//! Compiler configuration.
//!
//! [`ScriptConfig`] can be built in code with the `with_*` methods or loaded
//! from a TOML file:
//!
//! ```toml
//! shrink_whitespaces_in_sql = true
//! nullable_on_foreach = false
//! injection_filter = "[A-Za-z0-9_ ,.]*"
//! placeholder_style = "dollar"
//! database_id = "postgres"
//! ```

use crate::error::{ScriptError, ScriptResult};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// Positional marker emitted for every `#{...}` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// JDBC/ODBC style `?`.
    #[default]
    Question,
    /// Postgres style `$1, $2, ...`.
    Dollar,
}

impl PlaceholderStyle {
    /// Render the marker for the `index`-th placeholder (1-based).
    pub fn marker(self, index: usize) -> String {
        match self {
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::Dollar => format!("${index}"),
        }
    }
}

/// Configuration for template compilation and rendering.
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// Collapse runs of whitespace in the rendered SQL (outside `#{}` bodies).
    pub shrink_whitespaces_in_sql: bool,
    /// Treat a null `foreach` collection as empty instead of failing.
    pub nullable_on_foreach: bool,
    /// Allow-list every `${}` substitution must fully match.
    pub injection_filter: Option<Regex>,
    /// Marker style for bound parameters.
    pub placeholder_style: PlaceholderStyle,
    /// Exposed to templates as `_databaseId`.
    pub database_id: Option<String>,
    /// Capacity of the parsed-expression cache. `0` disables caching.
    pub expression_cache_capacity: usize,
    /// Truncate SQL in log events (in bytes). `None` means no truncation.
    pub log_sql_max_length: Option<usize>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            shrink_whitespaces_in_sql: false,
            nullable_on_foreach: false,
            injection_filter: None,
            placeholder_style: PlaceholderStyle::Question,
            database_id: None,
            expression_cache_capacity: 256,
            log_sql_max_length: Some(200),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    shrink_whitespaces_in_sql: bool,
    #[serde(default)]
    nullable_on_foreach: bool,
    injection_filter: Option<String>,
    #[serde(default)]
    placeholder_style: PlaceholderStyle,
    database_id: Option<String>,
    expression_cache_capacity: Option<usize>,
    log_sql_max_length: Option<usize>,
}

impl ScriptConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> ScriptResult<Self> {
        let file: ConfigFile = toml::from_str(raw)?;
        let defaults = Self::default();

        let mut config = Self {
            shrink_whitespaces_in_sql: file.shrink_whitespaces_in_sql,
            nullable_on_foreach: file.nullable_on_foreach,
            injection_filter: None,
            placeholder_style: file.placeholder_style,
            database_id: file.database_id,
            expression_cache_capacity: file
                .expression_cache_capacity
                .unwrap_or(defaults.expression_cache_capacity),
            log_sql_max_length: file.log_sql_max_length.or(defaults.log_sql_max_length),
        };
        if let Some(pattern) = file.injection_filter {
            config = config.with_injection_filter(&pattern)?;
        }
        Ok(config)
    }

    /// Load a configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> ScriptResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ScriptError::config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw).map_err(|e| {
            ScriptError::config(format!(
                "failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Collapse whitespace in the rendered SQL.
    pub fn with_shrink_whitespaces(mut self, enabled: bool) -> Self {
        self.shrink_whitespaces_in_sql = enabled;
        self
    }

    /// Treat null `foreach` collections as empty.
    pub fn with_nullable_on_foreach(mut self, enabled: bool) -> Self {
        self.nullable_on_foreach = enabled;
        self
    }

    /// Require every `${}` substitution to fully match `pattern`.
    ///
    /// The pattern is anchored on both ends, so `[a-z_]+` rejects `users; drop`.
    pub fn with_injection_filter(mut self, pattern: &str) -> ScriptResult<Self> {
        self.injection_filter = Some(Regex::new(&format!("^(?:{pattern})$"))?);
        Ok(self)
    }

    /// Set the positional marker style.
    pub fn with_placeholder_style(mut self, style: PlaceholderStyle) -> Self {
        self.placeholder_style = style;
        self
    }

    /// Set the database id exposed as `_databaseId`.
    pub fn with_database_id(mut self, id: impl Into<String>) -> Self {
        self.database_id = Some(id.into());
        self
    }

    /// Set the parsed-expression cache capacity.
    pub fn with_expression_cache_capacity(mut self, capacity: usize) -> Self {
        self.expression_cache_capacity = capacity;
        self
    }

    /// Set maximum SQL length in log events.
    pub fn with_log_sql_max_length(mut self, len: usize) -> Self {
        self.log_sql_max_length = Some(len);
        self
    }

    /// Disable SQL truncation in log events.
    pub fn no_log_truncate(mut self) -> Self {
        self.log_sql_max_length = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ScriptConfig::new();
        assert!(!config.shrink_whitespaces_in_sql);
        assert!(!config.nullable_on_foreach);
        assert!(config.injection_filter.is_none());
        assert_eq!(config.placeholder_style, PlaceholderStyle::Question);
        assert_eq!(config.expression_cache_capacity, 256);
    }

    #[test]
    fn parses_toml() {
        let config = ScriptConfig::from_toml_str(
            r#"
            shrink_whitespaces_in_sql = true
            nullable_on_foreach = true
            injection_filter = "[a-z_]+"
            placeholder_style = "dollar"
            database_id = "postgres"
            expression_cache_capacity = 16
            "#,
        )
        .unwrap();

        assert!(config.shrink_whitespaces_in_sql);
        assert!(config.nullable_on_foreach);
        assert_eq!(config.placeholder_style, PlaceholderStyle::Dollar);
        assert_eq!(config.database_id.as_deref(), Some("postgres"));
        assert_eq!(config.expression_cache_capacity, 16);
        assert_eq!(config.log_sql_max_length, Some(200));

        let filter = config.injection_filter.unwrap();
        assert!(filter.is_match("user_name"));
        assert!(!filter.is_match("user_name; drop table users"));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_patterns() {
        assert!(ScriptConfig::from_toml_str("shrink = true").is_err());
        let err = ScriptConfig::from_toml_str("injection_filter = \"[\"").unwrap_err();
        assert!(matches!(err, ScriptError::Config(_)));
    }

    #[test]
    fn marker_styles() {
        assert_eq!(PlaceholderStyle::Question.marker(3), "?");
        assert_eq!(PlaceholderStyle::Dollar.marker(3), "$3");
    }
}
