//! Error types for sqlscript

use thiserror::Error;

/// Result type alias for sqlscript operations
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors raised while building or rendering a SQL template.
///
/// An unterminated `#{` / `${` token is *not* an error: it degrades to literal
/// text. Every other failure aborts the current render with no partial output.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Malformed placeholder body (unknown attribute, missing `=`, bad jdbcType).
    #[error("Template syntax error in {{{fragment}}} at position {position}: {message}")]
    TemplateSyntax {
        fragment: String,
        position: usize,
        message: String,
    },

    /// A construct the compiler recognises but does not implement.
    #[error("Unsupported construct in {{{fragment}}}: {message}")]
    Unsupported { fragment: String, message: String },

    /// Expression evaluation failed (bad syntax, unbound name, non-iterable collection).
    #[error("Error evaluating expression '{expression}': {message}")]
    Evaluation { expression: String, message: String },

    /// A `${}` substitution did not match the configured allow-list.
    #[error("Invalid input '{value}'. Please conform to regex {pattern}")]
    InjectionRejected { value: String, pattern: String },

    /// The template tree could not be compiled.
    #[error("Build error: {0}")]
    Build(String),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(String),
}

impl ScriptError {
    /// Create a template syntax error for a placeholder body.
    pub fn syntax(
        fragment: impl Into<String>,
        position: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::TemplateSyntax {
            fragment: fragment.into(),
            position,
            message: message.into(),
        }
    }

    /// Create an unsupported-construct error.
    pub fn unsupported(fragment: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unsupported {
            fragment: fragment.into(),
            message: message.into(),
        }
    }

    /// Create an evaluation error for an expression.
    pub fn evaluation(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Evaluation {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Create a build error
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a template syntax error
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::TemplateSyntax { .. })
    }

    /// Check if this is an unsupported-construct error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Check if this is an evaluation error
    pub fn is_evaluation(&self) -> bool {
        matches!(self, Self::Evaluation { .. })
    }

    /// Check if this is an injection rejection
    pub fn is_injection_rejected(&self) -> bool {
        matches!(self, Self::InjectionRejected { .. })
    }

    /// Check if this is a template build error
    pub fn is_build(&self) -> bool {
        matches!(self, Self::Build(_))
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<toml::de::Error> for ScriptError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<regex::Error> for ScriptError {
    fn from(err: regex::Error) -> Self {
        Self::Config(err.to_string())
    }
}
