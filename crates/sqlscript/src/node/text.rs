use crate::context::DynamicContext;
use crate::error::{ScriptError, ScriptResult};
use crate::parsing::SCRIPT_TOKENS;
use crate::value::to_sql_text;
use regex::Regex;

/// Text containing `${...}` substitutions.
#[derive(Debug, Clone)]
pub struct TextNode {
    text: String,
    injection_filter: Option<Regex>,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            injection_filter: None,
        }
    }

    /// Every substituted value must fully match `filter`.
    pub fn with_injection_filter(mut self, filter: Option<Regex>) -> Self {
        self.injection_filter = filter;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn apply(&self, ctx: &mut dyn DynamicContext) -> ScriptResult<bool> {
        let sql = SCRIPT_TOKENS.scan(&self.text, &mut |content: &str| -> ScriptResult<String> {
            let value = ctx.evaluator().evaluate(content, ctx.bindings())?;
            let text = to_sql_text(&value);
            self.check_injection(&text)?;
            Ok(text)
        })?;
        ctx.append_sql(&sql);
        Ok(true)
    }

    fn check_injection(&self, text: &str) -> ScriptResult<()> {
        let Some(filter) = &self.injection_filter else {
            return Ok(());
        };
        if filter.is_match(text) {
            return Ok(());
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(
            target: "sqlscript.sql",
            value = %text,
            pattern = %filter.as_str(),
            "rejected ${{}} substitution"
        );
        Err(ScriptError::InjectionRejected {
            value: text.to_string(),
            pattern: filter.as_str().to_string(),
        })
    }
}
