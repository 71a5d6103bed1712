//! Expression evaluation for `test=`, `collection=`, `value=` and `${}`.
//!
//! The expression language is a small OGNL-like dialect:
//!
//! - literals: `null`, `true`, `false`, integers, floats, `'strings'` / `"strings"`
//! - property access: `user.name`, `ids[0]`, `map['key']`
//! - method calls: `name.trim()`, `list.size()`, `tags.contains('x')`
//! - operators: `== != < <= > >= + - * / % ! && ||` and their word forms
//!   (`eq neq lt lte gt gte and or not`)
//! - list literals: `{1, 2, 3}`
//!
//! [`ExpressionEvaluator`] is the seam: plug in another implementation through
//! [`crate::ScriptEngine::with_evaluator`].

mod cache;
mod eval;
mod lexer;
mod parser;

#[cfg(test)]
mod tests;

use crate::context::Bindings;
use crate::error::{ScriptError, ScriptResult};
use cache::ExpressionCache;
use eval::Evaluator;
use serde_json::Value;
use std::sync::Arc;

pub use eval::is_truthy;

/// One iteration of a `foreach` loop.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopElement {
    /// Position for lists, key for maps.
    pub index: Value,
    pub item: Value,
}

/// Evaluates template expressions against the current bindings.
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluate `expression` to a value.
    fn evaluate(&self, expression: &str, bindings: &Bindings) -> ScriptResult<Value>;

    /// Evaluate and coerce with [`is_truthy`].
    fn evaluate_boolean(&self, expression: &str, bindings: &Bindings) -> ScriptResult<bool> {
        Ok(is_truthy(&self.evaluate(expression, bindings)?))
    }

    /// Evaluate to a sequence of loop elements.
    ///
    /// Lists yield `(position, item)`, maps yield `(key, value)` in key order.
    /// A `null` result is empty when `nullable` is set and an error otherwise.
    fn evaluate_iterable(
        &self,
        expression: &str,
        bindings: &Bindings,
        nullable: bool,
    ) -> ScriptResult<Vec<LoopElement>> {
        match self.evaluate(expression, bindings)? {
            Value::Array(items) => Ok(items
                .into_iter()
                .enumerate()
                .map(|(i, item)| LoopElement {
                    index: Value::from(i),
                    item,
                })
                .collect()),
            Value::Object(map) => Ok(map
                .into_iter()
                .map(|(key, item)| LoopElement {
                    index: Value::String(key),
                    item,
                })
                .collect()),
            Value::Null if nullable => Ok(Vec::new()),
            Value::Null => Err(ScriptError::evaluation(
                expression,
                "the expression evaluated to a null value",
            )),
            other => Err(ScriptError::evaluation(
                expression,
                format!("return value ({other}) was not iterable"),
            )),
        }
    }
}

/// The built-in evaluator, with an LRU cache of parsed expressions.
#[derive(Debug)]
pub struct DefaultEvaluator {
    cache: ExpressionCache,
}

impl Default for DefaultEvaluator {
    fn default() -> Self {
        Self::with_cache_capacity(256)
    }
}

impl DefaultEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `0` disables caching.
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            cache: ExpressionCache::new(capacity),
        }
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Number of parsed expressions currently cached.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Check that `expression` parses, without evaluating it.
    pub fn validate(&self, expression: &str) -> ScriptResult<()> {
        self.parsed(expression).map(|_| ())
    }

    fn parsed(&self, expression: &str) -> ScriptResult<Arc<parser::Expr>> {
        if let Some(expr) = self.cache.get(expression) {
            return Ok(expr);
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "sqlscript.sql", expression, "parsing expression");
        let expr = Arc::new(parser::parse(expression)?);
        Ok(self.cache.insert_if_absent(expression, expr))
    }
}

impl ExpressionEvaluator for DefaultEvaluator {
    fn evaluate(&self, expression: &str, bindings: &Bindings) -> ScriptResult<Value> {
        let expr = self.parsed(expression)?;
        Evaluator {
            source: expression,
            bindings,
        }
        .eval(&expr)
    }
}
