//! Per-render evaluation environment.
//!
//! A render starts from a [`RootContext`] that owns the SQL buffer and the
//! [`Bindings`]. Control nodes wrap it in short-lived decorators:
//!
//! - [`PrefixedContext`]: writes a separator before the first real content
//! - [`RenamingContext`]: rewrites `foreach` variables inside `#{...}`
//! - [`TrimmedContext`]: buffers a body so a trim rule can run over it once

mod bindings;
mod prefixed;
mod renaming;
mod trimmed;

#[cfg(test)]
mod tests;

pub use bindings::{Bindings, DATABASE_ID_KEY, PARAMETER_OBJECT_KEY, SCALAR_ALIAS_KEY};
pub use prefixed::PrefixedContext;
pub use renaming::{RenamingContext, itemized_name};
pub use trimmed::TrimmedContext;

use crate::expr::ExpressionEvaluator;
use serde_json::Value;

/// The environment a [`crate::SqlNode`] renders into.
pub trait DynamicContext {
    /// Add a rendered chunk, spaced from what precedes it where needed.
    fn append_sql(&mut self, sql: &str);

    /// SQL accumulated so far.
    fn sql(&self) -> String;

    fn bindings(&self) -> &Bindings;

    fn bindings_mut(&mut self) -> &mut Bindings;

    fn bind(&mut self, name: &str, value: Value) {
        self.bindings_mut().insert(name, value);
    }

    /// Strictly increasing across the whole render.
    fn next_unique_id(&mut self) -> usize;

    fn evaluator(&self) -> &dyn ExpressionEvaluator;
}

/// The context a render starts from.
pub struct RootContext<'e> {
    sql: String,
    bindings: Bindings,
    unique_id: usize,
    evaluator: &'e dyn ExpressionEvaluator,
}

impl<'e> RootContext<'e> {
    /// Seed a context from the root parameter.
    ///
    /// Binds `_parameter` and `_databaseId`; a null or scalar parameter is
    /// also bound as `value`.
    pub fn new(
        parameter: Value,
        database_id: Option<&str>,
        evaluator: &'e dyn ExpressionEvaluator,
    ) -> Self {
        let mut bindings = Bindings::new(parameter.clone());
        if !matches!(parameter, Value::Array(_) | Value::Object(_)) {
            bindings.insert(SCALAR_ALIAS_KEY, parameter.clone());
        }
        bindings.insert(PARAMETER_OBJECT_KEY, parameter);
        bindings.insert(
            DATABASE_ID_KEY,
            database_id.map_or(Value::Null, |id| Value::String(id.to_string())),
        );

        Self {
            sql: String::new(),
            bindings,
            unique_id: 0,
            evaluator,
        }
    }

    /// Consume the context, returning the trimmed SQL and the final bindings.
    pub fn into_parts(self) -> (String, Bindings) {
        (self.sql.trim().to_string(), self.bindings)
    }
}

impl DynamicContext for RootContext<'_> {
    fn append_sql(&mut self, sql: &str) {
        join_sql(&mut self.sql, sql);
    }

    fn sql(&self) -> String {
        self.sql.trim().to_string()
    }

    fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    fn bindings_mut(&mut self) -> &mut Bindings {
        &mut self.bindings
    }

    fn next_unique_id(&mut self) -> usize {
        let id = self.unique_id;
        self.unique_id += 1;
        id
    }

    fn evaluator(&self) -> &dyn ExpressionEvaluator {
        self.evaluator
    }
}

/// Append `chunk` to `buf`, separated by a single space.
///
/// No space is added when either side already has whitespace at the seam,
/// after an opening parenthesis, or before `)`, `,` or `;`.
/// Empty chunks are skipped.
pub(crate) fn join_sql(buf: &mut String, chunk: &str) {
    let Some(first) = chunk.chars().next() else {
        return;
    };
    let glued = match buf.chars().next_back() {
        None => true,
        Some(last) => {
            last.is_whitespace()
                || last == '('
                || first.is_whitespace()
                || matches!(first, ')' | ',' | ';')
        }
    };
    if !glued {
        buf.push(' ');
    }
    buf.push_str(chunk);
}

/// Forward every [`DynamicContext`] method except `append_sql` to `self.delegate`.
macro_rules! delegate_context {
    () => {
        fn sql(&self) -> String {
            self.delegate.sql()
        }

        fn bindings(&self) -> &$crate::context::Bindings {
            self.delegate.bindings()
        }

        fn bindings_mut(&mut self) -> &mut $crate::context::Bindings {
            self.delegate.bindings_mut()
        }

        fn next_unique_id(&mut self) -> usize {
            self.delegate.next_unique_id()
        }

        fn evaluator(&self) -> &dyn $crate::expr::ExpressionEvaluator {
            self.delegate.evaluator()
        }
    };
}

pub(crate) use delegate_context;
