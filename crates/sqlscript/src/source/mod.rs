//! Compiled statements and the placeholder pass.
//!
//! A [`SqlSource`] turns a parameter object into a [`BoundSql`]:
//!
//! - [`SqlSource::Dynamic`] renders its node tree on every call, then runs
//!   the placeholder pass over the result.
//! - [`SqlSource::Raw`] came from a template with no dynamic parts; the
//!   placeholder pass ran once when it was built.
//! - [`SqlSource::Static`] wraps SQL and mappings supplied by the caller.

mod bound;
mod builder;
mod mapping;


pub use bound::BoundSql;
pub use builder::{CompiledSql, SqlSourceBuilder};
pub use mapping::{JdbcType, ParameterMapping, ParameterMode};

use crate::accessor::{JsonAccessor, PropertyAccessor};
use crate::context::{Bindings, RootContext};
use crate::engine::ScriptEngine;
use crate::error::ScriptResult;
use crate::node::SqlNode;
use crate::value::ValueType;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A compiled statement.
#[derive(Debug, Clone)]
pub enum SqlSource {
    Dynamic(DynamicSqlSource),
    Raw(RawSqlSource),
    Static(StaticSqlSource),
}

impl SqlSource {
    /// Render for `parameter`.
    pub fn bound_sql(&self, parameter: Value) -> ScriptResult<BoundSql> {
        match self {
            SqlSource::Dynamic(source) => source.bound_sql(parameter),
            SqlSource::Raw(source) => Ok(source.bound_sql(parameter)),
            SqlSource::Static(source) => Ok(source.bound_sql(parameter)),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, SqlSource::Dynamic(_))
    }
}

/// Renders a node tree per call.
#[derive(Debug, Clone)]
pub struct DynamicSqlSource {
    engine: ScriptEngine,
    root: SqlNode,
    id: Option<String>,
}

impl DynamicSqlSource {
    pub fn new(engine: ScriptEngine, root: SqlNode) -> Self {
        Self {
            engine,
            root,
            id: None,
        }
    }

    /// Statement id reported in log events.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn root(&self) -> &SqlNode {
        &self.root
    }

    pub fn bound_sql(&self, parameter: Value) -> ScriptResult<BoundSql> {
        let engine = &self.engine;
        let config = engine.config();

        let mut ctx = RootContext::new(
            parameter.clone(),
            config.database_id.as_deref(),
            engine.evaluator(),
        );
        self.root.apply(&mut ctx)?;
        let (sql, bindings) = ctx.into_parts();

        let compiled = engine.source_builder().parse(
            &sql,
            ValueType::of(&parameter),
            &parameter,
            &bindings,
        )?;
        let bound = BoundSql::new(
            compiled.sql,
            compiled.parameter_mappings,
            parameter,
            bindings.into_entries(),
            engine.accessor_handle(),
        );

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sqlscript.sql",
            statement = self.id.as_deref().unwrap_or("-"),
            kind = %bound.statement_kind(),
            param_count = bound.parameter_mappings().len(),
            sql = %log_sql(bound.sql(), config.log_sql_max_length),
            "rendered dynamic sql"
        );
        Ok(bound)
    }
}

/// A template without dynamic parts, compiled once.
#[derive(Debug, Clone)]
pub struct RawSqlSource {
    inner: StaticSqlSource,
}

impl RawSqlSource {
    /// Run the placeholder pass over `root` now.
    ///
    /// `parameter_type` is the declared parameter type, if any; without a
    /// parameter to inspect, path-based types resolve to [`ValueType::Any`].
    pub fn new(engine: &ScriptEngine, root: &SqlNode, parameter_type: ValueType) -> ScriptResult<Self> {
        let mut ctx = RootContext::new(Value::Null, None, engine.evaluator());
        root.apply(&mut ctx)?;
        let (sql, _) = ctx.into_parts();

        let compiled =
            engine
                .source_builder()
                .parse(&sql, parameter_type, &Value::Null, &Bindings::default())?;
        Ok(Self {
            inner: StaticSqlSource::new(compiled.sql, compiled.parameter_mappings)
                .with_accessor(engine.accessor_handle()),
        })
    }

    pub fn sql(&self) -> &str {
        self.inner.sql()
    }

    pub fn bound_sql(&self, parameter: Value) -> BoundSql {
        self.inner.bound_sql(parameter)
    }
}

/// Pre-built SQL and mappings.
#[derive(Clone)]
pub struct StaticSqlSource {
    sql: String,
    parameter_mappings: Vec<ParameterMapping>,
    accessor: Arc<dyn PropertyAccessor>,
}

impl fmt::Debug for StaticSqlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSqlSource")
            .field("sql", &self.sql)
            .field("parameter_mappings", &self.parameter_mappings)
            .finish_non_exhaustive()
    }
}

impl StaticSqlSource {
    pub fn new(sql: impl Into<String>, parameter_mappings: Vec<ParameterMapping>) -> Self {
        Self {
            sql: sql.into(),
            parameter_mappings,
            accessor: Arc::new(JsonAccessor),
        }
    }

    pub fn with_accessor(mut self, accessor: Arc<dyn PropertyAccessor>) -> Self {
        self.accessor = accessor;
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameter_mappings(&self) -> &[ParameterMapping] {
        &self.parameter_mappings
    }

    pub fn bound_sql(&self, parameter: Value) -> BoundSql {
        BoundSql::new(
            self.sql.clone(),
            self.parameter_mappings.clone(),
            parameter,
            HashMap::new(),
            Arc::clone(&self.accessor),
        )
    }
}

#[cfg(feature = "tracing")]
fn log_sql(sql: &str, max_bytes: Option<usize>) -> std::borrow::Cow<'_, str> {
    match max_bytes {
        Some(max) if sql.len() > max => {
            let mut end = max;
            while end > 0 && !sql.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &sql[..end]).into()
        }
        _ => sql.into(),
    }
}
