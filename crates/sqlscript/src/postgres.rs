//! `tokio-postgres` parameters for a rendered statement.
//!
//! Enabled with the `postgres` feature. Pair it with
//! [`PlaceholderStyle::Dollar`](crate::PlaceholderStyle::Dollar) so the SQL
//! carries `$n` markers:
//!
//! ```ignore
//! let bound = source.bound_sql(json!({"id": 7}))?;
//! let params = bound.pg_params()?;
//! let rows = client.query(bound.sql(), &params.as_refs()).await?;
//! ```

use crate::error::{ScriptError, ScriptResult};
use crate::source::{BoundSql, JdbcType, ParameterMapping};
use crate::value::ValueType;
use bytes::BytesMut;
use serde_json::Value;
use std::error::Error;
use std::sync::Arc;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A clone-friendly parameter value.
#[derive(Clone)]
pub struct Param(Arc<dyn ToSql + Send + Sync>);

impl Param {
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Param(Arc::new(value))
    }

    /// Borrow as the trait object `tokio-postgres` expects.
    pub fn as_ref(&self) -> &(dyn ToSql + Sync) {
        &*self.0 as &(dyn ToSql + Sync)
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Param").field(&self.0).finish()
    }
}

/// Parameters in marker order.
#[derive(Clone, Debug, Default)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter and return its 1-based index.
    pub fn push_param(&mut self, param: Param) -> usize {
        self.params.push(param);
        self.params.len()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(Param::as_ref).collect()
    }
}

/// SQL `NULL` for a parameter of any type.
#[derive(Debug, Clone, Copy)]
struct SqlNull;

impl ToSql for SqlNull {
    fn to_sql(
        &self,
        _ty: &Type,
        _out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        Ok(IsNull::Yes)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

impl BoundSql {
    /// Convert [`parameter_values`](BoundSql::parameter_values) into
    /// `tokio-postgres` parameters.
    ///
    /// Scalars are sent as native Postgres types (narrowed by `jdbcType` for
    /// `SMALLINT`, `INTEGER` and `REAL`), arrays and objects as `json`/`jsonb`,
    /// and nulls as an untyped `NULL`.
    pub fn pg_params(&self) -> ScriptResult<ParamList> {
        let values = self.parameter_values()?;
        let mut params = ParamList::new();
        for (mapping, value) in self.parameter_mappings().iter().zip(values) {
            params.push_param(to_param(mapping, value)?);
        }
        Ok(params)
    }
}

fn to_param(mapping: &ParameterMapping, value: Value) -> ScriptResult<Param> {
    let declared = mapping.value_type;
    let actual = ValueType::of(&value);
    let mismatch = || {
        ScriptError::evaluation(
            mapping.property.as_str(),
            format!("expected a {declared} parameter value, got {actual}"),
        )
    };
    let out_of_range = |target: &str| {
        ScriptError::evaluation(
            mapping.property.as_str(),
            format!("value does not fit the {target} parameter type"),
        )
    };

    if declared.is_scalar() && !value.is_null() && declared != actual {
        // Integers are valid float parameters.
        if !(declared == ValueType::Float && actual == ValueType::Integer) {
            return Err(mismatch());
        }
    }

    let param = match value {
        Value::Null => Param::new(SqlNull),
        Value::Bool(b) => Param::new(b),
        Value::String(s) => Param::new(s),
        Value::Number(n) if declared == ValueType::Float || n.as_i64().is_none() => {
            let f = n.as_f64().ok_or_else(|| out_of_range("float"))?;
            match mapping.jdbc_type {
                Some(JdbcType::Real) => Param::new(f as f32),
                _ => Param::new(f),
            }
        }
        Value::Number(n) => {
            let i = n.as_i64().ok_or_else(|| out_of_range("integer"))?;
            match mapping.jdbc_type {
                Some(JdbcType::TinyInt | JdbcType::SmallInt) => {
                    Param::new(i16::try_from(i).map_err(|_| out_of_range("SMALLINT"))?)
                }
                Some(JdbcType::Integer) => {
                    Param::new(i32::try_from(i).map_err(|_| out_of_range("INTEGER"))?)
                }
                _ => Param::new(i),
            }
        }
        json @ (Value::Array(_) | Value::Object(_)) => Param::new(json),
    };
    Ok(param)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScriptEngine;
    use serde_json::json;

    fn params(sql: &str, parameter: Value) -> ScriptResult<ParamList> {
        ScriptEngine::default()
            .compile_text(sql)?
            .bound_sql(parameter)?
            .pg_params()
    }

    fn encodes_as(param: &(dyn ToSql + Sync), ty: &Type) -> bool {
        let mut buf = BytesMut::new();
        param.to_sql_checked(ty, &mut buf).is_ok()
    }

    #[test]
    fn scalars_use_native_types() {
        let p = params(
            "SELECT #{id}, #{name}, #{active}, #{score}, #{small, jdbcType=SMALLINT}",
            json!({"id": 7, "name": "n", "active": true, "score": 1.5, "small": 3}),
        )
        .unwrap();
        let refs = p.as_refs();
        assert_eq!(refs.len(), 5);
        assert!(encodes_as(refs[0], &Type::INT8));
        assert!(!encodes_as(refs[0], &Type::INT4));
        assert!(encodes_as(refs[1], &Type::TEXT));
        assert!(encodes_as(refs[2], &Type::BOOL));
        assert!(encodes_as(refs[3], &Type::FLOAT8));
        assert!(encodes_as(refs[4], &Type::INT2));
    }

    #[test]
    fn nulls_bind_to_any_type() {
        let p = params("SELECT #{missing}", json!({})).unwrap();
        let refs = p.as_refs();
        assert!(encodes_as(refs[0], &Type::INT4));
        assert!(encodes_as(refs[0], &Type::TIMESTAMPTZ));
    }

    #[test]
    fn arrays_and_objects_are_json() {
        let p = params("SELECT #{tags}", json!({"tags": ["a"]})).unwrap();
        assert!(encodes_as(p.as_refs()[0], &Type::JSONB));
    }

    #[test]
    fn declared_type_mismatch_is_an_error() {
        let err = params("SELECT #{id, javaType=int}", json!({"id": "seven"})).unwrap_err();
        assert!(err.is_evaluation());

        let err = params("SELECT #{n, jdbcType=SMALLINT}", json!({"n": 100000})).unwrap_err();
        assert!(err.to_string().contains("SMALLINT"));
    }
}
