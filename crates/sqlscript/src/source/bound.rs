use super::mapping::ParameterMapping;
use crate::accessor::{PropertyAccessor, split_root};
use crate::error::ScriptResult;
use crate::kind::StatementKind;
use crate::value::ValueType;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Final SQL plus everything needed to bind its positional parameters.
#[derive(Clone)]
pub struct BoundSql {
    sql: String,
    parameter_mappings: Vec<ParameterMapping>,
    parameter_object: Value,
    additional_parameters: HashMap<String, Value>,
    accessor: Arc<dyn PropertyAccessor>,
}

impl fmt::Debug for BoundSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundSql")
            .field("sql", &self.sql)
            .field("parameter_mappings", &self.parameter_mappings)
            .field("parameter_object", &self.parameter_object)
            .field("additional_parameters", &self.additional_parameters)
            .finish_non_exhaustive()
    }
}

impl BoundSql {
    pub(crate) fn new(
        sql: String,
        parameter_mappings: Vec<ParameterMapping>,
        parameter_object: Value,
        additional_parameters: HashMap<String, Value>,
        accessor: Arc<dyn PropertyAccessor>,
    ) -> Self {
        Self {
            sql,
            parameter_mappings,
            parameter_object,
            additional_parameters,
            accessor,
        }
    }

    /// SQL with positional markers.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// One mapping per marker, in marker order.
    pub fn parameter_mappings(&self) -> &[ParameterMapping] {
        &self.parameter_mappings
    }

    pub fn parameter_object(&self) -> &Value {
        &self.parameter_object
    }

    /// Bindings left over from rendering (`foreach` variables, `bind` results,
    /// `_parameter`, ...).
    pub fn additional_parameters(&self) -> &HashMap<String, Value> {
        &self.additional_parameters
    }

    /// Whether the root segment of `path` is an additional parameter.
    pub fn has_additional_parameter(&self, path: &str) -> bool {
        self.additional_parameters.contains_key(split_root(path).0)
    }

    /// Resolve `path` against the additional parameters.
    pub fn additional_parameter(&self, path: &str) -> ScriptResult<Option<&Value>> {
        let (root, rest) = split_root(path);
        let Some(value) = self.additional_parameters.get(root) else {
            return Ok(None);
        };
        match rest {
            None => Ok(Some(value)),
            Some(rest) => self.accessor.get(value, rest),
        }
    }

    pub fn set_additional_parameter(&mut self, name: impl Into<String>, value: Value) {
        self.additional_parameters.insert(name.into(), value);
    }

    /// Extract the value for every marker, in order.
    ///
    /// Each property is looked up in the additional parameters first; a null
    /// parameter object yields nulls, and a scalar parameter object is the
    /// value of every placeholder. `OUT` parameters yield null.
    pub fn parameter_values(&self) -> ScriptResult<Vec<Value>> {
        self.parameter_mappings
            .iter()
            .map(|mapping| self.value_for(mapping))
            .collect()
    }

    fn value_for(&self, mapping: &ParameterMapping) -> ScriptResult<Value> {
        if !mapping.mode.is_input() {
            return Ok(Value::Null);
        }
        let property = mapping.property.as_str();
        let value = if self.has_additional_parameter(property) {
            self.additional_parameter(property)?.cloned()
        } else if self.parameter_object.is_null() {
            None
        } else if ValueType::of(&self.parameter_object).is_scalar() {
            Some(self.parameter_object.clone())
        } else {
            self.accessor.get(&self.parameter_object, property)?.cloned()
        };
        Ok(value.unwrap_or(Value::Null))
    }

    /// Classify the statement by its leading keyword.
    pub fn statement_kind(&self) -> StatementKind {
        StatementKind::from_sql(&self.sql)
    }
}
