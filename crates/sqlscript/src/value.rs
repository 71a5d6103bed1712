//! Runtime values and their resolved parameter types.

use serde_json::Value;
use std::fmt;

/// The resolved type of a bound parameter.
///
/// Values are `serde_json::Value`s, so the type is derived from the runtime
/// value kind, from a declared `javaType=` alias, or falls back to [`ValueType::Any`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Unknown or heterogeneous; bound as-is.
    Any,
    Boolean,
    Integer,
    Float,
    String,
    List,
    Map,
    /// Database cursor (OUT parameters of stored procedures).
    Cursor,
}

impl ValueType {
    /// Describe a runtime value. `null` carries no type information.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueType::Any,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => ValueType::Integer,
            Value::Number(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::List,
            Value::Object(_) => ValueType::Map,
        }
    }

    /// Scalar types have a direct type handler: a scalar parameter object is
    /// itself the value of every placeholder.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            ValueType::Boolean | ValueType::Integer | ValueType::Float | ValueType::String
        )
    }

    /// Resolve a `javaType=` alias.
    ///
    /// Accepts short aliases (`int`, `string`, `map`, ...) as well as the fully
    /// qualified names that existing templates commonly carry.
    pub fn from_alias(alias: &str) -> Option<Self> {
        let alias = alias.trim();
        let short = alias.rsplit('.').next().unwrap_or(alias);
        let ty = match short.to_ascii_lowercase().as_str() {
            "object" | "any" => ValueType::Any,
            "boolean" | "bool" | "_boolean" => ValueType::Boolean,
            "int" | "integer" | "long" | "short" | "byte" | "biginteger" | "_int" | "_long"
            | "_short" | "_byte" | "i16" | "i32" | "i64" | "u32" | "u64" => ValueType::Integer,
            "double" | "float" | "bigdecimal" | "decimal" | "_double" | "_float" | "f32"
            | "f64" => ValueType::Float,
            "string" | "char" | "character" | "str" => ValueType::String,
            "list" | "arraylist" | "collection" | "array" | "set" | "vec" => ValueType::List,
            "map" | "hashmap" | "object_map" => ValueType::Map,
            "resultset" | "cursor" => ValueType::Cursor,
            _ => return None,
        };
        Some(ty)
    }

    /// Lower-case display name.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Any => "any",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::List => "list",
            ValueType::Map => "map",
            ValueType::Cursor => "cursor",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stringify a value for `${}` substitution. `null` renders as the empty string.
pub fn to_sql_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn describes_runtime_values() {
        assert_eq!(ValueType::of(&json!(null)), ValueType::Any);
        assert_eq!(ValueType::of(&json!(true)), ValueType::Boolean);
        assert_eq!(ValueType::of(&json!(1)), ValueType::Integer);
        assert_eq!(ValueType::of(&json!(1.5)), ValueType::Float);
        assert_eq!(ValueType::of(&json!("x")), ValueType::String);
        assert_eq!(ValueType::of(&json!([1])), ValueType::List);
        assert_eq!(ValueType::of(&json!({"a": 1})), ValueType::Map);
    }

    #[test]
    fn resolves_aliases() {
        assert_eq!(ValueType::from_alias("int"), Some(ValueType::Integer));
        assert_eq!(ValueType::from_alias("java.lang.String"), Some(ValueType::String));
        assert_eq!(ValueType::from_alias("java.util.HashMap"), Some(ValueType::Map));
        assert_eq!(ValueType::from_alias("java.sql.ResultSet"), Some(ValueType::Cursor));
        assert_eq!(ValueType::from_alias("com.example.Widget"), None);
    }

    #[test]
    fn stringifies_for_substitution() {
        assert_eq!(to_sql_text(&json!(null)), "");
        assert_eq!(to_sql_text(&json!("users")), "users");
        assert_eq!(to_sql_text(&json!(42)), "42");
        assert_eq!(to_sql_text(&json!(false)), "false");
        assert_eq!(to_sql_text(&json!([1, 2])), "[1,2]");
    }
}
