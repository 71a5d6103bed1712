use serde_json::Value;
use std::collections::HashMap;

/// Name under which the root parameter object is bound.
pub const PARAMETER_OBJECT_KEY: &str = "_parameter";

/// Name under which the configured database id is bound.
pub const DATABASE_ID_KEY: &str = "_databaseId";

/// Alias for a scalar (or null) root parameter, used by `${value}`.
pub const SCALAR_ALIAS_KEY: &str = "value";

/// Name-to-value bindings visible to expressions during one render.
///
/// Lookups that miss the explicit entries fall through to the root parameter:
/// a JSON object answers with its field, a scalar answers with itself (so
/// `#{id}` and `test="id != null"` work against a bare `42`).
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: HashMap<String, Value>,
    parameter: Value,
}

impl Bindings {
    /// Create bindings backed by `parameter`.
    pub fn new(parameter: Value) -> Self {
        Self {
            entries: HashMap::new(),
            parameter,
        }
    }

    /// The root parameter object.
    pub fn parameter(&self) -> &Value {
        &self.parameter
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        if let Some(v) = self.entries.get(name) {
            return Some(v);
        }
        match &self.parameter {
            Value::Object(map) => map.get(name),
            Value::Null | Value::Array(_) => None,
            scalar => Some(scalar),
        }
    }

    /// Explicit entry only, without parameter fall-through.
    pub fn bound(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Whether `name` is bound explicitly (not via parameter fall-through).
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.remove(name)
    }

    /// Explicit entries only.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> HashMap<String, Value> {
        self.entries
    }
}
