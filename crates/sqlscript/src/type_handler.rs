//! Name-based type handler lookup.
//!
//! A [`ParameterMapping`](crate::ParameterMapping) records which handler will
//! bind its value. Handlers are resolved by name from a `typeHandler=`
//! attribute, or by the mapping's resolved [`ValueType`] otherwise.

use crate::value::ValueType;
use std::collections::HashMap;

/// A named handler for one value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHandler {
    pub name: String,
    pub value_type: ValueType,
}

impl TypeHandler {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

const BUILTIN_HANDLERS: [(&str, ValueType); 8] = [
    ("unknown", ValueType::Any),
    ("boolean", ValueType::Boolean),
    ("integer", ValueType::Integer),
    ("float", ValueType::Float),
    ("string", ValueType::String),
    ("list", ValueType::List),
    ("map", ValueType::Map),
    ("cursor", ValueType::Cursor),
];

/// Registry of built-in and custom handlers.
#[derive(Debug, Clone)]
pub struct TypeHandlerRegistry {
    handlers: HashMap<String, TypeHandler>,
}

impl Default for TypeHandlerRegistry {
    fn default() -> Self {
        let handlers = BUILTIN_HANDLERS
            .iter()
            .map(|(name, ty)| (name.to_string(), TypeHandler::new(*name, *ty)))
            .collect();
        Self { handlers }
    }
}

impl TypeHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a handler under `name`.
    pub fn register(&mut self, name: impl Into<String>, value_type: ValueType) -> &mut Self {
        let name = name.into();
        self.handlers
            .insert(name.clone(), TypeHandler::new(name, value_type));
        self
    }

    /// Look up a handler by name.
    pub fn resolve(&self, name: &str) -> Option<&TypeHandler> {
        self.handlers.get(name.trim())
    }

    /// The built-in handler for `value_type`.
    pub fn default_for(&self, value_type: ValueType) -> TypeHandler {
        let name = BUILTIN_HANDLERS
            .iter()
            .find(|(_, ty)| *ty == value_type)
            .map_or("unknown", |(name, _)| *name);
        self.handlers
            .get(name)
            .cloned()
            .unwrap_or_else(|| TypeHandler::new(name, value_type))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_handlers_cover_every_type() {
        let registry = TypeHandlerRegistry::new();
        assert_eq!(registry.default_for(ValueType::Integer).name, "integer");
        assert_eq!(registry.default_for(ValueType::Any).name, "unknown");
        assert_eq!(registry.default_for(ValueType::Cursor).value_type, ValueType::Cursor);
    }

    #[test]
    fn custom_handlers_resolve_by_name() {
        let mut registry = TypeHandlerRegistry::new();
        registry.register("money", ValueType::Float);
        assert_eq!(
            registry.resolve(" money "),
            Some(&TypeHandler::new("money", ValueType::Float))
        );
        assert!(registry.resolve("nope").is_none());
        assert!(registry.contains("string"));
    }
}
