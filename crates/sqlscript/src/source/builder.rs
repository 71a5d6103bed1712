use super::mapping::{JdbcType, ParameterMapping, ParameterMode};
use crate::accessor::{PropertyAccessor, split_root};
use crate::config::ScriptConfig;
use crate::context::Bindings;
use crate::error::{ScriptError, ScriptResult};
use crate::parsing::{PARAMETER_TOKENS, PlaceholderAttributes, Segment, parse_placeholder};
use crate::type_handler::TypeHandlerRegistry;
use crate::value::ValueType;
use serde_json::Value;

const VALID_ATTRIBUTES: &str =
    "javaType, jdbcType, mode, numericScale, resultMap, typeHandler, jdbcTypeName, property";

/// SQL with every `#{...}` replaced by a positional marker.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSql {
    pub sql: String,
    pub parameter_mappings: Vec<ParameterMapping>,
}

/// The final placeholder pass: `#{...}` to markers plus [`ParameterMapping`]s.
pub struct SqlSourceBuilder<'a> {
    config: &'a ScriptConfig,
    accessor: &'a dyn PropertyAccessor,
    type_handlers: &'a TypeHandlerRegistry,
}

impl<'a> SqlSourceBuilder<'a> {
    pub fn new(
        config: &'a ScriptConfig,
        accessor: &'a dyn PropertyAccessor,
        type_handlers: &'a TypeHandlerRegistry,
    ) -> Self {
        Self {
            config,
            accessor,
            type_handlers,
        }
    }

    /// Replace placeholders in `sql`, resolving each property's type against
    /// `additional` bindings first and then against `parameter`.
    pub fn parse(
        &self,
        sql: &str,
        parameter_type: ValueType,
        parameter: &Value,
        additional: &Bindings,
    ) -> ScriptResult<CompiledSql> {
        let shrunk;
        let sql = if self.config.shrink_whitespaces_in_sql {
            shrunk = shrink_whitespace(sql);
            shrunk.as_str()
        } else {
            sql
        };

        let style = self.config.placeholder_style;
        let mut parameter_mappings = Vec::new();
        let sql = PARAMETER_TOKENS.scan(sql, &mut |body: &str| -> ScriptResult<String> {
            let mapping = self.build_mapping(body, parameter_type, parameter, additional)?;
            parameter_mappings.push(mapping);
            Ok(style.marker(parameter_mappings.len()))
        })?;

        Ok(CompiledSql {
            sql,
            parameter_mappings,
        })
    }

    fn build_mapping(
        &self,
        body: &str,
        parameter_type: ValueType,
        parameter: &Value,
        additional: &Bindings,
    ) -> ScriptResult<ParameterMapping> {
        let attrs = parse_placeholder(body)?;
        let property = attrs.property().to_string();
        let invalid = |key: &str, msg: String| {
            ScriptError::syntax(body, body.find(key).unwrap_or(0), msg)
        };

        let mut value_type =
            self.resolve_type(&property, &attrs, parameter_type, parameter, additional)?;
        let mut mapping = ParameterMapping::new(
            property,
            value_type,
            self.type_handlers.default_for(value_type),
        );
        let mut handler_name = None;

        for (key, value) in attrs.iter() {
            match key {
                "property" => {}
                "javaType" => {
                    value_type = ValueType::from_alias(value)
                        .ok_or_else(|| invalid(key, format!("unknown javaType '{value}'")))?;
                }
                "jdbcType" => {
                    mapping.jdbc_type =
                        Some(value.parse::<JdbcType>().map_err(|e| invalid(key, e))?);
                }
                "mode" => {
                    mapping.mode = value.parse::<ParameterMode>().map_err(|e| invalid(key, e))?;
                }
                "numericScale" => {
                    let scale = value.parse::<u32>().map_err(|_| {
                        invalid(key, format!("numericScale must be a non-negative integer, got '{value}'"))
                    })?;
                    mapping.numeric_scale = Some(scale);
                }
                "resultMap" => mapping.result_map = Some(value.to_string()),
                "typeHandler" => handler_name = Some(value),
                "jdbcTypeName" => mapping.jdbc_type_name = Some(value.to_string()),
                "expression" => {
                    return Err(ScriptError::unsupported(
                        body,
                        "expression based parameters are not supported",
                    ));
                }
                other => {
                    return Err(invalid(
                        other,
                        format!(
                            "invalid attribute '{other}' in mapping; valid attributes are {VALID_ATTRIBUTES}"
                        ),
                    ));
                }
            }
        }

        mapping.value_type = value_type;
        mapping.type_handler = match handler_name {
            Some(name) => self
                .type_handlers
                .resolve(name)
                .cloned()
                .ok_or_else(|| invalid("typeHandler", format!("no type handler named '{name}'")))?,
            None => self.type_handlers.default_for(value_type),
        };

        if value_type == ValueType::Cursor && mapping.result_map.is_none() {
            return Err(ScriptError::syntax(
                body,
                0,
                format!(
                    "missing resultMap for property '{}'; cursor parameters require a resultMap",
                    mapping.property
                ),
            ));
        }
        Ok(mapping)
    }

    fn resolve_type(
        &self,
        property: &str,
        attrs: &PlaceholderAttributes,
        parameter_type: ValueType,
        parameter: &Value,
        additional: &Bindings,
    ) -> ScriptResult<ValueType> {
        let (root, rest) = split_root(property);
        if let Some(bound) = additional.bound(root) {
            return Ok(match rest {
                None => ValueType::of(bound),
                Some(rest) => self
                    .accessor
                    .value_type(bound, rest)?
                    .unwrap_or(ValueType::Any),
            });
        }
        if parameter_type.is_scalar() {
            return Ok(parameter_type);
        }
        if attrs.get("jdbcType") == Some(JdbcType::Cursor.as_str()) {
            return Ok(ValueType::Cursor);
        }
        Ok(self
            .accessor
            .value_type(parameter, property)?
            .unwrap_or(ValueType::Any))
    }
}

/// Collapse whitespace runs to one space, leaving `#{...}` bodies untouched.
///
/// Token boundaries follow the placeholder scan, escapes included, and the
/// escapes themselves are kept for that scan.
pub(crate) fn shrink_whitespace(sql: &str) -> String {
    fn push_collapsed(out: &mut String, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            } else {
                out.push(c);
            }
        }
    }

    let mut out = String::with_capacity(sql.len());
    for segment in PARAMETER_TOKENS.segments(sql) {
        match segment {
            Segment::Text(text) => push_collapsed(&mut out, text),
            Segment::EscapedOpen(raw) => out.push_str(raw),
            Segment::Token(body) => {
                out.push_str(PARAMETER_TOKENS.open);
                out.push_str(body);
                out.push_str(PARAMETER_TOKENS.close);
            }
        }
    }
    out.trim().to_string()
}
