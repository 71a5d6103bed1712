//! Template compilation: [`TemplateNode`] trees to [`SqlSource`]s.
//!
//! | element | attributes |
//! |---|---|
//! | `trim` | `prefix`, `suffix`, `prefixOverrides`, `suffixOverrides` |
//! | `where`, `set` | |
//! | `foreach` | `collection` (required), `item`, `index`, `open`, `close`, `separator`, `nullable` |
//! | `if`, `when` | `test` (required) |
//! | `choose` | children: `when`*, `otherwise`? |
//! | `otherwise` | |
//! | `bind` | `name`, `value` (both required) |

use crate::engine::ScriptEngine;
use crate::error::{ScriptError, ScriptResult};
use crate::node::{
    BindNode, ChooseNode, ForEachNode, IfNode, SqlNode, TextNode, TrimNode, parse_overrides,
};
use crate::parsing::SCRIPT_TOKENS;
use crate::source::{DynamicSqlSource, RawSqlSource, SqlSource};
use crate::template::TemplateNode;
use crate::value::ValueType;

/// Compiles templates for one [`ScriptEngine`].
#[derive(Debug, Clone)]
pub struct ScriptBuilder<'e> {
    engine: &'e ScriptEngine,
    parameter_type: ValueType,
    id: Option<String>,
}

impl<'e> ScriptBuilder<'e> {
    pub fn new(engine: &'e ScriptEngine) -> Self {
        Self {
            engine,
            parameter_type: ValueType::Any,
            id: None,
        }
    }

    /// Declared parameter type, used when a static template is compiled ahead
    /// of any parameter.
    pub fn parameter_type(mut self, parameter_type: ValueType) -> Self {
        self.parameter_type = parameter_type;
        self
    }

    /// Statement id reported in log events.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Compile a statement. For an element, its children form the body; a
    /// bare text node is the body itself.
    pub fn build(&self, template: &TemplateNode) -> ScriptResult<SqlSource> {
        let root = match template {
            TemplateNode::Text(_) => self.compile_children(std::slice::from_ref(template))?,
            TemplateNode::Element { children, .. } => self.compile_children(children)?,
        };

        if root.is_dynamic() {
            let mut source = DynamicSqlSource::new(self.engine.clone(), root);
            if let Some(id) = &self.id {
                source = source.with_id(id.clone());
            }
            Ok(SqlSource::Dynamic(source))
        } else {
            Ok(SqlSource::Raw(RawSqlSource::new(
                self.engine,
                &root,
                self.parameter_type,
            )?))
        }
    }

    pub fn build_text(&self, text: &str) -> ScriptResult<SqlSource> {
        self.build(&TemplateNode::text(text))
    }

    /// Compile a sequence of template nodes into one [`SqlNode::Mixed`].
    pub fn compile_children(&self, children: &[TemplateNode]) -> ScriptResult<SqlNode> {
        let nodes = children
            .iter()
            .map(|child| self.compile_node(child))
            .collect::<ScriptResult<Vec<_>>>()?;
        Ok(SqlNode::Mixed(nodes))
    }

    fn compile_node(&self, node: &TemplateNode) -> ScriptResult<SqlNode> {
        let (name, children) = match node {
            TemplateNode::Text(text) => return Ok(self.compile_text(text)),
            TemplateNode::Element { name, children, .. } => (name, children),
        };

        let body = || self.compile_children(children);
        let compiled = match name.as_str() {
            "trim" => {
                let mut trim = TrimNode::new(body()?);
                if let Some(prefix) = node.attribute("prefix") {
                    trim = trim.prefix(prefix);
                }
                if let Some(suffix) = node.attribute("suffix") {
                    trim = trim.suffix(suffix);
                }
                if let Some(overrides) = node.attribute("prefixOverrides") {
                    trim = trim.prefix_overrides(parse_overrides(overrides));
                }
                if let Some(overrides) = node.attribute("suffixOverrides") {
                    trim = trim.suffix_overrides(parse_overrides(overrides));
                }
                trim.into()
            }
            "where" => TrimNode::where_clause(body()?).into(),
            "set" => TrimNode::set_clause(body()?).into(),
            "foreach" => self.compile_foreach(node, body()?)?,
            "if" | "when" => IfNode::new(required(node, "test")?, body()?).into(),
            "choose" => self.compile_choose(children)?,
            "otherwise" => body()?,
            "bind" => BindNode::new(required(node, "name")?, required(node, "value")?).into(),
            other => {
                return Err(ScriptError::build(format!(
                    "unknown element <{other}> in SQL statement"
                )));
            }
        };
        Ok(compiled)
    }

    fn compile_text(&self, text: &str) -> SqlNode {
        if SCRIPT_TOKENS.contains_token(text) {
            TextNode::new(text)
                .with_injection_filter(self.engine.config().injection_filter.clone())
                .into()
        } else {
            SqlNode::static_text(text)
        }
    }

    fn compile_foreach(&self, node: &TemplateNode, body: SqlNode) -> ScriptResult<SqlNode> {
        let nullable = match node.attribute("nullable").map(str::trim) {
            None | Some("") => self.engine.config().nullable_on_foreach,
            Some("true") => true,
            Some("false") => false,
            Some(other) => {
                return Err(ScriptError::build(format!(
                    "<foreach> nullable must be 'true' or 'false', got '{other}'"
                )));
            }
        };

        let mut foreach =
            ForEachNode::new(required(node, "collection")?, body).nullable(nullable);
        if let Some(item) = optional(node, "item") {
            foreach = foreach.item(item);
        }
        if let Some(index) = optional(node, "index") {
            foreach = foreach.index(index);
        }
        if let Some(open) = node.attribute("open") {
            foreach = foreach.open(open);
        }
        if let Some(close) = node.attribute("close") {
            foreach = foreach.close(close);
        }
        if let Some(separator) = node.attribute("separator") {
            foreach = foreach.separator(separator);
        }
        Ok(foreach.into())
    }

    fn compile_choose(&self, children: &[TemplateNode]) -> ScriptResult<SqlNode> {
        let mut whens = Vec::new();
        let mut otherwise = None;

        for child in children {
            match child {
                TemplateNode::Text(text) if text.trim().is_empty() => {}
                TemplateNode::Element { name, children, .. } if name == "when" => {
                    whens.push(IfNode::new(
                        required(child, "test")?,
                        self.compile_children(children)?,
                    ));
                }
                TemplateNode::Element { name, children, .. } if name == "otherwise" => {
                    if otherwise.is_some() {
                        return Err(ScriptError::build(
                            "too many <otherwise> elements in <choose>",
                        ));
                    }
                    otherwise = Some(self.compile_children(children)?);
                }
                TemplateNode::Element { name, .. } => {
                    return Err(ScriptError::build(format!(
                        "unexpected <{name}> in <choose>; expected <when> or <otherwise>"
                    )));
                }
                TemplateNode::Text(_) => {
                    return Err(ScriptError::build("unexpected text in <choose>"));
                }
            }
        }
        Ok(ChooseNode::new(whens, otherwise).into())
    }
}

fn required<'n>(node: &'n TemplateNode, attribute: &str) -> ScriptResult<&'n str> {
    optional(node, attribute).ok_or_else(|| {
        ScriptError::build(format!(
            "<{}> requires a non-empty '{attribute}' attribute",
            node.name().unwrap_or("?")
        ))
    })
}

fn optional<'n>(node: &'n TemplateNode, attribute: &str) -> Option<&'n str> {
    node.attribute(attribute)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
