//! The compiled template tree.
//!
//! A [`SqlNode`] is built once per statement and never mutated; each render
//! walks it against a fresh [`DynamicContext`].

mod bind;
mod condition;
mod foreach;
mod text;
mod trim;


pub use bind::BindNode;
pub use condition::{ChooseNode, IfNode};
pub use foreach::ForEachNode;
pub use text::TextNode;
pub use trim::TrimNode;
pub(crate) use trim::parse_overrides;

use crate::context::DynamicContext;
use crate::error::ScriptResult;

/// One node of a compiled template.
#[derive(Debug, Clone)]
pub enum SqlNode {
    /// Children applied in order.
    Mixed(Vec<SqlNode>),
    /// Literal text, appended verbatim.
    StaticText(String),
    /// Text with `${}` substitutions.
    Text(TextNode),
    If(IfNode),
    Choose(ChooseNode),
    /// `trim`, `where` and `set`.
    Trim(TrimNode),
    ForEach(ForEachNode),
    Bind(BindNode),
}

impl SqlNode {
    /// Render into `ctx`. Returns whether the node contributed (an `if` whose
    /// test failed returns `false`).
    pub fn apply(&self, ctx: &mut dyn DynamicContext) -> ScriptResult<bool> {
        match self {
            SqlNode::Mixed(children) => {
                for child in children {
                    child.apply(ctx)?;
                }
                Ok(true)
            }
            SqlNode::StaticText(text) => {
                ctx.append_sql(text);
                Ok(true)
            }
            SqlNode::Text(node) => node.apply(ctx),
            SqlNode::If(node) => node.apply(ctx),
            SqlNode::Choose(node) => node.apply(ctx),
            SqlNode::Trim(node) => node.apply(ctx),
            SqlNode::ForEach(node) => node.apply(ctx),
            SqlNode::Bind(node) => node.apply(ctx),
        }
    }

    /// Whether rendering can depend on the parameter (anything but plain text).
    pub fn is_dynamic(&self) -> bool {
        match self {
            SqlNode::StaticText(_) => false,
            SqlNode::Mixed(children) => children.iter().any(SqlNode::is_dynamic),
            _ => true,
        }
    }

    pub fn mixed(children: Vec<SqlNode>) -> Self {
        SqlNode::Mixed(children)
    }

    pub fn static_text(text: impl Into<String>) -> Self {
        SqlNode::StaticText(text.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        SqlNode::Text(TextNode::new(text))
    }

    pub fn if_(test: impl Into<String>, body: SqlNode) -> Self {
        SqlNode::If(IfNode::new(test, body))
    }
}

impl From<TextNode> for SqlNode {
    fn from(node: TextNode) -> Self {
        SqlNode::Text(node)
    }
}

impl From<IfNode> for SqlNode {
    fn from(node: IfNode) -> Self {
        SqlNode::If(node)
    }
}

impl From<ChooseNode> for SqlNode {
    fn from(node: ChooseNode) -> Self {
        SqlNode::Choose(node)
    }
}

impl From<TrimNode> for SqlNode {
    fn from(node: TrimNode) -> Self {
        SqlNode::Trim(node)
    }
}

impl From<ForEachNode> for SqlNode {
    fn from(node: ForEachNode) -> Self {
        SqlNode::ForEach(node)
    }
}

impl From<BindNode> for SqlNode {
    fn from(node: BindNode) -> Self {
        SqlNode::Bind(node)
    }
}
