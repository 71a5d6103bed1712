use serde::{Deserialize, Serialize};

/// An uncompiled template: text and elements with attributes, as produced by
/// whatever reads the caller's mapper files.
///
/// Serializes as `{"text": "..."}` or
/// `{"element": {"name": "if", "attributes": [["test", "id != null"]], "children": [...]}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateNode {
    Text(String),
    Element {
        name: String,
        #[serde(default)]
        attributes: Vec<(String, String)>,
        #[serde(default)]
        children: Vec<TemplateNode>,
    },
}

impl TemplateNode {
    pub fn text(text: impl Into<String>) -> Self {
        TemplateNode::Text(text.into())
    }

    pub fn element(
        name: impl Into<String>,
        attributes: &[(&str, &str)],
        children: Vec<TemplateNode>,
    ) -> Self {
        TemplateNode::Element {
            name: name.into(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children,
        }
    }

    /// Element name; `None` for text.
    pub fn name(&self) -> Option<&str> {
        match self {
            TemplateNode::Element { name, .. } => Some(name),
            TemplateNode::Text(_) => None,
        }
    }

    /// Value of the first attribute called `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            TemplateNode::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            TemplateNode::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[TemplateNode] {
        match self {
            TemplateNode::Element { children, .. } => children,
            TemplateNode::Text(_) => &[],
        }
    }
}
