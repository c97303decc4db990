pub mod value;
pub mod visitor;

pub use value::{Attributes, Function, Tag, Value, Variable};

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Every kind of node the document builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading,
    Blockquote,
    List,
    Item,
    Table,
    Thead,
    Tbody,
    Tr,
    Th,
    Td,
    Fence,
    Code,
    Hr,
    Text,
    Softbreak,
    Hardbreak,
    Em,
    Strong,
    Link,
    Image,
    Tag,
    Annotation,
    Variable,
    Function,
}

impl NodeKind {
    /// Name used for schema lookups in the node catalog.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::Blockquote => "blockquote",
            NodeKind::List => "list",
            NodeKind::Item => "item",
            NodeKind::Table => "table",
            NodeKind::Thead => "thead",
            NodeKind::Tbody => "tbody",
            NodeKind::Tr => "tr",
            NodeKind::Th => "th",
            NodeKind::Td => "td",
            NodeKind::Fence => "fence",
            NodeKind::Code => "code",
            NodeKind::Hr => "hr",
            NodeKind::Text => "text",
            NodeKind::Softbreak => "softbreak",
            NodeKind::Hardbreak => "hardbreak",
            NodeKind::Em => "em",
            NodeKind::Strong => "strong",
            NodeKind::Link => "link",
            NodeKind::Image => "image",
            NodeKind::Tag => "tag",
            NodeKind::Annotation => "annotation",
            NodeKind::Variable => "variable",
            NodeKind::Function => "function",
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            NodeKind::Text
                | NodeKind::Hr
                | NodeKind::Softbreak
                | NodeKind::Hardbreak
                | NodeKind::Variable
                | NodeKind::Function
        )
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The universal AST element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Tag name, only set for [NodeKind::Tag].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub attributes: Attributes,
    /// Raw text of `text`, `code` and `fence` leaves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            tag: None,
            attributes: Attributes::new(),
            content: None,
            children: vec![],
        }
    }

    pub fn new_with_attributes(kind: NodeKind, attributes: Attributes) -> Self {
        Node {
            attributes,
            ..Node::new(kind)
        }
    }

    pub fn new_with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Node {
            children,
            ..Node::new(kind)
        }
    }

    pub fn text<S: Into<String>>(content: S) -> Self {
        Node {
            content: Some(content.into()),
            ..Node::new(NodeKind::Text)
        }
    }

    pub fn tag<S: Into<String>>(name: S, attributes: Attributes, children: Vec<Node>) -> Self {
        Node {
            kind: NodeKind::Tag,
            tag: Some(name.into()),
            attributes,
            content: None,
            children,
        }
    }

    /// Wraps a `Variable` or `Function` reference in its leaf node.
    pub fn interpolation(value: Value) -> Self {
        let kind = match value {
            Value::Function(_) => NodeKind::Function,
            _ => NodeKind::Variable,
        };
        let mut attributes = Attributes::new();
        attributes.insert("value".into(), value);
        Node::new_with_attributes(kind, attributes)
    }

    /// The tag name for tag nodes.
    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is_tag(&self, name: &str) -> bool {
        self.kind == NodeKind::Tag && self.tag_name() == Some(name)
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}
