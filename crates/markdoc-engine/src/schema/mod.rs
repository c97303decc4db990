//! Schema definitions that drive transformation and validation.

pub mod functions;
pub mod nodes;
pub mod tags;

pub use functions::{FunctionDef, FunctionTransform, Invoke, ParameterDef};

use crate::config::Config;
use dyn_clone::DynClone;
use linked_hash_map::LinkedHashMap;
use markdoc_parser::ast::{Node, Value};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};

/// Custom transformation for a node or tag. Replaces the default element rendering entirely.
pub trait NodeTransform: DynClone + Send + Sync {
    fn transform(&self, node: &Node, config: &Config) -> Value;
}

dyn_clone::clone_trait_object!(NodeTransform);

impl<F> NodeTransform for F
where
    F: Fn(&Node, &Config) -> Value + Clone + Send + Sync + 'static,
{
    fn transform(&self, node: &Node, config: &Config) -> Value {
        self(node, config)
    }
}

impl Debug for dyn NodeTransform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("NodeTransform")
    }
}

/// Host supplied value check for an attribute. Returns a message when the value is rejected.
pub trait AttributeCheck: DynClone + Send + Sync {
    fn check(&self, value: &Value, config: &Config) -> Option<String>;
}

dyn_clone::clone_trait_object!(AttributeCheck);

impl<F> AttributeCheck for F
where
    F: Fn(&Value, &Config) -> Option<String> + Clone + Send + Sync + 'static,
{
    fn check(&self, value: &Value, config: &Config) -> Option<String> {
        self(value, config)
    }
}

impl Debug for dyn AttributeCheck {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("AttributeCheck")
    }
}

/// How a node is rendered. A string names the output element and may contain `{attribute}`
/// placeholders; a flag (or no value) renders the children in place of the node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Render {
    Element(String),
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttributeRender {
    Rename(String),
    Flag(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AttributeType {
    #[serde(alias = "string")]
    String,
    #[serde(alias = "number")]
    Number,
    #[serde(alias = "boolean")]
    Boolean,
    #[serde(alias = "object")]
    Object,
    #[serde(alias = "array")]
    Array,
}

impl AttributeType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            AttributeType::String => matches!(value, Value::String(_)),
            AttributeType::Number => matches!(value, Value::Int(_) | Value::Float(_)),
            AttributeType::Boolean => matches!(value, Value::Bool(_)),
            AttributeType::Object => matches!(value, Value::Object(_)),
            AttributeType::Array => matches!(value, Value::Array(_)),
        }
    }
}

/// A single type or a union of accepted types.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    One(AttributeType),
    Union(Vec<AttributeType>),
}

impl TypeSpec {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            TypeSpec::One(t) => t.matches(value),
            TypeSpec::Union(types) => types.iter().any(|t| t.matches(value)),
        }
    }
}

impl From<AttributeType> for TypeSpec {
    fn from(value: AttributeType) -> Self {
        TypeSpec::One(value)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttributeDef {
    pub render: Option<AttributeRender>,
    pub required: bool,
    #[serde(rename = "type")]
    pub type_: Option<TypeSpec>,
    #[serde(skip)]
    pub check: Option<Box<dyn AttributeCheck>>,
}

impl AttributeDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the attribute on the AST but leaves it out of the rendered element.
    pub fn hidden() -> Self {
        AttributeDef {
            render: Some(AttributeRender::Flag(false)),
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn rename<S: Into<String>>(mut self, name: S) -> Self {
        self.render = Some(AttributeRender::Rename(name.into()));
        self
    }

    pub fn with_type<T: Into<TypeSpec>>(mut self, type_: T) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    pub fn with_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value, &Config) -> Option<String> + Clone + Send + Sync + 'static,
    {
        self.check = Some(Box::new(check));
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub render: Option<Render>,
    #[serde(skip)]
    pub transform: Option<Box<dyn NodeTransform>>,
    pub attributes: LinkedHashMap<String, AttributeDef>,
    pub self_closing: bool,
}

impl Schema {
    /// Renders the node as the named element.
    pub fn element<S: Into<String>>(name: S) -> Self {
        Schema {
            render: Some(Render::Element(name.into())),
            ..Self::default()
        }
    }

    /// Renders only the node's children.
    pub fn fragment() -> Self {
        Schema {
            render: Some(Render::Flag(false)),
            ..Self::default()
        }
    }

    pub fn with_attribute<S: Into<String>>(mut self, name: S, definition: AttributeDef) -> Self {
        self.attributes.insert(name.into(), definition);
        self
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Node, &Config) -> Value + Clone + Send + Sync + 'static,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    pub fn self_closing(mut self) -> Self {
        self.self_closing = true;
        self
    }
}
