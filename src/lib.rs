//! Markdown with an embedded `{% tag %}` language.
//!
//! Documents go through four stages: [parse] builds the AST, [resolve] substitutes variables
//! and function calls, [transform] turns the AST into a render tree using the node and tag
//! schemas of a [Config], and [render_html] serializes the tree. [validate] checks the AST
//! against the attribute contracts of the same schemas.

pub mod config;

pub use markdoc_engine::ast;
pub use markdoc_engine::schema;
pub use markdoc_engine::{
    merge_config, AttributeDef, AttributeType, Config, Diagnostic, DiagnosticId, FunctionDef,
    ParameterDef, Render, Schema, TypeSpec,
};
pub use markdoc_parser::parse;

use markdoc_engine::renderers::html;
use markdoc_engine::Resolve;

use crate::ast::{Attributes, Node, Tag, Value};

/// Resolves variables and functions against the config layered over the default catalogs.
pub fn resolve(node: &Node, config: &Config) -> Node {
    node.resolve(&config.merged())
}

/// Resolves and transforms a document in one step.
pub fn transform(node: &Node, config: &Config) -> Value {
    let config = config.merged();
    markdoc_engine::transform(&node.resolve(&config), &config)
}

pub fn validate(node: &Node, config: &Config) -> Vec<Diagnostic> {
    markdoc_engine::validate(node, config)
}

/// Builds a render tree element, e.g. for functions that inject markup.
pub fn create_element<S: Into<String>>(name: S, attributes: Attributes, children: Vec<Value>) -> Value {
    Value::Tag(Tag::new(name, attributes, children))
}

pub fn render_html(value: &Value) -> String {
    html::render(value)
}

/// A config merged once and reused for every document.
#[derive(Debug, Clone)]
pub struct Markdoc {
    config: Config,
}

impl Markdoc {
    pub fn new(config: Config) -> Self {
        Markdoc {
            config: config.merged(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn parse(&self, source: &str) -> Node {
        parse(source)
    }

    pub fn transform(&self, node: &Node) -> Value {
        markdoc_engine::transform(&node.resolve(&self.config), &self.config)
    }

    pub fn validate(&self, node: &Node) -> Vec<Diagnostic> {
        markdoc_engine::validate(node, &self.config)
    }

    /// Parses, transforms and serializes a document.
    pub fn render(&self, source: &str) -> String {
        render_html(&self.transform(&self.parse(source)))
    }
}

impl Default for Markdoc {
    fn default() -> Self {
        Markdoc::new(Config::default())
    }
}
