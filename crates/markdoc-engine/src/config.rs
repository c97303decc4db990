use crate::schema::functions::std_functions;
use crate::schema::nodes::default_nodes;
use crate::schema::tags::default_tags;
use crate::schema::{FunctionDef, Schema};
use markdoc_parser::ast::{Attributes, Node, NodeKind, Value};
use std::collections::HashMap;

/// Everything the resolver, transformer and validator need: schema catalogs, variables,
/// functions and registered partials.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub nodes: HashMap<String, Schema>,
    pub tags: HashMap<String, Schema>,
    pub variables: Attributes,
    pub functions: HashMap<String, FunctionDef>,
    pub partials: HashMap<String, Node>,
    /// Host values passed through untouched.
    pub extra: Attributes,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable<S: Into<String>, V: Into<Value>>(mut self, name: S, value: V) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_function<S: Into<String>>(mut self, name: S, function: FunctionDef) -> Self {
        self.functions.insert(name.into(), function);
        self
    }

    pub fn with_tag<S: Into<String>>(mut self, name: S, schema: Schema) -> Self {
        self.tags.insert(name.into(), schema);
        self
    }

    pub fn with_node<S: Into<String>>(mut self, name: S, schema: Schema) -> Self {
        self.nodes.insert(name.into(), schema);
        self
    }

    pub fn with_partial<S: Into<String>>(mut self, name: S, partial: Node) -> Self {
        self.partials.insert(name.into(), partial);
        self
    }

    pub fn with_extra<S: Into<String>, V: Into<Value>>(mut self, name: S, value: V) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// This config layered over the default catalogs. See [merge_config].
    pub fn merged(&self) -> Config {
        merge_config(self)
    }

    /// Tags are looked up by name, all other nodes by their kind.
    pub fn find_schema(&self, node: &Node) -> Option<&Schema> {
        match node.kind {
            NodeKind::Tag => node.tag_name().and_then(|name| self.tags.get(name)),
            kind => self.nodes.get(kind.as_str()),
        }
    }
}

fn layered<V: Clone>(defaults: &HashMap<String, V>, user: &HashMap<String, V>) -> HashMap<String, V> {
    let mut merged = defaults.clone();
    merged.extend(user.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Overlays the user's node, tag and function entries on the defaults. User entries replace
/// default entries as a whole. Merging an already merged config is a no-op.
pub fn merge_config(config: &Config) -> Config {
    Config {
        nodes: layered(default_nodes(), &config.nodes),
        tags: layered(default_tags(), &config.tags),
        functions: layered(std_functions(), &config.functions),
        ..config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Render;

    #[test]
    fn user_entries_replace_defaults() {
        let config = Config::new()
            .with_node("paragraph", Schema::element("div"))
            .with_tag("note", Schema::element("aside"))
            .merged();

        assert_eq!(
            Some(Render::Element("div".into())),
            config.nodes["paragraph"].render
        );
        assert!(config.nodes.contains_key("heading"));
        assert!(config.tags.contains_key("note"));
        assert!(config.tags.contains_key("if"));
        assert!(config.functions.contains_key("equals"));
    }

    #[test]
    fn schema_lookup() {
        let config = Config::new().merged();

        assert!(config
            .find_schema(&Node::tag("if", Attributes::new(), vec![]))
            .is_some());
        assert!(config
            .find_schema(&Node::tag("unknown", Attributes::new(), vec![]))
            .is_none());
        assert!(config.find_schema(&Node::new(NodeKind::Paragraph)).is_some());
        assert!(config.find_schema(&Node::new(NodeKind::Text)).is_none());
    }
}
