use crate::config::Config;
use markdoc_parser::ast::{Function, Node, Value, Variable};
use tracing::{debug, trace};

/// Replaces variable and function references with their values from a [Config]. The input is
/// never modified; a fresh value is returned.
pub trait Resolve {
    type Output;

    fn resolve(&self, config: &Config) -> Self::Output;
}

impl Resolve for Node {
    type Output = Node;

    fn resolve(&self, config: &Config) -> Node {
        Node {
            kind: self.kind,
            tag: self.tag.clone(),
            attributes: self
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.resolve(config)))
                .collect(),
            content: self.content.clone(),
            children: self.children.resolve(config),
        }
    }
}

impl Resolve for [Node] {
    type Output = Vec<Node>;

    fn resolve(&self, config: &Config) -> Vec<Node> {
        self.iter().map(|n| n.resolve(config)).collect()
    }
}

impl Resolve for Value {
    type Output = Value;

    fn resolve(&self, config: &Config) -> Value {
        match self {
            Value::Variable(v) => v.resolve(config),
            Value::Function(f) => f.resolve(config),
            Value::Array(items) => Value::Array(items.iter().map(|v| v.resolve(config)).collect()),
            Value::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.resolve(config)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl Resolve for Variable {
    type Output = Value;

    fn resolve(&self, config: &Config) -> Value {
        match config.variables.get(&self.name) {
            Some(value) => value.clone(),
            None => {
                trace!("undefined variable ${}", self.name);
                Value::Null
            }
        }
    }
}

/// Arguments are handed to the function as written. Descriptor functions receive the config
/// and may resolve them themselves.
impl Resolve for Function {
    type Output = Value;

    fn resolve(&self, config: &Config) -> Value {
        match config.functions.get(&self.name) {
            Some(function) => function.call(&self.args, &self.kwargs, config),
            None => {
                debug!("unknown function {}()", self.name);
                Value::Null
            }
        }
    }
}
