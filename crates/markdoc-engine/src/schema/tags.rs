use crate::config::Config;
use crate::resolve::Resolve;
use crate::schema::{AttributeDef, AttributeType, Schema};
use crate::transform::{transform, transform_nodes};
use lazy_static::lazy_static;
use markdoc_parser::ast::{Node, Tag, Value};
use std::collections::HashMap;
use tracing::debug;

/// Splits the children of an `if` tag into condition groups at each `else`.
fn conditions(node: &Node) -> Vec<(Value, Vec<&Node>)> {
    let primary = node.attribute("primary").cloned().unwrap_or_default();
    let mut groups = vec![(primary, vec![])];

    for child in &node.children {
        if child.is_tag("else") {
            let condition = child
                .attribute("primary")
                .cloned()
                .unwrap_or(Value::Bool(true));
            groups.push((condition, vec![]));
        } else if let Some((_, children)) = groups.last_mut() {
            children.push(child);
        }
    }
    groups
}

/// Renders the children of the first group whose condition is truthy.
pub fn transform_if(node: &Node, config: &Config) -> Value {
    conditions(node)
        .into_iter()
        .find(|(condition, _)| condition.is_truthy())
        .map(|(_, children)| Value::Array(transform_nodes(children, config)))
        .unwrap_or_else(|| Value::Array(vec![]))
}

fn transform_table(node: &Node, config: &Config) -> Value {
    Value::Tag(Tag::new(
        node.tag_name().unwrap_or("table"),
        node.attributes.clone(),
        transform_nodes(&node.children, config),
    ))
}

/// Renders a registered partial with the caller's variables overlaid by the tag's own.
pub fn transform_partial(node: &Node, config: &Config) -> Value {
    let file = node.attribute("file").and_then(Value::as_str);
    let partial = match file.and_then(|f| config.partials.get(f)) {
        Some(partial) => partial,
        None => {
            debug!("partial {:?} is not registered", file);
            return Value::Array(vec![]);
        }
    };

    let mut scoped = config.clone();
    if let Some(variables) = node.attribute("variables").and_then(Value::as_object) {
        for (key, value) in variables {
            scoped.variables.insert(key.clone(), value.clone());
        }
    }
    transform(&partial.resolve(&scoped), &scoped)
}

fn partial_exists(value: &Value, config: &Config) -> Option<String> {
    match value {
        Value::String(file) if !config.partials.contains_key(file) => {
            Some(format!("partial '{}' is not registered", file))
        }
        _ => None,
    }
}

lazy_static! {
    static ref TAGS: HashMap<String, Schema> = {
        let mut tags = HashMap::new();
        tags.insert(
            "if".to_string(),
            Schema::fragment()
                .with_attribute("primary", AttributeDef::hidden())
                .with_transform(transform_if),
        );
        tags.insert(
            "else".to_string(),
            Schema::fragment()
                .with_attribute("primary", AttributeDef::hidden())
                .self_closing(),
        );
        tags.insert(
            "table".to_string(),
            Schema::default().with_transform(transform_table),
        );
        tags.insert("slot".to_string(), Schema::fragment());
        tags.insert(
            "partial".to_string(),
            Schema::default()
                .with_attribute(
                    "file",
                    AttributeDef::new()
                        .required()
                        .with_type(AttributeType::String)
                        .with_check(partial_exists),
                )
                .with_attribute(
                    "variables",
                    AttributeDef::new().with_type(AttributeType::Object),
                )
                .with_transform(transform_partial)
                .self_closing(),
        );
        tags
    };
}

/// Built-in tags available in every config.
pub fn default_tags() -> &'static HashMap<String, Schema> {
    &TAGS
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdoc_parser::ast::{Attributes, NodeKind};

    fn if_node(primary: Value, branches: Vec<(Option<Value>, &str)>) -> Node {
        let mut attributes = Attributes::new();
        attributes.insert("primary".into(), primary);
        let mut children = vec![];
        for (i, (condition, text)) in branches.into_iter().enumerate() {
            if i > 0 {
                let mut attributes = Attributes::new();
                if let Some(condition) = condition {
                    attributes.insert("primary".into(), condition);
                }
                children.push(Node::tag("else", attributes, vec![]));
            }
            children.push(Node::text(text));
        }
        Node::tag("if", attributes, children)
    }

    #[test]
    fn first_truthy_branch_wins() {
        let config = Config::default().merged();
        let node = if_node(
            Value::Null,
            vec![
                (None, "a"),
                (Some(Value::Bool(false)), "b"),
                (Some(Value::Int(0)), "c"),
                (None, "d"),
            ],
        );

        assert_eq!(Value::Array(vec!["c".into()]), transform_if(&node, &config));
    }

    #[test]
    fn no_branch_matches() {
        let config = Config::default().merged();
        let node = if_node(Value::Bool(false), vec![(None, "a")]);

        assert_eq!(Value::Array(vec![]), transform_if(&node, &config));
    }

    #[test]
    fn partial_check() {
        let config = Config::default().with_partial("a.md", Node::new(NodeKind::Document));

        assert_eq!(None, partial_exists(&"a.md".into(), &config));
        assert!(partial_exists(&"b.md".into(), &config).is_some());
    }
}
