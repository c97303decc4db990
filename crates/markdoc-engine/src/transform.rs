//! Schema driven conversion of a resolved AST into a render tree of [Value]s.

use crate::config::Config;
use crate::schema::{AttributeRender, Render, Schema};
use lazy_static::lazy_static;
use markdoc_parser::ast::{Attributes, Node, NodeKind, Tag, Value};
use regex::{Captures, Regex};

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{([A-Za-z0-9_-]+)\}").expect("invalid placeholder expression");
}

/// Transforms a node with a config that already holds the default catalogs (see
/// [Config::merged]). Documents always produce an `Array`; nodes that render only their
/// children produce an `Array` that is spliced into the parent.
pub fn transform(node: &Node, config: &Config) -> Value {
    match node.kind {
        NodeKind::Document => Value::Array(transform_nodes(&node.children, config)),
        NodeKind::Text => Value::String(node.content.clone().unwrap_or_default()),
        NodeKind::Softbreak => Value::String("\n".to_string()),
        NodeKind::Variable | NodeKind::Function => {
            node.attribute("value").cloned().unwrap_or_default()
        }
        NodeKind::Code => code_block(node, None),
        NodeKind::Fence => code_block(node, node.attribute("language").and_then(Value::as_str)),
        _ => transform_with_schema(node, config),
    }
}

/// Transforms a sequence of nodes, flattening `Array` results into the output.
pub fn transform_nodes<'a, I>(nodes: I, config: &Config) -> Vec<Value>
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut out = Vec::new();
    for node in nodes {
        match transform(node, config) {
            Value::Array(items) => out.extend(items),
            value => out.push(value),
        }
    }
    out
}

fn transform_with_schema(node: &Node, config: &Config) -> Value {
    let schema = config.find_schema(node);
    if let Some(hook) = schema.and_then(|s| s.transform.as_ref()) {
        return hook.transform(node, config);
    }

    let children = transform_nodes(&node.children, config);

    if node.kind == NodeKind::List {
        let name = match node.attribute("ordered") {
            Some(Value::Bool(true)) => "ol",
            _ => "ul",
        };
        return element(name, render_attributes(node, schema), children);
    }

    match schema {
        None => match node.tag_name() {
            Some(name) => element(name, node.attributes.clone(), children),
            None => Value::Array(vec![]),
        },
        Some(schema) => match &schema.render {
            Some(Render::Element(name)) => element(
                &substitute(name, &node.attributes),
                render_attributes(node, Some(schema)),
                children,
            ),
            _ => Value::Array(children),
        },
    }
}

fn element(name: &str, attributes: Attributes, children: Vec<Value>) -> Value {
    Value::Tag(Tag::new(name, attributes, children))
}

/// Fills `{attribute}` placeholders in an element name. Missing attributes become empty.
fn substitute(name: &str, attributes: &Attributes) -> String {
    PLACEHOLDER
        .replace_all(name, |caps: &Captures| {
            attributes
                .get(&caps[1])
                .map(|v| v.to_string())
                .unwrap_or_default()
        })
        .into_owned()
}

/// Applies the schema's rename and suppression rules. Without a schema every attribute is
/// passed through.
pub fn render_attributes(node: &Node, schema: Option<&Schema>) -> Attributes {
    let schema = match schema {
        Some(schema) => schema,
        None => return node.attributes.clone(),
    };

    let mut rendered = Attributes::new();
    for (key, value) in &node.attributes {
        match schema.attributes.get(key).and_then(|d| d.render.as_ref()) {
            Some(AttributeRender::Flag(false)) => {}
            Some(AttributeRender::Rename(name)) => {
                rendered.insert(name.clone(), value.clone());
            }
            _ => {
                rendered.insert(key.clone(), value.clone());
            }
        }
    }
    rendered
}

fn code_block(node: &Node, language: Option<&str>) -> Value {
    let mut attributes = Attributes::new();
    if let Some(language) = language {
        attributes.insert(
            "class".into(),
            Value::String(format!("language-{}", language)),
        );
    }
    let content = Value::String(node.content.clone().unwrap_or_default());
    element(
        "pre",
        Attributes::new(),
        vec![element("code", attributes, vec![content])],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttributeDef;

    fn tag(name: &str, attributes: Attributes, children: Vec<Value>) -> Value {
        Value::Tag(Tag::new(name, attributes, children))
    }

    fn attrs(pairs: Vec<(&str, Value)>) -> Attributes {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn heading_level_placeholder() {
        let config = Config::default().merged();
        let node = Node {
            children: vec![Node::text("Hi")],
            ..Node::new_with_attributes(
                NodeKind::Heading,
                attrs(vec![("level", Value::Int(2)), ("id", "top".into())]),
            )
        };

        assert_eq!(
            tag("h2", attrs(vec![("id", "top".into())]), vec!["Hi".into()]),
            transform(&node, &config)
        );
    }

    #[test]
    fn unknown_tag_keeps_children() {
        let config = Config::default().merged();
        let node = Node::tag(
            "custom",
            attrs(vec![("x", Value::Int(1))]),
            vec![Node::text("a")],
        );

        assert_eq!(
            tag("custom", attrs(vec![("x", Value::Int(1))]), vec!["a".into()]),
            transform(&node, &config)
        );
    }

    #[test]
    fn fragments_are_spliced() {
        let config = Config::default().merged();
        let paragraph = Node::new_with_children(
            NodeKind::Paragraph,
            vec![
                Node::text("a"),
                Node::tag("slot", Attributes::new(), vec![Node::text("b")]),
                Node::new(NodeKind::Annotation),
            ],
        );

        assert_eq!(
            tag("p", Attributes::new(), vec!["a".into(), "b".into()]),
            transform(&paragraph, &config)
        );
    }

    #[test]
    fn attribute_rendering_rules() {
        let config = Config::default()
            .with_tag(
                "callout",
                Schema::element("div")
                    .with_attribute("kind", AttributeDef::new().rename("data-kind"))
                    .with_attribute("secret", AttributeDef::hidden()),
            )
            .merged();
        let node = Node::tag(
            "callout",
            attrs(vec![
                ("kind", "warn".into()),
                ("secret", "x".into()),
                ("class", "wide".into()),
            ]),
            vec![],
        );

        assert_eq!(
            tag(
                "div",
                attrs(vec![("data-kind", "warn".into()), ("class", "wide".into())]),
                vec![]
            ),
            transform(&node, &config)
        );
    }

    #[test]
    fn lists_and_code() {
        let config = Config::default().merged();
        let list = Node {
            children: vec![Node::new_with_children(NodeKind::Item, vec![Node::text("x")])],
            ..Node::new_with_attributes(
                NodeKind::List,
                attrs(vec![("ordered", Value::Bool(true)), ("start", Value::Int(3))]),
            )
        };
        assert_eq!(
            tag(
                "ol",
                attrs(vec![("start", Value::Int(3))]),
                vec![tag("li", Attributes::new(), vec!["x".into()])]
            ),
            transform(&list, &config)
        );

        let fence = Node {
            content: Some("let x;\n".into()),
            ..Node::new_with_attributes(NodeKind::Fence, attrs(vec![("language", "rust".into())]))
        };
        assert_eq!(
            tag(
                "pre",
                Attributes::new(),
                vec![tag(
                    "code",
                    attrs(vec![("class", "language-rust".into())]),
                    vec!["let x;\n".into()]
                )]
            ),
            transform(&fence, &config)
        );
    }

    #[test]
    fn transform_hook_takes_over() {
        let config = Config::default()
            .with_node(
                "paragraph",
                Schema::default()
                    .with_transform(|node: &Node, _: &Config| Value::Int(node.children.len() as i64)),
            )
            .merged();
        let paragraph = Node::new_with_children(NodeKind::Paragraph, vec![Node::text("a")]);

        assert_eq!(Value::Int(1), transform(&paragraph, &config));
    }
}
