use crate::schema::{AttributeDef, Schema};
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref NODES: HashMap<String, Schema> = {
        let mut nodes = HashMap::new();
        nodes.insert("paragraph".to_string(), Schema::element("p"));
        nodes.insert(
            "heading".to_string(),
            Schema::element("h{level}").with_attribute("level", AttributeDef::hidden()),
        );
        nodes.insert("blockquote".to_string(), Schema::element("blockquote"));
        nodes.insert("item".to_string(), Schema::element("li"));
        // Rendered as `ol` or `ul` by the transformer.
        nodes.insert(
            "list".to_string(),
            Schema::default().with_attribute("ordered", AttributeDef::hidden()),
        );
        for name in ["table", "thead", "tbody", "tr", "th", "td", "em", "strong", "hr"] {
            nodes.insert(name.to_string(), Schema::element(name));
        }
        nodes.insert(
            "link".to_string(),
            Schema::element("a")
                .with_attribute("href", AttributeDef::new())
                .with_attribute("title", AttributeDef::new()),
        );
        nodes.insert(
            "image".to_string(),
            Schema::element("img")
                .with_attribute("src", AttributeDef::new())
                .with_attribute("alt", AttributeDef::new())
                .with_attribute("title", AttributeDef::new()),
        );
        nodes.insert("hardbreak".to_string(), Schema::element("br"));
        nodes
    };
}

/// Default schemas for the Markdown node kinds.
pub fn default_nodes() -> &'static HashMap<String, Schema> {
    &NODES
}
