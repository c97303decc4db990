use crate::ast::{Node, NodeKind, Value};

/// Implements the visitor pattern for the markdoc AST. Blanket implementations are provided so
/// implementors only have to implement the methods they need.
pub trait AstVisitor {
    fn walk_nodes(&mut self, nodes: &[Node]) {
        nodes.iter().for_each(|n| self.visit_node(n))
    }

    fn walk_node(&mut self, node: &Node) {
        if node.kind == NodeKind::Tag {
            if let Some(name) = node.tag_name() {
                self.visit_tag(name, node);
            }
        }
        node.attributes
            .iter()
            .for_each(|(key, value)| self.visit_attribute(node, key, value));
        if !node.kind.is_leaf() {
            self.walk_nodes(&node.children)
        }
    }

    fn visit_node(&mut self, node: &Node) {
        self.walk_node(node)
    }

    fn visit_tag(&mut self, _name: &str, _node: &Node) {}

    fn visit_attribute(&mut self, _node: &Node, _key: &str, _value: &Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Attributes;

    #[derive(Default)]
    struct TagCollector {
        tags: Vec<String>,
        attributes: Vec<String>,
    }

    impl AstVisitor for TagCollector {
        fn visit_tag(&mut self, name: &str, _node: &Node) {
            self.tags.push(name.to_string());
        }

        fn visit_attribute(&mut self, _node: &Node, key: &str, _value: &Value) {
            self.attributes.push(key.to_string());
        }
    }

    #[test]
    fn collects_nested_tags() {
        let mut attrs = Attributes::new();
        attrs.insert("primary".into(), Value::Bool(true));
        let doc = Node::new_with_children(
            NodeKind::Document,
            vec![Node::tag(
                "if",
                attrs,
                vec![Node::new_with_children(
                    NodeKind::Paragraph,
                    vec![Node::tag("note", Attributes::new(), vec![])],
                )],
            )],
        );

        let mut collector = TagCollector::default();
        collector.visit_node(&doc);

        assert_eq!(vec!["if", "note"], collector.tags);
        assert_eq!(vec!["primary"], collector.attributes);
    }
}
