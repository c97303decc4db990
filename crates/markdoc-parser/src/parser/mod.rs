//! Assembles the AST from the token stream, interleaving Markdown structure with tags.

mod inline;

pub use inline::{apply_annotations, merge_attributes, InlineBuilder};

use crate::ast::{Attributes, Node, NodeKind, Value};
use crate::markdown::{Nesting, Token, TokenKind};
use crate::tag::{parse_tag, single_tag_inner, TagInfo};
use tracing::debug;

/// Block-level tree builder. `stack` holds the nodes under construction with the document at
/// the bottom; `tags` holds the stack positions of open custom tags.
pub struct DocumentBuilder {
    stack: Vec<Node>,
    tags: Vec<usize>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn block_node(kind: &TokenKind) -> Option<Node> {
    let node = match kind {
        TokenKind::Paragraph => Node::new(NodeKind::Paragraph),
        TokenKind::Heading(level) => {
            let mut attributes = Attributes::new();
            attributes.insert("level".into(), Value::Int(*level as i64));
            Node::new_with_attributes(NodeKind::Heading, attributes)
        }
        TokenKind::Blockquote => Node::new(NodeKind::Blockquote),
        TokenKind::BulletList => list_node(false, 1),
        TokenKind::OrderedList(start) => list_node(true, *start),
        TokenKind::ListItem => Node::new(NodeKind::Item),
        TokenKind::Table => Node::new(NodeKind::Table),
        TokenKind::Thead => Node::new(NodeKind::Thead),
        TokenKind::Tbody => Node::new(NodeKind::Tbody),
        TokenKind::Tr => Node::new(NodeKind::Tr),
        TokenKind::Th => Node::new(NodeKind::Th),
        TokenKind::Td => Node::new(NodeKind::Td),
        _ => return None,
    };
    Some(node)
}

fn list_node(ordered: bool, start: u64) -> Node {
    let mut attributes = Attributes::new();
    attributes.insert("ordered".into(), Value::Bool(ordered));
    if ordered && start != 1 {
        attributes.insert("start".into(), Value::Int(start as i64));
    }
    Node::new_with_attributes(NodeKind::List, attributes)
}

fn code_node(token: &Token) -> Option<Node> {
    let node = match &token.kind {
        TokenKind::Fence { info } => {
            let mut node = Node::new(NodeKind::Fence);
            if let Some(language) = info.split_whitespace().next() {
                node.attributes
                    .insert("language".into(), Value::String(language.to_string()));
            }
            node
        }
        TokenKind::CodeBlock => Node::new(NodeKind::Code),
        _ => return None,
    };
    Some(Node {
        content: Some(token.content.clone()),
        ..node
    })
}

/// Inline children of these kinds may carry annotations for their parent.
fn accepts_annotations(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Paragraph | NodeKind::Heading | NodeKind::Item | NodeKind::Th | NodeKind::Td
    )
}

impl DocumentBuilder {
    pub fn new() -> Self {
        DocumentBuilder {
            stack: vec![Node::new(NodeKind::Document)],
            tags: vec![],
        }
    }

    pub fn build(mut self, tokens: &[Token]) -> Node {
        let mut pos = 0;
        while pos < tokens.len() {
            pos += self.token(&tokens[pos..]);
        }

        while self.stack.len() > 1 {
            self.pop_frame();
        }
        self.stack.pop().unwrap_or_else(|| Node::new(NodeKind::Document))
    }

    /// Handles the token at the front of `tokens` and returns how many were consumed.
    fn token(&mut self, tokens: &[Token]) -> usize {
        let token = &tokens[0];
        match token.nesting {
            Nesting::Open => {
                if token.kind == TokenKind::Paragraph {
                    if let Some(consumed) = self.block_tag(tokens) {
                        return consumed;
                    }
                }
                match block_node(&token.kind) {
                    Some(node) => self.stack.push(node),
                    None => debug!("unexpected open token {:?}", token.kind),
                }
            }
            Nesting::Close => self.close_structure(),
            Nesting::Atomic => match &token.kind {
                TokenKind::Inline => self.inline(token),
                TokenKind::Hr => self.append(Node::new(NodeKind::Hr)),
                _ => match code_node(token) {
                    Some(node) => self.append(node),
                    None => debug!("unexpected block token {:?}", token.kind),
                },
            },
        }
        1
    }

    /// A paragraph consisting of a single tag span is a block-level tag.
    fn block_tag(&mut self, tokens: &[Token]) -> Option<usize> {
        let inline = match tokens {
            [_, inline, close, ..]
                if inline.kind == TokenKind::Inline && close.nesting == Nesting::Close =>
            {
                inline
            }
            _ => return None,
        };

        match parse_tag(single_tag_inner(&inline.content)?) {
            TagInfo::Open { name, attributes } => {
                self.stack.push(Node::tag(name, attributes, vec![]));
                self.tags.push(self.stack.len() - 1);
            }
            TagInfo::SelfClosing { name, attributes } => {
                self.append(Node::tag(name, attributes, vec![]))
            }
            TagInfo::Close { name } => self.close_tag(name),
            _ => return None,
        }
        Some(3)
    }

    fn close_tag(&mut self, name: Option<String>) {
        let top = self.stack.len() - 1;
        let matches = match self.tags.last() {
            Some(&idx) => idx == top && self.stack[idx].tag == name,
            None => false,
        };
        if matches {
            self.pop_frame();
        } else {
            debug!("ignoring close tag {:?} without a matching open tag", name);
        }
    }

    /// Closes the innermost structural frame, closing tags opened inside it first.
    fn close_structure(&mut self) {
        while self.top_is_tag() {
            self.pop_frame();
        }
        if self.stack.len() > 1 {
            self.pop_frame();
        }
    }

    fn top_is_tag(&self) -> bool {
        self.tags.last() == Some(&(self.stack.len() - 1))
    }

    fn pop_frame(&mut self) {
        if self.top_is_tag() {
            self.tags.pop();
        }
        if let Some(node) = self.stack.pop() {
            self.append(node);
        }
    }

    fn append(&mut self, node: Node) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    fn inline(&mut self, token: &Token) {
        let children = InlineBuilder::new().build(&token.children);
        if let Some(parent) = self.stack.last_mut() {
            parent.children.extend(children);
            if accepts_annotations(parent.kind) {
                apply_annotations(parent);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::Tokenizer;

    fn build(source: &str) -> Node {
        DocumentBuilder::new().build(&Tokenizer::new(source).tokenize())
    }

    fn kinds(node: &Node) -> Vec<NodeKind> {
        node.children.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn block_tag_wraps_paragraph() {
        let doc = build("{% note %}\n\nHello\n\n{% /note %}\n");

        let paragraph = Node::new_with_children(NodeKind::Paragraph, vec![Node::text("Hello")]);
        assert_eq!(
            vec![Node::tag("note", Attributes::new(), vec![paragraph])],
            doc.children
        );
    }

    #[test]
    fn mismatched_close_is_ignored() {
        let doc = build("{% a %}\n\n{% /b %}\n\ntext\n\n{% /a %}\n\nafter\n");

        assert_eq!(vec![NodeKind::Tag, NodeKind::Paragraph], kinds(&doc));
        assert_eq!(vec![NodeKind::Paragraph], kinds(&doc.children[0]));
    }

    #[test]
    fn structure_close_ends_inner_tags() {
        let doc = build("> {% aside %}\n>\n> quoted\n\n{% /aside %}\n");

        let quote = &doc.children[0];
        assert_eq!(NodeKind::Blockquote, quote.kind);
        assert!(quote.children[0].is_tag("aside"));
        assert_eq!(1, doc.children.len());
    }

    #[test]
    fn self_closing_block_tag() {
        let doc = build("{% partial file=\"a.md\" /%}\n");
        let mut attributes = Attributes::new();
        attributes.insert("file".into(), "a.md".into());

        assert_eq!(
            vec![Node::tag("partial", attributes, vec![])],
            doc.children
        );
    }

    #[test]
    fn annotation_on_own_line_stays_paragraph() {
        let doc = build("{% .lead %}\n");
        assert_eq!(NodeKind::Paragraph, doc.children[0].kind);
        assert_eq!(Some(&Value::from("lead")), doc.children[0].attribute("class"));
    }

    #[test]
    fn lists_and_code() {
        let doc = build("5. a\n6. b\n\n```js extra\nx\n```\n\n    indented\n\n---\n");

        let list = &doc.children[0];
        assert_eq!(Some(&Value::Bool(true)), list.attribute("ordered"));
        assert_eq!(Some(&Value::Int(5)), list.attribute("start"));
        assert_eq!(vec![NodeKind::Item, NodeKind::Item], kinds(list));

        let fence = &doc.children[1];
        assert_eq!(Some(&Value::from("js")), fence.attribute("language"));
        assert_eq!(Some("x\n"), fence.content.as_deref());

        assert_eq!(NodeKind::Code, doc.children[2].kind);
        assert_eq!(NodeKind::Hr, doc.children[3].kind);
    }

    #[test]
    fn unclosed_tags_are_closed_at_end() {
        let doc = build("{% a %}\n\n{% b %}\n\ntext\n");

        let a = &doc.children[0];
        assert!(a.is_tag("a"));
        assert!(a.children[0].is_tag("b"));
        assert_eq!(NodeKind::Paragraph, a.children[0].children[0].kind);
    }
}
