use crate::ast::{Attributes, Node, NodeKind, Value};
use crate::markdown::{Nesting, Token, TokenKind};
use crate::tag::scanner::{CLOSE, OPEN};
use crate::tag::{find_tag_end, parse_tag, TagInfo};
use tracing::debug;

/// Builds the children of one inline run. Markup (`em`, `strong`, `link`) and inline tags
/// share a single frame stack, so tags can wrap formatted text and vice versa.
#[derive(Default)]
pub struct InlineBuilder {
    root: Vec<Node>,
    frames: Vec<Node>,
}

impl InlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(mut self, tokens: &[Token]) -> Vec<Node> {
        for token in tokens {
            self.token(token);
        }
        self.finish()
    }

    fn token(&mut self, token: &Token) {
        match (&token.kind, token.nesting) {
            (TokenKind::Text, _) => self.text(&token.content),
            (TokenKind::CodeInline, _) => self.push_text(&token.content),
            (TokenKind::Softbreak, _) => self.append(Node::new(NodeKind::Softbreak)),
            (TokenKind::Hardbreak, _) => self.append(Node::new(NodeKind::Hardbreak)),
            (TokenKind::Image { src, title }, _) => {
                let mut attributes = Attributes::new();
                attributes.insert("src".into(), src.as_str().into());
                attributes.insert("alt".into(), token.content.as_str().into());
                if !title.is_empty() {
                    attributes.insert("title".into(), title.as_str().into());
                }
                self.append(Node::new_with_attributes(NodeKind::Image, attributes))
            }
            (TokenKind::Em, Nesting::Open) => self.frames.push(Node::new(NodeKind::Em)),
            (TokenKind::Strong, Nesting::Open) => self.frames.push(Node::new(NodeKind::Strong)),
            (TokenKind::Link { href, title }, Nesting::Open) => {
                let mut attributes = Attributes::new();
                attributes.insert("href".into(), href.as_str().into());
                if !title.is_empty() {
                    attributes.insert("title".into(), title.as_str().into());
                }
                self.frames
                    .push(Node::new_with_attributes(NodeKind::Link, attributes))
            }
            (TokenKind::Em | TokenKind::Strong | TokenKind::Link { .. }, Nesting::Close) => {
                self.close_markup()
            }
            (kind, _) => debug!("unexpected inline token {:?}", kind),
        }
    }

    fn append(&mut self, node: Node) {
        match self.frames.last_mut() {
            Some(frame) => frame.children.push(node),
            None => self.root.push(node),
        }
    }

    /// Appends literal text, merging with a preceding text node.
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let children = match self.frames.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.root,
        };
        match children.last_mut() {
            Some(Node {
                kind: NodeKind::Text,
                content: Some(content),
                ..
            }) => content.push_str(text),
            _ => children.push(Node::text(text)),
        }
    }

    /// Splits text into literal runs and `{% ... %}` spans.
    fn text(&mut self, content: &str) {
        let mut pos = 0;
        while let Some(found) = content[pos..].find(OPEN) {
            let start = pos + found;
            self.push_text(&content[pos..start]);

            let end = match find_tag_end(content, start) {
                Some(end) => end,
                None => {
                    pos = start;
                    break;
                }
            };
            let span = &content[start..end + CLOSE.len()];
            self.span(span, parse_tag(&content[start + OPEN.len()..end]));
            pos = end + CLOSE.len();
        }
        self.push_text(&content[pos..]);
    }

    fn span(&mut self, span: &str, info: TagInfo) {
        match info {
            TagInfo::Open { name, attributes } => {
                self.frames.push(Node::tag(name, attributes, vec![]))
            }
            TagInfo::SelfClosing { name, attributes } => {
                self.append(Node::tag(name, attributes, vec![]))
            }
            TagInfo::Close { name } => {
                let matches = self
                    .frames
                    .last()
                    .map_or(false, |f| f.kind == NodeKind::Tag && f.tag == name);
                if matches {
                    self.close_frame();
                } else {
                    debug!("unmatched inline close {:?}, keeping as text", name);
                    self.push_text(span);
                }
            }
            TagInfo::Annotation { attributes } => {
                self.append(Node::new_with_attributes(NodeKind::Annotation, attributes))
            }
            TagInfo::Interpolation(value) => self.append(Node::interpolation(value)),
            TagInfo::Error => self.push_text(span),
        }
    }

    /// Pops the innermost frame into its parent.
    fn close_frame(&mut self) {
        if let Some(mut frame) = self.frames.pop() {
            if frame.kind == NodeKind::Tag {
                apply_annotations(&mut frame);
            }
            self.append(frame);
        }
    }

    /// Closing markup first closes any tag frames opened inside it.
    fn close_markup(&mut self) {
        while self
            .frames
            .last()
            .map_or(false, |f| f.kind == NodeKind::Tag)
        {
            self.close_frame();
        }
        self.close_frame();
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.frames.is_empty() {
            self.close_frame();
        }
        self.root
    }
}

/// Merges attribute maps the way annotations combine: classes accumulate, everything else
/// overwrites.
pub fn merge_attributes(target: &mut Attributes, source: Attributes) {
    for (key, value) in source {
        match (target.get_mut(&key), value) {
            (Some(Value::String(existing)), Value::String(added)) if key == "class" => {
                *existing = existing
                    .split_whitespace()
                    .chain(added.split_whitespace())
                    .collect::<Vec<_>>()
                    .join(" ");
            }
            (Some(slot), value) => *slot = value,
            (None, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Removes `annotation` children from `node` and merges their attributes into it. Text left
/// adjacent by a removed annotation is joined. When any annotation merged, trailing line
/// breaks and the trailing whitespace of the last text child are stripped.
pub fn apply_annotations(node: &mut Node) {
    let mut merged = false;
    let mut children: Vec<Node> = Vec::with_capacity(node.children.len());
    for child in std::mem::take(&mut node.children) {
        if child.kind == NodeKind::Annotation {
            merge_attributes(&mut node.attributes, child.attributes);
            merged = true;
            continue;
        }
        match children.last_mut() {
            Some(previous)
                if previous.kind == NodeKind::Text && child.kind == NodeKind::Text =>
            {
                if let (Some(previous), Some(text)) =
                    (previous.content.as_mut(), child.content.as_deref())
                {
                    previous.push_str(text);
                }
            }
            _ => children.push(child),
        }
    }
    node.children = children;

    if merged {
        while node
            .children
            .last()
            .map_or(false, |c| c.kind == NodeKind::Softbreak)
        {
            node.children.pop();
        }
        if let Some(Node {
            kind: NodeKind::Text,
            content: Some(content),
            ..
        }) = node.children.last_mut()
        {
            let trimmed = content.trim_end().len();
            content.truncate(trimmed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Variable;

    fn text(content: &str) -> Token {
        Token::atomic(TokenKind::Text, content)
    }

    fn build(tokens: Vec<Token>) -> Vec<Node> {
        InlineBuilder::new().build(&tokens)
    }

    #[test]
    fn interpolation_between_text() {
        let nodes = build(vec![text("Hello {% $name %}!")]);

        assert_eq!(
            vec![
                Node::text("Hello "),
                Node::interpolation(Value::Variable(Variable::new("name"))),
                Node::text("!"),
            ],
            nodes
        );
    }

    #[test]
    fn tag_wraps_markup() {
        let nodes = build(vec![
            text("{% badge %}"),
            Token::open(TokenKind::Strong),
            text("new"),
            Token::close(TokenKind::Strong),
            text("{% /badge %} done"),
        ]);

        let strong = Node::new_with_children(NodeKind::Strong, vec![Node::text("new")]);
        assert_eq!(
            vec![
                Node::tag("badge", Attributes::new(), vec![strong]),
                Node::text(" done"),
            ],
            nodes
        );
    }

    #[test]
    fn markup_close_unwinds_tags() {
        let nodes = build(vec![
            Token::open(TokenKind::Em),
            text("a {% x %}b"),
            Token::close(TokenKind::Em),
            text("c"),
        ]);

        let x = Node::tag("x", Attributes::new(), vec![Node::text("b")]);
        let em = Node::new_with_children(NodeKind::Em, vec![Node::text("a "), x]);
        assert_eq!(vec![em, Node::text("c")], nodes);
    }

    #[test]
    fn unmatched_close_is_text() {
        let nodes = build(vec![text("{% a %}x{% /b %}y{% /a %}")]);

        assert_eq!(
            vec![Node::tag(
                "a",
                Attributes::new(),
                vec![Node::text("x{% /b %}y")]
            )],
            nodes
        );
    }

    #[test]
    fn leftover_frames_nest() {
        let nodes = build(vec![text("{% a %}1{% b %}2")]);

        let b = Node::tag("b", Attributes::new(), vec![Node::text("2")]);
        let a = Node::tag("a", Attributes::new(), vec![Node::text("1"), b]);
        assert_eq!(vec![a], nodes);
    }

    #[test]
    fn errors_and_unterminated_spans_stay_text() {
        let nodes = build(vec![text("a {% 42 %} b {% open")]);
        assert_eq!(vec![Node::text("a {% 42 %} b {% open")], nodes);
    }

    #[test]
    fn code_is_not_scanned() {
        let nodes = build(vec![
            text("use "),
            Token::atomic(TokenKind::CodeInline, "{% x %}"),
        ]);
        assert_eq!(vec![Node::text("use {% x %}")], nodes);
    }

    #[test]
    fn annotations_merge_into_parent() {
        let mut class = Attributes::new();
        class.insert("class".into(), "a".into());
        let mut paragraph = Node::new_with_attributes(NodeKind::Paragraph, class);
        paragraph.children = build(vec![text("Title {% .b #x %} {% .c #y %}  ")]);

        apply_annotations(&mut paragraph);

        assert_eq!(Some(&Value::from("a b c")), paragraph.attribute("class"));
        assert_eq!(Some(&Value::from("y")), paragraph.attribute("id"));
        assert_eq!(vec![Node::text("Title")], paragraph.children);
    }

    #[test]
    fn annotation_on_following_line() {
        let mut paragraph = Node::new(NodeKind::Paragraph);
        paragraph.children = build(vec![
            text("Some text"),
            Token::atomic(TokenKind::Softbreak, ""),
            text("{% .lead %}"),
        ]);

        apply_annotations(&mut paragraph);

        assert_eq!(Some(&Value::from("lead")), paragraph.attribute("class"));
        assert_eq!(vec![Node::text("Some text")], paragraph.children);
    }
}
