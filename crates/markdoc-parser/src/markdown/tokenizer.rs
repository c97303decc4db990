use crate::markdown::{Nesting, Token, TokenKind};
use crate::tag::{parse_tag, single_tag_inner, TagInfo};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use std::ops::Range;
use tracing::{debug, trace};

/// Width of a line's leading whitespace, with tabs stopping at multiples of four.
fn indentation(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => break,
        }
    }
    width
}

/// A line holding nothing but an opening, closing or self-closing tag. Interpolations and
/// annotations stay part of the surrounding paragraph, and lines indented as code are skipped.
fn is_block_tag_line(line: &str) -> bool {
    if indentation(line) >= 4 {
        return false;
    }
    matches!(
        single_tag_inner(line).map(parse_tag),
        Some(TagInfo::Open { .. } | TagInfo::SelfClosing { .. } | TagInfo::Close { .. })
    )
}

/// Surrounds every block tag line with blank lines, so block tags always form their own
/// paragraph. Lines inside fenced code are left alone.
pub fn normalize_block_tags(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut fence: Option<&str> = None;
    let mut previous_blank = true;

    for line in source.lines() {
        let trimmed = line.trim();

        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
        } else if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            fence = Some(&trimmed[..3]);
        } else if is_block_tag_line(line) {
            if !previous_blank {
                out.push('\n');
            }
            out.push_str(line);
            out.push_str("\n\n");
            previous_blank = true;
            continue;
        }

        out.push_str(line);
        out.push('\n');
        previous_blank = trimmed.is_empty();
    }

    out
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Adapts pulldown-cmark's event stream to block tokens with nested inline runs.
pub struct Tokenizer<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    inline: Option<Token>,
    image: Option<Token>,
    code: Option<Token>,
    in_head: bool,
    in_body: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Tokenizer {
            source,
            tokens: vec![],
            inline: None,
            image: None,
            code: None,
            in_head: false,
            in_body: false,
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let parser = Parser::new_ext(self.source, Options::ENABLE_TABLES);
        for (event, range) in parser.into_offset_iter() {
            self.event(event, range);
        }
        self.flush_inline();
        self.tokens
    }

    fn event(&mut self, event: Event, range: Range<usize>) {
        if let Some(code) = self.code.as_mut() {
            match event {
                Event::Text(text) => code.content.push_str(&text),
                Event::End(Tag::CodeBlock(_)) => {
                    if let Some(code) = self.code.take() {
                        self.tokens.push(code);
                    }
                }
                _ => {}
            }
            return;
        }

        if let Some(image) = self.image.as_mut() {
            match event {
                Event::Text(text) | Event::Code(text) => image.content.push_str(&text),
                Event::End(Tag::Image(..)) => {
                    if let Some(image) = self.image.take() {
                        self.push_inline(image);
                    }
                }
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.push_text(&text),
            Event::Html(html) => {
                if self.inline.is_some() {
                    self.push_text(&html);
                } else {
                    debug!("dropping raw html block: {}", html.trim_end());
                }
            }
            Event::Code(code) => self.push_inline(Token::atomic(TokenKind::CodeInline, &*code)),
            Event::SoftBreak => self.push_inline(Token::atomic(TokenKind::Softbreak, "")),
            Event::HardBreak => self.push_inline(Token::atomic(TokenKind::Hardbreak, "")),
            Event::Rule => {
                self.flush_inline();
                self.tokens.push(Token::atomic(TokenKind::Hr, ""));
            }
            other => trace!("ignored event {:?}", other),
        }
    }

    fn start(&mut self, tag: Tag, range: Range<usize>) {
        match tag {
            Tag::Emphasis => self.push_inline(Token::open(TokenKind::Em)),
            Tag::Strong => self.push_inline(Token::open(TokenKind::Strong)),
            Tag::Link(_, href, title) => self.push_inline(Token::open(TokenKind::Link {
                href: href.to_string(),
                title: title.to_string(),
            })),
            Tag::Image(_, src, title) => {
                self.ensure_inline();
                self.image = Some(Token::atomic(
                    TokenKind::Image {
                        src: src.to_string(),
                        title: title.to_string(),
                    },
                    "",
                ));
            }
            Tag::Paragraph => {
                self.flush_inline();
                self.tokens.push(Token::open(TokenKind::Paragraph));
                self.inline = Some(Token::atomic(TokenKind::Inline, &self.source[range]));
            }
            Tag::Heading(level, _, _) => self.open_block(TokenKind::Heading(heading_level(level))),
            Tag::BlockQuote => self.open_block(TokenKind::Blockquote),
            Tag::List(Some(start)) => self.open_block(TokenKind::OrderedList(start)),
            Tag::List(None) => self.open_block(TokenKind::BulletList),
            Tag::Item => self.open_block(TokenKind::ListItem),
            Tag::Table(_) => {
                self.in_body = false;
                self.open_block(TokenKind::Table);
            }
            Tag::TableHead => {
                self.in_head = true;
                self.open_block(TokenKind::Thead);
                self.tokens.push(Token::open(TokenKind::Tr));
            }
            Tag::TableRow => {
                self.flush_inline();
                if !self.in_head && !self.in_body {
                    self.in_body = true;
                    self.tokens.push(Token::open(TokenKind::Tbody));
                }
                self.tokens.push(Token::open(TokenKind::Tr));
            }
            Tag::TableCell => {
                let kind = if self.in_head {
                    TokenKind::Th
                } else {
                    TokenKind::Td
                };
                self.open_block(kind);
                self.inline = Some(Token::atomic(TokenKind::Inline, ""));
            }
            Tag::CodeBlock(kind) => {
                self.flush_inline();
                let kind = match kind {
                    CodeBlockKind::Fenced(info) => TokenKind::Fence {
                        info: info.to_string(),
                    },
                    CodeBlockKind::Indented => TokenKind::CodeBlock,
                };
                self.code = Some(Token::atomic(kind, ""));
            }
            other => trace!("ignored start tag {:?}", other),
        }
    }

    fn end(&mut self, tag: Tag) {
        match tag {
            Tag::Emphasis => self.push_inline(Token::close(TokenKind::Em)),
            Tag::Strong => self.push_inline(Token::close(TokenKind::Strong)),
            Tag::Link(_, href, title) => self.push_inline(Token::close(TokenKind::Link {
                href: href.to_string(),
                title: title.to_string(),
            })),
            Tag::Paragraph => self.close_block(TokenKind::Paragraph),
            Tag::Heading(level, _, _) => {
                self.close_block(TokenKind::Heading(heading_level(level)))
            }
            Tag::BlockQuote => self.close_block(TokenKind::Blockquote),
            Tag::List(Some(start)) => self.close_block(TokenKind::OrderedList(start)),
            Tag::List(None) => self.close_block(TokenKind::BulletList),
            Tag::Item => self.close_block(TokenKind::ListItem),
            Tag::TableHead => {
                self.close_block(TokenKind::Tr);
                self.tokens.push(Token::close(TokenKind::Thead));
                self.in_head = false;
            }
            Tag::TableRow => self.close_block(TokenKind::Tr),
            Tag::TableCell => {
                let kind = if self.in_head {
                    TokenKind::Th
                } else {
                    TokenKind::Td
                };
                self.close_block(kind);
            }
            Tag::Table(_) => {
                self.flush_inline();
                if self.in_body {
                    self.tokens.push(Token::close(TokenKind::Tbody));
                    self.in_body = false;
                }
                self.tokens.push(Token::close(TokenKind::Table));
            }
            other => trace!("ignored end tag {:?}", other),
        }
    }

    fn open_block(&mut self, kind: TokenKind) {
        self.flush_inline();
        self.tokens.push(Token::open(kind));
    }

    fn close_block(&mut self, kind: TokenKind) {
        self.flush_inline();
        self.tokens.push(Token::close(kind));
    }

    fn flush_inline(&mut self) {
        if let Some(inline) = self.inline.take() {
            self.tokens.push(inline);
        }
    }

    /// Tight list items carry their text without a paragraph, so an inline run may have to
    /// be started on demand.
    fn ensure_inline(&mut self) -> &mut Token {
        self.inline
            .get_or_insert_with(|| Token::atomic(TokenKind::Inline, ""))
    }

    fn push_inline(&mut self, token: Token) {
        self.ensure_inline().children.push(token);
    }

    fn push_text(&mut self, text: &str) {
        let inline = self.ensure_inline();
        match inline.children.last_mut() {
            Some(last) if last.kind == TokenKind::Text => last.content.push_str(text),
            _ => inline
                .children
                .push(Token::atomic(TokenKind::Text, text)),
        }
    }
}
