//! Flat, nesting-annotated token stream produced from pulldown-cmark events.

mod tokenizer;

pub use tokenizer::{normalize_block_tags, Tokenizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    Open,
    Close,
    Atomic,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Paragraph,
    Heading(u8),
    Blockquote,
    BulletList,
    OrderedList(u64),
    ListItem,
    Table,
    Thead,
    Tbody,
    Tr,
    Th,
    Td,
    /// Container for the inline tokens of a block, held in [Token::children].
    Inline,
    Fence { info: String },
    CodeBlock,
    Hr,

    Text,
    Softbreak,
    Hardbreak,
    CodeInline,
    Em,
    Strong,
    Link { href: String, title: String },
    /// Alt text is stored in [Token::content].
    Image { src: String, title: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub nesting: Nesting,
    pub content: String,
    pub children: Vec<Token>,
}

impl Token {
    pub fn new(kind: TokenKind, nesting: Nesting) -> Self {
        Token {
            kind,
            nesting,
            content: String::new(),
            children: vec![],
        }
    }

    pub fn open(kind: TokenKind) -> Self {
        Self::new(kind, Nesting::Open)
    }

    pub fn close(kind: TokenKind) -> Self {
        Self::new(kind, Nesting::Close)
    }

    pub fn atomic<S: Into<String>>(kind: TokenKind, content: S) -> Self {
        Token {
            content: content.into(),
            ..Self::new(kind, Nesting::Atomic)
        }
    }
}
