/// Tokens of the tag language.
#[derive(Debug, Clone, PartialEq)]
pub enum TagToken {
    /// One of `= , [ ] ( ) { } : . #`
    Symbol(char),
    Dollar,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    Ident(String),
}

impl TagToken {
    pub fn is_symbol(&self, c: char) -> bool {
        matches!(self, TagToken::Symbol(s) if *s == c)
    }

    pub fn ident(&self) -> Option<&str> {
        if let TagToken::Ident(s) = self {
            Some(s)
        } else {
            None
        }
    }
}

const SYMBOLS: &[char] = &['=', ',', '[', ']', '(', ')', '{', '}', ':'];

/// Cursor-based tokenizer over the text between `{%` and `%}`. Never fails: characters it
/// does not understand are skipped.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn next_is_digit(&self) -> bool {
        self.peek_at(1).map_or(false, |c| c.is_ascii_digit())
    }

    pub fn tokenize(mut self) -> Vec<TagToken> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if SYMBOLS.contains(&c) {
                tokens.push(TagToken::Symbol(c));
                self.pos += 1;
            } else if c == '.' || c == '#' {
                if self.next_is_digit() {
                    if c == '#' {
                        self.pos += 1;
                    }
                    tokens.extend(self.read_number());
                } else {
                    tokens.push(TagToken::Symbol(c));
                    self.pos += 1;
                }
            } else if c == '$' {
                tokens.push(TagToken::Dollar);
                self.pos += 1;
            } else if c == '"' || c == '\'' {
                tokens.push(TagToken::String(self.read_string()));
            } else if c.is_ascii_digit() || (c == '-' && self.next_is_digit()) {
                tokens.extend(self.read_number());
            } else if c.is_alphabetic() || c == '_' || c == '-' {
                let ident = self.read_identifier();
                tokens.push(match ident.as_str() {
                    "true" => TagToken::Boolean(true),
                    "false" => TagToken::Boolean(false),
                    "null" => TagToken::Null,
                    _ => TagToken::Ident(ident),
                });
            } else {
                self.pos += 1;
            }
        }

        tokens
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn skip_digits(&mut self) {
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn read_number(&mut self) -> Option<TagToken> {
        let start = self.pos;
        let mut is_float = false;

        if self.peek() == Some('-') {
            self.pos += 1;
        }
        self.skip_digits();

        if self.peek() == Some('.') {
            is_float = true;
            self.pos += 1;
            self.skip_digits();
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let exponent_digits = match self.peek_at(1) {
                Some('+') | Some('-') => 2,
                _ => 1,
            };
            if self
                .peek_at(exponent_digits)
                .map_or(false, |c| c.is_ascii_digit())
            {
                is_float = true;
                self.pos += exponent_digits;
                self.skip_digits();
            }
        }

        let mut text: String = self.chars[start..self.pos].iter().collect();
        if text.starts_with('.') {
            text.insert(0, '0');
        }

        if is_float {
            text.parse().ok().map(TagToken::Float)
        } else {
            text.parse()
                .map(TagToken::Integer)
                .or_else(|_| text.parse().map(TagToken::Float))
                .ok()
        }
    }

    fn read_string(&mut self) -> String {
        let quote = self.chars[self.pos];
        self.pos += 1;
        let mut value = String::new();

        while let Some(c) = self.peek() {
            if c == quote {
                self.pos += 1;
                return value;
            }
            if c == '\\' {
                if let Some(escaped) = self.peek_at(1) {
                    value.push(match escaped {
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        other => other,
                    });
                    self.pos += 2;
                    continue;
                }
            }
            value.push(c);
            self.pos += 1;
        }

        value
    }
}

pub fn tokenize(input: &str) -> Vec<TagToken> {
    Lexer::new(input).tokenize()
}
