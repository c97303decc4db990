use crate::ast::{Attributes, Function, Value, Variable};
use crate::tag::lexer::{tokenize, TagToken};
use crate::tag::TagInfo;

/// Recursive descent over an immutable token slice. Every rule either consumes input or
/// reports that it could not, so callers can always skip ahead.
struct TagParser<'a> {
    tokens: &'a [TagToken],
    pos: usize,
}

impl<'a> TagParser<'a> {
    fn new(tokens: &'a [TagToken]) -> Self {
        TagParser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a TagToken> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a TagToken> {
        self.tokens.get(self.pos + offset)
    }

    fn at_symbol(&self, c: char) -> bool {
        self.peek().map_or(false, |t| t.is_symbol(c))
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// `ident =` at the cursor.
    fn at_key(&self) -> Option<&'a str> {
        let key = self.peek()?.ident()?;
        self.peek_at(1)
            .filter(|t| t.is_symbol('='))
            .map(|_| key)
    }

    fn skip_comma(&mut self) {
        if self.at_symbol(',') {
            self.pos += 1;
        }
    }

    /// Parses one value. Returns `None` without consuming anything when the cursor is not at
    /// the start of a value.
    fn value(&mut self) -> Option<Value> {
        let value = match self.peek()? {
            TagToken::String(s) => Value::String(s.clone()),
            TagToken::Integer(i) => Value::Int(*i),
            TagToken::Float(f) => Value::Float(*f),
            TagToken::Boolean(b) => Value::Bool(*b),
            TagToken::Null => Value::Null,
            TagToken::Dollar => {
                let name = self.peek_at(1)?.ident()?;
                self.pos += 2;
                return Some(Value::Variable(Variable::new(name)));
            }
            TagToken::Ident(name) => {
                if self.peek_at(1).map_or(false, |t| t.is_symbol('(')) {
                    return self.function().map(Value::Function);
                }
                Value::String(name.clone())
            }
            TagToken::Symbol('[') => {
                self.pos += 1;
                return Some(self.array());
            }
            TagToken::Symbol('{') => {
                self.pos += 1;
                return Some(self.object());
            }
            TagToken::Symbol(_) => return None,
        };
        self.pos += 1;
        Some(value)
    }

    fn array(&mut self) -> Value {
        let mut items = Vec::new();
        while let Some(token) = self.peek() {
            if token.is_symbol(']') {
                self.pos += 1;
                break;
            }
            match self.value() {
                Some(v) => items.push(v),
                None => self.pos += 1,
            }
            self.skip_comma();
        }
        Value::Array(items)
    }

    fn object(&mut self) -> Value {
        let mut entries = Attributes::new();
        while let Some(token) = self.peek() {
            if token.is_symbol('}') {
                self.pos += 1;
                break;
            }
            let key = match token {
                TagToken::Ident(k) | TagToken::String(k) => Some(k.clone()),
                _ => None,
            };
            match key {
                Some(key) if self.peek_at(1).map_or(false, |t| t.is_symbol(':')) => {
                    self.pos += 2;
                    let value = self.value().unwrap_or_default();
                    entries.insert(key, value);
                    self.skip_comma();
                }
                _ => self.pos += 1,
            }
        }
        Value::Object(entries)
    }

    /// `ident ( ... )`. An unterminated argument list still yields the call.
    fn function(&mut self) -> Option<Function> {
        let name = self.peek()?.ident()?;
        if !self.peek_at(1)?.is_symbol('(') {
            return None;
        }
        self.pos += 2;

        let mut args = Vec::new();
        let mut kwargs = Attributes::new();
        while let Some(token) = self.peek() {
            if token.is_symbol(')') {
                self.pos += 1;
                break;
            }
            if let Some(key) = self.at_key() {
                self.pos += 2;
                kwargs.insert(key.to_string(), self.value().unwrap_or_default());
            } else {
                match self.value() {
                    // A literal null cannot be told apart from a failed parse here.
                    Some(Value::Null) => {}
                    Some(v) => args.push(v),
                    None => self.pos += 1,
                }
            }
            self.skip_comma();
        }

        Some(Function::new(name, args, kwargs))
    }

    /// `$ident` or `ident(...)` spanning the whole token list.
    fn interpolation(&mut self) -> Option<Value> {
        match self.tokens {
            [TagToken::Dollar, TagToken::Ident(name)] => {
                Some(Value::Variable(Variable::new(name.as_str())))
            }
            [TagToken::Ident(_), TagToken::Symbol('('), ..] => {
                let func = self.function()?;
                self.at_end().then(|| Value::Function(func))
            }
            _ => None,
        }
    }

    fn attributes(&mut self, attributes: &mut Attributes, classes: &mut Vec<String>) {
        while let Some(token) = self.peek() {
            if token.is_symbol('.') || token.is_symbol('#') {
                if let Some(ident) = self.peek_at(1).and_then(|t| t.ident()) {
                    if token.is_symbol('.') {
                        classes.push(ident.to_string());
                    } else {
                        attributes.insert("id".into(), Value::String(ident.to_string()));
                    }
                    self.pos += 2;
                } else {
                    self.pos += 1;
                }
                continue;
            }

            if let Some(key) = self.at_key() {
                self.pos += 2;
                match self.value() {
                    Some(Value::Null) | None => {}
                    Some(value) => {
                        attributes.insert(key.to_string(), value);
                    }
                }
                continue;
            }

            self.pos += 1;
        }
    }
}

/// Parses the text between `{%` and `%}` into a [TagInfo]. Never fails; content that is not
/// a tag, annotation or interpolation produces [TagInfo::Error].
pub fn parse_tag(inner: &str) -> TagInfo {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return TagInfo::Error;
    }

    if let Some(rest) = trimmed.strip_prefix('/') {
        let name = tokenize(rest)
            .into_iter()
            .find_map(|t| t.ident().map(str::to_string));
        return TagInfo::Close { name };
    }

    let (body, self_closing) = match trimmed.strip_suffix('/') {
        Some(body) => (body.trim_end(), true),
        None => (trimmed, false),
    };

    let tokens = tokenize(body);
    if tokens.is_empty() {
        return TagInfo::Error;
    }

    let mut parser = TagParser::new(&tokens);
    if let Some(value) = parser.interpolation() {
        return TagInfo::Interpolation(value);
    }
    parser.pos = 0;

    let name = match tokens.as_slice() {
        [TagToken::Ident(_), next, ..] if next.is_symbol('=') || next.is_symbol('(') => None,
        [TagToken::Ident(name), ..] => {
            parser.pos = 1;
            Some(name.clone())
        }
        _ => None,
    };

    let mut attributes = Attributes::new();
    let mut classes = Vec::new();

    if name.is_some() && !parser.at_end() {
        let shorthand = parser.at_symbol('.') || parser.at_symbol('#');
        if !shorthand && parser.at_key().is_none() {
            let start = parser.pos;
            match parser.value() {
                Some(Value::Null) | None => parser.pos = start,
                Some(primary) => {
                    attributes.insert("primary".into(), primary);
                }
            }
        }
    }

    parser.attributes(&mut attributes, &mut classes);

    if !classes.is_empty() {
        attributes.insert("class".into(), Value::String(classes.join(" ")));
    }

    match name {
        None if attributes.is_empty() => TagInfo::Error,
        None => TagInfo::Annotation { attributes },
        Some(name) if self_closing || name == "else" => TagInfo::SelfClosing { name, attributes },
        Some(name) => TagInfo::Open { name, attributes },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: Vec<(&str, Value)>) -> Attributes {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    macro_rules! tag_tests {
        ($($name:ident: $value:expr,)*) => {
        $(
            paste::item! {
            #[test]
            fn [<parse_ $name>]() {
                let (input, expected): (&str, TagInfo) = $value;
                assert_eq!(expected, parse_tag(input));
            }
            }
        )*
        }
    }

    tag_tests! {
        empty: ("   ", TagInfo::Error),
        open: (" note ", TagInfo::Open { name: "note".into(), attributes: Attributes::new() }),
        close: ("/note", TagInfo::Close { name: Some("note".into()) }),
        close_without_name: ("/", TagInfo::Close { name: None }),
        self_closing: ("image src=\"a.png\" /", TagInfo::SelfClosing {
            name: "image".into(),
            attributes: attrs(vec![("src", "a.png".into())]),
        }),
        else_is_self_closing: ("else", TagInfo::SelfClosing {
            name: "else".into(), attributes: Attributes::new(),
        }),
        primary_variable: ("if $flag", TagInfo::Open {
            name: "if".into(),
            attributes: attrs(vec![("primary", Value::Variable(Variable::new("flag")))]),
        }),
        primary_string: ("callout \"warn\" title='T'", TagInfo::Open {
            name: "callout".into(),
            attributes: attrs(vec![("primary", "warn".into()), ("title", "T".into())]),
        }),
        shorthand_only: (".hero .big #main", TagInfo::Annotation {
            attributes: attrs(vec![("id", "main".into()), ("class", "hero big".into())]),
        }),
        shorthand_after_name: ("note .wide #n1 #n2", TagInfo::Open {
            name: "note".into(),
            attributes: attrs(vec![("id", "n2".into()), ("class", "wide".into())]),
        }),
        key_value_without_name: ("width=10", TagInfo::Annotation {
            attributes: attrs(vec![("width", Value::Int(10))]),
        }),
        variable_interpolation: ("$user", TagInfo::Interpolation(Value::Variable(Variable::new("user")))),
        function_interpolation: ("sum(1, 2)", TagInfo::Interpolation(Value::Function(Function::new(
            "sum", vec![Value::Int(1), Value::Int(2)], Attributes::new(),
        )))),
        nameless_literal: ("42", TagInfo::Error),
        null_attribute_is_dropped: ("card key=null /", TagInfo::SelfClosing {
            name: "card".into(),
            attributes: Attributes::new(),
        }),
        null_attribute_keeps_others: ("note a=null b=1", TagInfo::Open {
            name: "note".into(),
            attributes: attrs(vec![("b", Value::Int(1))]),
        }),
    }

    #[test]
    fn function_arguments() {
        let info = parse_tag("fmt($a, null, [1, 2], sep=\", \", opts={x: true, 'y': $b})");
        let expected = Function::new(
            "fmt",
            vec![
                Value::Variable(Variable::new("a")),
                Value::Array(vec![Value::Int(1), Value::Int(2)]),
            ],
            attrs(vec![
                ("sep", ", ".into()),
                (
                    "opts",
                    Value::Object(attrs(vec![
                        ("x", Value::Bool(true)),
                        ("y", Value::Variable(Variable::new("b"))),
                    ])),
                ),
            ]),
        );
        assert_eq!(TagInfo::Interpolation(Value::Function(expected)), info);
    }

    #[test]
    fn nested_function_as_attribute() {
        let info = parse_tag("if equals($a, 1)");
        let expected = Function::new(
            "equals",
            vec![Value::Variable(Variable::new("a")), Value::Int(1)],
            Attributes::new(),
        );
        assert_eq!(
            TagInfo::Open {
                name: "if".into(),
                attributes: attrs(vec![("primary", Value::Function(expected))]),
            },
            info
        );
    }

    #[test]
    fn trailing_tokens_break_interpolation() {
        let info = parse_tag("$a $b");
        assert_eq!(TagInfo::Error, info);
    }

    #[test]
    fn malformed_structures_terminate() {
        assert!(matches!(
            parse_tag("note x=[ ) , ] y={ ] : , }"),
            TagInfo::Open { .. }
        ));
        assert_eq!(TagInfo::Error, parse_tag("f( ) ] ("));
        assert!(matches!(
            parse_tag("note data=[1, (, 2"),
            TagInfo::Open { .. }
        ));
    }

    #[test]
    fn delimiter_characters_in_values() {
        let info = parse_tag(r#"note title="50%} off""#);
        assert_eq!(
            TagInfo::Open {
                name: "note".into(),
                attributes: attrs(vec![("title", "50%} off".into())]),
            },
            info
        );
    }
}
