use markdoc_parser::ast::{Attributes, Tag, Value};
use std::fmt::Write;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Escapes text for use in element content and double quoted attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Serializes a render tree to an HTML string.
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => out.push_str(&escape(s)),
        Value::Int(_) | Value::Float(_) | Value::Bool(_) => {
            let _ = write!(out, "{}", value);
        }
        Value::Array(items) => items.iter().for_each(|v| write_value(v, out)),
        Value::Tag(tag) => write_tag(tag, out),
        Value::Null | Value::Object(_) | Value::Variable(_) | Value::Function(_) => {}
    }
}

fn write_tag(tag: &Tag, out: &mut String) {
    out.push('<');
    out.push_str(&tag.name);
    write_attributes(&tag.attributes, out);
    out.push('>');

    if is_void(&tag.name) {
        return;
    }

    tag.children.iter().for_each(|c| write_value(c, out));
    let _ = write!(out, "</{}>", tag.name);
}

fn write_attributes(attributes: &Attributes, out: &mut String) {
    for (key, value) in attributes {
        let rendered = match value {
            Value::Null | Value::Bool(false) => continue,
            Value::Bool(true) => {
                let _ = write!(out, " {}", key);
                continue;
            }
            Value::String(s) => s.clone(),
            Value::Int(_) | Value::Float(_) => value.to_string(),
            Value::Array(items) => items
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            _ => continue,
        };
        let _ = write!(out, " {}=\"{}\"", key, escape(&rendered));
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

    #[test]
    fn escapes_text() {
        let value = Value::Tag(Tag::new_with_children(
            "p",
            vec![r#"<tag> & "quote""#.into()],
        ));

        assert_eq!(
            "<p>&lt;tag&gt; &amp; &quot;quote&quot;</p>",
            render(&value)
        );
    }

    #[test]
    fn escapes_attributes() {
        let value = Value::Tag(Tag::new(
            "note",
            attrs(vec![("title", "A & B".into())]),
            vec!["Body".into()],
        ));

        assert_eq!(r#"<note title="A &amp; B">Body</note>"#, render(&value));
    }

    #[test]
    fn nested_elements() {
        let value = Value::Tag(Tag::new_with_children(
            "p",
            vec![Value::Tag(Tag::new_with_children(
                "note",
                vec![
                    "Hello ".into(),
                    Value::Tag(Tag::new_with_children("tag", vec!["World".into()])),
                ],
            ))],
        ));

        assert_eq!("<p><note>Hello <tag>World</tag></note></p>", render(&value));
    }

    #[test]
    fn void_elements_and_attribute_values() {
        let value = Value::Array(vec![
            Value::Tag(Tag::new(
                "img",
                attrs(vec![("src", "a.png".into()), ("alt", Value::Null)]),
                vec![],
            )),
            Value::Tag(Tag::new_with_children("br", vec![])),
            Value::Tag(Tag::new(
                "input",
                attrs(vec![
                    ("checked", Value::Bool(true)),
                    ("disabled", Value::Bool(false)),
                    ("class", Value::Array(vec!["a".into(), "b".into()])),
                    ("size", Value::Int(3)),
                ]),
                vec![],
            )),
        ]);

        assert_eq!(
            r#"<img src="a.png"><br><input checked class="a b" size="3">"#,
            render(&value)
        );
    }

    #[test]
    fn scalars_and_skipped_values() {
        let value = Value::Array(vec![
            "Total ".into(),
            Value::Int(3),
            Value::Null,
            Value::Bool(true),
            Value::Object(Attributes::new()),
        ]);

        assert_eq!("Total 3true", render(&value));
    }
}
