//! Quote-aware search for the `%}` that closes a `{%` span.

pub const OPEN: &str = "{%";
pub const CLOSE: &str = "%}";

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Normal,
    InString,
    AfterBackslash,
}

/// Returns the byte offset of the `%}` matching the `{%` at `start`.
///
/// A `"` toggles string mode, and inside a string a backslash escapes exactly one character.
/// The close delimiter only counts outside of strings, so attribute values may contain `%}`.
pub fn find_tag_end(content: &str, start: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut state = State::Normal;
    let mut pos = start + OPEN.len();

    while pos < bytes.len() {
        let b = bytes[pos];
        state = match state {
            State::InString => match b {
                b'\\' => State::AfterBackslash,
                b'"' => State::Normal,
                _ => State::InString,
            },
            State::AfterBackslash => State::InString,
            State::Normal => {
                if b == b'"' {
                    State::InString
                } else if b == b'%' && bytes.get(pos + 1) == Some(&b'}') {
                    return Some(pos);
                } else {
                    State::Normal
                }
            }
        };
        pos += 1;
    }
    None
}

/// True when the trimmed text is exactly one `{% ... %}` span.
pub fn is_single_tag(text: &str) -> bool {
    let trimmed = text.trim();
    if !trimmed.starts_with(OPEN) || !trimmed.ends_with(CLOSE) {
        return false;
    }
    find_tag_end(trimmed, 0).map_or(false, |end| end + CLOSE.len() == trimmed.len())
}

/// The text between the delimiters of a single-span line.
pub fn single_tag_inner(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if is_single_tag(trimmed) {
        Some(&trimmed[OPEN.len()..trimmed.len() - CLOSE.len()])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple() {
        assert_eq!(Some(8), find_tag_end("{% note %}", 0));
    }

    #[test]
    fn delimiter_in_string() {
        let input = r#"{% note title="50%} off" %} rest"#;
        assert_eq!(Some(25), find_tag_end(input, 0));
    }

    #[test]
    fn escaped_quote_in_string() {
        let input = r#"{% note title="a \"%}\" b" %}"#;
        assert_eq!(Some(input.len() - 2), find_tag_end(input, 0));
    }

    #[test]
    fn offset_start() {
        let input = "text {% a %} more {% b %}";
        assert_eq!(Some(10), find_tag_end(input, 5));
        assert_eq!(Some(23), find_tag_end(input, 18));
    }

    #[test]
    fn unterminated() {
        assert_eq!(None, find_tag_end("{% note", 0));
        assert_eq!(None, find_tag_end(r#"{% note title="%}"#, 0));
    }

    #[test]
    fn open_delimiter_does_not_close_itself() {
        assert_eq!(None, find_tag_end("{%}", 0));
        assert!(!is_single_tag("{%}"));
    }

    #[test]
    fn single_tag_lines() {
        assert!(is_single_tag("  {% note %}\n"));
        assert!(is_single_tag(r#"{% note title="%}" %}"#));
        assert!(!is_single_tag("{% a %} and {% b %}"));
        assert!(!is_single_tag("text {% a %}"));
        assert_eq!(Some(" /note "), single_tag_inner("{% /note %}"));
    }
}
