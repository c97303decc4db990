const DELIMITER: &str = "---";

/// Splits a leading `---` delimited front matter block from the document body.
///
/// Returns the raw front matter (without delimiters) and the remaining source. Documents
/// without a closed front matter block are returned unchanged.
pub fn split_frontmatter(source: &str) -> (Option<&str>, &str) {
    let mut lines = source.split_inclusive('\n');
    match lines.next() {
        Some(first) if first.trim_end() == DELIMITER => {}
        _ => return (None, source),
    }

    let start = source.find('\n').map_or(source.len(), |i| i + 1);
    let mut offset = start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let frontmatter = &source[start..offset];
            let body = &source[offset + line.len()..];
            return (Some(frontmatter), body);
        }
        offset += line.len();
    }

    (None, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_frontmatter() {
        let (meta, body) = split_frontmatter("---\ntitle: Hi\n---\n# Body\n");
        assert_eq!(Some("title: Hi\n"), meta);
        assert_eq!("# Body\n", body);
    }

    #[test]
    fn empty_frontmatter() {
        let (meta, body) = split_frontmatter("---\n---\ntext");
        assert_eq!(Some(""), meta);
        assert_eq!("text", body);
    }

    #[test]
    fn unclosed_is_body() {
        let input = "---\ntitle: Hi\n\nno end";
        assert_eq!((None, input), split_frontmatter(input));
    }

    #[test]
    fn no_frontmatter() {
        let input = "# Title\n---\n";
        assert_eq!((None, input), split_frontmatter(input));
    }
}
