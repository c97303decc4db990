//! Parser for Markdown extended with `{% ... %}` tags, annotations and interpolations.
//!
//! The entry point is [parse], which produces the [ast::Node] tree consumed by the
//! transformation engine.

pub mod ast;
pub mod document;
pub mod markdown;
pub mod parser;
pub mod tag;

use crate::ast::{Node, Value};
use crate::document::split_frontmatter;
use crate::markdown::{normalize_block_tags, Tokenizer};
use crate::parser::DocumentBuilder;

/// Parses a document into its AST. Parsing never fails: malformed tags are kept as text.
///
/// A leading front matter block is stored verbatim in the document's `frontmatter` attribute.
pub fn parse(source: &str) -> Node {
    let (frontmatter, body) = split_frontmatter(source);
    let normalized = normalize_block_tags(body);
    let tokens = Tokenizer::new(&normalized).tokenize();
    let mut document = DocumentBuilder::new().build(&tokens);

    if let Some(frontmatter) = frontmatter {
        document
            .attributes
            .insert("frontmatter".into(), Value::String(frontmatter.to_string()));
    }
    document
}
