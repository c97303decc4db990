//! The `{% ... %}` tag language: delimiter scanning, lexing and the tag grammar.

pub mod lexer;
pub mod parser;
pub mod scanner;

pub use parser::parse_tag;
pub use scanner::{find_tag_end, is_single_tag, single_tag_inner};

use crate::ast::{Attributes, Value};

/// Result of parsing the content of one `{% ... %}` span.
#[derive(Debug, Clone, PartialEq)]
pub enum TagInfo {
    Open { name: String, attributes: Attributes },
    SelfClosing { name: String, attributes: Attributes },
    Close { name: Option<String> },
    /// Attributes attached to the enclosing block, e.g. `{% .hero #top %}`.
    Annotation { attributes: Attributes },
    /// A `$variable` or `function(...)` whose value is inserted in place.
    Interpolation(Value),
    Error,
}
