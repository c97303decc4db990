//! Schema driven processing of markdoc ASTs: variable and function resolution, transformation
//! into a render tree, validation against attribute contracts and HTML output.

pub mod config;
pub mod renderers;
pub mod resolve;
pub mod schema;
pub mod transform;
pub mod validator;

pub use markdoc_parser::ast;

pub use config::{merge_config, Config};
pub use resolve::Resolve;
pub use schema::{AttributeDef, AttributeType, FunctionDef, ParameterDef, Render, Schema, TypeSpec};
pub use transform::transform;
pub use validator::{validate, Diagnostic, DiagnosticId, ValidationError};
