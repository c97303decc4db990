use crate::config::Config;
use crate::schema::{FunctionDef, Schema};
use markdoc_parser::ast::visitor::AstVisitor;
use markdoc_parser::ast::{Function, Node, Value};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticId {
    MissingAttribute,
    InvalidAttribute,
    AttributeValueInvalid,
    MissingParameter,
    InvalidParameter,
}

impl DiagnosticId {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticId::MissingAttribute => "missing-attribute",
            DiagnosticId::InvalidAttribute => "invalid-attribute",
            DiagnosticId::AttributeValueInvalid => "attribute-value-invalid",
            DiagnosticId::MissingParameter => "missing-parameter",
            DiagnosticId::InvalidParameter => "invalid-parameter",
        }
    }
}

impl Display for DiagnosticId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub id: DiagnosticId,
    pub level: Level,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required attribute '{0}'")]
    MissingAttribute(String),
    #[error("Invalid type for attribute '{0}'")]
    InvalidAttribute(String),
    #[error("Invalid value for attribute '{key}': {message}")]
    AttributeValueInvalid { key: String, message: String },
    #[error("Missing required parameter '{parameter}' for function '{function}'")]
    MissingParameter { function: String, parameter: String },
    #[error("Invalid type for parameter '{parameter}' of function '{function}'")]
    InvalidParameter { function: String, parameter: String },
}

impl ValidationError {
    pub fn id(&self) -> DiagnosticId {
        match self {
            ValidationError::MissingAttribute(_) => DiagnosticId::MissingAttribute,
            ValidationError::InvalidAttribute(_) => DiagnosticId::InvalidAttribute,
            ValidationError::AttributeValueInvalid { .. } => DiagnosticId::AttributeValueInvalid,
            ValidationError::MissingParameter { .. } => DiagnosticId::MissingParameter,
            ValidationError::InvalidParameter { .. } => DiagnosticId::InvalidParameter,
        }
    }
}

impl From<ValidationError> for Diagnostic {
    fn from(value: ValidationError) -> Self {
        Diagnostic {
            id: value.id(),
            level: Level::Error,
            message: value.to_string(),
        }
    }
}

/// Collects diagnostics for every node whose schema declares attribute contracts.
pub struct Validator<'c> {
    config: &'c Config,
    diagnostics: Vec<Diagnostic>,
}

impl<'c> Validator<'c> {
    pub fn new(config: &'c Config) -> Self {
        Validator {
            config,
            diagnostics: vec![],
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn report(&mut self, error: ValidationError) {
        self.diagnostics.push(error.into());
    }

    fn check_attributes(&mut self, node: &Node, schema: &Schema) {
        for (key, definition) in &schema.attributes {
            let value = match node.attribute(key) {
                Some(value) => value,
                None => {
                    if definition.required {
                        self.report(ValidationError::MissingAttribute(key.clone()));
                    }
                    continue;
                }
            };

            if let Some(type_) = &definition.type_ {
                if !type_.matches(value) {
                    self.report(ValidationError::InvalidAttribute(key.clone()));
                    continue;
                }
            }

            if let Some(message) = definition
                .check
                .as_ref()
                .and_then(|check| check.check(value, self.config))
            {
                self.report(ValidationError::AttributeValueInvalid {
                    key: key.clone(),
                    message,
                });
            }
        }
    }

    fn check_value(&mut self, value: &Value) {
        match value {
            Value::Function(function) => {
                self.check_function(function);
                function.args.iter().for_each(|v| self.check_value(v));
                function.kwargs.values().for_each(|v| self.check_value(v));
            }
            Value::Array(items) => items.iter().for_each(|v| self.check_value(v)),
            Value::Object(entries) => entries.values().for_each(|v| self.check_value(v)),
            _ => {}
        }
    }

    fn check_function(&mut self, function: &Function) {
        let config = self.config;
        let parameters = match config.functions.get(&function.name) {
            Some(FunctionDef::Descriptor { parameters, .. }) => parameters,
            _ => return,
        };

        for (name, definition) in parameters {
            let argument = match name.parse::<usize>() {
                Ok(index) => function.args.get(index),
                Err(_) => None,
            }
            .or_else(|| function.kwargs.get(name));

            match argument {
                None if definition.required => self.report(ValidationError::MissingParameter {
                    function: function.name.clone(),
                    parameter: name.clone(),
                }),
                Some(value) => {
                    if let Some(type_) = &definition.type_ {
                        if !type_.matches(value) {
                            self.report(ValidationError::InvalidParameter {
                                function: function.name.clone(),
                                parameter: name.clone(),
                            });
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

impl AstVisitor for Validator<'_> {
    fn visit_node(&mut self, node: &Node) {
        let config = self.config;
        if let Some(schema) = config.find_schema(node) {
            self.check_attributes(node, schema);
        }
        self.walk_node(node)
    }

    fn visit_attribute(&mut self, _node: &Node, _key: &str, value: &Value) {
        self.check_value(value)
    }
}

/// Validates a tree against the config merged with the default catalogs.
pub fn validate(node: &Node, config: &Config) -> Vec<Diagnostic> {
    let config = config.merged();
    let mut validator = Validator::new(&config);
    validator.visit_node(node);
    validator.into_diagnostics()
}
