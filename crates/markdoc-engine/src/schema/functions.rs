use crate::config::Config;
use crate::resolve::Resolve;
use crate::schema::TypeSpec;
use dyn_clone::DynClone;
use lazy_static::lazy_static;
use linked_hash_map::LinkedHashMap;
use markdoc_parser::ast::{Attributes, Value};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

/// A plain function, called with positional and keyword arguments.
pub trait Invoke: DynClone + Send + Sync {
    fn call(&self, args: &[Value], kwargs: &Attributes) -> Value;
}

dyn_clone::clone_trait_object!(Invoke);

impl<F> Invoke for F
where
    F: Fn(&[Value], &Attributes) -> Value + Clone + Send + Sync + 'static,
{
    fn call(&self, args: &[Value], kwargs: &Attributes) -> Value {
        self(args, kwargs)
    }
}

impl Debug for dyn Invoke {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Invoke")
    }
}

/// The transform of a descriptor function. Receives the keyword arguments, or
/// `{args: [...]}` when the call has none, together with the active config.
pub trait FunctionTransform: DynClone + Send + Sync {
    fn transform(&self, parameters: &Attributes, config: &Config) -> Value;
}

dyn_clone::clone_trait_object!(FunctionTransform);

impl<F> FunctionTransform for F
where
    F: Fn(&Attributes, &Config) -> Value + Clone + Send + Sync + 'static,
{
    fn transform(&self, parameters: &Attributes, config: &Config) -> Value {
        self(parameters, config)
    }
}

impl Debug for dyn FunctionTransform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("FunctionTransform")
    }
}

/// Parameter metadata used by the validator. Parameters named by a number refer to
/// positional arguments.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParameterDef {
    pub required: bool,
    #[serde(rename = "type")]
    pub type_: Option<TypeSpec>,
}

impl ParameterDef {
    pub fn required() -> Self {
        ParameterDef {
            required: true,
            type_: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FunctionDef {
    Plain(Box<dyn Invoke>),
    Descriptor {
        transform: Box<dyn FunctionTransform>,
        parameters: LinkedHashMap<String, ParameterDef>,
    },
}

impl FunctionDef {
    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(&[Value], &Attributes) -> Value + Clone + Send + Sync + 'static,
    {
        FunctionDef::Plain(Box::new(f))
    }

    pub fn descriptor<F>(f: F) -> Self
    where
        F: Fn(&Attributes, &Config) -> Value + Clone + Send + Sync + 'static,
    {
        FunctionDef::Descriptor {
            transform: Box::new(f),
            parameters: LinkedHashMap::new(),
        }
    }

    /// Adds parameter metadata. Has no effect on plain functions.
    pub fn with_parameter<S: Into<String>>(mut self, name: S, definition: ParameterDef) -> Self {
        if let FunctionDef::Descriptor { parameters, .. } = &mut self {
            parameters.insert(name.into(), definition);
        }
        self
    }

    pub fn parameters(&self) -> Option<&LinkedHashMap<String, ParameterDef>> {
        match self {
            FunctionDef::Plain(_) => None,
            FunctionDef::Descriptor { parameters, .. } => Some(parameters),
        }
    }

    pub fn call(&self, args: &[Value], kwargs: &Attributes, config: &Config) -> Value {
        match self {
            FunctionDef::Plain(f) => f.call(args, kwargs),
            FunctionDef::Descriptor { transform, .. } => {
                if kwargs.is_empty() {
                    let mut parameters = Attributes::new();
                    parameters.insert("args".into(), Value::Array(args.to_vec()));
                    transform.transform(&parameters, config)
                } else {
                    transform.transform(kwargs, config)
                }
            }
        }
    }
}

/// Positional view of descriptor parameters, resolved against the config.
fn positional(parameters: &Attributes, config: &Config) -> Vec<Value> {
    match parameters.get("args") {
        Some(Value::Array(args)) if parameters.len() == 1 => {
            args.iter().map(|a| a.resolve(config)).collect()
        }
        _ => parameters.values().map(|v| v.resolve(config)).collect(),
    }
}

fn first(parameters: &Attributes, config: &Config) -> Value {
    positional(parameters, config)
        .into_iter()
        .next()
        .unwrap_or_default()
}

fn and(parameters: &Attributes, config: &Config) -> Value {
    Value::Bool(positional(parameters, config).iter().all(Value::is_truthy))
}

fn or(parameters: &Attributes, config: &Config) -> Value {
    Value::Bool(positional(parameters, config).iter().any(Value::is_truthy))
}

fn not(parameters: &Attributes, config: &Config) -> Value {
    Value::Bool(!first(parameters, config).is_truthy())
}

fn equals(parameters: &Attributes, config: &Config) -> Value {
    let values = positional(parameters, config);
    Value::Bool(values.windows(2).all(|pair| pair[0] == pair[1]))
}

fn default(parameters: &Attributes, config: &Config) -> Value {
    let mut values = positional(parameters, config).into_iter();
    match values.next() {
        Some(value) if !value.is_null() => value,
        _ => values.next().unwrap_or_default(),
    }
}

fn debug(parameters: &Attributes, config: &Config) -> Value {
    let value = first(parameters, config);
    Value::String(serde_json::to_string_pretty(&value).unwrap_or_default())
}

lazy_static! {
    static ref FUNCTIONS: HashMap<String, FunctionDef> = {
        let mut functions = HashMap::new();
        functions.insert("and".to_string(), FunctionDef::descriptor(and));
        functions.insert("or".to_string(), FunctionDef::descriptor(or));
        functions.insert(
            "not".to_string(),
            FunctionDef::descriptor(not).with_parameter("0", ParameterDef::required()),
        );
        functions.insert("equals".to_string(), FunctionDef::descriptor(equals));
        functions.insert("default".to_string(), FunctionDef::descriptor(default));
        functions.insert("debug".to_string(), FunctionDef::descriptor(debug));
        functions
    };
}

/// The standard function library merged into every config.
pub fn std_functions() -> &'static HashMap<String, FunctionDef> {
    &FUNCTIONS
}
