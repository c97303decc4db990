use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Ordered attribute/keyword mapping used throughout the tree.
pub type Attributes = LinkedHashMap<String, Value>;

/// Dynamic values found in tag attributes, function arguments and the render tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    /// Unresolved `$name` reference.
    #[serde(skip_deserializing)]
    Variable(Variable),
    /// Unresolved `name(...)` call.
    #[serde(skip_deserializing)]
    Function(Function),
    /// Render-tree element. Functions may return these to inject markup.
    #[serde(skip_deserializing)]
    Tag(Tag),
    Object(Attributes),
}

/// A `$name` reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "$type")]
pub struct Variable {
    pub name: String,
}

impl Variable {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Variable { name: name.into() }
    }
}

/// A `name(args, key=value)` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "$type")]
pub struct Function {
    pub name: String,
    pub args: Vec<Value>,
    pub kwargs: Attributes,
}

impl Function {
    pub fn new<S: Into<String>>(name: S, args: Vec<Value>, kwargs: Attributes) -> Self {
        Function {
            name: name.into(),
            args,
            kwargs,
        }
    }
}

/// An element of the render tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "$$mdtype")]
pub struct Tag {
    pub name: String,
    pub attributes: Attributes,
    pub children: Vec<Value>,
}

impl Tag {
    pub fn new<S: Into<String>>(name: S, attributes: Attributes, children: Vec<Value>) -> Self {
        Tag {
            name: name.into(),
            attributes,
            children,
        }
    }

    pub fn new_with_children<S: Into<String>>(name: S, children: Vec<Value>) -> Self {
        Self::new(name, Attributes::new(), children)
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Everything except `false` and `null` counts as true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        if let Value::Tag(t) = self {
            Some(t)
        } else {
            None
        }
    }

    pub fn as_object(&self) -> Option<&Attributes> {
        if let Value::Object(o) = self {
            Some(o)
        } else {
            None
        }
    }
}

/// Text form of scalar values. Structured values and references have none.
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                let mut first = true;
                for item in items {
                    if !first {
                        f.write_str(" ")?;
                    }
                    first = false;
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Variable(_) | Value::Function(_) | Value::Tag(_) | Value::Object(_) => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Attributes> for Value {
    fn from(value: Attributes) -> Self {
        Value::Object(value)
    }
}

impl From<Variable> for Value {
    fn from(value: Variable) -> Self {
        Value::Variable(value)
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Value::Function(value)
    }
}

impl From<Tag> for Value {
    fn from(value: Tag) -> Self {
        Value::Tag(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
        assert!(Value::Array(vec![]).is_truthy());
    }

    #[test]
    fn serialize_references() {
        let value = Value::Function(Function::new(
            "sum",
            vec![Value::Variable(Variable::new("a")), Value::Int(2)],
            Attributes::new(),
        ));

        let expected = r#"{"$type":"Function","name":"sum","args":[{"$type":"Variable","name":"a"},2],"kwargs":{}}"#;
        assert_eq!(expected, serde_json::to_string(&value).unwrap());
    }

    #[test]
    fn deserialize_plain_data() {
        let value: Value = serde_json::from_str(r#"{"name": "Ada", "tags": [1, 2.5, true, null]}"#)
            .unwrap();

        let mut expected = Attributes::new();
        expected.insert("name".into(), "Ada".into());
        expected.insert(
            "tags".into(),
            Value::Array(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::Bool(true),
                Value::Null,
            ]),
        );
        assert_eq!(Value::Object(expected), value);
    }
}
