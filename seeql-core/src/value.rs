use crate::graph::ElementRef;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(value) => *value as f64,
            Number::Float(value) => *value,
        }
    }

    /// Keeps the representation; `i64::MIN` saturates.
    pub fn negate(self) -> Number {
        match self {
            Number::Integer(value) => Number::Integer(value.saturating_neg()),
            Number::Float(value) => Number::Float(-value),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(value) => write!(f, "{value}"),
            Number::Float(value) => write!(f, "{value:?}"),
        }
    }
}

/// Runtime value produced by evaluating an expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(Number),
    Text(String),
    Element(ElementRef),
    Null,
}

impl Value {
    pub fn integer(value: i64) -> Self {
        Value::Number(Number::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<ElementRef> {
        match self {
            Value::Element(element) => Some(*element),
            _ => None,
        }
    }

    /// Short kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Number(Number::Integer(_)) => "integer",
            Value::Number(Number::Float(_)) => "float",
            Value::Text(_) => "text",
            Value::Element(ElementRef::Node(_)) => "node",
            Value::Element(ElementRef::Edge(_)) => "edge",
            Value::Null => "null",
        }
    }

    /// Value equality: numbers compare numerically across representations
    /// and `Null` equals `Null`.
    pub fn value_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
            _ => self == other,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<ElementRef> for Value {
    fn from(value: ElementRef) -> Self {
        Value::Element(value)
    }
}

/// Assignment of pattern variables to graph elements, in assignment order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Binding {
    entries: Vec<(String, ElementRef)>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<ElementRef> {
        self.entries
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, element)| *element)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns false and leaves the binding untouched if `name` is already bound.
    pub fn bind(&mut self, name: &str, element: ElementRef) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push((name.to_string(), element));
        true
    }

    pub(crate) fn unbind(&mut self, name: &str) {
        self.entries.retain(|(bound, _)| bound != name);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ElementRef)> {
        self.entries
            .iter()
            .map(|(name, element)| (name.as_str(), *element))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, ElementRef)> for Binding {
    fn from_iter<T: IntoIterator<Item = (S, ElementRef)>>(iter: T) -> Self {
        let mut binding = Binding::new();
        for (name, element) in iter {
            let name = name.into();
            binding.bind(&name, element);
        }
        binding
    }
}
