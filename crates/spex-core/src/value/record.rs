use crate::value::Value;
use std::{fmt, sync::Arc};

///
/// Record
///
/// One domain object supplied by an object source: a type name plus an
/// ordered list of named field values. Records are immutable once wrapped
/// in a `Value`; pipelines pass the shared `Arc` along untouched.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field assignment; replaces an existing field of the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();

        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// The `Name` field, when the record is a named component.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get("Name").and_then(Value::as_text)
    }

    /// Wrap into a shared value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Record(Arc::new(self))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} '{name}'", self.type_name),
            None => f.write_str(&self.type_name),
        }
    }
}
