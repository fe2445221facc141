use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const UNDEFINED_LITERAL: &str = "undefined";

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Boolean,
    #[serde(rename = "string")]
    Text,
    Enum(Vec<String>),
    List,
    Callback,
}

impl PropertyKind {
    pub fn options(&self) -> Option<Vec<String>> {
        match self {
            PropertyKind::Boolean => Some(vec!["true".to_string(), "false".to_string()]),
            PropertyKind::Enum(options) => Some(options.clone()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct PropertySpec {
    pub name: String,
    /// Type as shown to readers, e.g. `'small' | 'large'`.
    #[serde(rename = "type")]
    pub type_label: String,
    pub kind: PropertyKind,
    /// Default as written in the component's API docs.
    #[serde(default = "undefined_literal")]
    pub default: String,
    #[serde(default)]
    pub description: String,
}

fn undefined_literal() -> String {
    UNDEFINED_LITERAL.to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Text(String),
    List(Vec<Value>),
}

impl Display for PropValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PropValue::Bool(value) => write!(f, "{value}"),
            PropValue::Text(value) => f.write_str(value),
            PropValue::List(items) => write!(f, "{}", Value::Array(items.clone())),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DefaultLiteralError {
    #[error("`{0}` is not a boolean literal")]
    NotBoolean(String),
    #[error("`{0}` is not a JSON list literal")]
    NotList(String),
}

impl PropertySpec {
    /// Initial value for this property. `Ok(None)` leaves the property unset.
    pub fn decode_default(&self) -> Result<Option<PropValue>, DefaultLiteralError> {
        let literal = self.default.trim();
        if literal == UNDEFINED_LITERAL {
            return Ok(None);
        }
        match &self.kind {
            PropertyKind::Boolean => match literal {
                "true" => Ok(Some(PropValue::Bool(true))),
                "false" => Ok(Some(PropValue::Bool(false))),
                other => Err(DefaultLiteralError::NotBoolean(other.to_string())),
            },
            PropertyKind::Text | PropertyKind::Enum(_) => {
                Ok(Some(PropValue::Text(unquote(literal).to_string())))
            }
            PropertyKind::List => serde_json::from_str::<Vec<Value>>(literal)
                .map(|items| Some(PropValue::List(items)))
                .map_err(|_| DefaultLiteralError::NotList(literal.to_string())),
            PropertyKind::Callback => Ok(None),
        }
    }

    /// Converts an edited control value into this property's value type.
    pub fn coerce(&self, raw: &str) -> PropValue {
        match &self.kind {
            PropertyKind::Boolean => PropValue::Bool(raw == "true"),
            PropertyKind::List => serde_json::from_str::<Vec<Value>>(raw)
                .map(PropValue::List)
                .unwrap_or_else(|_| PropValue::Text(raw.to_string())),
            PropertyKind::Text | PropertyKind::Enum(_) | PropertyKind::Callback => {
                PropValue::Text(raw.to_string())
            }
        }
    }
}

fn unquote(literal: &str) -> &str {
    literal
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or(literal)
}
