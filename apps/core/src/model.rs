use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Labels offered by the type selector, in selector order.
pub const TYPE_OPTIONS: [&str; 3] = ["String", "Int", "Float"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    String,
    Int,
    Float,
    Unknown,
}

impl ValueType {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::String),
            1 => Some(Self::Int),
            2 => Some(Self::Float),
            _ => None,
        }
    }

    pub fn index(self) -> Option<usize> {
        match self {
            Self::String => Some(0),
            Self::Int => Some(1),
            Self::Float => Some(2),
            Self::Unknown => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Unknown => "Unknown",
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => Ok(Self::String),
            "int" | "integer" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            other => Err(format!(
                "unsupported value type '{other}'. Use string, int, or float."
            )),
        }
    }
}

/// A value as the host store holds it.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(String),
    Int(i32),
    Float(f32),
}

impl TypedValue {
    /// Parses user text for the requested type. Numbers are parsed locale-independently
    /// with surrounding whitespace ignored; strings are taken verbatim.
    pub fn parse(value_type: ValueType, text: &str) -> Option<Self> {
        match value_type {
            ValueType::String => Some(Self::String(text.to_string())),
            ValueType::Int => text.trim().parse::<i32>().ok().map(Self::Int),
            ValueType::Float => text.trim().parse::<f32>().ok().map(Self::Float),
            ValueType::Unknown => None,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::String(_) => ValueType::String,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Self::String(value) => value.clone(),
            Self::Int(value) => render_int(*value),
            Self::Float(value) => render_float(*value),
        }
    }
}

pub fn render_int(value: i32) -> String {
    value.to_string()
}

// `Display` for f32 prints the shortest string that parses back to the same value,
// always with a '.' separator and no grouping.
pub fn render_float(value: f32) -> String {
    value.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefEntry {
    pub display_key: String,
    pub clean_key: String,
    pub raw_key: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub value: String,
}

impl PrefEntry {
    pub fn new(
        display_key: &str,
        clean_key: &str,
        raw_key: &str,
        value_type: ValueType,
        value: &str,
    ) -> Self {
        Self {
            display_key: display_key.to_string(),
            clean_key: clean_key.to_string(),
            raw_key: raw_key.to_string(),
            value_type,
            value: value.to_string(),
        }
    }
}
