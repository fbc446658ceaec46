use std::fmt;

use ordered_float::OrderedFloat;
use serde::Serialize;

/// A single cell of a [`Table`](crate::table::Table).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

/// Hashable, totally ordered form of a [`Value`].
///
/// Numbers compare numerically (NaN == NaN, -0.0 == 0.0), text by exact
/// string match. Values of different kinds never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    Empty,
    Number(OrderedFloat<f64>),
    Text(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn key(&self) -> ValueKey {
        match self {
            Value::Empty => ValueKey::Empty,
            Value::Number(n) => ValueKey::Number(OrderedFloat(*n)),
            Value::Text(s) => ValueKey::Text(s.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// String form used for display and identifier normalization.
    ///
    /// Integral numbers print without a decimal part so that an identifier
    /// read from a spreadsheet as `12345678901.0` stays `12345678901`.
    pub fn display_string(&self) -> String {
        match self {
            Value::Empty => String::new(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Value::Text(s) => s.clone(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
