//! Atomic values produced by rendering template leaves.
//!
//! Every leaf of a generated record is an [`Atom`]. Numbers are kept as
//! [`serde_json::Number`] so integer-shaped values stay integers and floats
//! keep their shortest round-trip representation.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// A scalar value: the only kind of value a leaf node can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Atom {
    /// Null value
    Null,

    /// Boolean value
    Bool(bool),

    /// Integer or floating point number
    Number(Number),

    /// String value
    String(String),
}

impl Atom {
    /// Convert a JSON scalar into an atom.
    ///
    /// Returns `None` for arrays and objects.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Atom::Null),
            Value::Bool(b) => Some(Atom::Bool(*b)),
            Value::Number(n) => Some(Atom::Number(n.clone())),
            Value::String(s) => Some(Atom::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Convert the atom into its native JSON representation.
    pub fn to_json(&self) -> Value {
        match self {
            Atom::Null => Value::Null,
            Atom::Bool(b) => Value::Bool(*b),
            Atom::Number(n) => Value::Number(n.clone()),
            Atom::String(s) => Value::String(s.clone()),
        }
    }

    /// Textual form used by XML output: booleans are lower-cased and null
    /// renders as an empty string.
    pub fn to_text(&self) -> String {
        match self {
            Atom::Null => String::new(),
            Atom::Bool(true) => "true".to_string(),
            Atom::Bool(false) => "false".to_string(),
            Atom::Number(n) => n.to_string(),
            Atom::String(s) => s.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Atom::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Atom::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Atom::Number(n) => n.as_i64(),
            _ => None,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<bool> for Atom {
    fn from(value: bool) -> Self {
        Atom::Bool(value)
    }
}

impl From<i64> for Atom {
    fn from(value: i64) -> Self {
        Atom::Number(value.into())
    }
}

impl From<u64> for Atom {
    fn from(value: u64) -> Self {
        Atom::Number(value.into())
    }
}

impl From<f64> for Atom {
    /// Non-finite floats have no JSON representation and become null.
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Atom::Null, Atom::Number)
    }
}

impl From<String> for Atom {
    fn from(value: String) -> Self {
        Atom::String(value)
    }
}

impl From<&str> for Atom {
    fn from(value: &str) -> Self {
        Atom::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Atom::from_json(&json!(null)), Some(Atom::Null));
        assert_eq!(Atom::from_json(&json!(true)), Some(Atom::Bool(true)));
        assert_eq!(Atom::from_json(&json!(42)), Some(Atom::from(42i64)));
        assert_eq!(Atom::from_json(&json!("abc")), Some(Atom::from("abc")));
    }

    #[test]
    fn test_from_json_rejects_complex() {
        assert_eq!(Atom::from_json(&json!([1, 2])), None);
        assert_eq!(Atom::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_text_lowercases_booleans() {
        assert_eq!(Atom::Bool(true).to_text(), "true");
        assert_eq!(Atom::Bool(false).to_text(), "false");
        assert_eq!(Atom::Null.to_text(), "");
    }

    #[test]
    fn test_numbers_keep_their_shape() {
        let int = Atom::from_json(&json!(7)).unwrap();
        assert_eq!(int.to_text(), "7");
        assert_eq!(int.as_i64(), Some(7));

        let float = Atom::from_json(&json!(1.5)).unwrap();
        assert_eq!(float.to_text(), "1.5");
        assert_eq!(float.to_json(), json!(1.5));
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(Atom::from(f64::NAN), Atom::Null);
    }
}
