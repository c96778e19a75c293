// File: src/value.rs
// Purpose: Template-visible value types

use std::collections::HashMap;
use std::fmt;

use num_complex::Complex64;

/// Supported value types in templates.
///
/// The numeric variants mirror the wildcard type vocabulary: narrow
/// integer widths are parsed at their declared width and then widened
/// into `Int`/`Uint`, which keeps equality and display round-trips
/// intact without one variant per width.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Complex(Complex64),
    Char(char),
    String(String),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
    Null,
}

impl Value {
    /// Convert value to boolean.
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Uint(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Complex(c) => c.re != 0.0 || c.im != 0.0,
            Value::Char(_) => true,
            Value::String(s) => !s.is_empty(),
            Value::Array(arr) => !arr.is_empty(),
            Value::Object(obj) => !obj.is_empty(),
            Value::Null => false,
        }
    }

    /// The value's type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::Complex(_) => "complex",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Null => "null",
        }
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Navigate a dotted path through nested objects.
    pub fn get_path(&self, path: &[String]) -> Option<&Value> {
        let mut current = self;
        for part in path {
            match current {
                Value::Object(map) => current = map.get(part)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Uint(n) => write!(f, "{n}"),
            Value::Float(n) => {
                // Render integral floats without the trailing `.0`.
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Complex(c) => write!(f, "{c}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Array(arr) => {
                let items: Vec<String> = arr.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Object(_) => write!(f, "[Object]"),
            Value::Null => Ok(()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Uint(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<Complex64> for Value {
    fn from(c: Complex64) -> Self {
        Value::Complex(c)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(obj: HashMap<String, Value>) -> Self {
        Value::Object(obj)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Object(
                obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_round_trips() {
        assert_eq!(Value::Int(-42).to_string(), "-42");
        assert_eq!(Value::Uint(58).to_string(), "58");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(3.0).to_string(), "3");
        assert_eq!(Value::Char('x').to_string(), "x");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn nested_path_lookup() {
        let mut inner = HashMap::new();
        inner.insert("id".to_string(), Value::Int(42));
        let mut outer = HashMap::new();
        outer.insert("PathParams".to_string(), Value::Object(inner));
        let v = Value::Object(outer);

        let path = vec!["PathParams".to_string(), "id".to_string()];
        assert_eq!(v.get_path(&path), Some(&Value::Int(42)));
        let missing = vec!["PathParams".to_string(), "nope".to_string()];
        assert_eq!(v.get_path(&missing), None);
    }

    #[test]
    fn from_json() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"a": [1, "two", true], "b": null}"#).unwrap();
        let v = Value::from(json);
        let Value::Object(obj) = v else {
            panic!("expected object")
        };
        assert_eq!(
            obj["a"],
            Value::Array(vec![
                Value::Int(1),
                Value::String("two".into()),
                Value::Bool(true)
            ])
        );
        assert_eq!(obj["b"], Value::Null);
    }
}
