//! Runtime values.
//!
//! Template expressions use loose semantics: loose comparison, numeric
//! strings, truthiness of `"0"`. Lists and maps share their storage through `Rc` and
//! copy on write, so passing data into includes and loops is cheap.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::errors::{not_printable, type_mismatch, EvalResult};

/// Insertion-ordered string-keyed map.
pub type Map = IndexMap<String, Value, FxBuildHasher>;

/// A runtime value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Rc<Vec<Value>>),
    Map(Rc<Map>),
}

/// Result of numeric coercion.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    #[expect(clippy::cast_precision_loss, reason = "int to float promotion")]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(i) => Value::Int(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

/// Parse a numeric string: optional surrounding whitespace, an optional
/// sign, digits, an optional fraction and exponent.
pub fn parse_numeric(s: &str) -> Option<Number> {
    let t = s.trim();
    if t.is_empty()
        || !t
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
        || !t.bytes().any(|b| b.is_ascii_digit())
    {
        return None;
    }
    if let Ok(n) = t.parse::<i64>() {
        return Some(Number::Int(n));
    }
    t.parse::<f64>().ok().map(Number::Float)
}

/// Key an appended map entry gets: one past the largest integer key.
pub fn next_index(map: &Map) -> i64 {
    map.keys()
        .filter_map(|k| k.parse::<i64>().ok())
        .max()
        .map_or(0, |n| n.saturating_add(1))
}

/// Format a float the way templates print it.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NAN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "INF" } else { "-INF" }.to_string()
    } else {
        format!("{f}")
    }
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }

    pub fn map(map: Map) -> Self {
        Value::Map(Rc::new(map))
    }

    pub fn empty_map() -> Self {
        Value::Map(Rc::new(Map::default()))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Truthiness: null, false, 0, 0.0, `""`, `"0"` and empty collections
    /// are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !(s.is_empty() || s == "0"),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
        }
    }

    /// Text form for output and concatenation.
    pub fn to_text(&self) -> EvalResult<Cow<'_, str>> {
        Ok(match self {
            Value::Null | Value::Bool(false) => Cow::Borrowed(""),
            Value::Bool(true) => Cow::Borrowed("1"),
            Value::Int(n) => Cow::Owned(n.to_string()),
            Value::Float(f) => Cow::Owned(format_float(*f)),
            Value::Str(s) => Cow::Borrowed(s.as_str()),
            Value::List(_) | Value::Map(_) => return Err(not_printable(self.type_name())),
        })
    }

    /// Numeric coercion for arithmetic.
    pub fn to_number(&self) -> Option<Number> {
        match self {
            Value::Null | Value::Bool(false) => Some(Number::Int(0)),
            Value::Bool(true) => Some(Number::Int(1)),
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::Str(s) => parse_numeric(s),
            Value::List(_) | Value::Map(_) => None,
        }
    }

    /// Integer coercion, truncating floats and non-numeric strings to 0.
    #[expect(clippy::cast_possible_truncation, reason = "truncation is the intent")]
    pub fn to_int(&self) -> i64 {
        match self.to_number() {
            Some(Number::Int(n)) => n,
            Some(Number::Float(f)) if f.is_finite() => f as i64,
            Some(Number::Float(_)) | None => match self {
                Value::List(items) => i64::from(!items.is_empty()),
                Value::Map(map) => i64::from(!map.is_empty()),
                _ => 0,
            },
        }
    }

    /// Key form used to index maps.
    pub fn to_key(&self) -> EvalResult<String> {
        match self {
            Value::Float(_) => Ok(self.to_int().to_string()),
            Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
            Value::List(_) | Value::Map(_) => {
                Err(type_mismatch("string or int key", self.type_name()))
            }
            other => Ok(other.to_text()?.into_owned()),
        }
    }

    /// Number of elements for collections.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(items.len()),
            Value::Map(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Loose (`==`) equality.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null | Value::Bool(_), _) | (_, Value::Null | Value::Bool(_)) => {
                self.is_truthy() == other.is_truthy()
            }
            (Value::Str(a), Value::Str(b)) => match (parse_numeric(a), parse_numeric(b)) {
                (Some(x), Some(y)) => numbers_eq(x, y),
                _ => a == b,
            },
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.loose_eq(w)))
            }
            (Value::List(_) | Value::Map(_), _) | (_, Value::List(_) | Value::Map(_)) => false,
            _ => match (self.to_number(), other.to_number()) {
                (Some(x), Some(y)) => numbers_eq(x, y),
                // number against non-numeric string: compare as text
                _ => self.to_text().ok() == other.to_text().ok(),
            },
        }
    }

    /// Strict (`===`) identity: same type and same value.
    pub fn strict_eq(&self, other: &Value) -> bool {
        self == other
    }

    /// Ordering for `<`, `<=`, `>`, `>=`. `None` when incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null | Value::Bool(_), _) | (_, Value::Null | Value::Bool(_)) => {
                Some(self.is_truthy().cmp(&other.is_truthy()))
            }
            (Value::Str(a), Value::Str(b)) => match (parse_numeric(a), parse_numeric(b)) {
                (Some(x), Some(y)) => compare_numbers(x, y),
                _ => Some(a.cmp(b)),
            },
            (Value::List(_) | Value::Map(_), Value::List(_) | Value::Map(_)) => {
                Some(self.len().cmp(&other.len()))
            }
            (Value::List(_) | Value::Map(_), _) => Some(Ordering::Greater),
            (_, Value::List(_) | Value::Map(_)) => Some(Ordering::Less),
            _ => match (self.to_number(), other.to_number()) {
                (Some(x), Some(y)) => compare_numbers(x, y),
                _ => {
                    let (a, b) = (self.to_text().ok()?, other.to_text().ok()?);
                    Some(a.cmp(&b))
                }
            },
        }
    }
}

fn numbers_eq(a: Number, b: Number) -> bool {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x == y,
        _ => a.as_f64() == b.as_f64(),
    }
}

fn compare_numbers(a: Number, b: Number) -> Option<Ordering> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => Some(x.cmp(&y)),
        _ => a.as_f64().partial_cmp(&b.as_f64()),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "<{}>", self.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::map(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::list(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => Value::map(
                object
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests;
