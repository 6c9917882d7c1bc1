use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};
use uuid::Uuid;

/// A wire-level value carried by predicates, property bindings and injections.
///
/// JSON serialisation drops the variant names so values read the way a Gremlin
/// server expects them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    I64(i64),
    F64(f64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    // never produced by JSON deserialisation, only by the `From` impls below
    I32(i32),
    F32(f32),
    Uuid(Uuid),
    Date(DateTime<Utc>),
}

impl Value {
    pub fn inner_stringify(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::I32(i) => i.to_string(),
            Self::I64(i) => i.to_string(),
            Self::F32(f) => f.to_string(),
            Self::F64(f) => f.to_string(),
            Self::String(s) => s.to_string(),
            Self::Uuid(id) => id.to_string(),
            Self::Date(d) => d.to_rfc3339(),
            Self::Array(arr) => arr
                .iter()
                .map(|v| v.inner_stringify())
                .collect::<Vec<_>>()
                .join(" "),
            Self::Object(obj) => obj
                .iter()
                .map(|(k, v)| format!("{k} {}", v.inner_stringify()))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub fn to_variant_string(&self) -> &str {
        match self {
            Self::Null => "Null",
            Self::Boolean(_) => "Boolean",
            Self::I32(_) => "I32",
            Self::I64(_) => "I64",
            Self::F32(_) => "F32",
            Self::F64(_) => "F64",
            Self::String(_) => "String",
            Self::Uuid(_) => "Uuid",
            Self::Date(_) => "Date",
            Self::Array(_) => "Array",
            Self::Object(_) => "Object",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I32(i) => Some(*i as i64),
            Self::I64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::I32(v) => Some(*v as f64),
            Self::I64(v) => Some(*v as f64),
            Self::F32(v) => Some(*v as f64),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Compares two values of compatible types. Numeric variants compare across widths;
    /// incompatible variants have no ordering.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Boolean(s), Self::Boolean(o)) => Some(s.cmp(o)),
            (Self::String(s), Self::String(o)) => Some(s.cmp(o)),
            (Self::Uuid(s), Self::Uuid(o)) => Some(s.cmp(o)),
            (Self::Date(s), Self::Date(o)) => Some(s.cmp(o)),
            (s, o) => match (s.as_i64(), o.as_i64()) {
                (Some(s), Some(o)) => Some(s.cmp(&o)),
                _ => match (s.as_f64(), o.as_f64()) {
                    (Some(s), Some(o)) => s.partial_cmp(&o),
                    _ => None,
                },
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Array(s), Self::Array(o)) => s == o,
            (Self::Object(s), Self::Object(o)) => s == o,
            (s, o) => s.compare(o) == Some(Ordering::Equal),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            other => write!(f, "{}", other.inner_stringify()),
        }
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(i: i32) -> Self {
        Self::I32(i)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(i: i64) -> Self {
        Self::I64(i)
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(f: f32) -> Self {
        Self::F32(f)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(f: f64) -> Self {
        Self::F64(f)
    }
}

impl From<Uuid> for Value {
    #[inline]
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl From<DateTime<Utc>> for Value {
    #[inline]
    fn from(d: DateTime<Utc>) -> Self {
        Self::Date(d)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    #[inline]
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
