//! Display variables: tagged values and the live key/value store.
//!
//! The store is written by the host (sensors, players, timers) and read
//! by widgets during `update`. The engine is single-threaded
//! cooperative, so the store is a cheaply cloneable handle over shared
//! state — clones observe each other's writes, exactly like the
//! reactive handles elsewhere in this workspace's lineage.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// A tagged variable value.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Text(String),
}

impl Value {
    /// Numeric view of the value, if it has one.
    ///
    /// Booleans and text do not convert; use [`Value::cast_int`] for the
    /// lossy `int` transform semantics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Lossy cast to integer: numerics truncate, numeric text parses,
    /// everything else is 0.
    pub fn cast_int(&self) -> i64 {
        match self {
            Value::Int(i) => *i,
            Value::Float(f) => *f as i64,
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .or_else(|_| s.trim().parse::<f64>().map(|f| f as i64))
                .unwrap_or(0),
            Value::Bool(_) => 0,
        }
    }

    /// Borrow the text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the boolean content, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Loose equality: ints and floats compare numerically, otherwise
/// values are equal only within the same tag. Change detection and
/// conditionals both rely on this.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
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

/// The live name → value database.
///
/// Cloning produces another handle to the same underlying map.
#[derive(Clone, Debug, Default)]
pub struct VarStore(Rc<RefCell<HashMap<String, Value>>>);

impl VarStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variable by name.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name).cloned()
    }

    /// Set a variable.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.borrow_mut().insert(name.into(), value.into());
    }

    /// Remove a variable.
    pub fn remove(&self, name: &str) {
        self.0.borrow_mut().remove(name);
    }

    /// Whether the store holds `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.borrow().contains_key(name)
    }

    /// Copy every entry of `other` into this store, replacing the
    /// previous content. Used by hosts that maintain a previous-tick
    /// snapshot store.
    pub fn copy_from(&self, other: &VarStore) {
        let src = other.0.borrow().clone();
        *self.0.borrow_mut() = src;
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}
