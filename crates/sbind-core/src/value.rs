//! Host data model read by compiled accessors
//!
//! Arrays and objects are shared handles: cloning a [`Value`] clones the
//! handle, so a mutation made by the host through any clone is seen by every
//! accessor that captured the same container. The engine itself only reads.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

/// Insertion-ordered object storage
pub type Object = IndexMap<String, Value>;

/// A zero-argument host function reachable through a `name()` path segment
#[derive(Clone)]
pub struct Function(Rc<dyn Fn() -> Value>);

impl Function {
    pub fn new(f: impl Fn() -> Value + 'static) -> Self {
        Function(Rc::new(f))
    }

    pub fn call(&self) -> Value {
        (self.0)()
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Function({:p})", Rc::as_ptr(&self.0) as *const u8)
    }
}

/// Functions are equal only when they are the same host function
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::as_ptr(&self.0) as *const u8 == Rc::as_ptr(&other.0) as *const u8
    }
}

/// A runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The `undefined` keyword; distinct from `Null` and from an absent lookup
    Undefined,
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<Object>>),
    Function(Function),
}

impl Value {
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let map: Object = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Object(Rc::new(RefCell::new(map)))
    }

    pub fn empty_object() -> Self {
        Value::Object(Rc::new(RefCell::new(Object::new())))
    }

    pub fn function(f: impl Fn() -> Value + 'static) -> Self {
        Value::Function(Function::new(f))
    }

    /// Look up a member: an object key, or a decimal index into an array.
    /// Anything else has no members.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.borrow().get(key).cloned(),
            Value::Array(items) => {
                let index = key.parse::<usize>().ok()?;
                items.borrow().get(index).cloned()
            }
            _ => None,
        }
    }

    /// Whether [`Value::get`] would find `key`
    pub fn has_member(&self, key: &str) -> bool {
        match self {
            Value::Object(map) => map.borrow().contains_key(key),
            Value::Array(items) => key
                .parse::<usize>()
                .is_ok_and(|index| index < items.borrow().len()),
            _ => false,
        }
    }

    /// Set an object key, returning the previous value. No effect on
    /// non-objects.
    pub fn set(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        match self {
            Value::Object(map) => map.borrow_mut().insert(key.into(), value),
            _ => None,
        }
    }

    /// Append to an array; returns false for non-arrays
    pub fn push(&self, value: Value) -> bool {
        match self {
            Value::Array(items) => {
                items.borrow_mut().push(value);
                true
            }
            _ => false,
        }
    }

    /// Call a function value with no arguments; `None` if not callable
    pub fn call(&self) -> Option<Value> {
        match self {
            Value::Function(f) => Some(f.call()),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Get the type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "Undefined",
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
            Value::Function(_) => "Function",
        }
    }

    /// Convert from serde_json::Value, keeping integers as integers
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Null
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(arr) => Value::array(arr.iter().map(Value::from_json)),
            serde_json::Value::Object(map) => {
                Value::object(map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))))
            }
        }
    }

    /// Convert to serde_json::Value; `undefined` and functions become `null`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null | Value::Function(_) => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::json!(*i),
            Value::Float(f) => serde_json::json!(*f),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.borrow().iter().map(Value::to_json).collect())
            }
            Value::Object(map) => {
                let obj: serde_json::Map<String, serde_json::Value> = map
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                serde_json::Value::Object(obj)
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, v) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\": {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Function(_) => write!(f, "[function]"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from_json(json)
    }
}
