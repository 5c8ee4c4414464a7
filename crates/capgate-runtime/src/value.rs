//! Runtime value representation
//!
//! Values exchanged between the host and a sandboxed script context.
//! - Undefined, Null, Bools, Numbers: immediate values
//! - Strings: heap-allocated, reference-counted (Arc<String>), immutable
//! - Arrays: shared immutable vectors (ValueArray wrapping Arc<Vec<Value>>), value semantics
//! - Objects: immutable ordered property lists, reference semantics
//! - NativeFunction: host closures callable from guest code

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Immutable array. Cheap to clone (refcount bump).
#[derive(Clone, Debug)]
pub struct ValueArray(Arc<Vec<Value>>);

impl ValueArray {
    pub fn from_vec(v: Vec<Value>) -> Self {
        ValueArray(Arc::new(v))
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl PartialEq for ValueArray {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice() == other.0.as_slice()
    }
}

/// Frozen object with ordered own properties.
///
/// Objects are shared by reference: clones point at the same allocation and
/// two objects are equal only when they are the same allocation. Property order
/// is insertion order; a repeated key keeps its first position and takes the
/// last value.
#[derive(Clone, Debug, Default)]
pub struct ObjectRef(Arc<Vec<(String, Value)>>);

impl ObjectRef {
    pub fn new() -> Self {
        ObjectRef(Arc::new(Vec::new()))
    }

    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut props: Vec<(String, Value)> = Vec::new();
        for (key, value) in pairs {
            let key = key.into();
            match props.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => props.push((key, value)),
            }
        }
        ObjectRef(Arc::new(props))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// Native function type - host closure callable from guest code
///
/// Native functions receive the guest's arguments and return either a value or a runtime error.
/// Arc provides thread safety and cheap cloning for sharing natives across contexts.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync>;

/// Runtime value type
#[derive(Clone)]
pub enum Value {
    /// Absent value (result of calls that return nothing)
    Undefined,
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (IEEE 754 double-precision)
    Number(f64),
    /// String value (reference-counted, immutable)
    String(Arc<String>),
    /// Array value (shared, value semantics)
    Array(ValueArray),
    /// Frozen object (reference semantics)
    Object(ObjectRef),
    /// Native function (host closure callable from guest code)
    NativeFunction(NativeFn),
}

impl Value {
    /// Create a new string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    /// Create a new array value
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(ValueArray::from_vec(values))
    }

    /// Create a new frozen object value
    pub fn object<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(ObjectRef::from_pairs(pairs))
    }

    /// Wrap a closure as a native function value
    pub fn native<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Value::NativeFunction(Arc::new(f))
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::NativeFunction(_) => "function",
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Look up a property on an object value
    pub fn member(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Invoke a callable value
    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        match self {
            Value::NativeFunction(f) => f(args),
            other => Err(RuntimeError::TypeError {
                msg: format!("{} is not a function", other.type_name()),
            }),
        }
    }

    /// SameValue comparison.
    ///
    /// Like `==` except NaN equals NaN and +0 differs from -0. Reference types
    /// (objects, functions) compare by identity.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    return true;
                }
                a == b && a.is_sign_negative() == b.is_sign_negative()
            }
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => self == other,
        }
    }
}

impl PartialEq for Value {
    /// Equality contract:
    ///
    /// **Value types** (content equality):
    /// - Undefined, Null, Bool, Number, String: primitive equality
    /// - Array: compares by content
    ///
    /// **Reference types** (identity equality: only the same allocation is equal):
    /// - Object: frozen property lists are shared by reference
    /// - NativeFunction: closures have no meaningful content equality
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                // No trailing .0 for whole numbers
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s.as_ref()),
            Value::Array(arr) => {
                let elements: Vec<String> = arr.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", elements.join(", "))
            }
            Value::Object(obj) => {
                let keys: Vec<&str> = obj.keys().collect();
                write!(f, "<object {{{}}}>", keys.join(", "))
            }
            Value::NativeFunction(_) => write!(f, "<native fn>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Array(arr) => write!(f, "Array({:?})", arr.as_slice()),
            Value::Object(obj) => {
                let keys: Vec<&str> = obj.keys().collect();
                write!(f, "Object({:?})", keys)
            }
            Value::NativeFunction(_) => write!(f, "NativeFunction(<closure>)"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

/// Errors raised while guest code touches the namespace or calls a native
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    /// Type error
    #[error("Type error: {msg}")]
    TypeError { msg: String },
    /// Name does not resolve in the global namespace
    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },
    /// Assignment to a non-writable binding
    #[error("Cannot assign to read-only binding '{name}'")]
    ReadOnlyBinding { name: String },
    /// Deletion or redefinition of a non-configurable binding
    #[error("Cannot redefine non-configurable binding '{name}'")]
    NotConfigurable { name: String },
    /// Host function bridge has no callable registered under this key
    #[error("Host function '{key}' is not registered")]
    MissingHostFunction { key: String },
    /// Error raised by host code (bridge callables, transport layer)
    #[error("{message}")]
    Host { message: String },
}

impl RuntimeError {
    /// Convenience constructor for host-side failures
    pub fn host(message: impl Into<String>) -> Self {
        RuntimeError::Host {
            message: message.into(),
        }
    }
}
