//! A runtime value is represented by the [`Value`] type.
//!
//! Every variant except [`Value::Struct`] behaves like a plain value: cloning
//! it copies the payload (or an immutable shared payload, which amounts to the
//! same thing). Structs are different. A struct is a mutable container and
//! cloning a `Value::Struct` shares the underlying storage, so that in-place
//! operators (append, nested assignment) are visible through every alias.
//! Environment forks rely on this: forking copies the binding table, but a
//! struct bound in the parent is the same struct in the child.

use std::fmt::{Debug, Display, Write};
use std::rc::Rc;

use gc::{Finalize, Trace};
use json::JsonValue;

use crate::ast::Node;
use crate::types::{GcCell, Key, Map, Res, Type};

/// Signature of a native callable wrapped by [`Function`].
pub type NativeFn = dyn Fn(&[Value]) -> Res<Value>;

/// A callable implemented in Rust.
#[derive(Clone)]
pub struct Function {
    name: String,
    func: Rc<NativeFn>,
}

impl Function {
    pub fn new(name: impl Into<String>, func: impl Fn(&[Value]) -> Res<Value> + 'static) -> Function {
        Function {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Res<Value> {
        (self.func)(args)
    }

    /// Functions compare by identity.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

/// A user-defined block of statements, optionally carrying the scope it was
/// captured in by `@`.
#[derive(Clone, Trace, Finalize)]
pub struct Action {
    #[unsafe_ignore_trace]
    body: Rc<Vec<Node>>,

    scope: Option<GcCell<Map>>,
}

impl Action {
    pub fn new(body: Vec<Node>) -> Action {
        Action {
            body: Rc::new(body),
            scope: None,
        }
    }

    pub fn body(&self) -> Rc<Vec<Node>> {
        self.body.clone()
    }

    pub fn scope(&self) -> Option<&GcCell<Map>> {
        self.scope.as_ref()
    }

    /// Return a copy of this action bound to a scope. The scope is shared,
    /// not copied: later writes to it are visible when the action runs.
    pub fn capture(&self, scope: GcCell<Map>) -> Action {
        Action {
            body: self.body.clone(),
            scope: Some(scope),
        }
    }

    /// Actions compare by identity of their body.
    pub fn ptr_eq(&self, other: &Action) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

/// The runtime value.
#[derive(Clone, Trace, Finalize)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    Struct(GcCell<Map>),
    Function(#[unsafe_ignore_trace] Function),
    Action(Action),
    Void,
    Error(String),
}

impl Value {
    /// Construct a new empty struct.
    pub fn new_struct() -> Value {
        Value::Struct(GcCell::new(Map::new()))
    }

    /// Construct a struct from key-value pairs.
    pub fn structure<K: AsRef<str>>(entries: Vec<(K, Value)>) -> Value {
        Value::Struct(GcCell::new(
            entries
                .into_iter()
                .map(|(k, v)| (Key::new(k.as_ref()), v))
                .collect(),
        ))
    }

    /// Construct a struct used as a sequence: elements are keyed by their
    /// index.
    pub fn sequence(elements: Vec<Value>) -> Value {
        let mut map = Map::new();
        for element in elements {
            push(&mut map, element);
        }
        Value::Struct(GcCell::new(map))
    }

    pub fn type_of(&self) -> Type {
        match self {
            Self::Number(_) => Type::Number,
            Self::String(_) => Type::String,
            Self::Bool(_) => Type::Bool,
            Self::Struct(_) => Type::Struct,
            Self::Function(_) => Type::Function,
            Self::Action(_) => Type::Action,
            Self::Void => Type::Void,
            Self::Error(_) => Type::Error,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    pub fn get_number(&self) -> Option<f64> {
        match self {
            Self::Number(x) => Some(*x),
            _ => None,
        }
    }

    pub fn get_str(&self) -> Option<&str> {
        match self {
            Self::String(x) => Some(x.as_str()),
            _ => None,
        }
    }

    pub fn get_struct(&self) -> Option<&GcCell<Map>> {
        match self {
            Self::Struct(x) => Some(x),
            _ => None,
        }
    }

    /// Read a field. Reading from anything but a struct, or reading a missing
    /// field, yields void.
    pub fn field(&self, key: Key) -> Value {
        match self {
            Self::Struct(map) => map.borrow().get(&key).cloned().unwrap_or(Value::Void),
            _ => Value::Void,
        }
    }

    /// Snapshot of a struct's entries in insertion order.
    pub fn elements(&self) -> Option<Vec<Value>> {
        self.get_struct().map(|map| map.borrow().values().cloned().collect())
    }

    /// Append to a struct in place, under the next free index.
    pub fn push(&self, value: Value) -> bool {
        match self {
            Self::Struct(map) => {
                push(&mut map.borrow_mut(), value);
                true
            }
            _ => false,
        }
    }

    /// Convert to a struct key, if this value has a textual form.
    pub fn to_key(&self) -> Option<Key> {
        match self {
            Self::String(x) => Some(Key::new(x)),
            Self::Number(x) => Some(Key::new(x.to_string())),
            Self::Bool(x) => Some(Key::new(x.to_string())),
            _ => None,
        }
    }

    /// Coerce a foreign primitive. Strings, numbers and booleans map to their
    /// counterparts; everything else becomes void.
    pub fn wrap(value: &JsonValue) -> Value {
        if let Some(x) = value.as_str() {
            return Value::String(x.to_owned());
        }
        match value {
            JsonValue::Number(_) => value.as_f64().map(Value::Number).unwrap_or(Value::Void),
            JsonValue::Boolean(x) => Value::Bool(*x),
            _ => Value::Void,
        }
    }

    /// Project to a foreign value. Structs become JSON objects (a struct
    /// reachable from itself projects as null at the point of recursion),
    /// errors become their message, and functions, actions and void become
    /// null.
    pub fn unwrap(&self) -> JsonValue {
        self.unwrap_guarded(&mut Vec::new())
    }

    fn unwrap_guarded(&self, seen: &mut Vec<GcCell<Map>>) -> JsonValue {
        match self {
            Self::Number(x) => JsonValue::from(*x),
            Self::String(x) => JsonValue::from(x.as_str()),
            Self::Bool(x) => JsonValue::from(*x),
            Self::Error(x) => JsonValue::from(x.as_str()),
            Self::Struct(map) => {
                if seen.iter().any(|s| s.ptr_eq(map)) {
                    return JsonValue::Null;
                }
                seen.push(map.clone());
                let mut val = JsonValue::new_object();
                for (key, element) in map.borrow().iter() {
                    val[key.as_str()] = element.unwrap_guarded(seen);
                }
                seen.pop();
                val
            }
            Self::Function(_) | Self::Action(_) | Self::Void => JsonValue::Null,
        }
    }

    fn fmt_guarded(&self, f: &mut std::fmt::Formatter<'_>, seen: &mut Vec<GcCell<Map>>) -> std::fmt::Result {
        match self {
            Self::Number(x) => write!(f, "{}", x),
            Self::String(x) => write!(f, "{:?}", x),
            Self::Bool(x) => write!(f, "{}", x),
            Self::Void => f.write_str("void"),
            Self::Error(x) => write!(f, "error({:?})", x),
            Self::Function(x) => write!(f, "<function {}>", x.name()),
            Self::Action(x) => {
                let bound = if x.scope().is_some() { " bound" } else { "" };
                write!(f, "<action{} of {} statements>", bound, x.body.len())
            }
            Self::Struct(map) => {
                if seen.iter().any(|s| s.ptr_eq(map)) {
                    return f.write_str("{...}");
                }
                seen.push(map.clone());
                f.write_char('{')?;
                for (i, (key, element)) in map.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    element.fmt_guarded(f, seen)?;
                }
                seen.pop();
                f.write_char('}')
            }
        }
    }
}

/// Insert under the smallest integer key not below the current length that
/// is still free.
pub(crate) fn push(map: &mut Map, value: Value) {
    let mut index = map.len();
    loop {
        let key = Key::new(index.to_string());
        if !map.contains_key(&key) {
            map.insert(key, value);
            return;
        }
        index += 1;
    }
}

impl PartialEq for Value {
    /// Structural equality. Values of different types are never equal (the
    /// `==` operator rejects such comparisons before getting here). NaN is
    /// equal to itself so that every value equals itself.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(x), Self::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
            (Self::String(x), Self::String(y)) => x == y,
            (Self::Bool(x), Self::Bool(y)) => x == y,
            (Self::Void, Self::Void) => true,
            (Self::Error(x), Self::Error(y)) => x == y,
            (Self::Function(x), Self::Function(y)) => x.ptr_eq(y),
            (Self::Action(x), Self::Action(y)) => x.ptr_eq(y),
            (Self::Struct(x), Self::Struct(y)) => {
                if x.ptr_eq(y) {
                    return true;
                }
                let x = x.borrow();
                let y = y.borrow();
                x.len() == y.len() && x.iter().all(|(k, v)| y.get(k).map_or(false, |w| v == w))
            }
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_guarded(f, &mut Vec::new())
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.type_of(), self)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Value::Function(value)
    }
}

impl From<Action> for Value {
    fn from(value: Action) -> Self {
        Value::Action(value)
    }
}

impl From<&Value> for JsonValue {
    fn from(value: &Value) -> Self {
        value.unwrap()
    }
}
