use json::JsonValue;

use crate::types::{reserved, GcCell, Key, Map};
use crate::value::Value;

/// A lexical scope: a mutable table of bindings.
///
/// Environments are cheap handles. Cloning one shares the table; use
/// [`Environment::fork`] to get an independent copy.
#[derive(Clone)]
pub struct Environment {
    names: GcCell<Map>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Environment {
        Environment {
            names: GcCell::new(Map::new()),
        }
    }

    /// Build an environment owning a copy of the given bindings.
    pub fn from_map(names: Map) -> Environment {
        Environment {
            names: GcCell::new(names),
        }
    }

    pub fn lookup(&self, key: Key) -> Option<Value> {
        self.names.borrow().get(&key).cloned()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.lookup(Key::new(name))
    }

    pub fn bind(&self, key: Key, value: Value) {
        self.names.borrow_mut().insert(key, value);
    }

    /// Independent copy of the binding table. Struct values are shared with
    /// the parent.
    pub fn fork(&self) -> Environment {
        Environment::from_map(self.names.borrow().clone())
    }

    pub fn storage(&self) -> &GcCell<Map> {
        &self.names
    }

    /// The scope exposed as a struct value sharing its storage.
    pub fn as_struct(&self) -> Value {
        Value::Struct(self.names.clone())
    }

    /// Value of the `return` slot, or void.
    pub fn returned(&self) -> Value {
        self.get(reserved::RETURN).unwrap_or(Value::Void)
    }

    /// Project the user-visible bindings to JSON. Reserved keys are left out.
    pub fn to_json(&self) -> JsonValue {
        let mut obj = JsonValue::new_object();
        for (key, value) in self.names.borrow().iter() {
            if is_reserved(key.as_str()) {
                continue;
            }
            obj[key.as_str()] = value.unwrap();
        }
        obj
    }

    /// Write `value` at the end of a nested path, creating intermediate
    /// structs as needed.
    pub fn merge_into(&self, path: &AssignPath, value: Value) {
        let root = self.lookup(path.root).as_ref().and_then(Value::get_struct).cloned();
        let mut current = match root {
            Some(map) => map,
            None => {
                let fresh = GcCell::new(Map::new());
                self.bind(path.root, Value::Struct(fresh.clone()));
                fresh
            }
        };

        let mut keys = path.keys.iter().rev().peekable();
        while let Some(key) = keys.next() {
            if keys.peek().is_none() {
                store(&current, *key, value, &mut Vec::new());
                return;
            }

            let next = {
                let existing = current.borrow().get(key).and_then(Value::get_struct).cloned();
                match existing {
                    Some(map) => map,
                    None => {
                        let fresh = GcCell::new(Map::new());
                        current.borrow_mut().insert(*key, Value::Struct(fresh.clone()));
                        fresh
                    }
                }
            };
            current = next;
        }
    }
}

/// Names starting with `__` or `$` are bookkeeping slots, not user bindings.
pub(crate) fn is_reserved(name: &str) -> bool {
    name.starts_with("__") || name.starts_with(reserved::RECEIVER)
}

/// Store a value under a key. A struct written over a different struct is
/// merged into it entry by entry; anything else replaces.
///
/// `merging` holds the (destination, source) pairs currently being merged.
/// A pair met again through a cycle is skipped.
fn store(target: &GcCell<Map>, key: Key, value: Value, merging: &mut Vec<(GcCell<Map>, GcCell<Map>)>) {
    let existing = target.borrow().get(&key).and_then(Value::get_struct).cloned();
    let source = value.get_struct().cloned();
    match (existing, source) {
        (Some(dest), Some(src)) if !dest.ptr_eq(&src) => {
            if merging.iter().any(|(d, s)| d.ptr_eq(&dest) && s.ptr_eq(&src)) {
                return;
            }
            let entries: Vec<(Key, Value)> = src.borrow().iter().map(|(k, v)| (*k, v.clone())).collect();
            merging.push((dest.clone(), src));
            for (k, v) in entries {
                store(&dest, k, v, merging);
            }
            merging.pop();
        }
        _ => {
            target.borrow_mut().insert(key, value);
        }
    }
}

/// Target of a nested assignment `a:b:c <- v`: the root binding and the
/// chain of keys below it, innermost first.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignPath {
    pub root: Key,
    pub keys: Vec<Key>,
}

impl AssignPath {
    pub fn new(root: Key, keys: Vec<Key>) -> AssignPath {
        AssignPath { root, keys }
    }
}
