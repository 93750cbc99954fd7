use json::JsonValue;

use crate::ast::Node;
use crate::types::{Key, Type};
use crate::value::{Action, Function, Value};

#[test]
fn to_string() {
    assert_eq!(Value::from(1).to_string(), "1");
    assert_eq!(Value::from(-1.5).to_string(), "-1.5");
    assert_eq!(Value::from(true).to_string(), "true");
    assert_eq!(Value::from("alpha").to_string(), "\"alpha\"");
    assert_eq!(Value::Void.to_string(), "void");
    assert_eq!(Value::Error("oops".to_owned()).to_string(), "error(\"oops\")");

    assert_eq!(Value::new_struct().to_string(), "{}");
    assert_eq!(
        Value::structure(vec![("a", Value::from(1)), ("b", Value::from("x"))]).to_string(),
        "{a: 1, b: \"x\"}",
    );
    assert_eq!(
        Value::sequence(vec![Value::from(1), Value::from(2)]).to_string(),
        "{0: 1, 1: 2}",
    );

    let f = Function::new("double", |args| Ok(args[0].clone()));
    assert_eq!(Value::from(f).to_string(), "<function double>");
    assert_eq!(
        Value::from(Action::new(vec![Node::void(), Node::void()])).to_string(),
        "<action of 2 statements>",
    );
}

#[test]
fn cyclic_display() {
    let x = Value::new_struct();
    x.push(x.clone());
    assert_eq!(x.to_string(), "{0: {...}}");
    let mut expected = JsonValue::new_object();
    expected["0"] = JsonValue::Null;
    assert_eq!(x.unwrap(), expected);
}

#[test]
fn type_of() {
    assert_eq!(Value::from(1).type_of(), Type::Number);
    assert_eq!(Value::from("a").type_of(), Type::String);
    assert_eq!(Value::from(false).type_of(), Type::Bool);
    assert_eq!(Value::new_struct().type_of(), Type::Struct);
    assert_eq!(Value::Void.type_of(), Type::Void);
    assert_eq!(Value::Error("e".to_owned()).type_of(), Type::Error);
    assert_eq!(Type::Struct.to_string(), "struct");
}

#[test]
fn equality() {
    assert_eq!(Value::from(1), Value::from(1.0));
    assert_ne!(Value::from(1), Value::from(2));
    assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    assert_ne!(Value::from(1), Value::from("1"));
    assert_eq!(Value::Void, Value::Void);

    let a = Value::structure(vec![("x", Value::from(1)), ("y", Value::from(2))]);
    let b = Value::structure(vec![("y", Value::from(2)), ("x", Value::from(1))]);
    assert_eq!(a, b);
    assert_ne!(a, Value::structure(vec![("x", Value::from(1))]));

    let f = Function::new("f", |_| Ok(Value::Void));
    let g = Function::new("f", |_| Ok(Value::Void));
    assert_eq!(Value::from(f.clone()), Value::from(f.clone()));
    assert_ne!(Value::from(f), Value::from(g));

    let action = Action::new(vec![]);
    assert_eq!(Value::from(action.clone()), Value::from(action));
    assert_ne!(Value::from(Action::new(vec![])), Value::from(Action::new(vec![])));
}

#[test]
fn struct_aliasing() {
    let x = Value::new_struct();
    let y = x.clone();
    assert!(x.push(Value::from(1)));
    assert_eq!(y.field(Key::new("0")), Value::from(1));
    assert!(!Value::from(1).push(Value::from(2)));
}

#[test]
fn append_skips_taken_indices() {
    let x = Value::structure(vec![("1", Value::from("taken"))]);
    x.push(Value::from("a"));
    x.push(Value::from("b"));
    assert_eq!(x.field(Key::new("1")), Value::from("taken"));
    assert_eq!(x.field(Key::new("2")), Value::from("a"));
    assert_eq!(x.field(Key::new("3")), Value::from("b"));
}

#[test]
fn fields() {
    let x = Value::structure(vec![("a", Value::from(1))]);
    assert_eq!(x.field(Key::new("a")), Value::from(1));
    assert_eq!(x.field(Key::new("b")), Value::Void);
    assert_eq!(Value::from(3).field(Key::new("a")), Value::Void);
}

#[test]
fn keys() {
    assert_eq!(Value::from("a").to_key(), Some(Key::new("a")));
    assert_eq!(Value::from(2).to_key(), Some(Key::new("2")));
    assert_eq!(Value::from(2.5).to_key(), Some(Key::new("2.5")));
    assert_eq!(Value::from(true).to_key(), Some(Key::new("true")));
    assert_eq!(Value::Void.to_key(), None);
    assert_eq!(Value::new_struct().to_key(), None);
}

#[test]
fn wrap() {
    assert_eq!(Value::wrap(&JsonValue::from("s")), Value::from("s"));
    assert_eq!(Value::wrap(&JsonValue::from(2.5)), Value::from(2.5));
    assert_eq!(Value::wrap(&JsonValue::from(true)), Value::from(true));
    assert_eq!(Value::wrap(&JsonValue::Null), Value::Void);
    assert_eq!(Value::wrap(&JsonValue::new_object()), Value::Void);
    assert_eq!(Value::wrap(&JsonValue::new_array()), Value::Void);
}

#[test]
fn unwrap() {
    assert_eq!(Value::from(1).unwrap(), JsonValue::from(1.0));
    assert_eq!(Value::from("x").unwrap(), JsonValue::from("x"));
    assert_eq!(Value::from(false).unwrap(), JsonValue::from(false));
    assert_eq!(Value::Void.unwrap(), JsonValue::Null);
    assert_eq!(Value::Error("bad".to_owned()).unwrap(), JsonValue::from("bad"));
    assert_eq!(Value::from(Action::new(vec![])).unwrap(), JsonValue::Null);

    let mut inner = JsonValue::new_object();
    inner["0"] = true.into();
    let mut expected = JsonValue::new_object();
    expected["a"] = 1.0.into();
    expected["b"] = inner;
    assert_eq!(
        Value::structure(vec![("a", Value::from(1)), ("b", Value::sequence(vec![Value::from(true)]))]).unwrap(),
        expected,
    );
}
