use futures::executor::block_on;
use json::JsonValue;

use super::{atom, bind, num, op, string, unary};
use crate::ast::Node;
use crate::builtins;
use crate::env::Environment;
use crate::error::{Collaborator, Reason};
use crate::eval::Interpreter;
use crate::foreign::{ForeignRuntime, HostLibrary};
use crate::output::PrintHandler;
use crate::types::Res;
use crate::value::Value;

fn run_with(foreign: HostLibrary, program: Vec<Node>) -> Res<Environment> {
    Interpreter::new()
        .with_foreign(foreign)
        .with_output(PrintHandler::Silent)
        .run_blocking(&program, &Environment::new())
}

fn eval(program: Vec<Node>, name: &str) -> Res<Value> {
    run_with(HostLibrary::new(), program).map(|scope| scope.get(name).unwrap_or(Value::Void))
}

#[test]
fn host_functions() {
    let floor = builtins::lookup("math", "floor");
    assert!(floor.is_some());
    if let Some(floor) = floor {
        assert_eq!(floor(&[JsonValue::from(2.7)]), Ok(JsonValue::from(2.0)));
    }

    if let Some(max) = builtins::lookup("math", "max") {
        let args = [JsonValue::from(1.0), JsonValue::from(5.0), JsonValue::from(3.0)];
        assert_eq!(max(&args), Ok(JsonValue::from(5.0)));
        assert!(max(&[]).is_err());
    }

    if let Some(upper) = builtins::lookup("string", "upper") {
        assert_eq!(upper(&[JsonValue::from("abc")]), Ok(JsonValue::from("ABC")));
        assert!(upper(&[JsonValue::from(1.0)]).is_err());
    }

    if let Some(repeat) = builtins::lookup("string", "repeat") {
        assert_eq!(
            repeat(&[JsonValue::from("ab"), JsonValue::from(3.0)]),
            Ok(JsonValue::from("ababab")),
        );
        assert!(repeat(&[JsonValue::from("ab"), JsonValue::from(1.5)]).is_err());
    }

    assert!(builtins::lookup("math", "nope").is_none());
    assert!(builtins::lookup("nope", "floor").is_none());
}

#[test]
fn resolution() {
    let lib = HostLibrary::new().register("app.greet", |_| Ok(JsonValue::from("hello")));

    assert!(block_on(lib.resolve(&["math".to_owned(), "sqrt".to_owned()])).is_ok());
    assert!(block_on(lib.resolve(&["app".to_owned(), "greet".to_owned()])).is_ok());

    let deep = |path: &str| path.split('.').map(str::to_owned).collect::<Vec<_>>();
    let lib = lib.register("net.http.get", |_| Ok(JsonValue::Null));
    assert!(block_on(lib.resolve(&deep("net.http.get"))).is_ok());
    assert!(block_on(lib.resolve(&deep("math.floor.inner"))).is_err());

    let err = block_on(lib.resolve(&["math".to_owned()])).err();
    assert_eq!(
        err.and_then(|e| e.reason().cloned()),
        Some(Reason::Collaborator(Collaborator::Unresolved("math".to_owned()))),
    );
}

#[test]
fn require_from_template() {
    let program = vec![
        bind("floor", unary("require", Node::list(vec![atom("math"), atom("floor")]))),
        bind("r", op("!", atom("floor"), Node::list(vec![num(2.7)]))),
    ];
    assert_seq!(eval(program, "r"), Value::from(2));
}

#[test]
fn require_from_dotted_name() {
    let program = vec![
        bind("concat", unary("require", string("string.concat"))),
        bind("a", string("foo")),
        bind("r", op("!", atom("concat"), Node::list(vec![atom("a"), string("bar")]))),
    ];
    assert_seq!(eval(program, "r"), Value::from("foobar"));
}

#[test_log::test]
fn foreign_errors_become_values() {
    let program = vec![
        bind("sqrt", unary("require", string("math.sqrt"))),
        bind("r", op("!", atom("sqrt"), Node::list(vec![num(-4.0)]))),
    ];
    assert_seq!(
        eval(program, "r"),
        Value::Error("Executed function returned an error: square root of negative number -4".to_owned()),
    );
}

#[test]
fn foreign_results_are_wrapped() {
    let lib = HostLibrary::new()
        .register("app.object", |_| Ok(JsonValue::new_object()))
        .register("app.count", |args| Ok((args.len() as f64).into()));

    let program = vec![
        bind("object", unary("require", string("app.object"))),
        bind("count", unary("require", string("app.count"))),
        bind("r", op("!", atom("object"), Node::void())),
        bind("n", op("!", atom("count"), Node::list(vec![num(1.0), string("x"), Node::void()]))),
        bind("m", op("!", atom("count"), num(9.0))),
    ];
    let scope = run_with(lib, program);
    assert!(scope.is_ok());
    if let Ok(scope) = scope {
        assert_eq!(scope.get("r"), Some(Value::Void));
        assert_eq!(scope.get("n"), Some(Value::from(3)));
        assert_eq!(scope.get("m"), Some(Value::from(1)));
    }
}

#[test]
fn unresolved_require() {
    let err = eval(vec![unary("require", string("math.nope"))], "x").err();
    assert_eq!(
        err.and_then(|e| e.reason().cloned()),
        Some(Reason::Collaborator(Collaborator::Unresolved("math.nope".to_owned()))),
    );
}
