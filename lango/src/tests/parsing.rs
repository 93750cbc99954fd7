use crate::ast::{Node, NodeKind};
use crate::error::{Collaborator, Reason};
use crate::parsing::{JsonAstParser, Parser};
use crate::types::{Key, Res};
use crate::value::Value;
use crate::{run_raw, Program};

fn parse(source: &str) -> Res<Program> {
    JsonAstParser.parse(source)
}

fn kinds(source: &str) -> Option<Vec<NodeKind>> {
    parse(source).ok().map(|program| program.iter().map(Node::kind).collect())
}

#[test]
fn leaves() {
    assert_eq!(
        kinds(concat!(
            "[",
            r#"{"type": "ATOM", "value": "x"},"#,
            r#"{"type": "ACCESSOR", "value": "y"},"#,
            r#"{"type": "NUMBER", "value": 1.5},"#,
            r#"{"type": "STRING", "value": "s"},"#,
            r#"{"type": "BOOL", "value": false},"#,
            r#"{"type": "VOID"},"#,
            r#"{"type": "OPERATOR", "value": "+"}"#,
            "]",
        )),
        Some(vec![
            NodeKind::Atom,
            NodeKind::Accessor,
            NodeKind::Literal,
            NodeKind::Literal,
            NodeKind::Literal,
            NodeKind::Literal,
            NodeKind::Operator,
        ]),
    );

    let program = parse(r#"{"type": "NUMBER", "value": 1.5}"#);
    assert!(matches!(program.as_deref(), Ok([Node::Literal(Value::Number(x))]) if *x == 1.5));

    let program = parse(r#"{"type": "ATOM", "value": "x"}"#);
    assert!(matches!(program.as_deref(), Ok([Node::Atom(name)]) if *name == Key::new("x")));
}

#[test]
fn expressions() {
    let program = parse(concat!(
        r#"{"type": "EXPRESSION", "operator": {"type": "OPERATOR", "value": "-"},"#,
        r#" "right": {"type": "NUMBER", "value": 3}}"#,
    ));
    assert!(matches!(
        program.as_deref(),
        Ok([Node::Expression { left, .. }]) if matches!(left.as_ref(), Node::Literal(Value::Void))
    ));
    assert!(program.map_or(false, |p| p[0].is_application_of("-")));
}

#[test]
fn structs_and_actions() {
    let program = parse(concat!(
        "[",
        r#"{"type": "STRUCT", "value": {"a": {"type": "NUMBER", "value": 1}}},"#,
        r#"{"type": "STRUCT", "value": [{"type": "NUMBER", "value": 1}, {"type": "NUMBER", "value": 2}]},"#,
        r#"{"type": "ACTION", "value": [{"type": "VOID"}]}"#,
        "]",
    ));
    assert!(program.is_ok());
    if let Ok(program) = program {
        match &program[0] {
            Node::Template(t) => assert!(t.contains_key(&Key::new("a"))),
            other => panic!("expected a template, found {}", other.kind()),
        }
        match &program[1] {
            Node::Template(t) => {
                assert!(t.contains_key(&Key::new("0")));
                assert!(t.contains_key(&Key::new("1")));
            }
            other => panic!("expected a template, found {}", other.kind()),
        }
        assert!(matches!(&program[2], Node::Literal(Value::Action(_))));
    }
}

#[test]
fn malformed() {
    let parse_error = |source: &str| {
        matches!(
            parse(source).err().and_then(|e| e.reason().cloned()),
            Some(Reason::Collaborator(Collaborator::Parse(_)))
        )
    };

    assert!(parse_error("not json"));
    assert!(parse_error(r#"{"value": 1}"#));
    assert!(parse_error(r#"{"type": "WIDGET"}"#));
    assert!(parse_error(r#"{"type": "NUMBER", "value": "one"}"#));
    assert!(parse_error(r#"{"type": "ATOM"}"#));
    assert!(parse_error(r#"{"type": "STRUCT", "value": 1}"#));
    assert!(parse_error(r#"{"type": "ACTION", "value": {}}"#));
    assert!(parse_error(r#"[{"type": "VOID"}, 3]"#));
}

#[test]
fn run_source() {
    let source = concat!(
        "[",
        r#"{"type": "EXPRESSION", "operator": {"type": "OPERATOR", "value": "<"},"#,
        r#" "left": {"type": "ATOM", "value": "x"},"#,
        r#" "right": {"type": "EXPRESSION", "operator": {"type": "OPERATOR", "value": "+"},"#,
        r#"   "left": {"type": "NUMBER", "value": 1}, "right": {"type": "NUMBER", "value": 2}}},"#,
        r#"{"type": "EXPRESSION", "operator": {"type": "OPERATOR", "value": "return"},"#,
        r#" "left": {"type": "VOID"}, "right": {"type": "ATOM", "value": "x"}}"#,
        "]",
    );
    let scope = run_raw(source);
    assert_eq!(scope.as_ref().map(|s| s.get("x")), Ok(Some(Value::from(3))));
    assert_eq!(scope.map(|s| json::stringify(s.to_json())), Ok(r#"{"x":3}"#.to_owned()));
}

#[test]
fn run_source_errors_are_rendered() {
    let err = run_raw(r#"{"type": "EXPRESSION", "operator": {"type": "OPERATOR", "value": "!"}, "left": {"type": "NUMBER", "value": 1}}"#).err();
    assert_eq!(
        err.as_ref().and_then(|e| e.rendered()),
        Some("Error: cannot call operand of type number\nwhile evaluating '!'"),
    );

    let err = run_raw("[").err();
    assert!(err.as_ref().and_then(|e| e.rendered()).map_or(false, |r| r.starts_with("Error: couldn't parse program")));
}

const UTIL_MODULE: &str = concat!(
    "[",
    r#"{"type": "EXPRESSION", "operator": {"type": "OPERATOR", "value": "module"},"#,
    r#" "right": {"type": "ATOM", "value": "util"}},"#,
    r#"{"type": "EXPRESSION", "operator": {"type": "OPERATOR", "value": "export"},"#,
    r#" "right": {"type": "NUMBER", "value": 5}}"#,
    "]",
);

const MAIN_PROGRAM: &str = concat!(
    "[",
    r#"{"type": "EXPRESSION", "operator": {"type": "OPERATOR", "value": "import"},"#,
    r#" "right": {"type": "ATOM", "value": "util"}},"#,
    r#"{"type": "EXPRESSION", "operator": {"type": "OPERATOR", "value": "<"},"#,
    r#" "left": {"type": "ATOM", "value": "x"}, "right": {"type": "ATOM", "value": "util"}}"#,
    "]",
);

#[test]
fn file_imports() {
    let dir = std::env::temp_dir().join(format!("lango-file-imports-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("lib")).unwrap();
    std::fs::write(dir.join("lib").join("util.lango"), UTIL_MODULE).unwrap();
    std::fs::write(dir.join("main.json"), MAIN_PROGRAM).unwrap();

    let scope = crate::run_file(&dir.join("main.json"));
    assert_eq!(scope.map(|s| s.get("x")), Ok(Some(Value::from(5))));

    let loader = crate::import::FileLoader::new(dir.clone());
    let program = futures::executor::block_on(crate::import::Loader::load(&loader, "lib/util.lango"));
    assert_eq!(program.map(|p| p.len()), Ok(2));

    let missing = futures::executor::block_on(crate::import::Loader::load(&loader, "lib/nope.lango")).err();
    assert!(matches!(
        missing.and_then(|e| e.reason().cloned()),
        Some(Reason::Collaborator(Collaborator::Load(path, _))) if path == "lib/nope.lango"
    ));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn loader_chain() {
    use crate::eval::Interpreter;
    use crate::import::{Loader, MemoryLoader, NullLoader, SeqLoader};
    use crate::Environment;

    let util = JsonAstParser.parse(UTIL_MODULE).unwrap();
    let loader = SeqLoader {
        loaders: vec![
            Box::new(NullLoader) as Box<dyn Loader>,
            Box::new(MemoryLoader::new().with("lib/util.lango", util)),
        ],
    };
    let interp = Interpreter::new().with_loader(loader);
    let main = JsonAstParser.parse(MAIN_PROGRAM).unwrap();
    let scope = interp.run_blocking(&main, &Environment::new());
    assert_eq!(scope.map(|s| s.get("x")), Ok(Some(Value::from(5))));

    let interp = Interpreter::new().with_loader(SeqLoader {
        loaders: vec![Box::new(NullLoader) as Box<dyn Loader>],
    });
    assert!(interp.run_blocking(&main, &Environment::new()).is_err());
}
