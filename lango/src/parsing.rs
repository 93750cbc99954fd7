//! Decoding of the AST interchange format.
//!
//! The grammar itself lives outside this crate. Its output is a tree of JSON
//! node objects, each carrying a `"type"` tag:
//!
//! ```text
//! {"type": "EXPRESSION", "operator": {"type": "OPERATOR", "value": "+"},
//!  "left": {"type": "NUMBER", "value": 1}, "right": {"type": "ATOM", "value": "x"}}
//! ```
//!
//! A program is either an array of such nodes or a single node.

use json::JsonValue;

use crate::ast::{Node, Program};
use crate::error::{Collaborator, Error};
use crate::types::{Key, Res};
use crate::value::Value;

/// Turns source text into a program.
pub trait Parser {
    fn parse(&self, source: &str) -> Res<Program>;
}

/// Parser for the JSON serialization of the AST.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonAstParser;

impl Parser for JsonAstParser {
    fn parse(&self, source: &str) -> Res<Program> {
        let tree = json::parse(source).map_err(|e| malformed(e.to_string()))?;
        program_from_json(&tree)
    }
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::new(Collaborator::Parse(reason.into()))
}

pub fn program_from_json(tree: &JsonValue) -> Res<Program> {
    match tree {
        JsonValue::Array(nodes) => nodes.iter().map(node_from_json).collect(),
        _ => Ok(vec![node_from_json(tree)?]),
    }
}

fn text<'a>(node: &'a JsonValue, tag: &str) -> Res<&'a str> {
    node["value"]
        .as_str()
        .ok_or_else(|| malformed(format!("{} node needs a string value", tag)))
}

/// Missing operands are void.
fn operand(node: &JsonValue) -> Res<Node> {
    if node.is_null() {
        Ok(Node::void())
    } else {
        node_from_json(node)
    }
}

pub fn node_from_json(node: &JsonValue) -> Res<Node> {
    let tag = node["type"]
        .as_str()
        .ok_or_else(|| malformed("node without a type tag"))?;

    match tag {
        "EXPRESSION" => Ok(Node::Expression {
            operator: Box::new(node_from_json(&node["operator"])?),
            left: Box::new(operand(&node["left"])?),
            right: Box::new(operand(&node["right"])?),
        }),
        "OPERATOR" => Ok(Node::Operator(text(node, tag)?.to_owned())),
        "ATOM" => Ok(Node::Atom(Key::new(text(node, tag)?))),
        "ACCESSOR" => Ok(Node::Accessor(Key::new(text(node, tag)?))),
        "STRING" => Ok(Node::literal(text(node, tag)?)),
        "NUMBER" => node["value"]
            .as_f64()
            .map(Node::literal)
            .ok_or_else(|| malformed("NUMBER node needs a numeric value")),
        "BOOL" => node["value"]
            .as_bool()
            .map(Node::literal)
            .ok_or_else(|| malformed("BOOL node needs a boolean value")),
        "VOID" => Ok(Node::Literal(Value::Void)),
        "STRUCT" => match &node["value"] {
            JsonValue::Array(elements) => {
                let elements = elements.iter().map(node_from_json).collect::<Res<Vec<_>>>()?;
                Ok(Node::list(elements))
            }
            JsonValue::Object(entries) => {
                let mut template = Vec::new();
                for (key, entry) in entries.iter() {
                    template.push((key, node_from_json(entry)?));
                }
                Ok(Node::template(template))
            }
            _ => Err(malformed("STRUCT node needs an object or array value")),
        },
        "ACTION" => match &node["value"] {
            JsonValue::Array(body) => {
                let body = body.iter().map(node_from_json).collect::<Res<Vec<_>>>()?;
                Ok(Node::action(body))
            }
            _ => Err(malformed("ACTION node needs an array value")),
        },
        other => Err(malformed(format!("unknown node type '{}'", other))),
    }
}
