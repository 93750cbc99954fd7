macro_rules! assert_seq {
    ($x:expr , $y:expr $(,)?) => {
        assert_eq!($x, Ok($y))
    };
}

mod foreign;
mod parsing;
mod value;

use crate::ast::Node;

// Small AST constructors standing in for the grammar.

pub(crate) fn num(x: f64) -> Node {
    Node::literal(x)
}

pub(crate) fn string(x: &str) -> Node {
    Node::literal(x)
}

pub(crate) fn atom(name: &str) -> Node {
    Node::atom(name)
}

pub(crate) fn op(symbol: &str, left: Node, right: Node) -> Node {
    Node::expr(symbol, left, right)
}

/// Unary application: the left operand is void.
pub(crate) fn unary(symbol: &str, right: Node) -> Node {
    Node::expr(symbol, Node::void(), right)
}

pub(crate) fn bind(name: &str, value: Node) -> Node {
    op("<", atom(name), value)
}

/// `a:b:c` for a list of names.
pub(crate) fn path(names: &[&str]) -> Node {
    let mut iter = names.iter();
    let mut node = atom(iter.next().copied().unwrap_or_default());
    for name in iter {
        node = op(":", node, atom(name));
    }
    node
}
