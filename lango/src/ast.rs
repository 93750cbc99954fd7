use std::fmt::Display;

use crate::types::Key;
use crate::value::{Action, Value};
use crate::wrappers::OrderedMap;

/// A struct template: the parser's rendition of struct literals, list
/// literals and argument lists. Entries are unevaluated nodes.
pub type Template = OrderedMap<Key, Node>;

/// A parsed program: a sequence of top-level nodes.
pub type Program = Vec<Node>;

/// An AST node, as produced by the external parser.
#[derive(Clone, Debug)]
pub enum Node {
    /// Binary application. The operator must be an [`Node::Operator`].
    Expression {
        operator: Box<Node>,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// An operator token.
    Operator(String),

    /// An identifier, or a bare literal if unbound.
    Atom(Key),

    /// An identifier used as a computed struct key.
    Accessor(Key),

    /// A pre-built constant.
    Literal(Value),

    /// A struct template.
    Template(Template),
}

/// Discriminant of [`Node`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Expression,
    Operator,
    Atom,
    Accessor,
    Literal,
    Template,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expression => f.write_str("expression"),
            Self::Operator => f.write_str("operator"),
            Self::Atom => f.write_str("atom"),
            Self::Accessor => f.write_str("accessor"),
            Self::Literal => f.write_str("literal"),
            Self::Template => f.write_str("struct template"),
        }
    }
}

impl Node {
    pub fn expr(operator: &str, left: Node, right: Node) -> Node {
        Node::Expression {
            operator: Box::new(Node::Operator(operator.to_owned())),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn atom(name: &str) -> Node {
        Node::Atom(Key::new(name))
    }

    pub fn accessor(name: &str) -> Node {
        Node::Accessor(Key::new(name))
    }

    pub fn void() -> Node {
        Node::Literal(Value::Void)
    }

    pub fn literal(value: impl Into<Value>) -> Node {
        Node::Literal(value.into())
    }

    pub fn action(body: Vec<Node>) -> Node {
        Node::Literal(Value::Action(Action::new(body)))
    }

    /// A struct template with named entries.
    pub fn template<K: AsRef<str>>(entries: Vec<(K, Node)>) -> Node {
        Node::Template(
            entries
                .into_iter()
                .map(|(k, v)| (Key::new(k.as_ref()), v))
                .collect(),
        )
    }

    /// A struct template with entries keyed by position.
    pub fn list(elements: Vec<Node>) -> Node {
        Node::Template(
            elements
                .into_iter()
                .enumerate()
                .map(|(i, v)| (Key::new(i.to_string()), v))
                .collect(),
        )
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Expression { .. } => NodeKind::Expression,
            Self::Operator(_) => NodeKind::Operator,
            Self::Atom(_) => NodeKind::Atom,
            Self::Accessor(_) => NodeKind::Accessor,
            Self::Literal(_) => NodeKind::Literal,
            Self::Template(_) => NodeKind::Template,
        }
    }

    /// True if this is an expression applying the given operator symbol.
    pub fn is_application_of(&self, symbol: &str) -> bool {
        match self {
            Self::Expression { operator, .. } => matches!(operator.as_ref(), Node::Operator(s) if s == symbol),
            _ => false,
        }
    }

    /// The textual name carried by this node, if it is a name-like leaf: an
    /// atom, an accessor or a string literal.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Atom(name) | Self::Accessor(name) => Some(name.as_str()),
            Self::Literal(Value::String(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}
