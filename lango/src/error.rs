use std::fmt::Display;

use crate::ast::NodeKind;
use crate::types::{Operator, Type};

/// Enumerates reasons for structural errors: the AST does not have the shape
/// an operator requires.
#[derive(Debug, Clone, PartialEq)]
pub enum Structural {
    /// The operator field of an expression was some other kind of node.
    NotAnOperator(NodeKind),

    /// An operator node appeared outside the operator field of an expression.
    StrayOperator(String),

    /// No rule exists for this operator symbol.
    UnknownOperator(String),

    /// The left side of `<-` was not a `:` chain rooted at an atom.
    MalformedPath,

    /// Expected a name (atom or string literal), found something else.
    ExpectedName(NodeKind),

    /// Expected a field name (atom or accessor), found something else.
    ExpectedField(NodeKind),

    /// Unknown type name given to `new`.
    UnknownType(String),
}

/// Enumerates different type mismatch reasons.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeMismatch {
    /// Unsuitable operand types for a binary operator.
    BinOp(Type, Type, Operator),

    /// Unsuitable operand type for a unary operator.
    UnOp(Type, Operator),

    /// An operand of a specific type was required.
    Expected {
        operator: Operator,
        expected: Type,
        received: Type,
    },

    /// Iterating over a non-iterable.
    Iterate(Type),

    /// Using a value without textual form as a struct key.
    Key(Type),

    /// Calling an action with something that isn't a struct of arguments.
    Arguments(Type),
}

/// Enumerates failures reported by, or about, external collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum Collaborator {
    /// The loader couldn't produce a program for this path.
    Load(String, String),

    /// The parser rejected its input.
    Parse(String),

    /// An imported program did not declare a module.
    NoModule(String),

    /// `export` was used before `module`.
    ModuleUndeclared,

    /// A foreign path didn't resolve to a callable.
    Unresolved(String),
}

/// Grand enumeration of all possible error reasons.
#[derive(Debug, Clone, PartialEq)]
pub enum Reason {
    /// Unknown reason - should never happen.
    None,

    /// Malformed AST.
    Structural(Structural),

    /// Type mismatch errors.
    TypeMismatch(TypeMismatch),

    /// Applying `!` to something that isn't callable.
    Call(Type),

    /// Loader, parser or foreign runtime failures.
    Collaborator(Collaborator),

    /// Error raised by a native function.
    External(String),
}

impl From<Structural> for Reason {
    fn from(value: Structural) -> Self {
        Self::Structural(value)
    }
}

impl From<TypeMismatch> for Reason {
    fn from(value: TypeMismatch) -> Self {
        Self::TypeMismatch(value)
    }
}

impl From<Collaborator> for Reason {
    fn from(value: Collaborator) -> Self {
        Self::Collaborator(value)
    }
}

/// The general error type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Error {
    /// Operators the error propagated through, innermost first.
    locations: Option<Vec<Operator>>,

    /// Reason for the error.
    reason: Option<Reason>,

    /// Human friendly string representation.
    rendered: Option<String>,
}

impl Error {
    /// Construct a new error with an empty stack.
    pub fn new<T>(reason: T) -> Self
    where
        Reason: From<T>,
    {
        Self {
            locations: None,
            reason: Some(Reason::from(reason)),
            rendered: None,
        }
    }

    /// Append an operator to the stack. Takes ownership and returns the same
    /// object, for ease of use with `Result::map_err`.
    pub(crate) fn tag(mut self, operator: Operator) -> Self {
        match &mut self.locations {
            None => {
                self.locations = Some(vec![operator]);
            }
            Some(vec) => {
                vec.push(operator);
            }
        }
        self
    }

    pub fn reason(&self) -> Option<&Reason> {
        self.reason.as_ref()
    }

    /// The operators the error propagated through, innermost first.
    pub fn locations(&self) -> &[Operator] {
        self.locations.as_deref().unwrap_or(&[])
    }

    /// Get the human-friendly text
    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }

    /// Add a human-friendly string representation.
    pub fn render(mut self) -> Self {
        if self.rendered.is_none() {
            self.rendered = Some(format!("{}", ErrorRenderer(&self)));
        }
        self
    }
}

impl Display for Structural {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnOperator(kind) => write!(f, "operator has to be of type operator (is {})", kind),
            Self::StrayOperator(symbol) => write!(f, "operator '{}' outside of an expression", symbol),
            Self::UnknownOperator(symbol) => write!(f, "operator \"{}\" is not defined", symbol),
            Self::MalformedPath => f.write_str("left operand has to be a field chain rooted at an atom"),
            Self::ExpectedName(kind) => write!(f, "expected a name, found {}", kind),
            Self::ExpectedField(kind) => write!(f, "right operand has to be an atom or accessor, found {}", kind),
            Self::UnknownType(name) => write!(f, "unknown type '{}'", name),
        }
    }
}

impl Display for TypeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BinOp(l, r, op) => write!(f, "unsuitable types for '{}': {} and {}", op, l, r),
            Self::UnOp(x, op) => write!(f, "unsuitable type for '{}': {}", op, x),
            Self::Expected { operator, expected, received } => {
                write!(f, "'{}' expected {}, got {}", operator, expected, received)
            }
            Self::Iterate(x) => write!(f, "non-iterable type: {}", x),
            Self::Key(x) => write!(f, "unsuitable type for struct key: {}", x),
            Self::Arguments(x) => write!(f, "unsuitable type for arguments: {}", x),
        }
    }
}

impl Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(path, reason) => write!(f, "couldn't load '{}': {}", path, reason),
            Self::Parse(reason) => write!(f, "couldn't parse program: {}", reason),
            Self::NoModule(path) => write!(f, "imported program '{}' declares no module", path),
            Self::ModuleUndeclared => f.write_str("you need to define module first"),
            Self::Unresolved(path) => write!(f, "couldn't resolve foreign function '{}'", path),
        }
    }
}

impl Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => {
                f.write_str("unknown reason - this should not happen, please file a bug report")
            }
            Self::Structural(x) => Display::fmt(x, f),
            Self::TypeMismatch(x) => Display::fmt(x, f),
            Self::Call(x) => write!(f, "cannot call operand of type {}", x),
            Self::Collaborator(x) => Display::fmt(x, f),
            Self::External(x) => write!(f, "external error: {}", x),
        }
    }
}

/// Utility struct for facilitating error rendering.
struct ErrorRenderer<'a>(&'a Error);

impl<'a> Display for ErrorRenderer<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ErrorRenderer(err) = self;

        write!(f, "Error: {}", err.reason.as_ref().unwrap_or(&Reason::None))?;
        for op in err.locations() {
            write!(f, "\nwhile evaluating '{}'", op)?;
        }

        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.rendered {
            Some(text) => f.write_str(text),
            None => Display::fmt(&ErrorRenderer(self), f),
        }
    }
}

impl std::error::Error for Error {}
