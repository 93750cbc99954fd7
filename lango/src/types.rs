use std::fmt::Display;
use std::str::FromStr;

use symbol_table::GlobalSymbol;

use crate::error::Error;
use crate::value::Value;
use crate::wrappers::OrderedMap;

/// Type used for identifiers, struct field names and reserved scope keys.
pub type Key = GlobalSymbol;

/// Storage of a struct value. Environments use the same type for their
/// bindings, which is what lets `$` expose a scope as a struct.
pub type Map = OrderedMap<Key, Value>;

/// Standard result type used throughout the evaluator.
pub type Res<T> = Result<T, Error>;

/// Reserved scope keys.
pub(crate) mod reserved {
    pub const RETURN: &str = "__return__";
    pub const MODULE_NAME: &str = "__module_name__";
    pub const MODULE: &str = "__module__";
    pub const RECEIVER: &str = "$";
    pub const VALUE: &str = "$value";
    pub const INDEX: &str = "$i";
}

/// Shared, mutable, garbage-collected cell. Cloning the wrapper shares the
/// underlying storage.
#[derive(gc::Trace, gc::Finalize)]
pub struct GcCell<T: ?Sized + 'static>(gc::Gc<gc::GcCell<T>>);

impl<T: ?Sized + gc::Trace> Clone for GcCell<T> {
    fn clone(&self) -> Self {
        GcCell(self.0.clone())
    }
}

impl<T: gc::Trace> GcCell<T> {
    pub fn new(obj: T) -> GcCell<T> {
        GcCell(gc::Gc::new(gc::GcCell::new(obj)))
    }

    pub fn borrow(&self) -> gc::GcCellRef<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> gc::GcCellRefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// True if both wrappers point to the same storage.
    pub fn ptr_eq(&self, other: &GcCell<T>) -> bool {
        gc::Gc::ptr_eq(&self.0, &other.0)
    }
}

/// Enumeration of all the different types a value can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Number,
    String,
    Bool,
    Struct,
    Function,
    Action,
    Void,
    Error,
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
            Self::Bool => f.write_str("bool"),
            Self::Struct => f.write_str("struct"),
            Self::Function => f.write_str("function"),
            Self::Action => f.write_str("action"),
            Self::Void => f.write_str("void"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Enumerates every operator of the language. Dispatch in the evaluator is an
/// exhaustive match over this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Variable binding `<`
    Bind,

    /// Addition `+`
    Add,

    /// Subtraction or unary negation `-`
    Subtract,

    /// Equality `==`
    Equal,

    /// Inequality `!=`
    NotEqual,

    /// Field read by name `:`
    Field,

    /// Field read by computed key `<=`
    KeyRead,

    /// Scope capture `@`
    Capture,

    /// Function or action application `!`
    Call,

    /// Conditional `?`
    Branch,

    /// Iteration `<>`
    Each,

    /// In-place append `</`
    Append,

    /// Nested path assignment `<-`
    Assign,

    /// Constructor `new`
    New,

    /// Module declaration `module`
    Module,

    /// Module export `export`
    Export,

    /// Module import `import`
    Import,

    /// Foreign function resolution `require`
    Require,

    /// Debug output `print`
    Print,

    /// Block result `return`
    Return,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Bind => "<",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Field => ":",
            Self::KeyRead => "<=",
            Self::Capture => "@",
            Self::Call => "!",
            Self::Branch => "?",
            Self::Each => "<>",
            Self::Append => "</",
            Self::Assign => "<-",
            Self::New => "new",
            Self::Module => "module",
            Self::Export => "export",
            Self::Import => "import",
            Self::Require => "require",
            Self::Print => "print",
            Self::Return => "return",
        }
    }
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => Ok(Self::Bind),
            "+" => Ok(Self::Add),
            "-" => Ok(Self::Subtract),
            "==" => Ok(Self::Equal),
            "!=" => Ok(Self::NotEqual),
            ":" => Ok(Self::Field),
            "<=" => Ok(Self::KeyRead),
            "@" => Ok(Self::Capture),
            "!" => Ok(Self::Call),
            "?" => Ok(Self::Branch),
            "<>" => Ok(Self::Each),
            "</" => Ok(Self::Append),
            "<-" => Ok(Self::Assign),
            "new" => Ok(Self::New),
            "module" => Ok(Self::Module),
            "export" => Ok(Self::Export),
            "import" => Ok(Self::Import),
            "require" => Ok(Self::Require),
            "print" => Ok(Self::Print),
            "return" => Ok(Self::Return),
            _ => Err(()),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
