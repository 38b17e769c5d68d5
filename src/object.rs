use crate::ast::{BlockStatement, Expression, Identifier};
use crate::builtins::Builtin;
use crate::environment::Env;
use crate::evaluator::EvalError;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Runtime values produced by evaluation.
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    // Arrays and hashes are shared, so `==` can compare them by identity
    Array(Rc<Vec<Object>>),
    Hash(Rc<HashMap<HashKey, HashPair>>),
    Function(Rc<Function>),
    Macro(Rc<Function>),
    Builtin(Builtin),
    /// An unevaluated expression captured by `quote`.
    Quote(Rc<Expression>),
    /// Marks a `return` while it unwinds enclosing blocks.
    ReturnValue(Box<Object>),
    Error(EvalError),
    Null,
}

impl Object {
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::String(_) => "STRING",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Function(_) => "FUNCTION",
            Object::Macro(_) => "MACRO",
            Object::Builtin(_) => "BUILTIN",
            Object::Quote(_) => "QUOTE",
            Object::ReturnValue(_) => "RETURN_VALUE",
            Object::Error(_) => "ERROR",
            Object::Null => "NULL",
        }
    }

    /// Only `false` and `null` are falsy; zero, empty strings and empty
    /// arrays are all truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    /// Equality used by `==`/`!=` outside the integer and string cases.
    ///
    /// Booleans and null compare by value. Every other kind compares by
    /// identity, so two separately built `[1]` arrays are not equal.
    pub fn is_identical(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Array(a), Object::Array(b)) => Rc::ptr_eq(a, b),
            (Object::Hash(a), Object::Hash(b)) => Rc::ptr_eq(a, b),
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::Macro(a), Object::Macro(b)) => Rc::ptr_eq(a, b),
            (Object::Quote(a), Object::Quote(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a == b,
            _ => false,
        }
    }

    pub fn unwrap_return(self) -> Object {
        match self {
            Object::ReturnValue(value) => *value,
            other => other,
        }
    }
}

/// The subset of objects usable as hash keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(String),
}

impl TryFrom<&Object> for HashKey {
    type Error = EvalError;

    fn try_from(object: &Object) -> Result<Self, Self::Error> {
        match object {
            Object::Integer(value) => Ok(HashKey::Integer(*value)),
            Object::Boolean(value) => Ok(HashKey::Boolean(*value)),
            Object::String(value) => Ok(HashKey::String(value.clone())),
            other => Err(EvalError::UnusableHashKey(other.type_name())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// A closure: parameters and body plus the environment it was created in.
/// Macros share the same shape.
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env,
}

// The captured environment usually contains this function, so it is left out.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body.to_string())
            .finish_non_exhaustive()
    }
}

fn write_callable(
    f: &mut fmt::Formatter<'_>,
    keyword: &str,
    function: &Function,
) -> fmt::Result {
    let parameters: Vec<&str> = function.parameters.iter().map(|p| p.name()).collect();
    write!(
        f,
        "{}({}) {{\n{}\n}}",
        keyword,
        parameters.join(", "),
        function.body
    )
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::String(value) => write!(f, "{}", value),
            Object::Array(elements) => {
                let elements: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", elements.join(", "))
            }
            Object::Hash(pairs) => {
                let pairs: Vec<String> = pairs
                    .values()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Object::Function(function) => write_callable(f, "fn", function),
            Object::Macro(function) => write_callable(f, "macro", function),
            Object::Builtin(_) => write!(f, "builtin function"),
            Object::Quote(expression) => write!(f, "QUOTE({})", expression),
            Object::ReturnValue(value) => write!(f, "{}", value),
            Object::Error(error) => write!(f, "ERROR: {}", error),
            Object::Null => write!(f, "null"),
        }
    }
}
