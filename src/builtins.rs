use std::fmt;
use std::rc::Rc;

use crate::evaluator::{EvalError, EvalResult};
use crate::object::Object;

pub type BuiltinFunction = fn(Vec<Object>) -> EvalResult;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFunction,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

// Function pointers don't compare reliably, names are unique in the table.
impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

const BUILTINS: [Builtin; 6] = [
    Builtin {
        name: "len",
        func: builtin_len,
    },
    Builtin {
        name: "first",
        func: builtin_first,
    },
    Builtin {
        name: "last",
        func: builtin_last,
    },
    Builtin {
        name: "rest",
        func: builtin_rest,
    },
    Builtin {
        name: "push",
        func: builtin_push,
    },
    Builtin {
        name: "puts",
        func: builtin_puts,
    },
];

/// Finds a built-in by name. Consulted after the environment chain, so user
/// bindings shadow built-ins.
pub fn lookup(name: &str) -> Option<Object> {
    BUILTINS
        .iter()
        .find(|builtin| builtin.name == name)
        .map(|builtin| Object::Builtin(*builtin))
}

pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|builtin| builtin.name)
}

// Checks the number of arguments
macro_rules! check_arity {
    ($args:expr, $expected:expr) => {
        if $args.len() != $expected {
            return Err(EvalError::InvalidArguments(format!(
                "wrong number of arguments. got={}, want={}",
                $args.len(),
                $expected
            )));
        }
    };
}

// Extracts the elements of an array argument or returns an argument error
macro_rules! expect_array {
    ($arg:expr, $name:expr) => {
        match $arg {
            Object::Array(elements) => elements,
            other => {
                return Err(EvalError::InvalidArguments(format!(
                    "argument to `{}` must be ARRAY, got {}",
                    $name,
                    other.type_name()
                )));
            }
        }
    };
}

fn builtin_len(args: Vec<Object>) -> EvalResult {
    check_arity!(args, 1);
    match &args[0] {
        Object::String(value) => Ok(Object::Integer(value.len() as i64)),
        Object::Array(elements) => Ok(Object::Integer(elements.len() as i64)),
        other => Err(EvalError::InvalidArguments(format!(
            "argument to `len` not supported, got {}",
            other.type_name()
        ))),
    }
}

fn builtin_first(args: Vec<Object>) -> EvalResult {
    check_arity!(args, 1);
    let elements = expect_array!(&args[0], "first");
    Ok(elements.first().cloned().unwrap_or(Object::Null))
}

fn builtin_last(args: Vec<Object>) -> EvalResult {
    check_arity!(args, 1);
    let elements = expect_array!(&args[0], "last");
    Ok(elements.last().cloned().unwrap_or(Object::Null))
}

fn builtin_rest(args: Vec<Object>) -> EvalResult {
    check_arity!(args, 1);
    let elements = expect_array!(&args[0], "rest");
    if elements.is_empty() {
        return Ok(Object::Null);
    }
    Ok(Object::Array(Rc::new(elements[1..].to_vec())))
}

fn builtin_push(args: Vec<Object>) -> EvalResult {
    check_arity!(args, 2);
    let elements = expect_array!(&args[0], "push");
    let mut pushed = Vec::with_capacity(elements.len() + 1);
    pushed.extend(elements.iter().cloned());
    pushed.push(args[1].clone());
    Ok(Object::Array(Rc::new(pushed)))
}

fn builtin_puts(args: Vec<Object>) -> EvalResult {
    for arg in &args {
        println!("{}", arg);
    }
    Ok(Object::Null)
}
