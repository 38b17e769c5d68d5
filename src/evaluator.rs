use crate::ast::{
    BlockStatement, Expression, Identifier, InfixOperator, Node, PrefixOperator, Program, Statement,
};
use crate::builtins;
use crate::environment::{Env, Environment};
use crate::object::{Function, HashKey, HashPair, Object};
use crate::quote;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;
use tracing::trace;

// --- Evaluation Error ---
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("identifier not found: {0}")]
    UnknownIdentifier(String),
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: &'static str,
        operator: InfixOperator,
        right: &'static str,
    },
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        right: &'static str,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: &'static str,
        operator: InfixOperator,
        right: &'static str,
    },
    #[error("not a function: {0}")]
    NotAFunction(&'static str),
    #[error("unusable as hash key: {0}")]
    UnusableHashKey(&'static str),
    #[error("index operator not supported: {0}")]
    IndexNotSupported(&'static str),
    #[error("wrong number of arguments: want={want}, got={got}")]
    WrongArgumentCount { want: usize, got: usize },
    #[error("{0}")]
    InvalidArguments(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("macro must return a quoted expression, got {0}")]
    MacroResultNotQuoted(&'static str),
    #[error("cannot unquote a value of type {0}")]
    Unquotable(&'static str),
}

// Result type alias for convenience
pub type EvalResult<T = Object> = Result<T, EvalError>;

// --- Evaluate Function ---

/// Evaluates a node within the specified environment.
///
/// Errors come back as `Object::Error` values. A program unwraps `return`;
/// a lone statement or block hands back the `ReturnValue` marker unchanged.
pub fn eval<'a>(node: impl Into<Node<'a>>, env: &Env) -> Object {
    let result = match node.into() {
        Node::Program(program) => eval_program(program, env),
        Node::Statement(statement) => eval_statement(statement, env),
        Node::Block(block) => eval_block(block, env),
        Node::Expression(expression) => eval_expression(expression, env),
    };
    result.unwrap_or_else(Object::Error)
}

pub(crate) fn eval_program(program: &Program, env: &Env) -> EvalResult {
    let mut result = Object::Null;
    for statement in &program.statements {
        match eval_statement(statement, env)? {
            Object::ReturnValue(value) => return Ok(*value),
            value => result = value,
        }
    }
    Ok(result)
}

/// Runs statements in order. A `return` stops the block and stays wrapped so
/// enclosing blocks stop too.
pub(crate) fn eval_block(block: &BlockStatement, env: &Env) -> EvalResult {
    let mut result = Object::Null;
    for statement in &block.statements {
        result = eval_statement(statement, env)?;
        if let Object::ReturnValue(_) = result {
            break;
        }
    }
    Ok(result)
}

fn eval_statement(statement: &Statement, env: &Env) -> EvalResult {
    match statement {
        Statement::Let { name, value } => {
            let value = eval_expression(value, env)?;
            env.borrow_mut().define(name.name(), value);
            Ok(Object::Null)
        }
        Statement::Return(value) => Ok(Object::ReturnValue(Box::new(eval_expression(
            value, env,
        )?))),
        Statement::Expression(expression) => eval_expression(expression, env),
        Statement::Block(block) => eval_block(block, env),
    }
}

pub(crate) fn eval_expression(expression: &Expression, env: &Env) -> EvalResult {
    match expression {
        Expression::Integer(value) => Ok(Object::Integer(*value)),
        Expression::String(value) => Ok(Object::String(value.clone())),
        Expression::Boolean(value) => Ok(Object::Boolean(*value)),
        Expression::Identifier(identifier) => eval_identifier(identifier, env),
        Expression::Prefix { operator, right } => {
            let right = eval_expression(right, env)?;
            eval_prefix_expression(*operator, right)
        }
        Expression::Infix {
            left,
            operator,
            right,
        } => {
            let left = eval_expression(left, env)?;
            let right = eval_expression(right, env)?;
            eval_infix_expression(*operator, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, env)?;
            if condition.is_truthy() {
                eval_block(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, env)
            } else {
                Ok(Object::Null)
            }
        }
        Expression::Function(literal) => Ok(Object::Function(Rc::new(Function {
            parameters: literal.parameters.clone(),
            body: literal.body.clone(),
            env: Rc::clone(env),
        }))),
        // Only reachable for macros that were not defined at the top level
        Expression::Macro(literal) => Ok(Object::Macro(Rc::new(Function {
            parameters: literal.parameters.clone(),
            body: literal.body.clone(),
            env: Rc::clone(env),
        }))),
        Expression::Call {
            function,
            arguments,
        } => {
            if matches!(function.as_ref(), Expression::Identifier(name) if name.name() == "quote") {
                return quote::quote(arguments, env);
            }
            let function = eval_expression(function, env)?;
            let arguments = eval_expressions(arguments, env)?;
            apply_function(function, arguments)
        }
        Expression::Array(elements) => Ok(Object::Array(Rc::new(eval_expressions(elements, env)?))),
        Expression::Hash(pairs) => eval_hash_literal(pairs, env),
        Expression::Index { left, index } => {
            let left = eval_expression(left, env)?;
            let index = eval_expression(index, env)?;
            eval_index_expression(left, index)
        }
    }
}

fn eval_identifier(identifier: &Identifier, env: &Env) -> EvalResult {
    if let Some(value) = env.borrow().get(identifier.name()) {
        return Ok(value);
    }
    builtins::lookup(identifier.name())
        .ok_or_else(|| EvalError::UnknownIdentifier(identifier.name().to_string()))
}

// Left to right, stopping at the first error
fn eval_expressions(expressions: &[Expression], env: &Env) -> EvalResult<Vec<Object>> {
    expressions
        .iter()
        .map(|expression| eval_expression(expression, env))
        .collect()
}

fn eval_prefix_expression(operator: PrefixOperator, right: Object) -> EvalResult {
    match (operator, right) {
        (PrefixOperator::Bang, right) => Ok(Object::Boolean(!right.is_truthy())),
        (PrefixOperator::Minus, Object::Integer(value)) => {
            Ok(Object::Integer(value.wrapping_neg()))
        }
        (PrefixOperator::Minus, right) => Err(EvalError::UnknownPrefixOperator {
            operator,
            right: right.type_name(),
        }),
    }
}

fn eval_infix_expression(operator: InfixOperator, left: Object, right: Object) -> EvalResult {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix_expression(operator, *l, *r),
        (Object::String(l), Object::String(r)) => eval_string_infix_expression(operator, l, r),
        _ => match operator {
            InfixOperator::Eq => Ok(Object::Boolean(left.is_identical(&right))),
            InfixOperator::NotEq => Ok(Object::Boolean(!left.is_identical(&right))),
            _ if left.type_name() != right.type_name() => Err(EvalError::TypeMismatch {
                left: left.type_name(),
                operator,
                right: right.type_name(),
            }),
            _ => Err(EvalError::UnknownInfixOperator {
                left: left.type_name(),
                operator,
                right: right.type_name(),
            }),
        },
    }
}

fn eval_integer_infix_expression(operator: InfixOperator, left: i64, right: i64) -> EvalResult {
    Ok(match operator {
        InfixOperator::Plus => Object::Integer(left.wrapping_add(right)),
        InfixOperator::Minus => Object::Integer(left.wrapping_sub(right)),
        InfixOperator::Asterisk => Object::Integer(left.wrapping_mul(right)),
        InfixOperator::Slash => {
            if right == 0 {
                return Err(EvalError::DivisionByZero);
            }
            Object::Integer(left.wrapping_div(right))
        }
        InfixOperator::Lt => Object::Boolean(left < right),
        InfixOperator::Gt => Object::Boolean(left > right),
        InfixOperator::Eq => Object::Boolean(left == right),
        InfixOperator::NotEq => Object::Boolean(left != right),
    })
}

fn eval_string_infix_expression(operator: InfixOperator, left: &str, right: &str) -> EvalResult {
    match operator {
        InfixOperator::Plus => Ok(Object::String(format!("{}{}", left, right))),
        _ => Err(EvalError::UnknownInfixOperator {
            left: "STRING",
            operator,
            right: "STRING",
        }),
    }
}

fn eval_hash_literal(pairs: &[(Expression, Expression)], env: &Env) -> EvalResult {
    let mut hash = HashMap::with_capacity(pairs.len());
    for (key_expression, value_expression) in pairs {
        let key = eval_expression(key_expression, env)?;
        let hash_key = HashKey::try_from(&key)?;
        let value = eval_expression(value_expression, env)?;
        hash.insert(hash_key, HashPair { key, value });
    }
    Ok(Object::Hash(Rc::new(hash)))
}

fn eval_index_expression(left: Object, index: Object) -> EvalResult {
    match (&left, &index) {
        // Out of range is null, not an error
        (Object::Array(elements), Object::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i))
            .cloned()
            .unwrap_or(Object::Null)),
        (Object::Hash(pairs), _) => {
            let key = HashKey::try_from(&index)?;
            Ok(pairs
                .get(&key)
                .map(|pair| pair.value.clone())
                .unwrap_or(Object::Null))
        }
        _ => Err(EvalError::IndexNotSupported(left.type_name())),
    }
}

/// Creates a scope enclosed in `outer` with `parameters` bound positionally.
pub(crate) fn extend_environment(
    parameters: &[Identifier],
    arguments: impl IntoIterator<Item = Object>,
    outer: &Env,
) -> Env {
    let env = Environment::new_enclosed(Rc::clone(outer));
    {
        let mut scope = env.borrow_mut();
        for (parameter, argument) in parameters.iter().zip(arguments) {
            scope.define(parameter.name(), argument);
        }
    }
    env
}

fn apply_function(function: Object, arguments: Vec<Object>) -> EvalResult {
    match function {
        Object::Function(function) => {
            if function.parameters.len() != arguments.len() {
                return Err(EvalError::WrongArgumentCount {
                    want: function.parameters.len(),
                    got: arguments.len(),
                });
            }
            trace!(arity = arguments.len(), "applying function");
            let env = extend_environment(&function.parameters, arguments, &function.env);
            Ok(eval_block(&function.body, &env)?.unwrap_return())
        }
        Object::Builtin(builtin) => {
            trace!(builtin = builtin.name, "applying builtin");
            (builtin.func)(arguments)
        }
        other => Err(EvalError::NotAFunction(other.type_name())),
    }
}
