//! Macro definition and expansion.
//!
//! Both passes run on a parsed program before evaluation. `define_macros`
//! moves top-level `let name = macro(..) {..}` statements into an
//! environment, then `expand_macros` replaces each call to one of those names
//! with the syntax tree its body quotes.

use crate::ast::{Expression, FunctionLiteral, Identifier, Program, Statement};
use crate::environment::Env;
use crate::evaluator::{EvalError, EvalResult, eval_block, extend_environment};
use crate::object::{Function, Object};
use std::rc::Rc;
use tracing::debug;

fn macro_definition(statement: &Statement) -> Option<(&Identifier, &FunctionLiteral)> {
    match statement {
        Statement::Let {
            name,
            value: Expression::Macro(literal),
        } => Some((name, literal)),
        _ => None,
    }
}

/// Binds every top-level macro definition in `env` and removes it from the
/// program. Definitions nested in blocks or function bodies are left alone.
#[tracing::instrument(level = "debug", skip_all)]
pub fn define_macros(program: &mut Program, env: &Env) {
    program.statements.retain(|statement| {
        let Some((name, literal)) = macro_definition(statement) else {
            return true;
        };
        debug!(macro_name = name.name(), arity = literal.parameters.len(), "defining macro");
        let definition = Function {
            parameters: literal.parameters.clone(),
            body: literal.body.clone(),
            env: Rc::clone(env),
        };
        env.borrow_mut()
            .define(name.name(), Object::Macro(Rc::new(definition)));
        false
    });
}

/// Rewrites every call to a macro bound in `env`.
///
/// The rewrite is post-order, so macro calls passed as arguments are
/// expanded before the enclosing call sees them. Expanded output is not
/// expanded again.
#[tracing::instrument(level = "debug", skip_all)]
pub fn expand_macros(program: Program, env: &Env) -> EvalResult<Program> {
    program.modify(&mut |expression| expand_macro_call(expression, env))
}

fn lookup_macro(function: &Expression, env: &Env) -> Option<Rc<Function>> {
    let Expression::Identifier(identifier) = function else {
        return None;
    };
    match env.borrow().get(identifier.name()) {
        Some(Object::Macro(definition)) => Some(definition),
        _ => None,
    }
}

fn expand_macro_call(expression: Expression, env: &Env) -> EvalResult<Expression> {
    match expression {
        Expression::Call {
            function,
            arguments,
        } => match lookup_macro(&function, env) {
            Some(definition) => {
                debug!(call = %function, arguments = arguments.len(), "expanding macro");
                expand(&definition, arguments)
            }
            None => Ok(Expression::Call {
                function,
                arguments,
            }),
        },
        other => Ok(other),
    }
}

fn expand(definition: &Function, arguments: Vec<Expression>) -> EvalResult<Expression> {
    if definition.parameters.len() != arguments.len() {
        return Err(EvalError::WrongArgumentCount {
            want: definition.parameters.len(),
            got: arguments.len(),
        });
    }
    let quoted = arguments
        .into_iter()
        .map(|argument| Object::Quote(Rc::new(argument)));
    let env = extend_environment(&definition.parameters, quoted, &definition.env);
    match eval_block(&definition.body, &env)?.unwrap_return() {
        Object::Quote(expression) => Ok(Rc::unwrap_or_clone(expression)),
        other => Err(EvalError::MacroResultNotQuoted(other.type_name())),
    }
}
