use crate::ParseError;
use crate::environment::{Env, Environment};
use crate::evaluator::eval;
use crate::macros::{define_macros, expand_macros};
use crate::object::Object;
use crate::parser::parse_str;
use tracing::debug;

/// State that lives for a whole REPL session or script run: one environment
/// for ordinary bindings and one for macros.
pub struct Session {
    env: Env,
    macro_env: Env,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            env: Environment::new(),
            macro_env: Environment::new(),
        }
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn macro_env(&self) -> &Env {
        &self.macro_env
    }

    /// Parses, expands and evaluates one input. Runtime errors, including
    /// failed expansions, come back as `Object::Error`.
    pub fn run(&self, input: &str) -> Result<Object, ParseError> {
        let mut program = parse_str(input)?;
        define_macros(&mut program, &self.macro_env);
        let program = match expand_macros(program, &self.macro_env) {
            Ok(program) => program,
            Err(error) => return Ok(Object::Error(error)),
        };
        debug!(statements = program.statements.len(), "evaluating program");
        Ok(eval(&program, &self.env))
    }
}
