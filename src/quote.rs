use crate::ast::Expression;
use crate::environment::Env;
use crate::evaluator::{EvalError, EvalResult, eval_expression};
use crate::object::Object;
use std::rc::Rc;

/// The `quote` special form: captures its single argument unevaluated,
/// splicing in every `unquote(..)` it contains.
pub(crate) fn quote(arguments: &[Expression], env: &Env) -> EvalResult {
    let [expression] = arguments else {
        return Err(EvalError::WrongArgumentCount {
            want: 1,
            got: arguments.len(),
        });
    };
    let expression = expression
        .clone()
        .modify(&mut |node| eval_unquote_call(node, env))?;
    Ok(Object::Quote(Rc::new(expression)))
}

fn is_unquote_call(function: &Expression, arguments: &[Expression]) -> bool {
    arguments.len() == 1
        && matches!(function, Expression::Identifier(name) if name.name() == "unquote")
}

fn eval_unquote_call(expression: Expression, env: &Env) -> EvalResult<Expression> {
    match expression {
        Expression::Call {
            function,
            mut arguments,
        } if is_unquote_call(&function, &arguments) => {
            let inner = arguments.remove(0);
            let value = eval_expression(&inner, env)?.unwrap_return();
            object_to_expression(value)
        }
        other => Ok(other),
    }
}

/// Turns an evaluated value back into syntax so it can be spliced into a
/// quoted tree.
pub(crate) fn object_to_expression(object: Object) -> EvalResult<Expression> {
    match object {
        Object::Integer(value) => Ok(Expression::Integer(value)),
        Object::Boolean(value) => Ok(Expression::Boolean(value)),
        Object::String(value) => Ok(Expression::String(value)),
        Object::Quote(expression) => Ok(Rc::unwrap_or_clone(expression)),
        other => Err(EvalError::Unquotable(other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::evaluator::eval;
    use crate::parser::parse_str;
    use pretty_assertions::assert_eq;

    fn eval_input(input: &str) -> Object {
        let program = parse_str(input)
            .unwrap_or_else(|e| panic!("Parsing failed for input '{}': {}", input, e));
        eval(&program, &Environment::new())
    }

    fn assert_quoted(input: &str, expected: &str) {
        match eval_input(input) {
            Object::Quote(expression) => {
                assert_eq!(expression.to_string(), expected, "Input: '{}'", input)
            }
            other => panic!("Expected a quote for input '{}', got {}", input, other),
        }
    }

    #[test]
    fn test_quote() {
        let cases = [
            ("quote(5)", "5"),
            ("quote(5 + 8)", "(5 + 8)"),
            ("quote(foobar)", "foobar"),
            ("quote(foobar + barfoo)", "(foobar + barfoo)"),
            ("quote(fn(x) { x * 2 })", "fn(x) (x * 2)"),
        ];
        for (input, expected) in cases {
            assert_quoted(input, expected);
        }
    }

    #[test]
    fn test_quote_unquote() {
        let cases = [
            ("quote(unquote(4))", "4"),
            ("quote(unquote(4 + 4))", "8"),
            ("quote(8 + unquote(4 + 4))", "(8 + 8)"),
            ("quote(unquote(4 + 4) + 8)", "(8 + 8)"),
            ("let foobar = 8; quote(foobar)", "foobar"),
            ("let foobar = 8; quote(unquote(foobar))", "8"),
            ("quote(unquote(true))", "true"),
            ("quote(unquote(true == false))", "false"),
            ("quote(unquote(quote(4 + 4)))", "(4 + 4)"),
            (
                "let quotedInfixExpression = quote(4 + 4);
                 quote(unquote(4 + 4) + unquote(quotedInfixExpression))",
                "(8 + (4 + 4))",
            ),
            ("quote(unquote(\"mon\" + \"key\"))", "\"monkey\""),
            ("quote(fn() { unquote(1 + 1) })", "fn() 2"),
        ];
        for (input, expected) in cases {
            assert_quoted(input, expected);
        }
    }

    #[test]
    fn test_quote_copies_argument() {
        let program = parse_str("quote(1 + 2)").expect("program should parse");
        let before = program.to_string();
        let env = Environment::new();
        assert!(matches!(eval(&program, &env), Object::Quote(_)));
        assert_eq!(program.to_string(), before);
    }

    #[test]
    fn test_quote_errors() {
        let cases = [
            ("quote(1, 2)", "wrong number of arguments: want=1, got=2"),
            ("quote()", "wrong number of arguments: want=1, got=0"),
            ("quote(unquote([1]))", "cannot unquote a value of type ARRAY"),
            ("quote(unquote(missing))", "identifier not found: missing"),
            ("quote(unquote(fn() { 1 }))", "cannot unquote a value of type FUNCTION"),
        ];
        for (input, expected) in cases {
            match eval_input(input) {
                Object::Error(e) => assert_eq!(e.to_string(), expected, "Input: '{}'", input),
                other => panic!("Expected an error for input '{}', got {}", input, other),
            }
        }
    }

    #[test]
    fn test_object_to_expression() {
        assert_eq!(
            object_to_expression(Object::Integer(3)),
            Ok(Expression::Integer(3))
        );
        assert_eq!(
            object_to_expression(Object::Quote(Rc::new(Expression::identifier("x")))),
            Ok(Expression::identifier("x"))
        );
        assert_eq!(
            object_to_expression(Object::Null),
            Err(EvalError::Unquotable("NULL"))
        );
    }
}
