//! Syntax tree for Monkey programs.
//!
//! The tree is fully owned (`Box`/`Vec`), so `Clone` is a deep structural copy:
//! an expanded macro never shares a subtree with the template it came from.
//! `Display` renders the canonical text form, fully parenthesised, that tests
//! use to compare trees.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Identifier(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let { name: Identifier, value: Expression },
    Return(Expression),
    Expression(Expression),
    Block(BlockStatement),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

/// Parameters and body shared by `fn` and `macro` literals.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Bang,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Eq,
    NotEq,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Integer(i64),
    String(String),
    Boolean(bool),
    Array(Vec<Expression>),
    // Pairs keep source order; duplicate keys resolve at evaluation time
    Hash(Vec<(Expression, Expression)>),
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
    Prefix {
        operator: PrefixOperator,
        right: Box<Expression>,
    },
    Infix {
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    Function(FunctionLiteral),
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Macro(FunctionLiteral),
}

impl Expression {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(Identifier::new(name))
    }

    pub fn prefix(operator: PrefixOperator, right: Expression) -> Self {
        Expression::Prefix {
            operator,
            right: Box::new(right),
        }
    }

    pub fn infix(left: Expression, operator: InfixOperator, right: Expression) -> Self {
        Expression::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub fn index(left: Expression, index: Expression) -> Self {
        Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
        }
    }

    pub fn call(function: Expression, arguments: Vec<Expression>) -> Self {
        Expression::Call {
            function: Box::new(function),
            arguments,
        }
    }
}

/// A borrowed view of any evaluable node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Statement(&'a Statement),
    Block(&'a BlockStatement),
    Expression(&'a Expression),
}

impl<'a> From<&'a Program> for Node<'a> {
    fn from(program: &'a Program) -> Self {
        Node::Program(program)
    }
}

impl<'a> From<&'a Statement> for Node<'a> {
    fn from(statement: &'a Statement) -> Self {
        Node::Statement(statement)
    }
}

impl<'a> From<&'a BlockStatement> for Node<'a> {
    fn from(block: &'a BlockStatement) -> Self {
        Node::Block(block)
    }
}

impl<'a> From<&'a Expression> for Node<'a> {
    fn from(expression: &'a Expression) -> Self {
        Node::Expression(expression)
    }
}

// --- Rewriting ---
//
// `modify` rebuilds a tree bottom-up: children are rewritten first, then the
// modifier sees the rebuilt expression and may replace it. Macro literals are
// left untouched so stored templates are never rewritten in place.

impl Program {
    pub fn modify<E, F>(self, modifier: &mut F) -> Result<Program, E>
    where
        F: FnMut(Expression) -> Result<Expression, E>,
    {
        Ok(Program {
            statements: modify_statements(self.statements, modifier)?,
        })
    }
}

impl BlockStatement {
    pub fn modify<E, F>(self, modifier: &mut F) -> Result<BlockStatement, E>
    where
        F: FnMut(Expression) -> Result<Expression, E>,
    {
        Ok(BlockStatement {
            statements: modify_statements(self.statements, modifier)?,
        })
    }
}

impl Statement {
    pub fn modify<E, F>(self, modifier: &mut F) -> Result<Statement, E>
    where
        F: FnMut(Expression) -> Result<Expression, E>,
    {
        Ok(match self {
            Statement::Let { name, value } => Statement::Let {
                name,
                value: value.modify(modifier)?,
            },
            Statement::Return(value) => Statement::Return(value.modify(modifier)?),
            Statement::Expression(expression) => {
                Statement::Expression(expression.modify(modifier)?)
            }
            Statement::Block(block) => Statement::Block(block.modify(modifier)?),
        })
    }
}

impl Expression {
    pub fn modify<E, F>(self, modifier: &mut F) -> Result<Expression, E>
    where
        F: FnMut(Expression) -> Result<Expression, E>,
    {
        let rebuilt = match self {
            Expression::Identifier(_)
            | Expression::Integer(_)
            | Expression::String(_)
            | Expression::Boolean(_)
            | Expression::Macro(_) => self,
            Expression::Array(elements) => {
                Expression::Array(modify_expressions(elements, modifier)?)
            }
            Expression::Hash(pairs) => {
                let mut modified = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    let key = key.modify(modifier)?;
                    let value = value.modify(modifier)?;
                    modified.push((key, value));
                }
                Expression::Hash(modified)
            }
            Expression::Index { left, index } => {
                Expression::index(left.modify(modifier)?, index.modify(modifier)?)
            }
            Expression::Prefix { operator, right } => {
                Expression::prefix(operator, right.modify(modifier)?)
            }
            Expression::Infix {
                left,
                operator,
                right,
            } => Expression::infix(left.modify(modifier)?, operator, right.modify(modifier)?),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => Expression::If {
                condition: Box::new(condition.modify(modifier)?),
                consequence: consequence.modify(modifier)?,
                alternative: match alternative {
                    Some(block) => Some(block.modify(modifier)?),
                    None => None,
                },
            },
            Expression::Function(literal) => Expression::Function(FunctionLiteral {
                parameters: literal.parameters,
                body: literal.body.modify(modifier)?,
            }),
            Expression::Call {
                function,
                arguments,
            } => Expression::call(
                function.modify(modifier)?,
                modify_expressions(arguments, modifier)?,
            ),
        };
        modifier(rebuilt)
    }
}

fn modify_statements<E, F>(
    statements: Vec<Statement>,
    modifier: &mut F,
) -> Result<Vec<Statement>, E>
where
    F: FnMut(Expression) -> Result<Expression, E>,
{
    statements
        .into_iter()
        .map(|statement| statement.modify(modifier))
        .collect()
}

fn modify_expressions<E, F>(
    expressions: Vec<Expression>,
    modifier: &mut F,
) -> Result<Vec<Expression>, E>
where
    F: FnMut(Expression) -> Result<Expression, E>,
{
    expressions
        .into_iter()
        .map(|expression| expression.modify(modifier))
        .collect()
}

// --- Rendering ---

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {} = {};", name, value),
            Statement::Return(value) => write!(f, "return {};", value),
            Statement::Expression(expression) => write!(f, "{}", expression),
            Statement::Block(block) => write!(f, "{}", block),
        }
    }
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOperator::Bang => write!(f, "!"),
            PrefixOperator::Minus => write!(f, "-"),
        }
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            InfixOperator::Plus => "+",
            InfixOperator::Minus => "-",
            InfixOperator::Asterisk => "*",
            InfixOperator::Slash => "/",
            InfixOperator::Lt => "<",
            InfixOperator::Gt => ">",
            InfixOperator::Eq => "==",
            InfixOperator::NotEq => "!=",
        };
        write!(f, "{}", symbol)
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    let mut first = true;
    for item in items {
        if !first {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
        first = false;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(identifier) => write!(f, "{}", identifier),
            Expression::Integer(value) => write!(f, "{}", value),
            Expression::Boolean(value) => write!(f, "{}", value),
            Expression::String(value) => write!(
                f,
                "\"{}\"",
                value.chars().fold(String::new(), |mut acc, char| {
                    match char {
                        '"' => acc.push_str("\\\""),
                        '\\' => acc.push_str("\\\\"),
                        '\n' => acc.push_str("\\n"),
                        '\r' => acc.push_str("\\r"),
                        '\t' => acc.push_str("\\t"),
                        c => acc.push(c),
                    }
                    acc
                })
            ),
            Expression::Array(elements) => {
                write!(f, "[")?;
                write_joined(f, elements)?;
                write!(f, "]")
            }
            Expression::Hash(pairs) => {
                write!(f, "{{")?;
                let mut first = true;
                for (key, value) in pairs {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                    first = false;
                }
                write!(f, "}}")
            }
            Expression::Index { left, index } => write!(f, "({}[{}])", left, index),
            Expression::Prefix { operator, right } => write!(f, "({}{})", operator, right),
            Expression::Infix {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if{} {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, "else{}", alternative)?;
                }
                Ok(())
            }
            Expression::Function(literal) => {
                write!(f, "fn(")?;
                write_joined(f, &literal.parameters)?;
                write!(f, ") {}", literal.body)
            }
            Expression::Macro(literal) => {
                write!(f, "macro(")?;
                write_joined(f, &literal.parameters)?;
                write!(f, ") {}", literal.body)
            }
            Expression::Call {
                function,
                arguments,
            } => {
                write!(f, "{}(", function)?;
                write_joined(f, arguments)?;
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::convert::Infallible;

    fn int(value: i64) -> Expression {
        Expression::Integer(value)
    }

    fn expression_statement(expression: Expression) -> Statement {
        Statement::Expression(expression)
    }

    fn block(expressions: Vec<Expression>) -> BlockStatement {
        BlockStatement {
            statements: expressions.into_iter().map(expression_statement).collect(),
        }
    }

    fn turn_one_into_two(expression: Expression) -> Result<Expression, Infallible> {
        Ok(match expression {
            Expression::Integer(1) => Expression::Integer(2),
            other => other,
        })
    }

    #[test]
    fn test_let_statement_string() {
        let program = Program {
            statements: vec![Statement::Let {
                name: Identifier::new("myVar"),
                value: Expression::identifier("anotherVar"),
            }],
        };
        assert_eq!(program.to_string(), "let myVar = anotherVar;");
    }

    #[test]
    fn test_expression_strings() {
        let cases = vec![
            (
                Expression::infix(int(1), InfixOperator::Plus, int(2)),
                "(1 + 2)",
            ),
            (Expression::prefix(PrefixOperator::Bang, Expression::Boolean(true)), "(!true)"),
            (
                Expression::index(Expression::identifier("xs"), int(0)),
                "(xs[0])",
            ),
            (Expression::Array(vec![int(1), int(2), int(3)]), "[1, 2, 3]"),
            (
                Expression::Hash(vec![(Expression::String("one".into()), int(1))]),
                "{\"one\":1}",
            ),
            (
                Expression::call(Expression::identifier("add"), vec![int(1), int(2)]),
                "add(1, 2)",
            ),
            (
                Expression::Function(FunctionLiteral {
                    parameters: vec![Identifier::new("x"), Identifier::new("y")],
                    body: block(vec![Expression::infix(
                        Expression::identifier("x"),
                        InfixOperator::Plus,
                        Expression::identifier("y"),
                    )]),
                }),
                "fn(x, y) (x + y)",
            ),
            (
                Expression::Macro(FunctionLiteral {
                    parameters: vec![Identifier::new("a")],
                    body: block(vec![Expression::identifier("a")]),
                }),
                "macro(a) a",
            ),
            (
                Expression::If {
                    condition: Box::new(Expression::identifier("c")),
                    consequence: block(vec![int(1)]),
                    alternative: Some(block(vec![int(2)])),
                },
                "ifc 1else2",
            ),
        ];
        for (expression, expected) in cases {
            assert_eq!(expression.to_string(), expected);
        }
    }

    #[test]
    fn test_string_literal_is_escaped() {
        let expression = Expression::String("say \"hi\"\n".to_string());
        assert_eq!(expression.to_string(), r#""say \"hi\"\n""#);
    }

    #[test]
    fn test_copy_renders_identically_and_is_independent() {
        let original = Program {
            statements: vec![
                Statement::Let {
                    name: Identifier::new("xs"),
                    value: Expression::Array(vec![int(1), int(2)]),
                },
                Statement::Return(Expression::index(Expression::identifier("xs"), int(1))),
            ],
        };
        let mut copy = original.clone();
        assert_eq!(copy.to_string(), original.to_string());

        if let Statement::Let {
            value: Expression::Array(elements),
            ..
        } = &mut copy.statements[0]
        {
            elements.push(int(3));
        }
        copy.statements.pop();

        assert_eq!(original.to_string(), "let xs = [1, 2];return (xs[1]);");
        assert_eq!(copy.to_string(), "let xs = [1, 2, 3];");
    }

    #[test]
    fn test_modify_rewrites_every_position() {
        let one = || int(1);
        let two = || int(2);
        let cases = vec![
            (one(), two()),
            (
                Expression::infix(one(), InfixOperator::Plus, two()),
                Expression::infix(two(), InfixOperator::Plus, two()),
            ),
            (
                Expression::infix(two(), InfixOperator::Plus, one()),
                Expression::infix(two(), InfixOperator::Plus, two()),
            ),
            (
                Expression::prefix(PrefixOperator::Minus, one()),
                Expression::prefix(PrefixOperator::Minus, two()),
            ),
            (Expression::index(one(), one()), Expression::index(two(), two())),
            (
                Expression::If {
                    condition: Box::new(one()),
                    consequence: block(vec![one()]),
                    alternative: Some(block(vec![one()])),
                },
                Expression::If {
                    condition: Box::new(two()),
                    consequence: block(vec![two()]),
                    alternative: Some(block(vec![two()])),
                },
            ),
            (
                Expression::Function(FunctionLiteral {
                    parameters: vec![],
                    body: block(vec![one()]),
                }),
                Expression::Function(FunctionLiteral {
                    parameters: vec![],
                    body: block(vec![two()]),
                }),
            ),
            (Expression::Array(vec![one(), one()]), Expression::Array(vec![two(), two()])),
            (
                Expression::Hash(vec![(one(), one()), (one(), one())]),
                Expression::Hash(vec![(two(), two()), (two(), two())]),
            ),
            (
                Expression::call(one(), vec![one(), two()]),
                Expression::call(two(), vec![two(), two()]),
            ),
        ];

        for (input, expected) in cases {
            let modified = input.modify(&mut turn_one_into_two);
            assert_eq!(modified, Ok(expected));
        }
    }

    #[test]
    fn test_modify_statements() {
        let program = Program {
            statements: vec![
                Statement::Let {
                    name: Identifier::new("a"),
                    value: int(1),
                },
                Statement::Return(int(1)),
                Statement::Block(block(vec![int(1)])),
            ],
        };
        let modified = program.modify(&mut turn_one_into_two);
        assert_eq!(
            modified.map(|p| p.to_string()),
            Ok("let a = 2;return 2;2".to_string())
        );
    }

    #[test]
    fn test_modify_leaves_macro_templates_alone() {
        let template = Expression::Macro(FunctionLiteral {
            parameters: vec![],
            body: block(vec![int(1)]),
        });
        assert_eq!(template.clone().modify(&mut turn_one_into_two), Ok(template));
    }

    #[test]
    fn test_modify_stops_at_first_error() {
        let mut visited = Vec::new();
        let result = Expression::Array(vec![int(1), int(2), int(3)]).modify(&mut |e: Expression| {
            visited.push(e.to_string());
            match e {
                Expression::Integer(2) => Err("boom"),
                other => Ok(other),
            }
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(visited, vec!["1", "2"]);
    }
}
