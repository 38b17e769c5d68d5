// Declare modules publicly so they are part of the library interface
pub mod ast;
pub mod builtins;
pub mod config;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod macros;
pub mod object;
pub mod parser;
pub mod pretty_print;
mod quote;
pub mod session;
mod source;

pub use ast::{Node, Program};
pub use environment::{Env, Environment};
pub use evaluator::{EvalError, EvalResult, eval};
pub use lexer::{LexerError, Token, TokenKind, tokenize};
pub use macros::{define_macros, expand_macros};
pub use object::Object;
pub use parser::{ParseError, Parser, parse_str};
pub use session::Session;
pub use source::Span;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs a `tracing` subscriber for the binaries.
///
/// Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    });
}
