use crate::ParseError;
use ariadne::{Label, Report, ReportBuilder, ReportKind, Source};
use std::io;
use std::ops::Range;

impl ParseError {
    fn report<'a>(
        &self,
        source_name: &'a str,
        input: &str,
    ) -> ReportBuilder<'a, (&'a str, Range<usize>)> {
        match self {
            ParseError::UnexpectedToken { found, expected } => {
                Report::build(ReportKind::Error, (source_name, found.span.to_range()))
                    .with_message(format!("Unexpected token: {}", found.kind))
                    .with_label(
                        Label::new((source_name, found.span.to_range()))
                            .with_message(format!("Expected {expected}")),
                    )
            }
            ParseError::UnexpectedEof(expected) => {
                let idx = input.len();
                Report::build(ReportKind::Error, (source_name, idx..idx))
                    .with_message("Unexpected end of input")
                    .with_label(
                        Label::new((source_name, idx..idx))
                            .with_message(format!("Expected {expected}")),
                    )
            }
            ParseError::LexerError(lex_err) => {
                Report::build(ReportKind::Error, (source_name, lex_err.span.to_range()))
                    .with_message("Lexer Error")
                    .with_label(
                        Label::new((source_name, lex_err.span.to_range()))
                            .with_message(lex_err.error.to_string()),
                    )
            }
        }
    }

    /// Renders the error against `input` on stderr.
    pub fn pretty_print(&self, source_name: &str, input: &str) -> io::Result<()> {
        self.report(source_name, input)
            .finish()
            .eprint((source_name, Source::from(input)))
    }
}
