// Runs a Monkey script: `monkey <file>`
use monkey::{Object, Session, init_tracing};
use std::process::ExitCode;

fn main() -> ExitCode {
    init_tracing();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: monkey <file>");
        return ExitCode::FAILURE;
    };
    let input = match std::fs::read_to_string(&path) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Cannot read {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let session = Session::new();
    match session.run(&input) {
        Ok(Object::Error(e)) => {
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
        Ok(Object::Null) => ExitCode::SUCCESS,
        Ok(result) => {
            println!("{}", result);
            ExitCode::SUCCESS
        }
        Err(parse_err) => {
            if parse_err.pretty_print(&path, &input).is_err() {
                eprintln!("Parse Error: {}", parse_err);
            }
            ExitCode::FAILURE
        }
    }
}
