use clap::Parser;
use rustyline::error::ReadlineError;
use schemelet::io::{LineReader, ReplInput};
use schemelet::{default_env, read_and_evaluate, EnvRef, Error, RuntimeErrorKind, SyntaxError, Value};
use std::{fs, process};

#[derive(Parser)]
struct Config {
    /// Source file to evaluate. Starts an interactive session when omitted
    #[clap()]
    file: Option<String>,
    /// Source name reported in error positions
    #[clap(short, long)]
    name: Option<String>,
}

fn main() {
    let config = Config::parse();
    let global = default_env();

    match &config.file {
        Some(path) => {
            let name = config.name.as_deref().unwrap_or(path);
            if let Err(e) = run_file(path, name, &global) {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
        None => repl(config.name.as_deref(), &global),
    }
}

fn run_file(path: &str, name: &str, global: &EnvRef) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(path)?;
    let value = read_and_evaluate(&source, Some(name), global)?;
    println!("{}", value);
    Ok(())
}

fn repl(name: Option<&str>, global: &EnvRef) {
    let mut input = ReplInput::new();
    let mut source = String::new();
    loop {
        let prompt = if source.is_empty() { ">> " } else { ".. " };
        match input.read_line(prompt) {
            Ok(line) => source.push_str(&line),
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
            Err(e) => {
                eprintln!("{}", e);
                break;
            }
        }

        match read_and_evaluate(&source, name, global) {
            Err(Error::Syntax(SyntaxError::MissingRightParen { .. })) => continue,
            Err(Error::Runtime(e)) if *e.kind() == RuntimeErrorKind::EmptyProgram => {}
            Ok(Value::Unspecified) => {}
            Ok(value) => println!("{}", value),
            Err(e) => eprintln!("{}", e),
        }
        source.clear();
    }
}
