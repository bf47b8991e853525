use std::io::Write;

use clap::{Args, Parser, Subcommand};

use rill::interpreter::Interpreter;

#[derive(Debug, Parser)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Repl)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    Run(RunArgs),
    Repl,
    Benchmark,
}

#[derive(Debug, Args)]
struct RunArgs {
    file: String,
}

fn main() {
    let args = Cli::parse();

    match args.command() {
        Command::Repl => {
            repl_command();
        }
        Command::Run(args) => {
            run_command(args);
        }
        Command::Benchmark => {
            benchmark_command();
        }
    }
}

fn repl_command() {
    println!("Welcome to the rill REPL!");
    println!("'exit' or EOF to quit. (Ctrl+D on *nix, Ctrl+Z on Windows)");

    // One interpreter for the whole session, so bindings survive across lines.
    let mut interpreter = Interpreter::default();
    let mut input = String::new();

    loop {
        print!("> ");
        std::io::stdout()
            .flush()
            .expect("should be able to flush stdout");

        let read = std::io::stdin()
            .read_line(&mut input)
            .expect("should be able to read line from stdin");

        if read == 0 {
            break;
        }

        let source = input.trim();
        if source == "exit" || source == "quit" {
            break;
        }
        if !source.is_empty() {
            if let Err(e) = interpret(&mut interpreter, source) {
                println!("Error: {}", e);
            }
        }

        input.clear()
    }
}

fn run_command(args: &RunArgs) {
    let source = std::fs::read_to_string(&args.file).expect("should be able to read source file");
    let mut interpreter = Interpreter::default();
    if let Err(e) = interpret(&mut interpreter, &source) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn benchmark_command() {
    let source = rill_fib_source();

    let mut interpreter = Interpreter::default();
    let start = std::time::Instant::now();
    if let Err(e) = interpret(&mut interpreter, source) {
        println!("Failed to run rill fib code: {e}");
        std::process::exit(1);
    }
    let rill_elapsed = start.elapsed();
    println!("rill Took: {:?}", rill_elapsed);

    let start = std::time::Instant::now();
    rust_fib();
    let fib_elapsed = start.elapsed();
    println!("Fib Took: {:?}", fib_elapsed);

    println!(
        "Rust is {}x faster than rill",
        rill_elapsed.as_secs_f64() / fib_elapsed.as_secs_f64()
    );
}

fn rill_fib_source() -> &'static str {
    r#"
    fun fib(n) {
        if (n <= 1) {
            return n;
        }
        return fib(n - 1) + fib(n - 2);
    }

    print fib(28);
    "#
}

fn rust_fib() {
    println!("{}", fib(28));
}

fn fib(n: i64) -> i64 {
    if n <= 1 {
        return n;
    }
    return fib(n - 1) + fib(n - 2);
}

#[derive(Debug, thiserror::Error)]
enum InterpretError {
    #[error(transparent)]
    Tokenize(#[from] rill::tokenizer::TokenizeError),
    #[error(transparent)]
    Parse(#[from] rill::parser::ParseErrors),
    #[error(transparent)]
    Execution(#[from] rill::interpreter::ExecutionError),
}

fn interpret(interpreter: &mut Interpreter, source: &str) -> Result<(), InterpretError> {
    let tokens = rill::tokenizer::tokens(source)?;
    let program = rill::parser::program(&tokens)?;
    interpreter.interpret(&program)?;
    Ok(())
}
