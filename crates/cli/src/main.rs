use colored::*;
use std::{
    fs,
    io::{self, Write},
    process,
};
use clap::Parser as ClapParser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

extern crate frontend;
extern crate runtime;

use frontend::lexer::Lexer;
use frontend::parser::Parser;
use runtime::{
    environment::VERSION,
    Interpreter, Resolver,
};
use tools::errors::CodeErr;


// --------
//   CLI
// --------

#[derive(ClapParser)]
#[command(version)]
#[command(about="Interpreter for the Kiln scripting language")]
struct CLI {
    #[arg(short, long)]
    /// Path to the script to run
    file: Option<String>,

    /// Interactive mode after running a file
    #[arg(short, long)]
    inter: bool,

    /// Prints the AST tree
    #[arg(short, long)]
    ast_print: bool,

    /// Prints the resolved lexical distance of each variable reference
    #[arg(short, long)]
    resolutions: bool,
}


// Only installed when RUST_LOG is set, normal runs print program output only
fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true))
        .with(EnvFilter::from_default_env())
        .init();
}

fn interpret_file(file_name: &str, interpreter: &mut Interpreter, cli: &CLI) {
    println!("\nReading source file {}...", file_name.green());

    let source_code = match fs::read_to_string(file_name) {
        Ok(code) => code,
        Err(e) => {
            println!("{} opening script file {file_name}: {e}", "Error".red().bold());
            process::exit(1);
        }
    };

    let status = run_script(source_code, interpreter, cli);
    if status != 0 {
        process::exit(status);
    }
}

// Exit status of a script: 1 if any phase failed
fn run_script(code: String, interpreter: &mut Interpreter, cli: &CLI) -> i32 {
    match interpretation_sequence(code, interpreter, cli, false) {
        Ok(()) => 0,
        Err(e) => {
            println!("{e}");
            1
        }
    }
}

// Lexing, parsing and resolving all happen before the first statement runs
fn interpretation_sequence(
    code: String,
    interpreter: &mut Interpreter,
    cli: &CLI,
    echo: bool,
) -> Result<(), CodeErr> {
    let mut lexer: Lexer = Default::default();
    let mut parser: Parser = Default::default();

    lexer.tokenize(code)?;
    let program = parser.build_ast(lexer.tokens)?;

    if cli.ast_print {
        println!("\nProgram AST:\n{:#?}", program);
    }

    let annotations = Resolver::new().resolve_program(&program)?;

    if cli.resolutions {
        println!("\nResolutions:");
        for (id, distance) in annotations.sorted() {
            println!("  {} -> {}", id.to_string().cyan(), distance);
        }
    }

    let values = interpreter.execute_program(&program, annotations)?;

    if echo {
        values
            .iter()
            .filter(|v| !v.is_void())
            .for_each(|v| println!("{}", v.repl_repr()));
    }

    Ok(())
}

// REPL
fn repl(interpreter: &mut Interpreter, cli: &CLI) {
    println!("\n{} mode started", "Interactive".yellow().bold());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let mut input = String::new();

    loop {
        input.clear();
        print!("\n> ");
        let _ = stdout.flush();

        match stdin.read_line(&mut input) {
            // End of input
            Ok(0) => process::exit(0),
            Ok(_) => {
                let trimmed_input = input.trim();

                if trimmed_input == "quit" {
                    process::exit(0);
                }

                if let Err(e) = interpretation_sequence(trimmed_input.to_string(), interpreter, cli, true) {
                    println!("{e}");
                }
            }
            Err(e) => {
                println!("{} reading from terminal: {e}", "Error".red().bold());
                process::exit(1);
            }
        }
    }
}

fn main() {
    init_tracing();

    // Manage command line args
    let cli = CLI::parse();

    // Beginning of program
    println!("\n       --- {} language v{} ---", "Kiln".cyan().bold(), VERSION);

    // One interpreter for the whole session, the REPL keeps the file's state
    let mut interpreter = Interpreter::new();

    match &cli.file {
        Some(file_name) => {
            interpret_file(file_name, &mut interpreter, &cli);

            if cli.inter {
                repl(&mut interpreter, &cli);
            }
        }
        None => repl(&mut interpreter, &cli),
    }
}
