//! BASIC interpreter CLI.
//!
//! `basic <file>` runs a program; `lex` and `parse` expose the front-end
//! stages. Diagnostics print as a single line to stderr and the process
//! exits non-zero.

mod tracing_setup;

use basic_eval::Interpreter;
use basic_ir::SharedInterner;
use basic_lexer::tokenize;
use basic_parse::parse_source;

fn main() {
    tracing_setup::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage(&args);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "help" | "--help" | "-h" => print_usage(&args),
        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: basic run <file.bas>");
                std::process::exit(1);
            }
            run_file(&args[2]);
        }
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: basic lex <file.bas>");
                std::process::exit(1);
            }
            lex_file(&args[2]);
        }
        "parse" => {
            if args.len() < 3 {
                eprintln!("Usage: basic parse <file.bas>");
                std::process::exit(1);
            }
            parse_file(&args[2]);
        }
        path => run_file(path),
    }
}

fn print_usage(args: &[String]) {
    let exe = args.first().map_or("basic", String::as_str);
    println!("usage: {exe} <file.bas>");
    println!();
    println!("Commands:");
    println!("  run <file.bas>    Run a BASIC program (default)");
    println!("  lex <file.bas>    Tokenize and list the tokens");
    println!("  parse <file.bas>  Parse and print the program back");
    println!("  help              Show this help message");
}

fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("error reading '{path}': {e}");
            std::process::exit(1);
        }
    }
}

fn run_file(path: &str) {
    let source = read_file(path);
    let interner = SharedInterner::new();

    let program = match parse_source(&source, &interner) {
        Ok(program) => program,
        Err(d) => {
            eprintln!("{d}");
            std::process::exit(1);
        }
    };

    let mut interp = Interpreter::new(interner);
    if let Err(d) = interp.interpret(&program) {
        eprintln!("{d}");
        std::process::exit(1);
    }
}

fn lex_file(path: &str) {
    let source = read_file(path);
    let interner = SharedInterner::new();
    match tokenize(&source, &interner) {
        Ok(tokens) => {
            for tok in tokens {
                println!("{} {:?}", tok.pos, tok.kind);
            }
        }
        Err(d) => {
            eprintln!("{d}");
            std::process::exit(1);
        }
    }
}

fn parse_file(path: &str) {
    let source = read_file(path);
    let interner = SharedInterner::new();
    match parse_source(&source, &interner) {
        Ok(program) => println!("{}", program.to_source(&interner)),
        Err(d) => {
            eprintln!("{d}");
            std::process::exit(1);
        }
    }
}
