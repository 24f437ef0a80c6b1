//! End-to-end interpreter tests: source text through lexer, parser,
//! analyzer, and evaluator, with output captured in a buffer handler.

mod builtins_tests;
mod data_tests;
mod io_tests;
mod loop_tests;

use basic_diagnostic::Diagnostic;
use basic_ir::{Program, SharedInterner};
use basic_parse::parse_source;

use crate::{buffer_handler, queued_input, Interpreter};

pub(crate) fn parse(source: &str) -> (Program, SharedInterner) {
    let interner = SharedInterner::new();
    match parse_source(source, &interner) {
        Ok(program) => (program, interner),
        Err(d) => panic!("parse failed: {d}"),
    }
}

/// Run a program and return everything it printed.
pub(crate) fn run_ok(source: &str) -> String {
    run_with_input(source, &[])
}

/// Run a program with queued INPUT lines and return its output.
pub(crate) fn run_with_input(source: &str, inputs: &[&str]) -> String {
    let (program, interner) = parse(source);
    let printer = buffer_handler();
    let mut interp = Interpreter::with_handlers(
        interner,
        printer.clone(),
        queued_input(inputs.iter().copied()),
    );
    if let Err(d) = interp.interpret(&program) {
        panic!("run failed: {d}");
    }
    printer.output()
}

/// Run a program that must fail, returning its diagnostic.
pub(crate) fn run_err(source: &str) -> Diagnostic {
    let (program, interner) = parse(source);
    let printer = buffer_handler();
    let mut interp =
        Interpreter::with_handlers(interner, printer, queued_input(Vec::<String>::new()));
    match interp.interpret(&program) {
        Err(d) => d,
        Ok(()) => panic!("expected a diagnostic, program ran clean"),
    }
}
