//! Analyzer and evaluator for the BASIC interpreter.
//!
//! [`Interpreter`] owns the shared state of both passes: the line table,
//! DATA pool, FOR/NEXT side maps, GOSUB stack, user-function registry, and
//! the variable frames. Feed it a parsed [`basic_ir::Program`]:
//!
//! ```text
//! let interner = SharedInterner::new();
//! let program = basic_parse::parse_source(source, &interner)?;
//! let mut interp = Interpreter::new(interner);
//! interp.interpret(&program)?;
//! ```

mod analysis;
mod array;
mod builtins;
mod environment;
mod for_loop;
mod input_handler;
mod interpreter;
mod operators;
mod print_handler;
#[cfg(test)]
mod tests;
mod value;

pub use array::ArrayValue;
pub use environment::{Environment, LocalScope, Scope};
pub use input_handler::{queued_input, stdin_input, InputHandlerImpl, SharedInputHandler};
pub use interpreter::{Interpreter, ScopedInterpreter};
pub use operators::{as_number, binary, compare, Num};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler, StdoutPrintHandler,
};
pub use value::{FuncData, Heap, NativeFn, Value};
