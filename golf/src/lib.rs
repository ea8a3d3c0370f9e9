//! Golf interpreter library
//!
//! A terse stack language: arbitrary-precision integers, byte strings,
//! arrays and code blocks, with every operator overloaded on its operand
//! types.

pub mod bigint;
pub mod config;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod random;
pub mod repl;
pub mod seq;
pub mod set;
pub mod span;
pub mod text;

pub use config::RunConfig;
pub use error::{GolfError, Result};
pub use interp::{Interpreter, SharedOutput, Value};
pub use span::Span;

use tracing::debug;

/// Run a whole program against `input` and return everything it printed
///
/// The input is pushed as a string before the program starts, and whatever
/// is left on the stack afterwards is rendered after the explicit output.
/// Lexical errors are reported before anything executes.
pub fn run_source(source: impl AsRef<[u8]>, input: &[u8], config: RunConfig) -> Result<Vec<u8>> {
    let source = source.as_ref();
    let tokens = lexer::tokenize(source)?;
    debug!(tokens = tokens.len(), input = input.len(), "program tokenized");

    let output = SharedOutput::new();
    let mut interp = Interpreter::with_output(config, Box::new(output.clone()));
    interp.push(Value::str(input));
    interp.execute_lexed(source, tokens)?;
    interp.flush_stack()?;
    Ok(output.take())
}
