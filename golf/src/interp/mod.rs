//! Stack interpreter
//!
//! Program text is tokenized on demand and run against a single value
//! stack. Every name, including the native operators, resolves through one
//! rebindable table.

mod array;
mod builtins;
mod env;
mod error;
mod eval;
mod value;

pub use builtins::BUILTINS;
pub use env::Bindings;
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::{Interpreter, SharedOutput};
pub use value::{Builtin, BuiltinFn, Value, array_bytes, coerce, int_to_byte};
