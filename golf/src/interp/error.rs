//! Runtime errors for the interpreter

use std::fmt;

use crate::bigint::BigintError;
use crate::lexer::LexError;
use crate::seq::SeqError;

/// Runtime error during interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Pop from an empty stack
    StackUnderflow,
    /// Quote or brace never closed in executed text
    UnmatchedDelimiter,
    /// Malformed escape or number inside executed text
    InvalidLiteral,
    /// Operator applied to operands it does not define
    TypeError,
    /// Argument outside the operator's domain
    Domain,
    /// Integer division or modulo by zero
    DivisionByZero,
    /// `:` without a value or a name
    Assignment,
    /// Block nesting exceeded the configured depth
    RecursionLimit,
    /// A result too large to allocate
    AllocationFailure,
    /// Writing output failed
    IoError,
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
        }
    }

    pub fn stack_underflow() -> Self {
        Self::new(ErrorKind::StackUnderflow, "cannot pop from empty stack")
    }

    pub fn unmatched_delimiter(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnmatchedDelimiter, msg)
    }

    pub fn invalid_literal(msg: &str) -> Self {
        Self::new(ErrorKind::InvalidLiteral, format!("invalid literal: {msg}"))
    }

    /// `op` does not accept an operand of type `got`
    pub fn type_error(op: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::TypeError,
            format!("type error: '{op}' is not defined for {got}"),
        )
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Domain, msg)
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero")
    }

    pub fn assignment(msg: &str) -> Self {
        Self::new(ErrorKind::Assignment, format!("assignment error: {msg}"))
    }

    pub fn recursion_limit(depth: usize) -> Self {
        Self::new(
            ErrorKind::RecursionLimit,
            format!("block nesting exceeded {depth} levels"),
        )
    }

    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::AllocationFailure, msg)
    }

    pub fn io_error(msg: &str) -> Self {
        Self::new(ErrorKind::IoError, format!("IO error: {msg}"))
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime error: {}", self.message)
    }
}

impl std::error::Error for RuntimeError {}

impl From<BigintError> for RuntimeError {
    fn from(e: BigintError) -> Self {
        match e {
            BigintError::DivisionByZero => RuntimeError::division_by_zero(),
            other => RuntimeError::domain(other.to_string()),
        }
    }
}

impl From<SeqError> for RuntimeError {
    fn from(e: SeqError) -> Self {
        match e {
            SeqError::TooLarge => RuntimeError::allocation(e.to_string()),
            other => RuntimeError::domain(other.to_string()),
        }
    }
}

impl From<LexError> for RuntimeError {
    fn from(e: LexError) -> Self {
        if e.is_unmatched_delimiter() {
            RuntimeError::unmatched_delimiter(e.to_string())
        } else {
            RuntimeError::invalid_literal(&e.to_string())
        }
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(e: std::io::Error) -> Self {
        RuntimeError::io_error(&e.to_string())
    }
}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
