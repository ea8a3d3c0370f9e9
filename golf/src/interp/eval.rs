//! Token-driven execution
//!
//! Source bytes are lexed once per distinct text and then dispatched token
//! by token against the bindings table. Blocks re-enter the same loop over
//! their stored text.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use tracing::{debug, trace};

use super::env::Bindings;
use super::error::{InterpResult, RuntimeError};
use super::value::Value;
use crate::config::RunConfig;
use crate::lexer::{self, Token};
use crate::random::Rng;
use crate::span::Span;

/// Stack growth parameters for deep block nesting
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// Distinct texts kept lexed before the cache is reset
const TOKEN_CACHE_LIMIT: usize = 4096;

/// Lexed text ready for dispatch
#[derive(Debug)]
struct Program {
    source: Vec<u8>,
    tokens: Vec<(Token, Span)>,
}

/// An in-memory output sink that can be read back after the interpreter
/// that writes to it is gone
#[derive(Debug, Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }

    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// The interpreter
pub struct Interpreter {
    /// Operand stack
    stack: Vec<Value>,
    /// Stack heights saved by `[`
    marks: Vec<usize>,
    bindings: Bindings,
    /// Lexed programs keyed by their text
    token_cache: HashMap<Vec<u8>, Rc<Program>>,
    /// Current block nesting
    depth: usize,
    config: RunConfig,
    rng: Rng,
    output: Box<dyn Write>,
}

impl Interpreter {
    /// Create an interpreter printing to standard output
    pub fn new(config: RunConfig) -> Self {
        Self::with_output(config, Box::new(io::stdout()))
    }

    pub fn with_output(config: RunConfig, output: Box<dyn Write>) -> Self {
        let rng = match config.seed {
            Some(seed) => Rng::from_seed(seed),
            None => Rng::from_entropy(),
        };
        let bindings = Bindings::standard();
        debug!(
            max_depth = config.max_depth,
            seed = ?config.seed,
            bindings = bindings.len(),
            "interpreter created"
        );
        Interpreter {
            stack: Vec::new(),
            marks: Vec::new(),
            bindings,
            token_cache: HashMap::new(),
            depth: 0,
            config,
            rng,
            output,
        }
    }

    // ========================================================================
    // Stack
    // ========================================================================

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Pop the top value, pulling any open bracket marks down with it
    pub fn pop(&mut self) -> InterpResult<Value> {
        let value = self.stack.pop().ok_or_else(RuntimeError::stack_underflow)?;
        let height = self.stack.len();
        for mark in self.marks.iter_mut() {
            if *mark > height {
                *mark = height;
            }
        }
        Ok(value)
    }

    pub fn peek(&self) -> Option<&Value> {
        self.stack.last()
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Copy of the value `n` places below the top
    pub fn nth_from_top(&self, n: usize) -> Option<Value> {
        let len = self.stack.len();
        n.checked_add(1)
            .and_then(|k| len.checked_sub(k))
            .map(|i| self.stack[i].clone())
    }

    /// Copy of the value at `index` counted from the bottom
    pub fn nth_from_bottom(&self, index: usize) -> Option<Value> {
        self.stack.get(index).cloned()
    }

    pub fn clear_stack(&mut self) {
        self.stack.clear();
        self.marks.clear();
    }

    /// Remove everything above `height`
    pub fn split_stack(&mut self, height: usize) -> Vec<Value> {
        let height = height.min(self.stack.len());
        let rest = self.stack.split_off(height);
        for mark in self.marks.iter_mut() {
            if *mark > height {
                *mark = height;
            }
        }
        rest
    }

    /// Record the current height for a later `close_mark`
    pub fn open_mark(&mut self) {
        self.marks.push(self.stack.len());
    }

    /// Collect everything above the innermost mark into an array; without a
    /// mark the whole stack is collected
    pub fn close_mark(&mut self) -> Value {
        let mark = self.marks.pop().unwrap_or(0);
        Value::Array(self.split_stack(mark))
    }

    // ========================================================================
    // Bindings and resources
    // ========================================================================

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Bind `name`, replacing any previous value
    pub fn assign(&mut self, name: &[u8], value: Value) {
        debug!(name = %String::from_utf8_lossy(name), value = %value, "assign");
        self.bindings.define(name, value);
    }

    pub fn rng(&mut self) -> &mut Rng {
        &mut self.rng
    }

    pub fn write_output(&mut self, bytes: &[u8]) -> InterpResult<()> {
        self.output.write_all(bytes)?;
        Ok(())
    }

    /// Render every remaining stack value to the output, bottom first, and
    /// empty the stack
    pub fn flush_stack(&mut self) -> InterpResult<()> {
        let mut out = Vec::new();
        for value in self.stack.drain(..) {
            value.render_into(&mut out);
        }
        self.marks.clear();
        self.output.write_all(&out)?;
        self.output.flush()?;
        debug!(bytes = out.len(), "final stack written");
        Ok(())
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Execute top-level program text
    pub fn execute(&mut self, source: impl AsRef<[u8]>) -> InterpResult<()> {
        let program = self.compile(source.as_ref())?;
        self.run(&program)
    }

    /// Execute top-level text that has already been lexed into `tokens`
    pub fn execute_lexed(&mut self, source: &[u8], tokens: Vec<(Token, Span)>) -> InterpResult<()> {
        let program = self.cache_program(source.to_vec(), tokens);
        self.run(&program)
    }

    /// Execute block text one nesting level deeper
    pub fn execute_block(&mut self, text: &[u8]) -> InterpResult<()> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.execute_block_inner(text))
    }

    fn execute_block_inner(&mut self, text: &[u8]) -> InterpResult<()> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            self.depth -= 1;
            return Err(RuntimeError::recursion_limit(self.config.max_depth));
        }
        trace!(depth = self.depth, "enter block");
        let result = self.compile(text).and_then(|program| self.run(&program));
        self.depth -= 1;
        result
    }

    /// Run a value where a block is expected: blocks execute, native
    /// operators are called, anything else is pushed back
    pub fn call_value(&mut self, value: Value) -> InterpResult<()> {
        match value {
            Value::Block(text) => self.execute_block(&text),
            Value::Builtin(builtin) => (builtin.func)(self),
            other => {
                self.push(other);
                Ok(())
            }
        }
    }

    fn compile(&mut self, text: &[u8]) -> InterpResult<Rc<Program>> {
        if let Some(program) = self.token_cache.get(text) {
            return Ok(Rc::clone(program));
        }
        let tokens = lexer::lex(text).map_err(|e| RuntimeError::from(e.node))?;
        Ok(self.cache_program(text.to_vec(), tokens))
    }

    fn cache_program(&mut self, source: Vec<u8>, tokens: Vec<(Token, Span)>) -> Rc<Program> {
        if self.token_cache.len() >= TOKEN_CACHE_LIMIT {
            self.token_cache.clear();
        }
        let program = Rc::new(Program {
            source: source.clone(),
            tokens,
        });
        self.token_cache.insert(source, Rc::clone(&program));
        program
    }

    fn run(&mut self, program: &Program) -> InterpResult<()> {
        let mut tokens = program.tokens.iter();
        while let Some((token, span)) = tokens.next() {
            let text = span.text(&program.source);
            trace!(token = %String::from_utf8_lossy(text), "dispatch");

            if let Some(bound) = self.bindings.get(text).cloned() {
                match bound {
                    Value::Builtin(builtin) => (builtin.func)(self)?,
                    Value::Block(body) => self.execute_block(&body)?,
                    other => self.push(other),
                }
                continue;
            }

            match token {
                Token::Integer(n) => self.push(Value::Int(n.clone())),
                Token::Str(bytes) => self.push(Value::Str(bytes.clone())),
                Token::Block(body) => self.push(Value::Block(body.clone())),
                Token::Colon => {
                    let (_, name_span) = tokens
                        .next()
                        .ok_or_else(|| RuntimeError::assignment("':' must be followed by a name"))?;
                    let value = self
                        .peek()
                        .cloned()
                        .ok_or_else(|| RuntimeError::assignment("nothing on the stack to assign"))?;
                    self.assign(name_span.text(&program.source), value);
                }
                Token::Ident | Token::Symbol => trace!("unbound token ignored"),
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("stack", &self.stack)
            .field("marks", &self.marks)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
