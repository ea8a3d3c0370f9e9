//! Runtime values for the interpreter
//!
//! `Ord` is a total order: values of different types order by type
//! (integer < array < string < block < builtin), values of one type by
//! content. Arrays compare element-wise with shorter first on a shared
//! prefix, strings and blocks by bytes. A block therefore never equals a
//! string with the same text.
//!
//! The `<`, `>` and `=` operators use [`Value::compare_coerced`] instead,
//! which lines up mixed array/string/block operands by content first.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use super::error::InterpResult;
use super::eval::Interpreter;
use crate::bigint::Bigint;
use crate::text;

/// Native operator signature
pub type BuiltinFn = fn(&mut Interpreter) -> InterpResult<()>;

/// A native operator bound in the interpreter's name table
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<builtin {}>", self.name)
    }
}

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    Int(Bigint),
    Array(Vec<Value>),
    Str(Vec<u8>),
    /// Unexecuted source text
    Block(Vec<u8>),
    Builtin(Builtin),
}

const RANK_INT: u8 = 0;
const RANK_ARRAY: u8 = 1;
const RANK_STR: u8 = 2;
const RANK_BLOCK: u8 = 3;
const RANK_BUILTIN: u8 = 4;

impl Value {
    pub fn int(n: impl Into<Bigint>) -> Value {
        Value::Int(n.into())
    }

    pub fn str(bytes: impl Into<Vec<u8>>) -> Value {
        Value::Str(bytes.into())
    }

    pub fn block(text: impl Into<Vec<u8>>) -> Value {
        Value::Block(text.into())
    }

    pub fn bool(b: bool) -> Value {
        Value::Int(Bigint::from(b))
    }

    /// Position in the coercion lattice
    pub fn rank(&self) -> u8 {
        match self {
            Value::Int(_) => RANK_INT,
            Value::Array(_) => RANK_ARRAY,
            Value::Str(_) => RANK_STR,
            Value::Block(_) => RANK_BLOCK,
            Value::Builtin(_) => RANK_BUILTIN,
        }
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Array(_) => "array",
            Value::Str(_) => "string",
            Value::Block(_) => "block",
            Value::Builtin(_) => "builtin",
        }
    }

    /// Zero and empty sequences are false
    pub fn truthy(&self) -> bool {
        match self {
            Value::Int(n) => !n.is_zero(),
            Value::Array(items) => !items.is_empty(),
            Value::Str(bytes) | Value::Block(bytes) => !bytes.is_empty(),
            Value::Builtin(_) => true,
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    /// Arrays, strings and blocks
    pub fn is_seq(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Str(_) | Value::Block(_))
    }

    /// Element count of a sequence
    pub fn seq_len(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(items.len()),
            Value::Str(bytes) | Value::Block(bytes) => Some(bytes.len()),
            Value::Int(_) | Value::Builtin(_) => None,
        }
    }

    /// Source text that evaluates back to this value
    pub fn literal(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_literal(&mut out);
        out
    }

    fn write_literal(&self, out: &mut Vec<u8>) {
        match self {
            Value::Int(n) => out.extend_from_slice(n.to_string().as_bytes()),
            Value::Str(bytes) => {
                out.push(b'"');
                for &b in bytes {
                    if b == b'"' || b == b'\\' {
                        out.push(b'\\');
                    }
                    out.push(b);
                }
                out.push(b'"');
            }
            Value::Block(text) => {
                out.push(b'{');
                out.extend_from_slice(text);
                out.push(b'}');
            }
            Value::Array(items) => {
                out.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(b' ');
                    }
                    item.write_literal(out);
                }
                out.push(b']');
            }
            Value::Builtin(builtin) => out.extend_from_slice(builtin.name.as_bytes()),
        }
    }

    /// Output form: strings raw, blocks braced, arrays concatenated
    pub fn render_into(&self, out: &mut Vec<u8>) {
        match self {
            Value::Int(n) => out.extend_from_slice(n.to_string().as_bytes()),
            Value::Str(bytes) => out.extend_from_slice(bytes),
            Value::Block(text) => {
                out.push(b'{');
                out.extend_from_slice(text);
                out.push(b'}');
            }
            Value::Array(items) => {
                for item in items {
                    item.render_into(out);
                }
            }
            Value::Builtin(builtin) => out.extend_from_slice(builtin.name.as_bytes()),
        }
    }

    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.render_into(&mut out);
        out
    }

    /// Elements of a sequence; string bytes become integers
    pub fn into_elements(self) -> Vec<Value> {
        match self {
            Value::Array(items) => items,
            Value::Str(bytes) | Value::Block(bytes) => {
                bytes.into_iter().map(|b| Value::int(b as u64)).collect()
            }
            other => vec![other],
        }
    }

    /// A sequence of this value's kind holding `elements`; strings and
    /// blocks take the bytes of each element
    pub fn from_elements_like(&self, elements: Vec<Value>) -> Value {
        match self {
            Value::Str(_) => Value::Str(array_bytes(&elements)),
            Value::Block(_) => Value::Block(array_bytes(&elements)),
            _ => Value::Array(elements),
        }
    }

    /// Coerce to string content: integers as decimal text, arrays by
    /// joining their elements' bytes
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Value::Int(n) => n.to_string().into_bytes(),
            Value::Array(items) => array_bytes(&items),
            Value::Str(bytes) | Value::Block(bytes) => bytes,
            Value::Builtin(builtin) => builtin.name.as_bytes().to_vec(),
        }
    }

    /// Comparison used by the `<`, `>` and `=` operators
    ///
    /// Integers never coerce: against any other type they sort first.
    /// Mixed array/string/block pairs compare by their content coerced to
    /// the higher type. A string and a block with the same text still fall
    /// back to the type order, so they are never equal. Unlike `Ord` this
    /// is not transitive across types, so it must never back a sort or a
    /// set.
    pub fn compare_coerced(&self, other: &Value) -> Ordering {
        let (lhs, rhs) = (self.rank(), other.rank());
        if lhs == rhs || lhs == RANK_INT || rhs == RANK_INT || lhs == RANK_BUILTIN || rhs == RANK_BUILTIN {
            return self.cmp(other);
        }
        let rank = lhs.max(rhs);
        let tie = if lhs.min(rhs) == RANK_STR { lhs.cmp(&rhs) } else { Ordering::Equal };
        text::compare(&self.coerced_bytes(rank), &other.coerced_bytes(rank)).then(tie)
    }

    /// Byte content after coercion to a string or block rank
    fn coerced_bytes(&self, rank: u8) -> Cow<'_, [u8]> {
        match self {
            Value::Str(bytes) | Value::Block(bytes) => Cow::Borrowed(bytes),
            Value::Array(items) if rank == RANK_BLOCK => Cow::Owned(block_text(items)),
            Value::Array(items) => Cow::Owned(array_bytes(items)),
            Value::Int(n) => Cow::Owned(n.to_string().into_bytes()),
            Value::Builtin(builtin) => Cow::Borrowed(builtin.name.as_bytes()),
        }
    }
}

/// Low byte of an integer in two's complement
pub fn int_to_byte(n: &Bigint) -> u8 {
    let low = n & &Bigint::from(0xffu64);
    low.digits()[0] as u8
}

/// Join element bytes: integers as single bytes, nested arrays recursively
pub fn array_bytes(items: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    write_array_bytes(items, &mut out);
    out
}

fn write_array_bytes(items: &[Value], out: &mut Vec<u8>) {
    for item in items {
        match item {
            Value::Int(n) => out.push(int_to_byte(n)),
            Value::Str(bytes) | Value::Block(bytes) => out.extend_from_slice(bytes),
            Value::Array(inner) => write_array_bytes(inner, out),
            Value::Builtin(builtin) => out.extend_from_slice(builtin.name.as_bytes()),
        }
    }
}

/// Block text for an array: elements space separated, integers in decimal
fn block_text(items: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(b' ');
        }
        match item {
            Value::Int(n) => out.extend_from_slice(n.to_string().as_bytes()),
            Value::Str(bytes) | Value::Block(bytes) => out.extend_from_slice(bytes),
            Value::Array(inner) => write_array_bytes(inner, &mut out),
            Value::Builtin(builtin) => out.extend_from_slice(builtin.name.as_bytes()),
        }
    }
    out
}

fn coerce_to(value: Value, rank: u8) -> Value {
    if value.rank() >= rank {
        return value;
    }
    match (rank, value) {
        (RANK_ARRAY, value) => Value::Array(vec![value]),
        (RANK_STR, value) => Value::Str(value.into_bytes()),
        (RANK_BLOCK, Value::Array(items)) => Value::Block(block_text(&items)),
        (RANK_BLOCK, value) => Value::Block(value.into_bytes()),
        (_, value) => value,
    }
}

/// Bring two operands to their common type, the higher of the two in
/// the order integer < array < string < block
pub fn coerce(a: Value, b: Value) -> (Value, Value) {
    if matches!(a, Value::Builtin(_)) || matches!(b, Value::Builtin(_)) {
        return (a, b);
    }
    let rank = a.rank().max(b.rank());
    (coerce_to(a, rank), coerce_to(b, rank))
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) | (Value::Block(a), Value::Block(b)) => text::compare(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.name.cmp(b.name),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.literal()))
    }
}

impl From<Bigint> for Value {
    fn from(n: Bigint) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}
