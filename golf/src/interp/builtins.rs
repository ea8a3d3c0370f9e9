//! Native operators
//!
//! Each operator pops its operands (`b` is the top of the stack, `a` the
//! value below it), dispatches on their types and pushes its results.
//! Binary operators that treat both operands alike coerce them to a common
//! type first; the rest match on the specific pairing.

use crate::bigint::Bigint;
use crate::seq;
use crate::text;

use super::array;
use super::error::{InterpResult, RuntimeError};
use super::eval::Interpreter;
use super::value::{Builtin, Value, coerce, int_to_byte};

/// Every native operator, bound by name in the standard bindings
pub static BUILTINS: &[Builtin] = &[
    Builtin { name: "~", func: op_tilde },
    Builtin { name: "`", func: op_backtick },
    Builtin { name: "!", func: op_bang },
    Builtin { name: "@", func: op_rotate },
    Builtin { name: "\\", func: op_swap },
    Builtin { name: ";", func: op_discard },
    Builtin { name: ".", func: op_dup },
    Builtin { name: "$", func: op_dollar },
    Builtin { name: "+", func: op_plus },
    Builtin { name: "-", func: op_minus },
    Builtin { name: "*", func: op_star },
    Builtin { name: "/", func: op_slash },
    Builtin { name: "%", func: op_percent },
    Builtin { name: "|", func: op_or },
    Builtin { name: "&", func: op_and },
    Builtin { name: "^", func: op_xor },
    Builtin { name: "<", func: op_less },
    Builtin { name: ">", func: op_greater },
    Builtin { name: "=", func: op_equal },
    Builtin { name: ",", func: op_comma },
    Builtin { name: "?", func: op_question },
    Builtin { name: "(", func: op_decrement },
    Builtin { name: ")", func: op_increment },
    Builtin { name: "[", func: op_open_array },
    Builtin { name: "]", func: op_close_array },
    Builtin { name: "abs", func: op_abs },
    Builtin { name: "if", func: op_if },
    Builtin { name: "do", func: op_do },
    Builtin { name: "while", func: op_while },
    Builtin { name: "until", func: op_until },
    Builtin { name: "zip", func: op_zip },
    Builtin { name: "base", func: op_base },
    Builtin { name: "rand", func: op_rand },
    Builtin { name: "print", func: op_print },
];

// ============================================================================
// Helpers
// ============================================================================

/// Pop `(a, b)` where `b` was on top
fn pop2(interp: &mut Interpreter) -> InterpResult<(Value, Value)> {
    let b = interp.pop()?;
    let a = interp.pop()?;
    Ok((a, b))
}

/// A count or index argument that must fit in a machine word
fn small(n: &Bigint) -> InterpResult<i64> {
    Ok(n.try_i64()?)
}

fn mismatch(op: &str, a: &Value, b: &Value) -> RuntimeError {
    RuntimeError::type_error(op, &format!("{} and {}", a.type_name(), b.type_name()))
}

/// Run `body` with `element` pushed and pop the single result
fn apply(interp: &mut Interpreter, element: Value, body: &[u8]) -> InterpResult<Value> {
    interp.push(element);
    interp.execute_block(body)?;
    interp.pop()
}

/// Apply a byte-level or element-level shape operation to any sequence,
/// keeping its kind
fn reshape(
    op: &str,
    value: Value,
    bytes: impl FnOnce(Vec<u8>) -> InterpResult<Vec<u8>>,
    values: impl FnOnce(Vec<Value>) -> InterpResult<Vec<Value>>,
) -> InterpResult<Value> {
    match value {
        Value::Array(items) => Ok(Value::Array(values(items)?)),
        Value::Str(b) => Ok(Value::Str(bytes(b)?)),
        Value::Block(b) => Ok(Value::Block(bytes(b)?)),
        other => Err(RuntimeError::type_error(op, other.type_name())),
    }
}

/// Wrap each piece of a chopped string or block
fn pieces(wrap: fn(Vec<u8>) -> Value, chunks: Vec<Vec<u8>>) -> Value {
    Value::Array(chunks.into_iter().map(wrap).collect())
}

/// An empty sequence of the same kind
fn empty_like(value: &Value) -> Value {
    match value {
        Value::Str(_) => Value::Str(Vec::new()),
        Value::Block(_) => Value::Block(Vec::new()),
        _ => Value::Array(Vec::new()),
    }
}

/// `+` on already-coerced or coercible operands
fn add_values(a: Value, b: Value) -> InterpResult<Value> {
    match coerce(a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(&x + &y)),
        (Value::Array(mut x), Value::Array(y)) => {
            x.extend(y);
            Ok(Value::Array(x))
        }
        (Value::Str(mut x), Value::Str(y)) => {
            x.extend_from_slice(&y);
            Ok(Value::Str(x))
        }
        (Value::Block(mut x), Value::Block(y)) => {
            x.push(b' ');
            x.extend_from_slice(&y);
            Ok(Value::Block(x))
        }
        (a, b) => Err(mismatch("+", &a, &b)),
    }
}

// ============================================================================
// Stack manipulation
// ============================================================================

fn op_tilde(interp: &mut Interpreter) -> InterpResult<()> {
    match interp.pop()? {
        Value::Int(n) => interp.push(Value::Int(!&n)),
        Value::Str(text) | Value::Block(text) => interp.execute_block(&text)?,
        Value::Array(items) => {
            for item in items {
                interp.push(item);
            }
        }
        Value::Builtin(builtin) => (builtin.func)(interp)?,
    }
    Ok(())
}

fn op_backtick(interp: &mut Interpreter) -> InterpResult<()> {
    let value = interp.pop()?;
    interp.push(Value::Str(value.literal()));
    Ok(())
}

fn op_bang(interp: &mut Interpreter) -> InterpResult<()> {
    let value = interp.pop()?;
    interp.push(Value::bool(!value.truthy()));
    Ok(())
}

/// `a b c` → `b c a`
fn op_rotate(interp: &mut Interpreter) -> InterpResult<()> {
    let c = interp.pop()?;
    let (a, b) = pop2(interp)?;
    interp.push(b);
    interp.push(c);
    interp.push(a);
    Ok(())
}

fn op_swap(interp: &mut Interpreter) -> InterpResult<()> {
    let (a, b) = pop2(interp)?;
    interp.push(b);
    interp.push(a);
    Ok(())
}

fn op_discard(interp: &mut Interpreter) -> InterpResult<()> {
    interp.pop()?;
    Ok(())
}

fn op_dup(interp: &mut Interpreter) -> InterpResult<()> {
    let top = interp.peek().cloned().ok_or_else(RuntimeError::stack_underflow)?;
    interp.push(top);
    Ok(())
}

/// Copy a stack item, sort, or sort by a key block
fn op_dollar(interp: &mut Interpreter) -> InterpResult<()> {
    let value = match interp.pop()? {
        Value::Int(n) => {
            let n = small(&n)?;
            let picked = if n >= 0 {
                usize::try_from(n).ok().and_then(|i| interp.nth_from_top(i))
            } else {
                usize::try_from(n.unsigned_abs() - 1)
                    .ok()
                    .and_then(|i| interp.nth_from_bottom(i))
            };
            picked.ok_or_else(RuntimeError::stack_underflow)?
        }
        Value::Array(items) => Value::Array(array::sort(items)),
        Value::Str(mut bytes) => {
            text::counting_sort(&mut bytes);
            Value::Str(bytes)
        }
        Value::Block(key) => {
            let carrier = interp.pop()?;
            sort_by_block(interp, carrier, &key)?
        }
        other => return Err(RuntimeError::type_error("$", other.type_name())),
    };
    interp.push(value);
    Ok(())
}

fn sort_by_block(interp: &mut Interpreter, carrier: Value, key: &[u8]) -> InterpResult<Value> {
    let template = empty_like(&carrier);
    if !carrier.is_seq() {
        return Err(RuntimeError::type_error("$", carrier.type_name()));
    }
    let elements = carrier.into_elements();
    let mut keys = Vec::with_capacity(elements.len());
    for element in &elements {
        keys.push(apply(interp, element.clone(), key)?);
    }
    Ok(template.from_elements_like(array::sort_by_mapping(elements, &keys)))
}

// ============================================================================
// Arithmetic and sequence operators
// ============================================================================

fn op_plus(interp: &mut Interpreter) -> InterpResult<()> {
    let (a, b) = pop2(interp)?;
    let sum = add_values(a, b)?;
    interp.push(sum);
    Ok(())
}

fn op_minus(interp: &mut Interpreter) -> InterpResult<()> {
    let (a, b) = pop2(interp)?;
    let result = match coerce(a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(&x - &y),
        (Value::Array(x), Value::Array(y)) => Value::Array(array::subtract(x, &y)),
        (Value::Str(mut x), Value::Str(y)) => {
            text::subtract(&mut x, &y);
            Value::Str(x)
        }
        (Value::Block(mut x), Value::Block(y)) => {
            text::subtract(&mut x, &y);
            Value::Block(x)
        }
        (a, b) => return Err(mismatch("-", &a, &b)),
    };
    interp.push(result);
    Ok(())
}

/// Multiply, repeat, run n times, fold, or join
fn op_star(interp: &mut Interpreter) -> InterpResult<()> {
    let (a, b) = pop2(interp)?;
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => interp.push(Value::Int(&x * &y)),
        (Value::Int(n), Value::Block(body)) | (Value::Block(body), Value::Int(n)) => {
            let times = small(&n)?;
            for _ in 0..times.max(0) {
                interp.execute_block(&body)?;
            }
        }
        (Value::Int(n), sequence) | (sequence, Value::Int(n)) if sequence.is_seq() => {
            let times = small(&n)?;
            let repeated = reshape(
                "*",
                sequence,
                |b| Ok(seq::repeat(b, times)?),
                |v| Ok(seq::repeat(v, times)?),
            )?;
            interp.push(repeated);
        }
        (Value::Block(body), sequence) | (sequence, Value::Block(body)) if sequence.is_seq() => {
            fold(interp, sequence, &body)?;
        }
        (a, b) => {
            let joined = match (a, b) {
                (list @ Value::Array(_), sep) if !matches!(sep, Value::Array(_)) => join(list, sep)?,
                (sep, list @ Value::Array(_)) if !matches!(sep, Value::Array(_)) => join(list, sep)?,
                (list, sep) => join(list, sep)?,
            };
            interp.push(joined);
        }
    }
    Ok(())
}

/// Seed with the first element, then run `body` once per further element
fn fold(interp: &mut Interpreter, sequence: Value, body: &[u8]) -> InterpResult<()> {
    let mut elements = sequence.into_elements().into_iter();
    if let Some(first) = elements.next() {
        interp.push(first);
        for element in elements {
            interp.push(element);
            interp.execute_block(body)?;
        }
    }
    Ok(())
}

/// Concatenate the elements of `list` with `sep` between them
fn join(list: Value, sep: Value) -> InterpResult<Value> {
    if !sep.is_seq() {
        return Err(mismatch("*", &list, &sep));
    }
    let elements = match list {
        Value::Str(bytes) | Value::Block(bytes) => {
            bytes.into_iter().map(|b| Value::Str(vec![b])).collect()
        }
        Value::Array(items) => items,
        other => vec![other],
    };
    let mut elements = elements.into_iter();
    let Some(mut joined) = elements.next() else {
        return Ok(empty_like(&sep));
    };
    for element in elements {
        joined = add_values(joined, sep.clone())?;
        joined = add_values(joined, element)?;
    }
    let (joined, _) = coerce(joined, empty_like(&sep));
    Ok(joined)
}

/// Divide, group, each, unfold, or split
fn op_slash(interp: &mut Interpreter) -> InterpResult<()> {
    let (a, b) = pop2(interp)?;
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => interp.push(Value::Int(x.div_floor(&y)?)),
        (Value::Int(n), sequence) | (sequence, Value::Int(n)) if sequence.is_seq() => {
            let size = small(&n)?;
            let groups = match sequence {
                Value::Array(items) => Value::Array(
                    seq::split_into_groups(items, size)?
                        .into_iter()
                        .map(Value::Array)
                        .collect(),
                ),
                Value::Str(bytes) => pieces(Value::Str, seq::split_into_groups(bytes, size)?),
                Value::Block(bytes) => pieces(Value::Block, seq::split_into_groups(bytes, size)?),
                other => return Err(RuntimeError::type_error("/", other.type_name())),
            };
            interp.push(groups);
        }
        (Value::Block(cond), Value::Block(step)) => unfold(interp, &cond, &step)?,
        (Value::Block(body), sequence) | (sequence, Value::Block(body)) if sequence.is_seq() => {
            for element in sequence.into_elements() {
                interp.push(element);
                interp.execute_block(&body)?;
            }
        }
        (a, b) => {
            let parts = split(a, b, true)?;
            interp.push(parts);
        }
    }
    Ok(())
}

/// Collect values while `cond` holds on a copy of the top, applying `step`
fn unfold(interp: &mut Interpreter, cond: &[u8], step: &[u8]) -> InterpResult<()> {
    let mut results = Vec::new();
    loop {
        let top = interp.peek().cloned().ok_or_else(RuntimeError::stack_underflow)?;
        if !apply(interp, top, cond)?.truthy() {
            break;
        }
        let top = interp.peek().cloned().ok_or_else(RuntimeError::stack_underflow)?;
        results.push(top);
        interp.execute_block(step)?;
    }
    interp.pop()?;
    interp.push(Value::Array(results));
    Ok(())
}

fn split(a: Value, b: Value, keep_empty: bool) -> InterpResult<Value> {
    fn keep<T>(mut chunks: Vec<Vec<T>>, keep_empty: bool) -> Vec<Vec<T>> {
        if !keep_empty {
            chunks.retain(|chunk| !chunk.is_empty());
        }
        chunks
    }

    let result = match coerce(a, b) {
        (Value::Array(items), Value::Array(sep)) => Value::Array(
            keep(array::split(items, &sep), keep_empty)
                .into_iter()
                .map(Value::Array)
                .collect(),
        ),
        (Value::Str(bytes), Value::Str(sep)) => {
            pieces(Value::Str, keep(text::split(&bytes, &sep), keep_empty))
        }
        (Value::Block(bytes), Value::Block(sep)) => {
            pieces(Value::Block, keep(text::split(&bytes, &sep), keep_empty))
        }
        (a, b) => return Err(mismatch("/", &a, &b)),
    };
    Ok(result)
}

/// Modulo, step, map, or split without empty pieces
fn op_percent(interp: &mut Interpreter) -> InterpResult<()> {
    let (a, b) = pop2(interp)?;
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => interp.push(Value::Int(x.mod_floor(&y)?)),
        (Value::Int(n), sequence) | (sequence, Value::Int(n)) if sequence.is_seq() => {
            let step = small(&n)?;
            let stepped = reshape(
                "%",
                sequence,
                |b| Ok(seq::step_over(b, step)?),
                |v| Ok(seq::step_over(v, step)?),
            )?;
            interp.push(stepped);
        }
        (Value::Block(body), sequence) | (sequence, Value::Block(body)) if sequence.is_seq() => {
            let mapped = map(interp, sequence, &body)?;
            interp.push(mapped);
        }
        (a, b) => {
            let parts = split(a, b, false)?;
            interp.push(parts);
        }
    }
    Ok(())
}

/// Run `body` per element; everything each run leaves above the starting
/// height becomes that element's output
fn map(interp: &mut Interpreter, sequence: Value, body: &[u8]) -> InterpResult<Value> {
    let template = empty_like(&sequence);
    let mut results = Vec::new();
    for element in sequence.into_elements() {
        let height = interp.stack().len();
        interp.push(element);
        interp.execute_block(body)?;
        results.extend(interp.split_stack(height));
    }
    Ok(template.from_elements_like(results))
}

fn set_operation(
    interp: &mut Interpreter,
    op: &str,
    ints: fn(&Bigint, &Bigint) -> Bigint,
    values: fn(Vec<Value>, Vec<Value>) -> Vec<Value>,
    bytes: fn(&mut Vec<u8>, &[u8]),
) -> InterpResult<()> {
    let (a, b) = pop2(interp)?;
    let result = match coerce(a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(ints(&x, &y)),
        (Value::Array(x), Value::Array(y)) => Value::Array(values(x, y)),
        (Value::Str(mut x), Value::Str(y)) => {
            bytes(&mut x, &y);
            Value::Str(x)
        }
        (Value::Block(mut x), Value::Block(y)) => {
            bytes(&mut x, &y);
            Value::Block(x)
        }
        (a, b) => return Err(mismatch(op, &a, &b)),
    };
    interp.push(result);
    Ok(())
}

fn op_or(interp: &mut Interpreter) -> InterpResult<()> {
    set_operation(interp, "|", |x, y| x | y, array::or, text::or)
}

fn op_and(interp: &mut Interpreter) -> InterpResult<()> {
    set_operation(interp, "&", |x, y| x & y, |x, y| array::and(x, &y), text::and)
}

fn op_xor(interp: &mut Interpreter) -> InterpResult<()> {
    set_operation(interp, "^", |x, y| x ^ y, array::xor, text::xor)
}

// ============================================================================
// Comparison and indexing
// ============================================================================

fn slice(interp: &mut Interpreter, op: &str, take: bool) -> InterpResult<()> {
    let (a, b) = pop2(interp)?;
    let result = match (a, b) {
        (sequence, Value::Int(n)) | (Value::Int(n), sequence) if sequence.is_seq() => {
            let index = small(&n)?;
            if take {
                reshape(op, sequence, |b| Ok(seq::take(b, index)), |v| Ok(seq::take(v, index)))?
            } else {
                reshape(op, sequence, |b| Ok(seq::drop(b, index)), |v| Ok(seq::drop(v, index)))?
            }
        }
        (a, b) if take => Value::bool(a.compare_coerced(&b).is_lt()),
        (a, b) => Value::bool(a.compare_coerced(&b).is_gt()),
    };
    interp.push(result);
    Ok(())
}

fn op_less(interp: &mut Interpreter) -> InterpResult<()> {
    slice(interp, "<", true)
}

fn op_greater(interp: &mut Interpreter) -> InterpResult<()> {
    slice(interp, ">", false)
}

/// Element at an index, or equality
fn op_equal(interp: &mut Interpreter) -> InterpResult<()> {
    let (a, b) = pop2(interp)?;
    match (a, b) {
        (sequence, Value::Int(n)) | (Value::Int(n), sequence) if sequence.is_seq() => {
            let index = small(&n)?;
            let element = match sequence {
                Value::Array(mut items) => {
                    seq::position(items.len(), index).map(|i| items.swap_remove(i))
                }
                Value::Str(bytes) | Value::Block(bytes) => {
                    seq::position(bytes.len(), index).map(|i| Value::int(bytes[i] as u64))
                }
                _ => None,
            };
            if let Some(element) = element {
                interp.push(element);
            }
        }
        (a, b) => interp.push(Value::bool(a.compare_coerced(&b).is_eq())),
    }
    Ok(())
}

/// Range, length, or filter
fn op_comma(interp: &mut Interpreter) -> InterpResult<()> {
    let result = match interp.pop()? {
        Value::Int(n) => {
            let count = usize::try_from(small(&n)?.max(0))
                .map_err(|_| RuntimeError::allocation("range too large"))?;
            let mut range = Vec::new();
            range
                .try_reserve_exact(count)
                .map_err(|_| RuntimeError::allocation("range too large"))?;
            range.extend((0..count).map(Value::int));
            Value::Array(range)
        }
        Value::Block(body) if interp.peek().is_some_and(Value::is_seq) => {
            let sequence = interp.pop()?;
            filter(interp, sequence, &body)?
        }
        value @ (Value::Array(_) | Value::Str(_) | Value::Block(_)) => {
            Value::int(value.seq_len().unwrap_or(0))
        }
        other => return Err(RuntimeError::type_error(",", other.type_name())),
    };
    interp.push(result);
    Ok(())
}

fn filter(interp: &mut Interpreter, sequence: Value, body: &[u8]) -> InterpResult<Value> {
    match sequence {
        Value::Array(items) => {
            let mut kept = Vec::new();
            for item in items {
                if apply(interp, item.clone(), body)?.truthy() {
                    kept.push(item);
                }
            }
            Ok(Value::Array(kept))
        }
        Value::Str(bytes) => Ok(Value::Str(filter_bytes(interp, bytes, body)?)),
        Value::Block(bytes) => Ok(Value::Block(filter_bytes(interp, bytes, body)?)),
        other => Err(RuntimeError::type_error(",", other.type_name())),
    }
}

fn filter_bytes(interp: &mut Interpreter, bytes: Vec<u8>, body: &[u8]) -> InterpResult<Vec<u8>> {
    let mut kept = Vec::new();
    for b in bytes {
        if apply(interp, Value::int(b as u64), body)?.truthy() {
            kept.push(b);
        }
    }
    Ok(kept)
}

/// Power, find first match, or index of
fn op_question(interp: &mut Interpreter) -> InterpResult<()> {
    let (a, b) = pop2(interp)?;
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => interp.push(Value::Int(x.pow(&y)?)),
        (Value::Block(body), sequence) | (sequence, Value::Block(body)) if sequence.is_seq() => {
            for element in sequence.into_elements() {
                if apply(interp, element.clone(), &body)?.truthy() {
                    interp.push(element);
                    break;
                }
            }
        }
        (Value::Str(haystack), Value::Str(needle)) => {
            let index = text::find(&haystack, &needle).map_or(-1, |i| i as i64);
            interp.push(Value::from(index));
        }
        (sequence, needle) | (needle, sequence) if sequence.is_seq() => {
            let index = match (&sequence, &needle) {
                (Value::Array(items), needle) => array::find(items, needle),
                (Value::Str(bytes) | Value::Block(bytes), Value::Int(n))
                    if !n.is_negative() && n.bit_length() <= 8 =>
                {
                    text::find_byte(bytes, int_to_byte(n))
                }
                _ => None,
            };
            interp.push(Value::from(index.map_or(-1, |i| i as i64)));
        }
        (a, b) => return Err(mismatch("?", &a, &b)),
    }
    Ok(())
}

/// Decrement, or split off the first element
fn op_decrement(interp: &mut Interpreter) -> InterpResult<()> {
    match interp.pop()? {
        Value::Int(mut n) => {
            n.decrement();
            interp.push(Value::Int(n));
        }
        Value::Array(mut items) => {
            if items.is_empty() {
                return Err(RuntimeError::domain("cannot uncons an empty array"));
            }
            let first = items.remove(0);
            interp.push(Value::Array(items));
            interp.push(first);
        }
        Value::Str(bytes) => uncons_front(interp, bytes, Value::Str)?,
        Value::Block(bytes) => uncons_front(interp, bytes, Value::Block)?,
        other => return Err(RuntimeError::type_error("(", other.type_name())),
    }
    Ok(())
}

fn uncons_front(
    interp: &mut Interpreter,
    mut bytes: Vec<u8>,
    wrap: fn(Vec<u8>) -> Value,
) -> InterpResult<()> {
    let Some(&first) = bytes.first() else {
        return Err(RuntimeError::domain("cannot uncons an empty string"));
    };
    seq::remove_from_front(&mut bytes, 1);
    interp.push(wrap(bytes));
    interp.push(Value::int(first as u64));
    Ok(())
}

/// Increment, or split off the last element
fn op_increment(interp: &mut Interpreter) -> InterpResult<()> {
    match interp.pop()? {
        Value::Int(mut n) => {
            n.increment();
            interp.push(Value::Int(n));
        }
        Value::Array(mut items) => {
            let last = items
                .pop()
                .ok_or_else(|| RuntimeError::domain("cannot uncons an empty array"))?;
            interp.push(Value::Array(items));
            interp.push(last);
        }
        value @ (Value::Str(_) | Value::Block(_)) => {
            let is_block = matches!(value, Value::Block(_));
            let mut bytes = value.into_bytes();
            let last = bytes
                .pop()
                .ok_or_else(|| RuntimeError::domain("cannot uncons an empty string"))?;
            interp.push(if is_block { Value::Block(bytes) } else { Value::Str(bytes) });
            interp.push(Value::int(last as u64));
        }
        other => return Err(RuntimeError::type_error(")", other.type_name())),
    }
    Ok(())
}

fn op_open_array(interp: &mut Interpreter) -> InterpResult<()> {
    interp.open_mark();
    Ok(())
}

fn op_close_array(interp: &mut Interpreter) -> InterpResult<()> {
    let array = interp.close_mark();
    interp.push(array);
    Ok(())
}

// ============================================================================
// Named operators
// ============================================================================

fn op_abs(interp: &mut Interpreter) -> InterpResult<()> {
    match interp.pop()? {
        Value::Int(n) => {
            interp.push(Value::Int(n.abs()));
            Ok(())
        }
        other => Err(RuntimeError::type_error("abs", other.type_name())),
    }
}

/// `cond then else if`
fn op_if(interp: &mut Interpreter) -> InterpResult<()> {
    let otherwise = interp.pop()?;
    let (cond, then) = pop2(interp)?;
    interp.call_value(if cond.truthy() { then } else { otherwise })
}

/// Run the body, then pop a condition; repeat while it holds
fn op_do(interp: &mut Interpreter) -> InterpResult<()> {
    let body = interp.pop()?;
    loop {
        interp.call_value(body.clone())?;
        if !interp.pop()?.truthy() {
            return Ok(());
        }
    }
}

/// `cond body while`; a bare value in either place is pushed as is
fn pre_test_loop(interp: &mut Interpreter, until: bool) -> InterpResult<()> {
    let (cond, body) = pop2(interp)?;
    loop {
        interp.call_value(cond.clone())?;
        if interp.pop()?.truthy() == until {
            return Ok(());
        }
        interp.call_value(body.clone())?;
    }
}

fn op_while(interp: &mut Interpreter) -> InterpResult<()> {
    pre_test_loop(interp, false)
}

fn op_until(interp: &mut Interpreter) -> InterpResult<()> {
    pre_test_loop(interp, true)
}

/// Transpose an array of sequences; columns take the first row's kind
fn op_zip(interp: &mut Interpreter) -> InterpResult<()> {
    let rows = match interp.pop()? {
        Value::Array(rows) => rows,
        other => return Err(RuntimeError::type_error("zip", other.type_name())),
    };
    let template = rows.first().map_or(Value::Array(Vec::new()), empty_like);
    let mut columns: Vec<Vec<Value>> = Vec::new();
    for row in rows {
        if !row.is_seq() {
            return Err(RuntimeError::type_error("zip", row.type_name()));
        }
        for (i, element) in row.into_elements().into_iter().enumerate() {
            if columns.len() <= i {
                columns.push(Vec::new());
            }
            columns[i].push(element);
        }
    }
    let zipped = columns
        .into_iter()
        .map(|column| template.from_elements_like(column))
        .collect();
    interp.push(Value::Array(zipped));
    Ok(())
}

/// `n b base` → digits; `digits b base` → n
fn op_base(interp: &mut Interpreter) -> InterpResult<()> {
    let (a, b) = pop2(interp)?;
    let base = match b {
        Value::Int(base) => base,
        b => return Err(mismatch("base", &a, &b)),
    };
    let result = match a {
        Value::Int(n) => Value::Array(n.to_digits(&base)?.into_iter().map(Value::Int).collect()),
        Value::Array(items) => {
            let mut digits = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Int(d) => digits.push(d),
                    other => return Err(RuntimeError::type_error("base", other.type_name())),
                }
            }
            Value::Int(Bigint::from_digits(&digits, &base))
        }
        other => return Err(RuntimeError::type_error("base", other.type_name())),
    };
    interp.push(result);
    Ok(())
}

fn op_rand(interp: &mut Interpreter) -> InterpResult<()> {
    match interp.pop()? {
        Value::Int(max) => {
            let n = interp.rng().randint(&max);
            interp.push(Value::Int(n));
            Ok(())
        }
        other => Err(RuntimeError::type_error("rand", other.type_name())),
    }
}

fn op_print(interp: &mut Interpreter) -> InterpResult<()> {
    let value = interp.pop()?;
    interp.write_output(&value.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::interp::{ErrorKind, SharedOutput};

    fn run(source: &str) -> Vec<Value> {
        let config = RunConfig::new().seed(3).read_stdin(false);
        let mut interp = Interpreter::with_output(config, Box::new(SharedOutput::new()));
        interp.execute(source).unwrap();
        interp.stack().to_vec()
    }

    fn top(source: &str) -> String {
        let stack = run(source);
        stack.last().map(|v| v.to_string()).unwrap_or_default()
    }

    fn fails(source: &str) -> ErrorKind {
        let config = RunConfig::new().seed(3).read_stdin(false);
        let mut interp = Interpreter::with_output(config, Box::new(SharedOutput::new()));
        interp.execute(source).unwrap_err().kind
    }

    // ---- stack ----

    #[test]
    fn test_stack_shuffles() {
        assert_eq!(top("[1 2 3@]"), "[2 3 1]");
        assert_eq!(top("[1 2\\]"), "[2 1]");
        assert_eq!(top("1 2;"), "1");
        assert_eq!(top("[1 2.]"), "[1 2 2]");
    }

    #[test]
    fn test_tilde() {
        assert_eq!(top("5~"), "-6");
        assert_eq!(top("\"1 2+\"~"), "3");
        assert_eq!(top("{3 4*}~"), "12");
        assert_eq!(run("[1 2 3]~").len(), 3);
    }

    #[test]
    fn test_backtick_and_bang() {
        assert_eq!(top("[1 \"a\"]`"), "\"[1 \\\"a\\\"]\"");
        assert_eq!(top("0!"), "1");
        assert_eq!(top("\"\"!"), "1");
        assert_eq!(top("[0]!"), "0");
    }

    #[test]
    fn test_dollar() {
        assert_eq!(top("1 2 3 4 1$"), "3");
        assert_eq!(top("1 2 3 4 -1$"), "1");
        assert_eq!(top("[3 1 2]$"), "[1 2 3]");
        assert_eq!(top("'hello'$"), "\"ehllo\"");
        assert_eq!(top("[5 4 3 2 1]{-1*}$"), "[5 4 3 2 1]");
        assert_eq!(top("['bb' 'a' 'ccc']{,}$"), "[\"a\" \"bb\" \"ccc\"]");
        assert_eq!(fails("1 5$"), ErrorKind::StackUnderflow);
    }

    // ---- arithmetic ----

    #[test]
    fn test_plus() {
        assert_eq!(top("5 3+"), "8");
        assert_eq!(top("[1 2][3]+"), "[1 2 3]");
        assert_eq!(top("'ab' 'c'+"), "\"abc\"");
        assert_eq!(top("1 'a'+"), "\"1a\"");
        assert_eq!(top("[1] 2+"), "[1 2]");
        assert_eq!(top("{a}{b}+"), "{a b}");
        assert_eq!(top("'a'{b}+"), "{a b}");
    }

    #[test]
    fn test_minus() {
        assert_eq!(top("1 5-"), "-4");
        assert_eq!(top("[1 2 1 3][1]-"), "[2 3]");
        assert_eq!(top("'hello' 'l'-"), "\"heo\"");
    }

    #[test]
    fn test_star() {
        assert_eq!(top("6 7*"), "42");
        assert_eq!(top("[1 2]3*"), "[1 2 1 2 1 2]");
        assert_eq!(top("3'ab'*"), "\"ababab\"");
        assert_eq!(top("0 {1+} 5*"), "5");
        assert_eq!(top("[1 2 3 4]{+}*"), "10");
        assert_eq!(top("[1 2 3]','*"), "\"1,2,3\"");
        assert_eq!(top("'abc' '-'*"), "\"a-b-c\"");
        assert_eq!(top("[[1 2][3 4]][0]*"), "[1 2 0 3 4]");
        assert_eq!(top("[]','*"), "\"\"");
        assert_eq!(fails("[1]-1*"), ErrorKind::Domain);
    }

    #[test]
    fn test_slash() {
        assert_eq!(top("7 2/"), "3");
        assert_eq!(top("-7 2/"), "-4");
        assert_eq!(top("[1 2 3 4 5]2/"), "[[1 2] [3 4] [5]]");
        assert_eq!(top("'abcde'2/"), "[\"ab\" \"cd\" \"e\"]");
        assert_eq!(top("'a,b,,c' ','/"), "[\"a\" \"b\" \"\" \"c\"]");
        assert_eq!(top("[1 0 2 0 3][0]/"), "[[1] [2] [3]]");
        assert_eq!(top("0 [1 2 3]{+}/"), "6");
        assert_eq!(top("5{}{(}/"), "[5 4 3 2 1]");
        assert_eq!(run("0 1{100<}{.@+}/").len(), 2);
        assert_eq!(fails("1 0/"), ErrorKind::DivisionByZero);
        assert_eq!(fails("[1 2]0/"), ErrorKind::Domain);
    }

    #[test]
    fn test_percent() {
        assert_eq!(top("7 3%"), "1");
        assert_eq!(top("-7 3%"), "2");
        assert_eq!(top("[1 2 3 4 5]2%"), "[1 3 5]");
        assert_eq!(top("[1 2 3]-1%"), "[3 2 1]");
        assert_eq!(top("[1 2 3]{2*}%"), "[2 4 6]");
        assert_eq!(top("[1 2]{.}%"), "[1 1 2 2]");
        assert_eq!(top("'abc'{)}%"), "\"bcd\"");
        assert_eq!(top("'a,b,,c' ','%"), "[\"a\" \"b\" \"c\"]");
        assert_eq!(fails("[1]0%"), ErrorKind::Domain);
    }

    #[test]
    fn test_bitwise_and_set_ops() {
        assert_eq!(top("5 3|"), "7");
        assert_eq!(top("5 3&"), "1");
        assert_eq!(top("5 3^"), "6");
        assert_eq!(top("[1 2 3][2 3 4]&"), "[2 3]");
        assert_eq!(top("[1 2 3][2 3 4]|"), "[1 2 3 4]");
        assert_eq!(top("[1 2 3][2 3 4]^"), "[1 4]");
        assert_eq!(top("'hello' 'world'&"), "\"lo\"");
    }

    // ---- comparison ----

    #[test]
    fn test_compare_and_slice() {
        assert_eq!(top("1 2<"), "1");
        assert_eq!(top("'b' 'a'>"), "1");
        assert_eq!(top("[1 2 3 4]2<"), "[1 2]");
        assert_eq!(top("[1 2 3 4]2>"), "[3 4]");
        assert_eq!(top("'abcd'-1<"), "\"abc\"");
    }

    #[test]
    fn test_compare_mixed_types_by_content() {
        assert_eq!(top("[45] ','<"), "0");
        assert_eq!(top("[45] ','>"), "1");
        assert_eq!(top("[104 105] 'hi'="), "1");
        assert_eq!(top("97 'a'="), "0");
    }

    #[test]
    fn test_sort_mixed_types_by_type() {
        assert_eq!(top("[[300] ',' [45]]$"), "[[45] [300] \",\"]");
        assert_eq!(top("[{a} 'b' 2 [1]]$"), "[2 [1] \"b\" {a}]");
    }

    #[test]
    fn test_equal_and_index() {
        assert_eq!(top("3 3="), "1");
        assert_eq!(top("'a' {a}="), "0");
        assert_eq!(top("[5 6 7]1="), "6");
        assert_eq!(top("[5 6 7]-1="), "7");
        assert_eq!(top("'abc'0="), "97");
        assert!(run("[5 6 7]9=").is_empty());
    }

    #[test]
    fn test_comma() {
        assert_eq!(top("4,"), "[0 1 2 3]");
        assert_eq!(top("0,"), "[]");
        assert_eq!(top("[1 2 3],"), "3");
        assert_eq!(top("'hello',"), "5");
        assert_eq!(top("[1 2 3 4]{2%},"), "[1 3]");
        assert_eq!(top("'a1b2'{58<},"), "\"12\"");
    }

    #[test]
    fn test_question() {
        assert_eq!(top("3 2?"), "9");
        assert_eq!(top("[1 2 3]2?"), "1");
        assert_eq!(top("[1 2 3]9?"), "-1");
        assert_eq!(top("'hello' 'll'?"), "2");
        assert_eq!(top("'hello' 108?"), "2");
        assert_eq!(top("[1 2 3 4]{2>}?"), "3");
        assert_eq!(fails("2 -1?"), ErrorKind::Domain);
    }

    #[test]
    fn test_uncons() {
        assert_eq!(run("[1 2 3]("), vec![
            Value::Array(vec![Value::from(2), Value::from(3)]),
            Value::from(1)
        ]);
        assert_eq!(run("'abc')"), vec![Value::str("ab"), Value::from(99)]);
        assert_eq!(top("'abc'("), "97");
        assert_eq!(top("5("), "4");
        assert_eq!(top("5)"), "6");
        assert_eq!(fails("[]("), ErrorKind::Domain);
    }

    #[test]
    fn test_brackets() {
        assert_eq!(top("1 [2 3]"), "[2 3]");
        assert_eq!(top("[1 [2] 3]"), "[1 [2] 3]");
        assert_eq!(top("1 2 [;;]"), "[]");
    }

    // ---- named operators ----

    #[test]
    fn test_abs_and_if() {
        assert_eq!(top("-5 abs"), "5");
        assert_eq!(top("1 'yes' 'no' if"), "\"yes\"");
        assert_eq!(top("0 {1} {2} if"), "2");
        assert_eq!(fails("'x' abs"), ErrorKind::TypeError);
    }

    #[test]
    fn test_loops() {
        assert_eq!(top("[5 {.(.}do;]"), "[5 4 3 2 1]");
        assert_eq!(top("10 {.}{2-}while"), "0");
        assert_eq!(top("1 {.100>}{2*}until"), "128");
    }

    #[test]
    fn test_loops_push_bare_values() {
        assert!(run("0 do").is_empty());
        assert!(run("{0} 5 while").is_empty());
        assert_eq!(top("7 1 {;0} until"), "7");
        assert_eq!(run("3 0 {1}while"), vec![Value::from(3)]);
    }

    #[test]
    fn test_loops_do_not_execute_strings() {
        assert_eq!(run("0 '1 +' {;0} until"), vec![Value::from(0)]);
        assert_eq!(run("0 '' do"), vec![Value::from(0)]);
    }

    #[test]
    fn test_zip() {
        assert_eq!(top("[[1 2 3][4 5 6]]zip"), "[[1 4] [2 5] [3 6]]");
        assert_eq!(top("['ab' 'cd']zip"), "[\"ac\" \"bd\"]");
        assert_eq!(top("[[1 2][3]]zip"), "[[1 3] [2]]");
    }

    #[test]
    fn test_base() {
        assert_eq!(top("6 2 base"), "[1 1 0]");
        assert_eq!(top("[1 1 0]2 base"), "6");
        assert_eq!(top("0 10 base"), "[]");
        assert_eq!(fails("5 1 base"), ErrorKind::Domain);
    }

    #[test]
    fn test_rand_in_range() {
        let stack = run("[100 {10 rand} *]");
        let Value::Array(values) = &stack[0] else {
            panic!("expected array");
        };
        assert_eq!(values.len(), 100);
        assert!(values.iter().all(|v| *v >= Value::from(0) && *v < Value::from(10)));
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(fails("'a' zip"), ErrorKind::TypeError);
        assert_eq!(fails("[1] 'x' base"), ErrorKind::TypeError);
        assert_eq!(fails("'a' rand"), ErrorKind::TypeError);
    }
}
