//! Built-in leaf matchers.
//!
//! Every leaf except `space`, `nospace`, `empty` and `pos` skips leading
//! whitespace first. A failing leaf may leave the cursor after that
//! whitespace; the engine restores it.

use crate::scan::{is_space, scan_float, scan_integer, Input};
use crate::value::Value;

pub fn empty<'src>(_input: &mut Input<'src>, _code: &mut Vec<Value<'src>>) -> bool {
    true
}

pub fn eoln<'src>(input: &mut Input<'src>, _code: &mut Vec<Value<'src>>) -> bool {
    input.skip_space();
    input.at_end()
}

pub fn space<'src>(input: &mut Input<'src>, _code: &mut Vec<Value<'src>>) -> bool {
    input.skip_space()
}

pub fn nospace<'src>(input: &mut Input<'src>, _code: &mut Vec<Value<'src>>) -> bool {
    input.peek().map_or(true, |b| !is_space(b))
}

pub fn integer<'src>(input: &mut Input<'src>, code: &mut Vec<Value<'src>>) -> bool {
    input.skip_space();
    match scan_integer(input.rest()) {
        Some((value, len)) => {
            input.advance(len);
            code.push(Value::Integer(value));
            true
        }
        None => false,
    }
}

/// A number is only a float when its integer part stops at `.` or `e`.
pub fn float<'src>(input: &mut Input<'src>, code: &mut Vec<Value<'src>>) -> bool {
    input.skip_space();
    let rest = input.rest();
    let int_len = scan_integer(rest).map_or(0, |(_, len)| len);
    if !matches!(rest.as_bytes().get(int_len), Some(b'.') | Some(b'e')) {
        return false;
    }
    match scan_float(rest) {
        Some((value, len)) => {
            input.advance(len);
            code.push(Value::Float(value));
            true
        }
        None => false,
    }
}

/// `"..."` or `'...'`; a backslash skips the next character. Binds the raw
/// contents between the quotes.
pub fn string<'src>(input: &mut Input<'src>, code: &mut Vec<Value<'src>>) -> bool {
    input.skip_space();
    let rest = input.rest();
    let bytes = rest.as_bytes();
    let quote = match bytes.first() {
        Some(&q @ (b'"' | b'\'')) => q,
        _ => return false,
    };

    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => {
                code.push(Value::String(&rest[1..i]));
                input.advance(i + 1);
                return true;
            }
            _ => i += 1,
        }
    }
    false
}

pub fn identifier<'src>(input: &mut Input<'src>, code: &mut Vec<Value<'src>>) -> bool {
    input.skip_space();
    let rest = input.rest();
    let bytes = rest.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return false,
    }
    let len = bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    code.push(Value::String(&rest[..len]));
    input.advance(len);
    true
}

/// Any run of non-whitespace characters.
pub fn token<'src>(input: &mut Input<'src>, code: &mut Vec<Value<'src>>) -> bool {
    input.skip_space();
    let rest = input.rest();
    let len = rest.bytes().take_while(|&b| !is_space(b)).count();
    if len == 0 {
        return false;
    }
    code.push(Value::String(&rest[..len]));
    input.advance(len);
    true
}

/// Binds the rest of the line without consuming it.
pub fn pos<'src>(input: &mut Input<'src>, code: &mut Vec<Value<'src>>) -> bool {
    code.push(Value::Str(input.rest()));
    true
}
