//! Runtime values: bytecode entries and operand stack slots.

use std::fmt;

use crate::symbol::SymbolId;

/// The kind tag of a [`Value`], also a value in its own right (`typeof`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Undefined,
    Ptr,
    Str,
    Integer,
    Float,
    String,
    Symbol,
    Type,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Undefined => "undefined",
            ValueKind::Ptr => "pointer",
            ValueKind::Str => "raw string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Symbol => "symbol",
            ValueKind::Type => "type",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A runtime datum.
///
/// `Str` is an unbounded view of the input from some position to the end of
/// the line; `String` is a length-counted slice. Both borrow the parsed line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'src> {
    Undefined,
    Ptr(usize),
    Str(&'src str),
    Integer(i64),
    Float(f64),
    String(&'src str),
    Symbol(SymbolId),
    Type(ValueKind),
}

impl<'src> Value<'src> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Ptr(_) => ValueKind::Ptr,
            Value::Str(_) => ValueKind::Str,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Symbol(_) => ValueKind::Symbol,
            Value::Type(_) => ValueKind::Type,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Text payload of `Str` and `String` values.
    pub fn text(&self) -> Option<&'src str> {
        match *self {
            Value::Str(s) | Value::String(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_text() {
        assert_eq!(Value::Integer(3).kind(), ValueKind::Integer);
        assert_eq!(Value::Type(ValueKind::Float).kind(), ValueKind::Type);
        assert_eq!(Value::String("ab").text(), Some("ab"));
        assert_eq!(Value::Str("rest of line").text(), Some("rest of line"));
        assert_eq!(Value::Float(1.0).text(), None);
        assert!(Value::Undefined.is_undefined());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ValueKind::Integer.to_string(), "integer");
        assert_eq!(ValueKind::Str.name(), "raw string");
    }
}
