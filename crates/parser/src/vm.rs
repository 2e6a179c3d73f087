//! Linear executor for parse bytecode.
//!
//! Literals are pushed on the operand stack; symbol references run the
//! symbol's semantic function. Execution stops at the first `Undefined`.

use common::debug::{create_logger, Logger};
use common::{log, log_detail};

use crate::error::ExecError;
use crate::scan::{scan_float, scan_integer};
use crate::session::Session;
use crate::symbol::{Semantic, SymbolId};
use crate::value::{Value, ValueKind};

/// A semantic action. Gets the machine and may mutate the session.
pub type SemanticFn<'a> = for<'m, 'src> fn(&mut Machine<'m, 'a, 'src>) -> Result<(), ExecError>;

/// Execution environment of one VM run.
pub struct Machine<'m, 'a, 'src> {
    pub session: &'m mut Session<'a>,
    stack: Vec<Value<'src>>,
    capacity: usize,
}

impl<'m, 'a, 'src> Machine<'m, 'a, 'src> {
    pub fn new(session: &'m mut Session<'a>, capacity: usize) -> Self {
        Self {
            session,
            stack: Vec::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, value: Value<'src>) -> Result<(), ExecError> {
        if self.stack.len() >= self.capacity {
            return Err(ExecError::StackOverflow { capacity: self.capacity });
        }
        self.stack.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Value<'src>, ExecError> {
        self.stack.pop().ok_or(ExecError::StackUnderflow)
    }

    /// The top of stack, modified in place by unary operations.
    pub fn top_mut(&mut self) -> Result<&mut Value<'src>, ExecError> {
        self.stack.last_mut().ok_or(ExecError::StackUnderflow)
    }

    /// Pop a name bound by the `identifier`, `token` or `string` leaves.
    pub fn pop_name(&mut self) -> Result<&'src str, ExecError> {
        match self.pop()? {
            Value::String(name) | Value::Str(name) => Ok(name),
            other => Err(ExecError::ExpectedName { found: other.kind().name() }),
        }
    }

    pub fn stack(&self) -> &[Value<'src>] {
        &self.stack
    }

    pub fn into_stack(self) -> Vec<Value<'src>> {
        self.stack
    }
}

/// Run `code` on a fresh stack of `capacity` slots and return the final
/// stack.
pub fn execute<'a, 'src>(
    session: &mut Session<'a>,
    code: &[Value<'src>],
    capacity: usize,
) -> Result<Vec<Value<'src>>, ExecError> {
    let log: Logger = create_logger("vm");
    let mut machine = Machine::new(session, capacity);

    for value in code {
        match *value {
            Value::Undefined => break,
            Value::Symbol(id) => call(&mut machine, id, &log)?,
            literal => {
                log_detail!(log, "push {:?}", literal);
                machine.push(literal)?;
            }
        }
    }

    log!(log, "halt with {} values", machine.stack().len());
    Ok(machine.into_stack())
}

fn call(machine: &mut Machine<'_, '_, '_>, id: SymbolId, log: &Logger) -> Result<(), ExecError> {
    let symbol = machine.session.symbol(id);
    let name = symbol.name;
    match symbol.semantic {
        Semantic::Bound(semantic) => {
            log_detail!(log, "call {}", name);
            semantic(machine)
        }
        Semantic::Declared | Semantic::None => {
            machine.session.warn(format!("{}: undefined semantic", name));
            Ok(())
        }
    }
}

// =============================================================================
// Built-in semantics
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    fn integer(self, x: i64, y: i64) -> Option<i64> {
        match self {
            Op::Add => x.checked_add(y),
            Op::Sub => x.checked_sub(y),
            Op::Mul => x.checked_mul(y),
            Op::Div => x.checked_div(y),
        }
    }

    fn float(self, x: f64, y: f64) -> f64 {
        match self {
            Op::Add => x + y,
            Op::Sub => x - y,
            Op::Mul => x * y,
            Op::Div => x / y,
        }
    }
}

fn binary(m: &mut Machine<'_, '_, '_>, op: Op) -> Result<(), ExecError> {
    let y = m.pop()?;
    let x = m.top_mut()?;
    *x = match (*x, y) {
        (Value::Integer(a), Value::Integer(b)) => {
            op.integer(a, b).map_or(Value::Undefined, Value::Integer)
        }
        (Value::Integer(a), Value::Float(b)) => Value::Float(op.float(a as f64, b)),
        (Value::Float(a), Value::Integer(b)) => Value::Float(op.float(a, b as f64)),
        (Value::Float(a), Value::Float(b)) => Value::Float(op.float(a, b)),
        _ => Value::Undefined,
    };
    Ok(())
}

pub fn add(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    binary(m, Op::Add)
}

pub fn sub(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    binary(m, Op::Sub)
}

pub fn mul(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    binary(m, Op::Mul)
}

pub fn div(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    binary(m, Op::Div)
}

/// Integer remainder; any other operand pair is undefined.
pub fn modulo(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    let y = m.pop()?;
    let x = m.top_mut()?;
    *x = match (*x, y) {
        (Value::Integer(a), Value::Integer(b)) => {
            a.checked_rem(b).map_or(Value::Undefined, Value::Integer)
        }
        _ => Value::Undefined,
    };
    Ok(())
}

pub fn type_of(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    let top = m.top_mut()?;
    if !top.is_undefined() {
        *top = Value::Type(top.kind());
    }
    Ok(())
}

pub fn as_integer(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    let top = m.top_mut()?;
    *top = match *top {
        Value::Integer(v) => Value::Integer(v),
        Value::Float(v) => Value::Integer((v + 0.5) as i64),
        Value::Str(s) | Value::String(s) => {
            scan_integer(s).map_or(Value::Undefined, |(v, _)| Value::Integer(v))
        }
        _ => Value::Undefined,
    };
    Ok(())
}

pub fn as_float(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    let top = m.top_mut()?;
    *top = match *top {
        Value::Float(v) => Value::Float(v),
        Value::Integer(v) => Value::Float(v as f64),
        Value::Str(s) | Value::String(s) => {
            scan_float(s).map_or(Value::Undefined, |(v, _)| Value::Float(v))
        }
        _ => Value::Undefined,
    };
    Ok(())
}

pub fn print(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    let value = m.pop()?;
    let text = display_value(m.session, &value);
    m.session.emit(text);
    Ok(())
}

/// Printed form of a value.
pub fn display_value(session: &Session<'_>, value: &Value<'_>) -> String {
    match *value {
        Value::Undefined => ValueKind::Undefined.name().to_string(),
        Value::Ptr(p) => format!("0x{:x}", p),
        Value::Str(s) => s.to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Float(v) => format!("{:.6}", v),
        Value::String(s) => format!("\"{}\"", s),
        Value::Symbol(id) => session.symbol(id).name.to_string(),
        Value::Type(kind) => kind.name().to_string(),
    }
}
