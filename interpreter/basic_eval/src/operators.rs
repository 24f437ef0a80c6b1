//! Numeric and string operator semantics.
//!
//! Arithmetic works on the [`Num`] pair view: an operation on two integers
//! stays integral (including `/`), anything else promotes to float. `+` on
//! two strings concatenates; `=` and `<>` compare strings byte-wise; every
//! other operator/operand combination is an error.

use basic_diagnostic::{division_by_zero, semantic, wanted_value, DiagResult};
use basic_ir::{BinOp, RelOp};

use crate::value::Value;

/// A numeric value, stripped to its two machine shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    /// Widen to `f64`.
    #[allow(
        clippy::cast_precision_loss,
        reason = "the dialect inherits f64 widening for large integers"
    )]
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(f) => f,
        }
    }

    /// True for integer 0 and float 0.0.
    #[inline]
    pub fn is_zero(self) -> bool {
        match self {
            Num::Int(n) => n == 0,
            Num::Float(f) => f == 0.0,
        }
    }
}

/// View a value as a number or fail with `BadArg`.
pub fn as_number(value: &Value) -> DiagResult<Num> {
    match value {
        Value::Int(n) => Ok(Num::Int(*n)),
        Value::Float(f) => Ok(Num::Float(*f)),
        other => Err(wanted_value("number", other.type_name())),
    }
}

/// Rewrap a pair-view number as a value.
pub fn number_value(n: Num) -> Value {
    match n {
        Num::Int(v) => Value::Int(v),
        Num::Float(v) => Value::Float(v),
    }
}

/// Apply a binary operator to two evaluated operands.
///
/// Dispatches to [`op_math`] for numeric pairs; `+` on two strings
/// concatenates; everything else is rejected.
pub fn binary(op: BinOp, lhs: &Value, rhs: &Value) -> DiagResult<Value> {
    if let (Some(a), Some(b)) = (lhs.as_str(), rhs.as_str()) {
        if op == BinOp::Add {
            return Ok(Value::string(format!("{a}{b}")));
        }
        return Err(semantic(format!("bad op `{op}` on strings")));
    }
    let l = as_number(lhs)?;
    let r = as_number(rhs)?;
    op_math(l, op, r)
}

/// Numeric arithmetic.
#[allow(
    clippy::cast_possible_truncation,
    reason = "integer `^` truncates its float intermediate, as the dialect specifies"
)]
pub fn op_math(lhs: Num, op: BinOp, rhs: Num) -> DiagResult<Value> {
    use Num::Int;
    let value = match (op, lhs, rhs) {
        (BinOp::IntDiv, Int(a), Int(b)) => {
            if b == 0 {
                return Err(division_by_zero());
            }
            Value::Int(a.wrapping_div(b))
        }
        (BinOp::IntDiv, _, _) => return Err(wanted_value("2 integers for DIV", "float")),

        (BinOp::Add, Int(a), Int(b)) => Value::Int(a.wrapping_add(b)),
        (BinOp::Add, a, b) => Value::Float(a.as_f64() + b.as_f64()),

        (BinOp::Sub, Int(a), Int(b)) => Value::Int(a.wrapping_sub(b)),
        (BinOp::Sub, a, b) => Value::Float(a.as_f64() - b.as_f64()),

        (BinOp::Mul, Int(a), Int(b)) => Value::Int(a.wrapping_mul(b)),
        (BinOp::Mul, a, b) => Value::Float(a.as_f64() * b.as_f64()),

        (BinOp::Div, _, b) if b.is_zero() => return Err(division_by_zero()),
        // Two integers divide integrally, like DIV.
        (BinOp::Div, Int(a), Int(b)) => Value::Int(a.wrapping_div(b)),
        (BinOp::Div, a, b) => Value::Float(a.as_f64() / b.as_f64()),

        (BinOp::Rem, _, b) if b.is_zero() => return Err(division_by_zero()),
        (BinOp::Rem, Int(a), Int(b)) => Value::Int(a.wrapping_rem(b)),
        (BinOp::Rem, a, b) => Value::Float(a.as_f64() % b.as_f64()),

        // Integer exponentiation goes through float `powf` and truncates
        // back, so negative exponents behave like the original.
        (BinOp::Pow, a @ Num::Int(_), b @ Num::Int(_)) => {
            Value::Int(a.as_f64().powf(b.as_f64()) as i64)
        }
        (BinOp::Pow, a, b) => Value::Float(a.as_f64().powf(b.as_f64())),
    };
    Ok(value)
}

/// Relational comparison, returning integer 1 or 0.
pub fn compare(op: RelOp, lhs: &Value, rhs: &Value) -> DiagResult<Value> {
    if let (Some(a), Some(b)) = (lhs.as_str(), rhs.as_str()) {
        let truth = match op {
            RelOp::Eq => a == b,
            RelOp::Ne => a != b,
            _ => return Err(semantic(format!("bad op `{op}` on strings"))),
        };
        return Ok(Value::Int(i64::from(truth)));
    }

    let l = as_number(lhs)?;
    let r = as_number(rhs)?;
    let truth = match (op, l, r) {
        (RelOp::Eq, Num::Int(a), Num::Int(b)) => a == b,
        (RelOp::Eq, a, b) => a.as_f64() == b.as_f64(),
        (RelOp::Ne, Num::Int(a), Num::Int(b)) => a != b,
        (RelOp::Ne, a, b) => a.as_f64() != b.as_f64(),
        (RelOp::Lt, Num::Int(a), Num::Int(b)) => a < b,
        (RelOp::Lt, a, b) => a.as_f64() < b.as_f64(),
        (RelOp::Gt, Num::Int(a), Num::Int(b)) => a > b,
        (RelOp::Gt, a, b) => a.as_f64() > b.as_f64(),
        (RelOp::Le, Num::Int(a), Num::Int(b)) => a <= b,
        (RelOp::Le, a, b) => a.as_f64() <= b.as_f64(),
        (RelOp::Ge, Num::Int(a), Num::Int(b)) => a >= b,
        (RelOp::Ge, a, b) => a.as_f64() >= b.as_f64(),
    };
    Ok(Value::Int(i64::from(truth)))
}
