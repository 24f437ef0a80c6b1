//! Built-in functions, registered into the global scope at startup.
//!
//! Numeric built-ins accept any number and work in `f64`; the handful that
//! answer integers (`INT`, `FIX`, `SGN`, `ASC`, `LEN`, `VAL` on dot-less
//! text) return `Int` values. String built-ins operate on characters, with
//! `MID$` taking a 0-based start position.

use rand::Rng;

use basic_diagnostic::{wanted_value, wrong_arg_count, DiagResult};
use basic_ir::SharedInterner;

use crate::environment::Environment;
use crate::operators::{as_number, Num};
use crate::value::{NativeFn, Value};

fn expect_arity(name: &'static str, wanted: usize, args: &[Value]) -> DiagResult<()> {
    if args.len() == wanted {
        Ok(())
    } else {
        Err(wrong_arg_count(name, wanted, args.len()))
    }
}

fn arg_f64(args: &[Value], i: usize) -> DiagResult<f64> {
    Ok(as_number(&args[i])?.as_f64())
}

fn arg_i64(args: &[Value], i: usize) -> DiagResult<i64> {
    match as_number(&args[i])? {
        Num::Int(n) => Ok(n),
        Num::Float(_) => Err(wanted_value("integer", "float")),
    }
}

fn arg_str<'a>(args: &'a [Value], i: usize) -> DiagResult<&'a str> {
    args[i]
        .as_str()
        .ok_or_else(|| wanted_value("string", args[i].type_name()))
}

// Numeric built-ins

fn native_pi(args: &[Value]) -> DiagResult<Value> {
    expect_arity("PI", 0, args)?;
    Ok(Value::Float(std::f64::consts::PI))
}

macro_rules! float_native {
    ($fn_name:ident, $basic_name:literal, $op:expr) => {
        fn $fn_name(args: &[Value]) -> DiagResult<Value> {
            expect_arity($basic_name, 1, args)?;
            let x = arg_f64(args, 0)?;
            let y: f64 = ($op)(x);
            Ok(Value::Float(y))
        }
    };
}

float_native!(native_sin, "SIN", f64::sin);
float_native!(native_cos, "COS", f64::cos);
float_native!(native_tan, "TAN", f64::tan);
float_native!(native_asn, "ASN", f64::asin);
float_native!(native_acs, "ACS", f64::acos);
float_native!(native_atn, "ATN", f64::atan);
float_native!(native_sinh, "HYPSIN", f64::sinh);
float_native!(native_cosh, "HYPCOS", f64::cosh);
float_native!(native_tanh, "HYPTAN", f64::tanh);
float_native!(native_asinh, "HYPASN", f64::asinh);
float_native!(native_acosh, "HYPACS", f64::acosh);
float_native!(native_atanh, "HYPATN", f64::atanh);
float_native!(native_exp, "EXP", f64::exp);
float_native!(native_log, "LOG", f64::ln);
float_native!(native_abs, "ABS", f64::abs);
float_native!(native_sqr, "SQR", f64::sqrt);
float_native!(native_cur, "CUR", f64::cbrt);
float_native!(native_round, "ROUND", f64::round);
float_native!(native_frac, "FRAC", f64::fract);

#[allow(
    clippy::cast_possible_truncation,
    reason = "floor/trunc results are integral by construction"
)]
fn native_int(args: &[Value]) -> DiagResult<Value> {
    expect_arity("INT", 1, args)?;
    Ok(Value::Int(arg_f64(args, 0)?.floor() as i64))
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "floor/trunc results are integral by construction"
)]
fn native_fix(args: &[Value]) -> DiagResult<Value> {
    expect_arity("FIX", 1, args)?;
    Ok(Value::Int(arg_f64(args, 0)?.trunc() as i64))
}

fn native_sgn(args: &[Value]) -> DiagResult<Value> {
    expect_arity("SGN", 1, args)?;
    let x = arg_f64(args, 0)?;
    Ok(Value::Int(if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }))
}

fn native_rnd(args: &[Value]) -> DiagResult<Value> {
    // Argument, if any, is ignored, as is traditional for RND.
    let _ = args;
    Ok(Value::Float(rand::thread_rng().gen::<f64>()))
}

// String built-ins

fn native_chr(args: &[Value]) -> DiagResult<Value> {
    expect_arity("CHR$", 1, args)?;
    let code = arg_i64(args, 0)?;
    if !(0..=255).contains(&code) {
        return Err(wanted_value("character code 0..=255", "out-of-range integer"));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "checked range")]
    let byte = code as u8;
    Ok(Value::string(char::from(byte).to_string()))
}

fn native_asc(args: &[Value]) -> DiagResult<Value> {
    expect_arity("ASC", 1, args)?;
    let s = arg_str(args, 0)?;
    match s.bytes().next() {
        Some(b) => Ok(Value::Int(i64::from(b))),
        None => Err(wanted_value("non-empty string", "empty string")),
    }
}

fn native_val(args: &[Value]) -> DiagResult<Value> {
    expect_arity("VAL", 1, args)?;
    let s = arg_str(args, 0)?.trim();
    if s.contains('.') {
        Ok(Value::Float(s.parse().unwrap_or(0.0)))
    } else {
        Ok(Value::Int(s.parse().unwrap_or(0)))
    }
}

fn native_str(args: &[Value]) -> DiagResult<Value> {
    expect_arity("STR$", 1, args)?;
    let rendered = match as_number(&args[0])? {
        Num::Int(n) => n.to_string(),
        Num::Float(f) => f.to_string(),
    };
    Ok(Value::string(rendered))
}

#[allow(clippy::cast_possible_wrap, reason = "string lengths stay far below i64::MAX")]
fn native_len(args: &[Value]) -> DiagResult<Value> {
    expect_arity("LEN", 1, args)?;
    Ok(Value::Int(arg_str(args, 0)?.len() as i64))
}

#[allow(clippy::cast_sign_loss, reason = "negative counts produce the empty string")]
fn native_spc(args: &[Value]) -> DiagResult<Value> {
    expect_arity("SPC", 1, args)?;
    let n = arg_i64(args, 0)?;
    Ok(Value::string(" ".repeat(n.max(0) as usize)))
}

#[allow(clippy::cast_sign_loss, reason = "negative widths handled before the cast")]
fn native_left(args: &[Value]) -> DiagResult<Value> {
    expect_arity("LEFT$", 2, args)?;
    let s = arg_str(args, 0)?;
    let w = arg_i64(args, 1)?;
    if w <= 0 {
        return Ok(Value::string(""));
    }
    Ok(Value::string(s.chars().take(w as usize).collect::<String>()))
}

#[allow(clippy::cast_sign_loss, reason = "negative widths handled before the cast")]
fn native_right(args: &[Value]) -> DiagResult<Value> {
    expect_arity("RIGHT$", 2, args)?;
    let s = arg_str(args, 0)?;
    let w = arg_i64(args, 1)?;
    if w <= 0 {
        return Ok(Value::string(""));
    }
    let len = s.chars().count();
    let skip = len.saturating_sub(w as usize);
    Ok(Value::string(s.chars().skip(skip).collect::<String>()))
}

/// `MID$(s, pos)` or `MID$(s, pos, width)` -- `pos` is 0-based; an
/// out-of-range start yields the empty string.
#[allow(clippy::cast_sign_loss, reason = "negative positions handled before the cast")]
fn native_mid(args: &[Value]) -> DiagResult<Value> {
    if args.len() != 2 && args.len() != 3 {
        return Err(wrong_arg_count("MID$", 2, args.len()));
    }
    let s = arg_str(args, 0)?;
    let pos = arg_i64(args, 1)?;
    let len = s.chars().count();
    if pos < 0 || pos as usize >= len {
        return Ok(Value::string(""));
    }
    let width = if args.len() == 3 {
        let w = arg_i64(args, 2)?;
        if w < 0 {
            return Err(wanted_value("non-negative width", "negative integer"));
        }
        w as usize
    } else {
        len
    };
    Ok(Value::string(
        s.chars().skip(pos as usize).take(width).collect::<String>(),
    ))
}

/// Register every built-in into the global scope.
pub fn install(env: &mut Environment, interner: &SharedInterner) {
    let natives: &[(&'static str, NativeFn)] = &[
        // Trig
        ("SIN", native_sin),
        ("COS", native_cos),
        ("TAN", native_tan),
        ("ASN", native_asn),
        ("ACS", native_acs),
        ("ATN", native_atn),
        ("PI", native_pi),
        ("HYPSIN", native_sinh),
        ("HYPCOS", native_cosh),
        ("HYPTAN", native_tanh),
        ("HYPASN", native_asinh),
        ("HYPACS", native_acosh),
        ("HYPATN", native_atanh),
        // General numeric
        ("EXP", native_exp),
        ("LOG", native_log),
        ("ABS", native_abs),
        ("INT", native_int),
        ("SQR", native_sqr),
        ("CUR", native_cur),
        ("SGN", native_sgn),
        ("ROUND", native_round),
        ("FRAC", native_frac),
        ("FIX", native_fix),
        ("RAN#", native_rnd),
        ("RND", native_rnd),
        // Strings
        ("RIGHT$", native_right),
        ("LEFT$", native_left),
        ("CHR$", native_chr),
        ("STR$", native_str),
        ("MID$", native_mid),
        ("ASC", native_asc),
        ("VAL", native_val),
        ("LEN", native_len),
        ("SPC", native_spc),
    ];
    for &(name, func) in natives {
        env.define_global(interner.intern(name), Value::Native(func, name));
    }
    tracing::debug!(count = natives.len(), "installed built-ins");
}
