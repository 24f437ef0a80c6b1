//! Built-ins and user functions exercised from programs.

use super::{run_err, run_ok};
use basic_diagnostic::ErrorKind;
use pretty_assertions::assert_eq;

fn eval(expr: &str) -> String {
    run_ok(&format!("10 PRINTLN {expr}"))
}

#[test]
fn def_and_call() {
    assert_eq!(run_ok("10 DEF SQ(X) = X*X\n20 PRINTLN SQ(5)"), "25\n");
}

#[test]
fn def_without_params() {
    assert_eq!(run_ok("10 DEF K = 41 + 1\n20 PRINTLN K()"), "42\n");
}

#[test]
fn def_with_two_params() {
    assert_eq!(
        run_ok("10 DEF AVG(A,B) = (A+B)/2\n20 PRINTLN AVG(4,8)"),
        "6\n"
    );
}

#[test]
fn user_function_sees_globals() {
    assert_eq!(
        run_ok("10 DEF SCALE(X) = X * F\n20 F = 10\n30 PRINTLN SCALE(3)"),
        "30\n"
    );
}

#[test]
fn user_function_params_do_not_leak() {
    let d = run_err("10 DEF SQ(P) = P*P\n20 X = SQ(3)\n30 PRINT P");
    assert_eq!(d.kind, ErrorKind::NoSuchVar);
}

#[test]
fn wrong_arity_is_bad_arity() {
    assert_eq!(
        run_err("10 DEF SQ(X) = X*X\n20 PRINT SQ(1,2)").kind,
        ErrorKind::BadArity
    );
    assert_eq!(run_err("10 PRINT SIN(1,2)").kind, ErrorKind::BadArity);
}

#[test]
fn unknown_function_is_no_such_var() {
    assert_eq!(run_err("10 PRINT NOPE(1)").kind, ErrorKind::NoSuchVar);
}

#[test]
fn numeric_builtins() {
    assert_eq!(eval("INT(2.7)"), "2\n");
    assert_eq!(eval("INT(-2.5)"), "-3\n");
    assert_eq!(eval("FIX(-2.5)"), "-2\n");
    assert_eq!(eval("ABS(-3)"), "3\n");
    assert_eq!(eval("SGN(-9)"), "-1\n");
    assert_eq!(eval("SQR(9)"), "3\n");
    assert_eq!(eval("CUR(27)"), "3\n");
    assert_eq!(eval("ROUND(2.4)"), "2\n");
    assert_eq!(eval("FRAC(2.5)"), "0.5\n");
    assert_eq!(eval("EXP(0)"), "1\n");
    assert_eq!(eval("LOG(1)"), "0\n");
}

#[test]
fn trig_builtins() {
    assert_eq!(eval("SIN(0)"), "0\n");
    assert_eq!(eval("COS(0)"), "1\n");
    assert_eq!(eval("TAN(0)"), "0\n");
    assert_eq!(eval("ATN(0)"), "0\n");
    assert_eq!(eval("HYPSIN(0)"), "0\n");
    assert_eq!(eval("HYPCOS(0)"), "1\n");
}

#[test]
fn pi_is_a_zero_arg_function() {
    let out = run_ok("10 PRINTLN INT(PI() * 100)");
    assert_eq!(out, "314\n");
}

#[test]
fn string_builtins() {
    assert_eq!(eval("LEFT$(\"HELLO\", 2)"), "HE\n");
    assert_eq!(eval("RIGHT$(\"HELLO\", 3)"), "LLO\n");
    assert_eq!(eval("MID$(\"HELLO\", 1, 3)"), "ELL\n");
    assert_eq!(eval("MID$(\"HELLO\", 1)"), "ELLO\n");
    assert_eq!(eval("CHR$(66)"), "B\n");
    assert_eq!(eval("ASC(\"B\")"), "66\n");
    assert_eq!(eval("LEN(\"ABC\")"), "3\n");
    assert_eq!(eval("VAL(\"12\") + 1"), "13\n");
    assert_eq!(eval("VAL(\"1.5\")"), "1.5\n");
    assert_eq!(eval("STR$(42) + \"!\""), "42!\n");
    assert_eq!(eval("SPC(3) + \"X\""), "   X\n");
}

#[test]
fn builtins_reject_wrong_kinds() {
    assert_eq!(run_err("10 PRINT LEN(5)").kind, ErrorKind::BadArg);
    assert_eq!(run_err("10 PRINT ASC(\"\")").kind, ErrorKind::BadArg);
    assert_eq!(run_err("10 PRINT CHR$(300)").kind, ErrorKind::BadArg);
    assert_eq!(run_err("10 PRINT SIN(\"X\")").kind, ErrorKind::BadArg);
}

#[test]
fn rnd_stays_in_the_unit_interval() {
    let out = run_ok(
        "10 FOR I=1 TO 20\n20 X = RND()\n30 IF X < 0 OR X >= 1 THEN PRINT \"OUT\"\n40 NEXT I\n50 PRINT \"OK\"",
    );
    assert_eq!(out, "OK\n");
}

#[test]
fn user_function_calls_can_nest() {
    let out = run_ok("10 DEF SQ(X) = X*X\n20 DEF Q(X) = SQ(SQ(X))\n30 PRINTLN Q(2)");
    assert_eq!(out, "16\n");
}
