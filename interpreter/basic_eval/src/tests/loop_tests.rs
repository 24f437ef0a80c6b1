//! FOR/NEXT semantics.

use super::{run_err, run_ok};
use basic_diagnostic::ErrorKind;
use pretty_assertions::assert_eq;

#[test]
fn counting_loop_with_semicolons() {
    let out = run_ok("10 FOR I=1 TO 3\n20 PRINT I;\n30 NEXT I\n40 PRINTLN");
    assert_eq!(out, "1 2 3 \n");
}

#[test]
fn loop_body_sees_the_counter() {
    let out = run_ok("10 FOR I=1 TO 3\n20 PRINT I\n30 NEXT I");
    assert_eq!(out, "1\n2\n3\n");
}

#[test]
fn step_two_skips_values() {
    let out = run_ok("10 FOR I=1 TO 7 STEP 2\n20 PRINT I;\n30 NEXT\n40 PRINTLN");
    assert_eq!(out, "1 3 5 7 \n");
}

#[test]
fn negative_step_counts_down() {
    let out = run_ok("10 FOR I=3 TO 1 STEP -1\n20 PRINT I;\n30 NEXT I\n40 PRINTLN");
    assert_eq!(out, "3 2 1 \n");
}

#[test]
fn empty_range_skips_the_body() {
    let out = run_ok("10 FOR I=5 TO 1\n20 PRINT \"BODY\"\n30 NEXT I\n40 PRINT \"DONE\"");
    assert_eq!(out, "DONE\n");
}

#[test]
fn counter_remains_defined_after_the_loop() {
    let out = run_ok("10 FOR I=1 TO 3\n20 NEXT I\n30 PRINT I");
    assert_eq!(out, "4\n");
}

#[test]
fn whole_loop_on_one_line() {
    let out = run_ok("10 FOR I=1 TO 3 : PRINT I; : NEXT I\n20 PRINTLN");
    assert_eq!(out, "1 2 3 \n");
}

#[test]
fn nested_loops() {
    let out = run_ok(
        "10 FOR I=1 TO 2\n20 FOR J=1 TO 2\n30 PRINT I*10+J;\n40 NEXT J\n50 NEXT I\n60 PRINTLN",
    );
    assert_eq!(out, "11 12 21 22 \n");
}

#[test]
fn float_counter_keeps_floating() {
    let out = run_ok("10 FOR X=0.5 TO 1.5 STEP 0.5\n20 PRINT X;\n30 NEXT X\n40 PRINTLN");
    assert_eq!(out, "0.5 1 1.5 \n");
}

#[test]
fn integer_counter_stays_integral() {
    let out = run_ok("10 FOR I=1 TO 2\n20 NEXT I\n30 PRINT I+0");
    assert_eq!(out, "3\n");
}

#[test]
fn zero_step_exits_immediately() {
    let out = run_ok("10 FOR I=1 TO 3 STEP 0\n20 PRINT \"BODY\"\n30 NEXT I\n40 PRINT \"OUT\"");
    assert_eq!(out, "OUT\n");
}

#[test]
fn loop_reruns_after_goto_restart() {
    // Leaving a finished loop clears its cached start value, so reaching
    // the FOR again restarts the iteration.
    let out = run_ok(
        "5 R = 0\n10 R = R + 1\n20 FOR I=1 TO 2\n30 PRINT I;\n40 NEXT I\n50 IF R < 2 THEN 10\n60 PRINTLN",
    );
    assert_eq!(out, "1 2 1 2 \n");
}

#[test]
fn terminal_is_reevaluated_each_iteration() {
    let out = run_ok("10 N = 3\n20 FOR I=1 TO N\n30 N = 2\n40 PRINT I;\n50 NEXT I\n60 PRINTLN");
    assert_eq!(out, "1 2 \n");
}

#[test]
fn unmatched_for_is_semantic() {
    let d = run_err("10 FOR I=1 TO 3\n20 PRINT I");
    assert_eq!(d.kind, ErrorKind::Semantic);
}

#[test]
fn next_without_for_is_semantic() {
    let d = run_err("10 NEXT I");
    assert_eq!(d.kind, ErrorKind::Semantic);
}

#[test]
fn mismatched_next_variable_is_semantic() {
    let d = run_err("10 FOR I=1 TO 3\n20 NEXT J");
    assert_eq!(d.kind, ErrorKind::Semantic);
}

#[test]
fn reused_counter_in_a_nest_is_semantic() {
    let d = run_err("10 FOR I=1 TO 3\n20 FOR I=1 TO 2\n30 NEXT I\n40 NEXT I");
    assert_eq!(d.kind, ErrorKind::Semantic);
}
