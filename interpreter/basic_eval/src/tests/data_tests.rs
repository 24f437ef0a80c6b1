//! DATA / READ / RESTORE.

use super::{run_err, run_ok};
use basic_diagnostic::ErrorKind;
use pretty_assertions::assert_eq;

#[test]
fn read_sums_pooled_data() {
    let out = run_ok("10 DATA 1,2,3\n20 READ A,B,C\n30 PRINTLN A+B+C");
    assert_eq!(out, "6\n");
}

#[test]
fn data_pools_in_line_order() {
    let out = run_ok("10 DATA 1\n20 DATA 2,3\n30 READ A,B,C\n40 PRINT A;B;C;\n50 PRINTLN");
    assert_eq!(out, "1 2 3 \n");
}

#[test]
fn permuting_data_permutes_reads_identically() {
    let forward = run_ok("10 DATA 1,2\n20 DATA 3\n30 READ A,B,C\n40 PRINTLN A;B;C");
    let permuted = run_ok("10 DATA 3\n20 DATA 1,2\n30 READ A,B,C\n40 PRINTLN A;B;C");
    assert_eq!(forward, "1 2 3\n");
    assert_eq!(permuted, "3 1 2\n");
}

#[test]
fn data_after_the_read_still_counts() {
    // The pool is built during analysis, so execution order is irrelevant.
    let out = run_ok("10 READ A\n20 PRINTLN A\n30 DATA 42");
    assert_eq!(out, "42\n");
}

#[test]
fn data_items_may_be_expressions() {
    let out = run_ok("10 DATA 2+3, -4, \"S\"+\"TR\"\n20 READ A,B,C$\n30 PRINTLN A;B;C$");
    assert_eq!(out, "5 -4 STR\n");
}

#[test]
fn restore_rewinds_the_cursor() {
    let out = run_ok("10 DATA 7,8\n20 READ A\n30 RESTORE\n40 READ B\n50 PRINTLN A;B");
    assert_eq!(out, "7 7\n");
}

#[test]
fn reading_past_the_pool_is_semantic() {
    let d = run_err("10 DATA 1\n20 READ A,B");
    assert_eq!(d.kind, ErrorKind::Semantic);
}

#[test]
fn read_into_array_elements() {
    let out = run_ok("10 DIM A(2)\n20 DATA 5,6\n30 READ A(0), A(1)\n40 PRINTLN A(0)+A(1)");
    assert_eq!(out, "11\n");
}

#[test]
fn read_respects_sigils() {
    let d = run_err("10 DATA \"TEXT\"\n20 READ N%");
    assert_eq!(d.kind, ErrorKind::Syntax);
}

#[test]
fn data_statement_reached_at_runtime_is_inert() {
    let out = run_ok("10 READ A\n20 DATA 1,2\n30 READ B\n40 PRINTLN A;B");
    assert_eq!(out, "1 2\n");
}
