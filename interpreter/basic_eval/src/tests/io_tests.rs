//! PRINT/INPUT semantics, assignment, sigil discipline, arrays.

use super::{run_err, run_ok, run_with_input};
use basic_diagnostic::ErrorKind;
use pretty_assertions::assert_eq;

#[test]
fn print_appends_one_newline() {
    assert_eq!(run_ok("10 PRINT \"HI\""), "HI\n");
}

#[test]
fn trailing_semicolon_holds_the_line_open() {
    let out = run_ok("10 PRINT \"A\";\n20 PRINT \"B\"");
    assert_eq!(out, "A B\n");
}

#[test]
fn separators_render_one_space() {
    assert_eq!(run_ok("10 PRINT 1,2"), "1 2\n");
    assert_eq!(run_ok("10 PRINT 1;2"), "1 2\n");
}

#[test]
fn println_without_items_is_a_blank_line() {
    assert_eq!(run_ok("10 PRINTLN"), "\n");
}

#[test]
fn print_renders_numbers_plainly() {
    assert_eq!(run_ok("10 PRINT 2.5"), "2.5\n");
    assert_eq!(run_ok("10 PRINT 2.0"), "2\n");
    assert_eq!(run_ok("10 PRINT -7"), "-7\n");
}

#[test]
fn assignment_with_let_and_without() {
    let out = run_ok("10 LET A = 2\n20 B = 3\n30 PRINTLN A * B");
    assert_eq!(out, "6\n");
}

#[test]
fn assignment_writes_are_visible_across_lines() {
    let out = run_ok("10 X = 1\n20 X = X + 1\n30 X = X + 1\n40 PRINTLN X");
    assert_eq!(out, "3\n");
}

#[test]
fn input_converts_by_sigil() {
    let out = run_with_input(
        "10 INPUT A$\n20 INPUT N\n30 INPUT X\n40 PRINTLN A$;N;X",
        &["HELLO", "42", "2.5"],
    );
    assert_eq!(out, "HELLO 42 2.5\n");
}

#[test]
fn input_prompt_is_printed_without_newline() {
    let out = run_with_input("10 INPUT \"NAME? \"; A$\n20 PRINTLN A$", &["ADA"]);
    assert_eq!(out, "NAME? ADA\n");
}

#[test]
fn unparsable_numeric_input_reads_zero() {
    let out = run_with_input("10 INPUT N\n20 PRINTLN N", &["garbage"]);
    assert_eq!(out, "0\n");
}

#[test]
fn string_sigil_rejects_numbers() {
    assert_eq!(run_err("10 A$ = 5").kind, ErrorKind::Syntax);
}

#[test]
fn integer_sigil_rejects_floats() {
    assert_eq!(run_err("10 N% = 1.5").kind, ErrorKind::Syntax);
}

#[test]
fn float_sigil_accepts_both_numeric_kinds() {
    assert_eq!(run_ok("10 X# = 1\n20 Y! = 2.5\n30 PRINTLN X# + Y!"), "3.5\n");
}

#[test]
fn bare_name_rejects_strings() {
    assert_eq!(run_err("10 N = \"TEXT\"").kind, ErrorKind::Syntax);
}

#[test]
fn string_variables_round_trip() {
    assert_eq!(run_ok("10 A$ = \"HI\"\n20 PRINTLN A$ + \"!\""), "HI!\n");
}

#[test]
fn dim_element_write_and_read() {
    let out = run_ok("10 DIM A(2,2)\n20 A(1,1)=7\n30 PRINTLN A(1,1)");
    assert_eq!(out, "7\n");
}

#[test]
fn array_cells_start_nil_and_print_empty() {
    assert_eq!(run_ok("10 DIM A(1)\n20 PRINTLN A(0)"), "\n");
}

#[test]
fn array_index_out_of_bounds() {
    assert_eq!(run_err("10 DIM A(2)\n20 A(3) = 1").kind, ErrorKind::IndexOob);
    assert_eq!(run_err("10 DIM A(2)\n20 PRINT A(3)").kind, ErrorKind::IndexOob);
}

#[test]
fn array_rank_mismatch_is_semantic() {
    assert_eq!(
        run_err("10 DIM A(2,2)\n20 PRINT A(1)").kind,
        ErrorKind::Semantic
    );
}

#[test]
fn string_array_respects_its_sigil() {
    let out = run_ok("10 DIM A$(2)\n20 A$(0) = \"X\"\n30 PRINTLN A$(0)");
    assert_eq!(out, "X\n");
    assert_eq!(
        run_err("10 DIM A$(2)\n20 A$(0) = 5").kind,
        ErrorKind::Syntax
    );
}

#[test]
fn scalar_reads_of_arrays_and_calls_of_scalars_fail() {
    assert_eq!(run_err("10 X = 1\n20 PRINT X(0)").kind, ErrorKind::BadArg);
}
