use crate::parse_source;
use basic_ir::{Expr, OnKind, PrintItem, Program, SharedInterner, Stmt, Target};
use pretty_assertions::assert_eq;

fn parse(source: &str) -> (Program, SharedInterner) {
    let interner = SharedInterner::new();
    match parse_source(source, &interner) {
        Ok(program) => (program, interner),
        Err(d) => panic!("parse failed: {d}"),
    }
}

fn first_stmt(program: &Program) -> &Stmt {
    match program.lines.first().and_then(|l| l.stmts.first()) {
        Some(stmt) => stmt,
        None => panic!("program has no statements"),
    }
}

#[test]
fn lines_sort_by_number() {
    let (program, _) = parse("30 END\n10 PRINT \"A\"\n20 PRINT \"B\"");
    let numbers: Vec<_> = program.lines.iter().map(|l| l.number).collect();
    assert_eq!(numbers, vec![Some(10), Some(20), Some(30)]);
}

#[test]
fn duplicate_line_number_last_wins() {
    let (program, interner) = parse("10 PRINT \"OLD\"\n10 PRINT \"NEW\"");
    assert_eq!(program.lines.len(), 1);
    assert_eq!(
        program.lines[0].to_source(&interner),
        "10 PRINT \"NEW\""
    );
}

#[test]
fn unnumbered_line_keeps_source_order() {
    let (program, _) = parse("10 PRINT \"A\"\nPRINT \"B\"\n20 END");
    let numbers: Vec<_> = program.lines.iter().map(|l| l.number).collect();
    assert_eq!(numbers, vec![Some(10), None, Some(20)]);
}

#[test]
fn colon_separates_statements() {
    let (program, _) = parse("10 PRINT \"A\" : PRINT \"B\" : END");
    assert_eq!(program.lines[0].stmts.len(), 3);
}

#[test]
fn assignment_with_and_without_let() {
    let (program, _) = parse("10 LET X = 1\n20 Y = 2");
    assert!(matches!(
        program.lines[0].stmts[0],
        Stmt::Let {
            target: Target::Scalar { .. },
            ..
        }
    ));
    assert!(matches!(program.lines[1].stmts[0], Stmt::Let { .. }));
}

#[test]
fn let_requires_an_assignment() {
    let interner = SharedInterner::new();
    assert!(parse_source("10 LET PRINT", &interner).is_err());
    assert!(parse_source("10 LET F(1)", &interner).is_err());
}

#[test]
fn element_assignment_target() {
    let (program, _) = parse("10 A(1,2) = 7");
    match first_stmt(&program) {
        Stmt::Let {
            target: Target::Element { indices, .. },
            ..
        } => assert_eq!(indices.len(), 2),
        other => panic!("expected element assignment, got {other:?}"),
    }
}

#[test]
fn bare_call_is_an_effect_statement() {
    let (program, _) = parse("10 SHOW(1)");
    assert!(matches!(first_stmt(&program), Stmt::Call { .. }));
}

#[test]
fn precedence_mul_over_add() {
    let (program, interner) = parse("10 X = 1+2*3");
    match first_stmt(&program) {
        Stmt::Let { value, .. } => assert_eq!(value.to_source(&interner), "(1 + (2 * 3))"),
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn power_is_right_associative() {
    let (program, interner) = parse("10 X = 2^3^2");
    match first_stmt(&program) {
        Stmt::Let { value, .. } => assert_eq!(value.to_source(&interner), "(2 ^ (3 ^ 2))"),
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn boolean_ladder_binds_loosest() {
    let (program, interner) = parse("10 X = 1 < 2 AND NOT 0 OR 3 = 4");
    match first_stmt(&program) {
        Stmt::Let { value, .. } => assert_eq!(
            value.to_source(&interner),
            "(((1 < 2) AND (NOT 0)) OR (3 = 4))"
        ),
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn parenthesized_expression_reenters_boolean_level() {
    let (program, interner) = parse("10 X = (1 OR 0) * 2");
    match first_stmt(&program) {
        Stmt::Let { value, .. } => {
            assert_eq!(value.to_source(&interner), "((1 OR 0) * 2)");
        }
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn if_then_else_with_goto_sugar() {
    let (program, _) = parse("10 IF X > 1 THEN 100 ELSE PRINT \"NO\"");
    match first_stmt(&program) {
        Stmt::If {
            then, otherwise, ..
        } => {
            assert!(matches!(
                **then,
                Stmt::Goto {
                    target: Expr::Int { value: 100, .. },
                    ..
                }
            ));
            assert!(otherwise.is_some());
        }
        other => panic!("expected IF, got {other:?}"),
    }
}

#[test]
fn for_gets_default_step_one() {
    let (program, _) = parse("10 FOR I = 1 TO 3");
    match first_stmt(&program) {
        Stmt::For { step, .. } => {
            assert!(matches!(step, Expr::Int { value: 1, .. }));
        }
        other => panic!("expected FOR, got {other:?}"),
    }
}

#[test]
fn next_with_and_without_variable() {
    let (program, _) = parse("10 NEXT I\n20 NEXT");
    assert!(matches!(
        program.lines[0].stmts[0],
        Stmt::Next { var: Some(_), .. }
    ));
    assert!(matches!(program.lines[1].stmts[0], Stmt::Next { var: None, .. }));
}

#[test]
fn on_goto_collects_targets() {
    let (program, _) = parse("10 ON X+1 GOSUB 100,200,300");
    match first_stmt(&program) {
        Stmt::On { kind, targets, .. } => {
            assert_eq!(*kind, OnKind::Gosub);
            assert_eq!(targets, &vec![100, 200, 300]);
        }
        other => panic!("expected ON, got {other:?}"),
    }
}

#[test]
fn on_requires_a_jump_keyword() {
    let interner = SharedInterner::new();
    assert!(parse_source("10 ON X PRINT 1", &interner).is_err());
}

#[test]
fn print_items_keep_separators() {
    let (program, _) = parse("10 PRINT \"A\" ; \"B\" , \"C\" ;");
    match first_stmt(&program) {
        Stmt::Print { println, items, .. } => {
            assert!(!println);
            assert_eq!(items.len(), 6);
            assert!(matches!(items[1], PrintItem::Semi));
            assert!(matches!(items[3], PrintItem::Comma));
            assert!(matches!(items[5], PrintItem::Semi));
        }
        other => panic!("expected PRINT, got {other:?}"),
    }
}

#[test]
fn data_and_read() {
    let (program, _) = parse("10 DATA 1,2,3\n20 READ A, B(0), C");
    assert!(matches!(
        program.lines[0].stmts[0],
        Stmt::Data { ref values, .. } if values.len() == 3
    ));
    match &program.lines[1].stmts[0] {
        Stmt::Read { targets, .. } => {
            assert!(matches!(targets[0], Target::Scalar { .. }));
            assert!(matches!(targets[1], Target::Element { .. }));
            assert!(matches!(targets[2], Target::Scalar { .. }));
        }
        other => panic!("expected READ, got {other:?}"),
    }
}

#[test]
fn dim_takes_literal_extents() {
    let (program, _) = parse("10 DIM A(2,3,4)");
    match first_stmt(&program) {
        Stmt::Dim { dims, .. } => assert_eq!(dims, &vec![2, 3, 4]),
        other => panic!("expected DIM, got {other:?}"),
    }
}

#[test]
fn def_with_and_without_params() {
    let (program, _) = parse("10 DEF SQ(X) = X*X\n20 DEF K = 42");
    assert!(matches!(
        program.lines[0].stmts[0],
        Stmt::Def { ref params, .. } if params.len() == 1
    ));
    assert!(matches!(
        program.lines[1].stmts[0],
        Stmt::Def { ref params, .. } if params.is_empty()
    ));
}

#[test]
fn rem_and_quote_comments_consume_the_line() {
    let (program, _) = parse("10 REM THIS IS FINE : PRINT 1\n20 ' ALSO FINE");
    // The colon and PRINT belong to the comment, not the compound.
    assert_eq!(program.lines[0].stmts.len(), 1);
    assert!(matches!(program.lines[0].stmts[0], Stmt::Comment { .. }));
    assert!(matches!(program.lines[1].stmts[0], Stmt::Comment { .. }));
}

#[test]
fn input_with_prompt() {
    let (program, interner) = parse("10 INPUT \"NAME\"; N$");
    assert_eq!(
        program.lines[0].to_source(&interner),
        "10 INPUT \"NAME\"; N$"
    );
}

#[test]
fn bad_statement_is_a_syntax_error() {
    let interner = SharedInterner::new();
    let err = match parse_source("10 THEN", &interner) {
        Err(d) => d,
        Ok(_) => panic!("expected a syntax error"),
    };
    assert_eq!(err.kind, basic_diagnostic::ErrorKind::Syntax);
}

#[test]
fn printed_program_reparses_to_the_same_printed_form() {
    let sources = [
        "10 PRINT \"HI\"",
        "10 FOR I = 1 TO 3\n20 PRINT I ;\n30 NEXT I\n40 PRINTLN",
        "10 DATA 1,2,3\n20 READ A,B,C\n30 PRINTLN A+B+C",
        "10 DIM A(2,2)\n20 A(1,1) = 7\n30 PRINTLN A(1,1)",
        "10 DEF SQ(X) = X*X\n20 PRINTLN SQ(5)",
        "10 IF X > 1 AND Y < 2 THEN 100 ELSE PRINT \"NO\"",
        "10 ON I GOTO 100,200\n100 END\n200 END",
        "5 X = 2^3^2 - -4 MOD 3",
    ];
    for source in sources {
        let (program, interner) = parse(source);
        let printed = program.to_source(&interner);
        let (reparsed, _) = parse(&printed);
        let reprinted = reparsed.to_source(&interner);
        assert_eq!(printed, reprinted, "round-trip failed for {source}");
    }
}
