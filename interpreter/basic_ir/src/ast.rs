//! Abstract syntax tree.
//!
//! The parser produces one [`Program`]: numbered lines in execution order,
//! each a colon-separated compound of statements. A statement's place in the
//! program -- its line index (`pc`) and its offset within the compound -- is
//! positional: the analyzer and evaluator carry `(pc, offset)` while walking
//! instead of reading back-pointers out of every node.
//!
//! The tree prints back to re-parseable source via [`Program::to_source`],
//! equivalent to the original modulo whitespace and the always-printed
//! `STEP` clause.

use std::fmt;

use crate::{Name, SharedInterner, SourcePos};

/// Unary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    /// Unary `+` (numeric identity, still type-checked).
    Pos,
    /// Unary `-`.
    Neg,
}

/// Arithmetic binary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    /// `/` -- integer division when both operands are integers.
    Div,
    /// `DIV` -- integer-only division.
    IntDiv,
    /// `MOD`.
    Rem,
    /// `^`, right-associative.
    Pow,
}

/// Relational operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

/// Operator joining terms of an OR-level chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrOp {
    Or,
    Xor,
}

/// Which jump an `ON` statement performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnKind {
    Goto,
    Gosub,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnOp::Pos => "+",
            UnOp::Neg => "-",
        })
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::IntDiv => "DIV",
            BinOp::Rem => "MOD",
            BinOp::Pow => "^",
        })
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelOp::Eq => "=",
            RelOp::Ne => "<>",
            RelOp::Lt => "<",
            RelOp::Gt => ">",
            RelOp::Le => "<=",
            RelOp::Ge => ">=",
        })
    }
}

impl fmt::Display for OrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrOp::Or => "OR",
            OrOp::Xor => "XOR",
        })
    }
}

/// An expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Int {
        value: i64,
        pos: SourcePos,
    },
    Float {
        value: f64,
        pos: SourcePos,
    },
    Str {
        value: Name,
        pos: SourcePos,
    },
    Var {
        name: Name,
        pos: SourcePos,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        pos: SourcePos,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        pos: SourcePos,
    },
    Relation {
        op: RelOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        pos: SourcePos,
    },
    /// Logical NOT: zero becomes one, anything else zero.
    Not {
        operand: Box<Expr>,
        pos: SourcePos,
    },
    /// `AND` chain with at least two terms; short-circuits on the first zero.
    And {
        terms: Vec<Expr>,
        pos: SourcePos,
    },
    /// `OR`/`XOR` chain with at least one operator.
    Or {
        first: Box<Expr>,
        rest: Vec<(OrOp, Expr)>,
        pos: SourcePos,
    },
    /// `name(args...)` -- a native call, user-function call, or array read;
    /// which one is decided by what `name` resolves to at run time.
    /// `subscript` records that the parse site used the indexing form
    /// (expression position or an assignment/READ target).
    Call {
        name: Name,
        args: Vec<Expr>,
        subscript: bool,
        pos: SourcePos,
    },
}

impl Expr {
    /// Source position of the expression's defining token.
    pub fn pos(&self) -> SourcePos {
        match self {
            Expr::Int { pos, .. }
            | Expr::Float { pos, .. }
            | Expr::Str { pos, .. }
            | Expr::Var { pos, .. }
            | Expr::Unary { pos, .. }
            | Expr::Binary { pos, .. }
            | Expr::Relation { pos, .. }
            | Expr::Not { pos, .. }
            | Expr::And { pos, .. }
            | Expr::Or { pos, .. }
            | Expr::Call { pos, .. } => *pos,
        }
    }

    /// Print as re-parseable source.
    pub fn to_source(&self, interner: &SharedInterner) -> String {
        match self {
            Expr::Int { value, .. } => value.to_string(),
            // Debug formatting keeps the decimal point (`2.0`, not `2`),
            // so the literal re-parses as a float.
            Expr::Float { value, .. } => format!("{value:?}"),
            Expr::Str { value, .. } => format!("\"{}\"", interner.lookup(*value)),
            Expr::Var { name, .. } => interner.lookup(*name).to_string(),
            Expr::Unary { op, operand, .. } => format!("{}{}", op, operand.to_source(interner)),
            Expr::Binary { op, lhs, rhs, .. } => format!(
                "({} {} {})",
                lhs.to_source(interner),
                op,
                rhs.to_source(interner)
            ),
            Expr::Relation { op, lhs, rhs, .. } => format!(
                "({} {} {})",
                lhs.to_source(interner),
                op,
                rhs.to_source(interner)
            ),
            Expr::Not { operand, .. } => format!("(NOT {})", operand.to_source(interner)),
            Expr::And { terms, .. } => {
                let inner: Vec<_> = terms.iter().map(|t| t.to_source(interner)).collect();
                format!("({})", inner.join(" AND "))
            }
            Expr::Or { first, rest, .. } => {
                let mut buf = first.to_source(interner);
                for (op, term) in rest {
                    buf.push_str(&format!(" {} {}", op, term.to_source(interner)));
                }
                format!("({buf})")
            }
            Expr::Call { name, args, .. } => {
                let inner: Vec<_> = args.iter().map(|a| a.to_source(interner)).collect();
                format!("{}({})", interner.lookup(*name), inner.join(","))
            }
        }
    }
}

/// The left-hand side of an assignment or a READ destination.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    /// A scalar variable.
    Scalar { name: Name, pos: SourcePos },
    /// One cell of a DIMed array.
    Element {
        name: Name,
        indices: Vec<Expr>,
        pos: SourcePos,
    },
}

impl Target {
    /// The variable or array name being stored into.
    pub fn name(&self) -> Name {
        match self {
            Target::Scalar { name, .. } | Target::Element { name, .. } => *name,
        }
    }

    /// Source position of the target.
    pub fn pos(&self) -> SourcePos {
        match self {
            Target::Scalar { pos, .. } | Target::Element { pos, .. } => *pos,
        }
    }

    /// Print as re-parseable source.
    pub fn to_source(&self, interner: &SharedInterner) -> String {
        match self {
            Target::Scalar { name, .. } => interner.lookup(*name).to_string(),
            Target::Element { name, indices, .. } => {
                let inner: Vec<_> = indices.iter().map(|i| i.to_source(interner)).collect();
                format!("{}({})", interner.lookup(*name), inner.join(","))
            }
        }
    }
}

/// One item of a PRINT/PRINTLN list.
#[derive(Clone, Debug, PartialEq)]
pub enum PrintItem {
    Expr(Expr),
    /// `,` -- renders a single space.
    Comma,
    /// `;` -- renders a single space; as the final item it also suppresses
    /// the trailing newline.
    Semi,
}

/// A statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// Assignment, with or without the optional leading `LET`.
    Let {
        target: Target,
        value: Expr,
        pos: SourcePos,
    },
    /// `PRINT`/`PRINTLN` with its item list.
    Print {
        /// True for `PRINTLN`, which always emits a trailing newline.
        println: bool,
        items: Vec<PrintItem>,
        pos: SourcePos,
    },
    /// `INPUT ["prompt";] var`.
    Input {
        prompt: Option<Name>,
        var: Name,
        pos: SourcePos,
    },
    If {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
        pos: SourcePos,
    },
    For {
        var: Name,
        init: Expr,
        term: Expr,
        /// Defaults to integer 1 when no `STEP` clause was written.
        step: Expr,
        pos: SourcePos,
    },
    Next {
        var: Option<Name>,
        pos: SourcePos,
    },
    Goto {
        target: Expr,
        pos: SourcePos,
    },
    Gosub {
        target: Expr,
        pos: SourcePos,
    },
    Return {
        pos: SourcePos,
    },
    /// `ON e GOTO/GOSUB n1,n2,...` -- 1-based selection, fall-through when out
    /// of range.
    On {
        selector: Expr,
        kind: OnKind,
        targets: Vec<i64>,
        pos: SourcePos,
    },
    Read {
        targets: Vec<Target>,
        pos: SourcePos,
    },
    /// `DATA e1,...` -- items are pooled during analysis; a no-op when reached
    /// at run time.
    Data {
        values: Vec<Expr>,
        pos: SourcePos,
    },
    Restore {
        pos: SourcePos,
    },
    /// Parsed for compatibility; a run-time no-op.
    Run {
        pos: SourcePos,
    },
    End {
        pos: SourcePos,
    },
    /// `DEF name[(params)] = expr`.
    Def {
        name: Name,
        params: Vec<Name>,
        body: Expr,
        pos: SourcePos,
    },
    /// `DIM name(s1,...,sk)` with literal extents.
    Dim {
        name: Name,
        dims: Vec<i64>,
        pos: SourcePos,
    },
    /// A bare `name(...)` at statement position, called for effect.
    Call {
        call: Expr,
        pos: SourcePos,
    },
    /// `REM ...` or `' ...`; the body is kept only for printing.
    Comment {
        text: Name,
        pos: SourcePos,
    },
}

impl Stmt {
    /// Source position of the statement's defining token.
    pub fn pos(&self) -> SourcePos {
        match self {
            Stmt::Let { pos, .. }
            | Stmt::Print { pos, .. }
            | Stmt::Input { pos, .. }
            | Stmt::If { pos, .. }
            | Stmt::For { pos, .. }
            | Stmt::Next { pos, .. }
            | Stmt::Goto { pos, .. }
            | Stmt::Gosub { pos, .. }
            | Stmt::Return { pos }
            | Stmt::On { pos, .. }
            | Stmt::Read { pos, .. }
            | Stmt::Data { pos, .. }
            | Stmt::Restore { pos }
            | Stmt::Run { pos }
            | Stmt::End { pos }
            | Stmt::Def { pos, .. }
            | Stmt::Dim { pos, .. }
            | Stmt::Call { pos, .. }
            | Stmt::Comment { pos, .. } => *pos,
        }
    }

    /// Print as re-parseable source.
    pub fn to_source(&self, interner: &SharedInterner) -> String {
        match self {
            Stmt::Let { target, value, .. } => format!(
                "{} = {}",
                target.to_source(interner),
                value.to_source(interner)
            ),
            Stmt::Print { println, items, .. } => {
                let kw = if *println { "PRINTLN" } else { "PRINT" };
                let mut buf = String::from(kw);
                for item in items {
                    match item {
                        PrintItem::Expr(e) => {
                            buf.push(' ');
                            buf.push_str(&e.to_source(interner));
                        }
                        PrintItem::Comma => buf.push_str(" ,"),
                        PrintItem::Semi => buf.push_str(" ;"),
                    }
                }
                buf
            }
            Stmt::Input { prompt, var, .. } => match prompt {
                Some(p) => format!(
                    "INPUT \"{}\"; {}",
                    interner.lookup(*p),
                    interner.lookup(*var)
                ),
                None => format!("INPUT {}", interner.lookup(*var)),
            },
            Stmt::If {
                cond,
                then,
                otherwise,
                ..
            } => {
                let buf = format!(
                    "IF {} THEN {}",
                    cond.to_source(interner),
                    then.to_source(interner)
                );
                match otherwise {
                    Some(e) => format!("{buf} ELSE {}", e.to_source(interner)),
                    None => buf,
                }
            }
            Stmt::For {
                var,
                init,
                term,
                step,
                ..
            } => format!(
                "FOR {} = {} TO {} STEP {}",
                interner.lookup(*var),
                init.to_source(interner),
                term.to_source(interner),
                step.to_source(interner)
            ),
            Stmt::Next { var, .. } => match var {
                Some(v) => format!("NEXT {}", interner.lookup(*v)),
                None => "NEXT".to_string(),
            },
            Stmt::Goto { target, .. } => format!("GOTO {}", target.to_source(interner)),
            Stmt::Gosub { target, .. } => format!("GOSUB {}", target.to_source(interner)),
            Stmt::Return { .. } => "RETURN".to_string(),
            Stmt::On {
                selector,
                kind,
                targets,
                ..
            } => {
                let kw = match kind {
                    OnKind::Goto => "GOTO",
                    OnKind::Gosub => "GOSUB",
                };
                let list: Vec<_> = targets.iter().map(ToString::to_string).collect();
                format!(
                    "ON {} {} {}",
                    selector.to_source(interner),
                    kw,
                    list.join(",")
                )
            }
            Stmt::Read { targets, .. } => {
                let list: Vec<_> = targets.iter().map(|t| t.to_source(interner)).collect();
                format!("READ {}", list.join(", "))
            }
            Stmt::Data { values, .. } => {
                let list: Vec<_> = values.iter().map(|v| v.to_source(interner)).collect();
                format!("DATA {}", list.join(","))
            }
            Stmt::Restore { .. } => "RESTORE".to_string(),
            Stmt::Run { .. } => "RUN".to_string(),
            Stmt::End { .. } => "END".to_string(),
            Stmt::Def {
                name, params, body, ..
            } => {
                let head = if params.is_empty() {
                    interner.lookup(*name).to_string()
                } else {
                    let list: Vec<_> = params.iter().map(|p| interner.lookup(*p)).collect();
                    format!("{}({})", interner.lookup(*name), list.join(","))
                };
                format!("DEF {head} = {}", body.to_source(interner))
            }
            Stmt::Dim { name, dims, .. } => {
                let list: Vec<_> = dims.iter().map(ToString::to_string).collect();
                format!("DIM {}({})", interner.lookup(*name), list.join(","))
            }
            Stmt::Call { call, .. } => call.to_source(interner),
            Stmt::Comment { text, .. } => {
                let body = interner.lookup(*text);
                if body.is_empty() {
                    "REM".to_string()
                } else {
                    format!("REM {body}")
                }
            }
        }
    }
}

/// One program line: an optional BASIC line number and the statements of
/// its colon-separated compound.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    /// `None` for an unnumbered (scratch) line; such a line executes in
    /// source order but no GOTO can reach it.
    pub number: Option<i64>,
    pub stmts: Vec<Stmt>,
}

impl Line {
    /// Print as re-parseable source.
    pub fn to_source(&self, interner: &SharedInterner) -> String {
        let body: Vec<_> = self.stmts.iter().map(|s| s.to_source(interner)).collect();
        match self.number {
            Some(n) => format!("{n} {}", body.join(" : ")),
            None => body.join(" : "),
        }
    }
}

/// A parsed program: lines in execution order (sorted by line number, with
/// unnumbered lines kept immediately after their numbered predecessor).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub lines: Vec<Line>,
}

impl Program {
    /// Print the whole program as re-parseable source.
    pub fn to_source(&self, interner: &SharedInterner) -> String {
        let lines: Vec<_> = self.lines.iter().map(|l| l.to_source(interner)).collect();
        lines.join("\n")
    }
}
