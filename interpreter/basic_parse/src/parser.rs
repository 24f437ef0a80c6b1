//! The recursive-descent parser.
//!
//! One token of lookahead over a streaming [`Lexer`]. A program is a
//! sequence of lines, each `[INT]? statements? EOL?`; statements within a
//! line are separated by `:`. Numbered lines are ordered by their number
//! (last occurrence of a duplicate wins); an unnumbered line keeps its
//! source position, ordered right after the most recent numbered line, and
//! cannot be reached by GOTO.
//!
//! The expression grammar, loosest to tightest:
//!
//! ```text
//! b_expr   := b_term (OR|XOR b_term)*
//! b_term   := not_factor (AND not_factor)*
//! not_factor := [NOT] relation
//! relation := expr ((= <> < > <= >=) expr)*
//! expr     := term ((+ -) term)*
//! term     := power ((* / DIV MOD) power)*
//! power    := factor (^ power)?          -- right-associative
//! factor   := (+|-) factor | literal | variable | call | ( b_expr )
//! ```

use std::collections::BTreeMap;

use basic_diagnostic::{syntax_at, unexpected_token, DiagResult};
use basic_ir::{
    Expr, Line, Name, OnKind, OrOp, PrintItem, Program, RelOp, SharedInterner, SourcePos, Stmt,
    Target, Token, TokenKind, UnOp,
};
use basic_ir::BinOp;
use basic_lexer::{Lexer, SourceBuffer};

/// Parse a complete source text into a [`Program`].
pub fn parse_source(source: &str, interner: &SharedInterner) -> DiagResult<Program> {
    let buffer = SourceBuffer::new(source);
    let parser = Parser::new(&buffer, interner.clone())?;
    parser.parse()
}

/// The parser: a lexer plus one token of lookahead.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
    interner: SharedInterner,
}

impl<'a> Parser<'a> {
    /// Create a parser, priming the lookahead token.
    pub fn new(buffer: &'a SourceBuffer, interner: SharedInterner) -> DiagResult<Self> {
        let mut lexer = Lexer::new(buffer, interner.clone());
        let cur = lexer.next_token()?;
        Ok(Parser {
            lexer,
            cur,
            interner,
        })
    }

    /// Consume lines until EOF and assemble the program.
    pub fn parse(mut self) -> DiagResult<Program> {
        // Ordering key: (line number, sequence). A numbered line keys at
        // (n, 0) so a duplicate number replaces its predecessor; an
        // unnumbered line keys after the last numbered line it follows.
        let mut keyed: BTreeMap<(i64, usize), Line> = BTreeMap::new();
        let mut last_number: i64 = -1;
        let mut scratch_seq: usize = 1;

        while !self.at(TokenKind::Eof) {
            let Some(line) = self.parse_line()? else {
                continue;
            };
            match line.number {
                Some(n) => {
                    keyed.insert((n, 0), line);
                    last_number = n;
                    scratch_seq = 1;
                }
                None => {
                    keyed.insert((last_number, scratch_seq), line);
                    scratch_seq += 1;
                }
            }
        }

        let lines: Vec<Line> = keyed.into_values().collect();
        tracing::debug!(lines = lines.len(), "parsed program");
        Ok(Program { lines })
    }

    // Token plumbing

    fn bump(&mut self) -> DiagResult<Token> {
        let prev = self.cur;
        self.cur = self.lexer.next_token()?;
        Ok(prev)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> DiagResult<Token> {
        if self.at(kind) {
            self.bump()
        } else {
            Err(unexpected_token(
                kind.describe(),
                self.cur.kind.describe(),
                self.cur.pos,
            ))
        }
    }

    fn expect_ident(&mut self) -> DiagResult<(Name, SourcePos)> {
        match self.cur.kind {
            TokenKind::Ident(name) => {
                let pos = self.cur.pos;
                self.bump()?;
                Ok((name, pos))
            }
            other => Err(unexpected_token("identifier", other.describe(), self.cur.pos)),
        }
    }

    fn expect_int(&mut self) -> DiagResult<(i64, SourcePos)> {
        match self.cur.kind {
            TokenKind::Int(value) => {
                let pos = self.cur.pos;
                self.bump()?;
                Ok((value, pos))
            }
            other => Err(unexpected_token("integer", other.describe(), self.cur.pos)),
        }
    }

    // Lines

    /// Parse one physical line; `None` for a blank one.
    fn parse_line(&mut self) -> DiagResult<Option<Line>> {
        let number = match self.cur.kind {
            TokenKind::Int(n) => {
                self.bump()?;
                Some(n)
            }
            _ => None,
        };

        if self.at(TokenKind::Eof) {
            return Ok(None);
        }
        if self.at(TokenKind::Eol) {
            self.bump()?;
            return Ok(None);
        }

        let stmts = self.compound_statements()?;
        if stmts.is_empty() {
            return Ok(None);
        }
        Ok(Some(Line { number, stmts }))
    }

    fn compound_statements(&mut self) -> DiagResult<Vec<Stmt>> {
        let mut out = Vec::new();
        loop {
            match self.cur.kind {
                TokenKind::Eof => break,
                TokenKind::Eol => {
                    self.bump()?;
                    break;
                }
                TokenKind::Colon => {
                    self.bump()?;
                }
                _ => out.push(self.statement()?),
            }
        }
        Ok(out)
    }

    // Statements

    fn statement(&mut self) -> DiagResult<Stmt> {
        match self.cur.kind {
            TokenKind::Def => self.def(),
            TokenKind::Rem | TokenKind::Quote => self.comment(),
            TokenKind::Input => self.input(),
            TokenKind::If => self.if_then(),
            TokenKind::On => self.on_jump(),
            TokenKind::For => self.for_loop(),
            TokenKind::Next => self.for_next(),
            TokenKind::Print => self.print(false),
            TokenKind::Println => self.print(true),
            TokenKind::Goto => {
                let kw = self.bump()?;
                Ok(Stmt::Goto {
                    target: self.expr()?,
                    pos: kw.pos,
                })
            }
            TokenKind::Gosub => {
                let kw = self.bump()?;
                Ok(Stmt::Gosub {
                    target: self.expr()?,
                    pos: kw.pos,
                })
            }
            TokenKind::Return => {
                let kw = self.bump()?;
                Ok(Stmt::Return { pos: kw.pos })
            }
            TokenKind::End => {
                let kw = self.bump()?;
                Ok(Stmt::End { pos: kw.pos })
            }
            TokenKind::Run => {
                let kw = self.bump()?;
                Ok(Stmt::Run { pos: kw.pos })
            }
            TokenKind::Restore => {
                let kw = self.bump()?;
                Ok(Stmt::Restore { pos: kw.pos })
            }
            TokenKind::Read => self.read(),
            TokenKind::Data => self.data(),
            TokenKind::Dim => self.dim(),
            TokenKind::Let => {
                let kw = self.bump()?;
                if !matches!(self.cur.kind, TokenKind::Ident(_)) {
                    return Err(syntax_at("bad LET statement", kw.pos));
                }
                let stmt = self.ident_statement()?;
                if matches!(stmt, Stmt::Let { .. }) {
                    Ok(stmt)
                } else {
                    Err(syntax_at("bad LET statement", kw.pos))
                }
            }
            TokenKind::Ident(_) => self.ident_statement(),
            other => Err(syntax_at(
                format!("bad statement `{}`", other.describe()),
                self.cur.pos,
            )),
        }
    }

    /// An identifier-led statement: assignment to a scalar or element, or a
    /// call used for effect.
    fn ident_statement(&mut self) -> DiagResult<Stmt> {
        let (name, pos) = self.expect_ident()?;

        if self.at(TokenKind::Eq) {
            self.bump()?;
            let value = self.b_expr()?;
            return Ok(Stmt::Let {
                target: Target::Scalar { name, pos },
                value,
                pos,
            });
        }

        if self.at(TokenKind::LParen) {
            let args = self.call_args()?;
            if self.at(TokenKind::Eq) {
                self.bump()?;
                let value = self.b_expr()?;
                return Ok(Stmt::Let {
                    target: Target::Element {
                        name,
                        indices: args,
                        pos,
                    },
                    value,
                    pos,
                });
            }
            return Ok(Stmt::Call {
                call: Expr::Call {
                    name,
                    args,
                    subscript: false,
                    pos,
                },
                pos,
            });
        }

        Err(syntax_at(
            format!("unexpected identifier `{}`", self.interner.lookup(name)),
            pos,
        ))
    }

    fn comment(&mut self) -> DiagResult<Stmt> {
        let kw = self.bump()?;
        let mut words: Vec<String> = Vec::new();
        while !self.at(TokenKind::Eof) && !self.at(TokenKind::Eol) {
            let tok = self.bump()?;
            words.push(match tok.kind {
                TokenKind::Int(v) => v.to_string(),
                TokenKind::Real(v) => format!("{v:?}"),
                TokenKind::Str(n) => format!("\"{}\"", self.interner.lookup(n)),
                TokenKind::Ident(n) => self.interner.lookup(n).to_string(),
                TokenKind::Rogue(b) => (b as char).to_string(),
                other => other.describe().to_string(),
            });
        }
        let text = self.interner.intern(&words.join(" "));
        Ok(Stmt::Comment { text, pos: kw.pos })
    }

    fn input(&mut self) -> DiagResult<Stmt> {
        let kw = self.bump()?;
        let prompt = match self.cur.kind {
            TokenKind::Str(text) => {
                self.bump()?;
                if self.at(TokenKind::Semi) || self.at(TokenKind::Comma) {
                    self.bump()?;
                } else {
                    return Err(syntax_at("wanted `;` after INPUT prompt", kw.pos));
                }
                Some(text)
            }
            _ => None,
        };
        let (var, _) = self.expect_ident()?;
        Ok(Stmt::Input {
            prompt,
            var,
            pos: kw.pos,
        })
    }

    fn def(&mut self) -> DiagResult<Stmt> {
        let kw = self.bump()?;
        let (name, _) = self.expect_ident()?;
        let mut params = Vec::new();

        if self.at(TokenKind::LParen) {
            self.bump()?;
            if !self.at(TokenKind::RParen) {
                params.push(self.expect_ident()?.0);
                while self.at(TokenKind::Comma) {
                    self.bump()?;
                    params.push(self.expect_ident()?.0);
                }
            }
            self.expect(TokenKind::RParen)?;
        } else if !self.at(TokenKind::Eq) {
            return Err(syntax_at("malformed DEF", kw.pos));
        }

        self.expect(TokenKind::Eq)?;
        let body = self.b_expr()?;
        Ok(Stmt::Def {
            name,
            params,
            body,
            pos: kw.pos,
        })
    }

    fn if_then(&mut self) -> DiagResult<Stmt> {
        let kw = self.bump()?;
        let cond = self.b_expr()?;
        self.expect(TokenKind::Then)?;
        let then = Box::new(self.branch_arm()?);
        let otherwise = if self.at(TokenKind::Else) {
            self.bump()?;
            Some(Box::new(self.branch_arm()?))
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then,
            otherwise,
            pos: kw.pos,
        })
    }

    /// A THEN/ELSE arm: a statement, or a bare integer as GOTO sugar.
    fn branch_arm(&mut self) -> DiagResult<Stmt> {
        if let TokenKind::Int(n) = self.cur.kind {
            let tok = self.bump()?;
            return Ok(Stmt::Goto {
                target: Expr::Int {
                    value: n,
                    pos: tok.pos,
                },
                pos: tok.pos,
            });
        }
        self.statement()
    }

    fn on_jump(&mut self) -> DiagResult<Stmt> {
        let kw = self.bump()?;
        let selector = self.expr()?;
        let kind = match self.cur.kind {
            TokenKind::Goto => OnKind::Goto,
            TokenKind::Gosub => OnKind::Gosub,
            _ => return Err(syntax_at("wanted GOTO/GOSUB after ON", kw.pos)),
        };
        self.bump()?;
        let mut targets = vec![self.expect_int()?.0];
        while self.at(TokenKind::Comma) {
            self.bump()?;
            targets.push(self.expect_int()?.0);
        }
        Ok(Stmt::On {
            selector,
            kind,
            targets,
            pos: kw.pos,
        })
    }

    fn for_loop(&mut self) -> DiagResult<Stmt> {
        let kw = self.bump()?;
        let (var, _) = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;
        let init = self.expr()?;
        self.expect(TokenKind::To)?;
        let term = self.expr()?;
        let step = if self.at(TokenKind::Step) {
            self.bump()?;
            self.expr()?
        } else {
            // STEP defaults to integer 1.
            Expr::Int {
                value: 1,
                pos: kw.pos,
            }
        };
        Ok(Stmt::For {
            var,
            init,
            term,
            step,
            pos: kw.pos,
        })
    }

    fn for_next(&mut self) -> DiagResult<Stmt> {
        let kw = self.bump()?;
        let var = match self.cur.kind {
            TokenKind::Ident(name) => {
                self.bump()?;
                Some(name)
            }
            _ => None,
        };
        Ok(Stmt::Next { var, pos: kw.pos })
    }

    fn print(&mut self, println: bool) -> DiagResult<Stmt> {
        let kw = self.bump()?;
        let mut items = Vec::new();
        loop {
            match self.cur.kind {
                TokenKind::Colon | TokenKind::Eol | TokenKind::Eof => break,
                TokenKind::Semi => {
                    self.bump()?;
                    items.push(PrintItem::Semi);
                }
                TokenKind::Comma => {
                    self.bump()?;
                    items.push(PrintItem::Comma);
                }
                _ => items.push(PrintItem::Expr(self.b_expr()?)),
            }
        }
        Ok(Stmt::Print {
            println,
            items,
            pos: kw.pos,
        })
    }

    fn read(&mut self) -> DiagResult<Stmt> {
        let kw = self.bump()?;
        let mut targets = vec![self.read_target()?];
        while self.at(TokenKind::Comma) {
            self.bump()?;
            targets.push(self.read_target()?);
        }
        Ok(Stmt::Read {
            targets,
            pos: kw.pos,
        })
    }

    fn read_target(&mut self) -> DiagResult<Target> {
        let (name, pos) = self.expect_ident()?;
        if self.at(TokenKind::LParen) {
            let indices = self.call_args()?;
            Ok(Target::Element { name, indices, pos })
        } else {
            Ok(Target::Scalar { name, pos })
        }
    }

    fn data(&mut self) -> DiagResult<Stmt> {
        let kw = self.bump()?;
        let mut values = Vec::new();
        loop {
            match self.cur.kind {
                TokenKind::Eof | TokenKind::Eol | TokenKind::Colon => break,
                _ => {
                    values.push(self.b_expr()?);
                    if self.at(TokenKind::Comma) {
                        self.bump()?;
                    }
                }
            }
        }
        Ok(Stmt::Data {
            values,
            pos: kw.pos,
        })
    }

    fn dim(&mut self) -> DiagResult<Stmt> {
        let kw = self.bump()?;
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let mut dims = Vec::new();
        loop {
            dims.push(self.expect_int()?.0);
            if self.at(TokenKind::RParen) {
                break;
            }
            self.expect(TokenKind::Comma)?;
        }
        self.expect(TokenKind::RParen)?;
        Ok(Stmt::Dim {
            name,
            dims,
            pos: kw.pos,
        })
    }

    // Expressions

    fn b_expr(&mut self) -> DiagResult<Expr> {
        let first = self.b_term()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.cur.kind {
                TokenKind::Or => OrOp::Or,
                TokenKind::Xor => OrOp::Xor,
                _ => break,
            };
            self.bump()?;
            rest.push((op, self.b_term()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            let pos = first.pos();
            Ok(Expr::Or {
                first: Box::new(first),
                rest,
                pos,
            })
        }
    }

    fn b_term(&mut self) -> DiagResult<Expr> {
        let first = self.not_factor()?;
        if !self.at(TokenKind::And) {
            return Ok(first);
        }
        let pos = first.pos();
        let mut terms = vec![first];
        while self.at(TokenKind::And) {
            self.bump()?;
            terms.push(self.not_factor()?);
        }
        Ok(Expr::And { terms, pos })
    }

    fn not_factor(&mut self) -> DiagResult<Expr> {
        if self.at(TokenKind::Not) {
            let kw = self.bump()?;
            let operand = Box::new(self.relation()?);
            return Ok(Expr::Not {
                operand,
                pos: kw.pos,
            });
        }
        self.relation()
    }

    fn relation(&mut self) -> DiagResult<Expr> {
        let mut res = self.expr()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::Eq => RelOp::Eq,
                TokenKind::NotEq => RelOp::Ne,
                TokenKind::Lt => RelOp::Lt,
                TokenKind::Gt => RelOp::Gt,
                TokenKind::LtEq => RelOp::Le,
                TokenKind::GtEq => RelOp::Ge,
                _ => break,
            };
            let tok = self.bump()?;
            let rhs = self.expr()?;
            res = Expr::Relation {
                op,
                lhs: Box::new(res),
                rhs: Box::new(rhs),
                pos: tok.pos,
            };
        }
        Ok(res)
    }

    fn expr(&mut self) -> DiagResult<Expr> {
        let mut res = self.term()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let tok = self.bump()?;
            let rhs = self.term()?;
            res = Expr::Binary {
                op,
                lhs: Box::new(res),
                rhs: Box::new(rhs),
                pos: tok.pos,
            };
        }
        Ok(res)
    }

    fn term(&mut self) -> DiagResult<Expr> {
        let mut res = self.power()?;
        loop {
            let op = match self.cur.kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::IntDiv => BinOp::IntDiv,
                TokenKind::Mod => BinOp::Rem,
                _ => break,
            };
            let tok = self.bump()?;
            let rhs = self.power()?;
            res = Expr::Binary {
                op,
                lhs: Box::new(res),
                rhs: Box::new(rhs),
                pos: tok.pos,
            };
        }
        Ok(res)
    }

    /// `^` binds tightest of the binary operators and associates right.
    fn power(&mut self) -> DiagResult<Expr> {
        let base = self.factor()?;
        if !self.at(TokenKind::Caret) {
            return Ok(base);
        }
        let tok = self.bump()?;
        let exponent = self.power()?;
        Ok(Expr::Binary {
            op: BinOp::Pow,
            lhs: Box::new(base),
            rhs: Box::new(exponent),
            pos: tok.pos,
        })
    }

    fn factor(&mut self) -> DiagResult<Expr> {
        match self.cur.kind {
            TokenKind::Plus => {
                let tok = self.bump()?;
                Ok(Expr::Unary {
                    op: UnOp::Pos,
                    operand: Box::new(self.factor()?),
                    pos: tok.pos,
                })
            }
            TokenKind::Minus => {
                let tok = self.bump()?;
                Ok(Expr::Unary {
                    op: UnOp::Neg,
                    operand: Box::new(self.factor()?),
                    pos: tok.pos,
                })
            }
            TokenKind::Int(value) => {
                let tok = self.bump()?;
                Ok(Expr::Int {
                    value,
                    pos: tok.pos,
                })
            }
            TokenKind::Real(value) => {
                let tok = self.bump()?;
                Ok(Expr::Float {
                    value,
                    pos: tok.pos,
                })
            }
            TokenKind::Str(value) => {
                let tok = self.bump()?;
                Ok(Expr::Str {
                    value,
                    pos: tok.pos,
                })
            }
            TokenKind::LParen => {
                self.bump()?;
                let inner = self.b_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(_) => self.variable(),
            other => Err(syntax_at(
                format!("bad expression `{}`", other.describe()),
                self.cur.pos,
            )),
        }
    }

    /// A variable reference or a subscripted call/array read.
    fn variable(&mut self) -> DiagResult<Expr> {
        let (name, pos) = self.expect_ident()?;
        if !self.at(TokenKind::LParen) {
            return Ok(Expr::Var { name, pos });
        }
        let args = self.call_args()?;
        Ok(Expr::Call {
            name,
            args,
            subscript: true,
            pos,
        })
    }

    fn call_args(&mut self) -> DiagResult<Vec<Expr>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.at(TokenKind::RParen) {
            args.push(self.b_expr()?);
            while self.at(TokenKind::Comma) {
                self.bump()?;
                args.push(self.b_expr()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }
}
