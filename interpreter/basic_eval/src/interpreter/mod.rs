//! The program-counter evaluator.
//!
//! Execution is a two-level cursor: `pc` indexes the program's line vector
//! and `prog_offset` the statement within the current line's compound. The
//! driver loop *pre-increments* `pc`, so every jump sets `pc = target - 1`
//! -- this off-by-one contract is load-bearing in `jump`, `jump_sub`,
//! `ret_sub`, `jump_for`, and `end_for`; touch it with care.
//!
//! Statement execution yields [`Flow`]: `StopLine` abandons the rest of the
//! current compound, which is how control transfers hand the driver the
//! next line, how a failed `IF` discards its line, and how an
//! effect-position call that evaluates to numeric zero stops its line.

mod scope_guard;

pub use scope_guard::ScopedInterpreter;

use rustc_hash::FxHashMap;

use basic_diagnostic::{
    bad_jump_target, out_of_data, return_without_gosub, semantic_at, sigil_mismatch,
    unknown_function, unknown_variable, wanted_value, wrong_arg_count, DiagResult,
};
use basic_ir::{
    Expr, Line, Name, OnKind, OrOp, PrintItem, Program, SharedInterner, Sigil, SourcePos, Stmt,
    Target, UnOp,
};

use crate::array::ArrayValue;
use crate::builtins;
use crate::environment::Environment;
use crate::for_loop::ForHandle;
use crate::input_handler::{stdin_input, SharedInputHandler};
use crate::operators::{as_number, binary, compare, number_value, Num};
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::value::{FuncData, Heap, Value};

/// What a statement tells its enclosing compound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Proceed to the next statement on the line.
    Continue,
    /// Abandon the rest of the line; the driver's `pc` increment decides
    /// what runs next.
    StopLine,
}

/// The interpreter: shared state for the analyzer and the evaluator.
pub struct Interpreter {
    pub(crate) interner: SharedInterner,
    pub(crate) env: Environment,
    printer: SharedPrintHandler,
    input: SharedInputHandler,
    /// BASIC line number to index into the program's line vector.
    pub(crate) lines: FxHashMap<i64, usize>,
    /// Values pooled from DATA statements during analysis.
    pub(crate) data_pool: Vec<Value>,
    data_ptr: usize,
    /// Caller positions of outstanding GOSUBs.
    gosub_stack: Vec<(usize, usize)>,
    /// FOR descriptors keyed by the FOR site's `(pc, offset)`.
    pub(crate) for_begins: FxHashMap<(usize, usize), ForHandle>,
    /// The same descriptors keyed by the NEXT site's `(pc, offset)`.
    pub(crate) for_ends: FxHashMap<(usize, usize), ForHandle>,
    /// User functions registered by the analyzer.
    pub(crate) funcs: FxHashMap<Name, Value>,
    pc: i64,
    prog_offset: usize,
    running: bool,
}

impl Interpreter {
    /// An interpreter wired to stdout and stdin.
    pub fn new(interner: SharedInterner) -> Self {
        Interpreter::with_handlers(interner, stdout_handler(), stdin_input())
    }

    /// An interpreter with explicit I/O handlers (tests, batch runs).
    pub fn with_handlers(
        interner: SharedInterner,
        printer: SharedPrintHandler,
        input: SharedInputHandler,
    ) -> Self {
        let mut env = Environment::new();
        builtins::install(&mut env, &interner);
        Interpreter {
            interner,
            env,
            printer,
            input,
            lines: FxHashMap::default(),
            data_pool: Vec::new(),
            data_ptr: 0,
            gosub_stack: Vec::new(),
            for_begins: FxHashMap::default(),
            for_ends: FxHashMap::default(),
            funcs: FxHashMap::default(),
            pc: -1,
            prog_offset: 0,
            running: false,
        }
    }

    /// Analyze and run a program.
    pub fn interpret(&mut self, program: &Program) -> DiagResult<()> {
        self.analyze(program)?;
        self.run(program)
    }

    /// Run an already-analyzed program.
    ///
    /// Counters and the GOSUB stack are reset both before and after the
    /// run, whichever way it ends.
    pub fn run(&mut self, program: &Program) -> DiagResult<()> {
        self.init_run();
        let result = self.run_program(program);
        self.finish_run();
        result
    }

    fn init_run(&mut self) {
        self.running = true;
        self.data_ptr = 0;
        self.prog_offset = 0;
        self.pc = -1;
        self.gosub_stack.clear();
        for handle in self.for_begins.values() {
            handle.borrow_mut().init = None;
        }
        // Instantiate user functions into the global frame.
        for (&name, func) in &self.funcs {
            self.env.define_global(name, func.clone());
        }
    }

    fn finish_run(&mut self) {
        self.running = false;
        self.data_ptr = 0;
        self.prog_offset = 0;
        self.pc = -1;
        self.gosub_stack.clear();
    }

    #[allow(
        clippy::cast_possible_wrap,
        reason = "program line counts stay far below i64::MAX"
    )]
    fn run_program(&mut self, program: &Program) -> DiagResult<()> {
        let len = program.lines.len() as i64;
        while self.running && self.pc + 1 < len {
            self.pc += 1;
            let line = &program.lines[self.cur_pc()];
            self.exec_line(line)?;
        }
        Ok(())
    }

    #[allow(
        clippy::cast_sign_loss,
        reason = "pc is non-negative whenever a line executes"
    )]
    fn cur_pc(&self) -> usize {
        self.pc.max(0) as usize
    }

    /// Execute one compound, consuming `prog_offset` as the start point.
    fn exec_line(&mut self, line: &Line) -> DiagResult<()> {
        let start = std::mem::take(&mut self.prog_offset);
        for offset in start..line.stmts.len() {
            match self.exec_stmt(&line.stmts[offset], offset)? {
                Flow::Continue => {}
                Flow::StopLine => break,
            }
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt, offset: usize) -> DiagResult<Flow> {
        match stmt {
            // No run-time effect: DATA was pooled during analysis, DEF was
            // registered there, RUN is a parsed no-op.
            Stmt::Comment { .. } | Stmt::Data { .. } | Stmt::Def { .. } | Stmt::Run { .. } => {
                Ok(Flow::Continue)
            }

            Stmt::End { .. } => {
                tracing::trace!(pc = self.pc, "END");
                self.running = false;
                Ok(Flow::StopLine)
            }

            Stmt::Restore { .. } => {
                self.data_ptr = 0;
                Ok(Flow::Continue)
            }

            Stmt::Let { target, value, .. } => {
                let v = self.eval_expr(value)?;
                self.store(target, v)?;
                Ok(Flow::Continue)
            }

            Stmt::Print { println, items, .. } => {
                self.exec_print(*println, items)?;
                Ok(Flow::Continue)
            }

            Stmt::Input { prompt, var, pos } => {
                self.exec_input(*prompt, *var, *pos)?;
                Ok(Flow::Continue)
            }

            Stmt::Read { targets, pos } => {
                self.exec_read(targets, *pos)?;
                Ok(Flow::Continue)
            }

            Stmt::Goto { target, pos } => {
                let line = self.eval_jump_target(target)?;
                self.jump(line, "goto", *pos)?;
                Ok(Flow::StopLine)
            }

            Stmt::Gosub { target, pos } => {
                let line = self.eval_jump_target(target)?;
                self.jump_sub(line, offset, *pos)?;
                Ok(Flow::StopLine)
            }

            Stmt::Return { pos } => {
                self.ret_sub(*pos)?;
                Ok(Flow::StopLine)
            }

            Stmt::On {
                selector,
                kind,
                targets,
                pos,
            } => {
                let picked = self.eval_jump_target(selector)?;
                if picked >= 1 && picked <= targets.len() as i64 {
                    #[allow(clippy::cast_sign_loss, reason = "checked >= 1 above")]
                    let line = targets[(picked - 1) as usize];
                    match kind {
                        OnKind::Goto => self.jump(line, "goto", *pos)?,
                        OnKind::Gosub => self.jump_sub(line, offset, *pos)?,
                    }
                    Ok(Flow::StopLine)
                } else {
                    // Out-of-range selector falls through.
                    Ok(Flow::Continue)
                }
            }

            Stmt::If {
                cond,
                then,
                otherwise,
                ..
            } => {
                let c = self.eval_number(cond)?;
                if !c.is_zero() {
                    self.exec_stmt(then, offset)
                } else if let Some(e) = otherwise {
                    self.exec_stmt(e, offset)
                } else {
                    // A failed IF discards the rest of its line.
                    Ok(Flow::StopLine)
                }
            }

            Stmt::For {
                var, init, term, step, ..
            } => self.exec_for(*var, init, term, step, offset),

            Stmt::Next { pos, .. } => self.exec_next(offset, *pos),

            Stmt::Dim { name, dims, .. } => {
                self.env.define(*name, Value::array(ArrayValue::new(dims)));
                Ok(Flow::Continue)
            }

            Stmt::Call { call, .. } => {
                let v = self.eval_expr(call)?;
                // The literal Number-zero stop contract for effect calls.
                if v.is_zero() {
                    Ok(Flow::StopLine)
                } else {
                    Ok(Flow::Continue)
                }
            }
        }
    }

    // Stores

    fn store(&mut self, target: &Target, value: Value) -> DiagResult<()> {
        match target {
            Target::Scalar { name, pos } => {
                self.check_sigil(*name, &value, *pos)?;
                self.env.define(*name, value);
            }
            Target::Element { name, indices, pos } => {
                let mut idx = Vec::with_capacity(indices.len());
                for e in indices {
                    idx.push(self.eval_expr(e)?);
                }
                let bound = self
                    .env
                    .lookup(*name)
                    .ok_or_else(|| unknown_variable(self.interner.lookup(*name), *pos))?;
                let Value::Array(arr) = bound else {
                    return Err(wanted_value("array", bound.type_name()).or_at(*pos));
                };
                self.check_sigil(*name, &value, *pos)?;
                arr.borrow_mut().set(&idx, value).map_err(|d| d.or_at(*pos))?;
            }
        }
        Ok(())
    }

    /// Enforce the name-sigil discipline on a stored data value.
    fn check_sigil(&self, name: Name, value: &Value, pos: SourcePos) -> DiagResult<()> {
        let text = self.interner.lookup(name);
        let ok = match Sigil::of(text) {
            Sigil::Str => matches!(value, Value::Str(_)),
            Sigil::Int => matches!(value, Value::Int(_)),
            Sigil::Float | Sigil::None => matches!(value, Value::Int(_) | Value::Float(_)),
        };
        if ok {
            Ok(())
        } else {
            let wanted = match Sigil::of(text) {
                Sigil::Str => "a string",
                Sigil::Int => "an integer",
                Sigil::Float | Sigil::None => "a number",
            };
            Err(sigil_mismatch(text, wanted, value.type_name(), pos))
        }
    }

    // I/O statements

    fn exec_print(&mut self, println: bool, items: &[PrintItem]) -> DiagResult<()> {
        let mut last_semi = false;
        for item in items {
            match item {
                PrintItem::Comma => {
                    self.printer.print(" ");
                    last_semi = false;
                }
                PrintItem::Semi => {
                    self.printer.print(" ");
                    last_semi = true;
                }
                PrintItem::Expr(e) => {
                    let v = self.eval_expr(e)?;
                    self.printer.print(&v.display_value());
                    last_semi = false;
                }
            }
        }
        // A trailing `;` holds the line open; PRINTLN always closes it.
        if println || !last_semi {
            self.printer.newline();
        }
        Ok(())
    }

    fn exec_input(&mut self, prompt: Option<Name>, var: Name, pos: SourcePos) -> DiagResult<()> {
        if let Some(p) = prompt {
            self.printer.print(self.interner.lookup(p));
        }
        let text = self.input.read_line();
        let value = if Sigil::of(self.interner.lookup(var)) == Sigil::Str {
            Value::string(text)
        } else if text.contains('.') {
            Value::Float(text.trim().parse().unwrap_or(0.0))
        } else {
            Value::Int(text.trim().parse().unwrap_or(0))
        };
        self.check_sigil(var, &value, pos)?;
        self.env.define(var, value);
        Ok(())
    }

    fn exec_read(&mut self, targets: &[Target], pos: SourcePos) -> DiagResult<()> {
        for target in targets {
            let Some(value) = self.read_data() else {
                return Err(out_of_data(pos));
            };
            self.store(target, value)?;
        }
        Ok(())
    }

    /// Next DATA value, advancing the cursor.
    fn read_data(&mut self) -> Option<Value> {
        let value = self.data_pool.get(self.data_ptr).cloned();
        if value.is_some() {
            self.data_ptr += 1;
        }
        value
    }

    // Jumps -- all of these set `pc = target - 1` for the pre-increment.

    #[allow(
        clippy::cast_possible_wrap,
        reason = "line indices stay far below i64::MAX"
    )]
    fn jump(&mut self, line: i64, what: &'static str, pos: SourcePos) -> DiagResult<()> {
        let Some(&idx) = self.lines.get(&line) else {
            return Err(bad_jump_target(what, line).or_at(pos));
        };
        tracing::trace!(line, idx, what, "jump");
        self.prog_offset = 0;
        self.pc = idx as i64 - 1;
        Ok(())
    }

    fn jump_sub(&mut self, line: i64, offset: usize, pos: SourcePos) -> DiagResult<()> {
        let caller = (self.cur_pc(), offset);
        self.jump(line, "gosub", pos)?;
        self.gosub_stack.push(caller);
        Ok(())
    }

    #[allow(
        clippy::cast_possible_wrap,
        reason = "line indices stay far below i64::MAX"
    )]
    fn ret_sub(&mut self, pos: SourcePos) -> DiagResult<()> {
        let Some((pc, offset)) = self.gosub_stack.pop() else {
            return Err(return_without_gosub().or_at(pos));
        };
        tracing::trace!(pc, offset, "return");
        // Resume *after* the GOSUB statement.
        self.prog_offset = offset + 1;
        self.pc = pc as i64 - 1;
        Ok(())
    }

    // FOR / NEXT

    fn get_for_loop(&self, offset: usize, pos: SourcePos) -> DiagResult<ForHandle> {
        let key = (self.cur_pc(), offset);
        self.for_begins
            .get(&key)
            .or_else(|| self.for_ends.get(&key))
            .cloned()
            .ok_or_else(|| semantic_at(format!("unknown for-loop at offset {offset}"), pos))
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "an integer counter stays integral; the float intermediate is exact for loop ranges"
    )]
    fn exec_for(
        &mut self,
        var: Name,
        init: &Expr,
        term: &Expr,
        step: &Expr,
        offset: usize,
    ) -> DiagResult<Flow> {
        let handle = self.get_for_loop(offset, init.pos())?;

        // Step and terminal are re-evaluated on every entry.
        let term_v = self.eval_number(term)?.as_f64();
        let step_v = self.eval_number(step)?.as_f64();

        let cached = handle.borrow().init.clone();
        let counter = match cached {
            None => {
                // First entry: bind and cache the start value.
                let start = self.eval_expr(init)?;
                let n = as_number(&start).map_err(|d| d.or_at(init.pos()))?;
                self.check_sigil(var, &start, init.pos())?;
                self.env.define(var, start.clone());
                handle.borrow_mut().init = Some(start);
                n.as_f64()
            }
            Some(_) => {
                // Re-entry from NEXT: advance the counter, preserving its
                // integer-ness.
                let bound = self
                    .env
                    .lookup(var)
                    .ok_or_else(|| unknown_variable(self.interner.lookup(var), init.pos()))?;
                let n = as_number(&bound).map_err(|d| d.or_at(init.pos()))?;
                let advanced = n.as_f64() + step_v;
                let updated = match n {
                    Num::Int(_) => Value::Int(advanced as i64),
                    Num::Float(_) => Value::Float(advanced),
                };
                self.env.define(var, updated);
                advanced
            }
        };

        let done = if step_v > 0.0 {
            counter > term_v
        } else if step_v < 0.0 {
            counter < term_v
        } else {
            // A zero step terminates immediately rather than spinning.
            true
        };

        if done {
            self.end_for(&handle);
            Ok(Flow::StopLine)
        } else {
            Ok(Flow::Continue)
        }
    }

    fn exec_next(&mut self, offset: usize, pos: SourcePos) -> DiagResult<Flow> {
        let handle = self.get_for_loop(offset, pos)?;
        self.jump_for(&handle);
        Ok(Flow::StopLine)
    }

    /// Jump back to the FOR site, keeping the cached init so re-entry
    /// advances the counter.
    #[allow(
        clippy::cast_possible_wrap,
        reason = "line indices stay far below i64::MAX"
    )]
    fn jump_for(&mut self, handle: &ForHandle) {
        let f = handle.borrow();
        tracing::trace!(pc = f.begin_pc, offset = f.begin_offset, "next -> for");
        self.prog_offset = f.begin_offset;
        self.pc = f.begin_pc as i64 - 1;
    }

    /// Leave the loop: clear the cached init and resume after the NEXT.
    #[allow(
        clippy::cast_possible_wrap,
        reason = "line indices stay far below i64::MAX"
    )]
    fn end_for(&mut self, handle: &ForHandle) {
        let mut f = handle.borrow_mut();
        f.init = None;
        tracing::trace!(pc = f.end_pc, offset = f.end_offset, "for done");
        self.prog_offset = f.end_offset + 1;
        self.pc = f.end_pc as i64 - 1;
    }

    // Expressions

    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> DiagResult<Value> {
        match expr {
            Expr::Int { value, .. } => Ok(Value::Int(*value)),
            Expr::Float { value, .. } => Ok(Value::Float(*value)),
            Expr::Str { value, .. } => Ok(Value::string(self.interner.lookup(*value))),
            Expr::Var { name, pos } => self
                .env
                .lookup(*name)
                .ok_or_else(|| unknown_variable(self.interner.lookup(*name), *pos)),
            Expr::Unary { op, operand, .. } => {
                let n = self.eval_number(operand)?;
                Ok(match (op, n) {
                    (UnOp::Pos, n) => number_value(n),
                    (UnOp::Neg, Num::Int(v)) => Value::Int(v.wrapping_neg()),
                    (UnOp::Neg, Num::Float(v)) => Value::Float(-v),
                })
            }
            Expr::Binary { op, lhs, rhs, pos } => {
                let l = self.eval_expr(lhs)?;
                let r = self.eval_expr(rhs)?;
                binary(*op, &l, &r).map_err(|d| d.or_at(*pos))
            }
            Expr::Relation { op, lhs, rhs, pos } => {
                let l = self.eval_expr(lhs)?;
                let r = self.eval_expr(rhs)?;
                compare(*op, &l, &r).map_err(|d| d.or_at(*pos))
            }
            Expr::Not { operand, .. } => {
                let n = self.eval_number(operand)?;
                Ok(Value::Int(i64::from(n.is_zero())))
            }
            Expr::And { terms, .. } => {
                // Short-circuits on the first zero term.
                for term in terms {
                    if self.eval_number(term)?.is_zero() {
                        return Ok(Value::Int(0));
                    }
                }
                Ok(Value::Int(1))
            }
            Expr::Or { first, rest, .. } => {
                let mut truth = !self.eval_number(first)?.is_zero();
                for (op, term) in rest {
                    if *op == OrOp::Or && truth {
                        // OR short-circuits the remainder of the chain.
                        break;
                    }
                    let rhs = !self.eval_number(term)?.is_zero();
                    match op {
                        OrOp::Xor => truth = truth != rhs,
                        OrOp::Or => truth = truth || rhs,
                    }
                }
                Ok(Value::Int(i64::from(truth)))
            }
            Expr::Call { name, args, pos, .. } => self.eval_call(*name, args, *pos),
        }
    }

    fn eval_number(&mut self, expr: &Expr) -> DiagResult<Num> {
        let v = self.eval_expr(expr)?;
        as_number(&v).map_err(|d| d.or_at(expr.pos()))
    }

    /// Evaluate a jump target or ON selector down to an integer.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "a float jump target truncates, like the original"
    )]
    fn eval_jump_target(&mut self, expr: &Expr) -> DiagResult<i64> {
        Ok(match self.eval_number(expr)? {
            Num::Int(n) => n,
            Num::Float(f) => f as i64,
        })
    }

    fn eval_call(&mut self, name: Name, args: &[Expr], pos: SourcePos) -> DiagResult<Value> {
        let callee = self
            .env
            .lookup(name)
            .ok_or_else(|| unknown_function(self.interner.lookup(name), pos))?;
        let mut vals = Vec::with_capacity(args.len());
        for arg in args {
            vals.push(self.eval_expr(arg)?);
        }
        match callee {
            Value::Array(arr) => {
                let cell = arr.borrow().get(&vals);
                cell.map_err(|d| d.or_at(pos))
            }
            Value::Native(func, _) => func(&vals).map_err(|d| d.or_at(pos)),
            Value::Func(data) => self.invoke_user(&data, vals, pos),
            other => Err(wanted_value("array or function", other.type_name()).or_at(pos)),
        }
    }

    /// Call a `DEF` function: fresh frame, positional parameter binding,
    /// body evaluation. The frame pops on every exit path.
    fn invoke_user(
        &mut self,
        data: &Heap<FuncData>,
        args: Vec<Value>,
        pos: SourcePos,
    ) -> DiagResult<Value> {
        if args.len() != data.params.len() {
            return Err(wrong_arg_count(
                self.interner.lookup(data.name),
                data.params.len(),
                args.len(),
            )
            .or_at(pos));
        }
        let mut scoped = self.scoped();
        for (&param, arg) in data.params.iter().zip(args) {
            scoped.check_sigil(param, &arg, pos)?;
            scoped.env.define(param, arg);
        }
        scoped.eval_expr(&data.body)
    }
}
