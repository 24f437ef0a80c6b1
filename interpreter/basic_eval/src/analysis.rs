//! The pre-execution analysis pass.
//!
//! One walk over the parsed program, before any statement runs:
//!
//! 1. install the line table (BASIC line number to line-vector index);
//! 2. record symbols -- scalar assignments define their target, `DIM`
//!    rejects duplicates, `DEF` registers a user function, element targets
//!    must name a declared array;
//! 3. evaluate `DATA` items into the pool (the built-ins are already
//!    installed, so constant expressions over them work);
//! 4. pair each FOR with its NEXT through a stack of open descriptors,
//!    filing the paired descriptor under both sites' `(pc, offset)` keys.
//!
//! Any descriptor still open at the end is an unmatched FOR.

use rustc_hash::FxHashMap;

use basic_diagnostic::{
    duplicate_array, reused_for_counter, semantic_at, unmatched_for_loop, wanted_array_var,
    DiagResult,
};
use basic_ir::{Name, Program, SourcePos, Stmt, Target};

use crate::environment::LocalScope;
use crate::for_loop::{ForDescriptor, ForHandle};
use crate::interpreter::Interpreter;
use crate::value::{FuncData, Value};

/// What a name is known to be during analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SymbolKind {
    Scalar,
    Array,
    Func,
}

/// Nested name tables; lookups walk outward like the runtime frames.
struct SymbolTable {
    scopes: Vec<FxHashMap<Name, SymbolKind>>,
}

impl SymbolTable {
    fn new() -> Self {
        SymbolTable {
            scopes: vec![FxHashMap::default()],
        }
    }

    fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    fn define(&mut self, name: Name, kind: SymbolKind) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, kind);
        }
    }

    fn find(&self, name: Name) -> Option<SymbolKind> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
    }
}

impl Interpreter {
    /// Run the analysis pass over a parsed program.
    pub fn analyze(&mut self, program: &Program) -> DiagResult<()> {
        self.lines.clear();
        self.data_pool.clear();
        self.for_begins.clear();
        self.for_ends.clear();
        self.funcs.clear();

        for (pc, line) in program.lines.iter().enumerate() {
            if let Some(number) = line.number {
                self.lines.insert(number, pc);
            }
        }
        tracing::debug!(lines = self.lines.len(), "installed line table");

        let mut symbols = SymbolTable::new();
        let mut open_loops: Vec<ForHandle> = Vec::new();

        for (pc, line) in program.lines.iter().enumerate() {
            for (offset, stmt) in line.stmts.iter().enumerate() {
                self.analyze_stmt(stmt, pc, offset, line.number, &mut symbols, &mut open_loops)?;
            }
        }

        if let Some(open) = open_loops.last() {
            return Err(unmatched_for_loop(open.borrow().begin_line));
        }
        tracing::debug!(
            loops = self.for_begins.len(),
            data = self.data_pool.len(),
            funcs = self.funcs.len(),
            "analysis complete"
        );
        Ok(())
    }

    fn analyze_stmt(
        &mut self,
        stmt: &Stmt,
        pc: usize,
        offset: usize,
        line_number: Option<i64>,
        symbols: &mut SymbolTable,
        open_loops: &mut Vec<ForHandle>,
    ) -> DiagResult<()> {
        match stmt {
            Stmt::Let { target, .. } => match target {
                Target::Scalar { name, .. } => symbols.define(*name, SymbolKind::Scalar),
                Target::Element { name, pos, .. } => self.require_array(symbols, *name, *pos)?,
            },

            Stmt::Read { targets, .. } => {
                for target in targets {
                    if let Target::Element { name, pos, .. } = target {
                        self.require_array(symbols, *name, *pos)?;
                    }
                }
            }

            Stmt::Dim { name, pos, .. } => {
                if symbols.find(*name).is_some() {
                    return Err(duplicate_array(self.interner.lookup(*name), *pos));
                }
                symbols.define(*name, SymbolKind::Array);
            }

            Stmt::Def {
                name, params, body, ..
            } => {
                self.funcs.insert(
                    *name,
                    Value::func(FuncData {
                        name: *name,
                        params: params.clone(),
                        body: body.clone(),
                    }),
                );
                symbols.define(*name, SymbolKind::Func);
                // The body sees its parameters in a nested table.
                symbols.push_scope();
                for &param in params {
                    symbols.define(param, SymbolKind::Scalar);
                }
                symbols.pop_scope();
                tracing::debug!(func = self.interner.lookup(*name), "registered user function");
            }

            Stmt::Data { values, .. } => {
                // DATA items are evaluated exactly once, here; reaching the
                // statement at run time has no effect.
                for value in values {
                    let evaluated = self.eval_expr(value)?;
                    self.data_pool.push(evaluated);
                }
            }

            Stmt::For { var, pos, .. } => {
                if open_loops.iter().any(|open| open.borrow().var == *var) {
                    return Err(reused_for_counter(self.interner.lookup(*var), *pos));
                }
                open_loops.push(LocalScope::new(ForDescriptor::open(
                    *var,
                    line_number.unwrap_or(-1),
                    pc,
                    offset,
                )));
            }

            Stmt::Next { var, pos } => {
                let Some(top) = open_loops.last() else {
                    return Err(semantic_at("NEXT without an open FOR", *pos));
                };
                if let Some(named) = var {
                    let open_var = top.borrow().var;
                    if open_var != *named {
                        return Err(semantic_at(
                            format!(
                                "wanted for counter `{}`, got `{}`",
                                self.interner.lookup(open_var),
                                self.interner.lookup(*named)
                            ),
                            *pos,
                        ));
                    }
                }
                let begin_key = {
                    let mut f = top.borrow_mut();
                    f.end_pc = pc;
                    f.end_offset = offset;
                    (f.begin_pc, f.begin_offset)
                };
                if let Some(handle) = open_loops.pop() {
                    tracing::debug!(?begin_key, end = ?(pc, offset), "paired for/next");
                    self.for_begins.insert(begin_key, handle.clone());
                    self.for_ends.insert((pc, offset), handle);
                }
            }

            Stmt::If {
                then, otherwise, ..
            } => {
                // Nested arms share their statement's (pc, offset).
                self.analyze_stmt(then, pc, offset, line_number, symbols, open_loops)?;
                if let Some(arm) = otherwise {
                    self.analyze_stmt(arm, pc, offset, line_number, symbols, open_loops)?;
                }
            }

            _ => {}
        }
        Ok(())
    }

    fn require_array(
        &self,
        symbols: &SymbolTable,
        name: Name,
        pos: SourcePos,
    ) -> DiagResult<()> {
        match symbols.find(name) {
            Some(SymbolKind::Array) => Ok(()),
            _ => Err(wanted_array_var(self.interner.lookup(name), pos)),
        }
    }
}
