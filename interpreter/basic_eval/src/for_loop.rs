//! FOR-loop descriptors.
//!
//! The analyzer cross-links every FOR with its NEXT and files the shared
//! descriptor in two side maps keyed by `(pc, offset)` -- one for the FOR
//! site, one for the NEXT site -- so the evaluator can look its loop up by
//! its current position without touching the AST.

use basic_ir::Name;

use crate::environment::LocalScope;
use crate::value::Value;

/// The record bridging a FOR and its matching NEXT.
#[derive(Debug)]
pub(crate) struct ForDescriptor {
    /// Counter variable.
    pub var: Name,
    /// BASIC line number of the FOR, for diagnostics (-1 on a scratch line).
    pub begin_line: i64,
    /// Program-counter index of the FOR's line.
    pub begin_pc: usize,
    /// Statement offset of the FOR within its line.
    pub begin_offset: usize,
    /// Program-counter index of the NEXT's line (filled by the analyzer).
    pub end_pc: usize,
    /// Statement offset of the NEXT within its line.
    pub end_offset: usize,
    /// Counter start value, cached on first entry and cleared on exit.
    pub init: Option<Value>,
}

impl ForDescriptor {
    /// A descriptor for a FOR whose NEXT has not been seen yet.
    pub fn open(var: Name, begin_line: i64, begin_pc: usize, begin_offset: usize) -> Self {
        ForDescriptor {
            var,
            begin_line,
            begin_pc,
            begin_offset,
            end_pc: 0,
            end_offset: 0,
            init: None,
        }
    }
}

/// Shared handle: the same descriptor is reachable from both side maps and
/// from the analyzer's open-loop stack.
pub(crate) type ForHandle = LocalScope<ForDescriptor>;
