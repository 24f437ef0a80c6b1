//! Diagnostics shared by every pipeline stage.
//!
//! One error type flows from the lexer to the CLI: a [`Diagnostic`] with a
//! category, a message, and an optional source position. Centralizing the
//! constructors here keeps message wording in one place -- the stages build
//! errors through the functions at the bottom of this module rather than
//! formatting strings inline.

use std::fmt;

use basic_ir::SourcePos;

/// Category of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Lexer/parser rejection, or a name-sigil violation on store.
    Syntax,
    /// Analyzer rejection: duplicate array, unmatched FOR, reused counter,
    /// bad READ target, wrong array rank.
    Semantic,
    /// A name did not resolve to a variable, array, or function.
    NoSuchVar,
    /// Wrong operand kind for an operator or built-in.
    BadArg,
    /// Call argument count does not match the parameter count.
    BadArity,
    /// Array index outside the declared extent.
    IndexOob,
    /// Division or MOD with a zero denominator.
    DivByZero,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Syntax => "Syntax",
            ErrorKind::Semantic => "Semantic",
            ErrorKind::NoSuchVar => "NoSuchVar",
            ErrorKind::BadArg => "BadArg",
            ErrorKind::BadArity => "BadArity",
            ErrorKind::IndexOob => "IndexOOB",
            ErrorKind::DivByZero => "DivByZero",
        })
    }
}

/// A single diagnostic, surfaced to the user as one line.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}{}", render_pos(.pos))]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    /// Where the problem was noticed; absent for errors raised from inside
    /// built-ins, which get a position attached at the call site.
    pub pos: Option<SourcePos>,
}

impl Diagnostic {
    /// Create a diagnostic without a position.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            pos: None,
        }
    }

    /// Create a diagnostic anchored at `pos`.
    pub fn at(kind: ErrorKind, message: impl Into<String>, pos: SourcePos) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            pos: Some(pos),
        }
    }

    /// Attach a position unless the diagnostic already has one.
    ///
    /// Built-ins raise position-free diagnostics; the evaluator anchors
    /// them at the call site on the way out.
    #[must_use]
    pub fn or_at(mut self, pos: SourcePos) -> Self {
        if self.pos.is_none() {
            self.pos = Some(pos);
        }
        self
    }
}

fn render_pos(pos: &Option<SourcePos>) -> String {
    pos.as_ref().map_or_else(String::new, |p| format!(" near {p}"))
}

/// Result alias used by every fallible stage.
pub type DiagResult<T> = Result<T, Diagnostic>;

// Constructors -- lexer and parser

/// Generic syntax rejection at a position.
pub fn syntax_at(message: impl Into<String>, pos: SourcePos) -> Diagnostic {
    Diagnostic::at(ErrorKind::Syntax, message, pos)
}

/// The parser wanted one token and saw another.
pub fn unexpected_token(wanted: &str, got: &str, pos: SourcePos) -> Diagnostic {
    syntax_at(format!("wanted {wanted}, got {got}"), pos)
}

/// A malformed identifier (characters after the type sigil).
pub fn bad_identifier(text: &str, pos: SourcePos) -> Diagnostic {
    syntax_at(format!("bad name `{text}`"), pos)
}

// Constructors -- analyzer

/// Generic semantic rejection at a position.
pub fn semantic_at(message: impl Into<String>, pos: SourcePos) -> Diagnostic {
    Diagnostic::at(ErrorKind::Semantic, message, pos)
}

/// Semantic rejection with the position supplied later via [`Diagnostic::or_at`].
pub fn semantic(message: impl Into<String>) -> Diagnostic {
    Diagnostic::new(ErrorKind::Semantic, message)
}

/// A FOR whose NEXT never arrived.
pub fn unmatched_for_loop(line: i64) -> Diagnostic {
    Diagnostic::new(ErrorKind::Semantic, format!("unmatched for-loop at line {line}"))
}

/// A nested FOR reused an enclosing loop's counter variable.
pub fn reused_for_counter(var: &str, pos: SourcePos) -> Diagnostic {
    semantic_at(format!("for counter-var `{var}` reused"), pos)
}

/// DIM of a name that is already declared.
pub fn duplicate_array(name: &str, pos: SourcePos) -> Diagnostic {
    semantic_at(format!("duplicate array var `{name}`"), pos)
}

/// An element target whose name is not a declared array.
pub fn wanted_array_var(name: &str, pos: SourcePos) -> Diagnostic {
    semantic_at(format!("wanted array var `{name}`"), pos)
}

// Constructors -- evaluator

/// A name resolved to nothing.
pub fn unknown_variable(name: &str, pos: SourcePos) -> Diagnostic {
    Diagnostic::at(ErrorKind::NoSuchVar, format!("unknown variable `{name}`"), pos)
}

/// A called name resolved to nothing callable or indexable.
pub fn unknown_function(name: &str, pos: SourcePos) -> Diagnostic {
    Diagnostic::at(
        ErrorKind::NoSuchVar,
        format!("unknown function/array `{name}`"),
        pos,
    )
}

/// Operand-kind mismatch: `wanted` describes the expectation, `got` the
/// actual value's type name.
pub fn wanted_value(wanted: &str, got: &str) -> Diagnostic {
    Diagnostic::new(ErrorKind::BadArg, format!("wanted {wanted}, got {got}"))
}

/// A jump target that is not a program line.
pub fn bad_jump_target(what: &str, line: i64) -> Diagnostic {
    Diagnostic::new(ErrorKind::BadArg, format!("bad {what}<{line}>"))
}

/// RETURN with no GOSUB outstanding.
pub fn return_without_gosub() -> Diagnostic {
    Diagnostic::new(ErrorKind::BadArg, "bad gosub-return: no sub called")
}

/// Call arity mismatch.
pub fn wrong_arg_count(name: &str, wanted: usize, got: usize) -> Diagnostic {
    Diagnostic::new(
        ErrorKind::BadArity,
        format!("`{name}` takes {wanted} argument(s), got {got}"),
    )
}

/// Array access outside the declared extent.
pub fn index_out_of_bounds(index: i64, extent: usize) -> Diagnostic {
    Diagnostic::new(
        ErrorKind::IndexOob,
        format!("index {index} outside 0..{extent}"),
    )
}

/// Division or MOD by zero.
pub fn division_by_zero() -> Diagnostic {
    Diagnostic::new(ErrorKind::DivByZero, "division by zero")
}

/// READ past the end of the DATA pool.
pub fn out_of_data(pos: SourcePos) -> Diagnostic {
    semantic_at("can't read data", pos)
}

/// A stored value that violates the target name's sigil.
pub fn sigil_mismatch(name: &str, wanted: &str, got: &str, pos: SourcePos) -> Diagnostic {
    syntax_at(format!("`{name}` wants {wanted}, got {got}"), pos)
}
