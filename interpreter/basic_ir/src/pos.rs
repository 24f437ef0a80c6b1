//! Source positions for diagnostics.

use std::fmt;

/// A 1-based (line, column) position in the source text.
///
/// Positions exist only for diagnostics; nothing in the evaluator keys on
/// them. Column counts bytes, which is exact for the ASCII programs this
/// dialect targets and merely approximate inside multi-byte characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourcePos {
    /// Line in the source file, starting at 1.
    pub line: u32,
    /// Column on that line, starting at 1.
    pub column: u32,
}

impl SourcePos {
    /// Position of the first byte of a file.
    pub const START: SourcePos = SourcePos { line: 1, column: 1 };

    /// Create a position.
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        SourcePos { line, column }
    }
}

impl Default for SourcePos {
    fn default() -> Self {
        SourcePos::START
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}
