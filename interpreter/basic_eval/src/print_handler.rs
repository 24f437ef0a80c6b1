//! Configurable PRINT output.
//!
//! Output is routed through an enum-dispatch handler so the CLI writes to
//! stdout while tests capture into a buffer and batch runs can discard
//! output entirely.

use parking_lot::Mutex;
use std::sync::Arc;

/// Writes directly to stdout.
#[derive(Default)]
pub struct StdoutPrintHandler;

impl StdoutPrintHandler {
    /// Write without a newline.
    pub fn print(&self, msg: &str) {
        print!("{msg}");
    }

    /// Write a bare newline.
    pub fn newline(&self) {
        println!();
    }
}

/// Captures output into a buffer for assertions.
#[derive(Default)]
pub struct BufferPrintHandler {
    buffer: Mutex<String>,
}

impl BufferPrintHandler {
    /// Create an empty capture buffer.
    pub fn new() -> Self {
        BufferPrintHandler::default()
    }

    /// Append without a newline.
    pub fn print(&self, msg: &str) {
        self.buffer.lock().push_str(msg);
    }

    /// Append a newline.
    pub fn newline(&self) {
        self.buffer.lock().push('\n');
    }

    /// Everything captured so far.
    pub fn output(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Drop the captured output.
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

/// Enum-dispatch print handler.
pub enum PrintHandlerImpl {
    /// Write to stdout (the CLI default).
    Stdout(StdoutPrintHandler),
    /// Capture to a buffer (tests).
    Buffer(BufferPrintHandler),
    /// Discard everything.
    Silent,
}

impl PrintHandlerImpl {
    /// Write without a newline.
    pub fn print(&self, msg: &str) {
        match self {
            Self::Stdout(h) => h.print(msg),
            Self::Buffer(h) => h.print(msg),
            Self::Silent => {}
        }
    }

    /// Write a newline.
    pub fn newline(&self) {
        match self {
            Self::Stdout(h) => h.newline(),
            Self::Buffer(h) => h.newline(),
            Self::Silent => {}
        }
    }

    /// Captured output; empty for non-capturing handlers.
    pub fn output(&self) -> String {
        match self {
            Self::Buffer(h) => h.output(),
            Self::Stdout(_) | Self::Silent => String::new(),
        }
    }

    /// Clear captured output; a no-op for non-capturing handlers.
    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

/// Shared handle to a print handler.
pub type SharedPrintHandler = Arc<PrintHandlerImpl>;

/// A stdout handler.
pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stdout(StdoutPrintHandler))
}

/// A capturing handler for tests.
pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::new()))
}

/// A discarding handler.
pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Silent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_captures_prints_and_newlines() {
        let handler = BufferPrintHandler::new();
        handler.print("1");
        handler.print(" ");
        handler.print("2");
        handler.newline();
        assert_eq!(handler.output(), "1 2\n");
    }

    #[test]
    fn buffer_clear_empties() {
        let handler = buffer_handler();
        handler.print("x");
        handler.clear();
        assert_eq!(handler.output(), "");
    }

    #[test]
    fn silent_discards() {
        let handler = silent_handler();
        handler.print("x");
        handler.newline();
        assert_eq!(handler.output(), "");
    }
}
