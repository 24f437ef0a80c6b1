//! Configurable INPUT source.
//!
//! Mirrors the print handler: the CLI reads whole lines from stdin, tests
//! feed a queue of prepared lines. A drained queue (or stdin EOF) reads as
//! the empty string, which the conversion rules turn into 0 or `""`.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Enum-dispatch input handler.
pub enum InputHandlerImpl {
    /// Read lines from stdin (the CLI default).
    Stdin,
    /// Pop lines from a prepared queue (tests).
    Queue(Mutex<VecDeque<String>>),
}

impl InputHandlerImpl {
    /// Read one line, without its trailing newline.
    pub fn read_line(&self) -> String {
        match self {
            Self::Stdin => {
                let mut line = String::new();
                if std::io::stdin().read_line(&mut line).is_err() {
                    return String::new();
                }
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                line
            }
            Self::Queue(queue) => queue.lock().pop_front().unwrap_or_default(),
        }
    }
}

/// Shared handle to an input handler.
pub type SharedInputHandler = Arc<InputHandlerImpl>;

/// A stdin-backed handler.
pub fn stdin_input() -> SharedInputHandler {
    Arc::new(InputHandlerImpl::Stdin)
}

/// A queue-backed handler for tests.
pub fn queued_input<I, S>(lines: I) -> SharedInputHandler
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let queue = lines.into_iter().map(Into::into).collect();
    Arc::new(InputHandlerImpl::Queue(Mutex::new(queue)))
}
