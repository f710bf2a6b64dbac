//! Severity-tagged notes emitted by the ranking engine and the report commands.

use std::cell::RefCell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Receiver for notes that are not failures, such as skipped entries or
/// fallbacks.
pub trait Diagnostics {
    fn note(&self, severity: Severity, message: &str);

    fn info(&self, message: &str) {
        self.note(Severity::Info, message);
    }

    fn warning(&self, message: &str) {
        self.note(Severity::Warning, message);
    }

    fn error(&self, message: &str) {
        self.note(Severity::Error, message);
    }
}

/// Forwards notes to the `log` facade under the given target.
pub struct LogSink {
    target: &'static str,
}

impl LogSink {
    pub fn new(target: &'static str) -> LogSink {
        LogSink { target }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        LogSink::new(module_path!())
    }
}

impl Diagnostics for LogSink {
    fn note(&self, severity: Severity, message: &str) {
        let level = match severity {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        };
        log::log!(target: self.target, level, "{}", message);
    }
}

/// Keeps every note in memory.
#[derive(Default)]
pub struct Recorder {
    notes: RefCell<Vec<(Severity, String)>>,
}

impl Recorder {
    pub fn new() -> Recorder {
        Recorder::default()
    }

    pub fn notes(&self) -> Vec<(Severity, String)> {
        self.notes.borrow().clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.notes
            .borrow()
            .iter()
            .filter(|(s, _)| *s == severity)
            .count()
    }
}

impl Diagnostics for Recorder {
    fn note(&self, severity: Severity, message: &str) {
        self.notes.borrow_mut().push((severity, message.to_string()));
    }
}
