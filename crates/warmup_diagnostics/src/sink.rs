//! Thread-safe diagnostic accumulator for parallel pipeline stages.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// A thread-safe, append-only accumulator for diagnostics.
///
/// Worker threads emit concurrently via [`emit`](Self::emit) in whatever order
/// they finish. The owner drains with [`take_sorted`](Self::take_sorted), which
/// orders by path, code, and message, so the result does not depend on
/// scheduling. The error count is kept outside the mutex.
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    error_count: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            error_count: AtomicUsize::new(0),
        }
    }

    /// Emits a diagnostic into the sink.
    ///
    /// If the diagnostic has [`Severity::Error`], the error count is incremented atomically.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        self.lock().push(diag);
    }

    /// Emits every diagnostic from an iterator.
    pub fn extend(&self, diags: impl IntoIterator<Item = Diagnostic>) {
        for diag in diags {
            self.emit(diag);
        }
    }

    /// Returns the number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Returns the number of diagnostics emitted so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Takes all accumulated diagnostics in sorted order, leaving the sink empty.
    pub fn take_sorted(&self) -> Vec<Diagnostic> {
        let mut all = std::mem::take(&mut *self.lock());
        all.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        all
    }

    // A panicking worker must not take every later diagnostic down with it.
    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DiagnosticCode;

    fn make_error(path: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::READ_ERROR, "unreadable").with_path(path)
    }

    fn make_warning(path: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::PARSE_FAILURE, "bad header").with_path(path)
    }

    #[test]
    fn empty_sink() {
        let sink = DiagnosticSink::new();
        assert_eq!(sink.error_count(), 0);
        assert!(sink.is_empty());
        assert!(sink.take_sorted().is_empty());
    }

    #[test]
    fn emit_error() {
        let sink = DiagnosticSink::new();
        sink.emit(make_error("a"));
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn emit_warning_not_error() {
        let sink = DiagnosticSink::new();
        sink.emit(make_warning("a"));
        assert_eq!(sink.error_count(), 0);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn sorted_by_path() {
        let sink = DiagnosticSink::new();
        sink.emit(make_error("z.uasset"));
        sink.emit(make_warning("a.uasset"));
        sink.emit(make_error("m.uasset"));
        let paths: Vec<_> = sink
            .take_sorted()
            .into_iter()
            .map(|d| d.path.unwrap_or_default())
            .collect();
        assert_eq!(paths, vec!["a.uasset", "m.uasset", "z.uasset"]);
    }

    #[test]
    fn take_sorted_drains() {
        let sink = DiagnosticSink::new();
        sink.extend([make_error("b"), make_warning("a")]);
        assert_eq!(sink.take_sorted().len(), 2);
        assert!(sink.is_empty());
        // The error count is a running total and survives draining.
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let sink = Arc::new(DiagnosticSink::new());
        let mut handles = Vec::new();

        for t in 0..10 {
            let sink = Arc::clone(&sink);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    sink.emit(make_error(&format!("{t}/{i}")));
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(sink.error_count(), 1000);
        assert_eq!(sink.take_sorted().len(), 1000);
    }
}
