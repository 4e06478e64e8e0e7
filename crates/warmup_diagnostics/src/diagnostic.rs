//! Structured diagnostic messages with severity, codes, and the offending path.

use crate::code::{Category, DiagnosticCode};
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A structured diagnostic message tied to an asset path.
///
/// Diagnostics never abort a run. They are collected, sorted, and surfaced in
/// the analysis report and on the terminal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The unique code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// Project-relative path of the asset concerned, if any.
    pub path: Option<String>,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic whose severity follows the code's category.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        let severity = match code.category {
            Category::Error => Severity::Error,
            Category::Warning => Severity::Warning,
        };
        Self {
            severity,
            code,
            message: message.into(),
            path: None,
            notes: Vec::new(),
        }
    }

    /// Attaches the offending asset path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Ordering key used to make diagnostic output independent of worker scheduling.
    pub fn sort_key(&self) -> (&str, DiagnosticCode, &str) {
        (self.path.as_deref().unwrap_or(""), self.code, &self.message)
    }
}
