//! Diagnostic creation, severity management, and terminal rendering.
//!
//! Every per-asset problem the pipeline recovers from (unreadable files,
//! unparseable headers, dangling references, broken cycles) is recorded as a
//! structured [`Diagnostic`]. Worker threads append into the thread-safe
//! [`DiagnosticSink`], which is sorted before anything downstream reads it.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
