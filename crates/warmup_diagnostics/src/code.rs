//! Diagnostic codes with category prefixes for structured error identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Problems that excluded an asset, prefixed with `E`.
    Error,
    /// Problems recovered without excluding the asset, prefixed with `W`.
    Warning,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `E101`, `W301`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// A file could not be opened, read, or stat'ed.
    pub const READ_ERROR: DiagnosticCode = DiagnosticCode::new(Category::Error, 101);
    /// A file is smaller than the 4-byte type probe.
    pub const PROBE_TOO_SMALL: DiagnosticCode = DiagnosticCode::new(Category::Error, 102);
    /// A file changed or vanished between scanning and fingerprinting.
    pub const FINGERPRINT_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Error, 103);
    /// A package header could not be interpreted.
    pub const PARSE_FAILURE: DiagnosticCode = DiagnosticCode::new(Category::Warning, 201);
    /// A declared reference names no scanned asset.
    pub const DANGLING_REFERENCE: DiagnosticCode = DiagnosticCode::new(Category::Warning, 301);
    /// A dependency cycle was broken by removing one edge.
    pub const CYCLE_BROKEN: DiagnosticCode = DiagnosticCode::new(Category::Warning, 302);

    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Error.prefix(), 'E');
        assert_eq!(Category::Warning.prefix(), 'W');
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", DiagnosticCode::READ_ERROR), "E101");
        assert_eq!(format!("{}", DiagnosticCode::CYCLE_BROKEN), "W302");
        assert_eq!(format!("{}", DiagnosticCode::new(Category::Warning, 3)), "W003");
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::DANGLING_REFERENCE;
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
