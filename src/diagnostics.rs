//! Structured diagnostics for recoverable ingestion problems.
//!
//! Recoverable problems — a field of the wrong JSON shape, one bad element
//! inside an otherwise good array — never abort a record. They are recorded
//! as [`Diagnostic`] entries on the output batch instead, and the field in
//! question falls back to its default. Plain field absence is the common
//! case and is never recorded.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable code classifying a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum DiagnosticCode {
    /// A field exists but is not of the expected JSON shape.
    ShapeMismatch = 1,
    /// A single element inside a well-shaped array failed coercion.
    MalformedElement = 2,
    /// The top-level `items` array could not be located. Fatal.
    MissingItems = 3,
    /// A record lacks its title or DOI and the parser is configured to
    /// reject such records.
    MissingIdentity = 4,
}

impl DiagnosticCode {
    /// The numeric value of this code.
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// One diagnostic entry.
///
/// The context string follows the `"title: <article title so far>"`
/// convention, so an entry can be correlated with the record that was being
/// processed when it fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Classification of the problem
    pub code: DiagnosticCode,
    /// Short human-readable message
    pub message: String,
    /// Free-text correlation context
    pub context: String,
}

impl Diagnostic {
    pub fn new(
        code: DiagnosticCode,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            context: context.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.message, self.context)
    }
}
