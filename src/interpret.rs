//! Section interpreters: one per section kind, each a pure function from
//! raw section text to structured records.
//!
//! Every interpreter succeeds partially. The result is always a
//! `(records, diagnostics)` pair: a section with some malformed
//! declarations still yields everything it could parse, and the lines it
//! could not parse become [`Diagnostic`] entries instead of errors.
//! Failures are data, not exceptions.

pub mod attributes;
pub mod format;
pub mod gui;
pub mod identifiers;

/// One line an interpreter could not make sense of.
///
/// `line` is 1-based and relative to the section body; the assembler
/// rebases it onto the file before recording a defect.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Diagnostic {
            line,
            message: message.into(),
        }
    }
}

/// Shared line filter: blank lines, `//` comments and stray brace lines
/// carry no declarations in any section kind.
pub(crate) fn is_noise_line(trimmed: &str) -> bool {
    trimmed.is_empty()
        || trimmed.starts_with("//")
        || trimmed.chars().all(|c| matches!(c, '{' | '}' | ';' | ' '))
}
