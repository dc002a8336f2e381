use super::code::ErrorCode;
use crate::core::Span;

/// Severity level of a diagnostic.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// A diagnostic message with location and context.
///
/// The message/span pair is the contract surfaced to callers of
/// `compile`/`decompile`; notes carry secondary detail.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Diagnostic {
    severity: Severity,
    code: ErrorCode,
    message: String,
    span: Span,
    notes: Vec<String>,
}

impl Diagnostic {
    /// Start building an error diagnostic.
    pub fn error(code: ErrorCode, span: Span) -> DiagnosticBuilder {
        DiagnosticBuilder::new(Severity::Error, code, span)
    }

    /// Start building a warning diagnostic.
    pub fn warning(code: ErrorCode, span: Span) -> DiagnosticBuilder {
        DiagnosticBuilder::new(Severity::Warning, code, span)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} at [{}, {}]",
            self.code.as_str(),
            self.message,
            self.span.start().offset(),
            self.span.end().offset()
        )
    }
}

/// Builder for constructing diagnostics.
pub struct DiagnosticBuilder {
    severity: Severity,
    code: ErrorCode,
    span: Span,
    message: Option<String>,
    notes: Vec<String>,
}

impl DiagnosticBuilder {
    fn new(severity: Severity, code: ErrorCode, span: Span) -> Self {
        Self {
            severity,
            code,
            span,
            message: None,
            notes: Vec::new(),
        }
    }

    /// Set the main message. Defaults to the error code's message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Add a note.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Build the diagnostic.
    pub fn build(self) -> Diagnostic {
        Diagnostic {
            severity: self.severity,
            code: self.code,
            message: self.message.unwrap_or_else(|| self.code.message()),
            span: self.span,
            notes: self.notes,
        }
    }
}
