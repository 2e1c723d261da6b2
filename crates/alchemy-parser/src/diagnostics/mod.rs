//! Diagnostics infrastructure: structured records, an ordered sink with
//! cascade suppression, and a snippet renderer.

mod code;
mod printer;

use indexmap::IndexSet;
use rowan::TextRange;
use serde::Serialize;

pub use code::{ErrorCode, Severity};
pub use printer::DiagnosticsPrinter;

/// A diagnostic with a stable code, source range, and optional note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    #[serde(serialize_with = "serialize_range")]
    pub range: TextRange,
    pub message: String,
    pub note: Option<String>,
}

fn serialize_range<S: serde::Serializer>(range: &TextRange, s: S) -> Result<S::Ok, S::Error> {
    let pair = (u32::from(range.start()), u32::from(range.end()));
    pair.serialize(s)
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.severity,
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        if let Some(note) = &self.note {
            write!(f, " (note: {note})")?;
        }
        Ok(())
    }
}

/// Insertion-ordered collection of diagnostics.
///
/// Reporting the same code at the same start offset twice is a no-op, which
/// suppresses cascades when recovery re-visits a bad token. The sink can be
/// truncated back to a length to support speculative parsing.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
    seen: IndexSet<(ErrorCode, u32)>,
}

/// Builder for a diagnostic message.
#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    sink: &'a mut Diagnostics,
    diagnostic: Diagnostic,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, code: ErrorCode, range: TextRange) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostic: Diagnostic {
                code,
                severity: code.severity(),
                range,
                message: code.default_message().to_string(),
                note: None,
            },
            sink: self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.messages
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    /// Discards every diagnostic emitted after `len` entries. Used when a
    /// speculative scan is abandoned.
    pub fn truncate(&mut self, len: usize) {
        while self.messages.len() > len {
            let dropped = self.messages.pop().expect("len checked");
            self.seen
                .shift_remove(&(dropped.code, u32::from(dropped.range.start())));
        }
    }

    pub fn printer<'a>(&'a self, source: &'a str) -> DiagnosticsPrinter<'a> {
        DiagnosticsPrinter::new(self.as_slice(), source)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl DiagnosticBuilder<'_> {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.diagnostic.message = message.into();
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.diagnostic.note = Some(note.into());
        self
    }

    pub fn emit(self) {
        let key = (
            self.diagnostic.code,
            u32::from(self.diagnostic.range.start()),
        );
        if self.sink.seen.insert(key) {
            self.sink.messages.push(self.diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn dedup_by_code_and_start() {
        let mut sink = Diagnostics::new();
        sink.report(ErrorCode::SemicolonExpected, range(4, 5)).emit();
        sink.report(ErrorCode::SemicolonExpected, range(4, 9)).emit();
        sink.report(ErrorCode::SemicolonExpected, range(7, 8)).emit();
        sink.report(ErrorCode::RbraceExpected, range(4, 5)).emit();
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn truncate_forgets_dedup_keys() {
        let mut sink = Diagnostics::new();
        sink.report(ErrorCode::TypeExpected, range(0, 1)).emit();
        let mark = sink.len();
        sink.report(ErrorCode::IdentifierExpected, range(2, 3)).emit();
        sink.truncate(mark);
        assert_eq!(sink.len(), 1);
        // After a rollback the same report must be emittable again.
        sink.report(ErrorCode::IdentifierExpected, range(2, 3)).emit();
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn severity_comes_from_code() {
        let mut sink = Diagnostics::new();
        sink.report(ErrorCode::IntOverflow, range(0, 4)).emit();
        assert!(sink.has_errors());
        assert_eq!(sink.as_slice()[0].severity, Severity::Error);
    }

    #[test]
    fn custom_message_and_note() {
        let mut sink = Diagnostics::new();
        sink.report(ErrorCode::SyntaxError, range(1, 2))
            .message("expected '>'")
            .note("to close the type argument list")
            .emit();
        let d = &sink.as_slice()[0];
        assert_eq!(d.message, "expected '>'");
        assert_eq!(d.note.as_deref(), Some("to close the type argument list"));
    }
}
