//! Shared types used across Javelin crates.
//!
//! Everything here is a leaf: spans, diagnostics, the per-compilation
//! configuration map, and the ordered diagnostic collector. No crate below
//! this one knows about source syntax.

use std::fmt;

use serde::{Deserialize, Serialize};

mod collector;
mod options;
mod text;

pub use collector::DiagnosticCollector;
pub use options::{CheckSeverity, CompilerOptions, DiagnosticCategory};
pub use text::{LineCol, LineIndex};

/// A byte-span into a source string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// A single compiler problem anchored to a source position.
///
/// `caret_span` is the range the report renderer underlines; it may differ
/// from `span` (e.g. an unnecessary `$NON-NLS$` tag reports at the string
/// literal but carets the tag text). When absent, `span` is underlined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: DiagnosticCategory,
    pub message: String,
    pub span: Span,
    pub caret_span: Option<Span>,
}

impl Diagnostic {
    pub fn error(category: DiagnosticCategory, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            category,
            message: message.into(),
            span,
            caret_span: None,
        }
    }

    pub fn warning(category: DiagnosticCategory, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            message: message.into(),
            span,
            caret_span: None,
        }
    }

    pub fn with_caret(mut self, caret_span: Span) -> Self {
        self.caret_span = Some(caret_span);
        self
    }

    /// The span the renderer underlines.
    pub fn caret(&self) -> Span {
        self.caret_span.unwrap_or(self.span)
    }
}

/// Fatal internal-consistency failure.
///
/// Ordinary problems are [`Diagnostic`]s; this is raised only when the
/// front end cannot make progress at all (e.g. the parser found no valid
/// recovery token). Callers must treat it as a compilation abort, not as a
/// reportable problem list.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("compilation aborted: {reason}")]
pub struct CompileAbort {
    pub reason: String,
}

impl CompileAbort {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
