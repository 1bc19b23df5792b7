use crate::{Diagnostic, DiagnosticCategory, Severity, Span};

/// Ordered sink for the diagnostics of one compilation unit.
///
/// Diagnostics accumulate in emission order and are drained once at the end
/// of compilation, stably sorted ascending by span start. Emission order
/// breaks ties, so a pass that reports two problems at the same offset keeps
/// their relative order.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn error(
        &mut self,
        category: DiagnosticCategory,
        message: impl Into<String>,
        span: Span,
    ) {
        self.report(Diagnostic::error(category, message, span));
    }

    pub fn warning(
        &mut self,
        category: DiagnosticCategory,
        message: impl Into<String>,
        span: Span,
    ) {
        self.report(Diagnostic::warning(category, message, span));
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Unsorted view, for passes that need to inspect what was reported so far.
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the collector, yielding diagnostics in source order.
    pub fn drain(self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics;
        diagnostics.sort_by_key(|d| d.span.start);
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn diag(start: usize, message: &str) -> Diagnostic {
        Diagnostic::error(
            DiagnosticCategory::Syntax,
            message,
            Span::new(start, start + 1),
        )
    }

    #[test]
    fn drain_sorts_by_span_start() {
        let mut collector = DiagnosticCollector::new();
        collector.report(diag(30, "third"));
        collector.report(diag(5, "first"));
        collector.report(diag(12, "second"));

        let messages: Vec<_> = collector
            .drain()
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn drain_preserves_emission_order_on_ties() {
        let mut collector = DiagnosticCollector::new();
        collector.report(diag(7, "a"));
        collector.report(diag(7, "b"));
        collector.report(diag(7, "c"));

        let messages: Vec<_> = collector
            .drain()
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
    }
}
