//! Textual diagnostic reports.
//!
//! The format is fixed and consumed verbatim by test assertions:
//!
//! ```text
//! ----------
//! 1. ERROR in A.java (at line 3)
//!     int x = 1
//!             ^
//! Syntax error, insert ";" to complete LocalVariableDeclarationStatement
//! ----------
//! ```
//!
//! Every entry is framed by `----------` lines and the delimiter is shared
//! between adjacent entries. The source excerpt and the caret line are
//! tab-indented; the caret sits under the diagnostic's fixit span.

use std::fmt::Write as _;

use javelin_types::{Diagnostic, LineIndex};

const DELIMITER: &str = "----------\n";

/// Render one unit's diagnostics, numbered from 1. Empty input renders to
/// the empty string (no frame).
#[must_use]
pub fn render_unit_report(path: &str, source: &str, diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    append_unit_report(&mut out, path, source, diagnostics);
    out
}

/// Append one unit's entries to a report under construction, opening the
/// frame if `out` is still empty. Numbering restarts at 1 for each unit.
pub fn append_unit_report(
    out: &mut String,
    path: &str,
    source: &str,
    diagnostics: &[Diagnostic],
) {
    if diagnostics.is_empty() {
        return;
    }

    let index = LineIndex::new(source);
    if out.is_empty() {
        out.push_str(DELIMITER);
    }
    for (pos, diagnostic) in diagnostics.iter().enumerate() {
        render_entry(out, pos + 1, path, source, &index, diagnostic);
        out.push_str(DELIMITER);
    }
}

fn render_entry(
    out: &mut String,
    number: usize,
    path: &str,
    source: &str,
    index: &LineIndex,
    diagnostic: &Diagnostic,
) {
    let caret = diagnostic.caret();
    let line = index.line_col(caret.start).line;
    let _ = writeln!(
        out,
        "{number}. {} in {path} (at line {})",
        diagnostic.severity,
        line + 1
    );

    let line_span = index.line_span(caret.start);
    let line_text = &source[line_span.start..line_span.end];
    let _ = writeln!(out, "\t{line_text}");

    // Alignment prefix: tabs stay tabs so the caret line renders under the
    // excerpt whatever the tab width.
    out.push('\t');
    for ch in source[line_span.start..caret.start.min(line_span.end)].chars() {
        out.push(if ch == '\t' { '\t' } else { ' ' });
    }
    let width = caret
        .len()
        .min(line_span.end.saturating_sub(caret.start))
        .max(1);
    for _ in 0..width {
        out.push('^');
    }
    out.push('\n');

    let _ = writeln!(out, "{}", diagnostic.message);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use javelin_types::{Diagnostic, DiagnosticCategory, Span};

    use super::*;

    #[test]
    fn single_entry_is_framed() {
        let source = "class A {\n\tint x\n}\n";
        let span = Span::new(source.find('x').unwrap(), source.find('x').unwrap() + 1);
        let diagnostics = vec![Diagnostic::error(
            DiagnosticCategory::Syntax,
            "Syntax error, insert \";\" to complete FieldDeclaration",
            span,
        )];

        let report = render_unit_report("A.java", source, &diagnostics);
        assert_eq!(
            report,
            "----------\n\
             1. ERROR in A.java (at line 2)\n\
             \tint x\n\
             \t\t    ^\n\
             Syntax error, insert \";\" to complete FieldDeclaration\n\
             ----------\n"
        );
    }

    #[test]
    fn adjacent_entries_share_the_delimiter() {
        let source = "a\nb\n";
        let diagnostics = vec![
            Diagnostic::error(DiagnosticCategory::Syntax, "first", Span::new(0, 1)),
            Diagnostic::error(DiagnosticCategory::Syntax, "second", Span::new(2, 3)),
        ];

        let report = render_unit_report("A.java", source, &diagnostics);
        let delimiters = report.matches("----------\n").count();
        assert_eq!(delimiters, 3);
        assert!(report.contains("1. ERROR in A.java (at line 1)"));
        assert!(report.contains("2. ERROR in A.java (at line 2)"));
    }

    #[test]
    fn caret_uses_the_fixit_span_when_present() {
        let source = "String s = \"x\"; //$NON-NLS-2$\n";
        let literal = Span::new(11, 14);
        let tag = Span::new(16, 29);
        let diagnostics = vec![Diagnostic::warning(
            DiagnosticCategory::NonExternalizedString,
            "Unnecessary $NON-NLS$ tag",
            literal,
        )
        .with_caret(tag)];

        let report = render_unit_report("A.java", source, &diagnostics);
        let caret_line = format!("\t{}{}\n", " ".repeat(16), "^".repeat(13));
        assert!(report.contains(&caret_line), "{report}");
    }

    #[test]
    fn empty_diagnostics_render_nothing() {
        assert_eq!(render_unit_report("A.java", "class A { }", &[]), "");
    }

    #[test]
    fn zero_width_span_still_gets_one_caret() {
        let source = "x\n";
        let diagnostics = vec![Diagnostic::error(
            DiagnosticCategory::Syntax,
            "boom",
            Span::new(0, 0),
        )];
        let report = render_unit_report("A.java", source, &diagnostics);
        assert!(report.contains("\t^\n"));
    }
}
