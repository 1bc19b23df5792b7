//! String-externalization checks.
//!
//! Works on the token stream, not the AST: every string literal counts,
//! wherever it appears. Literals are numbered 1-based per line and matched
//! against the `//$NON-NLS-<n>$` tags found in that line's comments.

use std::collections::BTreeMap;

use javelin_syntax::lexer::{self, NlsTag};
use javelin_syntax::token::TokenKind;
use javelin_types::{
    CompilerOptions, Diagnostic, DiagnosticCategory, DiagnosticCollector, LineIndex, Severity,
    Span,
};

#[derive(Default)]
struct LineLiterals {
    strings: Vec<Span>,
    tags: Vec<NlsTag>,
}

pub(crate) fn check(
    source: &str,
    options: &CompilerOptions,
    collector: &mut DiagnosticCollector,
) {
    let Some(severity) = options.severity(DiagnosticCategory::NonExternalizedString) else {
        return;
    };

    let index = LineIndex::new(source);
    let mut lines: BTreeMap<u32, LineLiterals> = BTreeMap::new();

    for token in lexer::lex(source) {
        let line = index.line_col(token.span.start).line;
        match token.kind {
            TokenKind::StringLiteral => {
                lines.entry(line).or_default().strings.push(token.span);
            }
            TokenKind::LineComment => {
                let tags = lexer::non_nls_tags(token.text(source), token.span.start);
                if !tags.is_empty() {
                    lines.entry(line).or_default().tags.extend(tags);
                }
            }
            _ => {}
        }
    }

    for line in lines.values() {
        for (pos, literal) in line.strings.iter().enumerate() {
            let number = (pos + 1) as u32;
            if !line.tags.iter().any(|tag| tag.index == number) {
                crate::report(
                    collector,
                    severity,
                    DiagnosticCategory::NonExternalizedString,
                    "Non-externalized string literal".to_string(),
                    *literal,
                );
            }
        }

        for tag in &line.tags {
            if tag.index == 0 || tag.index as usize > line.strings.len() {
                // Reported at the line's first literal when there is one,
                // with the caret on the tag text itself.
                let anchor = line.strings.first().copied().unwrap_or(tag.span);
                let diagnostic = unnecessary_tag(severity, anchor, tag.span);
                collector.report(diagnostic);
            }
        }
    }
}

fn unnecessary_tag(severity: Severity, anchor: Span, tag: Span) -> Diagnostic {
    let diagnostic = match severity {
        Severity::Error => Diagnostic::error(
            DiagnosticCategory::NonExternalizedString,
            "Unnecessary $NON-NLS$ tag",
            anchor,
        ),
        Severity::Warning => Diagnostic::warning(
            DiagnosticCategory::NonExternalizedString,
            "Unnecessary $NON-NLS$ tag",
            anchor,
        ),
    };
    diagnostic.with_caret(tag)
}
