//! Unit-local semantic checks over the parsed AST.
//!
//! Each pass is gated by its [`DiagnosticCategory`] in the compiler options;
//! a disabled pass does no work at all. Everything here resolves against the
//! compilation unit alone, there is no classpath.

use javelin_syntax::ast::CompilationUnit;
use javelin_types::{
    CompilerOptions, Diagnostic, DiagnosticCategory, DiagnosticCollector, Severity, Span,
};

mod interfaces;
mod javadoc;
mod nls;
mod resolve;

/// Run every enabled checker pass over one parsed unit.
pub fn check_unit(
    source: &str,
    unit: &CompilationUnit,
    options: &CompilerOptions,
    collector: &mut DiagnosticCollector,
) {
    let _span = tracing::debug_span!("check_unit").entered();
    resolve::check(unit, options, collector);
    interfaces::check(unit, options, collector);
    if options.doc_comment_support {
        javadoc::check(unit, options, collector);
    }
    nls::check(source, options, collector);
}

pub(crate) fn report(
    collector: &mut DiagnosticCollector,
    severity: Severity,
    category: DiagnosticCategory,
    message: String,
    span: Span,
) {
    let diagnostic = match severity {
        Severity::Error => Diagnostic::error(category, message, span),
        Severity::Warning => Diagnostic::warning(category, message, span),
    };
    collector.report(diagnostic);
}
