//! The compilation driver: scanner, parser, checker passes, flow analysis,
//! one unit at a time.

use javelin_checker::check_unit;
use javelin_flow::analyze;
use javelin_hir::{lower_method, Local};
use javelin_syntax::ast::Member;
use javelin_syntax::{parse, ParserConfig};
use javelin_types::{
    CompileAbort, CompilerOptions, Diagnostic, DiagnosticCollector, LineIndex, Severity,
};

use crate::render::append_unit_report;

/// Everything one compiled unit exposes: its diagnostics in source order,
/// plus the line-number table and local-variable ranges consumed by
/// disassembler-style tooling.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UnitReport {
    pub path: String,
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
    /// Start offset of every line.
    pub line_starts: Vec<usize>,
    /// Locals (parameters included) of every method body, in declaration
    /// order.
    pub locals: Vec<Local>,
}

impl UnitReport {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// This unit's entries in report format, numbered from 1.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        append_unit_report(&mut out, &self.path, &self.text, &self.diagnostics);
        out
    }
}

/// Compile one source text end to end.
///
/// Doc-comment support on the options side switches the parser's doc
/// comment capture on as well, so the checker sees the javadoc it needs.
pub fn compile_unit(
    path: &str,
    text: &str,
    options: &CompilerOptions,
    config: &ParserConfig,
) -> Result<UnitReport, CompileAbort> {
    let _span = tracing::debug_span!("compile_unit", path).entered();

    let mut config = config.clone();
    config.doc_comment_support |= options.doc_comment_support;

    let outcome = parse(text, &config)?;
    let mut collector = DiagnosticCollector::new();
    for diagnostic in outcome.diagnostics {
        collector.report(diagnostic);
    }

    check_unit(text, &outcome.unit, options, &mut collector);

    let mut locals = Vec::new();
    for ty in &outcome.unit.types {
        for member in &ty.members {
            let Member::Method(method) = member else {
                continue;
            };
            let body = lower_method(method);
            for diagnostic in analyze(&body, options) {
                collector.report(diagnostic);
            }
            locals.extend(body.locals.iter().map(|(_, local)| local.clone()));
        }
    }

    let index = LineIndex::new(text);
    Ok(UnitReport {
        path: path.to_string(),
        text: text.to_string(),
        diagnostics: collector.drain(),
        line_starts: index.line_starts().to_vec(),
        locals,
    })
}

/// Compile several units and order the results by path, so the aggregate
/// report reads file-then-line.
pub fn compile_units(
    units: &[(String, String)],
    options: &CompilerOptions,
    config: &ParserConfig,
) -> Result<Vec<UnitReport>, CompileAbort> {
    let mut reports = Vec::with_capacity(units.len());
    for (path, text) in units {
        reports.push(compile_unit(path, text, options, config)?);
    }
    reports.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(reports)
}

/// One aggregate report over several units, sharing a single frame.
/// Numbering restarts at 1 for each unit.
#[must_use]
pub fn render_reports(reports: &[UnitReport]) -> String {
    let mut out = String::new();
    for report in reports {
        append_unit_report(&mut out, &report.path, &report.text, &report.diagnostics);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use javelin_types::{CheckSeverity, DiagnosticCategory};

    use super::*;

    fn null_options() -> CompilerOptions {
        CompilerOptions::new().with(DiagnosticCategory::NullReference, CheckSeverity::Error)
    }

    #[test]
    fn missing_semicolon_report_matches_the_fixture_format() {
        let source = "class A {\n\tvoid m() {\n\t\tint x = 1\n\t}\n}\n";
        let report = compile_unit("A.java", source, &CompilerOptions::new(), &ParserConfig::default())
            .expect("compile aborted");

        assert_eq!(
            report.render(),
            "----------\n\
             1. ERROR in A.java (at line 3)\n\
             \t\t\tint x = 1\n\
             \t\t\t        ^\n\
             Syntax error, insert \";\" to complete LocalVariableDeclarationStatement\n\
             ----------\n"
        );
    }

    #[test]
    fn null_dereference_report_carets_the_receiver() {
        let source = "class A {\n\tvoid m() {\n\t\tString s = null;\n\t\ts.length();\n\t}\n}\n";
        let report = compile_unit("A.java", source, &null_options(), &ParserConfig::default())
            .expect("compile aborted");

        assert_eq!(
            report.render(),
            "----------\n\
             1. ERROR in A.java (at line 4)\n\
             \t\t\ts.length();\n\
             \t\t\t^\n\
             The variable s can only be null at this location\n\
             ----------\n"
        );
    }

    #[test]
    fn unnecessary_nls_tag_on_a_null_line() {
        let source = "class A {\n\tObject o = null; //$NON-NLS-1$\n}\n";
        let options = CompilerOptions::new().with(
            DiagnosticCategory::NonExternalizedString,
            CheckSeverity::Warning,
        );
        let report = compile_unit("A.java", source, &options, &ParserConfig::default())
            .expect("compile aborted");

        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].message, "Unnecessary $NON-NLS$ tag");
        let caret = report.diagnostics[0].caret();
        assert_eq!(&source[caret.start..caret.end], "//$NON-NLS-1$");
        assert!(report.render().contains("1. WARNING in A.java (at line 2)"));
    }

    #[test]
    fn diagnostics_come_out_in_source_order() {
        let source = "class A {\n\tvoid m() {\n\t\tint a = x;\n\t\tint b = y;\n\t}\n}\n";
        let report = compile_unit("A.java", source, &CompilerOptions::new(), &ParserConfig::default())
            .expect("compile aborted");

        let messages: Vec<_> = report.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["x cannot be resolved", "y cannot be resolved"]
        );
    }

    #[test]
    fn aggregate_report_orders_by_path_and_renumbers() {
        let units = vec![
            (
                "B.java".to_string(),
                "class B {\n\tvoid m() {\n\t\tint x = q;\n\t}\n}\n".to_string(),
            ),
            (
                "A.java".to_string(),
                "class A {\n\tvoid m() {\n\t\tint x = p;\n\t}\n}\n".to_string(),
            ),
        ];
        let reports = compile_units(&units, &CompilerOptions::new(), &ParserConfig::default())
            .expect("compile aborted");
        let text = render_reports(&reports);

        let a_pos = text.find("1. ERROR in A.java").expect("A entry");
        let b_pos = text.find("1. ERROR in B.java").expect("B entry");
        assert!(a_pos < b_pos);
    }

    #[test]
    fn line_starts_and_locals_are_exposed() {
        let source = "class A {\n\tvoid m(String s) {\n\t\tint x = 0;\n\t}\n}\n";
        let report = compile_unit("A.java", source, &CompilerOptions::new(), &ParserConfig::default())
            .expect("compile aborted");

        assert_eq!(report.line_starts[0], 0);
        assert_eq!(report.line_starts.len(), 6);
        let names: Vec<_> = report.locals.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["s", "x"]);
    }
}
