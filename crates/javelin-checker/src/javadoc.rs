//! Cross-reference checks between a method's doc comment and its signature.

use javelin_syntax::ast::{
    CompilationUnit, JavadocOperand, JavadocTagKind, Member, MethodDeclaration,
};
use javelin_types::{CompilerOptions, DiagnosticCategory, DiagnosticCollector, Severity};

use crate::report;

pub(crate) fn check(
    unit: &CompilationUnit,
    options: &CompilerOptions,
    collector: &mut DiagnosticCollector,
) {
    let unexpected = options.severity(DiagnosticCategory::UnexpectedJavadocTag);
    let missing = options.severity(DiagnosticCategory::MissingJavadocTag);
    if unexpected.is_none() && missing.is_none() {
        return;
    }

    for ty in &unit.types {
        for member in &ty.members {
            if let Member::Method(method) = member {
                check_method(method, unexpected, missing, collector);
            }
        }
    }
}

fn check_method(
    method: &MethodDeclaration,
    unexpected: Option<Severity>,
    missing: Option<Severity>,
    collector: &mut DiagnosticCollector,
) {
    // Absent doc comments are not this pass's business; only present ones
    // are cross-referenced.
    let Some(doc) = &method.javadoc else {
        return;
    };

    let mut documented_params: Vec<&str> = Vec::new();
    let mut documented_throws: Vec<&str> = Vec::new();

    for tag in &doc.tags {
        match tag.kind {
            JavadocTagKind::Param => {
                let Some(JavadocOperand::Name { text, span }) = &tag.operand else {
                    continue;
                };
                if method.arguments.iter().any(|arg| arg.name == *text) {
                    if documented_params.contains(&text.as_str()) {
                        // Each duplicate occurrence gets its own diagnostic,
                        // anchored at the duplicate's tag name.
                        if let Some(severity) = unexpected {
                            report(
                                collector,
                                severity,
                                DiagnosticCategory::UnexpectedJavadocTag,
                                "Duplicate tag for parameter".to_string(),
                                tag.name_span,
                            );
                        }
                    } else {
                        documented_params.push(text);
                    }
                } else if let Some(severity) = unexpected {
                    report(
                        collector,
                        severity,
                        DiagnosticCategory::UnexpectedJavadocTag,
                        format!("Parameter {text} is not declared"),
                        *span,
                    );
                }
            }

            JavadocTagKind::Throws => {
                let Some(JavadocOperand::TypeRef(ty_ref)) = &tag.operand else {
                    continue;
                };
                let name = simple_name(&ty_ref.name);
                if method.thrown.iter().any(|t| t.simple_name() == name) {
                    if !documented_throws.contains(&name) {
                        documented_throws.push(name);
                    }
                } else if let Some(severity) = unexpected {
                    report(
                        collector,
                        severity,
                        DiagnosticCategory::UnexpectedJavadocTag,
                        format!("Exception {} is not declared", ty_ref.name),
                        ty_ref.span,
                    );
                }
            }

            JavadocTagKind::Return | JavadocTagKind::See | JavadocTagKind::Unknown => {}
        }
    }

    let Some(severity) = missing else {
        return;
    };

    // Missing-tag diagnostics anchor at the signature, which sits after the
    // comment, so span ordering puts them after any unexpected-tag reports.
    for arg in &method.arguments {
        if !documented_params.contains(&arg.name.as_str()) {
            report(
                collector,
                severity,
                DiagnosticCategory::MissingJavadocTag,
                format!("Missing tag for parameter {}", arg.name),
                arg.name_span,
            );
        }
    }
    for thrown in &method.thrown {
        if !documented_throws.contains(&thrown.simple_name()) {
            report(
                collector,
                severity,
                DiagnosticCategory::MissingJavadocTag,
                format!("Missing tag for declared exception {}", thrown.text),
                thrown.span,
            );
        }
    }
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use javelin_syntax::{parse, ParserConfig};
    use javelin_types::{CheckSeverity, CompilerOptions, DiagnosticCategory, Severity};

    use super::*;

    fn doc_options() -> CompilerOptions {
        let mut options = CompilerOptions::new()
            .with(
                DiagnosticCategory::UnexpectedJavadocTag,
                CheckSeverity::Warning,
            )
            .with(DiagnosticCategory::MissingJavadocTag, CheckSeverity::Warning);
        options.doc_comment_support = true;
        options
    }

    fn check_source(source: &str) -> Vec<javelin_types::Diagnostic> {
        let config = ParserConfig {
            doc_comment_support: true,
            ..ParserConfig::default()
        };
        let outcome = parse(source, &config).expect("parse aborted");
        assert_eq!(outcome.diagnostics, vec![]);
        let mut collector = DiagnosticCollector::new();
        check(&outcome.unit, &doc_options(), &mut collector);
        collector.drain()
    }

    #[test]
    fn duplicate_param_tag_is_reported_at_the_duplicate() {
        let source = "\
class A {
    /**
     * @param s the value
     * @param s again
     */
    void m(String s) { }
}
";
        let diags = check_source(source);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Duplicate tag for parameter");
        // Anchored at the second tag's `@param` text.
        let anchored = &source[diags[0].span.start..diags[0].span.end];
        assert_eq!(anchored, "@param");
        assert!(diags[0].span.start > source.find("the value").unwrap());
    }

    #[test]
    fn undeclared_param_tag_is_unexpected() {
        let source = "\
class A {
    /** @param t wrong */
    void m(String s) { }
}
";
        let messages: Vec<_> = check_source(source)
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Parameter t is not declared".to_string(),
                "Missing tag for parameter s".to_string(),
            ]
        );
    }

    #[test]
    fn missing_tags_sort_after_unexpected_ones() {
        let source = "\
class A {
    /** @param t wrong */
    void m(String s) { }
}
";
        let diags = check_source(source);
        assert_eq!(diags.len(), 2);
        assert!(diags[0].span.start < diags[1].span.start);
        assert_eq!(diags[1].category, DiagnosticCategory::MissingJavadocTag);
        let anchored = &source[diags[1].span.start..diags[1].span.end];
        assert_eq!(anchored, "s");
    }

    #[test]
    fn undeclared_throws_tag_is_unexpected() {
        let source = "\
class A {
    /** @throws java.io.IOException never */
    void m() { }
}
";
        let diags = check_source(source);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "Exception java.io.IOException is not declared"
        );
    }

    #[test]
    fn declared_exception_without_tag_is_missing() {
        let source = "\
class A {
    /** @return nothing */
    void m() throws Exception { }
}
";
        let diags = check_source(source);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "Missing tag for declared exception Exception"
        );
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn fully_documented_method_is_clean() {
        let source = "\
class A {
    /**
     * @param s the value
     * @throws Exception on failure
     */
    void m(String s) throws Exception { }
}
";
        assert_eq!(check_source(source), vec![]);
    }

    #[test]
    fn disabled_categories_do_no_work() {
        let source = "\
class A {
    /** @param t wrong */
    void m(String s) { }
}
";
        let config = ParserConfig {
            doc_comment_support: true,
            ..ParserConfig::default()
        };
        let outcome = parse(source, &config).expect("parse aborted");
        let mut collector = DiagnosticCollector::new();
        check(&outcome.unit, &CompilerOptions::new(), &mut collector);
        assert_eq!(collector.drain(), vec![]);
    }
}
