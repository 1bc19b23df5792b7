//! Unit-local name resolution.
//!
//! There is no classpath: a simple name is resolvable if it names a local,
//! parameter, field of the enclosing type, type declared in the unit, or
//! imported simple name. Qualified names and method selectors are left
//! alone. Unresolved names are ordinary error diagnostics; nothing
//! downstream special-cases them.

use std::collections::HashSet;

use javelin_syntax::ast::{CompilationUnit, Expression, Member, SingleNameReference};
use javelin_syntax::visit::walk_type;
use javelin_syntax::{AstVisitor, Descend, NodeRef, Scope};
use javelin_types::{
    CompilerOptions, DiagnosticCategory, DiagnosticCollector, Severity,
};

use crate::report;

pub(crate) fn check(
    unit: &CompilationUnit,
    options: &CompilerOptions,
    collector: &mut DiagnosticCollector,
) {
    let mut unit_names: HashSet<&str> = unit.types.iter().map(|t| t.name.as_str()).collect();
    for import in &unit.imports {
        if !import.on_demand {
            if let Some(simple) = import.path.rsplit('.').next() {
                unit_names.insert(simple);
            }
        }
    }

    for ty in &unit.types {
        let fields: HashSet<&str> = ty
            .members
            .iter()
            .filter_map(|member| match member {
                Member::Field(field) => Some(field.name.as_str()),
                Member::Method(_) => None,
            })
            .collect();

        let mut resolver = Resolver {
            type_name: &ty.name,
            fields,
            unit_names: &unit_names,
            scopes: Vec::new(),
            unqualified: options.severity(DiagnosticCategory::UnqualifiedFieldAccess),
            collector,
        };
        walk_type(&mut resolver, ty);
    }
}

struct Resolver<'a> {
    type_name: &'a str,
    fields: HashSet<&'a str>,
    unit_names: &'a HashSet<&'a str>,
    /// One entry per open method or block; names declared there.
    scopes: Vec<Vec<String>>,
    unqualified: Option<Severity>,
    collector: &'a mut DiagnosticCollector,
}

impl Resolver<'_> {
    fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(name.to_string());
        }
    }

    fn resolve(&mut self, name: &SingleNameReference) {
        // Error recovery produces empty placeholder names; those already
        // carry a syntax diagnostic.
        if name.name.is_empty() {
            return;
        }

        if self
            .scopes
            .iter()
            .any(|scope| scope.iter().any(|n| n == &name.name))
        {
            return;
        }

        if self.fields.contains(name.name.as_str()) {
            if let Some(severity) = self.unqualified {
                report(
                    self.collector,
                    severity,
                    DiagnosticCategory::UnqualifiedFieldAccess,
                    format!(
                        "Unqualified access to the field {}.{}",
                        self.type_name, name.name
                    ),
                    name.span,
                );
            }
            return;
        }

        if name.name == self.type_name || self.unit_names.contains(name.name.as_str()) {
            return;
        }

        report(
            self.collector,
            Severity::Error,
            DiagnosticCategory::Semantic,
            format!("{} cannot be resolved", name.name),
            name.span,
        );
    }
}

impl AstVisitor for Resolver<'_> {
    fn visit(&mut self, node: NodeRef<'_>, _scope: Scope) -> Descend {
        match node {
            NodeRef::Method(_) | NodeRef::Block(_) => self.scopes.push(Vec::new()),
            NodeRef::Argument(arg) => self.declare(&arg.name),
            NodeRef::Local(local) => self.declare(&local.name),
            NodeRef::Expression(Expression::SingleName(name)) => self.resolve(name),
            _ => {}
        }
        Descend::Into
    }

    fn end_visit(&mut self, node: NodeRef<'_>, _scope: Scope) {
        if matches!(node, NodeRef::Method(_) | NodeRef::Block(_)) {
            self.scopes.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use javelin_syntax::{parse, ParserConfig};
    use javelin_types::{CheckSeverity, Diagnostic};

    use super::*;

    fn check_with(source: &str, options: &CompilerOptions) -> Vec<Diagnostic> {
        let outcome = parse(source, &ParserConfig::default()).expect("parse aborted");
        assert_eq!(outcome.diagnostics, vec![]);
        let mut collector = DiagnosticCollector::new();
        check(&outcome.unit, options, &mut collector);
        collector.drain()
    }

    fn check_source(source: &str) -> Vec<Diagnostic> {
        check_with(source, &CompilerOptions::new())
    }

    #[test]
    fn parameters_and_locals_resolve() {
        let source = "class A { void m(String s) { String t = s; t.length(); } }";
        assert_eq!(check_source(source), vec![]);
    }

    #[test]
    fn unknown_name_cannot_be_resolved() {
        let source = "class A { void m() { int x = y; } }";
        let diags = check_source(source);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "y cannot be resolved");
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(diags[0].span.start, source.find("y;").unwrap());
    }

    #[test]
    fn names_go_out_of_scope_with_their_block() {
        let source = "class A { void m() { { int x = 0; } int y = x; } }";
        let diags = check_source(source);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "x cannot be resolved");
    }

    #[test]
    fn parameters_do_not_leak_between_methods() {
        let source = "class A { void m(int p) { } void n() { int x = p; } }";
        let diags = check_source(source);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "p cannot be resolved");
    }

    #[test]
    fn field_reference_resolves_without_warning_by_default() {
        let source = "class A { int f; void m() { int x = f; } }";
        assert_eq!(check_source(source), vec![]);
    }

    #[test]
    fn unqualified_field_access_is_flagged_when_enabled() {
        let source = "class A { int f; void m() { int x = f; } }";
        let options = CompilerOptions::new().with(
            DiagnosticCategory::UnqualifiedFieldAccess,
            CheckSeverity::Warning,
        );
        let diags = check_with(source, &options);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Unqualified access to the field A.f");
    }

    #[test]
    fn parameter_shadowing_a_field_is_not_flagged() {
        let source = "class A { int f; void m(int f) { int x = f; } }";
        let options = CompilerOptions::new().with(
            DiagnosticCategory::UnqualifiedFieldAccess,
            CheckSeverity::Warning,
        );
        assert_eq!(check_with(source, &options), vec![]);
    }

    #[test]
    fn imported_simple_names_resolve() {
        let source = "import java.util.Collections; class A { Object m() { return Collections; } }";
        assert_eq!(check_source(source), vec![]);
    }

    #[test]
    fn catch_parameter_is_in_scope() {
        let source =
            "class A { void m() { try { } catch (Exception e) { e.toString(); } } }";
        assert_eq!(check_source(source), vec![]);
    }
}
