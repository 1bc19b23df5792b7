//! Redundant-superinterface detection.

use std::collections::HashMap;

use javelin_syntax::ast::{CompilationUnit, TypeDeclaration, TypeKind};
use javelin_types::{CompilerOptions, DiagnosticCategory, DiagnosticCollector, Severity};

use crate::report;

pub(crate) fn check(
    unit: &CompilationUnit,
    options: &CompilerOptions,
    collector: &mut DiagnosticCollector,
) {
    let Some(severity) = options.severity(DiagnosticCategory::RedundantSuperinterface) else {
        return;
    };

    // Unit-local interface hierarchy: interface name to what it extends.
    let mut extends: HashMap<&str, Vec<&str>> = HashMap::new();
    for ty in &unit.types {
        if ty.kind == TypeKind::Interface {
            extends.insert(
                ty.name.as_str(),
                ty.superinterfaces.iter().map(|s| s.simple_name()).collect(),
            );
        }
    }

    for ty in &unit.types {
        check_type(ty, &extends, severity, collector);
    }
}

fn check_type(
    ty: &TypeDeclaration,
    extends: &HashMap<&str, Vec<&str>>,
    severity: Severity,
    collector: &mut DiagnosticCollector,
) {
    let mut seen: Vec<&str> = Vec::new();
    for iface in &ty.superinterfaces {
        let name = iface.simple_name();
        if seen.contains(&name) {
            report(
                collector,
                severity,
                DiagnosticCategory::RedundantSuperinterface,
                format!("Duplicate interface {} for the type {}", name, ty.name),
                iface.span,
            );
            continue;
        }
        seen.push(name);

        // Already reachable through another listed superinterface?
        if let Some(via) = ty
            .superinterfaces
            .iter()
            .map(|other| other.simple_name())
            .find(|other| *other != name && implies(extends, other, name))
        {
            report(
                collector,
                severity,
                DiagnosticCategory::RedundantSuperinterface,
                format!(
                    "Redundant superinterface {} for the type {}, already defined by {}",
                    name, ty.name, via
                ),
                iface.span,
            );
        }
    }
}

/// Does `from` extend `target`, directly or transitively, within the unit?
fn implies(extends: &HashMap<&str, Vec<&str>>, from: &str, target: &str) -> bool {
    let mut stack = vec![from];
    let mut visited = vec![from];
    while let Some(current) = stack.pop() {
        let Some(supers) = extends.get(current) else {
            continue;
        };
        for sup in supers {
            if *sup == target {
                return true;
            }
            if !visited.contains(sup) {
                visited.push(sup);
                stack.push(sup);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use javelin_syntax::{parse, ParserConfig};
    use javelin_types::{CheckSeverity, Diagnostic};

    use super::*;

    fn check_source(source: &str) -> Vec<Diagnostic> {
        let outcome = parse(source, &ParserConfig::default()).expect("parse aborted");
        assert_eq!(outcome.diagnostics, vec![]);
        let options = CompilerOptions::new().with(
            DiagnosticCategory::RedundantSuperinterface,
            CheckSeverity::Warning,
        );
        let mut collector = DiagnosticCollector::new();
        check(&outcome.unit, &options, &mut collector);
        collector.drain()
    }

    #[test]
    fn duplicate_listing_is_reported_at_the_repeat() {
        let source = "interface I { } class A implements I, I { }";
        let diags = check_source(source);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Duplicate interface I for the type A");
        assert_eq!(diags[0].span.start, source.rfind('I').unwrap());
    }

    #[test]
    fn interface_implied_by_another_is_redundant() {
        let source = "interface I { } interface J extends I { } class A implements J, I { }";
        let diags = check_source(source);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "Redundant superinterface I for the type A, already defined by J"
        );
    }

    #[test]
    fn unrelated_interfaces_are_clean() {
        let source = "interface I { } interface J { } class A implements I, J { }";
        assert_eq!(check_source(source), vec![]);
    }

    #[test]
    fn transitive_implication_is_found() {
        let source = "interface I { } interface J extends I { } interface K extends J { } \
                      class A implements K, I { }";
        let diags = check_source(source);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "Redundant superinterface I for the type A, already defined by K"
        );
    }
}
