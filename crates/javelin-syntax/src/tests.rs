use pretty_assertions::assert_eq;

use javelin_types::Span;

use crate::ast::{
    BinaryOperator, CompilationUnit, Expression, JavadocTagKind, Member, Statement, TypeKind,
};
use crate::parser::{parse, ParserConfig};
use crate::render::render_canonical;
use crate::trace::TraceVisitor;
use crate::visit::{walk_expression, walk_unit, AstVisitor, Descend, NodeRef, Scope};

fn parse_ok(source: &str, config: &ParserConfig) -> CompilationUnit {
    let outcome = parse(source, config).expect("parse aborted");
    assert_eq!(outcome.diagnostics, vec![], "unexpected diagnostics");
    outcome.unit
}

/// Parse `expr` as the initializer of a local declaration and return it.
fn parse_expr(expr: &str, config: &ParserConfig) -> Expression {
    let source = format!("class A {{ void m(String a, String b) {{ Object x = {expr}; }} }}");
    let unit = parse_ok(&source, config);
    let Member::Method(method) = &unit.types[0].members[0] else {
        panic!("expected a method");
    };
    let body = method.body.as_ref().expect("method body");
    let Statement::Local(local) = &body.statements[0] else {
        panic!("expected a local declaration");
    };
    local.initializer.clone().expect("initializer")
}

fn config(threshold: usize) -> ParserConfig {
    ParserConfig {
        combine_threshold: threshold,
        ..ParserConfig::default()
    }
}

// === declarations ===

#[test]
fn parses_compilation_unit_structure() {
    let source = "\
package p.q;

import java.util.List;
import java.io.*;

public class Foo extends Bar implements Baz {
    int count = 0;
    Foo() { }
    String name(int idx) throws java.io.IOException { return null; }
}
";
    let unit = parse_ok(source, &ParserConfig::default());

    assert_eq!(unit.package.as_ref().unwrap().name, "p.q");
    assert_eq!(unit.imports.len(), 2);
    assert_eq!(unit.imports[0].path, "java.util.List");
    assert!(unit.imports[1].on_demand);

    let decl = &unit.types[0];
    assert_eq!(decl.kind, TypeKind::Class);
    assert_eq!(decl.name, "Foo");
    assert_eq!(decl.superclass.as_ref().unwrap().text, "Bar");
    assert_eq!(decl.superinterfaces[0].text, "Baz");
    assert_eq!(decl.members.len(), 3);

    let Member::Field(field) = &decl.members[0] else {
        panic!("expected a field");
    };
    assert_eq!(field.name, "count");
    assert!(field.initializer.is_some());

    let Member::Method(ctor) = &decl.members[1] else {
        panic!("expected a constructor");
    };
    assert_eq!(ctor.return_type, None);

    let Member::Method(method) = &decl.members[2] else {
        panic!("expected a method");
    };
    assert_eq!(method.name, "name");
    assert_eq!(method.arguments.len(), 1);
    assert_eq!(method.thrown[0].text, "java.io.IOException");
}

#[test]
fn interface_extends_list_goes_to_superinterfaces() {
    let unit = parse_ok("interface I extends A, B { void f(); }", &ParserConfig::default());
    let decl = &unit.types[0];
    assert_eq!(decl.kind, TypeKind::Interface);
    assert_eq!(decl.superclass, None);
    assert_eq!(decl.superinterfaces.len(), 2);
    let Member::Method(method) = &decl.members[0] else {
        panic!("expected a method");
    };
    assert_eq!(method.body, None);
}

#[test]
fn statements_parse_with_nesting() {
    let source = "\
class A {
    void m() {
        for (int i = 0; i < 10; i++) {
            if (i == 3) { continue; } else { break; }
        }
        try { f(); } catch (Exception e) { g(); } finally { h(); }
        while (true) { ; }
    }
}
";
    let unit = parse_ok(source, &ParserConfig::default());
    let Member::Method(method) = &unit.types[0].members[0] else {
        panic!("expected a method");
    };
    let body = method.body.as_ref().unwrap();
    assert!(matches!(body.statements[0], Statement::For { .. }));
    let Statement::Try {
        catches, finally, ..
    } = &body.statements[1]
    else {
        panic!("expected try");
    };
    assert_eq!(catches.len(), 1);
    assert_eq!(catches[0].parameter.name, "e");
    assert!(finally.is_some());
    assert!(matches!(body.statements[2], Statement::While { .. }));
}

#[test]
fn qualified_names_stay_name_references() {
    let expr = parse_expr("a.b.c", &ParserConfig::default());
    let Expression::QualifiedName(name) = expr else {
        panic!("expected a qualified name, got {expr:?}");
    };
    assert_eq!(name.path, "a.b.c");

    let expr = parse_expr("f().x", &ParserConfig::default());
    assert!(matches!(expr, Expression::FieldAccess(_)));
}

// === combination policy ===

#[test]
fn short_chains_stay_left_nested() {
    let expr = parse_expr("a + b + c", &ParserConfig::default());
    let Expression::Binary(outer) = expr else {
        panic!("expected a binary node");
    };
    assert!(matches!(*outer.left, Expression::Binary(_)));
    assert!(matches!(*outer.right, Expression::SingleName(_)));
}

#[test]
fn chain_collapses_when_run_reaches_threshold() {
    let expr = parse_expr("a + b + c + d", &config(2));
    // The first two operators collapse; the third starts a fresh run headed
    // by the combined node.
    let Expression::Binary(outer) = expr else {
        panic!("expected a binary node");
    };
    let Expression::CombinedBinary(combined) = outer.left.as_ref() else {
        panic!("expected a combined left operand");
    };
    assert_eq!(combined.operator, BinaryOperator::Plus);
    assert_eq!(combined.arity(), 2);
    let references = combined.references.as_ref().expect("references table");
    assert_eq!(references.len(), 2);
    // Each reference covers one more operand than the previous.
    assert!(references[0].len() < references[1].len());
    assert_eq!(references[1], combined.span);
}

#[test]
fn threshold_one_collapses_every_operator() {
    let expr = parse_expr("a + b + c", &config(1));
    let Expression::CombinedBinary(outer) = expr else {
        panic!("expected a combined node");
    };
    assert_eq!(outer.arity(), 1);
    assert!(matches!(outer.operands[0], Expression::CombinedBinary(_)));
}

#[test]
fn constant_head_makes_degenerate_combined() {
    let expr = parse_expr("1 + a", &config(1));
    let Expression::CombinedBinary(combined) = expr else {
        panic!("expected a combined node");
    };
    assert!(combined.is_degenerate());
    assert_eq!(combined.references, None);
}

#[test]
fn non_constant_head_keeps_references() {
    let expr = parse_expr("a * b + c + d", &config(2));
    let Expression::CombinedBinary(combined) = expr else {
        panic!("expected a combined node");
    };
    assert!(!combined.is_degenerate());
    assert!(matches!(combined.operands[0], Expression::Binary(_)));
}

#[test]
fn non_combinable_operators_never_collapse() {
    let expr = parse_expr("a - b - c - d", &config(1));
    assert!(matches!(expr, Expression::Binary(_)));
}

// === string literal handling ===

#[test]
fn folding_merges_adjacent_literals() {
    let expr = parse_expr("\"ab\" + \"cd\"", &ParserConfig::default());
    let Expression::ExtendedStringLiteral(lit) = expr else {
        panic!("expected a folded literal, got {expr:?}");
    };
    assert_eq!(lit.value, "abcd");
}

#[test]
fn unfolded_literals_form_a_concatenation_chain() {
    let cfg = ParserConfig {
        fold_string_literals: false,
        ..ParserConfig::default()
    };
    let expr = parse_expr("\"a\" + \"b\" + \"c\"", &cfg);
    let Expression::StringConcatenation(chain) = expr else {
        panic!("expected a concatenation chain, got {expr:?}");
    };
    let values: Vec<&str> = chain.literals.iter().map(|l| l.value.as_str()).collect();
    assert_eq!(values, ["a", "b", "c"]);
}

// === rendering ===

#[test]
fn rendering_is_identical_across_thresholds() {
    let expected = "((((a + b) + c) + d) + e)";
    for threshold in [1, 2, 3, 4, 5, 20] {
        let expr = parse_expr("a + b + c + d + e", &config(threshold));
        assert_eq!(
            render_canonical(&expr),
            expected,
            "threshold {threshold} changed rendering"
        );
    }
}

// === traversal ===

#[test]
fn traversal_trace_is_identical_across_thresholds() {
    let source = "class A { void m(String a, String b) { Object x = a + b + a + b + a; } }";
    let mut traces = Vec::new();
    for threshold in [1, 2, 3, 4, 20] {
        let unit = parse_ok(source, &config(threshold));
        let mut visitor = TraceVisitor::new();
        walk_unit(&mut visitor, &unit);
        traces.push(visitor.into_trace());
    }
    for trace in &traces[1..] {
        assert_eq!(trace, &traces[0]);
    }
}

#[derive(Default)]
struct CombinedCounter {
    combined: usize,
    binary_pairs: usize,
}

impl AstVisitor for CombinedCounter {
    fn specializes_combined(&self) -> bool {
        true
    }

    fn visit(&mut self, node: NodeRef<'_>, _scope: Scope) -> Descend {
        if matches!(node, NodeRef::Combined(_)) {
            self.combined += 1;
        }
        Descend::Into
    }

    fn end_visit(&mut self, node: NodeRef<'_>, _scope: Scope) {
        if matches!(node, NodeRef::Binary(_)) {
            self.binary_pairs += 1;
        }
    }
}

#[test]
fn specializing_visitor_sees_one_event_per_run() {
    let expr = parse_expr("a + b + c + d", &config(3));
    let mut counter = CombinedCounter::default();
    walk_expression(&mut counter, &expr, Scope::Block);
    assert_eq!(counter.combined, 1);
    assert_eq!(counter.binary_pairs, 0);
}

#[test]
fn degenerate_combined_is_excluded_from_combined_dispatch() {
    let expr = parse_expr("\"x\" + a", &config(1));
    assert!(matches!(expr, Expression::CombinedBinary(_)));
    let mut counter = CombinedCounter::default();
    walk_expression(&mut counter, &expr, Scope::Block);
    // The degenerate node replays as a plain binary even for a specializing
    // visitor.
    assert_eq!(counter.combined, 0);
    assert_eq!(counter.binary_pairs, 1);
}

struct PruneCalls {
    events: Vec<String>,
}

impl AstVisitor for PruneCalls {
    fn visit(&mut self, node: NodeRef<'_>, _scope: Scope) -> Descend {
        match node {
            NodeRef::Expression(Expression::MethodCall(mc)) => {
                self.events.push(format!("v call {}", mc.name));
                Descend::Skip
            }
            NodeRef::Expression(Expression::SingleName(n)) => {
                self.events.push(format!("v name {}", n.name));
                Descend::Into
            }
            NodeRef::Statement(_) => {
                self.events.push("v stmt".to_string());
                Descend::Into
            }
            _ => Descend::Into,
        }
    }

    fn end_visit(&mut self, node: NodeRef<'_>, _scope: Scope) {
        match node {
            NodeRef::Expression(Expression::MethodCall(mc)) => {
                self.events.push(format!("ev call {}", mc.name));
            }
            NodeRef::Statement(_) => self.events.push("ev stmt".to_string()),
            _ => {}
        }
    }
}

#[test]
fn skip_prunes_descendants_and_own_end_visit() {
    let source = "class A { void m(String a, String b) { f(a); g(b); } }";
    let unit = parse_ok(source, &ParserConfig::default());
    let mut visitor = PruneCalls { events: Vec::new() };
    walk_unit(&mut visitor, &unit);
    // Arguments are never visited, the pruned calls get no end event, and
    // traversal continues with the next sibling statement.
    assert_eq!(
        visitor.events,
        [
            "v stmt", "v call f", "ev stmt", //
            "v stmt", "v call g", "ev stmt",
        ]
    );
}

#[test]
fn two_nested_binary_pairs_for_short_combined_chain() {
    let expr = parse_expr("a + \"l1\" + b", &config(1));
    let mut visitor = TraceVisitor::new();
    walk_expression(&mut visitor, &expr, Scope::Block);
    let expected = "\
[v BE ((a + \"l1\") + b)]
[v BE (a + \"l1\")]
[v SNR a]
[ev SNR a]
[v SL \"l1\"]
[ev SL \"l1\"]
[ev BE (a + \"l1\")]
[v SNR b]
[ev SNR b]
[ev BE ((a + \"l1\") + b)]
";
    assert_eq!(visitor.into_trace(), expected);
}

// === javadoc attachment ===

#[test]
fn doc_comments_attach_when_support_is_enabled() {
    let source = "\
class A {
    /**
     * @param x the input
     */
    void m(int x) { }
}
";
    let cfg = ParserConfig {
        doc_comment_support: true,
        ..ParserConfig::default()
    };
    let unit = parse_ok(source, &cfg);
    let Member::Method(method) = &unit.types[0].members[0] else {
        panic!("expected a method");
    };
    let javadoc = method.javadoc.as_ref().expect("javadoc attached");
    assert_eq!(javadoc.tags.len(), 1);
    assert_eq!(javadoc.tags[0].kind, JavadocTagKind::Param);

    let unit = parse_ok(source, &ParserConfig::default());
    let Member::Method(method) = &unit.types[0].members[0] else {
        panic!("expected a method");
    };
    assert_eq!(method.javadoc, None);
}

// === recovery ===

#[test]
fn missing_semicolon_reports_insertion_after_previous_token() {
    let source = "class A { void m() { int x = 1 } }";
    let outcome = parse(source, &ParserConfig::default()).unwrap();
    assert_eq!(outcome.diagnostics.len(), 1);
    let diagnostic = &outcome.diagnostics[0];
    assert_eq!(
        diagnostic.message,
        "Syntax error, insert \";\" to complete LocalVariableDeclarationStatement"
    );
    let one = source.find('1').unwrap();
    assert_eq!(diagnostic.span, Span::new(one, one + 1));
    // Recovery still produced the declaration.
    let Member::Method(method) = &outcome.unit.types[0].members[0] else {
        panic!("expected a method");
    };
    assert_eq!(method.body.as_ref().unwrap().statements.len(), 1);
}

#[test]
fn unexpected_token_is_reported_and_skipped() {
    let source = "class A { } garbage";
    let outcome = parse(source, &ParserConfig::default()).unwrap();
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(
        outcome.diagnostics[0].message,
        "Syntax error on token \"garbage\", delete this token"
    );
    assert_eq!(outcome.unit.types.len(), 1);
}
