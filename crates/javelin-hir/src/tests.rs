use pretty_assertions::assert_eq;

use javelin_syntax::ast::{Member, MethodDeclaration};
use javelin_syntax::{parse, ParserConfig};

use crate::{lower_method, BinaryOp, Body, Expr, LiteralKind, Stmt};

fn method_of(source: &str, config: &ParserConfig) -> MethodDeclaration {
    let outcome = parse(source, config).expect("parse aborted");
    assert_eq!(outcome.diagnostics, vec![]);
    let Member::Method(method) = &outcome.unit.types[0].members[0] else {
        panic!("expected a method");
    };
    method.clone()
}

fn lower(source: &str) -> Body {
    lower_method(&method_of(source, &ParserConfig::default()))
}

#[test]
fn parameters_become_entry_locals() {
    let body = lower("class A { void m(String s, int n) { } }");
    assert_eq!(body.params.len(), 2);
    assert_eq!(body.locals[body.params[0]].name, "s");
    assert_eq!(body.locals[body.params[0]].ty_text, "String");
    assert_eq!(body.locals[body.params[1]].name, "n");
}

#[test]
fn local_declaration_lowers_to_let() {
    let body = lower("class A { void m() { String s = null; s.length(); } }");
    let Stmt::Block { statements, .. } = &body.stmts[body.root] else {
        panic!("expected root block");
    };
    assert_eq!(statements.len(), 2);

    let Stmt::Let {
        local, initializer, ..
    } = &body.stmts[statements[0]]
    else {
        panic!("expected let");
    };
    assert_eq!(body.locals[*local].name, "s");
    let init = initializer.expect("initializer");
    assert_eq!(
        body.exprs[init],
        Expr::Literal {
            kind: LiteralKind::Null,
            value: "null".to_string(),
            span: body.exprs[init].span(),
        }
    );

    let Stmt::Expr { expr, .. } = &body.stmts[statements[1]] else {
        panic!("expected expression statement");
    };
    let Expr::Call { receiver, name, .. } = &body.exprs[*expr] else {
        panic!("expected call");
    };
    assert_eq!(name, "length");
    let receiver = receiver.expect("receiver");
    assert!(matches!(body.exprs[receiver], Expr::Name { .. }));
}

#[test]
fn combined_binary_lowers_to_left_nested_chain() {
    let config = ParserConfig {
        combine_threshold: 1,
        ..ParserConfig::default()
    };
    let method = method_of("class A { void m(int a, int b, int c) { int x = a + b + c; } }", &config);
    let body = lower_method(&method);

    let Stmt::Block { statements, .. } = &body.stmts[body.root] else {
        panic!("expected root block");
    };
    let Stmt::Let {
        initializer: Some(init),
        ..
    } = &body.stmts[statements[0]]
    else {
        panic!("expected let with initializer");
    };
    // ((a + b) + c), regardless of the parser's flattening.
    let Expr::Binary { op, lhs, rhs, .. } = &body.exprs[*init] else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(body.exprs[*rhs], Expr::Name { .. }));
    let Expr::Binary {
        lhs: inner_lhs,
        rhs: inner_rhs,
        ..
    } = &body.exprs[*lhs]
    else {
        panic!("expected nested binary");
    };
    assert!(matches!(body.exprs[*inner_lhs], Expr::Name { .. }));
    assert!(matches!(body.exprs[*inner_rhs], Expr::Name { .. }));
}

#[test]
fn qualified_name_lowers_to_field_chain() {
    let body = lower("class A { void m(Foo a) { int x = a.b.c; } }");
    let Stmt::Block { statements, .. } = &body.stmts[body.root] else {
        panic!("expected root block");
    };
    let Stmt::Let {
        initializer: Some(init),
        ..
    } = &body.stmts[statements[0]]
    else {
        panic!("expected let");
    };
    let Expr::FieldAccess { receiver, name, .. } = &body.exprs[*init] else {
        panic!("expected field access");
    };
    assert_eq!(name, "c");
    let Expr::FieldAccess {
        receiver: head,
        name: mid,
        ..
    } = &body.exprs[*receiver]
    else {
        panic!("expected nested field access");
    };
    assert_eq!(mid, "b");
    let Expr::Name { name: base, .. } = &body.exprs[*head] else {
        panic!("expected name head");
    };
    assert_eq!(base, "a");
}

#[test]
fn try_catch_lowers_catch_parameter_as_local() {
    let body = lower(
        "class A { void m() { try { f(); } catch (Exception e) { g(); } finally { h(); } } }",
    );
    let Stmt::Block { statements, .. } = &body.stmts[body.root] else {
        panic!("expected root block");
    };
    let Stmt::Try {
        catches, finally, ..
    } = &body.stmts[statements[0]]
    else {
        panic!("expected try");
    };
    assert_eq!(catches.len(), 1);
    assert_eq!(body.locals[catches[0].local].name, "e");
    assert!(finally.is_some());
}

#[test]
fn shadowing_resolves_to_last_declaration() {
    let body = lower("class A { void m(String s) { { String s = null; } } }");
    let id = body.local_by_name("s").expect("local");
    // Two locals named `s`; lookup returns the inner declaration.
    assert_eq!(body.locals.len(), 2);
    assert_eq!(id, body.local_by_name("s").unwrap());
    assert_ne!(id, body.params[0]);
}
