//! AST traversal with prunable descent.
//!
//! Dispatch is a single `visit` over a borrowed tagged view ([`NodeRef`])
//! rather than one method per node type. Returning [`Descend::Skip`] prunes
//! the node's children and suppresses its own `end_visit`; traversal resumes
//! at the next sibling.
//!
//! Combined binary nodes are transparent: unless a visitor opts in via
//! [`AstVisitor::specializes_combined`], the walker re-expands a
//! [`CombinedBinaryExpression`] into the same nested binary visit/end-visit
//! sequence the unflattened tree would produce, so the flattening threshold
//! is unobservable. Degenerate combined nodes (no references table) are
//! always re-expanded, even for specializing visitors.

use javelin_types::Span;

use crate::ast::{
    Annotation, Argument, BinaryExpression, BinaryOperator, Block, CombinedBinaryExpression,
    CompilationUnit, Expression, FieldDeclaration, Javadoc, JavadocOperand,
    JavadocSingleTypeReference, LocalDeclaration, Member, MethodDeclaration, Statement,
    StringLiteral, TypeDeclaration,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Descend {
    Into,
    Skip,
}

/// Lexical context a node is visited in: class-body level or inside a
/// statement block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Class,
    Block,
}

/// A binary expression event. [`BinaryRef::Flattened`] is a virtual view of
/// the left-nested binary covering `operands[0..=upto]` of a combined node;
/// it exists only during traversal.
#[derive(Clone, Copy, Debug)]
pub enum BinaryRef<'a> {
    Node(&'a BinaryExpression),
    Flattened {
        combined: &'a CombinedBinaryExpression,
        upto: usize,
    },
}

impl<'a> BinaryRef<'a> {
    pub fn operator(&self) -> BinaryOperator {
        match self {
            BinaryRef::Node(b) => b.operator,
            BinaryRef::Flattened { combined, .. } => combined.operator,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            BinaryRef::Node(b) => b.span,
            BinaryRef::Flattened { combined, upto } => combined.operands[0]
                .span()
                .cover(combined.operands[*upto].span()),
        }
    }
}

/// Borrowed view over every visitable node.
///
/// Binary and combined expressions dispatch through their own variants;
/// `Expression` never wraps those two. String literals likewise always
/// dispatch as `StringLiteral`, whether standalone or inside an unfolded
/// concatenation chain.
#[derive(Clone, Copy, Debug)]
pub enum NodeRef<'a> {
    Unit(&'a CompilationUnit),
    Type(&'a TypeDeclaration),
    Field(&'a FieldDeclaration),
    Method(&'a MethodDeclaration),
    Argument(&'a Argument),
    Local(&'a LocalDeclaration),
    Block(&'a Block),
    Statement(&'a Statement),
    Expression(&'a Expression),
    StringLiteral(&'a StringLiteral),
    Binary(BinaryRef<'a>),
    Combined(&'a CombinedBinaryExpression),
    JavadocTypeRef(&'a JavadocSingleTypeReference),
}

#[allow(unused_variables)]
pub trait AstVisitor {
    /// Opt in to receiving one [`NodeRef::Combined`] event per flattened run
    /// instead of the re-expanded nested binary events.
    fn specializes_combined(&self) -> bool {
        false
    }

    fn visit(&mut self, node: NodeRef<'_>, scope: Scope) -> Descend {
        Descend::Into
    }

    fn end_visit(&mut self, node: NodeRef<'_>, scope: Scope) {}
}

pub fn walk_unit<V: AstVisitor>(visitor: &mut V, unit: &CompilationUnit) {
    let node = NodeRef::Unit(unit);
    if visitor.visit(node, Scope::Class) == Descend::Skip {
        return;
    }
    for decl in &unit.types {
        walk_type(visitor, decl);
    }
    visitor.end_visit(node, Scope::Class);
}

pub fn walk_type<V: AstVisitor>(visitor: &mut V, decl: &TypeDeclaration) {
    let node = NodeRef::Type(decl);
    if visitor.visit(node, Scope::Class) == Descend::Skip {
        return;
    }
    if let Some(javadoc) = &decl.javadoc {
        walk_javadoc(visitor, javadoc, Scope::Class);
    }
    walk_annotations(visitor, &decl.annotations, Scope::Class);
    for member in &decl.members {
        match member {
            Member::Field(field) => walk_field(visitor, field),
            Member::Method(method) => walk_method(visitor, method),
        }
    }
    visitor.end_visit(node, Scope::Class);
}

pub fn walk_field<V: AstVisitor>(visitor: &mut V, field: &FieldDeclaration) {
    let node = NodeRef::Field(field);
    if visitor.visit(node, Scope::Class) == Descend::Skip {
        return;
    }
    if let Some(javadoc) = &field.javadoc {
        walk_javadoc(visitor, javadoc, Scope::Class);
    }
    walk_annotations(visitor, &field.annotations, Scope::Class);
    if let Some(initializer) = &field.initializer {
        walk_expression(visitor, initializer, Scope::Class);
    }
    visitor.end_visit(node, Scope::Class);
}

pub fn walk_method<V: AstVisitor>(visitor: &mut V, method: &MethodDeclaration) {
    let node = NodeRef::Method(method);
    if visitor.visit(node, Scope::Class) == Descend::Skip {
        return;
    }
    // Javadoc of a method resolves against the method's own scope.
    if let Some(javadoc) = &method.javadoc {
        walk_javadoc(visitor, javadoc, Scope::Block);
    }
    walk_annotations(visitor, &method.annotations, Scope::Class);
    for argument in &method.arguments {
        walk_argument(visitor, argument, Scope::Block);
    }
    if let Some(body) = &method.body {
        walk_block(visitor, body);
    }
    visitor.end_visit(node, Scope::Class);
}

pub fn walk_argument<V: AstVisitor>(visitor: &mut V, argument: &Argument, scope: Scope) {
    let node = NodeRef::Argument(argument);
    if visitor.visit(node, scope) == Descend::Skip {
        return;
    }
    walk_annotations(visitor, &argument.annotations, scope);
    visitor.end_visit(node, scope);
}

pub fn walk_block<V: AstVisitor>(visitor: &mut V, block: &Block) {
    let node = NodeRef::Block(block);
    if visitor.visit(node, Scope::Block) == Descend::Skip {
        return;
    }
    for statement in &block.statements {
        walk_statement(visitor, statement);
    }
    visitor.end_visit(node, Scope::Block);
}

pub fn walk_statement<V: AstVisitor>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::Block(block) => walk_block(visitor, block),
        Statement::Local(local) => walk_local(visitor, local, Scope::Block),
        _ => {
            let node = NodeRef::Statement(statement);
            if visitor.visit(node, Scope::Block) == Descend::Skip {
                return;
            }
            walk_statement_children(visitor, statement);
            visitor.end_visit(node, Scope::Block);
        }
    }
}

pub fn walk_local<V: AstVisitor>(visitor: &mut V, local: &LocalDeclaration, scope: Scope) {
    let node = NodeRef::Local(local);
    if visitor.visit(node, scope) == Descend::Skip {
        return;
    }
    walk_annotations(visitor, &local.annotations, scope);
    if let Some(initializer) = &local.initializer {
        walk_expression(visitor, initializer, scope);
    }
    visitor.end_visit(node, scope);
}

fn walk_statement_children<V: AstVisitor>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::Block(_) | Statement::Local(_) => unreachable!("dispatched by walk_statement"),
        Statement::Expression { expression, .. } => {
            walk_expression(visitor, expression, Scope::Block);
        }
        Statement::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            walk_expression(visitor, condition, Scope::Block);
            walk_statement(visitor, then_branch);
            if let Some(else_branch) = else_branch {
                walk_statement(visitor, else_branch);
            }
        }
        Statement::While {
            condition, body, ..
        } => {
            walk_expression(visitor, condition, Scope::Block);
            walk_statement(visitor, body);
        }
        Statement::Do {
            body, condition, ..
        } => {
            walk_statement(visitor, body);
            walk_expression(visitor, condition, Scope::Block);
        }
        Statement::For {
            init,
            condition,
            update,
            body,
            ..
        } => {
            for stmt in init {
                walk_statement(visitor, stmt);
            }
            if let Some(condition) = condition {
                walk_expression(visitor, condition, Scope::Block);
            }
            for expr in update {
                walk_expression(visitor, expr, Scope::Block);
            }
            walk_statement(visitor, body);
        }
        Statement::Try {
            body,
            catches,
            finally,
            ..
        } => {
            walk_block(visitor, body);
            for catch in catches {
                walk_argument(visitor, &catch.parameter, Scope::Block);
                walk_block(visitor, &catch.body);
            }
            if let Some(finally) = finally {
                walk_block(visitor, finally);
            }
        }
        Statement::Return { value, .. } => {
            if let Some(value) = value {
                walk_expression(visitor, value, Scope::Block);
            }
        }
        Statement::Throw { value, .. } => {
            walk_expression(visitor, value, Scope::Block);
        }
        Statement::Break { .. } | Statement::Continue { .. } | Statement::Empty { .. } => {}
    }
}

pub fn walk_expression<V: AstVisitor>(visitor: &mut V, expr: &Expression, scope: Scope) {
    match expr {
        Expression::Binary(binary) => {
            let node = NodeRef::Binary(BinaryRef::Node(binary));
            if visitor.visit(node, scope) == Descend::Skip {
                return;
            }
            walk_expression(visitor, &binary.left, scope);
            walk_expression(visitor, &binary.right, scope);
            visitor.end_visit(node, scope);
        }
        Expression::CombinedBinary(combined) => {
            if visitor.specializes_combined() && !combined.is_degenerate() {
                let node = NodeRef::Combined(combined);
                if visitor.visit(node, scope) == Descend::Skip {
                    return;
                }
                for operand in &combined.operands {
                    walk_expression(visitor, operand, scope);
                }
                visitor.end_visit(node, scope);
            } else {
                walk_flattened(visitor, combined, combined.arity(), scope);
            }
        }
        Expression::StringLiteral(literal) => {
            let node = NodeRef::StringLiteral(literal);
            if visitor.visit(node, scope) == Descend::Skip {
                return;
            }
            visitor.end_visit(node, scope);
        }
        Expression::StringConcatenation(chain) => {
            let node = NodeRef::Expression(expr);
            if visitor.visit(node, scope) == Descend::Skip {
                return;
            }
            for literal in &chain.literals {
                let child = NodeRef::StringLiteral(literal);
                if visitor.visit(child, scope) == Descend::Into {
                    visitor.end_visit(child, scope);
                }
            }
            visitor.end_visit(node, scope);
        }
        other => {
            let node = NodeRef::Expression(other);
            if visitor.visit(node, scope) == Descend::Skip {
                return;
            }
            walk_expression_children(visitor, other, scope);
            visitor.end_visit(node, scope);
        }
    }
}

/// Replay the nested binary events a combined node stands for.
fn walk_flattened<V: AstVisitor>(
    visitor: &mut V,
    combined: &CombinedBinaryExpression,
    upto: usize,
    scope: Scope,
) {
    debug_assert!(upto >= 1);
    let node = NodeRef::Binary(BinaryRef::Flattened { combined, upto });
    if visitor.visit(node, scope) == Descend::Skip {
        return;
    }
    if upto == 1 {
        walk_expression(visitor, &combined.operands[0], scope);
    } else {
        walk_flattened(visitor, combined, upto - 1, scope);
    }
    walk_expression(visitor, &combined.operands[upto], scope);
    visitor.end_visit(node, scope);
}

fn walk_expression_children<V: AstVisitor>(visitor: &mut V, expr: &Expression, scope: Scope) {
    match expr {
        Expression::Binary(_)
        | Expression::CombinedBinary(_)
        | Expression::StringLiteral(_)
        | Expression::StringConcatenation(_) => unreachable!("dispatched by walk_expression"),
        Expression::ExtendedStringLiteral(_)
        | Expression::CharLiteral(_)
        | Expression::IntLiteral(_)
        | Expression::BoolLiteral(_)
        | Expression::NullLiteral(_)
        | Expression::SingleName(_)
        | Expression::QualifiedName(_)
        | Expression::This(_) => {}
        Expression::FieldAccess(fa) => walk_expression(visitor, &fa.receiver, scope),
        Expression::MethodCall(mc) => {
            if let Some(receiver) = &mc.receiver {
                walk_expression(visitor, receiver, scope);
            }
            for argument in &mc.arguments {
                walk_expression(visitor, argument, scope);
            }
        }
        Expression::ArrayAccess(aa) => {
            walk_expression(visitor, &aa.array, scope);
            walk_expression(visitor, &aa.index, scope);
        }
        Expression::New(alloc) => {
            for argument in &alloc.arguments {
                walk_expression(visitor, argument, scope);
            }
        }
        Expression::Unary(u) => walk_expression(visitor, &u.operand, scope),
        Expression::InstanceOf(io) => walk_expression(visitor, &io.operand, scope),
        Expression::Assignment(a) => {
            walk_expression(visitor, &a.target, scope);
            walk_expression(visitor, &a.value, scope);
        }
        Expression::Conditional(c) => {
            walk_expression(visitor, &c.condition, scope);
            walk_expression(visitor, &c.then_value, scope);
            walk_expression(visitor, &c.else_value, scope);
        }
        Expression::Parenthesized(p) => walk_expression(visitor, &p.inner, scope),
    }
}

fn walk_annotations<V: AstVisitor>(visitor: &mut V, annotations: &[Annotation], scope: Scope) {
    for annotation in annotations {
        match annotation {
            Annotation::Marker(_) => {}
            Annotation::SingleMember(single) => {
                walk_expression(visitor, &single.value, scope);
            }
            Annotation::Normal(normal) => {
                for pair in &normal.pairs {
                    walk_expression(visitor, &pair.value, scope);
                }
            }
        }
    }
}

fn walk_javadoc<V: AstVisitor>(visitor: &mut V, javadoc: &Javadoc, scope: Scope) {
    for tag in &javadoc.tags {
        if let Some(JavadocOperand::TypeRef(type_ref)) = &tag.operand {
            let node = NodeRef::JavadocTypeRef(type_ref);
            if visitor.visit(node, scope) == Descend::Into {
                visitor.end_visit(node, scope);
            }
        }
    }
}
