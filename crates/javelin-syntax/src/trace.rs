//! Traversal trace collection, used by tests to pin down visit order.
//!
//! Each event is one line: `[v <kind> <text>]` on visit, `[ev <kind> <text>]`
//! on end-visit, with long node text truncated by [`cut`].

use crate::ast::{Expression, Statement};
use crate::render::{render_canonical, render_combined_prefix};
use crate::visit::{AstVisitor, BinaryRef, Descend, NodeRef, Scope};

#[derive(Debug, Default)]
pub struct TraceVisitor {
    out: String,
}

impl TraceVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_trace(self) -> String {
        self.out
    }

    fn record(&mut self, phase: &str, node: NodeRef<'_>) {
        self.out.push('[');
        self.out.push_str(phase);
        self.out.push(' ');
        self.out.push_str(abbreviation(&node));
        self.out.push(' ');
        self.out.push_str(&cut(&node_text(&node)));
        self.out.push_str("]\n");
    }
}

impl AstVisitor for TraceVisitor {
    fn visit(&mut self, node: NodeRef<'_>, _scope: Scope) -> Descend {
        self.record("v", node);
        Descend::Into
    }

    fn end_visit(&mut self, node: NodeRef<'_>, _scope: Scope) {
        self.record("ev", node);
    }
}

/// Truncate to `first20...last7` when longer than 30 characters.
pub fn cut(text: &str) -> String {
    let len = text.chars().count();
    if len <= 30 {
        return text.to_string();
    }
    let head: String = text.chars().take(20).collect();
    let tail: String = text.chars().skip(len - 7).collect();
    format!("{head}...{tail}")
}

fn abbreviation(node: &NodeRef<'_>) -> &'static str {
    match node {
        NodeRef::Unit(_) => "CU",
        NodeRef::Type(_) => "TD",
        NodeRef::Field(_) => "FD",
        NodeRef::Method(_) => "MD",
        NodeRef::Argument(_) => "ARG",
        NodeRef::Local(_) => "LD",
        NodeRef::Block(_) => "BLK",
        NodeRef::Statement(s) => statement_abbreviation(s),
        NodeRef::StringLiteral(_) => "SL",
        NodeRef::Binary(_) => "BE",
        NodeRef::Combined(_) => "CBE",
        NodeRef::JavadocTypeRef(_) => "JSTR",
        NodeRef::Expression(e) => match e {
            Expression::ExtendedStringLiteral(_) => "ESL",
            Expression::StringConcatenation(_) => "SLC",
            Expression::CharLiteral(_) => "CHL",
            Expression::IntLiteral(_) => "IL",
            Expression::BoolLiteral(_) => "BL",
            Expression::NullLiteral(_) => "NL",
            Expression::SingleName(_) => "SNR",
            Expression::QualifiedName(_) => "QNR",
            Expression::This(_) => "THIS",
            Expression::FieldAccess(_) => "FA",
            Expression::MethodCall(_) => "MC",
            Expression::ArrayAccess(_) => "AA",
            Expression::New(_) => "ALLOC",
            Expression::Unary(_) => "UE",
            Expression::InstanceOf(_) => "IOF",
            Expression::Assignment(_) => "ASN",
            Expression::Conditional(_) => "COND",
            Expression::Parenthesized(_) => "PAR",
            Expression::StringLiteral(_) => "SL",
            Expression::Binary(_) => "BE",
            Expression::CombinedBinary(_) => "CBE",
        },
    }
}

fn statement_abbreviation(statement: &Statement) -> &'static str {
    match statement {
        Statement::Block(_) => "BLK",
        Statement::Local(_) => "LD",
        Statement::Expression { .. } => "EXPR",
        Statement::If { .. } => "IF",
        Statement::While { .. } => "WHILE",
        Statement::Do { .. } => "DO",
        Statement::For { .. } => "FOR",
        Statement::Try { .. } => "TRY",
        Statement::Return { .. } => "RET",
        Statement::Throw { .. } => "THROW",
        Statement::Break { .. } => "BRK",
        Statement::Continue { .. } => "CONT",
        Statement::Empty { .. } => "EMPTY",
    }
}

fn node_text(node: &NodeRef<'_>) -> String {
    match node {
        NodeRef::Unit(unit) => unit
            .package
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_default(),
        NodeRef::Type(decl) => decl.name.clone(),
        NodeRef::Field(field) => field.name.clone(),
        NodeRef::Method(method) => method.name.clone(),
        NodeRef::Argument(argument) => argument.name.clone(),
        NodeRef::Local(local) => local.name.clone(),
        NodeRef::Block(_) => "{}".to_string(),
        NodeRef::Statement(statement) => statement_text(statement),
        NodeRef::Expression(expr) => render_canonical(expr),
        NodeRef::StringLiteral(literal) => format!("\"{}\"", literal.value),
        NodeRef::Binary(BinaryRef::Node(binary)) => {
            let mut out = String::from("(");
            out.push_str(&render_canonical(&binary.left));
            out.push(' ');
            out.push_str(binary.operator.as_str());
            out.push(' ');
            out.push_str(&render_canonical(&binary.right));
            out.push(')');
            out
        }
        NodeRef::Binary(BinaryRef::Flattened { combined, upto }) => {
            render_combined_prefix(combined, *upto)
        }
        NodeRef::Combined(combined) => {
            render_combined_prefix(combined, combined.operands.len().saturating_sub(1))
        }
        NodeRef::JavadocTypeRef(type_ref) => type_ref.name.clone(),
    }
}

fn statement_text(statement: &Statement) -> String {
    match statement {
        Statement::Expression { expression, .. } => render_canonical(expression),
        Statement::Return { .. } => "return".to_string(),
        Statement::Throw { .. } => "throw".to_string(),
        Statement::If { .. } => "if".to_string(),
        Statement::While { .. } => "while".to_string(),
        Statement::Do { .. } => "do".to_string(),
        Statement::For { .. } => "for".to_string(),
        Statement::Try { .. } => "try".to_string(),
        Statement::Break { .. } => "break".to_string(),
        Statement::Continue { .. } => "continue".to_string(),
        Statement::Empty { .. } => ";".to_string(),
        Statement::Block(_) | Statement::Local(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn cut_leaves_short_text_alone() {
        assert_eq!(cut("((a + b) + c)"), "((a + b) + c)");
    }

    #[test]
    fn cut_truncates_long_text() {
        let text = "abcdefghijklmnopqrstuvwxyz0123456789";
        assert_eq!(text.len(), 36);
        assert_eq!(cut(text), "abcdefghijklmnopqrst...3456789");
    }
}
