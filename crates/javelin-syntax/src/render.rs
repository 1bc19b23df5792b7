//! Canonical expression rendering.
//!
//! Binary chains always render in the fully left-parenthesized left-nested
//! form, e.g. `((a + b) + c)`, whether or not the parser flattened the chain
//! into a [`CombinedBinaryExpression`]. Rendering is how that compaction is
//! proven invisible.

use crate::ast::{CombinedBinaryExpression, Expression, UnaryOperator};

pub fn render_canonical(expr: &Expression) -> String {
    let mut out = String::new();
    render_expr(expr, &mut out);
    out
}

/// Canonical form of the left-nested binary covering `operands[0..=upto]` of
/// a combined node.
pub fn render_combined_prefix(combined: &CombinedBinaryExpression, upto: usize) -> String {
    let mut out = String::new();
    render_combined(combined, upto, &mut out);
    out
}

fn render_expr(expr: &Expression, out: &mut String) {
    match expr {
        Expression::StringLiteral(l) => render_string(&l.value, out),
        Expression::ExtendedStringLiteral(l) => render_string(&l.value, out),
        Expression::StringConcatenation(c) => {
            let n = c.literals.len();
            for _ in 1..n {
                out.push('(');
            }
            for (i, lit) in c.literals.iter().enumerate() {
                if i > 0 {
                    out.push_str(" + ");
                }
                render_string(&lit.value, out);
                if i > 0 {
                    out.push(')');
                }
            }
        }
        Expression::CharLiteral(l) => render_char(l.value, out),
        Expression::IntLiteral(l) => out.push_str(&l.text),
        Expression::BoolLiteral(l) => out.push_str(if l.value { "true" } else { "false" }),
        Expression::NullLiteral(_) => out.push_str("null"),
        Expression::SingleName(n) => out.push_str(&n.name),
        Expression::QualifiedName(n) => out.push_str(&n.path),
        Expression::This(_) => out.push_str("this"),
        Expression::FieldAccess(fa) => {
            render_expr(&fa.receiver, out);
            out.push('.');
            out.push_str(&fa.name);
        }
        Expression::MethodCall(mc) => {
            if let Some(receiver) = &mc.receiver {
                render_expr(receiver, out);
                out.push('.');
            }
            out.push_str(&mc.name);
            out.push('(');
            for (i, arg) in mc.arguments.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_expr(arg, out);
            }
            out.push(')');
        }
        Expression::ArrayAccess(aa) => {
            render_expr(&aa.array, out);
            out.push('[');
            render_expr(&aa.index, out);
            out.push(']');
        }
        Expression::New(alloc) => {
            out.push_str("new ");
            out.push_str(&alloc.ty.text);
            out.push('(');
            for (i, arg) in alloc.arguments.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_expr(arg, out);
            }
            out.push(')');
        }
        Expression::Unary(u) => {
            let op = unary_str(u.operator);
            if matches!(
                u.operator,
                UnaryOperator::PostIncrement | UnaryOperator::PostDecrement
            ) {
                render_expr(&u.operand, out);
                out.push_str(op);
            } else {
                out.push_str(op);
                render_expr(&u.operand, out);
            }
        }
        Expression::Binary(b) => {
            out.push('(');
            render_expr(&b.left, out);
            out.push(' ');
            out.push_str(b.operator.as_str());
            out.push(' ');
            render_expr(&b.right, out);
            out.push(')');
        }
        Expression::CombinedBinary(c) => {
            render_combined(c, c.operands.len().saturating_sub(1), out);
        }
        Expression::InstanceOf(io) => {
            out.push('(');
            render_expr(&io.operand, out);
            out.push_str(" instanceof ");
            out.push_str(&io.ty.text);
            out.push(')');
        }
        Expression::Assignment(a) => {
            out.push('(');
            render_expr(&a.target, out);
            out.push(' ');
            out.push_str(a.operator.as_str());
            out.push(' ');
            render_expr(&a.value, out);
            out.push(')');
        }
        Expression::Conditional(c) => {
            out.push('(');
            render_expr(&c.condition, out);
            out.push_str(" ? ");
            render_expr(&c.then_value, out);
            out.push_str(" : ");
            render_expr(&c.else_value, out);
            out.push(')');
        }
        Expression::Parenthesized(p) => {
            out.push('(');
            render_expr(&p.inner, out);
            out.push(')');
        }
    }
}

fn render_combined(combined: &CombinedBinaryExpression, upto: usize, out: &mut String) {
    for _ in 0..upto {
        out.push('(');
    }
    render_expr(&combined.operands[0], out);
    for operand in combined.operands.iter().take(upto + 1).skip(1) {
        out.push(' ');
        out.push_str(combined.operator.as_str());
        out.push(' ');
        render_expr(operand, out);
        out.push(')');
    }
}

fn unary_str(op: UnaryOperator) -> &'static str {
    match op {
        UnaryOperator::Plus => "+",
        UnaryOperator::Minus => "-",
        UnaryOperator::Not => "!",
        UnaryOperator::BitNot => "~",
        UnaryOperator::PreIncrement | UnaryOperator::PostIncrement => "++",
        UnaryOperator::PreDecrement | UnaryOperator::PostDecrement => "--",
    }
}

fn render_string(value: &str, out: &mut String) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
}

fn render_char(value: char, out: &mut String) {
    out.push('\'');
    match value {
        '\'' => out.push_str("\\'"),
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        other => out.push(other),
    }
    out.push('\'');
}

#[cfg(test)]
mod tests {
    use javelin_types::Span;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::{
        BinaryExpression, BinaryOperator, SingleNameReference, StringLiteral,
        StringLiteralConcatenation,
    };

    fn name(n: &str) -> Expression {
        Expression::SingleName(SingleNameReference {
            name: n.to_string(),
            span: Span::new(0, n.len()),
        })
    }

    #[test]
    fn binary_chains_are_fully_left_parenthesized() {
        let ab = Expression::Binary(BinaryExpression {
            left: Box::new(name("a")),
            operator: BinaryOperator::Plus,
            right: Box::new(name("b")),
            span: Span::new(0, 5),
        });
        let abc = Expression::Binary(BinaryExpression {
            left: Box::new(ab),
            operator: BinaryOperator::Plus,
            right: Box::new(name("c")),
            span: Span::new(0, 9),
        });
        assert_eq!(render_canonical(&abc), "((a + b) + c)");
    }

    #[test]
    fn combined_node_renders_like_the_nested_chain() {
        let combined = Expression::CombinedBinary(CombinedBinaryExpression {
            operator: BinaryOperator::Plus,
            operands: vec![name("a"), name("b"), name("c")],
            references: Some(vec![Span::new(0, 5), Span::new(0, 9)]),
            span: Span::new(0, 9),
        });
        assert_eq!(render_canonical(&combined), "((a + b) + c)");
    }

    #[test]
    fn unfolded_literal_chain_renders_nested() {
        let chain = Expression::StringConcatenation(StringLiteralConcatenation {
            literals: vec![
                StringLiteral {
                    value: "a".to_string(),
                    span: Span::new(0, 3),
                },
                StringLiteral {
                    value: "b".to_string(),
                    span: Span::new(6, 9),
                },
                StringLiteral {
                    value: "c".to_string(),
                    span: Span::new(12, 15),
                },
            ],
            span: Span::new(0, 15),
        });
        assert_eq!(render_canonical(&chain), "((\"a\" + \"b\") + \"c\")");
    }

    #[test]
    fn string_values_are_escaped() {
        let lit = Expression::StringLiteral(StringLiteral {
            value: "a\"b\n".to_string(),
            span: Span::new(0, 8),
        });
        assert_eq!(render_canonical(&lit), "\"a\\\"b\\n\"");
    }
}
