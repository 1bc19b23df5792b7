//! Lowering from the syntax tree into the body soup.
//!
//! Flattened combined binaries are re-expanded into left-nested binary
//! expressions here, so nothing downstream of the parser observes the
//! compaction. Parenthesized expressions and folded string chains dissolve
//! into their payloads.

use javelin_syntax::ast as syntax;
use javelin_types::Span;

use crate::hir::{
    Arena, BinaryOp, Body, Catch, Expr, ExprId, LiteralKind, Local, LocalId, Stmt, StmtId,
};

#[must_use]
pub fn lower_method(method: &syntax::MethodDeclaration) -> Body {
    let mut ctx = BodyLower::default();
    for argument in &method.arguments {
        let local = ctx.alloc_local(Local {
            ty_text: argument.ty.text.clone(),
            name: argument.name.clone(),
            name_span: argument.name_span,
            span: argument.span,
        });
        ctx.params.push(local);
    }
    let root = match &method.body {
        Some(block) => ctx.lower_block(block),
        None => ctx.alloc_stmt(Stmt::Block {
            statements: Vec::new(),
            span: method.span,
        }),
    };
    Body {
        root,
        params: ctx.params,
        stmts: ctx.stmts,
        exprs: ctx.exprs,
        locals: ctx.locals,
    }
}

#[must_use]
pub fn lower_block(block: &syntax::Block) -> Body {
    let mut ctx = BodyLower::default();
    let root = ctx.lower_block(block);
    Body {
        root,
        params: ctx.params,
        stmts: ctx.stmts,
        exprs: ctx.exprs,
        locals: ctx.locals,
    }
}

#[derive(Default)]
struct BodyLower {
    params: Vec<LocalId>,
    stmts: Arena<Stmt>,
    exprs: Arena<Expr>,
    locals: Arena<Local>,
}

impl BodyLower {
    fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        StmtId::from_raw(self.stmts.alloc(stmt))
    }

    fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        ExprId::from_raw(self.exprs.alloc(expr))
    }

    fn alloc_local(&mut self, local: Local) -> LocalId {
        LocalId::from_raw(self.locals.alloc(local))
    }

    fn lower_block(&mut self, block: &syntax::Block) -> StmtId {
        let mut statements = Vec::with_capacity(block.statements.len());
        for stmt in &block.statements {
            statements.push(self.lower_stmt(stmt));
        }
        self.alloc_stmt(Stmt::Block {
            statements,
            span: block.span,
        })
    }

    fn lower_stmt(&mut self, stmt: &syntax::Statement) -> StmtId {
        match stmt {
            syntax::Statement::Block(block) => self.lower_block(block),
            syntax::Statement::Local(local) => self.lower_local(local),
            syntax::Statement::Expression { expression, span } => {
                let expr = self.lower_expr(expression);
                self.alloc_stmt(Stmt::Expr { expr, span: *span })
            }
            syntax::Statement::If {
                condition,
                then_branch,
                else_branch,
                span,
            } => {
                let condition = self.lower_expr(condition);
                let then_branch = self.lower_stmt(then_branch);
                let else_branch = else_branch.as_ref().map(|s| self.lower_stmt(s));
                self.alloc_stmt(Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                    span: *span,
                })
            }
            syntax::Statement::While {
                condition,
                body,
                span,
            } => {
                let condition = self.lower_expr(condition);
                let body = self.lower_stmt(body);
                self.alloc_stmt(Stmt::While {
                    condition,
                    body,
                    span: *span,
                })
            }
            syntax::Statement::Do {
                body,
                condition,
                span,
            } => {
                let body = self.lower_stmt(body);
                let condition = self.lower_expr(condition);
                self.alloc_stmt(Stmt::Do {
                    body,
                    condition,
                    span: *span,
                })
            }
            syntax::Statement::For {
                init,
                condition,
                update,
                body,
                span,
            } => {
                let init = init.iter().map(|s| self.lower_stmt(s)).collect();
                let condition = condition.as_ref().map(|e| self.lower_expr(e));
                // Update expressions become expression statements so the CFG
                // can sequence them like any other simple statement.
                let update = update
                    .iter()
                    .map(|e| {
                        let expr = self.lower_expr(e);
                        let span = e.span();
                        self.alloc_stmt(Stmt::Expr { expr, span })
                    })
                    .collect();
                let body = self.lower_stmt(body);
                self.alloc_stmt(Stmt::For {
                    init,
                    condition,
                    update,
                    body,
                    span: *span,
                })
            }
            syntax::Statement::Try {
                body,
                catches,
                finally,
                span,
            } => {
                let body = self.lower_block(body);
                let catches = catches
                    .iter()
                    .map(|catch| {
                        let local = self.alloc_local(Local {
                            ty_text: catch.parameter.ty.text.clone(),
                            name: catch.parameter.name.clone(),
                            name_span: catch.parameter.name_span,
                            span: catch.parameter.span,
                        });
                        let body = self.lower_block(&catch.body);
                        Catch { local, body }
                    })
                    .collect();
                let finally = finally.as_ref().map(|block| self.lower_block(block));
                self.alloc_stmt(Stmt::Try {
                    body,
                    catches,
                    finally,
                    span: *span,
                })
            }
            syntax::Statement::Return { value, span } => {
                let expr = value.as_ref().map(|e| self.lower_expr(e));
                self.alloc_stmt(Stmt::Return { expr, span: *span })
            }
            syntax::Statement::Throw { value, span } => {
                let expr = self.lower_expr(value);
                self.alloc_stmt(Stmt::Throw { expr, span: *span })
            }
            syntax::Statement::Break { span } => self.alloc_stmt(Stmt::Break { span: *span }),
            syntax::Statement::Continue { span } => {
                self.alloc_stmt(Stmt::Continue { span: *span })
            }
            syntax::Statement::Empty { span } => self.alloc_stmt(Stmt::Empty { span: *span }),
        }
    }

    fn lower_local(&mut self, local: &syntax::LocalDeclaration) -> StmtId {
        let local_id = self.alloc_local(Local {
            ty_text: local.ty.text.clone(),
            name: local.name.clone(),
            name_span: local.name_span,
            span: local.span,
        });
        let initializer = local.initializer.as_ref().map(|e| self.lower_expr(e));
        self.alloc_stmt(Stmt::Let {
            local: local_id,
            initializer,
            span: local.span,
        })
    }

    fn lower_expr(&mut self, expr: &syntax::Expression) -> ExprId {
        match expr {
            syntax::Expression::StringLiteral(lit) => self.alloc_expr(Expr::Literal {
                kind: LiteralKind::String,
                value: lit.value.clone(),
                span: lit.span,
            }),
            syntax::Expression::ExtendedStringLiteral(lit) => self.alloc_expr(Expr::Literal {
                kind: LiteralKind::String,
                value: lit.value.clone(),
                span: lit.span,
            }),
            syntax::Expression::StringConcatenation(chain) => {
                let value: String = chain.literals.iter().map(|l| l.value.as_str()).collect();
                self.alloc_expr(Expr::Literal {
                    kind: LiteralKind::String,
                    value,
                    span: chain.span,
                })
            }
            syntax::Expression::CharLiteral(lit) => self.alloc_expr(Expr::Literal {
                kind: LiteralKind::Char,
                value: lit.value.to_string(),
                span: lit.span,
            }),
            syntax::Expression::IntLiteral(lit) => self.alloc_expr(Expr::Literal {
                kind: LiteralKind::Int,
                value: lit.text.clone(),
                span: lit.span,
            }),
            syntax::Expression::BoolLiteral(lit) => self.alloc_expr(Expr::Literal {
                kind: LiteralKind::Bool,
                value: lit.value.to_string(),
                span: lit.span,
            }),
            syntax::Expression::NullLiteral(lit) => self.alloc_expr(Expr::Literal {
                kind: LiteralKind::Null,
                value: "null".to_string(),
                span: lit.span,
            }),
            syntax::Expression::SingleName(name) => {
                if name.name.is_empty() {
                    self.alloc_expr(Expr::Missing { span: name.span })
                } else {
                    self.alloc_expr(Expr::Name {
                        name: name.name.clone(),
                        span: name.span,
                    })
                }
            }
            syntax::Expression::QualifiedName(name) => self.lower_qualified(name),
            syntax::Expression::This(this) => self.alloc_expr(Expr::This { span: this.span }),
            syntax::Expression::FieldAccess(fa) => {
                let receiver = self.lower_expr(&fa.receiver);
                self.alloc_expr(Expr::FieldAccess {
                    receiver,
                    name: fa.name.clone(),
                    name_span: fa.name_span,
                    span: fa.span,
                })
            }
            syntax::Expression::MethodCall(mc) => {
                let receiver = mc.receiver.as_ref().map(|r| self.lower_expr(r));
                let args = mc.arguments.iter().map(|a| self.lower_expr(a)).collect();
                self.alloc_expr(Expr::Call {
                    receiver,
                    name: mc.name.clone(),
                    args,
                    span: mc.span,
                })
            }
            syntax::Expression::ArrayAccess(aa) => {
                let array = self.lower_expr(&aa.array);
                let index = self.lower_expr(&aa.index);
                self.alloc_expr(Expr::ArrayIndex {
                    array,
                    index,
                    span: aa.span,
                })
            }
            syntax::Expression::New(alloc) => {
                let args = alloc.arguments.iter().map(|a| self.lower_expr(a)).collect();
                self.alloc_expr(Expr::New {
                    ty_text: alloc.ty.text.clone(),
                    args,
                    span: alloc.span,
                })
            }
            syntax::Expression::Unary(unary) => {
                let operand = self.lower_expr(&unary.operand);
                self.alloc_expr(Expr::Unary {
                    operand,
                    span: unary.span,
                })
            }
            syntax::Expression::Binary(binary) => {
                let lhs = self.lower_expr(&binary.left);
                let rhs = self.lower_expr(&binary.right);
                self.alloc_expr(Expr::Binary {
                    op: lower_binary_op(binary.operator),
                    lhs,
                    rhs,
                    span: binary.span,
                })
            }
            syntax::Expression::CombinedBinary(combined) => self.lower_combined(combined),
            syntax::Expression::InstanceOf(io) => {
                let operand = self.lower_expr(&io.operand);
                self.alloc_expr(Expr::InstanceOf {
                    operand,
                    span: io.span,
                })
            }
            syntax::Expression::Assignment(assign) => {
                let target = self.lower_expr(&assign.target);
                let value = self.lower_expr(&assign.value);
                self.alloc_expr(Expr::Assign {
                    target,
                    value,
                    span: assign.span,
                })
            }
            syntax::Expression::Conditional(cond) => {
                let condition = self.lower_expr(&cond.condition);
                let then_value = self.lower_expr(&cond.then_value);
                let else_value = self.lower_expr(&cond.else_value);
                self.alloc_expr(Expr::Conditional {
                    condition,
                    then_value,
                    else_value,
                    span: cond.span,
                })
            }
            syntax::Expression::Parenthesized(paren) => self.lower_expr(&paren.inner),
        }
    }

    /// Re-expand a flattened run into left-nested binaries.
    fn lower_combined(&mut self, combined: &syntax::CombinedBinaryExpression) -> ExprId {
        let op = lower_binary_op(combined.operator);
        let mut lhs = self.lower_expr(&combined.operands[0]);
        let mut cover = combined.operands[0].span();
        for operand in &combined.operands[1..] {
            cover = cover.cover(operand.span());
            let rhs = self.lower_expr(operand);
            lhs = self.alloc_expr(Expr::Binary {
                op,
                lhs,
                rhs,
                span: cover,
            });
        }
        lhs
    }

    /// `a.b.c` lowers to a field-access chain off a name so null analysis
    /// sees the head dereference. Segment spans are derived from the dotted
    /// text, which carries no interior whitespace.
    fn lower_qualified(&mut self, name: &syntax::QualifiedNameReference) -> ExprId {
        let mut segments = name.path.split('.');
        let head = segments.next().unwrap_or_default();
        let mut offset = name.span.start;
        let head_span = Span::new(offset, offset + head.len());
        offset += head.len();
        let mut expr = self.alloc_expr(Expr::Name {
            name: head.to_string(),
            span: head_span,
        });
        for segment in segments {
            offset += 1; // dot
            let segment_span = Span::new(offset, offset + segment.len());
            offset += segment.len();
            expr = self.alloc_expr(Expr::FieldAccess {
                receiver: expr,
                name: segment.to_string(),
                name_span: segment_span,
                span: Span::new(name.span.start, segment_span.end),
            });
        }
        expr
    }
}

fn lower_binary_op(op: syntax::BinaryOperator) -> BinaryOp {
    match op {
        syntax::BinaryOperator::Plus => BinaryOp::Add,
        syntax::BinaryOperator::Minus => BinaryOp::Sub,
        syntax::BinaryOperator::Times => BinaryOp::Mul,
        syntax::BinaryOperator::Divide => BinaryOp::Div,
        syntax::BinaryOperator::Remainder => BinaryOp::Rem,
        syntax::BinaryOperator::Equals => BinaryOp::Eq,
        syntax::BinaryOperator::NotEquals => BinaryOp::Ne,
        syntax::BinaryOperator::Less => BinaryOp::Lt,
        syntax::BinaryOperator::LessEquals => BinaryOp::Le,
        syntax::BinaryOperator::Greater => BinaryOp::Gt,
        syntax::BinaryOperator::GreaterEquals => BinaryOp::Ge,
        syntax::BinaryOperator::AndAnd => BinaryOp::AndAnd,
        syntax::BinaryOperator::OrOr => BinaryOp::OrOr,
        syntax::BinaryOperator::And | syntax::BinaryOperator::Or | syntax::BinaryOperator::Xor => {
            BinaryOp::Bit
        }
        syntax::BinaryOperator::LeftShift
        | syntax::BinaryOperator::RightShift
        | syntax::BinaryOperator::UnsignedRightShift => BinaryOp::Shift,
    }
}
