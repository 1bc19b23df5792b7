use std::fmt;

use javelin_types::Span;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        ExprId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtId(u32);

impl StmtId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        StmtId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StmtId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(u32);

impl LocalId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        LocalId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalId({})", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena<T> {
    data: Vec<T>,
}

impl<T> Arena<T> {
    pub fn alloc(&mut self, value: T) -> u32 {
        let idx = self.data.len() as u32;
        self.data.push(value);
        idx
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (i as u32, v))
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena { data: Vec::new() }
    }
}

impl<T> std::ops::Index<ExprId> for Arena<T> {
    type Output = T;

    fn index(&self, index: ExprId) -> &Self::Output {
        &self.data[index.idx()]
    }
}

impl<T> std::ops::Index<StmtId> for Arena<T> {
    type Output = T;

    fn index(&self, index: StmtId) -> &Self::Output {
        &self.data[index.idx()]
    }
}

impl<T> std::ops::Index<LocalId> for Arena<T> {
    type Output = T;

    fn index(&self, index: LocalId) -> &Self::Output {
        &self.data[index.idx()]
    }
}

/// One lowered method body: statement/expression soup plus the locals
/// (parameters included) it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub root: StmtId,
    /// Parameters, in declaration order, as locals live from entry.
    pub params: Vec<LocalId>,
    pub stmts: Arena<Stmt>,
    pub exprs: Arena<Expr>,
    pub locals: Arena<Local>,
}

impl Body {
    #[must_use]
    pub fn empty(span: Span) -> Self {
        let mut stmts = Arena::default();
        let root = StmtId::from_raw(stmts.alloc(Stmt::Block {
            statements: Vec::new(),
            span,
        }));
        Body {
            root,
            params: Vec::new(),
            stmts,
            exprs: Arena::default(),
            locals: Arena::default(),
        }
    }

    /// Find the local a plain name expression refers to, innermost
    /// declaration winning. Lowering allocates locals in source order, so
    /// the last match is the shadowing one.
    #[must_use]
    pub fn local_by_name(&self, name: &str) -> Option<LocalId> {
        let mut found = None;
        for (raw, local) in self.locals.iter() {
            if local.name == name {
                found = Some(LocalId::from_raw(raw));
            }
        }
        found
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Local {
    pub ty_text: String,
    pub name: String,
    pub name_span: Span,
    /// Declaration span; the variable is live from here to the end of its
    /// enclosing block.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catch {
    pub local: LocalId,
    pub body: StmtId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Block {
        statements: Vec<StmtId>,
        span: Span,
    },
    Let {
        local: LocalId,
        initializer: Option<ExprId>,
        span: Span,
    },
    Expr {
        expr: ExprId,
        span: Span,
    },
    If {
        condition: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
        span: Span,
    },
    While {
        condition: ExprId,
        body: StmtId,
        span: Span,
    },
    Do {
        body: StmtId,
        condition: ExprId,
        span: Span,
    },
    For {
        init: Vec<StmtId>,
        condition: Option<ExprId>,
        /// Update expressions, lowered as expression statements.
        update: Vec<StmtId>,
        body: StmtId,
        span: Span,
    },
    Try {
        body: StmtId,
        catches: Vec<Catch>,
        finally: Option<StmtId>,
        span: Span,
    },
    Return {
        expr: Option<ExprId>,
        span: Span,
    },
    Throw {
        expr: ExprId,
        span: Span,
    },
    Break {
        span: Span,
    },
    Continue {
        span: Span,
    },
    Empty {
        span: Span,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    String,
    Char,
    Bool,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bit,
    Shift,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Name {
        name: String,
        span: Span,
    },
    Literal {
        kind: LiteralKind,
        value: String,
        span: Span,
    },
    This {
        span: Span,
    },
    FieldAccess {
        receiver: ExprId,
        name: String,
        name_span: Span,
        span: Span,
    },
    Call {
        /// `None` for unqualified calls; `Some` makes this a dereference of
        /// the receiver.
        receiver: Option<ExprId>,
        name: String,
        args: Vec<ExprId>,
        span: Span,
    },
    ArrayIndex {
        array: ExprId,
        index: ExprId,
        span: Span,
    },
    New {
        ty_text: String,
        args: Vec<ExprId>,
        span: Span,
    },
    Unary {
        operand: ExprId,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
        span: Span,
    },
    Assign {
        target: ExprId,
        value: ExprId,
        span: Span,
    },
    Conditional {
        condition: ExprId,
        then_value: ExprId,
        else_value: ExprId,
        span: Span,
    },
    InstanceOf {
        operand: ExprId,
        span: Span,
    },
    Missing {
        span: Span,
    },
}

impl Expr {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Expr::Name { span, .. }
            | Expr::Literal { span, .. }
            | Expr::This { span }
            | Expr::FieldAccess { span, .. }
            | Expr::Call { span, .. }
            | Expr::ArrayIndex { span, .. }
            | Expr::New { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Conditional { span, .. }
            | Expr::InstanceOf { span, .. }
            | Expr::Missing { span } => *span,
        }
    }
}
