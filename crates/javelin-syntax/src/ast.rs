//! Owned Java AST built by the parser.
//!
//! Nodes are immutable after parse: semantic passes attach side tables keyed
//! by span instead of mutating node shape. Every node carries its source
//! span, and child spans always sit inside the parent's.

use std::fmt;

use javelin_types::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub package: Option<PackageDeclaration>,
    pub imports: Vec<ImportDeclaration>,
    pub types: Vec<TypeDeclaration>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDeclaration {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    pub path: String,
    pub is_static: bool,
    pub on_demand: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub kind: TypeKind,
    pub javadoc: Option<Javadoc>,
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub name_span: Span,
    pub superclass: Option<TypeReference>,
    pub superinterfaces: Vec<TypeReference>,
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Field(FieldDeclaration),
    Method(MethodDeclaration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDeclaration {
    pub javadoc: Option<Javadoc>,
    pub annotations: Vec<Annotation>,
    pub ty: TypeReference,
    pub name: String,
    pub name_span: Span,
    pub initializer: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDeclaration {
    pub javadoc: Option<Javadoc>,
    pub annotations: Vec<Annotation>,
    /// `None` for constructors.
    pub return_type: Option<TypeReference>,
    pub name: String,
    pub name_span: Span,
    pub arguments: Vec<Argument>,
    pub thrown: Vec<TypeReference>,
    /// `None` for abstract/interface methods ending in `;`.
    pub body: Option<Block>,
    pub span: Span,
}

/// A formal parameter (method, constructor, or catch clause).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub annotations: Vec<Annotation>,
    pub ty: TypeReference,
    pub name: String,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDeclaration {
    pub annotations: Vec<Annotation>,
    pub ty: TypeReference,
    pub name: String,
    pub name_span: Span,
    pub initializer: Option<Expression>,
    pub span: Span,
}

/// A (possibly qualified, possibly array) type mention, kept as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    pub text: String,
    pub span: Span,
}

impl TypeReference {
    /// Last dotted segment, array suffix stripped.
    pub fn simple_name(&self) -> &str {
        let base = self.text.trim_end_matches("[]");
        base.rsplit('.').next().unwrap_or(base)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchClause {
    pub parameter: Argument,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Block(Block),
    Local(LocalDeclaration),
    Expression {
        expression: Expression,
        span: Span,
    },
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
        span: Span,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
        span: Span,
    },
    Do {
        body: Box<Statement>,
        condition: Expression,
        span: Span,
    },
    For {
        init: Vec<Statement>,
        condition: Option<Expression>,
        update: Vec<Expression>,
        body: Box<Statement>,
        span: Span,
    },
    Try {
        body: Block,
        catches: Vec<CatchClause>,
        finally: Option<Block>,
        span: Span,
    },
    Return {
        value: Option<Expression>,
        span: Span,
    },
    Throw {
        value: Expression,
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

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Block(b) => b.span,
            Statement::Local(l) => l.span,
            Statement::Expression { span, .. }
            | Statement::If { span, .. }
            | Statement::While { span, .. }
            | Statement::Do { span, .. }
            | Statement::For { span, .. }
            | Statement::Try { span, .. }
            | Statement::Return { span, .. }
            | Statement::Throw { span, .. }
            | Statement::Break { span }
            | Statement::Continue { span }
            | Statement::Empty { span } => *span,
        }
    }
}

// === Expressions ===

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    /// Decoded value, escapes resolved.
    pub value: String,
    pub span: Span,
}

/// A string literal produced by constant-folding two adjacent literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedStringLiteral {
    pub value: String,
    pub span: Span,
}

/// An unfolded chain of >= 2 string literals joined by `+`, retained as a
/// distinct node when constant-folding is disabled so a visitor still
/// observes each original literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteralConcatenation {
    pub literals: Vec<StringLiteral>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharLiteral {
    pub value: char,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntLiteral {
    /// Raw source text, suffix and underscores preserved.
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolLiteral {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullLiteral {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleNameReference {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedNameReference {
    /// Dotted path, e.g. `java.lang.System`.
    pub path: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThisReference {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAccess {
    pub receiver: Box<Expression>,
    pub name: String,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    /// `None` for unqualified calls.
    pub receiver: Option<Box<Expression>>,
    pub name: String,
    pub name_span: Span,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayAccess {
    pub array: Box<Expression>,
    pub index: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationExpression {
    pub ty: TypeReference,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Times,
    Divide,
    Remainder,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Equals,
    NotEquals,
    And,
    Or,
    Xor,
    AndAnd,
    OrOr,
}

impl BinaryOperator {
    /// Operator families whose left-nested runs may be flattened into a
    /// [`CombinedBinaryExpression`].
    pub fn is_combinable(self) -> bool {
        matches!(
            self,
            BinaryOperator::Plus
                | BinaryOperator::Times
                | BinaryOperator::And
                | BinaryOperator::Or
                | BinaryOperator::Xor
                | BinaryOperator::AndAnd
                | BinaryOperator::OrOr
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Times => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
            BinaryOperator::UnsignedRightShift => ">>>",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEquals => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::And => "&",
            BinaryOperator::Or => "|",
            BinaryOperator::Xor => "^",
            BinaryOperator::AndAnd => "&&",
            BinaryOperator::OrOr => "||",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpression {
    pub left: Box<Expression>,
    pub operator: BinaryOperator,
    pub right: Box<Expression>,
    pub span: Span,
}

/// A run of same-operator left-nested binary expressions flattened into one
/// node with an operand list.
///
/// Strictly an internal compaction: traversal and canonical rendering treat
/// it exactly like its unflattened left-nested equivalent. `operands[0]` is
/// the chain head, which may itself be any expression (typically the
/// previous combined node once a chain grows past one collapse).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedBinaryExpression {
    pub operator: BinaryOperator,
    pub operands: Vec<Expression>,
    /// Spans of the intermediate left-nested expressions, innermost first.
    /// `None` marks the degenerate node (constant chain head), which is
    /// excluded from combined-node visitor dispatch.
    pub references: Option<Vec<Span>>,
    pub span: Span,
}

impl CombinedBinaryExpression {
    /// Number of operators folded into this node.
    pub fn arity(&self) -> usize {
        self.operands.len().saturating_sub(1)
    }

    pub fn is_degenerate(&self) -> bool {
        self.references.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceOfExpression {
    pub operand: Box<Expression>,
    pub ty: TypeReference,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    PlusAssign,
    MinusAssign,
    TimesAssign,
    DivideAssign,
    RemainderAssign,
}

impl AssignmentOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::PlusAssign => "+=",
            AssignmentOperator::MinusAssign => "-=",
            AssignmentOperator::TimesAssign => "*=",
            AssignmentOperator::DivideAssign => "/=",
            AssignmentOperator::RemainderAssign => "%=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub target: Box<Expression>,
    pub operator: AssignmentOperator,
    pub value: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalExpression {
    pub condition: Box<Expression>,
    pub then_value: Box<Expression>,
    pub else_value: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenthesizedExpression {
    pub inner: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    StringLiteral(StringLiteral),
    ExtendedStringLiteral(ExtendedStringLiteral),
    StringConcatenation(StringLiteralConcatenation),
    CharLiteral(CharLiteral),
    IntLiteral(IntLiteral),
    BoolLiteral(BoolLiteral),
    NullLiteral(NullLiteral),
    SingleName(SingleNameReference),
    QualifiedName(QualifiedNameReference),
    This(ThisReference),
    FieldAccess(FieldAccess),
    MethodCall(MethodCall),
    ArrayAccess(ArrayAccess),
    New(AllocationExpression),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    CombinedBinary(CombinedBinaryExpression),
    InstanceOf(InstanceOfExpression),
    Assignment(Assignment),
    Conditional(ConditionalExpression),
    Parenthesized(ParenthesizedExpression),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::StringLiteral(n) => n.span,
            Expression::ExtendedStringLiteral(n) => n.span,
            Expression::StringConcatenation(n) => n.span,
            Expression::CharLiteral(n) => n.span,
            Expression::IntLiteral(n) => n.span,
            Expression::BoolLiteral(n) => n.span,
            Expression::NullLiteral(n) => n.span,
            Expression::SingleName(n) => n.span,
            Expression::QualifiedName(n) => n.span,
            Expression::This(n) => n.span,
            Expression::FieldAccess(n) => n.span,
            Expression::MethodCall(n) => n.span,
            Expression::ArrayAccess(n) => n.span,
            Expression::New(n) => n.span,
            Expression::Unary(n) => n.span,
            Expression::Binary(n) => n.span,
            Expression::CombinedBinary(n) => n.span,
            Expression::InstanceOf(n) => n.span,
            Expression::Assignment(n) => n.span,
            Expression::Conditional(n) => n.span,
            Expression::Parenthesized(n) => n.span,
        }
    }

    /// Constant-valued leaves. A chain headed by one of these does not start
    /// a combinable run by itself.
    pub fn is_constant_literal(&self) -> bool {
        matches!(
            self,
            Expression::StringLiteral(_)
                | Expression::ExtendedStringLiteral(_)
                | Expression::StringConcatenation(_)
                | Expression::CharLiteral(_)
                | Expression::IntLiteral(_)
                | Expression::BoolLiteral(_)
                | Expression::NullLiteral(_)
        )
    }
}

// === Annotations ===

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerAnnotation {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleMemberAnnotation {
    pub name: String,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberValuePair {
    pub name: String,
    pub name_span: Span,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalAnnotation {
    pub name: String,
    pub pairs: Vec<MemberValuePair>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Marker(MarkerAnnotation),
    SingleMember(SingleMemberAnnotation),
    Normal(NormalAnnotation),
}

impl Annotation {
    pub fn name(&self) -> &str {
        match self {
            Annotation::Marker(a) => &a.name,
            Annotation::SingleMember(a) => &a.name,
            Annotation::Normal(a) => &a.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Annotation::Marker(a) => a.span,
            Annotation::SingleMember(a) => a.span,
            Annotation::Normal(a) => a.span,
        }
    }
}

// === Javadoc ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JavadocTagKind {
    Param,
    Return,
    Throws,
    See,
    Unknown,
}

/// A type reference appearing only inside a documentation comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavadocSingleTypeReference {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavadocOperand {
    Name { text: String, span: Span },
    TypeRef(JavadocSingleTypeReference),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavadocTag {
    pub kind: JavadocTagKind,
    /// Tag name without the `@`, e.g. `param`.
    pub name: String,
    /// Span of the `@name` text; duplicate-tag diagnostics anchor here.
    pub name_span: Span,
    pub operand: Option<JavadocOperand>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Javadoc {
    pub tags: Vec<JavadocTag>,
    pub span: Span,
}
