use serde::{Deserialize, Serialize};

use javelin_types::Span;

/// Token kind produced by the scanner.
///
/// This set is intentionally wider than the parsed grammar: keeping the full
/// reserved-keyword surface stable up front means the parser and the checks
/// never have to re-classify identifier text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // --- Trivia ---
    Whitespace,
    LineComment,
    BlockComment,
    /// `/** ... */`
    DocComment,
    /// `///` markdown-style doc comment line.
    MarkdownDocComment,

    // --- Identifiers & literals ---
    Identifier,
    IntLiteral,
    CharLiteral,
    StringLiteral,

    // --- Keywords ---
    AbstractKw,
    BooleanKw,
    BreakKw,
    ByteKw,
    CaseKw,
    CatchKw,
    CharKw,
    ClassKw,
    ContinueKw,
    DefaultKw,
    DoKw,
    DoubleKw,
    ElseKw,
    ExtendsKw,
    FinalKw,
    FinallyKw,
    FloatKw,
    ForKw,
    IfKw,
    ImplementsKw,
    ImportKw,
    InstanceofKw,
    IntKw,
    InterfaceKw,
    LongKw,
    NewKw,
    PackageKw,
    PrivateKw,
    ProtectedKw,
    PublicKw,
    ReturnKw,
    ShortKw,
    StaticKw,
    SuperKw,
    SwitchKw,
    SynchronizedKw,
    ThisKw,
    ThrowKw,
    ThrowsKw,
    TransientKw,
    TryKw,
    VoidKw,
    VolatileKw,
    WhileKw,

    // Literal keywords.
    TrueKw,
    FalseKw,
    NullKw,

    // --- Operators / punctuation ---
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    At,
    Question,
    Colon,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Tilde,
    Bang,

    Eq,
    EqEq,
    BangEq,

    Less,
    LessEq,
    Greater,
    GreaterEq,

    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,

    PlusPlus,
    MinusMinus,

    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,

    LeftShift,
    RightShift,
    UnsignedRightShift,

    // --- Special ---
    Error,
    Eof,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::LineComment
                | TokenKind::BlockComment
                | TokenKind::DocComment
                | TokenKind::MarkdownDocComment
        )
    }

    pub fn is_doc_comment(self) -> bool {
        matches!(self, TokenKind::DocComment | TokenKind::MarkdownDocComment)
    }

    pub fn is_keyword(self) -> bool {
        TokenKind::AbstractKw <= self && self <= TokenKind::NullKw
    }

    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::BooleanKw
                | TokenKind::ByteKw
                | TokenKind::ShortKw
                | TokenKind::IntKw
                | TokenKind::LongKw
                | TokenKind::CharKw
                | TokenKind::FloatKw
                | TokenKind::DoubleKw
        )
    }

    pub fn is_modifier_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::PublicKw
                | TokenKind::PrivateKw
                | TokenKind::ProtectedKw
                | TokenKind::StaticKw
                | TokenKind::AbstractKw
                | TokenKind::FinalKw
                | TokenKind::SynchronizedKw
                | TokenKind::TransientKw
                | TokenKind::VolatileKw
                | TokenKind::DefaultKw
        )
    }

    pub fn from_keyword(text: &str) -> Option<TokenKind> {
        Some(match text {
            "abstract" => TokenKind::AbstractKw,
            "boolean" => TokenKind::BooleanKw,
            "break" => TokenKind::BreakKw,
            "byte" => TokenKind::ByteKw,
            "case" => TokenKind::CaseKw,
            "catch" => TokenKind::CatchKw,
            "char" => TokenKind::CharKw,
            "class" => TokenKind::ClassKw,
            "continue" => TokenKind::ContinueKw,
            "default" => TokenKind::DefaultKw,
            "do" => TokenKind::DoKw,
            "double" => TokenKind::DoubleKw,
            "else" => TokenKind::ElseKw,
            "extends" => TokenKind::ExtendsKw,
            "final" => TokenKind::FinalKw,
            "finally" => TokenKind::FinallyKw,
            "float" => TokenKind::FloatKw,
            "for" => TokenKind::ForKw,
            "if" => TokenKind::IfKw,
            "implements" => TokenKind::ImplementsKw,
            "import" => TokenKind::ImportKw,
            "instanceof" => TokenKind::InstanceofKw,
            "int" => TokenKind::IntKw,
            "interface" => TokenKind::InterfaceKw,
            "long" => TokenKind::LongKw,
            "new" => TokenKind::NewKw,
            "package" => TokenKind::PackageKw,
            "private" => TokenKind::PrivateKw,
            "protected" => TokenKind::ProtectedKw,
            "public" => TokenKind::PublicKw,
            "return" => TokenKind::ReturnKw,
            "short" => TokenKind::ShortKw,
            "static" => TokenKind::StaticKw,
            "super" => TokenKind::SuperKw,
            "switch" => TokenKind::SwitchKw,
            "synchronized" => TokenKind::SynchronizedKw,
            "this" => TokenKind::ThisKw,
            "throw" => TokenKind::ThrowKw,
            "throws" => TokenKind::ThrowsKw,
            "transient" => TokenKind::TransientKw,
            "try" => TokenKind::TryKw,
            "void" => TokenKind::VoidKw,
            "volatile" => TokenKind::VolatileKw,
            "while" => TokenKind::WhileKw,

            "true" => TokenKind::TrueKw,
            "false" => TokenKind::FalseKw,
            "null" => TokenKind::NullKw,

            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}
