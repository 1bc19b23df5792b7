use javelin_types::Span;

use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

/// A `//$NON-NLS-<n>$` externalization marker found inside a line comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NlsTag {
    /// The 1-based literal index the tag claims to cover.
    pub index: u32,
    /// Span of the full `//$NON-NLS-<n>$` tag text.
    pub span: Span,
}

pub fn lex(text: &str) -> Vec<Token> {
    lex_with_errors(text).0
}

pub fn lex_with_errors(text: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut lexer = Lexer::new(text);
    lexer.run();
    (lexer.tokens, lexer.errors)
}

struct Lexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            let start = self.pos;
            let kind = self.next_kind();
            debug_assert!(self.pos > start, "lexer must always make progress");
            self.tokens.push(Token {
                kind,
                span: Span::new(start, self.pos),
            });
        }
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.text.len(), self.text.len()),
        });
    }

    fn next_kind(&mut self) -> TokenKind {
        let start = self.pos;
        let b = self.bytes[self.pos];

        if b.is_ascii_whitespace() {
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            return TokenKind::Whitespace;
        }

        if b == b'/' {
            match self.bytes.get(self.pos + 1) {
                Some(b'/') => return self.line_comment(),
                Some(b'*') => return self.block_comment(start),
                Some(b'=') => {
                    self.pos += 2;
                    return TokenKind::SlashEq;
                }
                _ => {
                    self.pos += 1;
                    return TokenKind::Slash;
                }
            }
        }

        if b == b'"' {
            return self.string_literal(start);
        }
        if b == b'\'' {
            return self.char_literal(start);
        }
        if b.is_ascii_digit() {
            return self.number();
        }

        let ch = self.current_char();
        if unicode_ident::is_xid_start(ch) || ch == '_' || ch == '$' {
            return self.identifier_or_keyword(start);
        }

        if let Some(kind) = self.operator() {
            return kind;
        }

        // Invalid character: report, skip it, keep scanning.
        self.pos += ch.len_utf8();
        self.errors.push(LexError {
            message: format!("Invalid character \"{ch}\""),
            span: Span::new(start, self.pos),
        });
        TokenKind::Error
    }

    fn current_char(&self) -> char {
        self.text[self.pos..].chars().next().unwrap_or('\0')
    }

    fn line_comment(&mut self) -> TokenKind {
        // `///` is a markdown-style doc comment line; `//` plain trivia.
        let is_doc = self.bytes.get(self.pos + 2) == Some(&b'/')
            && self.bytes.get(self.pos + 3) != Some(&b'/');
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            if self.bytes[self.pos] == b'\r' {
                break;
            }
            self.pos += 1;
        }
        if is_doc {
            TokenKind::MarkdownDocComment
        } else {
            TokenKind::LineComment
        }
    }

    fn block_comment(&mut self, start: usize) -> TokenKind {
        let is_doc = self.bytes.get(self.pos + 2) == Some(&b'*')
            && self.bytes.get(self.pos + 3) != Some(&b'/');
        self.pos += 2;
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'*' && self.bytes.get(self.pos + 1) == Some(&b'/') {
                self.pos += 2;
                return if is_doc {
                    TokenKind::DocComment
                } else {
                    TokenKind::BlockComment
                };
            }
            self.pos += 1;
        }
        self.errors.push(LexError {
            message: "Unterminated comment".to_string(),
            span: Span::new(start, self.pos),
        });
        if is_doc {
            TokenKind::DocComment
        } else {
            TokenKind::BlockComment
        }
    }

    fn string_literal(&mut self, start: usize) -> TokenKind {
        self.pos += 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'"' => {
                    self.pos += 1;
                    return TokenKind::StringLiteral;
                }
                b'\\' => {
                    self.pos += 2.min(self.bytes.len() - self.pos);
                }
                b'\n' | b'\r' => break,
                _ => self.pos += 1,
            }
        }
        self.errors.push(LexError {
            message: "String literal is not properly closed by a double-quote".to_string(),
            span: Span::new(start, self.pos),
        });
        TokenKind::Error
    }

    fn char_literal(&mut self, start: usize) -> TokenKind {
        self.pos += 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\'' => {
                    self.pos += 1;
                    return TokenKind::CharLiteral;
                }
                b'\\' => {
                    self.pos += 2.min(self.bytes.len() - self.pos);
                }
                b'\n' | b'\r' => break,
                _ => self.pos += 1,
            }
        }
        self.errors.push(LexError {
            message: "Invalid character constant".to_string(),
            span: Span::new(start, self.pos),
        });
        TokenKind::Error
    }

    fn number(&mut self) -> TokenKind {
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_alphanumeric() || self.bytes[self.pos] == b'_')
        {
            self.pos += 1;
        }
        TokenKind::IntLiteral
    }

    fn identifier_or_keyword(&mut self, start: usize) -> TokenKind {
        let mut chars = self.text[self.pos..].char_indices();
        // First char already validated.
        chars.next();
        for (idx, ch) in chars {
            if !(unicode_ident::is_xid_continue(ch) || ch == '$') {
                self.pos += idx;
                let text = &self.text[start..self.pos];
                return TokenKind::from_keyword(text).unwrap_or(TokenKind::Identifier);
            }
        }
        self.pos = self.text.len();
        let text = &self.text[start..self.pos];
        TokenKind::from_keyword(text).unwrap_or(TokenKind::Identifier)
    }

    fn operator(&mut self) -> Option<TokenKind> {
        let rest = &self.bytes[self.pos..];
        let (kind, len) = match rest {
            [b'>', b'>', b'>', ..] => (TokenKind::UnsignedRightShift, 3),
            [b'<', b'<', ..] => (TokenKind::LeftShift, 2),
            [b'>', b'>', ..] => (TokenKind::RightShift, 2),
            [b'=', b'=', ..] => (TokenKind::EqEq, 2),
            [b'!', b'=', ..] => (TokenKind::BangEq, 2),
            [b'<', b'=', ..] => (TokenKind::LessEq, 2),
            [b'>', b'=', ..] => (TokenKind::GreaterEq, 2),
            [b'&', b'&', ..] => (TokenKind::AmpAmp, 2),
            [b'|', b'|', ..] => (TokenKind::PipePipe, 2),
            [b'+', b'+', ..] => (TokenKind::PlusPlus, 2),
            [b'-', b'-', ..] => (TokenKind::MinusMinus, 2),
            [b'+', b'=', ..] => (TokenKind::PlusEq, 2),
            [b'-', b'=', ..] => (TokenKind::MinusEq, 2),
            [b'*', b'=', ..] => (TokenKind::StarEq, 2),
            [b'%', b'=', ..] => (TokenKind::PercentEq, 2),
            [b'(', ..] => (TokenKind::LParen, 1),
            [b')', ..] => (TokenKind::RParen, 1),
            [b'{', ..] => (TokenKind::LBrace, 1),
            [b'}', ..] => (TokenKind::RBrace, 1),
            [b'[', ..] => (TokenKind::LBracket, 1),
            [b']', ..] => (TokenKind::RBracket, 1),
            [b';', ..] => (TokenKind::Semicolon, 1),
            [b',', ..] => (TokenKind::Comma, 1),
            [b'.', ..] => (TokenKind::Dot, 1),
            [b'@', ..] => (TokenKind::At, 1),
            [b'?', ..] => (TokenKind::Question, 1),
            [b':', ..] => (TokenKind::Colon, 1),
            [b'+', ..] => (TokenKind::Plus, 1),
            [b'-', ..] => (TokenKind::Minus, 1),
            [b'*', ..] => (TokenKind::Star, 1),
            [b'%', ..] => (TokenKind::Percent, 1),
            [b'~', ..] => (TokenKind::Tilde, 1),
            [b'!', ..] => (TokenKind::Bang, 1),
            [b'=', ..] => (TokenKind::Eq, 1),
            [b'<', ..] => (TokenKind::Less, 1),
            [b'>', ..] => (TokenKind::Greater, 1),
            [b'&', ..] => (TokenKind::Amp, 1),
            [b'|', ..] => (TokenKind::Pipe, 1),
            [b'^', ..] => (TokenKind::Caret, 1),
            _ => return None,
        };
        self.pos += len;
        Some(kind)
    }
}

/// Extract every `//$NON-NLS-<n>$` marker from a line comment's text.
///
/// `comment_start` is the comment token's offset into the unit, so returned
/// spans are file offsets covering the full tag text.
pub fn non_nls_tags(comment_text: &str, comment_start: usize) -> Vec<NlsTag> {
    const MARKER: &str = "//$NON-NLS-";

    let mut tags = Vec::new();
    let mut search_from = 0usize;
    while let Some(found) = comment_text[search_from..].find(MARKER) {
        let tag_start = search_from + found;
        let digits_start = tag_start + MARKER.len();
        let digits: String = comment_text[digits_start..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        let after_digits = digits_start + digits.len();
        if !digits.is_empty() && comment_text[after_digits..].starts_with('$') {
            let tag_end = after_digits + 1;
            if let Ok(index) = digits.parse::<u32>() {
                tags.push(NlsTag {
                    index,
                    span: Span::new(comment_start + tag_start, comment_start + tag_end),
                });
            }
            search_from = tag_end;
        } else {
            search_from = digits_start;
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input)
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn scans_keywords_identifiers_and_operators() {
        assert_eq!(
            kinds("class A { int x = 1 + 2; }"),
            vec![
                TokenKind::ClassKw,
                TokenKind::Identifier,
                TokenKind::LBrace,
                TokenKind::IntKw,
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::IntLiteral,
                TokenKind::Plus,
                TokenKind::IntLiteral,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn classifies_comment_flavors() {
        let tokens = lex("/** doc */ /* plain */ // line\n/// md");
        let trivia: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind.is_trivia() && t.kind != TokenKind::Whitespace)
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            trivia,
            vec![
                TokenKind::DocComment,
                TokenKind::BlockComment,
                TokenKind::LineComment,
                TokenKind::MarkdownDocComment,
            ]
        );
    }

    #[test]
    fn unterminated_string_recovers_and_reports() {
        let (tokens, errors) = lex_with_errors("String s = \"oops\nint x;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, Span::new(11, 16));
        assert!(errors[0].message.contains("not properly closed"));
        // Scanning continued on the next line.
        assert!(tokens.iter().any(|t| t.kind == TokenKind::IntKw));
    }

    #[test]
    fn invalid_character_is_skipped() {
        let (tokens, errors) = lex_with_errors("int x = `1;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Invalid character \"`\"");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Error));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::IntLiteral));
    }

    #[test]
    fn finds_non_nls_tags_with_file_offsets() {
        let comment = "//$NON-NLS-1$ //$NON-NLS-2$";
        let tags = non_nls_tags(comment, 100);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].index, 1);
        assert_eq!(tags[0].span, Span::new(100, 113));
        assert_eq!(tags[1].index, 2);
        assert_eq!(tags[1].span, Span::new(114, 127));
    }

    #[test]
    fn ignores_malformed_non_nls_tags() {
        assert_eq!(non_nls_tags("//$NON-NLS-$", 0), Vec::new());
        assert_eq!(non_nls_tags("//$NON-NLS-1", 0), Vec::new());
    }
}
