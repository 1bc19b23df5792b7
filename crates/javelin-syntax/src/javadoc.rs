//! Structural parsing of documentation comments.
//!
//! Only block tags matter to the cross-reference checks, so this extracts
//! `@tag operand` pairs with precise spans and leaves prose alone. Works for
//! both `/** */` comments and runs of `///` lines.

use javelin_types::Span;

use crate::ast::{Javadoc, JavadocOperand, JavadocSingleTypeReference, JavadocTag, JavadocTagKind};

/// Parse the doc comment occupying `span` within `source`.
pub fn parse_javadoc(source: &str, span: Span) -> Javadoc {
    let mut tags = Vec::new();
    let text = &source[span.start..span.end];

    for (line_offset, line) in lines_with_offsets(text) {
        let content_start = doc_line_content(line);
        let content = &line[content_start..];
        let trimmed = content.trim_start();
        if !trimmed.starts_with('@') {
            continue;
        }
        let at_rel = content_start + (content.len() - trimmed.len());
        let at_abs = span.start + line_offset + at_rel;

        let name: String = trimmed[1..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        if name.is_empty() {
            continue;
        }
        let name_span = Span::new(at_abs, at_abs + 1 + name.len());

        let kind = match name.as_str() {
            "param" => JavadocTagKind::Param,
            "return" => JavadocTagKind::Return,
            "throws" | "exception" => JavadocTagKind::Throws,
            "see" => JavadocTagKind::See,
            _ => JavadocTagKind::Unknown,
        };

        let rest = &trimmed[1 + name.len()..];
        let operand = match kind {
            JavadocTagKind::Param => first_word(rest).map(|(word, rel)| JavadocOperand::Name {
                text: word.to_string(),
                span: Span::new(
                    name_span.end + rel,
                    name_span.end + rel + word.len(),
                ),
            }),
            JavadocTagKind::Throws | JavadocTagKind::See => {
                first_word(rest).map(|(word, rel)| {
                    JavadocOperand::TypeRef(JavadocSingleTypeReference {
                        name: word.to_string(),
                        span: Span::new(
                            name_span.end + rel,
                            name_span.end + rel + word.len(),
                        ),
                    })
                })
            }
            _ => None,
        };

        tags.push(JavadocTag {
            kind,
            name,
            name_span,
            operand,
        });
    }

    Javadoc { tags, span }
}

/// Offset of the first payload character on a doc comment line, past the
/// decoration (`/**`, leading `*`, `///`).
fn doc_line_content(line: &str) -> usize {
    let trimmed = line.trim_start();
    let indent = line.len() - trimmed.len();
    for prefix in ["/**", "///", "*/", "*", "/"] {
        if trimmed.starts_with(prefix) {
            // A bare `*/` line has no payload.
            if prefix == "*/" {
                return line.len();
            }
            return indent + prefix.len();
        }
    }
    indent
}

fn first_word(text: &str) -> Option<(&str, usize)> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let rel = text.len() - trimmed.len();
    let word = trimmed
        .split(|c: char| c.is_whitespace() || c == '*')
        .next()
        .filter(|w| !w.is_empty())?;
    Some((word, rel))
}

fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0usize;
    text.split_inclusive('\n').map(move |line| {
        let start = offset;
        offset += line.len();
        (start, line.trim_end_matches(['\n', '\r']))
    })
}
