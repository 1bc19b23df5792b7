use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LiteralError {
    pub message: String,
    /// Byte range within the provided literal text (not file offsets).
    pub span: Range<usize>,
}

fn err(message: impl Into<String>, span: Range<usize>) -> LiteralError {
    LiteralError {
        message: message.into(),
        span,
    }
}

/// Decode a quoted string literal, including escape sequences.
///
/// `text` must include the surrounding double quotes.
pub fn unescape_string_literal(text: &str) -> Result<String, LiteralError> {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or_else(|| err("String literal must be double-quoted", 0..text.len()))?;
    unescape_body(inner, 1)
}

/// Decode a quoted char literal into its single character.
pub fn unescape_char_literal(text: &str) -> Result<char, LiteralError> {
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .ok_or_else(|| err("Char literal must be single-quoted", 0..text.len()))?;
    let decoded = unescape_body(inner, 1)?;
    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(err(
            "Char literal must contain exactly one character",
            0..text.len(),
        )),
    }
}

fn unescape_body(inner: &str, base: usize) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some((_, esc)) = chars.next() else {
            return Err(err("Invalid escape sequence", base + idx..base + idx + 1));
        };
        match esc {
            'b' => out.push('\u{0008}'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'f' => out.push('\u{000C}'),
            'r' => out.push('\r'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            '0'..='7' => {
                // Octal escape: up to three digits.
                let mut value = esc as u32 - '0' as u32;
                let mut digits = 1;
                while digits < 3 {
                    match chars.peek() {
                        Some((_, d @ '0'..='7')) => {
                            let next = value * 8 + (*d as u32 - '0' as u32);
                            if next > 0o377 {
                                break;
                            }
                            value = next;
                            digits += 1;
                            chars.next();
                        }
                        _ => break,
                    }
                }
                // Max octal escape is \377, always a valid char.
                out.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
            }
            'u' => {
                let mut value = 0u32;
                for _ in 0..4 {
                    match chars.next() {
                        Some((_, d)) if d.is_ascii_hexdigit() => {
                            value = value * 16 + d.to_digit(16).unwrap_or(0);
                        }
                        _ => {
                            return Err(err(
                                "Invalid unicode escape sequence",
                                base + idx..base + idx + 2,
                            ))
                        }
                    }
                }
                match char::from_u32(value) {
                    Some(c) => out.push(c),
                    None => {
                        return Err(err(
                            "Invalid unicode escape sequence",
                            base + idx..base + idx + 6,
                        ))
                    }
                }
            }
            other => {
                return Err(err(
                    format!("Invalid escape sequence \"\\{other}\""),
                    base + idx..base + idx + 2,
                ))
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn unescapes_simple_and_escaped_strings() {
        assert_eq!(unescape_string_literal("\"abc\"").unwrap(), "abc");
        assert_eq!(unescape_string_literal("\"a\\tb\\n\"").unwrap(), "a\tb\n");
        assert_eq!(unescape_string_literal("\"\\\"\"").unwrap(), "\"");
        assert_eq!(unescape_string_literal("\"\\u0041\"").unwrap(), "A");
        assert_eq!(unescape_string_literal("\"\\101\"").unwrap(), "A");
    }

    #[test]
    fn rejects_bad_escape() {
        let e = unescape_string_literal("\"\\q\"").unwrap_err();
        assert_eq!(e.message, "Invalid escape sequence \"\\q\"");
    }

    #[test]
    fn unescapes_char_literals() {
        assert_eq!(unescape_char_literal("'a'").unwrap(), 'a');
        assert_eq!(unescape_char_literal("'\\n'").unwrap(), '\n');
        assert!(unescape_char_literal("'ab'").is_err());
    }
}
