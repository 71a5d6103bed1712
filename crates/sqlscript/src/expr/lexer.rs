use crate::error::{ScriptError, ScriptResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Dot,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token in the expression.
    pub start: usize,
}

/// Tokenize an expression.
pub(crate) fn tokenize(expr: &str) -> ScriptResult<Vec<Token>> {
    let err = |pos: usize, msg: String| ScriptError::evaluation(expr, format!("{msg} at {pos}"));

    let mut tokens = Vec::new();
    let mut chars = expr.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = match c {
            '\'' | '"' => {
                chars.next();
                let quote = c;
                let mut s = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some((_, 'n')) => s.push('\n'),
                            Some((_, 't')) => s.push('\t'),
                            Some((_, other)) => s.push(other),
                            None => break,
                        },
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        c => s.push(c),
                    }
                }
                if !closed {
                    return Err(err(start, "unterminated string literal".to_string()));
                }
                tokens.push(Token {
                    kind: TokenKind::Str(s),
                    start,
                });
                continue;
            }
            c if c.is_ascii_digit() => {
                let mut text = String::new();
                let mut is_float = false;
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        chars.next();
                    } else if c == '.' && !is_float {
                        // `1.5` is a float; a '.' not followed by a digit ends the number.
                        let mut lookahead = chars.clone();
                        lookahead.next();
                        match lookahead.peek() {
                            Some(&(_, d)) if d.is_ascii_digit() => {
                                is_float = true;
                                text.push('.');
                                chars.next();
                            }
                            _ => break,
                        }
                    } else {
                        break;
                    }
                }
                // Java-style numeric suffixes (`1L`, `2.5d`) are accepted and ignored.
                if let Some(&(_, s)) = chars.peek() {
                    if matches!(s, 'L' | 'l' | 'D' | 'd' | 'F' | 'f') {
                        chars.next();
                        if matches!(s, 'D' | 'd' | 'F' | 'f') {
                            is_float = true;
                        }
                    }
                }
                if is_float {
                    let v = text
                        .parse::<f64>()
                        .map_err(|e| err(start, format!("invalid number '{text}': {e}")))?;
                    TokenKind::Float(v)
                } else {
                    match text.parse::<i64>() {
                        Ok(v) => TokenKind::Int(v),
                        Err(_) => TokenKind::Float(text.parse::<f64>().map_err(|e| {
                            err(start, format!("invalid number '{text}': {e}"))
                        })?),
                    }
                }
            }
            c if c == '_' || c == '$' || c.is_alphabetic() => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c == '_' || c == '$' || c.is_alphanumeric() {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                TokenKind::Ident(name)
            }
            _ => {
                chars.next();
                let next = chars.peek().map(|&(_, c)| c);
                let (kind, pair) = match (c, next) {
                    ('=', Some('=')) => (TokenKind::EqEq, true),
                    ('!', Some('=')) => (TokenKind::NotEq, true),
                    ('<', Some('=')) => (TokenKind::LtEq, true),
                    ('>', Some('=')) => (TokenKind::GtEq, true),
                    ('&', Some('&')) => (TokenKind::AndAnd, true),
                    ('|', Some('|')) => (TokenKind::OrOr, true),
                    ('<', _) => (TokenKind::Lt, false),
                    ('>', _) => (TokenKind::Gt, false),
                    ('!', _) => (TokenKind::Bang, false),
                    ('+', _) => (TokenKind::Plus, false),
                    ('-', _) => (TokenKind::Minus, false),
                    ('*', _) => (TokenKind::Star, false),
                    ('/', _) => (TokenKind::Slash, false),
                    ('%', _) => (TokenKind::Percent, false),
                    ('(', _) => (TokenKind::LParen, false),
                    (')', _) => (TokenKind::RParen, false),
                    ('[', _) => (TokenKind::LBracket, false),
                    (']', _) => (TokenKind::RBracket, false),
                    ('{', _) => (TokenKind::LBrace, false),
                    ('}', _) => (TokenKind::RBrace, false),
                    ('.', _) => (TokenKind::Dot, false),
                    (',', _) => (TokenKind::Comma, false),
                    (other, _) => {
                        return Err(err(start, format!("unexpected character '{other}'")));
                    }
                };
                if pair {
                    chars.next();
                }
                kind
            }
        };

        tokens.push(Token { kind, start });
    }

    Ok(tokens)
}
