use std::borrow::Cow;

use crate::error::ScriptResult;

/// An open/close delimiter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPair {
    pub open: &'static str,
    pub close: &'static str,
}

/// `#{...}`: bound parameter placeholders.
pub const PARAMETER_TOKENS: TokenPair = TokenPair::new("#{", "}");

/// `${...}`: text substitutions evaluated at render time.
pub const SCRIPT_TOKENS: TokenPair = TokenPair::new("${", "}");

impl TokenPair {
    pub const fn new(open: &'static str, close: &'static str) -> Self {
        Self { open, close }
    }

    /// Scan `text` with this pair. See [`scan`].
    pub fn scan<H>(&self, text: &str, handler: &mut H) -> ScriptResult<String>
    where
        H: TokenHandler + ?Sized,
    {
        scan(text, self.open, self.close, handler)
    }

    /// Split `text` into literal runs, escaped open tokens and token bodies.
    pub fn segments<'a>(&self, text: &'a str) -> Segments<'a> {
        Segments::new(text, self.open, self.close)
    }

    /// Replace each complete token's raw body, leaving everything else
    /// byte-for-byte intact.
    ///
    /// Unlike [`scan`], escapes survive: `\open` stays escaped and the body
    /// handed to `replace` still carries its `\close` escapes, so the output
    /// scans exactly like the input apart from the rewritten bodies.
    pub fn rewrite(&self, text: &str, mut replace: impl FnMut(&str) -> String) -> String {
        let mut out = String::with_capacity(text.len());
        for segment in self.segments(text) {
            match segment {
                Segment::Text(raw) | Segment::EscapedOpen(raw) => out.push_str(raw),
                Segment::Token(body) => {
                    out.push_str(self.open);
                    out.push_str(&replace(body));
                    out.push_str(self.close);
                }
            }
        }
        out
    }

    /// Whether `text` contains at least one complete, unescaped token.
    pub fn contains_token(&self, text: &str) -> bool {
        self.segments(text)
            .any(|segment| matches!(segment, Segment::Token(_)))
    }
}

/// Receives the body of each complete token and returns its replacement.
pub trait TokenHandler {
    fn handle_token(&mut self, content: &str) -> ScriptResult<String>;
}

impl<F> TokenHandler for F
where
    F: FnMut(&str) -> ScriptResult<String>,
{
    fn handle_token(&mut self, content: &str) -> ScriptResult<String> {
        self(content)
    }
}

/// One piece of scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text, including an unterminated open token and its tail.
    Text(&'a str),
    /// A backslash followed by the open token.
    EscapedOpen(&'a str),
    /// The raw body of a complete token, `\close` escapes included.
    Token(&'a str),
}

/// Iterator over the [`Segment`]s of a text. See [`TokenPair::segments`].
pub struct Segments<'a> {
    text: &'a str,
    open: &'a str,
    close: &'a str,
    offset: usize,
    pending: Option<Segment<'a>>,
}

impl<'a> Segments<'a> {
    pub fn new(text: &'a str, open: &'a str, close: &'a str) -> Self {
        Self {
            text,
            open,
            close,
            offset: 0,
            pending: None,
        }
    }

    /// End of the body starting at `body_start`, skipping escaped closes.
    fn body_end(&self, body_start: usize) -> Option<usize> {
        let bytes = self.text.as_bytes();
        let mut from = body_start;
        loop {
            let e = find_from(self.text, self.close, from)?;
            if e <= from || bytes[e - 1] != b'\\' {
                return Some(e);
            }
            from = e + self.close.len();
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        if let Some(segment) = self.pending.take() {
            return Some(segment);
        }
        let text = self.text;
        if self.offset >= text.len() {
            return None;
        }

        let offset = self.offset;
        let Some(start) = find_from(text, self.open, offset) else {
            self.offset = text.len();
            return Some(Segment::Text(&text[offset..]));
        };

        let (before, token) = if start > offset && text.as_bytes()[start - 1] == b'\\' {
            self.offset = start + self.open.len();
            (
                &text[offset..start - 1],
                Segment::EscapedOpen(&text[start - 1..self.offset]),
            )
        } else {
            let body_start = start + self.open.len();
            match self.body_end(body_start) {
                Some(end) => {
                    self.offset = end + self.close.len();
                    (&text[offset..start], Segment::Token(&text[body_start..end]))
                }
                None => {
                    self.offset = text.len();
                    return Some(Segment::Text(&text[offset..]));
                }
            }
        };

        if before.is_empty() {
            Some(token)
        } else {
            self.pending = Some(token);
            Some(Segment::Text(before))
        }
    }
}

fn find_from(text: &str, pat: &str, from: usize) -> Option<usize> {
    text.get(from..)?.find(pat).map(|i| i + from)
}

/// A raw token body with its `\close` escapes resolved.
fn unescape_body<'a>(body: &'a str, close: &str) -> Cow<'a, str> {
    let escaped = format!("\\{close}");
    if body.contains(&escaped) {
        Cow::Owned(body.replace(&escaped, close))
    } else {
        Cow::Borrowed(body)
    }
}

/// Replace every `open ... close` token in `text` with the handler's output.
///
/// - `\open` is literal: the backslash is dropped and the open token kept.
/// - `\close` inside a body is literal: it becomes part of the body.
/// - An open token with no unescaped close is emitted verbatim together with
///   the rest of the text, and scanning stops.
pub fn scan<H>(text: &str, open: &str, close: &str, handler: &mut H) -> ScriptResult<String>
where
    H: TokenHandler + ?Sized,
{
    let mut out = String::with_capacity(text.len());
    for segment in Segments::new(text, open, close) {
        match segment {
            Segment::Text(raw) => out.push_str(raw),
            Segment::EscapedOpen(_) => out.push_str(open),
            Segment::Token(body) => {
                out.push_str(&handler.handle_token(&unescape_body(body, close))?);
            }
        }
    }
    Ok(out)
}
