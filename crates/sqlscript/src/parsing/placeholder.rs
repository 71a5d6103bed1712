use crate::error::{ScriptError, ScriptResult};

/// Attributes of one `#{...}` placeholder, in declaration order.
///
/// Always contains `property`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderAttributes {
    entries: Vec<(String, String)>,
}

impl PlaceholderAttributes {
    /// Insert or replace an attribute, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The property path (`id` in `#{id, jdbcType=BIGINT}`).
    pub fn property(&self) -> &str {
        self.get("property").unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn skip_ws(body: &str, mut p: usize) -> usize {
    let bytes = body.as_bytes();
    while p < bytes.len() && bytes[p] <= b' ' {
        p += 1;
    }
    p
}

fn skip_until(body: &str, p: usize, stops: &[u8]) -> usize {
    body.as_bytes()[p..]
        .iter()
        .position(|b| stops.contains(b))
        .map_or(body.len(), |i| i + p)
}

/// Parse a placeholder body.
///
/// ```text
/// body := property (':' jdbcType)? (',' key '=' value)*
/// ```
///
/// Keys and values are trimmed; whitespace inside a value is kept. A body that
/// starts with `(` is an expression-style placeholder, which is unsupported.
pub fn parse_placeholder(body: &str) -> ScriptResult<PlaceholderAttributes> {
    let mut attrs = PlaceholderAttributes::default();
    let len = body.len();

    let p = skip_ws(body, 0);
    if body[p..].starts_with('(') {
        return Err(ScriptError::unsupported(
            body,
            "expression based parameters are not supported",
        ));
    }

    let right = skip_until(body, p, b",:");
    let property = body[p..right].trim();
    if property.is_empty() {
        return Err(ScriptError::syntax(body, p, "missing property"));
    }
    attrs.insert("property", property);

    let mut pos = skip_ws(body, right);
    if pos < len && body.as_bytes()[pos] == b':' {
        let left = skip_ws(body, pos + 1);
        let right = skip_until(body, left, b",");
        let jdbc_type = body[left..right].trim();
        if jdbc_type.is_empty() {
            return Err(ScriptError::syntax(body, pos, "missing jdbcType after ':'"));
        }
        attrs.insert("jdbcType", jdbc_type);
        pos = right;
    }

    // `pos` now sits on a ',' or at the end of the body.
    while pos < len {
        let left = skip_ws(body, pos + 1);
        if left >= len {
            break;
        }
        let eq = skip_until(body, left, b"=,");
        if eq >= len || body.as_bytes()[eq] != b'=' {
            return Err(ScriptError::syntax(
                body,
                left,
                "expected 'key=value' attribute",
            ));
        }
        let key = body[left..eq].trim();
        if key.is_empty() {
            return Err(ScriptError::syntax(body, left, "empty attribute name"));
        }
        let right = skip_until(body, eq + 1, b",");
        attrs.insert(key, body[eq + 1..right].trim());
        pos = right;
    }

    Ok(attrs)
}
