//! Property-path access into parameter objects.
//!
//! Paths use dotted and bracketed notation:
//!
//! - `user.name`
//! - `orders[0].id`
//! - `attrs['display name']` / `attrs["x"]` / `attrs[key]`
//!
//! [`PropertyAccessor`] is the seam between the compiler and whatever object
//! model the caller uses. [`JsonAccessor`] is the default implementation over
//! `serde_json::Value`.

use crate::error::{ScriptError, ScriptResult};
use crate::value::ValueType;
use serde_json::Value;

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named property (`a`, `['a']`, `[a]`).
    Key(String),
    /// Positional element (`[0]`).
    Index(usize),
}

/// A parsed property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    pub segments: Vec<PathSegment>,
}

impl PropertyPath {
    /// Parse a dotted/bracketed property path.
    pub fn parse(path: &str) -> ScriptResult<Self> {
        let invalid = |pos: usize, msg: &str| ScriptError::syntax(path, pos, msg);

        if path.trim().is_empty() {
            return Err(invalid(0, "empty property path"));
        }

        let mut segments = Vec::new();
        let mut chars = path.char_indices().peekable();
        let mut expect_name = true;

        while let Some(&(pos, c)) = chars.peek() {
            match c {
                '.' => {
                    if expect_name {
                        return Err(invalid(pos, "empty path segment"));
                    }
                    chars.next();
                    expect_name = true;
                    if chars.peek().is_none() {
                        return Err(invalid(pos, "trailing '.' in property path"));
                    }
                }
                '[' => {
                    chars.next();
                    let mut raw = String::new();
                    let mut closed = false;
                    let quote = match chars.peek() {
                        Some(&(_, q @ ('\'' | '"'))) => {
                            chars.next();
                            Some(q)
                        }
                        _ => None,
                    };
                    while let Some((_, c)) = chars.next() {
                        match quote {
                            Some(q) if c == q => {
                                // closing quote must be followed by ']'
                                match chars.next() {
                                    Some((_, ']')) => {
                                        closed = true;
                                        break;
                                    }
                                    _ => return Err(invalid(pos, "expected ']' after quoted key")),
                                }
                            }
                            None if c == ']' => {
                                closed = true;
                                break;
                            }
                            _ => raw.push(c),
                        }
                    }
                    if !closed {
                        return Err(invalid(pos, "unclosed '[' in property path"));
                    }
                    let segment = match quote {
                        Some(_) => PathSegment::Key(raw),
                        None => {
                            let raw = raw.trim();
                            if raw.is_empty() {
                                return Err(invalid(pos, "empty index"));
                            }
                            match raw.parse::<usize>() {
                                Ok(i) => PathSegment::Index(i),
                                Err(_) => PathSegment::Key(raw.to_string()),
                            }
                        }
                    };
                    segments.push(segment);
                    expect_name = false;
                }
                _ => {
                    if !expect_name {
                        return Err(invalid(pos, "expected '.' or '[' between path segments"));
                    }
                    let mut name = String::new();
                    while let Some(&(_, c)) = chars.peek() {
                        if c == '.' || c == '[' {
                            break;
                        }
                        if c == ']' {
                            return Err(invalid(pos, "unexpected ']' in property path"));
                        }
                        name.push(c);
                        chars.next();
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(invalid(pos, "empty path segment"));
                    }
                    segments.push(PathSegment::Key(name.to_string()));
                    expect_name = false;
                }
            }
        }

        Ok(Self { segments })
    }
}

/// The first segment of a path (`user` for `user.name`, `ids` for `ids[0]`).
pub fn root_segment(path: &str) -> &str {
    let end = path.find(['.', '[']).unwrap_or(path.len());
    path[..end].trim()
}

/// Split a path into its root segment and the remainder (`None` when the path
/// is just the root). `ids[0].name` splits into `ids` and `[0].name`.
pub fn split_root(path: &str) -> (&str, Option<&str>) {
    let path = path.trim();
    let Some(end) = path.find(['.', '[']) else {
        return (path, None);
    };
    let rest = path[end..].strip_prefix('.').unwrap_or(&path[end..]);
    (path[..end].trim(), Some(rest))
}

/// Read and describe properties of an arbitrary parameter object.
pub trait PropertyAccessor: Send + Sync {
    /// Resolve `path` against `root`. `Ok(None)` means the property is absent.
    fn get<'v>(&self, root: &'v Value, path: &str) -> ScriptResult<Option<&'v Value>>;

    /// Describe the type of the property at `path`, if it exists.
    fn value_type(&self, root: &Value, path: &str) -> ScriptResult<Option<ValueType>> {
        Ok(self.get(root, path)?.map(ValueType::of))
    }

    /// Whether `path` resolves to a property (possibly `null`).
    fn has_property(&self, root: &Value, path: &str) -> bool {
        matches!(self.get(root, path), Ok(Some(_)))
    }
}

/// Default accessor over `serde_json::Value` objects and arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAccessor;

impl JsonAccessor {
    /// Walk already-parsed segments.
    pub fn walk<'v>(root: &'v Value, segments: &[PathSegment]) -> Option<&'v Value> {
        let mut current = root;
        for segment in segments {
            current = match (segment, current) {
                (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
                (PathSegment::Index(i), Value::Array(items)) => items.get(*i)?,
                (PathSegment::Index(i), Value::Object(map)) => map.get(&i.to_string())?,
                (PathSegment::Key(key), Value::Array(items)) => {
                    items.get(key.parse::<usize>().ok()?)?
                }
                _ => return None,
            };
        }
        Some(current)
    }
}

impl PropertyAccessor for JsonAccessor {
    fn get<'v>(&self, root: &'v Value, path: &str) -> ScriptResult<Option<&'v Value>> {
        let path = PropertyPath::parse(path)?;
        Ok(Self::walk(root, &path.segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_dotted_and_bracketed_paths() {
        let p = PropertyPath::parse("a.b[0]['c d'][e].f").unwrap();
        assert_eq!(
            p.segments,
            vec![
                PathSegment::Key("a".into()),
                PathSegment::Key("b".into()),
                PathSegment::Index(0),
                PathSegment::Key("c d".into()),
                PathSegment::Key("e".into()),
                PathSegment::Key("f".into()),
            ]
        );
    }

    #[test]
    fn rejects_malformed_paths() {
        assert!(PropertyPath::parse("").is_err());
        assert!(PropertyPath::parse("a..b").is_err());
        assert!(PropertyPath::parse("a.").is_err());
        assert!(PropertyPath::parse(".a").is_err());
        assert!(PropertyPath::parse("a[0").is_err());
        assert!(PropertyPath::parse("a[]").is_err());
        assert!(PropertyPath::parse("a['x'").is_err());
    }

    #[test]
    fn resolves_nested_values() {
        let root = json!({
            "user": {"name": "alice", "tags": ["x", "y"]},
            "attrs": {"display name": 7}
        });
        let acc = JsonAccessor;
        assert_eq!(acc.get(&root, "user.name").unwrap(), Some(&json!("alice")));
        assert_eq!(acc.get(&root, "user.tags[1]").unwrap(), Some(&json!("y")));
        assert_eq!(acc.get(&root, "attrs['display name']").unwrap(), Some(&json!(7)));
        assert_eq!(acc.get(&root, "user.missing").unwrap(), None);
        assert_eq!(acc.get(&root, "user.name.first").unwrap(), None);
        assert_eq!(
            acc.value_type(&root, "user.tags").unwrap(),
            Some(ValueType::List)
        );
        assert!(acc.has_property(&root, "user"));
        assert!(!acc.has_property(&root, "nope"));
    }

    #[test]
    fn root_segment_stops_at_dot_or_bracket() {
        assert_eq!(root_segment("user.name"), "user");
        assert_eq!(root_segment("ids[0]"), "ids");
        assert_eq!(root_segment("plain"), "plain");
    }

    #[test]
    fn split_root_keeps_bracketed_remainder() {
        assert_eq!(split_root("user.name"), ("user", Some("name")));
        assert_eq!(split_root("ids[0].name"), ("ids", Some("[0].name")));
        assert_eq!(split_root(" plain "), ("plain", None));
    }
}
