use super::SqlNode;
use crate::context::{DynamicContext, TrimmedContext};
use crate::error::ScriptResult;

const WHERE_PREFIX_OVERRIDES: [&str; 8] = [
    "AND ", "OR ", "AND\n", "OR\n", "AND\r", "OR\r", "AND\t", "OR\t",
];

/// `<trim>`, and the `<where>` / `<set>` presets built on it.
///
/// The buffered body is trimmed, then at most one prefix override and one
/// suffix override are removed (ASCII case-insensitive, first match wins)
/// before `prefix` / `suffix` are added. An empty body renders nothing.
#[derive(Debug, Clone)]
pub struct TrimNode {
    body: Box<SqlNode>,
    prefix: Option<String>,
    suffix: Option<String>,
    prefix_overrides: Vec<String>,
    suffix_overrides: Vec<String>,
}

impl TrimNode {
    pub fn new(body: SqlNode) -> Self {
        Self {
            body: Box::new(body),
            prefix: None,
            suffix: None,
            prefix_overrides: Vec::new(),
            suffix_overrides: Vec::new(),
        }
    }

    /// `<where>`: prefix `WHERE`, dropping a leading `AND` / `OR`.
    pub fn where_clause(body: SqlNode) -> Self {
        Self::new(body)
            .prefix("WHERE")
            .prefix_overrides(WHERE_PREFIX_OVERRIDES.iter().map(|s| s.to_string()).collect())
    }

    /// `<set>`: prefix `SET`, dropping a leading or trailing comma.
    pub fn set_clause(body: SqlNode) -> Self {
        Self::new(body)
            .prefix("SET")
            .prefix_overrides(vec![",".to_string()])
            .suffix_overrides(vec![",".to_string()])
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into()).filter(|p: &String| !p.is_empty());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into()).filter(|s: &String| !s.is_empty());
        self
    }

    pub fn prefix_overrides(mut self, overrides: Vec<String>) -> Self {
        self.prefix_overrides = overrides;
        self
    }

    pub fn suffix_overrides(mut self, overrides: Vec<String>) -> Self {
        self.suffix_overrides = overrides;
        self
    }

    pub(crate) fn apply(&self, ctx: &mut dyn DynamicContext) -> ScriptResult<bool> {
        let mut trimmed = TrimmedContext::new(ctx);
        let applied = self.body.apply(&mut trimmed)?;
        trimmed.apply_all(|body| self.trim_clause(body));
        Ok(applied)
    }

    /// Apply the trim rules to an already-rendered body.
    pub fn trim_clause(&self, body: &str) -> String {
        let mut sql = body.trim();
        if sql.is_empty() {
            return String::new();
        }

        if let Some(rest) = self
            .prefix_overrides
            .iter()
            .find_map(|o| strip_prefix_ignore_case(sql, o))
        {
            sql = rest.trim_start();
        }
        if let Some(rest) = self.suffix_overrides.iter().find_map(|o| {
            strip_suffix_ignore_case(sql, o).or_else(|| strip_suffix_ignore_case(sql, o.trim()))
        }) {
            sql = rest.trim_end();
        }
        if sql.is_empty() {
            return String::new();
        }

        let mut out = String::with_capacity(sql.len() + 16);
        if let Some(prefix) = &self.prefix {
            out.push_str(prefix);
            out.push(' ');
        }
        out.push_str(sql);
        if let Some(suffix) = &self.suffix {
            out.push(' ');
            out.push_str(suffix);
        }
        out
    }
}

/// Split an `A|B|C` override list. Entries are kept verbatim (a trailing
/// space is significant); empty entries are dropped.
pub(crate) fn parse_overrides(raw: &str) -> Vec<String> {
    raw.split('|')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_prefix_ignore_case<'s>(sql: &'s str, pat: &str) -> Option<&'s str> {
    if pat.is_empty() {
        return None;
    }
    let head = sql.get(..pat.len())?;
    head.eq_ignore_ascii_case(pat).then(|| &sql[pat.len()..])
}

fn strip_suffix_ignore_case<'s>(sql: &'s str, pat: &str) -> Option<&'s str> {
    if pat.is_empty() {
        return None;
    }
    let start = sql.len().checked_sub(pat.len())?;
    let tail = sql.get(start..)?;
    tail.eq_ignore_ascii_case(pat).then(|| &sql[..start])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trim(body: &str, node: TrimNode) -> String {
        node.trim_clause(body)
    }

    fn empty() -> SqlNode {
        SqlNode::Mixed(Vec::new())
    }

    #[test]
    fn where_drops_leading_connective() {
        assert_eq!(trim(" AND id = 1 ", TrimNode::where_clause(empty())), "WHERE id = 1");
        assert_eq!(trim("or\tid = 1", TrimNode::where_clause(empty())), "WHERE id = 1");
        assert_eq!(trim("id = 1", TrimNode::where_clause(empty())), "WHERE id = 1");
        assert_eq!(trim("ANDROID = 1", TrimNode::where_clause(empty())), "WHERE ANDROID = 1");
        assert_eq!(trim("   ", TrimNode::where_clause(empty())), "");
    }

    #[test]
    fn set_drops_commas() {
        assert_eq!(
            trim("name=?, age=?,", TrimNode::set_clause(empty())),
            "SET name=?, age=?"
        );
        assert_eq!(trim(", a=?", TrimNode::set_clause(empty())), "SET a=?");
        assert_eq!(trim(",", TrimNode::set_clause(empty())), "");
    }

    #[test]
    fn overrides_apply_once() {
        let node = TrimNode::new(empty())
            .prefix("(")
            .suffix(")")
            .suffix_overrides(parse_overrides(", |,"));
        assert_eq!(trim("a, b,,", node), "( a, b, )");
    }

    #[test]
    fn parses_override_lists() {
        assert_eq!(parse_overrides("AND |OR "), vec!["AND ", "OR "]);
        assert_eq!(parse_overrides("a||b|"), vec!["a", "b"]);
        assert!(parse_overrides("").is_empty());
    }

    #[test]
    fn multibyte_bodies_do_not_panic() {
        let node = TrimNode::new(empty()).prefix_overrides(vec!["AND ".into()]);
        assert_eq!(trim("名前 = ?", node), "名前 = ?");
    }
}
