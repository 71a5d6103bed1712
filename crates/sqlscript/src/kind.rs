use std::fmt;

/// What a rendered statement does, judged from its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    /// DDL, procedure calls and anything else.
    Other,
}

const DML_KEYWORDS: [(&str, StatementKind); 4] = [
    ("SELECT", StatementKind::Select),
    ("INSERT", StatementKind::Insert),
    ("UPDATE", StatementKind::Update),
    ("DELETE", StatementKind::Delete),
];

impl StatementKind {
    /// Classify `sql`, skipping leading whitespace, comments and parentheses.
    ///
    /// `WITH` statements are classified by the statement that follows the
    /// last CTE definition; a bare `WITH ... SELECT` is a select.
    pub fn from_sql(sql: &str) -> Self {
        let head = skip_preamble(sql);
        if starts_with_keyword(head, "WITH") {
            return Self::leading(after_cte_definitions(head)).unwrap_or(StatementKind::Select);
        }
        Self::leading(head).unwrap_or(StatementKind::Other)
    }

    fn leading(sql: &str) -> Option<Self> {
        DML_KEYWORDS
            .iter()
            .find(|(kw, _)| starts_with_keyword(sql, kw))
            .map(|(_, kind)| *kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "select",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::Other => "other",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn skip_preamble(sql: &str) -> &str {
    let mut s = sql;
    loop {
        let before = s.len();
        s = s.trim_start();
        if let Some(rest) = s.strip_prefix("--") {
            s = match rest.find('\n') {
                Some(pos) => &rest[pos + 1..],
                None => return "",
            };
        } else if let Some(rest) = s.strip_prefix("/*") {
            s = match rest.find("*/") {
                Some(pos) => &rest[pos + 2..],
                None => return "",
            };
        } else if let Some(rest) = s.strip_prefix('(') {
            s = rest;
        }
        if s.len() == before {
            return s;
        }
    }
}

/// The text after the last top-level closing parenthesis, ignoring
/// parentheses inside single-quoted literals.
fn after_cte_definitions(sql: &str) -> &str {
    let bytes = sql.as_bytes();
    let mut depth: i32 = 0;
    let mut end = 0;
    let mut in_literal = false;

    for (i, &b) in bytes.iter().enumerate() {
        match (in_literal, b) {
            // `''` inside a literal toggles twice and stays in it.
            (_, b'\'') => in_literal = !in_literal,
            (false, b'(') => depth += 1,
            (false, b')') => {
                depth -= 1;
                if depth == 0 {
                    end = i + 1;
                }
            }
            _ => {}
        }
    }
    sql[end..].trim_start()
}

fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    s.get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_plain_statements() {
        assert_eq!(StatementKind::from_sql("SELECT 1"), StatementKind::Select);
        assert_eq!(StatementKind::from_sql("  select * from t"), StatementKind::Select);
        assert_eq!(
            StatementKind::from_sql("INSERT INTO t (a) VALUES (?)"),
            StatementKind::Insert
        );
        assert_eq!(StatementKind::from_sql("update t SET a = ?"), StatementKind::Update);
        assert_eq!(StatementKind::from_sql("DELETE FROM t"), StatementKind::Delete);
        assert_eq!(StatementKind::from_sql("CREATE TABLE t ()"), StatementKind::Other);
        assert_eq!(StatementKind::from_sql(""), StatementKind::Other);
    }

    #[test]
    fn skips_comments_and_parentheses() {
        assert_eq!(
            StatementKind::from_sql("-- list\n/* all */ (SELECT 1) UNION (SELECT 2)"),
            StatementKind::Select
        );
        assert_eq!(StatementKind::from_sql("-- only a comment"), StatementKind::Other);
        assert_eq!(StatementKind::from_sql("/* unclosed"), StatementKind::Other);
    }

    #[test]
    fn looks_past_cte_definitions() {
        assert_eq!(
            StatementKind::from_sql("WITH a AS (SELECT 1) SELECT * FROM a"),
            StatementKind::Select
        );
        assert_eq!(
            StatementKind::from_sql(
                "WITH a AS (SELECT ')' AS p), b AS (SELECT 2) DELETE FROM t USING a"
            ),
            StatementKind::Delete
        );
        assert_eq!(
            StatementKind::from_sql("with moved as (delete from a returning *) insert into b select * from moved"),
            StatementKind::Insert
        );
    }
}
