use super::*;
use crate::error::{ScriptError, ScriptResult};

fn upper(content: &str) -> ScriptResult<String> {
    Ok(format!("UPPER({content})"))
}

fn scan_script(text: &str) -> String {
    SCRIPT_TOKENS.scan(text, &mut upper).unwrap()
}

// ==================== scan ====================

#[test]
fn text_without_open_token_is_unchanged() {
    assert_eq!(scan_script("SELECT * FROM users"), "SELECT * FROM users");
    assert_eq!(scan_script("a } b"), "a } b");
}

#[test]
fn empty_text_is_empty() {
    assert_eq!(scan_script(""), "");
}

#[test]
fn replaces_tokens_in_order() {
    let mut seen = Vec::new();
    let out = SCRIPT_TOKENS
        .scan("${a} and ${b} and ${a}", &mut |c: &str| -> ScriptResult<String> {
            seen.push(c.to_string());
            Ok(c.to_uppercase())
        })
        .unwrap();
    assert_eq!(out, "A and B and A");
    assert_eq!(seen, vec!["a", "b", "a"]);
}

#[test]
fn escaped_open_token_is_literal() {
    assert_eq!(scan_script("a\\${x}b${y}"), "a${x}bUPPER(y)");
}

#[test]
fn escaped_close_token_joins_the_body() {
    assert_eq!(scan_script("${a\\}b}c"), "UPPER(a}b)c");
}

#[test]
fn unterminated_token_is_kept_verbatim() {
    let mut calls = 0;
    let out = SCRIPT_TOKENS
        .scan("x${y", &mut |_: &str| -> ScriptResult<String> {
            calls += 1;
            Ok(String::new())
        })
        .unwrap();
    assert_eq!(out, "x${y");
    assert_eq!(calls, 0);
}

#[test]
fn unterminated_token_after_complete_one() {
    assert_eq!(scan_script("${a} ${b"), "UPPER(a) ${b");
}

#[test]
fn empty_body_calls_handler() {
    assert_eq!(scan_script("[${}]"), "[UPPER()]");
}

#[test]
fn adjacent_tokens() {
    assert_eq!(scan_script("${a}${b}"), "UPPER(a)UPPER(b)");
}

#[test]
fn handler_errors_abort_the_scan() {
    let err = PARAMETER_TOKENS
        .scan("#{a}", &mut |c: &str| -> ScriptResult<String> {
            Err(ScriptError::evaluation(c, "boom"))
        })
        .unwrap_err();
    assert!(err.is_evaluation());
}

#[test]
fn pairs_only_match_their_own_tokens() {
    let out = PARAMETER_TOKENS.scan("${a} #{b}", &mut upper).unwrap();
    assert_eq!(out, "${a} UPPER(b)");
}

#[test]
fn contains_token_detection() {
    assert!(SCRIPT_TOKENS.contains_token("order by ${col}"));
    assert!(!SCRIPT_TOKENS.contains_token("order by \\${col}"));
    assert!(!SCRIPT_TOKENS.contains_token("order by ${col"));
    assert!(!SCRIPT_TOKENS.contains_token("#{id}"));
}

#[test]
fn multibyte_text_is_preserved() {
    assert_eq!(scan_script("名前 = ${名前} ✓"), "名前 = UPPER(名前) ✓");
}

// ==================== segments / rewrite ====================

#[test]
fn segments_split_text_escapes_and_bodies() {
    let segments: Vec<_> = PARAMETER_TOKENS.segments("a \\#{b} #{c\\}d} #{e").collect();
    assert_eq!(
        segments,
        vec![
            Segment::Text("a "),
            Segment::EscapedOpen("\\#{"),
            Segment::Text("b} "),
            Segment::Token("c\\}d"),
            Segment::Text(" #{e"),
        ]
    );
}

#[test]
fn rewrite_keeps_escapes_intact() {
    let out = PARAMETER_TOKENS.rewrite("'\\#{x}' = #{x} and #{x\\}y}", |body| {
        body.replacen('x', "item_0", 1)
    });
    assert_eq!(out, "'\\#{x}' = #{item_0} and #{item_0\\}y}");

    // Scanning the rewritten text resolves the escapes exactly once.
    let scanned = PARAMETER_TOKENS.scan(&out, &mut upper).unwrap();
    assert_eq!(scanned, "'#{x}' = UPPER(item_0) and UPPER(item_0}y)");
}

#[test]
fn rewrite_leaves_unterminated_tokens() {
    assert_eq!(
        PARAMETER_TOKENS.rewrite("#{a} #{b", |body| body.to_uppercase()),
        "#{A} #{b"
    );
}

// ==================== parse_placeholder ====================

#[test]
fn parses_simple_property() {
    let attrs = parse_placeholder("  user.name  ").unwrap();
    assert_eq!(attrs.property(), "user.name");
    assert_eq!(attrs.len(), 1);
}

#[test]
fn parses_jdbc_type_shorthand() {
    let attrs = parse_placeholder("id:BIGINT").unwrap();
    assert_eq!(attrs.property(), "id");
    assert_eq!(attrs.get("jdbcType"), Some("BIGINT"));
}

#[test]
fn parses_options_in_order() {
    let attrs =
        parse_placeholder("id : NUMERIC , numericScale = 2, typeHandler= My Handler ").unwrap();
    let entries: Vec<_> = attrs.iter().collect();
    assert_eq!(
        entries,
        vec![
            ("property", "id"),
            ("jdbcType", "NUMERIC"),
            ("numericScale", "2"),
            ("typeHandler", "My Handler"),
        ]
    );
}

#[test]
fn tolerates_trailing_comma() {
    let attrs = parse_placeholder("id, mode=IN,").unwrap();
    assert_eq!(attrs.get("mode"), Some("IN"));
}

#[test]
fn rejects_segment_without_equals() {
    let err = parse_placeholder("id, jdbcType").unwrap_err();
    match err {
        ScriptError::TemplateSyntax {
            fragment, position, ..
        } => {
            assert_eq!(fragment, "id, jdbcType");
            assert_eq!(position, 4);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_missing_property_and_empty_jdbc_type() {
    assert!(parse_placeholder("").unwrap_err().is_syntax());
    assert!(parse_placeholder(" , mode=IN").unwrap_err().is_syntax());
    assert!(parse_placeholder("id:").unwrap_err().is_syntax());
    assert!(parse_placeholder("id, =x").unwrap_err().is_syntax());
}

#[test]
fn expression_placeholders_are_unsupported() {
    let err = parse_placeholder(" (id + 1), jdbcType=INTEGER").unwrap_err();
    assert!(err.is_unsupported());
}
