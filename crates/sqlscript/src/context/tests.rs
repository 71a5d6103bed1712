use super::*;
use crate::expr::DefaultEvaluator;
use serde_json::json;

// ==================== RootContext ====================

#[test]
fn root_binds_reserved_names() {
    let evaluator = DefaultEvaluator::new();
    let ctx = RootContext::new(json!({"id": 1}), Some("postgres"), &evaluator);
    let b = ctx.bindings();
    assert_eq!(b.get(PARAMETER_OBJECT_KEY), Some(&json!({"id": 1})));
    assert_eq!(b.get(DATABASE_ID_KEY), Some(&json!("postgres")));
    assert!(!b.contains_key(SCALAR_ALIAS_KEY));
    // falls through to the parameter's fields
    assert_eq!(b.get("id"), Some(&json!(1)));
}

#[test]
fn root_aliases_scalar_and_null_parameters() {
    let evaluator = DefaultEvaluator::new();
    let ctx = RootContext::new(json!(7), None, &evaluator);
    assert_eq!(ctx.bindings().get(SCALAR_ALIAS_KEY), Some(&json!(7)));
    assert_eq!(ctx.bindings().get(DATABASE_ID_KEY), Some(&json!(null)));

    let ctx = RootContext::new(json!(null), None, &evaluator);
    assert!(ctx.bindings().contains_key(SCALAR_ALIAS_KEY));
}

#[test]
fn root_sql_is_trimmed_and_ids_increase() {
    let evaluator = DefaultEvaluator::new();
    let mut ctx = RootContext::new(json!({}), None, &evaluator);
    ctx.append_sql("  SELECT 1");
    ctx.append_sql(" ");
    assert_eq!(ctx.sql(), "SELECT 1");
    assert_eq!(ctx.next_unique_id(), 0);
    assert_eq!(ctx.next_unique_id(), 1);
    assert_eq!(ctx.next_unique_id(), 2);

    let (sql, bindings) = ctx.into_parts();
    assert_eq!(sql, "SELECT 1");
    assert_eq!(bindings.len(), 2);
}

#[test]
fn chunks_are_joined_with_one_space() {
    let joined = |chunks: &[&str]| {
        let mut buf = String::new();
        for chunk in chunks {
            join_sql(&mut buf, chunk);
        }
        buf
    };

    assert_eq!(joined(&["WHERE a = 1", "AND b = ?"]), "WHERE a = 1 AND b = ?");
    assert_eq!(joined(&["id IN ", " (", "", "?"]), "id IN  (?");
    assert_eq!(joined(&["(", "?", ",", "?", ")"]), "(?, ?)");
    assert_eq!(joined(&["a = ?", ";", "b"]), "a = ?; b");
    assert_eq!(joined(&["", "SELECT"]), "SELECT");
}

// ==================== PrefixedContext ====================

#[test]
fn prefix_waits_for_non_blank_content() {
    let evaluator = DefaultEvaluator::new();
    let mut root = RootContext::new(json!({}), None, &evaluator);
    let mut prefixed = PrefixedContext::new(&mut root, ", ");
    prefixed.append_sql("  ");
    assert!(!prefixed.is_prefix_applied());
    prefixed.append_sql("a");
    prefixed.append_sql("b");
    assert!(prefixed.is_prefix_applied());
    assert_eq!(root.sql(), ", a b");
}

#[test]
fn decorators_share_bindings_and_ids() {
    let evaluator = DefaultEvaluator::new();
    let mut root = RootContext::new(json!({}), None, &evaluator);
    {
        let mut prefixed = PrefixedContext::new(&mut root, "");
        prefixed.bind("x", json!(1));
        assert_eq!(prefixed.next_unique_id(), 0);
    }
    assert_eq!(root.bindings().get("x"), Some(&json!(1)));
    assert_eq!(root.next_unique_id(), 1);
}

// ==================== RenamingContext ====================

fn renamed(chunk: &str, item: Option<&str>, index: Option<&str>) -> String {
    let evaluator = DefaultEvaluator::new();
    let mut root = RootContext::new(json!({}), None, &evaluator);
    RenamingContext::new(&mut root, item, index, 3).append_sql(chunk);
    root.sql()
}

#[test]
fn renames_item_and_index() {
    assert_eq!(
        renamed("#{x} #{i}", Some("x"), Some("i")),
        "#{__frch_x_3} #{__frch_i_3}"
    );
}

#[test]
fn renames_properties_and_attributes() {
    assert_eq!(
        renamed("#{ x.name, jdbcType=VARCHAR} #{x:INTEGER} #{x[0]}", Some("x"), None),
        "#{__frch_x_3.name, jdbcType=VARCHAR} #{__frch_x_3:INTEGER} #{__frch_x_3[0]}"
    );
}

#[test]
fn leaves_shared_prefixes_and_other_names_alone() {
    assert_eq!(
        renamed("#{xs} #{y} ${x}", Some("x"), None),
        "#{xs} #{y} ${x}"
    );
}

#[test]
fn renaming_keeps_escapes() {
    assert_eq!(
        renamed("'\\#{x}' = #{x} AND #{x.a\\}b}", Some("x"), None),
        "'\\#{x}' = #{__frch_x_3} AND #{__frch_x_3.a\\}b}"
    );
}

#[test]
fn itemized_names() {
    assert_eq!(itemized_name("item", 0), "__frch_item_0");
}

// ==================== TrimmedContext ====================

#[test]
fn trimmed_context_buffers_until_applied() {
    let evaluator = DefaultEvaluator::new();
    let mut root = RootContext::new(json!({}), None, &evaluator);
    root.append_sql("SELECT 1");
    let mut trimmed = TrimmedContext::new(&mut root);
    trimmed.append_sql(" and x ");
    assert_eq!(trimmed.sql(), "SELECT 1");
    trimmed.apply_all(|body| body.trim().to_uppercase());
    assert_eq!(root.sql(), "SELECT 1 AND X");
}

#[test]
fn trimmed_context_drops_empty_results() {
    let evaluator = DefaultEvaluator::new();
    let mut root = RootContext::new(json!({}), None, &evaluator);
    let mut trimmed = TrimmedContext::new(&mut root);
    trimmed.append_sql("   ");
    trimmed.apply_all(|body| body.trim().to_string());
    assert_eq!(root.into_parts().0, "");
}
