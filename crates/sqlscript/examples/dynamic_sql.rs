//! Dynamic SQL template example
//!
//! Run with: cargo run --example dynamic_sql -p sqlscript
//!
//! Compiles one search template (read from JSON) and renders it for a few
//! parameter objects, printing the SQL and the positional values.

use serde_json::json;
use sqlscript::{PlaceholderStyle, ScriptConfig, ScriptEngine, ScriptError, TemplateNode};

const SEARCH_TASKS: &str = r##"
{"element": {"name": "select", "children": [
    {"text": "SELECT id, title, status, priority FROM tasks"},
    {"element": {"name": "where", "children": [
        {"element": {"name": "if", "attributes": [["test", "status != null"]],
                     "children": [{"text": "AND status = #{status}"}]}},
        {"element": {"name": "if", "attributes": [["test", "min_priority != null"]],
                     "children": [{"text": "AND priority >= #{min_priority}"}]}},
        {"element": {"name": "if", "attributes": [["test", "title != null and title.trim().length() > 0"]],
                     "children": [
                        {"element": {"name": "bind", "attributes": [["name", "title_like"], ["value", "'%' + title.trim() + '%'"]]}},
                        {"text": "AND title ILIKE #{title_like}"}
                     ]}},
        {"element": {"name": "if", "attributes": [["test", "ids != null and !ids.isEmpty()"]],
                     "children": [
                        {"text": "AND id IN"},
                        {"element": {"name": "foreach",
                                     "attributes": [["collection", "ids"], ["item", "id"], ["open", "("], ["close", ")"], ["separator", ","]],
                                     "children": [{"text": "#{id}"}]}}
                     ]}}
    ]}},
    {"text": "ORDER BY ${order}"}
]}}
"##;

fn main() -> Result<(), ScriptError> {
    let config = ScriptConfig::new()
        .with_placeholder_style(PlaceholderStyle::Dollar)
        .with_injection_filter("[a-z_]+( (ASC|DESC))?")?;
    let engine = ScriptEngine::new(config);

    let template: TemplateNode = serde_json::from_str(SEARCH_TASKS)
        .map_err(|e| ScriptError::build(format!("invalid template JSON: {e}")))?;
    let source = engine.builder().id("tasks.search").build(&template)?;

    let filters = [
        json!({"order": "id"}),
        json!({"status": "open", "min_priority": 3, "order": "priority DESC"}),
        json!({"title": "  deploy ", "ids": [4, 8, 15], "order": "title"}),
    ];

    for filter in filters {
        let bound = source.bound_sql(filter)?;
        println!("SQL:    {}", bound.sql());
        println!("Params: {:?}", bound.parameter_values()?);
        println!();
    }

    // Substitutions that do not match the filter are rejected.
    match source.bound_sql(json!({"order": "id; DROP TABLE tasks"})) {
        Err(e) if e.is_injection_rejected() => println!("Rejected: {e}"),
        other => println!("Unexpected: {other:?}"),
    }

    Ok(())
}
