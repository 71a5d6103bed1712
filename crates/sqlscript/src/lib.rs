//! # sqlscript
//!
//! A dynamic SQL template compiler.
//!
//! Templates mix SQL text with control elements (`if`, `choose`, `where`,
//! `set`, `trim`, `foreach`, `bind`). Compiling one yields a [`SqlSource`];
//! rendering that against a parameter object yields a [`BoundSql`]: SQL with
//! positional markers plus an ordered list of [`ParameterMapping`]s.
//!
//! ## Placeholders
//!
//! - `#{property, attr=value, ...}` becomes a bound parameter (`?` or `$n`).
//! - `${expression}` is substituted into the SQL text as-is, optionally
//!   checked against an injection filter.
//!
//! Rendered pieces are joined with a single space, except after `(` and
//! before `)`, `,` or `;`, so a `foreach` with separator `","` yields
//! `(?, ?, ?)`.
//!
//! ## Example
//!
//! ```ignore
//! use sqlscript::{ScriptEngine, TemplateNode};
//! use serde_json::json;
//!
//! let engine = ScriptEngine::default();
//! let template = TemplateNode::element("select", &[], vec![
//!     TemplateNode::text("SELECT * FROM users"),
//!     TemplateNode::element("where", &[], vec![
//!         TemplateNode::element("if", &[("test", "name != null")], vec![
//!             TemplateNode::text("AND name = #{name}"),
//!         ]),
//!         TemplateNode::element("if", &[("test", "ids != null and ids.size() > 0")], vec![
//!             TemplateNode::text("AND id IN"),
//!             TemplateNode::element(
//!                 "foreach",
//!                 &[("collection", "ids"), ("item", "id"), ("open", "("), ("close", ")"), ("separator", ",")],
//!                 vec![TemplateNode::text("#{id}")],
//!             ),
//!         ]),
//!     ]),
//! ]);
//!
//! let bound = engine.render(&template, json!({"name": "alice", "ids": [1, 2]}))?;
//! assert_eq!(bound.sql(), "SELECT * FROM users WHERE name = ? AND id IN (?, ?)");
//! assert_eq!(bound.parameter_values()?, vec![json!("alice"), json!(1), json!(2)]);
//! ```

pub mod accessor;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod expr;
pub mod kind;
pub mod node;
pub mod parsing;
pub mod script;
pub mod source;
pub mod template;
pub mod type_handler;
pub mod value;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use accessor::{JsonAccessor, PropertyAccessor};
pub use config::{PlaceholderStyle, ScriptConfig};
pub use context::{Bindings, DynamicContext};
pub use engine::ScriptEngine;
pub use error::{ScriptError, ScriptResult};
pub use expr::{DefaultEvaluator, ExpressionEvaluator, LoopElement};
pub use kind::StatementKind;
pub use node::SqlNode;
pub use script::ScriptBuilder;
pub use source::{
    BoundSql, DynamicSqlSource, JdbcType, ParameterMapping, ParameterMode, RawSqlSource,
    SqlSource, StaticSqlSource,
};
pub use template::TemplateNode;
pub use type_handler::{TypeHandler, TypeHandlerRegistry};
pub use value::ValueType;

#[cfg(feature = "postgres")]
pub use postgres::{Param, ParamList};
