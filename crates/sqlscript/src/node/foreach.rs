use super::SqlNode;
use crate::context::{DynamicContext, PrefixedContext, RenamingContext, itemized_name};
use crate::error::ScriptResult;
use serde_json::Value;

/// `<foreach collection item index open close separator>`.
///
/// Each iteration binds `item` / `index` both plainly and under a unique
/// synthetic name, and renders the body through a [`RenamingContext`] so that
/// `#{item}` refers to that iteration's value even after the loop has moved on.
#[derive(Debug, Clone)]
pub struct ForEachNode {
    collection: String,
    body: Box<SqlNode>,
    item: Option<String>,
    index: Option<String>,
    open: Option<String>,
    close: Option<String>,
    separator: Option<String>,
    nullable: bool,
}

impl ForEachNode {
    pub fn new(collection: impl Into<String>, body: SqlNode) -> Self {
        Self {
            collection: collection.into(),
            body: Box::new(body),
            item: None,
            index: None,
            open: None,
            close: None,
            separator: None,
            nullable: false,
        }
    }

    pub fn item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn open(mut self, open: impl Into<String>) -> Self {
        self.open = Some(open.into());
        self
    }

    pub fn close(mut self, close: impl Into<String>) -> Self {
        self.close = Some(close.into());
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Render nothing (instead of failing) when the collection is null.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub(crate) fn apply(&self, ctx: &mut dyn DynamicContext) -> ScriptResult<bool> {
        let elements = ctx.evaluator().evaluate_iterable(
            &self.collection,
            ctx.bindings(),
            self.nullable,
        )?;
        if elements.is_empty() {
            return Ok(true);
        }

        if let Some(open) = &self.open {
            ctx.append_sql(open);
        }

        let separator = self.separator.as_deref().unwrap_or("");
        // True until some iteration has produced non-blank output.
        let mut first = true;
        for element in elements {
            let mut prefixed = PrefixedContext::new(ctx, if first { "" } else { separator });
            let id = prefixed.next_unique_id();
            bind_loop_var(&mut prefixed, self.index.as_deref(), element.index, id);
            bind_loop_var(&mut prefixed, self.item.as_deref(), element.item, id);

            let mut renaming = RenamingContext::new(
                &mut prefixed,
                self.item.as_deref(),
                self.index.as_deref(),
                id,
            );
            self.body.apply(&mut renaming)?;

            if first {
                first = !prefixed.is_prefix_applied();
            }
        }

        if let Some(close) = &self.close {
            ctx.append_sql(close);
        }

        for name in [&self.item, &self.index].into_iter().flatten() {
            ctx.bindings_mut().remove(name);
        }
        Ok(true)
    }
}

fn bind_loop_var(ctx: &mut dyn DynamicContext, name: Option<&str>, value: Value, id: usize) {
    if let Some(name) = name {
        ctx.bind(&itemized_name(name, id), value.clone());
        ctx.bind(name, value);
    }
}
