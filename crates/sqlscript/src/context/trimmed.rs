use super::{DynamicContext, delegate_context, join_sql};

/// Collects a body privately so it can be rewritten before reaching the delegate.
pub struct TrimmedContext<'a> {
    delegate: &'a mut dyn DynamicContext,
    buffer: String,
}

impl<'a> TrimmedContext<'a> {
    pub fn new(delegate: &'a mut dyn DynamicContext) -> Self {
        Self {
            delegate,
            buffer: String::new(),
        }
    }

    /// Run `rewrite` over the buffered body and flush the result.
    pub fn apply_all(self, rewrite: impl FnOnce(&str) -> String) {
        let clause = rewrite(&self.buffer);
        self.delegate.append_sql(&clause);
    }
}

impl DynamicContext for TrimmedContext<'_> {
    fn append_sql(&mut self, sql: &str) {
        join_sql(&mut self.buffer, sql);
    }

    delegate_context!();
}
