use super::{DynamicContext, delegate_context};

/// Writes `prefix` once, just before the first non-blank chunk.
pub struct PrefixedContext<'a> {
    delegate: &'a mut dyn DynamicContext,
    prefix: &'a str,
    prefix_applied: bool,
}

impl<'a> PrefixedContext<'a> {
    pub fn new(delegate: &'a mut dyn DynamicContext, prefix: &'a str) -> Self {
        Self {
            delegate,
            prefix,
            prefix_applied: false,
        }
    }

    /// Whether any non-blank content has passed through.
    pub fn is_prefix_applied(&self) -> bool {
        self.prefix_applied
    }
}

impl DynamicContext for PrefixedContext<'_> {
    fn append_sql(&mut self, sql: &str) {
        if !self.prefix_applied && !sql.trim().is_empty() {
            self.delegate.append_sql(self.prefix);
            self.prefix_applied = true;
        }
        self.delegate.append_sql(sql);
    }

    delegate_context!();
}
