use super::{DynamicContext, delegate_context};
use crate::parsing::PARAMETER_TOKENS;

/// Synthetic name a `foreach` variable is bound under for one iteration.
pub fn itemized_name(name: &str, id: usize) -> String {
    format!("__frch_{name}_{id}")
}

/// Rewrites the loop's item/index names inside `#{...}` bodies to their
/// per-iteration names before forwarding.
pub struct RenamingContext<'a> {
    delegate: &'a mut dyn DynamicContext,
    item: Option<&'a str>,
    index: Option<&'a str>,
    id: usize,
}

impl<'a> RenamingContext<'a> {
    pub fn new(
        delegate: &'a mut dyn DynamicContext,
        item: Option<&'a str>,
        index: Option<&'a str>,
        id: usize,
    ) -> Self {
        Self {
            delegate,
            item,
            index,
            id,
        }
    }

    fn rename(&self, body: &str) -> String {
        for name in [self.item, self.index].into_iter().flatten() {
            if let Some(rest) = strip_leading_name(body, name) {
                return format!("{}{rest}", itemized_name(name, self.id));
            }
        }
        body.to_string()
    }
}

/// `rest` if `body` starts (after whitespace) with exactly `name`.
fn strip_leading_name<'b>(body: &'b str, name: &str) -> Option<&'b str> {
    let rest = body.trim_start().strip_prefix(name)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() || matches!(c, '.' | ',' | ':' | '[') => Some(rest),
        Some(_) => None,
    }
}

impl DynamicContext for RenamingContext<'_> {
    fn append_sql(&mut self, sql: &str) {
        // Escapes are kept: the placeholder pass scans this text again.
        let renamed = PARAMETER_TOKENS.rewrite(sql, |body| self.rename(body));
        self.delegate.append_sql(&renamed);
    }

    delegate_context!();
}
