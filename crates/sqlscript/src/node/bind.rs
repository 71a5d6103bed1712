use crate::context::DynamicContext;
use crate::error::ScriptResult;

/// `<bind name="..." value="...">`: evaluate once and expose the result.
#[derive(Debug, Clone)]
pub struct BindNode {
    name: String,
    value: String,
}

impl BindNode {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub(crate) fn apply(&self, ctx: &mut dyn DynamicContext) -> ScriptResult<bool> {
        let value = ctx.evaluator().evaluate(&self.value, ctx.bindings())?;
        ctx.bind(&self.name, value);
        Ok(true)
    }
}
