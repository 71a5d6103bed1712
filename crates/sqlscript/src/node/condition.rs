use super::SqlNode;
use crate::context::DynamicContext;
use crate::error::ScriptResult;

/// `<if test="...">` (also used for each `<when>` of a `<choose>`).
#[derive(Debug, Clone)]
pub struct IfNode {
    test: String,
    body: Box<SqlNode>,
}

impl IfNode {
    pub fn new(test: impl Into<String>, body: SqlNode) -> Self {
        Self {
            test: test.into(),
            body: Box::new(body),
        }
    }

    pub fn test(&self) -> &str {
        &self.test
    }

    pub(crate) fn apply(&self, ctx: &mut dyn DynamicContext) -> ScriptResult<bool> {
        if ctx.evaluator().evaluate_boolean(&self.test, ctx.bindings())? {
            self.body.apply(ctx)?;
            return Ok(true);
        }
        Ok(false)
    }
}

/// `<choose>`: the first matching `<when>`, else `<otherwise>`.
#[derive(Debug, Clone)]
pub struct ChooseNode {
    whens: Vec<IfNode>,
    otherwise: Option<Box<SqlNode>>,
}

impl ChooseNode {
    pub fn new(whens: Vec<IfNode>, otherwise: Option<SqlNode>) -> Self {
        Self {
            whens,
            otherwise: otherwise.map(Box::new),
        }
    }

    pub(crate) fn apply(&self, ctx: &mut dyn DynamicContext) -> ScriptResult<bool> {
        for when in &self.whens {
            if when.apply(ctx)? {
                return Ok(true);
            }
        }
        match &self.otherwise {
            Some(otherwise) => {
                otherwise.apply(ctx)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
