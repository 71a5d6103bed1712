use crate::accessor::{JsonAccessor, PropertyAccessor};
use crate::config::ScriptConfig;
use crate::error::ScriptResult;
use crate::expr::{DefaultEvaluator, ExpressionEvaluator};
use crate::script::ScriptBuilder;
use crate::source::{BoundSql, SqlSource, SqlSourceBuilder};
use crate::template::TemplateNode;
use crate::type_handler::TypeHandlerRegistry;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Shared, immutable bundle of everything compilation and rendering need.
///
/// Cloning is cheap; compiled [`SqlSource`]s keep a clone.
///
/// ```ignore
/// use sqlscript::{ScriptConfig, ScriptEngine, TemplateNode};
/// use serde_json::json;
///
/// let engine = ScriptEngine::new(ScriptConfig::new());
/// let source = engine.compile(&TemplateNode::element(
///     "select",
///     &[],
///     vec![TemplateNode::text("SELECT * FROM users WHERE id = #{id}")],
/// ))?;
/// let bound = source.bound_sql(json!({"id": 7}))?;
/// assert_eq!(bound.sql(), "SELECT * FROM users WHERE id = ?");
/// ```
#[derive(Clone)]
pub struct ScriptEngine {
    config: Arc<ScriptConfig>,
    evaluator: Arc<dyn ExpressionEvaluator>,
    accessor: Arc<dyn PropertyAccessor>,
    type_handlers: Arc<TypeHandlerRegistry>,
}

impl fmt::Debug for ScriptEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptEngine")
            .field("config", &self.config)
            .field("type_handlers", &self.type_handlers)
            .finish_non_exhaustive()
    }
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new(ScriptConfig::default())
    }
}

impl ScriptEngine {
    /// Create an engine with the default evaluator, accessor and type handlers.
    pub fn new(config: ScriptConfig) -> Self {
        let evaluator = DefaultEvaluator::with_cache_capacity(config.expression_cache_capacity);
        Self {
            config: Arc::new(config),
            evaluator: Arc::new(evaluator),
            accessor: Arc::new(JsonAccessor),
            type_handlers: Arc::new(TypeHandlerRegistry::default()),
        }
    }

    /// Replace the expression evaluator.
    pub fn with_evaluator(mut self, evaluator: impl ExpressionEvaluator + 'static) -> Self {
        self.evaluator = Arc::new(evaluator);
        self
    }

    /// Replace the property accessor.
    pub fn with_accessor(mut self, accessor: impl PropertyAccessor + 'static) -> Self {
        self.accessor = Arc::new(accessor);
        self
    }

    /// Replace the type handler registry.
    pub fn with_type_handlers(mut self, registry: TypeHandlerRegistry) -> Self {
        self.type_handlers = Arc::new(registry);
        self
    }

    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &dyn ExpressionEvaluator {
        self.evaluator.as_ref()
    }

    pub fn accessor(&self) -> &dyn PropertyAccessor {
        self.accessor.as_ref()
    }

    pub fn type_handlers(&self) -> &TypeHandlerRegistry {
        &self.type_handlers
    }

    pub(crate) fn accessor_handle(&self) -> Arc<dyn PropertyAccessor> {
        Arc::clone(&self.accessor)
    }

    /// The placeholder pass configured for this engine.
    pub fn source_builder(&self) -> SqlSourceBuilder<'_> {
        SqlSourceBuilder::new(&self.config, self.accessor(), &self.type_handlers)
    }

    /// A builder for compiling templates with per-statement options.
    pub fn builder(&self) -> ScriptBuilder<'_> {
        ScriptBuilder::new(self)
    }

    /// Compile a statement template (the children of `template` form the body).
    pub fn compile(&self, template: &TemplateNode) -> ScriptResult<SqlSource> {
        self.builder().build(template)
    }

    /// Compile a template given as plain text (no control elements).
    pub fn compile_text(&self, text: &str) -> ScriptResult<SqlSource> {
        self.builder().build_text(text)
    }

    /// Compile and render in one step.
    pub fn render(&self, template: &TemplateNode, parameter: Value) -> ScriptResult<BoundSql> {
        self.compile(template)?.bound_sql(parameter)
    }
}
