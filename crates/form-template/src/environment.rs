//! Shared template environment

use crate::{filters, Result, TemplateError};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;

/// Handle to a template compiled into a [`TemplateEnv`]
///
/// Templates are keyed by field name; compiling again under the same name
/// replaces the previous template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    name: String,
}

impl CompiledTemplate {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Template environment shared by every field of one form
///
/// Undefined variables (and anything looked up on them) render as empty
/// strings. Output is never escaped.
pub struct TemplateEnv {
    env: Environment<'static>,
}

impl TemplateEnv {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        filters::register(&mut env);
        Self { env }
    }

    /// Compile `source` for the field `name`
    pub fn compile(&mut self, name: &str, source: &str) -> Result<CompiledTemplate> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())
            .map_err(|source| TemplateError::CompileError {
                field: name.to_string(),
                source,
            })?;

        Ok(CompiledTemplate {
            name: name.to_string(),
        })
    }

    /// Evaluate a compiled template against `context`
    pub fn render<S: Serialize>(
        &self,
        template: &CompiledTemplate,
        context: S,
    ) -> std::result::Result<String, minijinja::Error> {
        self.env.get_template(&template.name)?.render(context)
    }
}

impl Default for TemplateEnv {
    fn default() -> Self {
        Self::new()
    }
}
