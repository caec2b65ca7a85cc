//! Template system for binding code generation
//!
//! Contains the Handlebars skeletons of the emitted classes. Bodies are assembled
//! in Rust; templates only place them.

use bindgen_common::{Error, Result};
use handlebars::Handlebars;

pub const CONTRACT_CLASS_TEMPLATE: &str = "contract_class";
pub const TUPLE_CLASS_TEMPLATE: &str = "tuple_class";
pub const EVENT_CLASS_TEMPLATE: &str = "event_class";

/// Template manager for binding code generation
pub struct TemplateManager {
    handlebars: Handlebars<'static>,
}

impl TemplateManager {
    /// Create a new template manager and register all templates
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        // emitted code, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        Self::register_templates(&mut handlebars)?;

        Ok(Self { handlebars })
    }

    /// Register all built-in templates
    fn register_templates(handlebars: &mut Handlebars) -> Result<()> {
        let templates = [
            (CONTRACT_CLASS_TEMPLATE, include_str!("contract_class.hbs")),
            (TUPLE_CLASS_TEMPLATE, include_str!("tuple_class.hbs")),
            (EVENT_CLASS_TEMPLATE, include_str!("event_class.hbs")),
        ];

        for (name, source) in templates {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| Error::template(format!("Failed to register {} template: {}", name, e)))?;
        }

        Ok(())
    }

    /// Render a template with the given data. Trailing whitespace is dropped.
    pub fn render(&self, template_name: &str, data: &serde_json::Value) -> Result<String> {
        self.handlebars
            .render(template_name, data)
            .map(|rendered| rendered.trim_end().to_string())
            .map_err(|e| Error::template(format!("Failed to render template {}: {}", template_name, e)))
    }
}
