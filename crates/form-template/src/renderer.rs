//! Field rendering against a data context

use crate::filters::FORM_DATE;
use crate::session::{Overlay, RenderSession, SESSION_KEY};
use crate::{FieldRegistry, TemplateEnv};
use minijinja::Value;
use std::collections::BTreeMap;
use tracing::{debug, error};

/// Field name -> rendered string
pub type RenderedValues = BTreeMap<String, String>;

/// Result of one render pass
#[derive(Debug, Default)]
pub struct RenderOutput {
    pub values: RenderedValues,
    /// Image overlays recorded by `paste`, in call order
    pub overlays: Vec<Overlay>,
}

/// Render every templated field of `registry`
///
/// Each template sees `today` (local date), the caller's `data` on top of
/// it, and the current field. A field whose template fails is logged and
/// gets no value.
pub fn render(
    registry: &FieldRegistry,
    env: &TemplateEnv,
    data: &serde_json::Map<String, serde_json::Value>,
) -> RenderOutput {
    let session = RenderSession::new();
    let mut base: BTreeMap<String, Value> = data
        .iter()
        .map(|(key, value)| (key.clone(), Value::from_serialize(value)))
        .collect();
    base.entry("today".to_string())
        .or_insert_with(|| Value::from(chrono::Local::now().format(FORM_DATE).to_string()));

    let mut values = RenderedValues::new();
    for field in registry.iter() {
        let Some(template) = &field.template else {
            continue;
        };

        let mut context = base.clone();
        context.insert(SESSION_KEY.to_string(), session.enter(field));

        match env.render(template, &context) {
            Ok(rendered) => {
                values.entry(field.name.clone()).or_insert(rendered);
            }
            Err(e) => error!(field = %field.name, error = %e, "failed to render field"),
        }
    }

    let overlays = session.into_overlays();
    debug!(values = values.len(), overlays = overlays.len(), "render pass finished");
    RenderOutput { values, overlays }
}
