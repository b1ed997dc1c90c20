//! Field registry built from a document's widget annotations

use crate::{CompiledTemplate, TemplateEnv, TemplateError};
use pdf_core::{decode_text_string, Rect, WidgetAnnotation};
use std::collections::HashMap;
use tracing::{debug, error};

/// A named form field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    /// Page of the first widget seen with this name (0-based)
    pub page: usize,
    pub rect: Option<Rect>,
    pub template: Option<CompiledTemplate>,
}

/// Fields in discovery order, looked up by name
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl FieldRegistry {
    /// Register every widget, compiling tooltips into `env`
    ///
    /// A tooltip that fails to decode or compile is logged and leaves the
    /// field's template as it was.
    pub fn scan(widgets: Vec<WidgetAnnotation>, env: &mut TemplateEnv) -> Self {
        let mut registry = Self::default();

        for widget in widgets {
            let anchors = widget.anchors_rect();
            let slot = registry.entry(&widget.name, widget.page);
            let field = &mut registry.fields[slot];

            if anchors {
                field.rect = widget.rect;
            }

            let Some(raw) = widget.tooltip.as_deref() else {
                continue;
            };

            let compiled = decode_text_string(raw)
                .map_err(|reason| TemplateError::DecodeError {
                    field: widget.name.clone(),
                    reason,
                })
                .and_then(|text| env.compile(&widget.name, &text));

            match compiled {
                Ok(template) => field.template = Some(template),
                Err(e) => error!(field = %widget.name, error = %e, "skipping field template"),
            }
        }

        debug!(fields = registry.len(), "field registry built");
        registry
    }

    fn entry(&mut self, name: &str, page: usize) -> usize {
        if let Some(&slot) = self.index.get(name) {
            return slot;
        }

        self.fields.push(Field {
            name: name.to_string(),
            page,
            rect: None,
            template: None,
        });
        self.index.insert(name.to_string(), self.fields.len() - 1);
        self.fields.len() - 1
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&slot| &self.fields[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_core::FieldType;
    use pretty_assertions::assert_eq;

    fn widget(name: &str, page: usize, rect: Option<Rect>, tooltip: Option<&[u8]>) -> WidgetAnnotation {
        WidgetAnnotation {
            page,
            name: name.to_string(),
            field_type: Some(FieldType::Text),
            rect,
            tooltip: tooltip.map(<[u8]>::to_vec),
        }
    }

    #[test]
    fn test_first_seen_page_wins() {
        let mut env = TemplateEnv::new();
        let registry = FieldRegistry::scan(
            vec![
                widget("name", 2, Some(Rect::new(0.0, 0.0, 10.0, 10.0)), None),
                widget("name", 0, Some(Rect::new(5.0, 5.0, 20.0, 20.0)), None),
            ],
            &mut env,
        );

        assert_eq!(registry.len(), 1);
        let field = registry.get("name").unwrap();
        assert_eq!(field.page, 2);
        assert_eq!(field.rect, Some(Rect::new(5.0, 5.0, 20.0, 20.0)));
    }

    #[test]
    fn test_untyped_widget_keeps_rect() {
        let mut env = TemplateEnv::new();
        let mut untyped = widget("name", 0, Some(Rect::new(1.0, 1.0, 2.0, 2.0)), None);
        untyped.field_type = None;

        let registry = FieldRegistry::scan(
            vec![
                widget("name", 0, Some(Rect::new(5.0, 5.0, 20.0, 20.0)), None),
                untyped,
            ],
            &mut env,
        );

        assert_eq!(
            registry.get("name").unwrap().rect,
            Some(Rect::new(5.0, 5.0, 20.0, 20.0))
        );
    }

    #[test]
    fn test_utf16_tooltip_compiles() {
        let mut env = TemplateEnv::new();
        let mut tooltip = vec![0xFE, 0xFF];
        for unit in "{{ who }}".encode_utf16() {
            tooltip.extend_from_slice(&unit.to_be_bytes());
        }

        let registry = FieldRegistry::scan(vec![widget("greeting", 0, None, Some(&tooltip))], &mut env);
        let template = registry.get("greeting").unwrap().template.clone().unwrap();

        let rendered = env
            .render(&template, minijinja::context! { who => "world" })
            .unwrap();
        assert_eq!(rendered, "world");
    }

    #[test]
    fn test_broken_tooltips_leave_field_without_template() {
        let mut env = TemplateEnv::new();
        let registry = FieldRegistry::scan(
            vec![
                widget("syntax", 0, None, Some(b"{{ oops")),
                widget("encoding", 0, None, Some(b"\xff\xfe")),
                widget("fine", 1, None, Some(b"ok")),
            ],
            &mut env,
        );

        assert_eq!(registry.len(), 3);
        assert!(registry.get("syntax").unwrap().template.is_none());
        assert!(registry.get("encoding").unwrap().template.is_none());
        assert!(registry.get("fine").unwrap().template.is_some());
    }

    #[test]
    fn test_iteration_follows_discovery_order() {
        let mut env = TemplateEnv::new();
        let registry = FieldRegistry::scan(
            vec![
                widget("b", 0, None, None),
                widget("a", 0, None, None),
                widget("b", 1, None, None),
            ],
            &mut env,
        );

        let names: Vec<&str> = registry.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
