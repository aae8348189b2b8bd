//! Named templates of declarations.
//!
//! A template is a partial declaration. A declaration or state naming it with `template`
//! receives the template's `relative_time`, `add_time` and `states` where it has none of its
//! own, and the template's fields are overlaid on its state before the declaration's own.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::{state::non_null, storyboard::StoryboardError};

/// Fields a template hands down to the declaration itself, rather than to its state.
pub const INHERITED_FIELDS: [&str; 3] = ["relative_time", "add_time", "states"];

/// The `templates` section of a storyboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Templates {
    templates: HashMap<String, Map<String, Value>>,
}

impl Templates {
    /// Reads the `templates` section, an object mapping names to partial declarations.
    ///
    /// # Errors
    ///
    /// Returns [`StoryboardError::MalformedDocument`] if the section or one of its entries is
    /// not an object.
    pub fn from_section(section: &Value) -> Result<Self, StoryboardError> {
        let Some(section) = section.as_object() else {
            return Err(StoryboardError::MalformedDocument {
                path: "templates".into(),
                message: "expected an object of templates".into(),
            });
        };
        let templates = section
            .iter()
            .map(|(name, template)| {
                template
                    .as_object()
                    .map(|template| (name.clone(), template.clone()))
                    .ok_or_else(|| StoryboardError::MalformedDocument {
                        path: format!("templates.{name}"),
                        message: "expected an object".into(),
                    })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { templates })
    }

    /// Looks up a template by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoryboardError::UnknownTemplate`] if no template has the name.
    pub fn lookup(&self, name: &str) -> Result<&Map<String, Value>, StoryboardError> {
        self.templates
            .get(name)
            .ok_or_else(|| StoryboardError::UnknownTemplate(name.to_string()))
    }

    /// The template named by the `template` field of `declaration`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoryboardError`] if the name is not a string or no template has it.
    pub fn referenced_by(
        &self,
        declaration: &Map<String, Value>,
    ) -> Result<Option<&Map<String, Value>>, StoryboardError> {
        let Some(name) = non_null(declaration, "template") else {
            return Ok(None);
        };
        let name = name
            .as_str()
            .ok_or_else(|| StoryboardError::MalformedDocument {
                path: "template".into(),
                message: format!("expected a template name, found {name}"),
            })?;
        self.lookup(name).map(Some)
    }

    /// Copies the [`INHERITED_FIELDS`] of the referenced template into `declaration` where it
    /// leaves them unset, and returns the template.
    ///
    /// Fields already set on the declaration are never overwritten, so merging twice changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StoryboardError`] if the referenced template does not exist.
    pub fn merge_into(
        &self,
        declaration: &mut Map<String, Value>,
    ) -> Result<Option<&Map<String, Value>>, StoryboardError> {
        let Some(template) = self.referenced_by(declaration)? else {
            return Ok(None);
        };
        for field in INHERITED_FIELDS {
            if non_null(declaration, field).is_some() {
                continue;
            }
            if let Some(value) = non_null(template, field) {
                declaration.insert(field.to_string(), value.clone());
            }
        }
        Ok(Some(template))
    }

    /// Gets a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Map<String, Value>> {
        self.templates.get(name)
    }

    /// Iterates over the templates, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Map<String, Value>)> {
        self.templates
            .iter()
            .map(|(name, template)| (name.as_str(), template))
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether there is no template.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.templates.clear();
    }
}
