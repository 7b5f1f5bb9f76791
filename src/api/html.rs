//! HTML rendering of the places listing.

use std::path::Path;

use anyhow::{Context, Result};
use handlebars::{Handlebars, RenderError};

use crate::models::PlacesPage;

/// Template embedded at compile time
const PLACES_TEMPLATE: &str = include_str!("../../templates/places.html");

const TEMPLATE_NAME: &str = "places";

/// Handlebars template rendered from a [`PlacesPage`] context.
#[derive(Clone)]
pub struct PageTemplate {
    registry: Handlebars<'static>,
}

impl PageTemplate {
    /// Load a template from `path`, or use the embedded one.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let source = match path {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read template {}", path.display()))?,
            None => PLACES_TEMPLATE.to_string(),
        };
        Self::parse(&source)
    }

    /// Compile `source`; syntax errors surface here rather than per request
    pub fn parse(source: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string(TEMPLATE_NAME, source)
            .context("Invalid places template")?;
        Ok(Self { registry })
    }

    pub fn render(&self, page: &PlacesPage) -> Result<String, RenderError> {
        self.registry.render(TEMPLATE_NAME, page)
    }
}
