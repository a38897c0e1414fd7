//! HTML template engine using Jinja2 syntax.
//!
//! Page templates ship embedded in the binary. A template directory can be
//! configured to override them at startup without rebuilding.

use minijinja::Environment;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Templates compiled into the binary, keyed by template name
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[(
    "gallery/index.html",
    include_str!("../../../templates/gallery/index.html"),
)];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to load template '{name}': {message}")]
    LoadError { name: String, message: String },

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

/// Owns the template environment; built once in `main` and shared via `Arc`
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Environment with only the embedded templates
    pub fn embedded() -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        for &(name, source) in EMBEDDED_TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| TemplateError::LoadError {
                    name: name.to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(Self { env })
    }

    /// Embedded templates, overridden by any `.html`/`.jinja` files under `dir`
    pub fn with_overrides(dir: &Path) -> Result<Self, TemplateError> {
        let mut engine = Self::embedded()?;
        if dir.exists() {
            load_templates_recursive(&mut engine.env, dir, dir)?;
        } else {
            tracing::warn!("Template directory {} does not exist", dir.display());
        }
        Ok(engine)
    }

    pub fn render<S: Serialize>(&self, template_name: &str, ctx: S) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(template_name)
            .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

        template
            .render(ctx)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }

    pub fn template_names(&self) -> Vec<String> {
        self.env
            .templates()
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

/// Recursively load all .html and .jinja templates from a directory
fn load_templates_recursive(
    env: &mut Environment<'static>,
    base_path: &Path,
    current_path: &Path,
) -> Result<(), TemplateError> {
    let entries = std::fs::read_dir(current_path).map_err(|e| TemplateError::LoadError {
        name: current_path.display().to_string(),
        message: e.to_string(),
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            load_templates_recursive(env, base_path, &path)?;
            continue;
        }
        if !path
            .extension()
            .is_some_and(|ext| ext == "html" || ext == "jinja")
        {
            continue;
        }

        let Ok(relative) = path.strip_prefix(base_path) else {
            continue;
        };
        let template_name = relative.to_string_lossy().replace('\\', "/");
        let content = std::fs::read_to_string(&path).map_err(|e| TemplateError::LoadError {
            name: template_name.clone(),
            message: e.to_string(),
        })?;

        // Templates live for the whole process
        let static_name: &'static str = Box::leak(template_name.clone().into_boxed_str());
        let static_content: &'static str = Box::leak(content.into_boxed_str());
        env.add_template(static_name, static_content)
            .map_err(|e| TemplateError::LoadError {
                name: template_name.clone(),
                message: e.to_string(),
            })?;
        tracing::debug!("Loaded template: {}", template_name);
    }

    Ok(())
}
