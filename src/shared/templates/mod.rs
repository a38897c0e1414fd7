//! Page template management module.
//!
//! Templates use Jinja2 syntax; the gallery page lives at
//! `templates/gallery/index.html`.

mod engine;

pub use engine::{TemplateEngine, TemplateError};
