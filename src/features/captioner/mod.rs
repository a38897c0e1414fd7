pub mod models;
pub mod services;

pub use models::Caption;
pub use services::{Captioner, GeminiCaptioner};
