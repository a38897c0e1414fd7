pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::{routes, GalleryState};
pub use services::{GalleryService, UploadService};
