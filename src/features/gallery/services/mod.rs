mod gallery_service;
mod upload_service;

pub use gallery_service::GalleryService;
pub use upload_service::{UploadService, INVALID_FILE_FORMAT, NO_FILE_SELECTED};
