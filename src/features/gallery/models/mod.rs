mod image_record;
mod sidecar;

pub use image_record::ImageRecord;
pub use sidecar::{sidecar_name, Sidecar, SidecarError};
