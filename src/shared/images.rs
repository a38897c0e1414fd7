//! Image filename rules shared by uploads, listing and captioning

/// Extensions accepted for upload and recognized when listing, lowercase
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Lowercased extension of `name`, if it has one
fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Whether `name` ends in .jpg, .jpeg or .png (case-insensitive)
pub fn is_allowed_image(name: &str) -> bool {
    extension(name).is_some_and(|ext| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// MIME type declared for an image, derived from its extension
pub fn image_content_type(name: &str) -> Option<&'static str> {
    match extension(name)?.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}
