use serde::Serialize;

use crate::features::gallery::models::ImageRecord;

/// One card on the home page
#[derive(Debug, Clone, Serialize)]
pub struct GalleryImageDto {
    pub name: String,
    pub user_id: String,
    pub file_name: String,
    pub title: String,
    pub description: String,
}

impl From<ImageRecord> for GalleryImageDto {
    fn from(record: ImageRecord) -> Self {
        let (user_id, file_name) = record.location();
        Self {
            user_id: user_id.to_string(),
            file_name: file_name.to_string(),
            name: record.name,
            title: record.title,
            description: record.description,
        }
    }
}

/// Template context for `gallery/index.html`
#[derive(Debug, Serialize)]
pub struct HomePageDto {
    pub images: Vec<GalleryImageDto>,
}

impl HomePageDto {
    pub fn new(records: Vec<ImageRecord>) -> Self {
        Self {
            images: records.into_iter().map(GalleryImageDto::from).collect(),
        }
    }
}
