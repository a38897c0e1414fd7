//! Test doubles for the gallery's external collaborators

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::core::error::{AppError, Result};
use crate::features::captioner::{Caption, Captioner};
use crate::modules::storage::{ObjectInfo, ObjectStorage};

/// An object stored by [`InMemoryStorage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Bucket kept in memory, in insertion order
#[derive(Default)]
pub struct InMemoryStorage {
    objects: Mutex<Vec<StoredObject>>,
    fail_uploads: bool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose uploads always fail
    pub fn failing() -> Self {
        Self {
            objects: Mutex::new(Vec::new()),
            fail_uploads: true,
        }
    }

    /// Pre-populate an object without going through `upload`
    pub fn with_object(self, key: &str, data: &[u8]) -> Self {
        self.objects.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            data: data.to_vec(),
            content_type: "application/octet-stream".to_string(),
        });
        self
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects().into_iter().find(|o| o.key == key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects().into_iter().map(|o| o.key).collect()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn list_objects(&self) -> std::result::Result<Vec<ObjectInfo>, AppError> {
        Ok(self
            .objects()
            .into_iter()
            .map(|o| ObjectInfo {
                size: Some(o.data.len() as u64),
                name: o.key,
            })
            .collect())
    }

    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> std::result::Result<(), AppError> {
        if self.fail_uploads {
            return Err(AppError::Storage(format!("upload of {} rejected", key)));
        }
        let mut objects = self.objects.lock().unwrap();
        objects.retain(|o| o.key != key);
        objects.push(StoredObject {
            key: key.to_string(),
            data,
            content_type: content_type.to_string(),
        });
        Ok(())
    }

    fn bucket_name(&self) -> &str {
        "test-bucket"
    }
}

/// Captioner returning a fixed caption and recording the paths it was given
pub struct FakeCaptioner {
    caption: Caption,
    calls: Mutex<Vec<PathBuf>>,
    fail: bool,
}

impl FakeCaptioner {
    pub fn returning(title: &str, description: &str) -> Self {
        Self::with_caption(Caption::Generated {
            title: title.to_string(),
            description: description.to_string(),
        })
    }

    pub fn with_caption(caption: Caption) -> Self {
        Self {
            caption,
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Captioner whose upstream call always fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning("", "")
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Captioner for FakeCaptioner {
    async fn caption(&self, image_path: &Path) -> Result<Caption> {
        // The real captioner reads the file, so it must exist by now
        assert!(
            image_path.exists(),
            "captioner called before {} was written",
            image_path.display()
        );
        self.calls.lock().unwrap().push(image_path.to_path_buf());
        if self.fail {
            return Err(AppError::ExternalService("model unavailable".to_string()));
        }
        Ok(self.caption.clone())
    }
}
