use super::Sidecar;

/// A captioned image in the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Object name, `<user_id>/<filename>`
    pub name: String,
    pub title: String,
    pub description: String,
}

impl ImageRecord {
    pub fn from_sidecar(name: impl Into<String>, sidecar: Sidecar) -> Self {
        Self {
            name: name.into(),
            title: sidecar.title,
            description: sidecar.description,
        }
    }

    /// Splits the object name at its first `/` into user folder and file name
    pub fn location(&self) -> (&str, &str) {
        self.name.split_once('/').unwrap_or(("", &self.name))
    }
}
