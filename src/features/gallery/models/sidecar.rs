use thiserror::Error;

use crate::core::error::AppError;

#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("Sidecar {name} is missing: {source}")]
    Missing {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Sidecar {name} has {lines} line(s), expected title and description")]
    Incomplete { name: String, lines: usize },
}

impl From<SidecarError> for AppError {
    fn from(err: SidecarError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Text file stored next to an image: title on line 1, description on line 2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidecar {
    pub title: String,
    pub description: String,
}

impl Sidecar {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// File contents: the two lines joined by `\n`, no trailing newline
    pub fn render(&self) -> String {
        format!("{}\n{}", self.title, self.description)
    }

    /// Parse sidecar contents; `name` is only used for error messages
    pub fn parse(name: &str, contents: &str) -> Result<Self, SidecarError> {
        let mut lines = contents.lines();
        match (lines.next(), lines.next()) {
            (Some(title), Some(description)) => Ok(Self::new(title, description)),
            (first, _) => Err(SidecarError::Incomplete {
                name: name.to_string(),
                lines: usize::from(first.is_some()),
            }),
        }
    }
}

/// Sidecar object name for an image: the text after the last `.` becomes `txt`
///
/// `default_user/cat.jpg` -> `default_user/cat.txt`
pub fn sidecar_name(image_name: &str) -> String {
    match image_name.rsplit_once('.') {
        Some((stem, _)) => format!("{}.txt", stem),
        None => format!("{}.txt", image_name),
    }
}
