use serde_json::{Map, Value};

pub const NO_TITLE_PLACEHOLDER: &str = "No Title Available";
pub const NO_DESCRIPTION_PLACEHOLDER: &str = "No Description Available";
pub const ERROR_TITLE_PLACEHOLDER: &str = "Error generating title";
pub const ERROR_DESCRIPTION_PLACEHOLDER: &str = "Error generating description";

/// Title and description produced for an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caption {
    /// The model replied with a JSON object. Missing keys were filled with
    /// the "No ... Available" placeholders.
    Generated { title: String, description: String },
    /// The reply was not a JSON object
    Unparseable { reason: String },
}

impl Caption {
    /// Interpret the model's reply text. The model runs in JSON mode, so
    /// anything other than a bare JSON object is unparseable.
    pub fn from_reply(text: &str) -> Self {
        match serde_json::from_str::<Map<String, Value>>(text) {
            Ok(object) => Caption::Generated {
                title: field_text(&object, "title")
                    .unwrap_or_else(|| NO_TITLE_PLACEHOLDER.to_string()),
                description: field_text(&object, "description")
                    .unwrap_or_else(|| NO_DESCRIPTION_PLACEHOLDER.to_string()),
            },
            Err(e) => Caption::Unparseable {
                reason: e.to_string(),
            },
        }
    }

    /// Title to display and store; placeholder text for unparseable replies
    pub fn title(&self) -> &str {
        match self {
            Caption::Generated { title, .. } => title,
            Caption::Unparseable { .. } => ERROR_TITLE_PLACEHOLDER,
        }
    }

    /// Description to display and store; placeholder text for unparseable replies
    pub fn description(&self) -> &str {
        match self {
            Caption::Generated { description, .. } => description,
            Caption::Unparseable { .. } => ERROR_DESCRIPTION_PLACEHOLDER,
        }
    }
}

/// String value of `key`; other scalars are rendered as JSON text, null counts as missing
fn field_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
