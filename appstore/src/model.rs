//! Resource types exchanged with clients.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// A stored app. The id is assigned by the repository on creation and never changes afterwards.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub label: String,
    pub description: String,
}

/// Payload for creating and updating apps. A field which is `None` was absent from the request,
/// which is different from being explicitly set to an empty string.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct AppUpdateRequest {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl AppUpdateRequest {
    /// Creates a request with all fields present.
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            description: Some(description.into()),
        }
    }

    /// Checks if all required fields are present and returns them as `(label, description)`.
    pub fn validate(self) -> Result<(String, String), ValidationError> {
        let label = self.label.ok_or(ValidationError::MissingField("Label"))?;
        let description = self
            .description
            .ok_or(ValidationError::MissingField("Description"))?;

        Ok((label, description))
    }

    /// Overwrites fields of given app with the fields present in this request.
    pub fn apply_to(self, app: &mut App) {
        if let Some(label) = self.label {
            app.label = label;
        }
        if let Some(description) = self.description {
            app.description = description;
        }
    }
}

/// How an update request should be applied to an existing app.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum UpdateMode {
    /// All required fields must be present and replace the current values (`PUT`).
    Full,
    /// Only present fields replace the current values (`PATCH`).
    Partial,
}
