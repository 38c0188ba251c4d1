//! Export artifact handed to the download collaborator

use serde::{Deserialize, Serialize};

/// Content type used for exported log text
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// Binary object wrapping exported log text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportArtifact {
    #[serde(rename = "type")]
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Wrap export text as a downloadable artifact
    pub fn from_text(text: String) -> Self {
        Self {
            content_type: TEXT_CONTENT_TYPE.to_string(),
            bytes: text.into_bytes(),
        }
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content as text (lossy for non UTF-8 bytes)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}
