//! Attachment metadata embedded in issue payloads.

use serde::Deserialize;

/// Attachment metadata returned by YouTrack, including stable id, file name, download URL and mime type.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: Option<String>,
    pub url: Option<String>,
    pub mime_type: Option<String>,
}
