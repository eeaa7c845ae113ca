//! Project payloads returned by the admin projects endpoint.

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub short_name: String,
    pub name: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

/// Minimal project reference embedded in issues.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub short_name: Option<String>,
    pub name: Option<String>,
}
