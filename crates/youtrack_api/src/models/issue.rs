use crate::models::{Attachment, ProjectRef, User};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: Option<String>,
    pub id_readable: String,
    pub summary: Option<String>,
    /// Resolution timestamp in epoch millis, `null` while unresolved.
    #[serde(default)]
    pub resolved: Option<i64>,
    #[serde(default)]
    pub votes: Option<u32>,
    #[serde(default)]
    pub reporter: Option<User>,
    #[serde(default)]
    pub project: Option<ProjectRef>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// A project custom field value as attached to one issue. `value` keeps the
/// raw JSON because its shape depends on `$type` (enum bundle element, user,
/// text, period, date, number or a list of those).
#[derive(Debug, Deserialize, Clone)]
pub struct CustomField {
    pub name: String,
    #[serde(rename = "$type", default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl Issue {
    pub fn custom_field(&self, name: &str) -> Option<&CustomField> {
        self.custom_fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }
}
