use crate::models::User;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: Option<String>,
    pub created: Option<i64>,
    #[serde(default)]
    pub deleted: bool,
    pub author: Option<User>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Visibility {
    #[serde(rename = "$type")]
    pub kind: Option<String>,
}

impl Visibility {
    /// `LimitedVisibility` restricts the comment to selected groups or users.
    pub fn is_limited(&self) -> bool {
        self.kind.as_deref() == Some("LimitedVisibility")
    }
}
