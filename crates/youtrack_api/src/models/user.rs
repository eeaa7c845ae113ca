use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub login: Option<String>,
    pub full_name: Option<String>,
}

impl User {
    /// Full name when present, login otherwise.
    pub fn display_name(&self) -> Option<String> {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or_else(|| self.login.as_deref())
            .map(str::to_string)
    }
}
