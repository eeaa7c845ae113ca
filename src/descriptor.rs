//! Report column descriptors parsed from `code[:title]` lists.

pub const COMMENTS_CODE: &str = "comments";
pub const COMMENTS_VERBOSE_CODE: &str = "comments-verbose";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Comments,
    CommentsVerbose,
    Field,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    code: String,
    title: String,
}

impl FieldDescriptor {
    /// Splits one entry on its first colon. The title falls back to the code
    /// when it is missing or blank.
    pub fn parse(entry: &str) -> Self {
        let (code, title) = match entry.split_once(':') {
            Some((code, title)) => (code.trim(), title.trim()),
            None => (entry.trim(), ""),
        };
        let title = if title.is_empty() { code } else { title };
        Self {
            code: code.to_string(),
            title: title.to_string(),
        }
    }

    /// Parses a comma-separated list, keeping column order. Blank entries
    /// (`"a,,b"`, trailing commas) are skipped; an entry with a title but no
    /// code (`":Title"`) stays a column whose cells never resolve.
    pub fn parse_list(list: &str) -> Vec<Self> {
        list.split(',')
            .filter(|entry| !entry.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Reserved codes are matched case-sensitively.
    pub fn kind(&self) -> ColumnKind {
        match self.code.as_str() {
            COMMENTS_CODE => ColumnKind::Comments,
            COMMENTS_VERBOSE_CODE => ColumnKind::CommentsVerbose,
            _ => ColumnKind::Field,
        }
    }
}
