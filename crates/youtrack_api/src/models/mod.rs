mod attachment;
mod comment;
mod issue;
mod project;
mod user;

pub use attachment::Attachment;
pub use comment::{Comment, Visibility};
pub use issue::{CustomField, Issue};
pub use project::{Project, ProjectRef};
pub use user::User;
