mod mapping;
mod user;

pub use mapping::{normalize_path, validate_repo_path, PathTranslator};
pub use user::current_identity;
