mod entry_repo;
mod receipt_repo;
mod repo_error;

pub use entry_repo::*;
pub use receipt_repo::*;
pub use repo_error::RepositoryError;
