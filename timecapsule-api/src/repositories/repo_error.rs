use thiserror::Error;

/// Errors surfaced by the entry and receipt repositories.
///
/// `NotFound` carries a short description of the missing row ("time entry 7");
/// the route layer turns it into a 404.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(String),
}
