use thiserror::Error;
use uuid::Uuid;

/// Integrity failures raised when staged changes are committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} with id {id} already exists")]
    DuplicateKey { entity: &'static str, id: Uuid },

    #[error("author {0} does not exist")]
    MissingAuthor(Uuid),

    #[error("{entity} with id {id} does not exist")]
    NotFound { entity: &'static str, id: Uuid },
}
