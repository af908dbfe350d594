//! In-process registry of users and generation records.

mod memory;
pub mod repo_types;

pub use memory::MemStore;
pub use repo_types::{GenerationKind, GenerationRecord, Metadata, NewGeneration, NewUser, User};

use thiserror::Error;
use uuid::Uuid;

/// Fatal store faults. Neither is recoverable by the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("identifier generation failed: {0}")]
    IdGeneration(String),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Storage interface shared by all request handlers.
///
/// Every operation is a short synchronous critical section, so callers can
/// invoke it from async handlers without holding anything across an await.
pub trait GenerationStore: Send + Sync {
    fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Returns the unique user with `username`, if any.
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Inserts a user under a fresh id. Username uniqueness is the caller's
    /// job; see `users::handlers::create_user`.
    fn create_user(&self, fields: NewUser) -> Result<User, StoreError>;

    /// Inserts a record under a fresh id, stamped with the insertion time.
    fn create_generation(&self, fields: NewGeneration) -> Result<GenerationRecord, StoreError>;

    /// Records owned by `user_id`, most recent first. Empty for `None` or an
    /// unknown owner.
    fn list_generations_by_user(
        &self,
        user_id: Option<Uuid>,
    ) -> Result<Vec<GenerationRecord>, StoreError>;
}
