//! Driving port for user mutations.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::user::{NewUser, StudentId, User, UserChanges};

/// Domain use-case port for creating, updating and removing users.
///
/// Batch creation is available to in-process callers only; inbound adapters
/// expose single-user mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Create one user.
    async fn create_user(&self, user: NewUser) -> Result<User, Error>;

    /// Create many users atomically.
    async fn create_users(&self, users: Vec<NewUser>) -> Result<Vec<User>, Error>;

    /// Apply a partial update. Fails with `not_found` when absent.
    async fn update_user(&self, student_id: &StudentId, changes: UserChanges)
    -> Result<User, Error>;

    /// Delete a user and return its final state. Fails with `not_found` when absent.
    async fn delete_user(&self, student_id: &StudentId) -> Result<User, Error>;
}
