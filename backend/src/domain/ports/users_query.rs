//! Driving port for user lookups.
//!
//! Inbound adapters use this port to read users without importing
//! persistence concerns.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::Error;
use crate::domain::user::{StudentId, User, UserId};

/// Domain use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Return one page of users with the total count.
    async fn list_users(&self, request: PageRequest) -> Result<Page<User>, Error>;

    /// Look a user up by business key. `Ok(None)` when absent.
    async fn get_user_by_student_id(&self, student_id: &StudentId) -> Result<Option<User>, Error>;

    /// Look a user up by surrogate identifier. `Ok(None)` when absent.
    async fn get_user_by_uid(&self, uid: UserId) -> Result<Option<User>, Error>;
}
