//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use thiserror::Error;

use crate::domain::user::{NewUser, StudentId, User, UserChanges, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserRepositoryError {
    /// No user carries the requested student id.
    #[error("user with student_id {student_id} not found")]
    NotFound { student_id: String },
    /// A uniqueness constraint rejected the write.
    #[error("user already exists: {message}")]
    Duplicate { message: String },
    /// The user is still referenced, for example by borrow orders.
    #[error("user is still referenced: {message}")]
    Conflict { message: String },
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
}

impl UserRepositoryError {
    pub fn not_found(student_id: impl Into<String>) -> Self {
        Self::NotFound {
            student_id: student_id.into(),
        }
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Storage-independent user persistence.
///
/// Every method returns detached [`User`] copies; adapters never leak
/// storage handles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by business key. `Ok(None)` when absent.
    async fn find_by_student_id(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by surrogate identifier. `Ok(None)` when absent.
    async fn find_by_id(&self, uid: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Return one page of users ordered by `uid` plus the total user count.
    async fn list_page(&self, request: PageRequest) -> Result<Page<User>, UserRepositoryError>;

    /// Insert a user and return it with its assigned `uid`.
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError>;

    /// Insert every user in one unit of work. Either all persist or none do.
    async fn create_batch(&self, users: &[NewUser]) -> Result<Vec<User>, UserRepositoryError>;

    /// Apply the supplied fields. `Ok(None)` when no user has `student_id`.
    async fn update(
        &self,
        student_id: &StudentId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Remove a user and return its last stored state.
    ///
    /// Fails with [`UserRepositoryError::NotFound`] when absent.
    async fn delete(&self, student_id: &StudentId) -> Result<User, UserRepositoryError>;
}
