//! User domain service.
//!
//! Implements the user driving ports on top of any [`UserRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::Error;
use crate::domain::ports::{UserRepository, UserRepositoryError, UsersCommand, UsersQuery};
use crate::domain::user::{NewUser, StudentId, User, UserChanges, UserId};

pub(crate) fn map_user_repository_error(error: UserRepositoryError) -> Error {
    let message = error.to_string();
    match error {
        UserRepositoryError::NotFound { .. } => Error::not_found(message),
        UserRepositoryError::Duplicate { .. } | UserRepositoryError::Conflict { .. } => {
            Error::conflict(message)
        }
        UserRepositoryError::Connection { .. } => Error::service_unavailable(message),
        UserRepositoryError::Query { .. } => Error::internal(message),
    }
}

/// User service implementing [`UsersQuery`] and [`UsersCommand`].
#[derive(Clone)]
pub struct UserService<R> {
    users: Arc<R>,
}

impl<R> UserService<R> {
    /// Create a service over the given repository.
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<R> UsersQuery for UserService<R>
where
    R: UserRepository,
{
    async fn list_users(&self, request: PageRequest) -> Result<Page<User>, Error> {
        self.users
            .list_page(request)
            .await
            .map_err(map_user_repository_error)
    }

    async fn get_user_by_student_id(&self, student_id: &StudentId) -> Result<Option<User>, Error> {
        self.users
            .find_by_student_id(student_id)
            .await
            .map_err(map_user_repository_error)
    }

    async fn get_user_by_uid(&self, uid: UserId) -> Result<Option<User>, Error> {
        self.users
            .find_by_id(uid)
            .await
            .map_err(map_user_repository_error)
    }
}

#[async_trait]
impl<R> UsersCommand for UserService<R>
where
    R: UserRepository,
{
    async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        let created = self
            .users
            .create(&user)
            .await
            .map_err(map_user_repository_error)?;
        info!(uid = created.uid.get(), student_id = %created.student_id, "user created");
        Ok(created)
    }

    async fn create_users(&self, users: Vec<NewUser>) -> Result<Vec<User>, Error> {
        let created = self
            .users
            .create_batch(&users)
            .await
            .map_err(map_user_repository_error)?;
        info!(count = created.len(), "users created");
        Ok(created)
    }

    async fn update_user(
        &self,
        student_id: &StudentId,
        changes: UserChanges,
    ) -> Result<User, Error> {
        self.users
            .update(student_id, &changes)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("update failed: user {student_id} not found")))
    }

    async fn delete_user(&self, student_id: &StudentId) -> Result<User, Error> {
        let deleted = self
            .users
            .delete(student_id)
            .await
            .map_err(map_user_repository_error)?;
        info!(uid = deleted.uid.get(), student_id = %deleted.student_id, "user deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
