//! PostgreSQL-backed `UserRepository` adapter.
//!
//! Reads use a single pooled connection; every write runs inside a
//! [`UnitOfWork`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use pagination::{Page, PageRequest};

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{NewUser, StudentId, User, UserChanges, UserId};

use super::diesel_error_mapping::{StoreFailure, classify_diesel_error, classify_unit_of_work_error};
use super::diesel_helpers::{count_to_total, page_window};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;
use super::unit_of_work::{UnitOfWork, UnitOfWorkError};

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use bookhub::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/bookhub")).await?;
    /// let _repo = DieselUserRepository::new(pool);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<StoreFailure> for UserRepositoryError {
    fn from(failure: StoreFailure) -> Self {
        match failure {
            StoreFailure::Unique(message) => Self::duplicate(message),
            StoreFailure::ForeignKey(message) => Self::conflict(message),
            StoreFailure::Connection(message) => Self::connection(message),
            StoreFailure::Query(message) => Self::query(message),
        }
    }
}

impl From<UnitOfWorkError> for UserRepositoryError {
    fn from(error: UnitOfWorkError) -> Self {
        classify_unit_of_work_error(error).into()
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    classify_diesel_error(error).into()
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    UserRepositoryError::connection(error.to_string())
}

fn to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    User::try_from(row)
        .map_err(|err| UserRepositoryError::query(format!("stored user is invalid: {err}")))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_student_id(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::student_id.eq(student_id.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_user)
            .transpose()
    }

    async fn find_by_id(&self, uid: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(uid.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_user)
            .transpose()
    }

    async fn list_page(&self, request: PageRequest) -> Result<Page<User>, UserRepositoryError> {
        let (offset, limit) = page_window(request)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<UserRow> = users::table
            .order(users::uid.asc())
            .offset(offset)
            .limit(limit)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows.into_iter().map(to_user).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, count_to_total(count)?, request))
    }

    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let row = NewUserRow::from(user);
        let student_id = user.student_id.as_str();
        let created = UnitOfWork::new(&self.pool, "create_user")
            .run(|conn| {
                async move {
                    diesel::insert_into(users::table)
                        .values(&row)
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(|err| match classify_diesel_error(err) {
                            StoreFailure::Unique(_) => UserRepositoryError::duplicate(format!(
                                "student_id {student_id} is taken"
                            )),
                            other => other.into(),
                        })
                }
                .scope_boxed()
            })
            .await?;
        to_user(created)
    }

    async fn create_batch(&self, users: &[NewUser]) -> Result<Vec<User>, UserRepositoryError> {
        if users.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<NewUserRow<'_>> = users.iter().map(NewUserRow::from).collect();
        let created = UnitOfWork::new(&self.pool, "create_users")
            .run(|conn| {
                async move {
                    diesel::insert_into(users::table)
                        .values(&rows)
                        .returning(UserRow::as_returning())
                        .get_results(conn)
                        .await
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        created.into_iter().map(to_user).collect()
    }

    async fn update(
        &self,
        student_id: &StudentId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserRepositoryError> {
        let key = student_id.as_str();
        let changeset = UserChangeset::from(changes);
        let unchanged = changes.is_empty();
        let updated = UnitOfWork::new(&self.pool, "update_user")
            .run(|conn| {
                async move {
                    if unchanged {
                        return users::table
                            .filter(users::student_id.eq(key))
                            .select(UserRow::as_select())
                            .first(conn)
                            .await
                            .optional()
                            .map_err(map_diesel_error);
                    }
                    diesel::update(users::table.filter(users::student_id.eq(key)))
                        .set(&changeset)
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        updated.map(to_user).transpose()
    }

    async fn delete(&self, student_id: &StudentId) -> Result<User, UserRepositoryError> {
        let key = student_id.as_str();
        let deleted = UnitOfWork::new(&self.pool, "delete_user")
            .run(|conn| {
                async move {
                    diesel::delete(users::table.filter(users::student_id.eq(key)))
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?
            .ok_or_else(|| UserRepositoryError::not_found(key))?;
        to_user(deleted)
    }
}
