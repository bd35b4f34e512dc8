//! In-memory `UserRepository` adapter.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{NewUser, StudentId, User, UserChanges, UserId};

use super::page_of;
use super::store::{InMemoryStore, StorePoisoned, Tables};

impl From<StorePoisoned> for UserRepositoryError {
    fn from(error: StorePoisoned) -> Self {
        Self::connection(error.to_string())
    }
}

/// [`UserRepository`] backed by an [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    store: InMemoryStore,
}

impl InMemoryUserRepository {
    /// Create a repository over `store`.
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

fn insert_user(tables: &mut Tables, user: &NewUser) -> Result<User, UserRepositoryError> {
    let student_id = user.student_id.as_str();
    if tables.user_by_student_id(student_id).is_some() {
        return Err(UserRepositoryError::duplicate(format!(
            "student_id {student_id} is taken"
        )));
    }
    let stored = User {
        uid: tables.next_uid(),
        name: user.name.clone(),
        student_id: user.student_id.clone(),
        email: user.email.clone(),
        phone: user.phone.clone(),
    };
    tables.users.insert(stored.uid.get(), stored.clone());
    Ok(stored)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_student_id(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .store
            .read(|tables| tables.user_by_student_id(student_id.as_str()).cloned())?)
    }

    async fn find_by_id(&self, uid: UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.store.read(|tables| tables.users.get(&uid.get()).cloned())?)
    }

    async fn list_page(&self, request: PageRequest) -> Result<Page<User>, UserRepositoryError> {
        let rows = self
            .store
            .read(|tables| tables.users.values().cloned().collect::<Vec<_>>())?;
        Ok(page_of(rows, request))
    }

    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        self.store.transact(|tables| insert_user(tables, user))
    }

    async fn create_batch(&self, users: &[NewUser]) -> Result<Vec<User>, UserRepositoryError> {
        self.store.transact(|tables| {
            users
                .iter()
                .map(|user| insert_user(tables, user))
                .collect()
        })
    }

    async fn update(
        &self,
        student_id: &StudentId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserRepositoryError> {
        self.store.transact(|tables| {
            let Some(uid) = tables
                .user_by_student_id(student_id.as_str())
                .map(|user| user.uid.get())
            else {
                return Ok(None);
            };
            let Some(user) = tables.users.get_mut(&uid) else {
                return Ok(None);
            };
            changes.apply_to(user);
            Ok(Some(user.clone()))
        })
    }

    async fn delete(&self, student_id: &StudentId) -> Result<User, UserRepositoryError> {
        self.store.transact(|tables| {
            let user = tables
                .user_by_student_id(student_id.as_str())
                .cloned()
                .ok_or_else(|| UserRepositoryError::not_found(student_id.as_str()))?;
            if tables.has_orders_for_user(user.uid) {
                return Err(UserRepositoryError::conflict(format!(
                    "user {student_id} is referenced by orders"
                )));
            }
            tables.users.remove(&user.uid.get());
            Ok(user)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{Email, Phone, UserName};
    use pagination::PageLimits;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repo() -> InMemoryUserRepository {
        InMemoryUserRepository::new(InMemoryStore::new())
    }

    fn new_user(student_id: &str) -> NewUser {
        NewUser::try_from_strings("A", student_id, None, "123").expect("valid user")
    }

    fn sid(raw: &str) -> StudentId {
        StudentId::new(raw).expect("student id")
    }

    #[rstest]
    #[tokio::test]
    async fn create_assigns_ids_and_round_trips(repo: InMemoryUserRepository) {
        let first = repo.create(&new_user("S1")).await.expect("create");
        let second = repo.create(&new_user("S2")).await.expect("create");
        assert_eq!(first.uid, UserId::new(1));
        assert_eq!(second.uid, UserId::new(2));

        let found = repo
            .find_by_student_id(&sid("S1"))
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(found, first);
        assert_eq!(
            repo.find_by_id(second.uid).await.expect("lookup"),
            Some(second)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_duplicate_student_id(repo: InMemoryUserRepository) {
        repo.create(&new_user("S1")).await.expect("create");
        let err = repo.create(&new_user("S1")).await.expect_err("duplicate");
        assert!(matches!(err, UserRepositoryError::Duplicate { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn failed_batch_inserts_nothing(repo: InMemoryUserRepository) {
        let err = repo
            .create_batch(&[new_user("S1"), new_user("S2"), new_user("S1")])
            .await
            .expect_err("duplicate inside batch");
        assert!(matches!(err, UserRepositoryError::Duplicate { .. }));

        let request = PageRequest::new(0, 10, PageLimits::default()).expect("request");
        let page = repo.list_page(request).await.expect("list");
        assert_eq!(page.total(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn update_changes_only_supplied_fields(repo: InMemoryUserRepository) {
        let mut input = new_user("S1");
        input.email = Some(Email::new("a@b.cn").expect("email"));
        repo.create(&input).await.expect("create");

        let changes = UserChanges {
            name: Some(UserName::new("B").expect("name")),
            email: Some(None),
            phone: None,
        };
        let updated = repo
            .update(&sid("S1"), &changes)
            .await
            .expect("update")
            .expect("present");
        assert_eq!(updated.name.as_str(), "B");
        assert_eq!(updated.email, None);
        assert_eq!(updated.phone, Phone::new("123").expect("phone"));
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_missing_user_returns_none(repo: InMemoryUserRepository) {
        let result = repo
            .update(&sid("S9"), &UserChanges::default())
            .await
            .expect("update");
        assert!(result.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn empty_changes_return_user_unchanged(repo: InMemoryUserRepository) {
        let created = repo.create(&new_user("S1")).await.expect("create");
        let updated = repo
            .update(&sid("S1"), &UserChanges::default())
            .await
            .expect("update")
            .expect("present");
        assert_eq!(updated, created);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_returns_removed_user(repo: InMemoryUserRepository) {
        let created = repo.create(&new_user("S1")).await.expect("create");
        let deleted = repo.delete(&sid("S1")).await.expect("delete");
        assert_eq!(deleted, created);
        assert!(repo.find_by_student_id(&sid("S1")).await.expect("lookup").is_none());

        let err = repo.delete(&sid("S1")).await.expect_err("already gone");
        assert_eq!(err, UserRepositoryError::not_found("S1"));
    }

    #[rstest]
    #[tokio::test]
    async fn list_page_orders_by_uid(repo: InMemoryUserRepository) {
        repo.create_batch(&[new_user("S1"), new_user("S2"), new_user("S3")])
            .await
            .expect("batch");
        let request = PageRequest::new(1, 2, PageLimits::default()).expect("request");
        let page = repo.list_page(request).await.expect("list");
        assert_eq!(page.total(), 3);
        assert_eq!(page.count(), 1);
        assert_eq!(page.items()[0].student_id.as_str(), "S3");
    }

    #[rstest]
    #[tokio::test]
    async fn pages_are_disjoint_with_stable_total(repo: InMemoryUserRepository) {
        let users: Vec<NewUser> = (1..=12).map(|n| new_user(&format!("S{n}"))).collect();
        repo.create_batch(&users).await.expect("batch");

        let first = repo
            .list_page(PageRequest::new(0, 10, PageLimits::default()).expect("request"))
            .await
            .expect("first page");
        let second = repo
            .list_page(PageRequest::new(1, 10, PageLimits::default()).expect("request"))
            .await
            .expect("second page");
        assert_eq!(first.total(), 12);
        assert_eq!(second.total(), 12);
        assert_eq!(first.count(), 10);
        assert_eq!(second.count(), 2);
        assert!(
            second
                .items()
                .iter()
                .all(|user| !first.items().iter().any(|seen| seen.uid == user.uid))
        );
    }
}
