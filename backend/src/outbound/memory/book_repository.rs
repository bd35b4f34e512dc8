//! In-memory `BookRepository` adapter, including inventory.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::book::{
    Book, BookChanges, BookId, BookInventory, Isbn, Location, NewBook, Quantity,
};
use crate::domain::ports::{BookRepository, BookRepositoryError};

use super::page_of;
use super::store::{InMemoryStore, StorePoisoned, Tables};

impl From<StorePoisoned> for BookRepositoryError {
    fn from(error: StorePoisoned) -> Self {
        Self::connection(error.to_string())
    }
}

/// [`BookRepository`] backed by an [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryBookRepository {
    store: InMemoryStore,
}

impl InMemoryBookRepository {
    /// Create a repository over `store`.
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

fn insert_book(tables: &mut Tables, book: &NewBook) -> Result<Book, BookRepositoryError> {
    let isbn = book.isbn.as_str();
    if tables.book_by_isbn(isbn).is_some() {
        return Err(BookRepositoryError::duplicate(format!("isbn {isbn} is taken")));
    }
    let stored = Book {
        bid: tables.next_bid(),
        title: book.title.clone(),
        author: book.author.clone(),
        isbn: book.isbn.clone(),
        summary: book.summary.clone(),
        area: book.area.clone(),
        floor: book.floor.clone(),
        tags: book.tags.clone(),
        stock: book.stock,
    };
    tables.books.insert(stored.bid.get(), stored.clone());
    Ok(stored)
}

fn stock_from(rows: &[BookInventory]) -> Result<Quantity, BookRepositoryError> {
    let total = rows
        .iter()
        .try_fold(0_i32, |sum, row| sum.checked_add(row.quantity.get()))
        .ok_or_else(|| BookRepositoryError::query("inventory total overflows stock"))?;
    Quantity::for_field(total, "stock").map_err(|err| BookRepositoryError::query(err.to_string()))
}

fn require_bid(tables: &Tables, isbn: &Isbn) -> Result<BookId, BookRepositoryError> {
    tables
        .book_by_isbn(isbn.as_str())
        .map(|book| book.bid)
        .ok_or_else(|| BookRepositoryError::not_found(isbn.as_str()))
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, BookRepositoryError> {
        Ok(self
            .store
            .read(|tables| tables.book_by_isbn(isbn.as_str()).cloned())?)
    }

    async fn find_by_id(&self, bid: BookId) -> Result<Option<Book>, BookRepositoryError> {
        Ok(self.store.read(|tables| tables.books.get(&bid.get()).cloned())?)
    }

    async fn list_page(&self, request: PageRequest) -> Result<Page<Book>, BookRepositoryError> {
        let rows = self
            .store
            .read(|tables| tables.books.values().cloned().collect::<Vec<_>>())?;
        Ok(page_of(rows, request))
    }

    async fn create(&self, book: &NewBook) -> Result<Book, BookRepositoryError> {
        self.store.transact(|tables| insert_book(tables, book))
    }

    async fn create_batch(&self, books: &[NewBook]) -> Result<Vec<Book>, BookRepositoryError> {
        self.store.transact(|tables| {
            books
                .iter()
                .map(|book| insert_book(tables, book))
                .collect()
        })
    }

    async fn update(
        &self,
        isbn: &Isbn,
        changes: &BookChanges,
    ) -> Result<Option<Book>, BookRepositoryError> {
        self.store.transact(|tables| {
            Ok(tables.book_by_isbn_mut(isbn.as_str()).map(|book| {
                changes.apply_to(book);
                book.clone()
            }))
        })
    }

    async fn delete(&self, isbn: &Isbn) -> Result<Book, BookRepositoryError> {
        self.store.transact(|tables| {
            let bid = require_bid(tables, isbn)?;
            if tables.has_orders_for_book(bid) {
                return Err(BookRepositoryError::conflict(format!(
                    "book {isbn} is referenced by orders"
                )));
            }
            tables.inventory.retain(|_, row| row.book_id != bid);
            tables
                .books
                .remove(&bid.get())
                .ok_or_else(|| BookRepositoryError::not_found(isbn.as_str()))
        })
    }

    async fn set_inventory(
        &self,
        isbn: &Isbn,
        location: &Location,
        quantity: Quantity,
    ) -> Result<BookInventory, BookRepositoryError> {
        self.store.transact(|tables| {
            let bid = require_bid(tables, isbn)?;
            let stored = tables.upsert_inventory(bid, location, quantity);
            let stock = stock_from(&tables.inventory_for(bid))?;
            if let Some(book) = tables.books.get_mut(&bid.get()) {
                book.stock = stock;
            }
            Ok(stored)
        })
    }

    async fn list_inventory(&self, isbn: &Isbn) -> Result<Vec<BookInventory>, BookRepositoryError> {
        self.store.read(|tables| -> Result<_, BookRepositoryError> {
            let bid = require_bid(tables, isbn)?;
            Ok(tables.inventory_for(bid))
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::Title;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repo() -> InMemoryBookRepository {
        InMemoryBookRepository::new(InMemoryStore::new())
    }

    fn new_book(isbn: &str) -> NewBook {
        NewBook::try_new("T", "Au", isbn).expect("valid book")
    }

    fn isbn(raw: &str) -> Isbn {
        Isbn::new(raw).expect("isbn")
    }

    fn location(raw: &str) -> Location {
        Location::new(raw).expect("location")
    }

    fn qty(raw: i32) -> Quantity {
        Quantity::new(raw).expect("quantity")
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_duplicate_isbn(repo: InMemoryBookRepository) {
        repo.create(&new_book("I1")).await.expect("create");
        let err = repo.create(&new_book("I1")).await.expect_err("duplicate");
        assert_eq!(err, BookRepositoryError::duplicate("isbn I1 is taken"));
    }

    #[rstest]
    #[tokio::test]
    async fn batch_is_all_or_nothing(repo: InMemoryBookRepository) {
        repo.create(&new_book("I2")).await.expect("create");
        repo.create_batch(&[new_book("I1"), new_book("I2")])
            .await
            .expect_err("second entry collides");
        assert!(repo.find_by_isbn(&isbn("I1")).await.expect("lookup").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn update_leaves_isbn_and_unsupplied_fields(repo: InMemoryBookRepository) {
        let created = repo.create(&new_book("I1")).await.expect("create");
        let changes = BookChanges {
            title: Some(Title::new("New").expect("title")),
            ..BookChanges::default()
        };
        let updated = repo
            .update(&isbn("I1"), &changes)
            .await
            .expect("update")
            .expect("present");
        assert_eq!(updated.title.as_str(), "New");
        assert_eq!(updated.author, created.author);
        assert_eq!(updated.bid, created.bid);
    }

    #[rstest]
    #[tokio::test]
    async fn set_inventory_upserts_and_rederives_stock(repo: InMemoryBookRepository) {
        repo.create(&new_book("I1")).await.expect("create");
        repo.set_inventory(&isbn("I1"), &location("West"), qty(2))
            .await
            .expect("west");
        repo.set_inventory(&isbn("I1"), &location("East"), qty(1))
            .await
            .expect("east");
        let replaced = repo
            .set_inventory(&isbn("I1"), &location("West"), qty(5))
            .await
            .expect("west again");
        assert_eq!(replaced.quantity, qty(5));

        let rows = repo.list_inventory(&isbn("I1")).await.expect("inventory");
        let locations: Vec<&str> = rows.iter().map(|row| row.location.as_str()).collect();
        assert_eq!(locations, vec!["East", "West"]);

        let book = repo
            .find_by_isbn(&isbn("I1"))
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(book.stock, qty(6));
    }

    #[rstest]
    #[tokio::test]
    async fn inventory_total_beyond_stock_range_is_rejected(repo: InMemoryBookRepository) {
        repo.create(&new_book("I1")).await.expect("create");
        repo.set_inventory(&isbn("I1"), &location("A"), qty(i32::MAX))
            .await
            .expect("first location");
        let err = repo
            .set_inventory(&isbn("I1"), &location("B"), qty(5))
            .await
            .expect_err("sum overflows");
        assert_eq!(err, BookRepositoryError::query("inventory total overflows stock"));

        let rows = repo.list_inventory(&isbn("I1")).await.expect("inventory");
        assert_eq!(rows.len(), 1);
        let book = repo
            .find_by_isbn(&isbn("I1"))
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(book.stock, qty(i32::MAX));
    }

    #[rstest]
    #[tokio::test]
    async fn inventory_of_unknown_book_is_not_found(repo: InMemoryBookRepository) {
        let err = repo
            .set_inventory(&isbn("I9"), &location("West"), qty(1))
            .await
            .expect_err("unknown book");
        assert_eq!(err, BookRepositoryError::not_found("I9"));
        let err = repo.list_inventory(&isbn("I9")).await.expect_err("unknown book");
        assert_eq!(err, BookRepositoryError::not_found("I9"));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_cascades_inventory(repo: InMemoryBookRepository) {
        repo.create(&new_book("I1")).await.expect("create");
        repo.set_inventory(&isbn("I1"), &location("West"), qty(2))
            .await
            .expect("inventory");
        let deleted = repo.delete(&isbn("I1")).await.expect("delete");
        assert_eq!(deleted.isbn.as_str(), "I1");

        let rows = repo.store.read(|tables| tables.inventory.len()).expect("read");
        assert_eq!(rows, 0);
        let err = repo.delete(&isbn("I1")).await.expect_err("gone");
        assert_eq!(err, BookRepositoryError::not_found("I1"));
    }
}
