//! Port abstraction for the book catalogue and its inventory.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use thiserror::Error;

use crate::domain::book::{Book, BookChanges, BookId, BookInventory, Isbn, Location, NewBook, Quantity};

/// Persistence errors raised by book repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookRepositoryError {
    /// No book carries the requested ISBN.
    #[error("book with isbn {isbn} not found")]
    NotFound { isbn: String },
    /// A uniqueness constraint rejected the write.
    #[error("book already exists: {message}")]
    Duplicate { message: String },
    /// The book is still referenced, for example by borrow orders.
    #[error("book is still referenced: {message}")]
    Conflict { message: String },
    /// Repository connection could not be established.
    #[error("book repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("book repository query failed: {message}")]
    Query { message: String },
}

impl BookRepositoryError {
    pub fn not_found(isbn: impl Into<String>) -> Self {
        Self::NotFound { isbn: isbn.into() }
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

/// Storage-independent catalogue persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Fetch a book by ISBN. `Ok(None)` when absent.
    async fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, BookRepositoryError>;

    /// Fetch a book by surrogate identifier. `Ok(None)` when absent.
    async fn find_by_id(&self, bid: BookId) -> Result<Option<Book>, BookRepositoryError>;

    /// Return one page of books ordered by `bid` plus the total book count.
    async fn list_page(&self, request: PageRequest) -> Result<Page<Book>, BookRepositoryError>;

    /// Insert a book and return it with its assigned `bid`.
    async fn create(&self, book: &NewBook) -> Result<Book, BookRepositoryError>;

    /// Insert every book in one unit of work. Either all persist or none do.
    async fn create_batch(&self, books: &[NewBook]) -> Result<Vec<Book>, BookRepositoryError>;

    /// Apply the supplied fields. `Ok(None)` when no book has `isbn`.
    async fn update(
        &self,
        isbn: &Isbn,
        changes: &BookChanges,
    ) -> Result<Option<Book>, BookRepositoryError>;

    /// Remove a book with its inventory and return its last stored state.
    ///
    /// Fails with [`BookRepositoryError::NotFound`] when absent.
    async fn delete(&self, isbn: &Isbn) -> Result<Book, BookRepositoryError>;

    /// Create or replace the inventory row for `(isbn, location)`.
    ///
    /// Once a book has inventory, its stock equals the sum of its inventory
    /// quantities.
    async fn set_inventory(
        &self,
        isbn: &Isbn,
        location: &Location,
        quantity: Quantity,
    ) -> Result<BookInventory, BookRepositoryError>;

    /// List inventory rows for a book ordered by location.
    async fn list_inventory(&self, isbn: &Isbn) -> Result<Vec<BookInventory>, BookRepositoryError>;
}
