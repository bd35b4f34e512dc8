//! Driving port for catalogue mutations.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::book::{Book, BookChanges, BookInventory, Isbn, Location, NewBook, Quantity};

/// Domain use-case port for maintaining the catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksCommand: Send + Sync {
    /// Create one book.
    async fn create_book(&self, book: NewBook) -> Result<Book, Error>;

    /// Create many books atomically.
    async fn create_books(&self, books: Vec<NewBook>) -> Result<Vec<Book>, Error>;

    /// Apply a partial update. Fails with `not_found` when absent.
    async fn update_book(&self, isbn: &Isbn, changes: BookChanges) -> Result<Book, Error>;

    /// Delete a book and return its final state. Fails with `not_found` when absent.
    async fn delete_book(&self, isbn: &Isbn) -> Result<Book, Error>;

    /// Record how many copies of a book are held at a location.
    async fn set_inventory(
        &self,
        isbn: &Isbn,
        location: Location,
        quantity: Quantity,
    ) -> Result<BookInventory, Error>;
}
