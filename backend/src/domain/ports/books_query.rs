//! Driving port for catalogue lookups.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::Error;
use crate::domain::book::{Book, BookId, BookInventory, Isbn};

/// Domain use-case port for reading books and their inventory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksQuery: Send + Sync {
    /// Return one page of books with the total count.
    async fn list_books(&self, request: PageRequest) -> Result<Page<Book>, Error>;

    /// Look a book up by ISBN. `Ok(None)` when absent.
    async fn get_book_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, Error>;

    /// Look a book up by surrogate identifier. `Ok(None)` when absent.
    async fn get_book_by_bid(&self, bid: BookId) -> Result<Option<Book>, Error>;

    /// List inventory rows for a book. Fails with `not_found` when the book is absent.
    async fn list_inventory(&self, isbn: &Isbn) -> Result<Vec<BookInventory>, Error>;
}
