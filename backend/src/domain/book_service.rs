//! Book catalogue domain service.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::Error;
use crate::domain::book::{Book, BookChanges, BookId, BookInventory, Isbn, Location, NewBook, Quantity};
use crate::domain::ports::{BookRepository, BookRepositoryError, BooksCommand, BooksQuery};

pub(crate) fn map_book_repository_error(error: BookRepositoryError) -> Error {
    let message = error.to_string();
    match error {
        BookRepositoryError::NotFound { .. } => Error::not_found(message),
        BookRepositoryError::Duplicate { .. } | BookRepositoryError::Conflict { .. } => {
            Error::conflict(message)
        }
        BookRepositoryError::Connection { .. } => Error::service_unavailable(message),
        BookRepositoryError::Query { .. } => Error::internal(message),
    }
}

/// Catalogue service implementing [`BooksQuery`] and [`BooksCommand`].
#[derive(Clone)]
pub struct BookService<R> {
    books: Arc<R>,
}

impl<R> BookService<R> {
    /// Create a service over the given repository.
    pub fn new(books: Arc<R>) -> Self {
        Self { books }
    }
}

#[async_trait]
impl<R> BooksQuery for BookService<R>
where
    R: BookRepository,
{
    async fn list_books(&self, request: PageRequest) -> Result<Page<Book>, Error> {
        self.books
            .list_page(request)
            .await
            .map_err(map_book_repository_error)
    }

    async fn get_book_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, Error> {
        self.books
            .find_by_isbn(isbn)
            .await
            .map_err(map_book_repository_error)
    }

    async fn get_book_by_bid(&self, bid: BookId) -> Result<Option<Book>, Error> {
        self.books
            .find_by_id(bid)
            .await
            .map_err(map_book_repository_error)
    }

    async fn list_inventory(&self, isbn: &Isbn) -> Result<Vec<BookInventory>, Error> {
        self.books
            .list_inventory(isbn)
            .await
            .map_err(map_book_repository_error)
    }
}

#[async_trait]
impl<R> BooksCommand for BookService<R>
where
    R: BookRepository,
{
    async fn create_book(&self, book: NewBook) -> Result<Book, Error> {
        let created = self
            .books
            .create(&book)
            .await
            .map_err(map_book_repository_error)?;
        info!(bid = created.bid.get(), isbn = %created.isbn, "book created");
        Ok(created)
    }

    async fn create_books(&self, books: Vec<NewBook>) -> Result<Vec<Book>, Error> {
        let created = self
            .books
            .create_batch(&books)
            .await
            .map_err(map_book_repository_error)?;
        info!(count = created.len(), "books created");
        Ok(created)
    }

    async fn update_book(&self, isbn: &Isbn, changes: BookChanges) -> Result<Book, Error> {
        self.books
            .update(isbn, &changes)
            .await
            .map_err(map_book_repository_error)?
            .ok_or_else(|| Error::not_found(format!("update failed: book {isbn} not found")))
    }

    async fn delete_book(&self, isbn: &Isbn) -> Result<Book, Error> {
        let deleted = self
            .books
            .delete(isbn)
            .await
            .map_err(map_book_repository_error)?;
        info!(bid = deleted.bid.get(), isbn = %deleted.isbn, "book deleted");
        Ok(deleted)
    }

    async fn set_inventory(
        &self,
        isbn: &Isbn,
        location: Location,
        quantity: Quantity,
    ) -> Result<BookInventory, Error> {
        self.books
            .set_inventory(isbn, &location, quantity)
            .await
            .map_err(map_book_repository_error)
    }
}

#[cfg(test)]
#[path = "book_service_tests.rs"]
mod tests;
