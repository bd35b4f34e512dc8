//! PostgreSQL-backed `BookRepository` adapter, including inventory.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::book::{Book, BookChanges, BookId, BookInventory, Isbn, Location, NewBook, Quantity};
use crate::domain::ports::{BookRepository, BookRepositoryError};

use super::diesel_error_mapping::{StoreFailure, classify_diesel_error, classify_unit_of_work_error};
use super::diesel_helpers::{count_to_total, page_window};
use super::models::{BookChangeset, BookRow, InventoryRow, NewBookRow, NewInventoryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{book_inventory, books};
use super::unit_of_work::{UnitOfWork, UnitOfWorkError};

/// Diesel-backed implementation of the [`BookRepository`] port.
#[derive(Clone)]
pub struct DieselBookRepository {
    pool: DbPool,
}

impl DieselBookRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<StoreFailure> for BookRepositoryError {
    fn from(failure: StoreFailure) -> Self {
        match failure {
            StoreFailure::Unique(message) => Self::duplicate(message),
            StoreFailure::ForeignKey(message) => Self::conflict(message),
            StoreFailure::Connection(message) => Self::connection(message),
            StoreFailure::Query(message) => Self::query(message),
        }
    }
}

impl From<UnitOfWorkError> for BookRepositoryError {
    fn from(error: UnitOfWorkError) -> Self {
        classify_unit_of_work_error(error).into()
    }
}

fn map_diesel_error(error: diesel::result::Error) -> BookRepositoryError {
    classify_diesel_error(error).into()
}

fn map_pool_error(error: PoolError) -> BookRepositoryError {
    BookRepositoryError::connection(error.to_string())
}

fn to_book(row: BookRow) -> Result<Book, BookRepositoryError> {
    Book::try_from(row)
        .map_err(|err| BookRepositoryError::query(format!("stored book is invalid: {err}")))
}

fn to_inventory(row: InventoryRow) -> Result<BookInventory, BookRepositoryError> {
    BookInventory::try_from(row)
        .map_err(|err| BookRepositoryError::query(format!("stored inventory is invalid: {err}")))
}

async fn find_bid(
    conn: &mut AsyncPgConnection,
    isbn: &str,
) -> Result<Option<i32>, diesel::result::Error> {
    books::table
        .filter(books::isbn.eq(isbn))
        .select(books::bid)
        .first(conn)
        .await
        .optional()
}

/// Upsert one inventory row and re-derive the book stock from all rows.
async fn upsert_inventory(
    conn: &mut AsyncPgConnection,
    row: &NewInventoryRow<'_>,
) -> Result<InventoryRow, BookRepositoryError> {
    let stored = diesel::insert_into(book_inventory::table)
        .values(row)
        .on_conflict((book_inventory::book_id, book_inventory::location))
        .do_update()
        .set(book_inventory::quantity.eq(excluded(book_inventory::quantity)))
        .returning(InventoryRow::as_returning())
        .get_result(conn)
        .await
        .map_err(map_diesel_error)?;

    let total: Option<i64> = book_inventory::table
        .filter(book_inventory::book_id.eq(row.book_id))
        .select(diesel::dsl::sum(book_inventory::quantity))
        .get_result(conn)
        .await
        .map_err(map_diesel_error)?;
    // The error rolls the unit of work back, so stock never drifts from the sum.
    let stock = i32::try_from(total.unwrap_or(0))
        .map_err(|_| BookRepositoryError::query("inventory total overflows stock"))?;
    diesel::update(books::table.find(row.book_id))
        .set(books::stock.eq(stock))
        .execute(conn)
        .await
        .map_err(map_diesel_error)?;
    Ok(stored)
}

#[async_trait]
impl BookRepository for DieselBookRepository {
    async fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        books::table
            .filter(books::isbn.eq(isbn.as_str()))
            .select(BookRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_book)
            .transpose()
    }

    async fn find_by_id(&self, bid: BookId) -> Result<Option<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        books::table
            .find(bid.get())
            .select(BookRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_book)
            .transpose()
    }

    async fn list_page(&self, request: PageRequest) -> Result<Page<Book>, BookRepositoryError> {
        let (offset, limit) = page_window(request)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = books::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<BookRow> = books::table
            .order(books::bid.asc())
            .offset(offset)
            .limit(limit)
            .select(BookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows.into_iter().map(to_book).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, count_to_total(count)?, request))
    }

    async fn create(&self, book: &NewBook) -> Result<Book, BookRepositoryError> {
        let row = NewBookRow::from(book);
        let isbn = book.isbn.as_str();
        let created = UnitOfWork::new(&self.pool, "create_book")
            .run(|conn| {
                async move {
                    diesel::insert_into(books::table)
                        .values(&row)
                        .returning(BookRow::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(|err| match classify_diesel_error(err) {
                            StoreFailure::Unique(_) => {
                                BookRepositoryError::duplicate(format!("isbn {isbn} is taken"))
                            }
                            other => other.into(),
                        })
                }
                .scope_boxed()
            })
            .await?;
        to_book(created)
    }

    async fn create_batch(&self, books: &[NewBook]) -> Result<Vec<Book>, BookRepositoryError> {
        if books.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<NewBookRow<'_>> = books.iter().map(NewBookRow::from).collect();
        let created = UnitOfWork::new(&self.pool, "create_books")
            .run(|conn| {
                async move {
                    diesel::insert_into(books::table)
                        .values(&rows)
                        .returning(BookRow::as_returning())
                        .get_results(conn)
                        .await
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        created.into_iter().map(to_book).collect()
    }

    async fn update(
        &self,
        isbn: &Isbn,
        changes: &BookChanges,
    ) -> Result<Option<Book>, BookRepositoryError> {
        let key = isbn.as_str();
        let changeset = BookChangeset::from(changes);
        let unchanged = changes.is_empty();
        let updated = UnitOfWork::new(&self.pool, "update_book")
            .run(|conn| {
                async move {
                    if unchanged {
                        return books::table
                            .filter(books::isbn.eq(key))
                            .select(BookRow::as_select())
                            .first(conn)
                            .await
                            .optional()
                            .map_err(map_diesel_error);
                    }
                    diesel::update(books::table.filter(books::isbn.eq(key)))
                        .set(&changeset)
                        .returning(BookRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        updated.map(to_book).transpose()
    }

    async fn delete(&self, isbn: &Isbn) -> Result<Book, BookRepositoryError> {
        let key = isbn.as_str();
        let deleted = UnitOfWork::new(&self.pool, "delete_book")
            .run(|conn| {
                async move {
                    diesel::delete(books::table.filter(books::isbn.eq(key)))
                        .returning(BookRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?
            .ok_or_else(|| BookRepositoryError::not_found(key))?;
        to_book(deleted)
    }

    async fn set_inventory(
        &self,
        isbn: &Isbn,
        location: &Location,
        quantity: Quantity,
    ) -> Result<BookInventory, BookRepositoryError> {
        let key = isbn.as_str();
        let location = location.as_str();
        let stored = UnitOfWork::new(&self.pool, "set_inventory")
            .run(|conn| {
                async move {
                    let Some(book_id) = find_bid(conn, key).await.map_err(map_diesel_error)? else {
                        return Ok(None);
                    };
                    let row = NewInventoryRow {
                        book_id,
                        location,
                        quantity: quantity.get(),
                    };
                    upsert_inventory(conn, &row).await.map(Some)
                }
                .scope_boxed()
            })
            .await?
            .ok_or_else(|| BookRepositoryError::not_found(key))?;
        to_inventory(stored)
    }

    async fn list_inventory(&self, isbn: &Isbn) -> Result<Vec<BookInventory>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let book_id = find_bid(&mut conn, isbn.as_str())
            .await
            .map_err(map_diesel_error)?
            .ok_or_else(|| BookRepositoryError::not_found(isbn.as_str()))?;
        let rows: Vec<InventoryRow> = book_inventory::table
            .filter(book_inventory::book_id.eq(book_id))
            .order(book_inventory::location.asc())
            .select(InventoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_inventory).collect()
    }
}
