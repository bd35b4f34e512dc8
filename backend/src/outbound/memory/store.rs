//! Shared state behind the in-memory repositories.
//!
//! Every write runs against a private copy of the state which replaces the
//! shared copy only when the callback succeeds, so a failed batch or a failed
//! borrow leaves nothing behind.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::domain::book::{Book, BookId, BookInventory, Location, Quantity};
use crate::domain::order::Order;
use crate::domain::user::{User, UserId};

/// The store mutex was poisoned by a panicking writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("in-memory store is unavailable: lock poisoned")]
pub struct StorePoisoned;

/// Tables held by the store, keyed by surrogate id.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    pub users: BTreeMap<i32, User>,
    pub books: BTreeMap<i32, Book>,
    pub inventory: BTreeMap<i32, BookInventory>,
    pub orders: BTreeMap<String, Order>,
    last_uid: i32,
    last_bid: i32,
    last_inv_id: i32,
}

impl Tables {
    pub fn next_uid(&mut self) -> UserId {
        self.last_uid += 1;
        UserId::new(self.last_uid)
    }

    pub fn next_bid(&mut self) -> BookId {
        self.last_bid += 1;
        BookId::new(self.last_bid)
    }

    fn next_inv_id(&mut self) -> i32 {
        self.last_inv_id += 1;
        self.last_inv_id
    }

    pub fn user_by_student_id(&self, student_id: &str) -> Option<&User> {
        self.users
            .values()
            .find(|user| user.student_id.as_str() == student_id)
    }

    pub fn book_by_isbn(&self, isbn: &str) -> Option<&Book> {
        self.books.values().find(|book| book.isbn.as_str() == isbn)
    }

    pub fn book_by_isbn_mut(&mut self, isbn: &str) -> Option<&mut Book> {
        self.books
            .values_mut()
            .find(|book| book.isbn.as_str() == isbn)
    }

    pub fn inventory_at_mut(
        &mut self,
        book_id: BookId,
        location: &Location,
    ) -> Option<&mut BookInventory> {
        self.inventory
            .values_mut()
            .find(|row| row.book_id == book_id && row.location == *location)
    }

    /// Inventory rows of one book ordered by location.
    pub fn inventory_for(&self, book_id: BookId) -> Vec<BookInventory> {
        let mut rows: Vec<BookInventory> = self
            .inventory
            .values()
            .filter(|row| row.book_id == book_id)
            .cloned()
            .collect();
        rows.sort_by(|left, right| left.location.as_str().cmp(right.location.as_str()));
        rows
    }

    /// Insert or overwrite the row for `(book_id, location)`.
    pub fn upsert_inventory(
        &mut self,
        book_id: BookId,
        location: &Location,
        quantity: Quantity,
    ) -> BookInventory {
        if let Some(row) = self.inventory_at_mut(book_id, location) {
            row.quantity = quantity;
            return row.clone();
        }
        let row = BookInventory {
            inv_id: self.next_inv_id(),
            book_id,
            location: location.clone(),
            quantity,
        };
        self.inventory.insert(row.inv_id, row.clone());
        row
    }

    pub fn has_orders_for_user(&self, user_id: UserId) -> bool {
        self.orders.values().any(|order| order.user_id() == user_id)
    }

    pub fn has_orders_for_book(&self, book_id: BookId) -> bool {
        self.orders.values().any(|order| order.book_id() == book_id)
    }
}

/// Process-local storage shared by the in-memory repositories.
///
/// Cloning the store yields another handle onto the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> Result<R, StorePoisoned> {
        let tables = self.tables.lock().map_err(|_| StorePoisoned)?;
        Ok(f(&tables))
    }

    /// Run `f` against a copy of the tables and publish the copy on success.
    pub(crate) fn transact<R, E>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StorePoisoned>,
    {
        let mut tables = self.tables.lock().map_err(|_| StorePoisoned)?;
        let mut draft = tables.clone();
        let result = f(&mut draft)?;
        *tables = draft;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq)]
    enum Failure {
        Poisoned,
        Rejected,
    }

    impl From<StorePoisoned> for Failure {
        fn from(_: StorePoisoned) -> Self {
            Self::Poisoned
        }
    }

    #[rstest]
    fn failed_transaction_discards_its_writes() {
        let store = InMemoryStore::new();
        let result: Result<(), Failure> = store.transact(|tables| {
            tables.next_uid();
            Err(Failure::Rejected)
        });
        assert_eq!(result, Err(Failure::Rejected));

        let uid = store
            .transact::<_, Failure>(|tables| Ok(tables.next_uid()))
            .expect("transaction succeeds");
        assert_eq!(uid, UserId::new(1));
    }

    #[rstest]
    fn upsert_keeps_one_row_per_location() {
        let store = InMemoryStore::new();
        let location = Location::new("Main").expect("location");
        let (first, second) = store
            .transact::<_, Failure>(|tables| {
                let book = tables.next_bid();
                let first = tables.upsert_inventory(book, &location, Quantity::ZERO);
                let second =
                    tables.upsert_inventory(book, &location, Quantity::new(4).expect("qty"));
                Ok((first, second))
            })
            .expect("transaction succeeds");

        assert_eq!(first.inv_id, second.inv_id);
        assert_eq!(second.quantity.get(), 4);
        let rows = store
            .read(|tables| tables.inventory.len())
            .expect("read succeeds");
        assert_eq!(rows, 1);
    }

    #[rstest]
    fn clones_share_tables() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store
            .transact::<_, Failure>(|tables| Ok(tables.next_bid()))
            .expect("transaction succeeds");
        let next = other
            .transact::<_, Failure>(|tables| Ok(tables.next_bid()))
            .expect("transaction succeeds");
        assert_eq!(next, BookId::new(2));
    }
}
