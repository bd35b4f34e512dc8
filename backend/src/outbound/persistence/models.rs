//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain transfer objects
//! revalidate every column.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::ValidationError;
use crate::domain::book::{Book, BookChanges, BookId, BookInventory, BookParts, Location, NewBook, Quantity};
use crate::domain::order::{Order, OrderError, OrderParts};
use crate::domain::user::{NewUser, User, UserChanges};

use super::schema::{book_inventory, books, orders, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub uid: i32,
    pub name: String,
    pub student_id: String,
    pub email: Option<String>,
    pub phone: String,
}

impl TryFrom<UserRow> for User {
    type Error = ValidationError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Self::try_from_parts(row.uid, row.name, row.student_id, row.email, row.phone)
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub student_id: &'a str,
    pub email: Option<&'a str>,
    pub phone: &'a str,
}

impl<'a> From<&'a NewUser> for NewUserRow<'a> {
    fn from(user: &'a NewUser) -> Self {
        Self {
            name: user.name.as_str(),
            student_id: user.student_id.as_str(),
            email: user.email.as_ref().map(|email| email.as_str()),
            phone: user.phone.as_str(),
        }
    }
}

/// Changeset for partial user updates. `None` fields are skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub name: Option<&'a str>,
    pub email: Option<Option<&'a str>>,
    pub phone: Option<&'a str>,
}

impl<'a> From<&'a UserChanges> for UserChangeset<'a> {
    fn from(changes: &'a UserChanges) -> Self {
        Self {
            name: changes.name.as_ref().map(|name| name.as_str()),
            email: changes
                .email
                .as_ref()
                .map(|email| email.as_ref().map(|value| value.as_str())),
            phone: changes.phone.as_ref().map(|phone| phone.as_str()),
        }
    }
}

/// Row struct for reading from the books table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookRow {
    pub bid: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub summary: Option<String>,
    pub area: Option<String>,
    pub floor: Option<String>,
    pub tags: Vec<String>,
    pub stock: i32,
}

impl TryFrom<BookRow> for Book {
    type Error = ValidationError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Self::try_from(BookParts {
            bid: row.bid,
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            summary: row.summary,
            area: row.area,
            floor: row.floor,
            tags: row.tags,
            stock: row.stock,
        })
    }
}

/// Insertable struct for creating book records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = books)]
pub(crate) struct NewBookRow<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub isbn: &'a str,
    pub summary: Option<&'a str>,
    pub area: Option<&'a str>,
    pub floor: Option<&'a str>,
    pub tags: &'a [String],
    pub stock: i32,
}

impl<'a> From<&'a NewBook> for NewBookRow<'a> {
    fn from(book: &'a NewBook) -> Self {
        Self {
            title: book.title.as_str(),
            author: book.author.as_str(),
            isbn: book.isbn.as_str(),
            summary: book.summary.as_deref(),
            area: book.area.as_ref().map(|area| area.as_str()),
            floor: book.floor.as_ref().map(|floor| floor.as_str()),
            tags: &book.tags,
            stock: book.stock.get(),
        }
    }
}

/// Changeset for partial book updates. `None` fields are skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = books)]
pub(crate) struct BookChangeset<'a> {
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub summary: Option<Option<&'a str>>,
    pub area: Option<Option<&'a str>>,
    pub floor: Option<Option<&'a str>>,
    pub tags: Option<&'a [String]>,
    pub stock: Option<i32>,
}

impl<'a> From<&'a BookChanges> for BookChangeset<'a> {
    fn from(changes: &'a BookChanges) -> Self {
        Self {
            title: changes.title.as_ref().map(|title| title.as_str()),
            author: changes.author.as_ref().map(|author| author.as_str()),
            summary: changes.summary.as_ref().map(|summary| summary.as_deref()),
            area: changes
                .area
                .as_ref()
                .map(|area| area.as_ref().map(|value| value.as_str())),
            floor: changes
                .floor
                .as_ref()
                .map(|floor| floor.as_ref().map(|value| value.as_str())),
            tags: changes.tags.as_deref(),
            stock: changes.stock.map(Quantity::get),
        }
    }
}

/// Row struct for reading from the book_inventory table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = book_inventory)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InventoryRow {
    pub inv_id: i32,
    pub book_id: i32,
    pub location: String,
    pub quantity: i32,
}

impl TryFrom<InventoryRow> for BookInventory {
    type Error = ValidationError;

    fn try_from(row: InventoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            inv_id: row.inv_id,
            book_id: BookId::new(row.book_id),
            location: Location::new(row.location)?,
            quantity: Quantity::new(row.quantity)?,
        })
    }
}

/// Insertable struct for inventory upserts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = book_inventory)]
pub(crate) struct NewInventoryRow<'a> {
    pub book_id: i32,
    pub location: &'a str,
    pub quantity: i32,
}

/// Row struct for reading from the orders table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub order_id: String,
    pub user_id: i32,
    pub book_id: i32,
    pub location: String,
    pub status: String,
    pub borrow_time: DateTime<Utc>,
    pub return_time: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = OrderError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Self::restore(OrderParts {
            order_id: row.order_id,
            user_id: row.user_id,
            book_id: row.book_id,
            location: row.location,
            status: row.status,
            borrow_time: row.borrow_time,
            return_time: row.return_time,
        })
    }
}

/// Insertable struct for opening orders.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub order_id: &'a str,
    pub user_id: i32,
    pub book_id: i32,
    pub location: &'a str,
    pub status: &'a str,
    pub borrow_time: DateTime<Utc>,
}

impl<'a> From<&'a Order> for NewOrderRow<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            order_id: order.order_id().as_str(),
            user_id: order.user_id().get(),
            book_id: order.book_id().get(),
            location: order.location().as_str(),
            status: order.status().as_str(),
            borrow_time: order.borrow_time(),
        }
    }
}
