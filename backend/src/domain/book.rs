//! Book catalogue and inventory data model.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::text::{ValidationError, bounded_text};

/// Storage-assigned surrogate identifier of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(i32);

impl BookId {
    /// Wrap a raw identifier.
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bounded_text! {
    /// Business key for a book. Unique across the catalogue.
    Isbn { field: "isbn", max: 20, compact: true }
}

bounded_text! {
    /// Book title.
    Title { field: "title", max: 200, compact: false }
}

bounded_text! {
    /// Book author.
    Author { field: "author", max: 100, compact: false }
}

bounded_text! {
    /// Library area where the book is shelved.
    Area { field: "area", max: 50, compact: false }
}

bounded_text! {
    /// Floor where the book is shelved.
    Floor { field: "floor", max: 20, compact: false }
}

bounded_text! {
    /// Named storage location holding inventory, such as a warehouse.
    Location { field: "location", max: 100, compact: false }
}

/// Non-negative copy count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// No copies.
    pub const ZERO: Self = Self(0);

    /// Validate a raw count.
    pub fn new(raw: i32) -> Result<Self, ValidationError> {
        Self::for_field(raw, "quantity")
    }

    /// Validate a raw count, reporting failures against `field`.
    pub fn for_field(raw: i32, field: &'static str) -> Result<Self, ValidationError> {
        if raw < 0 {
            return Err(ValidationError::Negative { field });
        }
        Ok(Self(raw))
    }

    /// Raw count.
    pub const fn get(self) -> i32 {
        self.0
    }

    /// True when no copies remain.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<i32> for Quantity {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

/// Catalogue entry as returned by repositories and services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub bid: BookId,
    pub title: Title,
    pub author: Author,
    pub isbn: Isbn,
    pub summary: Option<String>,
    pub area: Option<Area>,
    pub floor: Option<Floor>,
    pub tags: Vec<String>,
    pub stock: Quantity,
}

/// Raw book columns, used to rebuild a [`Book`] from storage.
#[derive(Debug, Clone, Default)]
pub struct BookParts {
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

impl TryFrom<BookParts> for Book {
    type Error = ValidationError;

    fn try_from(parts: BookParts) -> Result<Self, Self::Error> {
        let BookParts {
            bid,
            title,
            author,
            isbn,
            summary,
            area,
            floor,
            tags,
            stock,
        } = parts;
        Ok(Self {
            bid: BookId::new(bid),
            title: Title::new(title)?,
            author: Author::new(author)?,
            isbn: Isbn::new(isbn)?,
            summary,
            area: area.map(Area::new).transpose()?,
            floor: floor.map(Floor::new).transpose()?,
            tags,
            stock: Quantity::for_field(stock, "stock")?,
        })
    }
}

/// Validated input for creating a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: Title,
    pub author: Author,
    pub isbn: Isbn,
    pub summary: Option<String>,
    pub area: Option<Area>,
    pub floor: Option<Floor>,
    pub tags: Vec<String>,
    pub stock: Quantity,
}

impl NewBook {
    /// Minimal book with only the required fields and zero stock.
    ///
    /// # Examples
    /// ```
    /// use bookhub::domain::book::NewBook;
    ///
    /// let book = NewBook::try_new("T", "Au", "ISBN1").expect("valid");
    /// assert!(book.stock.is_zero());
    /// assert!(book.tags.is_empty());
    /// ```
    pub fn try_new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: Title::new(title)?,
            author: Author::new(author)?,
            isbn: Isbn::new(isbn)?,
            summary: None,
            area: None,
            floor: None,
            tags: Vec::new(),
            stock: Quantity::ZERO,
        })
    }
}

/// Partial update for a book. The ISBN is the lookup key and never changes.
///
/// Nullable columns use `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<Title>,
    pub author: Option<Author>,
    pub summary: Option<Option<String>>,
    pub area: Option<Option<Area>>,
    pub floor: Option<Option<Floor>>,
    pub tags: Option<Vec<String>>,
    pub stock: Option<Quantity>,
}

impl BookChanges {
    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.summary.is_none()
            && self.area.is_none()
            && self.floor.is_none()
            && self.tags.is_none()
            && self.stock.is_none()
    }

    /// Apply the supplied fields to `book`.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(summary) = &self.summary {
            book.summary = summary.clone();
        }
        if let Some(area) = &self.area {
            book.area = area.clone();
        }
        if let Some(floor) = &self.floor {
            book.floor = floor.clone();
        }
        if let Some(tags) = &self.tags {
            book.tags = tags.clone();
        }
        if let Some(stock) = self.stock {
            book.stock = stock;
        }
    }
}

/// Copies of one book held at one location.
///
/// At most one record exists per `(book_id, location)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInventory {
    pub inv_id: i32,
    pub book_id: BookId,
    pub location: Location,
    pub quantity: Quantity,
}
