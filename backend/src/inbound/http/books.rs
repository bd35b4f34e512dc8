//! Books and inventory API handlers.
//!
//! ```text
//! GET    /api/v1/books?page=0&page_size=10
//! POST   /api/v1/books {"title":"T","author":"Au","isbn":"I1"}
//! GET    /api/v1/books/{isbn}
//! PUT    /api/v1/books/{isbn} {"abstract":null}
//! DELETE /api/v1/books/{isbn}
//! GET    /api/v1/books/{isbn}/inventory
//! PUT    /api/v1/books/{isbn}/inventory/{location} {"quantity":3}
//! ```

use actix_web::{delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::book::{
    Area, Author, Book, BookChanges, BookInventory, Floor, Isbn, Location, NewBook, Quantity,
    Title,
};
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::error::{ApiError, ApiResult};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{PageQuery, double_option, invalid_field};

/// Book as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookBody {
    pub bid: i32,
    pub title: String,
    pub author: String,
    #[schema(example = "9787111213826")]
    pub isbn: String,
    #[serde(rename = "abstract")]
    pub summary: Option<String>,
    pub area: Option<String>,
    pub floor: Option<String>,
    pub tags: Vec<String>,
    /// Copies on hand across all locations.
    pub stock: i32,
}

impl From<Book> for BookBody {
    fn from(book: Book) -> Self {
        Self {
            bid: book.bid.get(),
            title: book.title.into(),
            author: book.author.into(),
            isbn: book.isbn.into(),
            summary: book.summary,
            area: book.area.map(String::from),
            floor: book.floor.map(String::from),
            tags: book.tags,
            stock: book.stock.get(),
        }
    }
}

/// One page of books.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookPageBody {
    pub total: u64,
    pub count: usize,
    pub books: Vec<BookBody>,
}

/// Copies of a book at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InventoryBody {
    pub inv_id: i32,
    pub book_id: i32,
    pub location: String,
    pub quantity: i32,
}

impl From<BookInventory> for InventoryBody {
    fn from(row: BookInventory) -> Self {
        Self {
            inv_id: row.inv_id,
            book_id: row.book_id.get(),
            location: row.location.into(),
            quantity: row.quantity.get(),
        }
    }
}

/// Inventory rows of a book, ordered by location.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InventoryListBody {
    pub count: usize,
    pub inventory: Vec<InventoryBody>,
}

/// Request body for `POST /api/v1/books`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[serde(default, rename = "abstract")]
    pub summary: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stock: i32,
}

impl TryFrom<CreateBookRequest> for NewBook {
    type Error = Error;

    fn try_from(value: CreateBookRequest) -> Result<Self, Self::Error> {
        let mut book =
            NewBook::try_new(value.title, value.author, value.isbn).map_err(invalid_field)?;
        book.summary = value.summary;
        book.area = value.area.map(Area::new).transpose().map_err(invalid_field)?;
        book.floor = value.floor.map(Floor::new).transpose().map_err(invalid_field)?;
        book.tags = value.tags;
        book.stock = Quantity::for_field(value.stock, "stock").map_err(invalid_field)?;
        Ok(book)
    }
}

/// Request body for `PUT /api/v1/books/{isbn}`.
///
/// The ISBN is the lookup key and cannot be changed. Nullable fields accept an
/// explicit `null` to clear the stored value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateBookRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(
        default,
        rename = "abstract",
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub summary: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub area: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub floor: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub stock: Option<i32>,
}

impl TryFrom<UpdateBookRequest> for BookChanges {
    type Error = Error;

    fn try_from(value: UpdateBookRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title.map(Title::new).transpose().map_err(invalid_field)?,
            author: value.author.map(Author::new).transpose().map_err(invalid_field)?,
            summary: value.summary,
            area: value
                .area
                .map(|area| area.map(Area::new).transpose())
                .transpose()
                .map_err(invalid_field)?,
            floor: value
                .floor
                .map(|floor| floor.map(Floor::new).transpose())
                .transpose()
                .map_err(invalid_field)?,
            tags: value.tags,
            stock: value
                .stock
                .map(|stock| Quantity::for_field(stock, "stock"))
                .transpose()
                .map_err(invalid_field)?,
        })
    }
}

/// Request body for `PUT /api/v1/books/{isbn}/inventory/{location}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SetInventoryRequest {
    #[schema(minimum = 0)]
    pub quantity: i32,
}

fn parse_isbn(raw: String) -> Result<Isbn, Error> {
    Isbn::new(raw).map_err(invalid_field)
}

/// List books one page at a time, ordered by `bid`.
#[utoipa::path(
    get,
    path = "/api/v1/books",
    params(PageQuery),
    responses(
        (status = 200, description = "Books page", body = Envelope<BookPageBody>),
        (status = 500, description = "Failure; data is an empty array", body = Envelope<BookPageBody>)
    ),
    tags = ["books"],
    operation_id = "listBooks"
)]
#[get("/books")]
pub async fn list_books(
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Envelope<BookPageBody>>> {
    let request = query
        .into_inner()
        .into_request(state.page_limits)
        .map_err(ApiError::list)?;
    let page = state.books.list_books(request).await.map_err(ApiError::list)?;
    let total = page.total();
    let books: Vec<BookBody> = page.into_items().into_iter().map(BookBody::from).collect();
    Ok(web::Json(Envelope::ok(BookPageBody {
        total,
        count: books.len(),
        books,
    })))
}

/// Look up a book by ISBN. `data` is `null` when no book matches.
#[utoipa::path(
    get,
    path = "/api/v1/books/{isbn}",
    params(("isbn" = String, Path, description = "Book ISBN")),
    responses(
        (status = 200, description = "Book or null", body = Envelope<BookBody>),
        (status = 500, description = "Failure", body = Envelope<BookBody>)
    ),
    tags = ["books"],
    operation_id = "getBook"
)]
#[get("/books/{isbn}")]
pub async fn get_book(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<BookBody>>> {
    let isbn = parse_isbn(path.into_inner())?;
    let book = state.books.get_book_by_isbn(&isbn).await?;
    Ok(web::Json(Envelope::found(book.map(BookBody::from))))
}

/// Add a book to the catalogue.
#[utoipa::path(
    post,
    path = "/api/v1/books",
    request_body = CreateBookRequest,
    responses(
        (status = 200, description = "Created book", body = Envelope<BookBody>),
        (status = 500, description = "Validation failure or duplicate ISBN", body = Envelope<BookBody>)
    ),
    tags = ["books"],
    operation_id = "createBook"
)]
#[post("/books")]
pub async fn create_book(
    state: web::Data<HttpState>,
    payload: web::Json<CreateBookRequest>,
) -> ApiResult<web::Json<Envelope<BookBody>>> {
    let book = NewBook::try_from(payload.into_inner())?;
    let created = state.books_command.create_book(book).await?;
    Ok(web::Json(Envelope::ok(BookBody::from(created))))
}

/// Apply a partial update. An unknown ISBN yields `null` data.
#[utoipa::path(
    put,
    path = "/api/v1/books/{isbn}",
    params(("isbn" = String, Path, description = "Book ISBN")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Updated book, or null when absent", body = Envelope<BookBody>),
        (status = 500, description = "Failure", body = Envelope<BookBody>)
    ),
    tags = ["books"],
    operation_id = "updateBook"
)]
#[put("/books/{isbn}")]
pub async fn update_book(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateBookRequest>,
) -> ApiResult<web::Json<Envelope<BookBody>>> {
    let isbn = parse_isbn(path.into_inner())?;
    let changes = BookChanges::try_from(payload.into_inner())?;
    match state.books_command.update_book(&isbn, changes).await {
        Ok(book) => Ok(web::Json(Envelope::ok(BookBody::from(book)))),
        Err(err) if err.code() == ErrorCode::NotFound => {
            Ok(web::Json(Envelope::empty_with_msg(err.message())))
        }
        Err(err) => Err(err.into()),
    }
}

/// Remove a book together with its inventory rows.
#[utoipa::path(
    delete,
    path = "/api/v1/books/{isbn}",
    params(("isbn" = String, Path, description = "Book ISBN")),
    responses(
        (status = 200, description = "Deleted book", body = Envelope<BookBody>),
        (status = 500, description = "Unknown ISBN, book still on loan, or failure", body = Envelope<BookBody>)
    ),
    tags = ["books"],
    operation_id = "deleteBook"
)]
#[delete("/books/{isbn}")]
pub async fn delete_book(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<BookBody>>> {
    let isbn = parse_isbn(path.into_inner())?;
    let deleted = state.books_command.delete_book(&isbn).await?;
    Ok(web::Json(Envelope::ok(BookBody::from(deleted))))
}

/// List where copies of a book are held.
#[utoipa::path(
    get,
    path = "/api/v1/books/{isbn}/inventory",
    params(("isbn" = String, Path, description = "Book ISBN")),
    responses(
        (status = 200, description = "Inventory rows", body = Envelope<InventoryListBody>),
        (status = 500, description = "Unknown ISBN or failure; data is an empty array", body = Envelope<InventoryListBody>)
    ),
    tags = ["books"],
    operation_id = "listInventory"
)]
#[get("/books/{isbn}/inventory")]
pub async fn list_inventory(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<InventoryListBody>>> {
    let isbn = parse_isbn(path.into_inner()).map_err(ApiError::list)?;
    let rows = state
        .books
        .list_inventory(&isbn)
        .await
        .map_err(ApiError::list)?;
    let inventory: Vec<InventoryBody> = rows.into_iter().map(InventoryBody::from).collect();
    Ok(web::Json(Envelope::ok(InventoryListBody {
        count: inventory.len(),
        inventory,
    })))
}

/// Set the number of copies held at one location.
///
/// The book stock is recomputed as the sum over all locations.
#[utoipa::path(
    put,
    path = "/api/v1/books/{isbn}/inventory/{location}",
    params(
        ("isbn" = String, Path, description = "Book ISBN"),
        ("location" = String, Path, description = "Storage location name")
    ),
    request_body = SetInventoryRequest,
    responses(
        (status = 200, description = "Stored inventory row", body = Envelope<InventoryBody>),
        (status = 500, description = "Unknown ISBN, negative quantity, or failure", body = Envelope<InventoryBody>)
    ),
    tags = ["books"],
    operation_id = "setInventory"
)]
#[put("/books/{isbn}/inventory/{location}")]
pub async fn set_inventory(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    payload: web::Json<SetInventoryRequest>,
) -> ApiResult<web::Json<Envelope<InventoryBody>>> {
    let (isbn, location) = path.into_inner();
    let isbn = parse_isbn(isbn)?;
    let location = Location::new(location).map_err(invalid_field)?;
    let quantity = Quantity::new(payload.quantity).map_err(invalid_field)?;
    let stored = state
        .books_command
        .set_inventory(&isbn, location, quantity)
        .await?;
    Ok(web::Json(Envelope::ok(InventoryBody::from(stored))))
}

#[cfg(test)]
#[path = "books_tests.rs"]
mod tests;
