//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed library entities (users, books, inventory,
//! borrow orders) and the use cases built on them. Storage and transport
//! live behind the traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - UserService, BookService, OrderService: driving-port implementations.

pub mod book;
mod book_service;
pub mod error;
pub mod order;
mod order_service;
pub mod ports;
pub mod text;
pub mod user;
mod user_service;

pub use self::book_service::BookService;
pub use self::error::{Error, ErrorCode};
pub use self::order_service::OrderService;
pub use self::text::ValidationError;
pub use self::user_service::UserService;
