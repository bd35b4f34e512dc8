//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports (`*Repository`) describe what the domain needs from storage.
//! Each exposes a typed error enum so adapters map their failures into
//! predictable variants. Driving ports (`*Query`, `*Command`) are what inbound
//! adapters call; they speak [`crate::domain::Error`].

mod book_repository;
mod books_command;
mod books_query;
mod order_repository;
mod orders_command;
mod orders_query;
mod user_repository;
mod users_command;
mod users_query;

#[cfg(test)]
pub use book_repository::MockBookRepository;
pub use book_repository::{BookRepository, BookRepositoryError};
#[cfg(test)]
pub use books_command::MockBooksCommand;
pub use books_command::BooksCommand;
#[cfg(test)]
pub use books_query::MockBooksQuery;
pub use books_query::BooksQuery;
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderRepository, OrderRepositoryError};
#[cfg(test)]
pub use orders_command::MockOrdersCommand;
pub use orders_command::{BorrowRequest, OrdersCommand};
#[cfg(test)]
pub use orders_query::MockOrdersQuery;
pub use orders_query::OrdersQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
#[cfg(test)]
pub use users_command::MockUsersCommand;
pub use users_command::UsersCommand;
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
