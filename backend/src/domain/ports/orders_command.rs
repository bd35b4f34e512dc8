//! Driving port for borrowing and returning books.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::book::{Isbn, Location};
use crate::domain::order::{Order, OrderId};
use crate::domain::user::StudentId;

/// Validated borrow request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowRequest {
    pub student_id: StudentId,
    pub isbn: Isbn,
    pub location: Location,
}

/// Domain use-case port for the borrow lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersCommand: Send + Sync {
    /// Lend one copy from the requested location.
    async fn borrow_book(&self, request: BorrowRequest) -> Result<Order, Error>;

    /// Mark a borrowed order as returned and restock the copy.
    async fn return_book(&self, order_id: &OrderId) -> Result<Order, Error>;

    /// Mark a borrowed order as lost.
    async fn report_lost(&self, order_id: &OrderId) -> Result<Order, Error>;
}
