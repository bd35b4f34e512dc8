//! Driving port for order lookups.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::order::{Order, OrderId};
use crate::domain::user::StudentId;

/// Domain use-case port for reading borrow orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersQuery: Send + Sync {
    /// Look an order up. `Ok(None)` when absent.
    async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>, Error>;

    /// List a student's orders. Fails with `not_found` for unknown students.
    async fn list_orders_for_student(&self, student_id: &StudentId) -> Result<Vec<Order>, Error>;
}
