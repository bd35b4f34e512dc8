//! Borrow order domain service.
//!
//! Resolves business keys to stored users and books, stamps times from the
//! injected clock and hands the lifecycle change to the order repository,
//! which applies it together with the matching inventory movement.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::Error;
use crate::domain::book_service::map_book_repository_error;
use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::domain::ports::{
    BookRepository, BorrowRequest, OrderRepository, OrderRepositoryError, OrdersCommand,
    OrdersQuery, UserRepository,
};
use crate::domain::user::{StudentId, User};
use crate::domain::user_service::map_user_repository_error;

pub(crate) fn map_order_repository_error(error: OrderRepositoryError) -> Error {
    let message = error.to_string();
    match error {
        OrderRepositoryError::NotFound { .. } => Error::not_found(message),
        OrderRepositoryError::Duplicate { .. }
        | OrderRepositoryError::OutOfStock { .. }
        | OrderRepositoryError::AlreadyClosed { .. }
        | OrderRepositoryError::Conflict { .. } => Error::conflict(message),
        OrderRepositoryError::Connection { .. } => Error::service_unavailable(message),
        OrderRepositoryError::Query { .. } => Error::internal(message),
    }
}

/// Order service implementing [`OrdersQuery`] and [`OrdersCommand`].
#[derive(Clone)]
pub struct OrderService<O, U, B> {
    orders: Arc<O>,
    users: Arc<U>,
    books: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<O, U, B> OrderService<O, U, B> {
    /// Create a service over the order, user and book repositories.
    pub fn new(orders: Arc<O>, users: Arc<U>, books: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            orders,
            users,
            books,
            clock,
        }
    }
}

impl<O, U, B> OrderService<O, U, B>
where
    O: OrderRepository,
    U: UserRepository,
    B: BookRepository,
{
    async fn require_user(&self, student_id: &StudentId) -> Result<User, Error> {
        self.users
            .find_by_student_id(student_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user with student_id {student_id} not found")))
    }

    async fn close(&self, order_id: &OrderId, next: OrderStatus) -> Result<Order, Error> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await
            .map_err(map_order_repository_error)?
            .ok_or_else(|| Error::not_found(format!("order {order_id} not found")))?;
        let closed = order
            .close(next, self.clock.utc())
            .map_err(|err| Error::conflict(err.to_string()))?;
        self.orders
            .close(&closed)
            .await
            .map_err(map_order_repository_error)?;
        info!(order_id = %order_id, status = %next, "order closed");
        Ok(closed)
    }
}

#[async_trait]
impl<O, U, B> OrdersQuery for OrderService<O, U, B>
where
    O: OrderRepository,
    U: UserRepository,
    B: BookRepository,
{
    async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>, Error> {
        self.orders
            .find_by_id(order_id)
            .await
            .map_err(map_order_repository_error)
    }

    async fn list_orders_for_student(&self, student_id: &StudentId) -> Result<Vec<Order>, Error> {
        let user = self.require_user(student_id).await?;
        self.orders
            .list_for_user(user.uid)
            .await
            .map_err(map_order_repository_error)
    }
}

#[async_trait]
impl<O, U, B> OrdersCommand for OrderService<O, U, B>
where
    O: OrderRepository,
    U: UserRepository,
    B: BookRepository,
{
    async fn borrow_book(&self, request: BorrowRequest) -> Result<Order, Error> {
        let BorrowRequest {
            student_id,
            isbn,
            location,
        } = request;
        let user = self.require_user(&student_id).await?;
        let book = self
            .books
            .find_by_isbn(&isbn)
            .await
            .map_err(map_book_repository_error)?
            .ok_or_else(|| Error::not_found(format!("book with isbn {isbn} not found")))?;

        let order = Order::borrow(
            OrderId::generate(),
            user.uid,
            book.bid,
            location,
            self.clock.utc(),
        );
        self.orders
            .open(&order)
            .await
            .map_err(map_order_repository_error)?;
        info!(
            order_id = %order.order_id(),
            student_id = %student_id,
            isbn = %isbn,
            "book borrowed"
        );
        Ok(order)
    }

    async fn return_book(&self, order_id: &OrderId) -> Result<Order, Error> {
        self.close(order_id, OrderStatus::Returned).await
    }

    async fn report_lost(&self, order_id: &OrderId) -> Result<Order, Error> {
        self.close(order_id, OrderStatus::Lost).await
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
