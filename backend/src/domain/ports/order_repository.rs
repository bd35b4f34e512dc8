//! Port abstraction for borrow order persistence.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::order::{Order, OrderId};
use crate::domain::user::UserId;

/// Persistence errors raised by order repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderRepositoryError {
    /// No order carries the requested identifier.
    #[error("order {order_id} not found")]
    NotFound { order_id: String },
    /// The order identifier is already taken.
    #[error("order {order_id} already exists")]
    Duplicate { order_id: String },
    /// No copy is available at the requested location.
    #[error("no copies available at {location}")]
    OutOfStock { location: String },
    /// The stored order was not in a state that allows the change.
    #[error("order {order_id} is no longer borrowed")]
    AlreadyClosed { order_id: String },
    /// A referenced user or book no longer exists.
    #[error("order references missing data: {message}")]
    Conflict { message: String },
    /// Repository connection could not be established.
    #[error("order repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("order repository query failed: {message}")]
    Query { message: String },
}

impl OrderRepositoryError {
    pub fn not_found(order_id: impl Into<String>) -> Self {
        Self::NotFound {
            order_id: order_id.into(),
        }
    }

    pub fn duplicate(order_id: impl Into<String>) -> Self {
        Self::Duplicate {
            order_id: order_id.into(),
        }
    }

    pub fn out_of_stock(location: impl Into<String>) -> Self {
        Self::OutOfStock {
            location: location.into(),
        }
    }

    pub fn already_closed(order_id: impl Into<String>) -> Self {
        Self::AlreadyClosed {
            order_id: order_id.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Storage-independent order persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Fetch an order. `Ok(None)` when absent.
    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderRepositoryError>;

    /// List a user's orders, most recent borrow first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Persist a borrowed order and take one copy out of inventory.
    ///
    /// The inventory row at the order location and the book stock are both
    /// decremented in the same unit of work as the insert. Fails with
    /// [`OrderRepositoryError::OutOfStock`] without side effects when no copy
    /// is available.
    async fn open(&self, order: &Order) -> Result<(), OrderRepositoryError>;

    /// Persist a closed order.
    ///
    /// The stored order must still be borrowed, otherwise
    /// [`OrderRepositoryError::AlreadyClosed`] is returned. A returned copy is
    /// put back into inventory at the order location.
    async fn close(&self, order: &Order) -> Result<(), OrderRepositoryError>;
}
