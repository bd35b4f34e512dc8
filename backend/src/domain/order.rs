//! Borrow orders and their status lifecycle.
//!
//! An order opens as [`OrderStatus::Borrowed`] and may close exactly once,
//! either as returned or lost. Closing stamps the return time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::book::{BookId, Location};
use super::text::{ValidationError, bounded_text};
use super::user::UserId;

bounded_text! {
    /// Externally generated order token.
    OrderId { field: "order_id", max: 64, compact: true }
}

impl OrderId {
    /// Generate a fresh random order token.
    ///
    /// # Examples
    /// ```
    /// use bookhub::domain::order::OrderId;
    ///
    /// let first = OrderId::generate();
    /// assert_eq!(first.as_str().len(), 32);
    /// assert_ne!(first, OrderId::generate());
    /// ```
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Borrowed,
    Returned,
    Lost,
}

impl OrderStatus {
    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Borrowed => "borrowed",
            Self::Returned => "returned",
            Self::Lost => "lost",
        }
    }

    /// Only borrowed orders may change state, and only to a closed state.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Borrowed, Self::Returned) | (Self::Borrowed, Self::Lost)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrowed" => Ok(Self::Borrowed),
            "returned" => Ok(Self::Returned),
            "lost" => Ok(Self::Lost),
            other => Err(OrderError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Order lifecycle violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("unknown order status `{0}`")]
    UnknownStatus(String),
    #[error("order in status {status} has an inconsistent return time")]
    ReturnTimeMismatch { status: OrderStatus },
    #[error("return time precedes borrow time")]
    ReturnBeforeBorrow,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// One borrow transaction.
///
/// ## Invariants
/// - `return_time` is `None` exactly when `status` is borrowed.
/// - `return_time`, when present, is not earlier than `borrow_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    order_id: OrderId,
    user_id: UserId,
    book_id: BookId,
    location: Location,
    status: OrderStatus,
    borrow_time: DateTime<Utc>,
    return_time: Option<DateTime<Utc>>,
}

/// Raw stored columns of an order.
#[derive(Debug, Clone)]
pub struct OrderParts {
    pub order_id: String,
    pub user_id: i32,
    pub book_id: i32,
    pub location: String,
    pub status: String,
    pub borrow_time: DateTime<Utc>,
    pub return_time: Option<DateTime<Utc>>,
}

impl Order {
    /// Open a new borrow order at `borrow_time`.
    pub fn borrow(
        order_id: OrderId,
        user_id: UserId,
        book_id: BookId,
        location: Location,
        borrow_time: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            user_id,
            book_id,
            location,
            status: OrderStatus::Borrowed,
            borrow_time,
            return_time: None,
        }
    }

    /// Rebuild an order from stored columns, checking the lifecycle invariants.
    pub fn restore(parts: OrderParts) -> Result<Self, OrderError> {
        let OrderParts {
            order_id,
            user_id,
            book_id,
            location,
            status,
            borrow_time,
            return_time,
        } = parts;
        let status: OrderStatus = status.parse()?;
        if (status == OrderStatus::Borrowed) != return_time.is_none() {
            return Err(OrderError::ReturnTimeMismatch { status });
        }
        if return_time.is_some_and(|at| at < borrow_time) {
            return Err(OrderError::ReturnBeforeBorrow);
        }
        Ok(Self {
            order_id: OrderId::new(order_id)?,
            user_id: UserId::new(user_id),
            book_id: BookId::new(book_id),
            location: Location::new(location)?,
            status,
            borrow_time,
            return_time,
        })
    }

    /// Close the order, returning the closed copy.
    ///
    /// A return time earlier than the borrow time is pulled forward to the
    /// borrow time.
    ///
    /// # Examples
    /// ```
    /// use bookhub::domain::book::{BookId, Location};
    /// use bookhub::domain::order::{Order, OrderId, OrderStatus};
    /// use bookhub::domain::user::UserId;
    /// use chrono::Utc;
    ///
    /// let now = Utc::now();
    /// let order = Order::borrow(
    ///     OrderId::generate(),
    ///     UserId::new(1),
    ///     BookId::new(2),
    ///     Location::new("Main").expect("location"),
    ///     now,
    /// );
    /// let returned = order.close(OrderStatus::Returned, now).expect("open order");
    /// assert_eq!(returned.return_time(), Some(now));
    /// assert!(returned.close(OrderStatus::Lost, now).is_err());
    /// ```
    pub fn close(&self, next: OrderStatus, at: DateTime<Utc>) -> Result<Self, OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        Ok(Self {
            status: next,
            return_time: Some(at.max(self.borrow_time)),
            ..self.clone()
        })
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn borrow_time(&self) -> DateTime<Utc> {
        self.borrow_time
    }

    pub fn return_time(&self) -> Option<DateTime<Utc>> {
        self.return_time
    }
}

#[cfg(test)]
mod tests;
