//! Borrow order API handlers.
//!
//! ```text
//! POST /api/v1/orders {"student_id":"S1","isbn":"I1","location":"Main"}
//! GET  /api/v1/orders/{order_id}
//! POST /api/v1/orders/{order_id}/return
//! POST /api/v1/orders/{order_id}/lost
//! GET  /api/v1/users/{student_id}/orders
//! ```

use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::book::{Isbn, Location};
use crate::domain::order::{Order, OrderId};
use crate::domain::ports::BorrowRequest;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::error::{ApiError, ApiResult};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::parse_student_id;
use crate::inbound::http::validation::invalid_field;

/// Borrow order as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderBody {
    #[schema(example = "5f0c6f3e9b6a4c3f8d2e1a0b9c8d7e6f")]
    pub order_id: String,
    pub user_id: i32,
    pub book_id: i32,
    pub location: String,
    /// One of `borrowed`, `returned` or `lost`.
    #[schema(example = "borrowed")]
    pub status: String,
    pub borrow_time: DateTime<Utc>,
    pub return_time: Option<DateTime<Utc>>,
}

impl From<Order> for OrderBody {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.order_id().as_str().to_owned(),
            user_id: order.user_id().get(),
            book_id: order.book_id().get(),
            location: order.location().as_str().to_owned(),
            status: order.status().as_str().to_owned(),
            borrow_time: order.borrow_time(),
            return_time: order.return_time(),
        }
    }
}

/// Orders of one user, most recent borrow first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderListBody {
    pub count: usize,
    pub orders: Vec<OrderBody>,
}

/// Request body for `POST /api/v1/orders`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BorrowBookRequest {
    pub student_id: String,
    pub isbn: String,
    /// Location to take the copy from.
    pub location: String,
}

impl TryFrom<BorrowBookRequest> for BorrowRequest {
    type Error = Error;

    fn try_from(value: BorrowBookRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            student_id: parse_student_id(value.student_id)?,
            isbn: Isbn::new(value.isbn).map_err(invalid_field)?,
            location: Location::new(value.location).map_err(invalid_field)?,
        })
    }
}

fn parse_order_id(raw: String) -> Result<OrderId, Error> {
    OrderId::new(raw).map_err(invalid_field)
}

/// Borrow one copy of a book from a location.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = BorrowBookRequest,
    responses(
        (status = 200, description = "Opened order", body = Envelope<OrderBody>),
        (status = 500, description = "Unknown user or book, no copy at the location, or failure", body = Envelope<OrderBody>)
    ),
    tags = ["orders"],
    operation_id = "borrowBook"
)]
#[post("/orders")]
pub async fn borrow_book(
    state: web::Data<HttpState>,
    payload: web::Json<BorrowBookRequest>,
) -> ApiResult<web::Json<Envelope<OrderBody>>> {
    let request = BorrowRequest::try_from(payload.into_inner())?;
    let order = state.orders_command.borrow_book(request).await?;
    Ok(web::Json(Envelope::ok(OrderBody::from(order))))
}

/// Look up an order. `data` is `null` when no order matches.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{order_id}",
    params(("order_id" = String, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "Order or null", body = Envelope<OrderBody>),
        (status = 500, description = "Failure", body = Envelope<OrderBody>)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{order_id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<OrderBody>>> {
    let order_id = parse_order_id(path.into_inner())?;
    let order = state.orders.get_order(&order_id).await?;
    Ok(web::Json(Envelope::found(order.map(OrderBody::from))))
}

/// Return a borrowed copy to its location.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{order_id}/return",
    params(("order_id" = String, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "Returned order", body = Envelope<OrderBody>),
        (status = 500, description = "Unknown or already closed order", body = Envelope<OrderBody>)
    ),
    tags = ["orders"],
    operation_id = "returnBook"
)]
#[post("/orders/{order_id}/return")]
pub async fn return_book(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<OrderBody>>> {
    let order_id = parse_order_id(path.into_inner())?;
    let order = state.orders_command.return_book(&order_id).await?;
    Ok(web::Json(Envelope::ok(OrderBody::from(order))))
}

/// Record a borrowed copy as lost. The copy is not restocked.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{order_id}/lost",
    params(("order_id" = String, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "Order marked lost", body = Envelope<OrderBody>),
        (status = 500, description = "Unknown or already closed order", body = Envelope<OrderBody>)
    ),
    tags = ["orders"],
    operation_id = "reportLost"
)]
#[post("/orders/{order_id}/lost")]
pub async fn report_lost(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<OrderBody>>> {
    let order_id = parse_order_id(path.into_inner())?;
    let order = state.orders_command.report_lost(&order_id).await?;
    Ok(web::Json(Envelope::ok(OrderBody::from(order))))
}

/// List a user's orders.
#[utoipa::path(
    get,
    path = "/api/v1/users/{student_id}/orders",
    params(("student_id" = String, Path, description = "Student identifier")),
    responses(
        (status = 200, description = "Orders", body = Envelope<OrderListBody>),
        (status = 500, description = "Unknown user or failure; data is an empty array", body = Envelope<OrderListBody>)
    ),
    tags = ["orders"],
    operation_id = "listOrdersForStudent"
)]
#[get("/users/{student_id}/orders")]
pub async fn list_orders_for_student(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<OrderListBody>>> {
    let student_id = parse_student_id(path.into_inner()).map_err(ApiError::list)?;
    let orders = state
        .orders
        .list_orders_for_student(&student_id)
        .await
        .map_err(ApiError::list)?;
    let orders: Vec<OrderBody> = orders.into_iter().map(OrderBody::from).collect();
    Ok(web::Json(Envelope::ok(OrderListBody {
        count: orders.len(),
        orders,
    })))
}

#[cfg(test)]
#[path = "orders_tests.rs"]
mod tests;
