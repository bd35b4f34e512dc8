//! Test helpers for the HTTP handlers.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use mockable::DefaultClock;
use pagination::PageLimits;
use serde_json::Value;

use crate::domain::{BookService, OrderService, UserService};
use crate::inbound::http::api_scope;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{
    InMemoryBookRepository, InMemoryOrderRepository, InMemoryStore, InMemoryUserRepository,
};

/// Handler state backed by a fresh in-memory store.
pub(crate) fn memory_state() -> HttpState {
    let store = InMemoryStore::new();
    let users = Arc::new(InMemoryUserRepository::new(store.clone()));
    let books = Arc::new(InMemoryBookRepository::new(store.clone()));
    let orders = Arc::new(InMemoryOrderRepository::new(store));
    let user_service = Arc::new(UserService::new(users.clone()));
    let book_service = Arc::new(BookService::new(books.clone()));
    let order_service = Arc::new(OrderService::new(
        orders,
        users,
        books,
        Arc::new(DefaultClock),
    ));
    HttpState::new(
        HttpStatePorts {
            users: user_service.clone(),
            users_command: user_service,
            books: book_service.clone(),
            books_command: book_service,
            orders: order_service.clone(),
            orders_command: order_service,
        },
        PageLimits::default(),
    )
}

/// Application serving the API routes over `state`.
pub(crate) fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .service(api_scope())
}

/// Call `app` and decode the JSON envelope.
pub(crate) async fn send(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body: Value = actix_test::read_body_json(response).await;
    (status, body)
}
