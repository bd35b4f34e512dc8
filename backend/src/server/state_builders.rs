//! Builders wiring repositories into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use mockable::DefaultClock;

use bookhub::domain::ports::{BookRepository, OrderRepository, UserRepository};
use bookhub::domain::{BookService, OrderService, UserService};
use bookhub::inbound::http::health::ReadinessCheck;
use bookhub::inbound::http::state::{HttpState, HttpStatePorts};
use bookhub::outbound::memory::{
    InMemoryBookRepository, InMemoryOrderRepository, InMemoryStore, InMemoryUserRepository,
};
use bookhub::outbound::persistence::{
    DbPool, DieselBookRepository, DieselOrderRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Readiness check pinging the database through the pool.
pub(crate) struct DbReadiness(pub(crate) DbPool);

#[async_trait]
impl ReadinessCheck for DbReadiness {
    async fn check(&self) -> Result<(), String> {
        self.0.ping().await.map_err(|err| err.to_string())
    }
}

/// Wire services over one set of repositories sharing a storage backend.
fn ports_over<U, B, O>(users: Arc<U>, books: Arc<B>, orders: Arc<O>) -> HttpStatePorts
where
    U: UserRepository + 'static,
    B: BookRepository + 'static,
    O: OrderRepository + 'static,
{
    let user_service = Arc::new(UserService::new(users.clone()));
    let book_service = Arc::new(BookService::new(books.clone()));
    let order_service = Arc::new(OrderService::new(
        orders,
        users,
        books,
        Arc::new(DefaultClock),
    ));
    HttpStatePorts {
        users: user_service.clone(),
        users_command: user_service,
        books: book_service.clone(),
        books_command: book_service,
        orders: order_service.clone(),
        orders_command: order_service,
    }
}

fn build_ports(config: &ServerConfig) -> HttpStatePorts {
    match &config.db_pool {
        Some(pool) => ports_over(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselBookRepository::new(pool.clone())),
            Arc::new(DieselOrderRepository::new(pool.clone())),
        ),
        None => {
            let store = InMemoryStore::new();
            ports_over(
                Arc::new(InMemoryUserRepository::new(store.clone())),
                Arc::new(InMemoryBookRepository::new(store.clone())),
                Arc::new(InMemoryOrderRepository::new(store)),
            )
        }
    }
}

/// Build the shared HTTP state, selecting Diesel adapters when a pool is
/// configured and in-memory adapters otherwise.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(build_ports(config), config.page_limits))
}
