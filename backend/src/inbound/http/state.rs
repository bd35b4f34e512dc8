//! Shared HTTP adapter state.
//!
//! Handlers receive this state via `actix_web::web::Data` and only depend on
//! driving ports, so they stay testable without I/O.

use std::sync::Arc;

use pagination::PageLimits;

use crate::domain::ports::{
    BooksCommand, BooksQuery, OrdersCommand, OrdersQuery, UsersCommand, UsersQuery,
};

/// Parameter object bundling the driving ports used by handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    pub books: Arc<dyn BooksQuery>,
    pub books_command: Arc<dyn BooksCommand>,
    pub orders: Arc<dyn OrdersQuery>,
    pub orders_command: Arc<dyn OrdersCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    pub books: Arc<dyn BooksQuery>,
    pub books_command: Arc<dyn BooksCommand>,
    pub orders: Arc<dyn OrdersQuery>,
    pub orders_command: Arc<dyn OrdersCommand>,
    pub page_limits: PageLimits,
}

impl HttpState {
    /// Construct state from a ports bundle and the pagination limits.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use bookhub::domain::{BookService, OrderService, UserService};
    /// use bookhub::inbound::http::state::{HttpState, HttpStatePorts};
    /// use bookhub::outbound::memory::{
    ///     InMemoryBookRepository, InMemoryOrderRepository, InMemoryStore, InMemoryUserRepository,
    /// };
    /// use mockable::DefaultClock;
    /// use pagination::PageLimits;
    ///
    /// let store = InMemoryStore::new();
    /// let users = Arc::new(InMemoryUserRepository::new(store.clone()));
    /// let books = Arc::new(InMemoryBookRepository::new(store.clone()));
    /// let orders = Arc::new(InMemoryOrderRepository::new(store));
    /// let user_service = Arc::new(UserService::new(users.clone()));
    /// let book_service = Arc::new(BookService::new(books.clone()));
    /// let order_service = Arc::new(OrderService::new(
    ///     orders,
    ///     users,
    ///     books,
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(
    ///     HttpStatePorts {
    ///         users: user_service.clone(),
    ///         users_command: user_service,
    ///         books: book_service.clone(),
    ///         books_command: book_service,
    ///         orders: order_service.clone(),
    ///         orders_command: order_service,
    ///     },
    ///     PageLimits::default(),
    /// );
    /// assert_eq!(state.page_limits.max_page_size(), 100);
    /// ```
    pub fn new(ports: HttpStatePorts, page_limits: PageLimits) -> Self {
        let HttpStatePorts {
            users,
            users_command,
            books,
            books_command,
            orders,
            orders_command,
        } = ports;
        Self {
            users,
            users_command,
            books,
            books_command,
            orders,
            orders_command,
            page_limits,
        }
    }
}
