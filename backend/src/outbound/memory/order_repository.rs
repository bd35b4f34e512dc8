//! In-memory `OrderRepository` adapter.

use async_trait::async_trait;

use crate::domain::book::Quantity;
use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::user::UserId;

use super::store::{InMemoryStore, StorePoisoned, Tables};

impl From<StorePoisoned> for OrderRepositoryError {
    fn from(error: StorePoisoned) -> Self {
        Self::connection(error.to_string())
    }
}

/// [`OrderRepository`] backed by an [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryOrderRepository {
    store: InMemoryStore,
}

impl InMemoryOrderRepository {
    /// Create a repository over `store`.
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

fn adjust(quantity: Quantity, delta: i32) -> Result<Quantity, OrderRepositoryError> {
    quantity
        .get()
        .checked_add(delta)
        .ok_or_else(|| OrderRepositoryError::query("copy count overflow"))
        .and_then(|raw| {
            Quantity::new(raw).map_err(|err| OrderRepositoryError::query(err.to_string()))
        })
}

fn take_copy(tables: &mut Tables, order: &Order) -> Result<(), OrderRepositoryError> {
    let location = order.location();
    let row = tables
        .inventory_at_mut(order.book_id(), location)
        .filter(|row| !row.quantity.is_zero())
        .ok_or_else(|| OrderRepositoryError::out_of_stock(location.as_str()))?;
    row.quantity = adjust(row.quantity, -1)?;

    let book = tables
        .books
        .get_mut(&order.book_id().get())
        .filter(|book| !book.stock.is_zero())
        .ok_or_else(|| OrderRepositoryError::out_of_stock(location.as_str()))?;
    book.stock = adjust(book.stock, -1)?;

    if !tables.users.contains_key(&order.user_id().get()) {
        return Err(OrderRepositoryError::conflict(format!(
            "user {} does not exist",
            order.user_id()
        )));
    }
    let key = order.order_id().as_str();
    if tables.orders.contains_key(key) {
        return Err(OrderRepositoryError::duplicate(key));
    }
    tables.orders.insert(key.to_owned(), order.clone());
    Ok(())
}

fn restock_copy(tables: &mut Tables, order: &Order) -> Result<(), OrderRepositoryError> {
    let book_id = order.book_id();
    let quantity = match tables.inventory_at_mut(book_id, order.location()) {
        Some(row) => adjust(row.quantity, 1)?,
        None => adjust(Quantity::ZERO, 1)?,
    };
    tables.upsert_inventory(book_id, order.location(), quantity);

    let book = tables.books.get_mut(&book_id.get()).ok_or_else(|| {
        OrderRepositoryError::conflict(format!("book {book_id} does not exist"))
    })?;
    book.stock = adjust(book.stock, 1)?;
    Ok(())
}

fn close_order(tables: &mut Tables, order: &Order) -> Result<(), OrderRepositoryError> {
    let key = order.order_id().as_str();
    let stored = tables
        .orders
        .get_mut(key)
        .ok_or_else(|| OrderRepositoryError::not_found(key))?;
    if stored.status() != OrderStatus::Borrowed {
        return Err(OrderRepositoryError::already_closed(key));
    }
    *stored = order.clone();
    if order.status() == OrderStatus::Returned {
        restock_copy(tables, order)?;
    }
    Ok(())
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(self
            .store
            .read(|tables| tables.orders.get(order_id.as_str()).cloned())?)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut orders = self.store.read(|tables| {
            tables
                .orders
                .values()
                .filter(|order| order.user_id() == user_id)
                .cloned()
                .collect::<Vec<_>>()
        })?;
        orders.sort_by(|left, right| {
            right
                .borrow_time()
                .cmp(&left.borrow_time())
                .then_with(|| left.order_id().as_str().cmp(right.order_id().as_str()))
        });
        Ok(orders)
    }

    async fn open(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        self.store.transact(|tables| take_copy(tables, order))
    }

    async fn close(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        self.store.transact(|tables| close_order(tables, order))
    }
}
