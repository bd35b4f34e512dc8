//! PostgreSQL-backed `OrderRepository` adapter.
//!
//! Opening and closing an order each run as one unit of work together with
//! the inventory and stock movement they imply.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::user::UserId;

use super::diesel_error_mapping::{StoreFailure, classify_diesel_error, classify_unit_of_work_error};
use super::models::{NewInventoryRow, NewOrderRow, OrderRow};
use super::pool::{DbPool, PoolError};
use super::schema::{book_inventory, books, orders};
use super::unit_of_work::{UnitOfWork, UnitOfWorkError};

/// Diesel-backed implementation of the [`OrderRepository`] port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<StoreFailure> for OrderRepositoryError {
    fn from(failure: StoreFailure) -> Self {
        match failure {
            StoreFailure::Unique(message) | StoreFailure::ForeignKey(message) => {
                Self::conflict(message)
            }
            StoreFailure::Connection(message) => Self::connection(message),
            StoreFailure::Query(message) => Self::query(message),
        }
    }
}

impl From<UnitOfWorkError> for OrderRepositoryError {
    fn from(error: UnitOfWorkError) -> Self {
        classify_unit_of_work_error(error).into()
    }
}

fn map_diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    classify_diesel_error(error).into()
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    OrderRepositoryError::connection(error.to_string())
}

fn to_order(row: OrderRow) -> Result<Order, OrderRepositoryError> {
    Order::try_from(row)
        .map_err(|err| OrderRepositoryError::query(format!("stored order is invalid: {err}")))
}

async fn take_copy(
    conn: &mut AsyncPgConnection,
    row: &NewOrderRow<'_>,
) -> Result<(), OrderRepositoryError> {
    let taken = diesel::update(
        book_inventory::table
            .filter(book_inventory::book_id.eq(row.book_id))
            .filter(book_inventory::location.eq(row.location))
            .filter(book_inventory::quantity.gt(0)),
    )
    .set(book_inventory::quantity.eq(book_inventory::quantity - 1))
    .execute(conn)
    .await
    .map_err(map_diesel_error)?;
    if taken == 0 {
        return Err(OrderRepositoryError::out_of_stock(row.location));
    }

    let stock_taken = diesel::update(books::table.find(row.book_id).filter(books::stock.gt(0)))
        .set(books::stock.eq(books::stock - 1))
        .execute(conn)
        .await
        .map_err(map_diesel_error)?;
    if stock_taken == 0 {
        return Err(OrderRepositoryError::out_of_stock(row.location));
    }

    diesel::insert_into(orders::table)
        .values(row)
        .execute(conn)
        .await
        .map_err(|err| match classify_diesel_error(err) {
            StoreFailure::Unique(_) => OrderRepositoryError::duplicate(row.order_id),
            other => other.into(),
        })?;
    Ok(())
}

async fn restock_copy(
    conn: &mut AsyncPgConnection,
    book_id: i32,
    location: &str,
) -> Result<(), diesel::result::Error> {
    diesel::insert_into(book_inventory::table)
        .values(NewInventoryRow {
            book_id,
            location,
            quantity: 1,
        })
        .on_conflict((book_inventory::book_id, book_inventory::location))
        .do_update()
        .set(book_inventory::quantity.eq(book_inventory::quantity + 1))
        .execute(conn)
        .await?;
    diesel::update(books::table.find(book_id))
        .set(books::stock.eq(books::stock + 1))
        .execute(conn)
        .await?;
    Ok(())
}

async fn close_order(
    conn: &mut AsyncPgConnection,
    order: &Order,
) -> Result<(), OrderRepositoryError> {
    let order_id = order.order_id().as_str();
    let updated = diesel::update(
        orders::table
            .find(order_id)
            .filter(orders::status.eq(OrderStatus::Borrowed.as_str())),
    )
    .set((
        orders::status.eq(order.status().as_str()),
        orders::return_time.eq(order.return_time()),
    ))
    .execute(conn)
    .await
    .map_err(map_diesel_error)?;

    if updated == 0 {
        let exists: Option<String> = orders::table
            .find(order_id)
            .select(orders::order_id)
            .first(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        return Err(match exists {
            Some(_) => OrderRepositoryError::already_closed(order_id),
            None => OrderRepositoryError::not_found(order_id),
        });
    }

    if order.status() == OrderStatus::Returned {
        restock_copy(conn, order.book_id().get(), order.location().as_str())
            .await
            .map_err(map_diesel_error)?;
    }
    Ok(())
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        orders::table
            .find(order_id.as_str())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_order)
            .transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrderRow> = orders::table
            .filter(orders::user_id.eq(user_id.get()))
            .order((orders::borrow_time.desc(), orders::order_id.asc()))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_order).collect()
    }

    async fn open(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let row = NewOrderRow::from(order);
        UnitOfWork::new(&self.pool, "open_order")
            .run(|conn| async move { take_copy(conn, &row).await }.scope_boxed())
            .await
    }

    async fn close(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        UnitOfWork::new(&self.pool, "close_order")
            .run(|conn| async move { close_order(conn, order).await }.scope_boxed())
            .await
    }
}
