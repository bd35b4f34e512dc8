//! Tests for the order service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::book::{Book, BookId, BookParts, Isbn, Location};
use crate::domain::ports::{MockBookRepository, MockOrderRepository, MockUserRepository};
use crate::domain::user::UserId;

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn fixture_clock(now: DateTime<Utc>) -> Arc<dyn Clock> {
    Arc::new(FixtureClock { utc_now: now })
}

fn user() -> User {
    User::try_from_parts(4, "A".to_owned(), "S1".to_owned(), None, "123".to_owned())
        .expect("valid user")
}

fn book() -> Book {
    Book::try_from(BookParts {
        bid: 9,
        title: "T".to_owned(),
        author: "Au".to_owned(),
        isbn: "ISBN1".to_owned(),
        stock: 1,
        ..BookParts::default()
    })
    .expect("valid book")
}

fn borrow_request() -> BorrowRequest {
    BorrowRequest {
        student_id: StudentId::new("S1").expect("student id"),
        isbn: Isbn::new("ISBN1").expect("isbn"),
        location: Location::new("Main").expect("location"),
    }
}

fn open_order(now: DateTime<Utc>) -> Order {
    Order::borrow(
        OrderId::new("order-1").expect("order id"),
        UserId::new(4),
        BookId::new(9),
        Location::new("Main").expect("location"),
        now,
    )
}

fn service(
    orders: MockOrderRepository,
    users: MockUserRepository,
    books: MockBookRepository,
    now: DateTime<Utc>,
) -> OrderService<MockOrderRepository, MockUserRepository, MockBookRepository> {
    OrderService::new(
        Arc::new(orders),
        Arc::new(users),
        Arc::new(books),
        fixture_clock(now),
    )
}

#[rstest]
#[tokio::test]
async fn borrow_opens_order_for_resolved_user_and_book(now: DateTime<Utc>) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_student_id()
        .times(1)
        .return_once(|_| Ok(Some(user())));
    let mut books = MockBookRepository::new();
    books
        .expect_find_by_isbn()
        .times(1)
        .return_once(|_| Ok(Some(book())));
    let mut orders = MockOrderRepository::new();
    orders
        .expect_open()
        .withf(move |order| {
            order.user_id() == UserId::new(4)
                && order.book_id() == BookId::new(9)
                && order.status() == OrderStatus::Borrowed
                && order.borrow_time() == now
        })
        .times(1)
        .return_once(|_| Ok(()));

    let order = service(orders, users, books, now)
        .borrow_book(borrow_request())
        .await
        .expect("borrow succeeds");

    assert_eq!(order.location().as_str(), "Main");
    assert!(order.return_time().is_none());
}

#[rstest]
#[tokio::test]
async fn borrow_for_unknown_student_never_touches_orders(now: DateTime<Utc>) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_student_id()
        .times(1)
        .return_once(|_| Ok(None));
    let mut orders = MockOrderRepository::new();
    orders.expect_open().never();

    let err = service(orders, users, MockBookRepository::new(), now)
        .borrow_book(borrow_request())
        .await
        .expect_err("unknown student");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn out_of_stock_is_a_conflict(now: DateTime<Utc>) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_student_id()
        .return_once(|_| Ok(Some(user())));
    let mut books = MockBookRepository::new();
    books
        .expect_find_by_isbn()
        .return_once(|_| Ok(Some(book())));
    let mut orders = MockOrderRepository::new();
    orders
        .expect_open()
        .return_once(|_| Err(OrderRepositoryError::out_of_stock("Main")));

    let err = service(orders, users, books, now)
        .borrow_book(borrow_request())
        .await
        .expect_err("no copies");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "no copies available at Main");
}

#[rstest]
#[tokio::test]
async fn return_closes_borrowed_order_with_clock_time(now: DateTime<Utc>) {
    let mut orders = MockOrderRepository::new();
    orders
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(open_order(now))));
    orders
        .expect_close()
        .withf(|order| order.status() == OrderStatus::Returned)
        .times(1)
        .return_once(|_| Ok(()));

    let order_id = OrderId::new("order-1").expect("order id");
    let closed = service(orders, MockUserRepository::new(), MockBookRepository::new(), now)
        .return_book(&order_id)
        .await
        .expect("return succeeds");

    assert_eq!(closed.status(), OrderStatus::Returned);
    assert_eq!(closed.return_time(), Some(now));
}

#[rstest]
#[tokio::test]
async fn closed_orders_cannot_be_reported_lost(now: DateTime<Utc>) {
    let returned = open_order(now)
        .close(OrderStatus::Returned, now)
        .expect("closes");
    let mut orders = MockOrderRepository::new();
    orders
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(returned)));
    orders.expect_close().never();

    let order_id = OrderId::new("order-1").expect("order id");
    let err = service(orders, MockUserRepository::new(), MockBookRepository::new(), now)
        .report_lost(&order_id)
        .await
        .expect_err("already returned");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn closing_unknown_order_is_not_found(now: DateTime<Utc>) {
    let mut orders = MockOrderRepository::new();
    orders.expect_find_by_id().return_once(|_| Ok(None));

    let order_id = OrderId::new("missing").expect("order id");
    let err = service(orders, MockUserRepository::new(), MockBookRepository::new(), now)
        .return_book(&order_id)
        .await
        .expect_err("unknown order");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(OrderRepositoryError::not_found("o"), ErrorCode::NotFound)]
#[case(OrderRepositoryError::already_closed("o"), ErrorCode::Conflict)]
#[case(OrderRepositoryError::connection("down"), ErrorCode::ServiceUnavailable)]
#[case(OrderRepositoryError::query("bad"), ErrorCode::InternalError)]
fn repository_errors_map_to_domain_codes(
    #[case] error: OrderRepositoryError,
    #[case] expected: ErrorCode,
) {
    assert_eq!(map_order_repository_error(error).code(), expected);
}
