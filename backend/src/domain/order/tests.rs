//! Tests for the order lifecycle.

use super::*;
use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};

#[fixture]
fn borrowed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn open_order(borrowed_at: DateTime<Utc>) -> Order {
    Order::borrow(
        OrderId::new("order-1").expect("order id"),
        UserId::new(1),
        BookId::new(2),
        Location::new("Main").expect("location"),
        borrowed_at,
    )
}

fn parts(status: &str, return_time: Option<DateTime<Utc>>, borrowed_at: DateTime<Utc>) -> OrderParts {
    OrderParts {
        order_id: "order-1".to_owned(),
        user_id: 1,
        book_id: 2,
        location: "Main".to_owned(),
        status: status.to_owned(),
        borrow_time: borrowed_at,
        return_time,
    }
}

#[rstest]
#[case(OrderStatus::Borrowed, OrderStatus::Returned, true)]
#[case(OrderStatus::Borrowed, OrderStatus::Lost, true)]
#[case(OrderStatus::Borrowed, OrderStatus::Borrowed, false)]
#[case(OrderStatus::Returned, OrderStatus::Lost, false)]
#[case(OrderStatus::Returned, OrderStatus::Borrowed, false)]
#[case(OrderStatus::Lost, OrderStatus::Returned, false)]
#[case(OrderStatus::Lost, OrderStatus::Borrowed, false)]
fn transition_table(#[case] from: OrderStatus, #[case] to: OrderStatus, #[case] allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[rstest]
fn new_orders_are_borrowed_without_return_time(open_order: Order) {
    assert_eq!(open_order.status(), OrderStatus::Borrowed);
    assert!(open_order.return_time().is_none());
}

#[rstest]
fn closing_stamps_return_time(open_order: Order, borrowed_at: DateTime<Utc>) {
    let at = borrowed_at + Duration::days(3);
    let lost = open_order.close(OrderStatus::Lost, at).expect("open order closes");
    assert_eq!(lost.status(), OrderStatus::Lost);
    assert_eq!(lost.return_time(), Some(at));
    assert_eq!(lost.borrow_time(), borrowed_at);
}

#[rstest]
fn closed_orders_cannot_change_again(open_order: Order, borrowed_at: DateTime<Utc>) {
    let returned = open_order
        .close(OrderStatus::Returned, borrowed_at)
        .expect("open order closes");
    assert_eq!(
        returned.close(OrderStatus::Lost, borrowed_at),
        Err(OrderError::InvalidTransition {
            from: OrderStatus::Returned,
            to: OrderStatus::Lost,
        })
    );
}

#[rstest]
fn clock_skew_never_yields_return_before_borrow(open_order: Order, borrowed_at: DateTime<Utc>) {
    let returned = open_order
        .close(OrderStatus::Returned, borrowed_at - Duration::minutes(5))
        .expect("open order closes");
    assert_eq!(returned.return_time(), Some(borrowed_at));
}

#[rstest]
#[case("borrowed", false)]
#[case("returned", true)]
#[case("lost", true)]
fn restore_accepts_consistent_rows(
    #[case] status: &str,
    #[case] with_return: bool,
    borrowed_at: DateTime<Utc>,
) {
    let return_time = with_return.then_some(borrowed_at + Duration::hours(1));
    assert!(Order::restore(parts(status, return_time, borrowed_at)).is_ok());
}

#[rstest]
#[case("borrowed", true)]
#[case("returned", false)]
fn restore_rejects_mismatched_return_time(
    #[case] status: &str,
    #[case] with_return: bool,
    borrowed_at: DateTime<Utc>,
) {
    let return_time = with_return.then_some(borrowed_at);
    assert!(matches!(
        Order::restore(parts(status, return_time, borrowed_at)),
        Err(OrderError::ReturnTimeMismatch { .. })
    ));
}

#[rstest]
fn restore_rejects_unknown_status(borrowed_at: DateTime<Utc>) {
    assert_eq!(
        Order::restore(parts("stolen", None, borrowed_at)).map(|_| ()),
        Err(OrderError::UnknownStatus("stolen".to_owned()))
    );
}

#[rstest]
fn status_round_trips_through_storage_text() {
    for status in [OrderStatus::Borrowed, OrderStatus::Returned, OrderStatus::Lost] {
        assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
    }
}
