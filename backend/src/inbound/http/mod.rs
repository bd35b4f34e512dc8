//! HTTP inbound adapter exposing the library REST endpoints.

pub mod books;
pub mod envelope;
pub mod error;
pub mod health;
pub mod orders;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::{ApiError, ApiResult};

/// Mount every `/api/v1` route together with the envelope-producing
/// extractor settings.
pub fn api_scope() -> actix_web::Scope {
    web::scope("/api/v1")
        .app_data(error::json_config())
        .app_data(error::path_config())
        .app_data(error::query_config())
        .service(users::list_users)
        .service(users::create_user)
        .service(orders::list_orders_for_student)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(books::list_books)
        .service(books::create_book)
        .service(books::list_inventory)
        .service(books::set_inventory)
        .service(books::get_book)
        .service(books::update_book)
        .service(books::delete_book)
        .service(orders::borrow_book)
        .service(orders::get_order)
        .service(orders::return_book)
        .service(orders::report_lost)
}
