//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer together with
//! the request and response bodies. The document backs Swagger UI in debug
//! builds and is exported via `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::books::{
    BookBody, BookPageBody, CreateBookRequest, InventoryBody, InventoryListBody,
    SetInventoryRequest, UpdateBookRequest,
};
use crate::inbound::http::health::Greeting;
use crate::inbound::http::orders::{BorrowBookRequest, OrderBody, OrderListBody};
use crate::inbound::http::users::{CreateUserRequest, UpdateUserRequest, UserBody, UserPageBody};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "BookHub API",
        description = "Library backend managing users, books, inventory and borrow orders."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::books::list_books,
        crate::inbound::http::books::get_book,
        crate::inbound::http::books::create_book,
        crate::inbound::http::books::update_book,
        crate::inbound::http::books::delete_book,
        crate::inbound::http::books::list_inventory,
        crate::inbound::http::books::set_inventory,
        crate::inbound::http::orders::borrow_book,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::return_book,
        crate::inbound::http::orders::report_lost,
        crate::inbound::http::orders::list_orders_for_student,
        crate::inbound::http::health::root,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserBody,
        UserPageBody,
        CreateUserRequest,
        UpdateUserRequest,
        BookBody,
        BookPageBody,
        CreateBookRequest,
        UpdateBookRequest,
        InventoryBody,
        InventoryListBody,
        SetInventoryRequest,
        OrderBody,
        OrderListBody,
        BorrowBookRequest,
        Greeting,
        Error,
        ErrorCode,
    )),
    tags(
        (name = "users", description = "Student accounts"),
        (name = "books", description = "Catalogue and per-location inventory"),
        (name = "orders", description = "Borrow, return and loss of copies"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered OpenAPI surface.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).expect("schema registered") {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema for {name}"),
        }
    }

    #[rstest]
    #[case("/")]
    #[case("/api/v1/users")]
    #[case("/api/v1/users/{student_id}")]
    #[case("/api/v1/users/{student_id}/orders")]
    #[case("/api/v1/books/{isbn}/inventory/{location}")]
    #[case("/api/v1/orders/{order_id}/return")]
    #[case("/health/ready")]
    fn paths_are_registered(#[case] path: &str) {
        assert!(ApiDoc::openapi().paths.paths.contains_key(path));
    }

    #[rstest]
    fn user_detail_path_has_all_verbs() {
        let doc = ApiDoc::openapi();
        let item = doc
            .paths
            .paths
            .get("/api/v1/users/{student_id}")
            .expect("path registered");
        assert!(item.get.is_some());
        assert!(item.put.is_some());
        assert!(item.delete.is_some());
    }

    #[rstest]
    #[case("BookBody", "abstract")]
    #[case("OrderBody", "status")]
    #[case("UserPageBody", "total")]
    fn bodies_expose_wire_fields(#[case] schema: &str, #[case] field: &str) {
        assert!(object_fields(schema).iter().any(|name| name == field));
    }
}
