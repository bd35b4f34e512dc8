//! HTTP mapping for domain errors.
//!
//! All failures collapse to the envelope with `code = 500` and the error text
//! as `msg`. List endpoints report `data = []`, everything else `data = null`.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure response produced by handlers and extractors.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    error: Error,
    list: bool,
}

impl ApiError {
    /// Failure of an endpoint whose data is a list.
    pub fn list(error: Error) -> Self {
        Self { error, list: true }
    }

    /// The wrapped domain error.
    pub fn error(&self) -> &Error {
        &self.error
    }

    fn data(&self) -> Value {
        if self.list {
            json!([])
        } else {
            Value::Null
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self { error, list: false }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.error, f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        match self.error.code() {
            ErrorCode::InternalError | ErrorCode::ServiceUnavailable => {
                error!(code = ?self.error.code(), message = %self.error, "request failed");
            }
            _ => warn!(code = ?self.error.code(), message = %self.error, "request rejected"),
        }
        HttpResponse::build(self.status_code()).json(json!({
            "data": self.data(),
            "msg": self.error.message(),
            "code": self.status_code().as_u16(),
        }))
    }
}

fn extractor_error(message: String) -> actix_web::Error {
    ApiError::from(Error::invalid_request(message)).into()
}

/// JSON body extractor settings answering malformed payloads with the envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| extractor_error(err.to_string()))
}

/// Path extractor settings answering bad segments with the envelope.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err: PathError, _req: &HttpRequest| extractor_error(err.to_string()))
}

/// Query extractor settings. Only list endpoints take query parameters.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        ApiError::list(Error::invalid_request(err.to_string())).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;

    async fn body_of(error: ApiError) -> Value {
        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body()).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[rstest]
    #[case(Error::not_found("user with student_id S1 not found"))]
    #[case(Error::conflict("user already exists: student_id S1 is taken"))]
    #[case(Error::service_unavailable("pool timed out"))]
    #[case(Error::internal("boom"))]
    #[actix_rt::test]
    async fn every_code_collapses_to_500(#[case] error: Error) {
        let expected = error.message().to_owned();
        let body = body_of(ApiError::from(error)).await;
        assert_eq!(
            body,
            json!({"data": null, "msg": expected, "code": 500})
        );
    }

    #[actix_web::test]
    async fn list_failures_carry_an_empty_array() {
        let body = body_of(ApiError::list(Error::internal("boom"))).await;
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["msg"], json!("boom"));
    }
}
