//! Uniform response envelope.
//!
//! Every endpoint answers with `{data, msg, code}` where `code` mirrors the
//! HTTP status.

use actix_web::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

/// Message attached to successful responses.
pub const SUCCESS_MSG: &str = "success";

/// Response wrapper shared by all endpoints.
///
/// # Examples
/// ```
/// use bookhub::inbound::http::envelope::Envelope;
///
/// let body = Envelope::ok("S1");
/// assert_eq!(body.code, 200);
/// assert_eq!(body.msg, "success");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Envelope<T> {
    /// Operation result. `null` when a lookup found nothing.
    pub data: Option<T>,
    /// Human-readable status.
    #[schema(example = "success")]
    pub msg: String,
    /// Business code, equal to the HTTP status.
    #[schema(example = 200)]
    pub code: u16,
}

impl<T> Envelope<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            msg: SUCCESS_MSG.to_owned(),
            code: StatusCode::OK.as_u16(),
        }
    }

    /// Successful response for a lookup that matched nothing.
    pub fn empty() -> Self {
        Self::empty_with_msg(SUCCESS_MSG)
    }

    /// Successful response with no data and a custom message.
    pub fn empty_with_msg(msg: impl Into<String>) -> Self {
        Self {
            data: None,
            msg: msg.into(),
            code: StatusCode::OK.as_u16(),
        }
    }

    /// Wrap an optional lookup result.
    pub fn found(data: Option<T>) -> Self {
        data.map_or_else(Self::empty, Self::ok)
    }
}
