//! Shared request parsing helpers for the HTTP handlers.

use pagination::{PageLimits, PageParams, PageRequest};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::{Error, ValidationError};

/// Convert a value-object failure into an `invalid_request` error.
pub(crate) fn invalid_field(err: ValidationError) -> Error {
    let field = err.field();
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Keep an explicit `null` distinct from an omitted field.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`: an
/// omitted field stays `None`, `null` becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Offset pagination query parameters.
#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page index. Defaults to 0.
    pub page: Option<u32>,
    /// Items per page. Defaults to 10.
    pub page_size: Option<u32>,
}

impl PageQuery {
    /// Validate against the configured page limits.
    pub(crate) fn into_request(self, limits: PageLimits) -> Result<PageRequest, Error> {
        PageRequest::from_params(
            PageParams {
                page: self.page,
                page_size: self.page_size,
            },
            limits,
        )
        .map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": "page_size" }))
        })
    }
}
