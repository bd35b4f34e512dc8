//! Bounded text value objects shared by the library entities.
//!
//! Column widths in the relational schema double as validation limits, so a
//! value that passes here always fits its column.

use thiserror::Error;

/// Validation failure for a single input field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value was empty or only whitespace.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    /// The value exceeded the column width.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    /// The value is a key and must not contain whitespace.
    #[error("{field} must not contain whitespace")]
    ContainsWhitespace { field: &'static str },
    /// The value did not match the expected shape.
    #[error("{field} is not a valid {expected}")]
    InvalidFormat {
        field: &'static str,
        expected: &'static str,
    },
    /// A count was below zero.
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
}

impl ValidationError {
    /// Name of the offending field as it appears in request payloads.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::ContainsWhitespace { field }
            | Self::InvalidFormat { field, .. }
            | Self::Negative { field } => field,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TextRules {
    pub(crate) field: &'static str,
    pub(crate) max: usize,
    pub(crate) compact: bool,
}

pub(crate) fn validate_text(value: String, rules: TextRules) -> Result<String, ValidationError> {
    let TextRules {
        field,
        max,
        compact,
    } = rules;
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    if compact && value.chars().any(char::is_whitespace) {
        return Err(ValidationError::ContainsWhitespace { field });
    }
    Ok(value)
}

/// Declare a validated string newtype backed by [`validate_text`].
macro_rules! bounded_text {
    (
        $(#[$meta:meta])*
        $name:ident { field: $field:literal, max: $max:expr, compact: $compact:expr $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Maximum length in characters.
            pub const MAX_LEN: usize = $max;

            /// Validate and wrap the supplied value.
            pub fn new(
                value: impl Into<String>,
            ) -> Result<Self, $crate::domain::text::ValidationError> {
                $crate::domain::text::validate_text(
                    value.into(),
                    $crate::domain::text::TextRules {
                        field: $field,
                        max: $max,
                        compact: $compact,
                    },
                )
                .map(Self)
            }

            /// Borrow the underlying string.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::text::ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

pub(crate) use bounded_text;
