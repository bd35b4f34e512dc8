//! User (student) data model.
//!
//! A user is identified externally by its [`StudentId`] and internally by
//! the storage-assigned [`UserId`]. Transfer objects in this module never hold
//! storage handles; every read yields a detached copy.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::text::{ValidationError, bounded_text, validate_text, TextRules};

/// Storage-assigned surrogate identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bounded_text! {
    /// Business key for a user. Unique across all users.
    StudentId { field: "student_id", max: 20, compact: true }
}

bounded_text! {
    /// Display name of a user.
    UserName { field: "name", max: 100, compact: false }
}

bounded_text! {
    /// Contact phone number. Stored verbatim.
    Phone { field: "phone", max: 50, compact: false }
}

/// Contact email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

/// Maximum allowed length for an email address.
pub const EMAIL_MAX: usize = 50;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

impl Email {
    /// Validate and construct an [`Email`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = validate_text(
            value.into(),
            TextRules {
                field: "email",
                max: EMAIL_MAX,
                compact: true,
            },
        )?;
        if !email_regex().is_match(&value) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                expected: "email address",
            });
        }
        Ok(Self(value))
    }

    /// Borrow the address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Persisted user as returned by repositories and services.
///
/// # Examples
/// ```
/// use bookhub::domain::user::{Phone, StudentId, User, UserId, UserName};
///
/// let user = User {
///     uid: UserId::new(1),
///     name: UserName::new("A").expect("name"),
///     student_id: StudentId::new("S1").expect("student id"),
///     email: None,
///     phone: Phone::new("123").expect("phone"),
/// };
/// assert_eq!(user.student_id.as_str(), "S1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: UserId,
    pub name: UserName,
    pub student_id: StudentId,
    pub email: Option<Email>,
    pub phone: Phone,
}

impl User {
    /// Rebuild a user from raw stored columns, revalidating every field.
    pub fn try_from_parts(
        uid: i32,
        name: String,
        student_id: String,
        email: Option<String>,
        phone: String,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            uid: UserId::new(uid),
            name: UserName::new(name)?,
            student_id: StudentId::new(student_id)?,
            email: email.map(Email::new).transpose()?,
            phone: Phone::new(phone)?,
        })
    }
}

/// Validated input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: UserName,
    pub student_id: StudentId,
    pub email: Option<Email>,
    pub phone: Phone,
}

impl NewUser {
    /// Validate raw input into a [`NewUser`].
    ///
    /// # Examples
    /// ```
    /// use bookhub::domain::user::NewUser;
    ///
    /// let user = NewUser::try_from_strings("A", "S1", None, "123").expect("valid");
    /// assert!(user.email.is_none());
    /// assert!(NewUser::try_from_strings("A", "S 1", None, "123").is_err());
    /// ```
    pub fn try_from_strings(
        name: impl Into<String>,
        student_id: impl Into<String>,
        email: Option<String>,
        phone: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: UserName::new(name)?,
            student_id: StudentId::new(student_id)?,
            email: email.map(Email::new).transpose()?,
            phone: Phone::new(phone)?,
        })
    }
}

/// Partial update for a user.
///
/// `None` leaves a field untouched. For the nullable `email`, `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<UserName>,
    pub email: Option<Option<Email>>,
    pub phone: Option<Phone>,
}

impl UserChanges {
    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }

    /// Apply the supplied fields to `user`, leaving the rest untouched.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone = phone.clone();
        }
    }
}
