//! Users API handlers.
//!
//! ```text
//! GET    /api/v1/users?page=0&page_size=10
//! POST   /api/v1/users {"name":"A","student_id":"S1","phone":"123"}
//! GET    /api/v1/users/{student_id}
//! PUT    /api/v1/users/{student_id} {"email":null}
//! DELETE /api/v1/users/{student_id}
//! ```
//!
//! Only batch reads are exposed; batch creation stays a service-level use
//! case.

use actix_web::{delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::user::{Email, NewUser, Phone, StudentId, User, UserChanges, UserName};
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::error::{ApiError, ApiResult};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{PageQuery, double_option, invalid_field};

/// User as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserBody {
    #[schema(example = 1)]
    pub uid: i32,
    #[schema(example = "Ada")]
    pub name: String,
    #[schema(example = "S1")]
    pub student_id: String,
    #[schema(example = "ada@example.edu")]
    pub email: Option<String>,
    #[schema(example = "123")]
    pub phone: String,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        Self {
            uid: user.uid.get(),
            name: user.name.into(),
            student_id: user.student_id.into(),
            email: user.email.map(String::from),
            phone: user.phone.into(),
        }
    }
}

/// One page of users.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserPageBody {
    /// Number of users in storage.
    pub total: u64,
    /// Number of users in this page.
    pub count: usize,
    pub users: Vec<UserBody>,
}

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub student_id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub phone: String,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = Error;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        NewUser::try_from_strings(value.name, value.student_id, value.email, value.phone)
            .map_err(invalid_field)
    }
}

/// Request body for `PUT /api/v1/users/{student_id}`.
///
/// Omitted fields are left untouched; `"email": null` clears the address.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl TryFrom<UpdateUserRequest> for UserChanges {
    type Error = Error;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name.map(UserName::new).transpose().map_err(invalid_field)?,
            email: value
                .email
                .map(|email| email.map(Email::new).transpose())
                .transpose()
                .map_err(invalid_field)?,
            phone: value.phone.map(Phone::new).transpose().map_err(invalid_field)?,
        })
    }
}

pub(crate) fn parse_student_id(raw: String) -> Result<StudentId, Error> {
    StudentId::new(raw).map_err(invalid_field)
}

/// List users one page at a time, ordered by `uid`.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(PageQuery),
    responses(
        (status = 200, description = "Users page", body = Envelope<UserPageBody>),
        (status = 500, description = "Failure; data is an empty array", body = Envelope<UserPageBody>)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Envelope<UserPageBody>>> {
    let request = query
        .into_inner()
        .into_request(state.page_limits)
        .map_err(ApiError::list)?;
    let page = state.users.list_users(request).await.map_err(ApiError::list)?;
    let total = page.total();
    let users: Vec<UserBody> = page.into_items().into_iter().map(UserBody::from).collect();
    Ok(web::Json(Envelope::ok(UserPageBody {
        total,
        count: users.len(),
        users,
    })))
}

/// Look up a user by student id. `data` is `null` when no user matches.
#[utoipa::path(
    get,
    path = "/api/v1/users/{student_id}",
    params(("student_id" = String, Path, description = "Student identifier")),
    responses(
        (status = 200, description = "User or null", body = Envelope<UserBody>),
        (status = 500, description = "Failure", body = Envelope<UserBody>)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{student_id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<UserBody>>> {
    let student_id = parse_student_id(path.into_inner())?;
    let user = state.users.get_user_by_student_id(&student_id).await?;
    Ok(web::Json(Envelope::found(user.map(UserBody::from))))
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Created user", body = Envelope<UserBody>),
        (status = 500, description = "Validation failure or duplicate student id", body = Envelope<UserBody>)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<web::Json<Envelope<UserBody>>> {
    let user = NewUser::try_from(payload.into_inner())?;
    let created = state.users_command.create_user(user).await?;
    Ok(web::Json(Envelope::ok(UserBody::from(created))))
}

/// Apply a partial update.
///
/// An unknown student id is not a failure: the envelope carries `null` data
/// and a message naming the missing user.
#[utoipa::path(
    put,
    path = "/api/v1/users/{student_id}",
    params(("student_id" = String, Path, description = "Student identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user, or null when absent", body = Envelope<UserBody>),
        (status = 500, description = "Failure", body = Envelope<UserBody>)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{student_id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<Envelope<UserBody>>> {
    let student_id = parse_student_id(path.into_inner())?;
    let changes = UserChanges::try_from(payload.into_inner())?;
    match state.users_command.update_user(&student_id, changes).await {
        Ok(user) => Ok(web::Json(Envelope::ok(UserBody::from(user)))),
        Err(err) if err.code() == ErrorCode::NotFound => {
            Ok(web::Json(Envelope::empty_with_msg(err.message())))
        }
        Err(err) => Err(err.into()),
    }
}

/// Delete a user and return its last state.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{student_id}",
    params(("student_id" = String, Path, description = "Student identifier")),
    responses(
        (status = 200, description = "Deleted user", body = Envelope<UserBody>),
        (status = 500, description = "Unknown student id or failure", body = Envelope<UserBody>)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{student_id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<UserBody>>> {
    let student_id = parse_student_id(path.into_inner())?;
    let deleted = state.users_command.delete_user(&student_id).await?;
    Ok(web::Json(Envelope::ok(UserBody::from(deleted))))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
