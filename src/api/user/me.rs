use crate::api::recipes::repr::UserSummary;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = users)]
struct ProfileChangeset<'a> {
    email: Option<&'a str>,
    name: Option<&'a str>,
}

#[utoipa::path(
    get,
    path = "/api/user/me",
    tag = "user",
    responses(
        (status = 200, description = "The caller's profile", body = UserSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_profile(AuthUser(user): AuthUser) -> impl IntoResponse {
    (StatusCode::OK, Json(UserSummary::from(user))).into_response()
}

/// Update the caller's email and/or name. Serves both PUT and PATCH;
/// absent fields are left untouched.
#[utoipa::path(
    put,
    path = "/api/user/me",
    tag = "user",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserSummary),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_profile(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<UpdateProfileRequest>,
) -> impl IntoResponse {
    if matches!(request.email.as_deref(), Some(email) if email.trim().is_empty()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Email cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    if matches!(request.name.as_deref(), Some(name) if name.trim().is_empty()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Name cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    if request.email.is_none() && request.name.is_none() {
        return (StatusCode::OK, Json(UserSummary::from(user))).into_response();
    }

    let mut conn = get_conn!(pool);

    let updated: User = match diesel::update(users::table.find(user.id))
        .set(&ProfileChangeset {
            email: request.email.as_deref(),
            name: request.name.as_deref(),
        })
        .returning(User::as_returning())
        .get_result(&mut conn)
    {
        Ok(u) => u,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: "Email already in use".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to update profile: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update profile".to_string(),
                }),
            )
                .into_response();
        }
    };

    (StatusCode::OK, Json(UserSummary::from(updated))).into_response()
}
