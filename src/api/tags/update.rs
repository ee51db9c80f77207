use crate::api::recipes::repr::TagItem;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Tag;
use crate::schema::tags;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
}

/// Rename one of the caller's tags. Serves both PUT and PATCH; a tag has a
/// single mutable field.
#[utoipa::path(
    put,
    path = "/api/tags/{id}",
    tag = "tags",
    params(
        ("id" = i32, Path, description = "Tag ID")
    ),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "Tag updated", body = TagItem),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_tag(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateTagRequest>,
) -> impl IntoResponse {
    if let Some(ref name) = request.name {
        if name.trim().is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Tag name cannot be empty".to_string(),
                }),
            )
                .into_response();
        }
    }

    let mut conn = get_conn!(pool);

    let result = match request.name {
        Some(name) => diesel::update(
            tags::table
                .filter(tags::id.eq(id))
                .filter(tags::user_id.eq(user.id)),
        )
        .set(tags::name.eq(&name))
        .returning(Tag::as_returning())
        .get_result(&mut conn)
        .optional(),
        None => tags::table
            .filter(tags::id.eq(id))
            .filter(tags::user_id.eq(user.id))
            .select(Tag::as_select())
            .first(&mut conn)
            .optional(),
    };

    match result {
        Ok(Some(tag)) => (
            StatusCode::OK,
            Json(TagItem {
                id: tag.id,
                name: tag.name,
            }),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Tag not found".to_string(),
            }),
        )
            .into_response(),
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "A tag with this name already exists".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to update tag: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update tag".to_string(),
                }),
            )
                .into_response()
        }
    }
}
