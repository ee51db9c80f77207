use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted; like edges cascade"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Recipe belongs to another user", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let owner_id: i32 = match recipes::table
        .find(id)
        .select(recipes::user_id)
        .first(&mut conn)
    {
        Ok(owner_id) => owner_id,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to delete recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    if owner_id != user.id {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Not authorized to modify this recipe".to_string(),
            }),
        )
            .into_response();
    }

    match diesel::delete(recipes::table.find(id)).execute(&mut conn) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!("Failed to delete recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to delete recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
