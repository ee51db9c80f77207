use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::NewLike;
use crate::schema::{likes, recipes};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LikeStatusResponse {
    /// "liked" or "unliked"
    pub status: String,
}

/// Toggle the caller's like edge for a recipe. Deleting matches all edges
/// for the pair, so duplicates left by racing toggles converge here.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/like-recipe",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Existing like removed", body = LikeStatusResponse),
        (status = 201, description = "Like created", body = LikeStatusResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn like_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    match recipes::table.find(id).select(recipes::id).first::<i32>(&mut conn) {
        Ok(_) => {}
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
                    error: "Failed to toggle like".to_string(),
                }),
            )
                .into_response();
        }
    }

    let existing: i64 = match likes::table
        .filter(likes::user_id.eq(user.id))
        .filter(likes::recipe_id.eq(id))
        .count()
        .get_result(&mut conn)
    {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to check like state: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to toggle like".to_string(),
                }),
            )
                .into_response();
        }
    };

    if existing > 0 {
        match diesel::delete(
            likes::table
                .filter(likes::user_id.eq(user.id))
                .filter(likes::recipe_id.eq(id)),
        )
        .execute(&mut conn)
        {
            Ok(_) => (
                StatusCode::OK,
                Json(LikeStatusResponse {
                    status: "unliked".to_string(),
                }),
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Failed to remove like: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to toggle like".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    } else {
        match diesel::insert_into(likes::table)
            .values(&NewLike {
                user_id: user.id,
                recipe_id: id,
            })
            .execute(&mut conn)
        {
            Ok(_) => (
                StatusCode::CREATED,
                Json(LikeStatusResponse {
                    status: "liked".to_string(),
                }),
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Failed to create like: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to toggle like".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
