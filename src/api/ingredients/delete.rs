use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::ingredients;
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
    path = "/api/ingredients/{id}",
    tag = "ingredients",
    params(
        ("id" = i32, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 204, description = "Ingredient deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_ingredient(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let deleted = match diesel::delete(
        ingredients::table
            .filter(ingredients::id.eq(id))
            .filter(ingredients::user_id.eq(user.id)),
    )
    .execute(&mut conn)
    {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to delete ingredient: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to delete ingredient".to_string(),
                }),
            )
                .into_response();
        }
    };

    if deleted == 0 {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Ingredient not found".to_string(),
            }),
        )
            .into_response();
    }

    StatusCode::NO_CONTENT.into_response()
}
