use crate::api::recipes::repr::IngredientItem;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Ingredient;
use crate::schema::ingredients;
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
pub struct UpdateIngredientRequest {
    pub name: Option<String>,
}

/// Rename one of the caller's ingredients. Serves both PUT and PATCH.
#[utoipa::path(
    put,
    path = "/api/ingredients/{id}",
    tag = "ingredients",
    params(
        ("id" = i32, Path, description = "Ingredient ID")
    ),
    request_body = UpdateIngredientRequest,
    responses(
        (status = 200, description = "Ingredient updated", body = IngredientItem),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_ingredient(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateIngredientRequest>,
) -> impl IntoResponse {
    if let Some(ref name) = request.name {
        if name.trim().is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Ingredient name cannot be empty".to_string(),
                }),
            )
                .into_response();
        }
    }

    let mut conn = get_conn!(pool);

    let result = match request.name {
        Some(name) => diesel::update(
            ingredients::table
                .filter(ingredients::id.eq(id))
                .filter(ingredients::user_id.eq(user.id)),
        )
        .set(ingredients::name.eq(&name))
        .returning(Ingredient::as_returning())
        .get_result(&mut conn)
        .optional(),
        None => ingredients::table
            .filter(ingredients::id.eq(id))
            .filter(ingredients::user_id.eq(user.id))
            .select(Ingredient::as_select())
            .first(&mut conn)
            .optional(),
    };

    match result {
        Ok(Some(ingredient)) => (
            StatusCode::OK,
            Json(IngredientItem {
                id: ingredient.id,
                name: ingredient.name,
            }),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Ingredient not found".to_string(),
            }),
        )
            .into_response(),
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "An ingredient with this name already exists".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to update ingredient: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update ingredient".to_string(),
                }),
            )
                .into_response()
        }
    }
}
