use crate::api::recipes::list::ListRecipesResponse;
use crate::api::recipes::query;
use crate::api::recipes::repr::{self, RequestBase};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;

/// Discovery listing: every user's recipes, oldest first. Intentionally
/// unscoped.
#[utoipa::path(
    get,
    path = "/api/recipes/all-recipes",
    tag = "recipes",
    responses(
        (status = 200, description = "Every recipe, ascending by id", body = ListRecipesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn all_recipes(
    AuthUser(_user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let rows: Vec<Recipe> = match query::all_recipes().load(&mut conn) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let base = RequestBase::from_headers(&headers);
    let recipes = match repr::summarize(&mut conn, rows, base.as_ref()) {
        Ok(recipes) => recipes,
        Err(e) => {
            tracing::error!("Failed to render recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    (StatusCode::OK, Json(ListRecipesResponse { recipes })).into_response()
}
