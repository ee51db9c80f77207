use crate::api::recipes::list::ListRecipesResponse;
use crate::api::recipes::params::{parse_id_filter, SearchRecipesParams};
use crate::api::recipes::query;
use crate::api::recipes::repr::{self, RequestBase};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/recipes/user-recipes",
    tag = "recipes",
    params(SearchRecipesParams),
    responses(
        (status = 200, description = "The caller's own recipes; id filters match any listed id", body = ListRecipesResponse),
        (status = 400, description = "Malformed filter", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn user_recipes(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<SearchRecipesParams>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let tag_ids = match parse_id_filter(params.tags.as_deref()) {
        Ok(ids) => ids,
        Err(error) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
        }
    };

    let ingredient_ids = match parse_id_filter(params.ingredients.as_deref()) {
        Ok(ids) => ids,
        Err(error) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
        }
    };

    let mut conn = get_conn!(pool);

    let rows: Vec<Recipe> = match query::owned_filtered(
        user.id,
        params.search.as_deref(),
        tag_ids,
        ingredient_ids,
    )
    .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch user recipes: {}", e);
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
