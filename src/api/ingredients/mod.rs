pub mod delete;
pub mod list;
pub mod update;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/ingredients endpoints (mounted at
/// /api/ingredients). No create route: ingredients come into being through
/// recipe writes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_ingredients))
        .route(
            "/{id}",
            axum::routing::put(update::update_ingredient)
                .patch(update::update_ingredient)
                .delete(delete::delete_ingredient),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_ingredients,
        update::update_ingredient,
        delete::delete_ingredient
    ),
    components(schemas(
        list::IngredientsListResponse,
        update::UpdateIngredientRequest
    ))
)]
pub struct ApiDoc;
