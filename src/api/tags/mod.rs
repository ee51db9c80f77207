pub mod delete;
pub mod list;
pub mod update;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/tags endpoints (mounted at /api/tags).
/// There is no create route: tags come into being through recipe writes.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list::list_tags)).route(
        "/{id}",
        axum::routing::put(update::update_tag)
            .patch(update::update_tag)
            .delete(delete::delete_tag),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_tags, update::update_tag, delete::delete_tag),
    components(schemas(list::TagsListResponse, update::UpdateTagRequest))
)]
pub struct ApiDoc;
