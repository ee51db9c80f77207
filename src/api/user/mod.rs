pub mod me;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/user endpoints (mounted at /api/user)
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/me",
        get(me::get_profile)
            .put(me::update_profile)
            .patch(me::update_profile),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(me::get_profile, me::update_profile),
    components(schemas(me::UpdateProfileRequest))
)]
pub struct ApiDoc;
