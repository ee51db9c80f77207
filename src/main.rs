mod api;
mod auth;
mod db;
mod media;
mod models;
mod schema;
mod telemetry;

use axum::extract::{FromRef, MatchedPath};
use axum::http::Request;
use axum::middleware;
use axum::Router;
use std::env;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Span;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across all handlers
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: Arc<db::DbPool>,
    pub media: Arc<media::MediaStore>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        let spec = api::openapi().to_pretty_json().unwrap();
        println!("{}", spec);
        return;
    }

    telemetry::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let media_root = env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string());

    let state = AppState {
        pool: Arc::new(db::create_pool(&database_url)),
        media: Arc::new(media::MediaStore::new(media_root)),
    };

    // All routes require a valid bearer token; sessions are minted by the
    // external auth service.
    let protected_router = Router::new()
        .nest("/api/recipes", api::recipes::router())
        .nest("/api/tags", api::tags::router())
        .nest("/api/ingredients", api::ingredients::router())
        .nest("/api/user", api::user::router())
        .layer(middleware::from_fn_with_state(
            state.pool.clone(),
            auth::require_auth,
        ));

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    let app = Router::new()
        .merge(protected_router)
        .merge(swagger_ui)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &Span| {
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                ),
        );

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());
    tracing::info!("Swagger UI available at http://localhost:3000/swagger-ui/");

    axum::serve(listener, app).await.expect("Server error");
}
