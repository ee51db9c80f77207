use crate::api::recipes::repr::RequestBase;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::media::{self, MediaError, MediaStore};
use crate::get_conn;
use crate::schema::recipes;
use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadImageResponse {
    pub id: i32,
    /// Absolute URL when the request supplied a host
    pub image: Option<String>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadImageRequest {
    /// Image file contents
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
    /// URL to fetch the image from instead of a direct upload
    pub image_url: Option<String>,
}

/// Attach an image to a recipe, either from a direct file part or by
/// fetching an `image_url` inline. The fetch has no retry; a failing host
/// fails the request.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/upload-image",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body(content_type = "multipart/form-data", content = UploadImageRequest),
    responses(
        (status = 200, description = "Image stored", body = UploadImageResponse),
        (status = 400, description = "Neither image nor image_url provided", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 502, description = "Image host returned an error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_image(
    AuthUser(_user): AuthUser,
    State(pool): State<Arc<crate::db::DbPool>>,
    State(store): State<Arc<MediaStore>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut image_url: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Multipart read error: {}", e);
                return (
                    e.status(),
                    Json(ErrorResponse {
                        error: format!("Failed to read multipart data: {}", e.body_text()),
                    }),
                )
                    .into_response();
            }
        };

        match field.name() {
            Some("image") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload".to_string());
                let data = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!("Field read error: {}", e);
                        return (
                            e.status(),
                            Json(ErrorResponse {
                                error: format!("Failed to read file data: {}", e.body_text()),
                            }),
                        )
                            .into_response();
                    }
                };
                file = Some((filename, data.to_vec()));
            }
            Some("image_url") => {
                image_url = match field.text().await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        tracing::warn!("Field read error: {}", e);
                        return (
                            e.status(),
                            Json(ErrorResponse {
                                error: format!("Failed to read image_url: {}", e.body_text()),
                            }),
                        )
                            .into_response();
                    }
                };
            }
            _ => {}
        }
    }

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
                    error: "Failed to upload image".to_string(),
                }),
            )
                .into_response();
        }
    }

    let (filename, bytes) = if let Some(file) = file {
        file
    } else if let Some(url) = image_url {
        match media::fetch_image(&url).await {
            Ok(fetched) => fetched,
            Err(MediaError::UpstreamStatus(code)) => {
                return (
                    StatusCode::BAD_GATEWAY,
                    Json(ErrorResponse {
                        error: format!("Image host returned status {}", code),
                    }),
                )
                    .into_response()
            }
            Err(e) => {
                tracing::error!("Image fetch failed: {}", e);
                return (
                    StatusCode::BAD_GATEWAY,
                    Json(ErrorResponse {
                        error: format!("Failed to fetch image: {}", e),
                    }),
                )
                    .into_response();
            }
        }
    } else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Either image or image_url must be provided".to_string(),
            }),
        )
            .into_response();
    };

    let relative = match store.save_recipe_image(&filename, &bytes) {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("Failed to store image: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to store image".to_string(),
                }),
            )
                .into_response();
        }
    };

    if let Err(e) = diesel::update(recipes::table.find(id))
        .set(recipes::image.eq(&relative))
        .execute(&mut conn)
    {
        tracing::error!("Failed to save image path: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to upload image".to_string(),
            }),
        )
            .into_response();
    }

    let base = RequestBase::from_headers(&headers);
    let image = match base {
        Some(base) => Some(base.absolute_media_url(&relative)),
        None => Some(relative),
    };

    (StatusCode::OK, Json(UploadImageResponse { id, image })).into_response()
}
