use crate::api::recipes::assoc::{self, AttrInput};
use crate::api::recipes::repr::{self, RecipeDetail, RequestBase};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{Recipe, RecipeChangeset, User};
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    #[schema(value_type = String)]
    pub price: BigDecimal,
    pub link: Option<String>,
    pub description: Option<String>,
    /// Present (even empty) replaces the associations; absent leaves them
    pub tags: Option<Vec<AttrInput>>,
    pub ingredients: Option<Vec<AttrInput>>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PatchRecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price: Option<BigDecimal>,
    pub link: Option<String>,
    pub description: Option<String>,
    /// Present (even empty) replaces the associations; absent leaves them
    pub tags: Option<Vec<AttrInput>>,
    pub ingredients: Option<Vec<AttrInput>>,
}

#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeDetail),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Recipe belongs to another user", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(request): Json<UpdateRecipeRequest>,
) -> Response {
    let patch = PatchRecipeRequest {
        title: Some(request.title),
        time_minutes: Some(request.time_minutes),
        price: Some(request.price),
        link: request.link,
        description: request.description,
        tags: request.tags,
        ingredients: request.ingredients,
    };

    apply_update(&pool, &user, id, patch, &headers)
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = PatchRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeDetail),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Recipe belongs to another user", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn patch_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(request): Json<PatchRecipeRequest>,
) -> Response {
    apply_update(&pool, &user, id, request, &headers)
}

fn apply_update(
    pool: &Arc<DbPool>,
    user: &User,
    id: i32,
    patch: PatchRecipeRequest,
    headers: &HeaderMap,
) -> Response {
    if let Some(ref title) = patch.title {
        if title.trim().is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Title cannot be empty".to_string(),
                }),
            )
                .into_response();
        }
    }

    if matches!(patch.time_minutes, Some(t) if t < 0) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "time_minutes cannot be negative".to_string(),
            }),
        )
            .into_response();
    }

    if matches!(patch.price.as_ref(), Some(p) if *p < BigDecimal::from(0)) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "price cannot be negative".to_string(),
            }),
        )
            .into_response();
    }

    if let Err(error) = assoc::validate_attr_names(patch.tags.as_deref().unwrap_or_default(), "Tag")
        .and_then(|_| {
            assoc::validate_attr_names(
                patch.ingredients.as_deref().unwrap_or_default(),
                "Ingredient",
            )
        })
    {
        return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response();
    }

    let mut conn = get_conn!(pool);

    let existing: Recipe = match recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(r) => r,
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
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    if existing.user_id != user.id {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Not authorized to modify this recipe".to_string(),
            }),
        )
            .into_response();
    }

    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        let updated: Recipe = diesel::update(recipes::table.find(id))
            .set((
                &RecipeChangeset {
                    title: patch.title.as_deref(),
                    time_minutes: patch.time_minutes,
                    price: patch.price.as_ref(),
                    link: patch.link.as_deref(),
                    description: patch.description.as_deref(),
                },
                recipes::updated_at.eq(diesel::dsl::now),
            ))
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        if let Some(ref tag_inputs) = patch.tags {
            let tags = assoc::get_or_create_tags(conn, user.id, tag_inputs)?;
            assoc::replace_tags(conn, updated.id, &tags)?;
        }

        if let Some(ref ingredient_inputs) = patch.ingredients {
            let ingredients = assoc::get_or_create_ingredients(conn, user.id, ingredient_inputs)?;
            assoc::replace_ingredients(conn, updated.id, &ingredients)?;
        }

        Ok(updated)
    });

    let recipe = match result {
        Ok(recipe) => recipe,
        Err(e) => {
            tracing::error!("Failed to update recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    let base = RequestBase::from_headers(headers);
    match repr::detail(&mut conn, recipe, base.as_ref()) {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render updated recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // An absent tags key leaves associations untouched; a present empty
    // list clears them. The distinction is carried by Option.
    #[test]
    fn absent_tags_key_deserializes_to_none() {
        let patch: PatchRecipeRequest = serde_json::from_value(json!({})).unwrap();
        assert!(patch.tags.is_none());
        assert!(patch.ingredients.is_none());
    }

    #[test]
    fn empty_tags_list_stays_present() {
        let patch: PatchRecipeRequest =
            serde_json::from_value(json!({ "tags": [], "ingredients": [] })).unwrap();
        assert!(matches!(patch.tags.as_deref(), Some([])));
        assert!(matches!(patch.ingredients.as_deref(), Some([])));
    }

    #[test]
    fn nested_attrs_deserialize_by_name() {
        let patch: PatchRecipeRequest =
            serde_json::from_value(json!({ "tags": [{ "name": "Dinner" }] })).unwrap();
        let tags = patch.tags.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "Dinner");
    }

    #[test]
    fn price_accepts_string_and_number() {
        let from_string: PatchRecipeRequest =
            serde_json::from_value(json!({ "price": "12.50" })).unwrap();
        let from_number: PatchRecipeRequest =
            serde_json::from_value(json!({ "price": 12.5 })).unwrap();
        assert!(from_string.price.is_some());
        assert!(from_number.price.is_some());
    }
}
