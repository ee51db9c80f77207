use crate::api::recipes::assoc::{self, AttrInput};
use crate::api::recipes::repr::{self, RecipeDetail, RequestBase};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewRecipe, Recipe};
use crate::schema::recipes;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    /// Decimal string or number, e.g. "12.50"
    #[schema(value_type = String)]
    pub price: BigDecimal,
    pub link: Option<String>,
    pub description: Option<String>,
    /// Nested objects resolved against the caller's tag pool (get-or-create)
    pub tags: Option<Vec<AttrInput>>,
    pub ingredients: Option<Vec<AttrInput>>,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = RecipeDetail),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    headers: HeaderMap,
    Json(request): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    if request.title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Title cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    if request.time_minutes < 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "time_minutes cannot be negative".to_string(),
            }),
        )
            .into_response();
    }

    if request.price < BigDecimal::from(0) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "price cannot be negative".to_string(),
            }),
        )
            .into_response();
    }

    let tag_inputs = request.tags.as_deref().unwrap_or_default();
    let ingredient_inputs = request.ingredients.as_deref().unwrap_or_default();

    if let Err(error) = assoc::validate_attr_names(tag_inputs, "Tag")
        .and_then(|_| assoc::validate_attr_names(ingredient_inputs, "Ingredient"))
    {
        return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response();
    }

    let mut conn = get_conn!(pool);

    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(&NewRecipe {
                user_id: user.id,
                title: &request.title,
                time_minutes: request.time_minutes,
                price: &request.price,
                link: request.link.as_deref(),
                description: request.description.as_deref(),
            })
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        let tags = assoc::get_or_create_tags(conn, user.id, tag_inputs)?;
        assoc::replace_tags(conn, recipe.id, &tags)?;

        let ingredients = assoc::get_or_create_ingredients(conn, user.id, ingredient_inputs)?;
        assoc::replace_ingredients(conn, recipe.id, &ingredients)?;

        Ok(recipe)
    });

    let recipe = match result {
        Ok(recipe) => recipe,
        Err(e) => {
            tracing::error!("Failed to create recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    let base = RequestBase::from_headers(&headers);
    match repr::detail(&mut conn, recipe, base.as_ref()) {
        Ok(detail) => (StatusCode::CREATED, Json(detail)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render created recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
