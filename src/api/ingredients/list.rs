use crate::api::attrs::{parse_assigned_only, ListAttrsParams};
use crate::api::recipes::repr::IngredientItem;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Ingredient;
use crate::schema::ingredients;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientsListResponse {
    pub ingredients: Vec<IngredientItem>,
}

/// The caller's ingredients, descending by name. `assigned_only` is
/// accepted but never restricts the result, matching the tag listing.
fn ingredients_query(user_id: i32, _assigned_only: bool) -> ingredients::BoxedQuery<'static, Pg> {
    ingredients::table
        .distinct()
        .into_boxed()
        .filter(ingredients::user_id.eq(user_id))
        .order(ingredients::name.desc())
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "ingredients",
    params(ListAttrsParams),
    responses(
        (status = 200, description = "The caller's ingredients, descending by name", body = IngredientsListResponse),
        (status = 400, description = "Invalid assigned_only value", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_ingredients(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListAttrsParams>,
) -> impl IntoResponse {
    let assigned_only = match parse_assigned_only(params.assigned_only.as_deref()) {
        Ok(flag) => flag,
        Err(error) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
        }
    };

    let mut conn = get_conn!(pool);

    let rows: Vec<Ingredient> = match ingredients_query(user.id, assigned_only).load(&mut conn) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch ingredients: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch ingredients".to_string(),
                }),
            )
                .into_response();
        }
    };

    let ingredients = rows
        .into_iter()
        .map(|ingredient| IngredientItem {
            id: ingredient.id,
            name: ingredient.name,
        })
        .collect();

    (StatusCode::OK, Json(IngredientsListResponse { ingredients })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;

    #[test]
    fn assigned_only_does_not_change_the_query() {
        let with = debug_query::<Pg, _>(&ingredients_query(7, true)).to_string();
        let without = debug_query::<Pg, _>(&ingredients_query(7, false)).to_string();
        assert_eq!(with, without);
    }

    #[test]
    fn ingredients_are_scoped_to_the_user_and_name_descending() {
        let sql = debug_query::<Pg, _>(&ingredients_query(7, false)).to_string();
        assert!(sql.contains("\"ingredients\".\"user_id\" ="));
        assert!(sql.contains("ORDER BY \"ingredients\".\"name\" DESC"));
    }
}
