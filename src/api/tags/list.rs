use crate::api::attrs::{parse_assigned_only, ListAttrsParams};
use crate::api::recipes::repr::TagItem;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Tag;
use crate::schema::tags;
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
pub struct TagsListResponse {
    pub tags: Vec<TagItem>,
}

/// The caller's tags, descending by name. `assigned_only` is accepted but
/// never restricts the result; see the query test below.
fn tags_query(user_id: i32, _assigned_only: bool) -> tags::BoxedQuery<'static, Pg> {
    tags::table
        .distinct()
        .into_boxed()
        .filter(tags::user_id.eq(user_id))
        .order(tags::name.desc())
}

#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "tags",
    params(ListAttrsParams),
    responses(
        (status = 200, description = "The caller's tags, descending by name", body = TagsListResponse),
        (status = 400, description = "Invalid assigned_only value", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_tags(
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

    let rows: Vec<Tag> = match tags_query(user.id, assigned_only).load(&mut conn) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch tags: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch tags".to_string(),
                }),
            )
                .into_response();
        }
    };

    let tags = rows
        .into_iter()
        .map(|tag| TagItem {
            id: tag.id,
            name: tag.name,
        })
        .collect();

    (StatusCode::OK, Json(TagsListResponse { tags })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;

    #[test]
    fn assigned_only_does_not_change_the_query() {
        // The parameter is accepted for API compatibility but never
        // restricts the result; the same rows come back either way.
        let with = debug_query::<Pg, _>(&tags_query(7, true)).to_string();
        let without = debug_query::<Pg, _>(&tags_query(7, false)).to_string();
        assert_eq!(with, without);
    }

    #[test]
    fn tags_are_scoped_to_the_user_and_name_descending() {
        let sql = debug_query::<Pg, _>(&tags_query(7, false)).to_string();
        assert!(sql.contains("\"tags\".\"user_id\" ="));
        assert!(sql.contains("ORDER BY \"tags\".\"name\" DESC"));
        assert!(sql.contains("SELECT DISTINCT"));
    }
}
