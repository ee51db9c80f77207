//! Wire representations for recipes and the batched loading that fills
//! them in (owner, tags, ingredients, absolute image URL).

use crate::models::{Ingredient, Recipe, Tag, User};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, tags, users};
use axum::http::{header, HeaderMap};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub email: String,
    pub name: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagItem {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientItem {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    /// Decimal string, e.g. "12.50"
    #[schema(value_type = String)]
    pub price: BigDecimal,
    pub link: Option<String>,
    pub tags: Vec<TagItem>,
    pub ingredients: Vec<IngredientItem>,
    /// Absolute URL when the request supplied a host, stored path otherwise
    pub image: Option<String>,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeDetail {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    #[schema(value_type = String)]
    pub price: BigDecimal,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<TagItem>,
    pub ingredients: Vec<IngredientItem>,
    pub image: Option<String>,
    pub user: UserSummary,
}

/// Host and scheme of the originating request, for rewriting stored image
/// paths into absolute URLs.
#[derive(Debug, Clone)]
pub struct RequestBase {
    pub host: String,
    pub secure: bool,
}

impl RequestBase {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let host = headers.get(header::HOST)?.to_str().ok()?.to_string();
        let secure = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .map(|proto| proto.eq_ignore_ascii_case("https"))
            .unwrap_or(false);

        Some(Self { host, secure })
    }

    /// Secure requests always get an https URL, whatever scheme the stored
    /// path would otherwise have produced.
    pub fn absolute_media_url(&self, path: &str) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}/media/{}", scheme, self.host, path)
    }
}

fn image_url(base: Option<&RequestBase>, image: Option<String>) -> Option<String> {
    image.map(|path| match base {
        Some(base) => base.absolute_media_url(&path),
        None => path,
    })
}

/// Load everything needed to render the given recipe rows as summaries.
/// Attributes and owners are fetched in three batched queries rather than
/// per-recipe.
pub fn summarize(
    conn: &mut PgConnection,
    rows: Vec<Recipe>,
    base: Option<&RequestBase>,
) -> QueryResult<Vec<RecipeSummary>> {
    let recipe_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let mut user_ids: Vec<i32> = rows.iter().map(|r| r.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let users_by_id: HashMap<i32, User> = users::table
        .filter(users::id.eq_any(&user_ids))
        .select(User::as_select())
        .load::<User>(conn)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut tags_by_recipe: HashMap<i32, Vec<TagItem>> = HashMap::new();
    let tag_rows: Vec<(i32, Tag)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .select((recipe_tags::recipe_id, Tag::as_select()))
        .order(tags::id.asc())
        .load(conn)?;
    for (recipe_id, tag) in tag_rows {
        tags_by_recipe.entry(recipe_id).or_default().push(TagItem {
            id: tag.id,
            name: tag.name,
        });
    }

    let mut ingredients_by_recipe: HashMap<i32, Vec<IngredientItem>> = HashMap::new();
    let ingredient_rows: Vec<(i32, Ingredient)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .select((recipe_ingredients::recipe_id, Ingredient::as_select()))
        .order(ingredients::id.asc())
        .load(conn)?;
    for (recipe_id, ingredient) in ingredient_rows {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(IngredientItem {
                id: ingredient.id,
                name: ingredient.name,
            });
    }

    rows.into_iter()
        .map(|recipe| {
            let user = users_by_id
                .get(&recipe.user_id)
                .cloned()
                .ok_or(diesel::result::Error::NotFound)?;

            Ok(RecipeSummary {
                id: recipe.id,
                title: recipe.title,
                time_minutes: recipe.time_minutes,
                price: recipe.price,
                link: recipe.link,
                tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                ingredients: ingredients_by_recipe
                    .remove(&recipe.id)
                    .unwrap_or_default(),
                image: image_url(base, recipe.image),
                user: UserSummary::from(user),
            })
        })
        .collect()
}

/// Render a single recipe with its description.
pub fn detail(
    conn: &mut PgConnection,
    recipe: Recipe,
    base: Option<&RequestBase>,
) -> QueryResult<RecipeDetail> {
    let description = recipe.description.clone();
    let mut summaries = summarize(conn, vec![recipe], base)?;
    let summary = summaries.pop().ok_or(diesel::result::Error::NotFound)?;

    Ok(RecipeDetail {
        id: summary.id,
        title: summary.title,
        time_minutes: summary.time_minutes,
        price: summary.price,
        link: summary.link,
        description,
        tags: summary.tags,
        ingredients: summary.ingredients,
        image: summary.image,
        user: summary.user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(secure: bool) -> RequestBase {
        RequestBase {
            host: "api.example.com".to_string(),
            secure,
        }
    }

    #[test]
    fn insecure_request_builds_http_url() {
        assert_eq!(
            base(false).absolute_media_url("recipes/a.jpg"),
            "http://api.example.com/media/recipes/a.jpg"
        );
    }

    #[test]
    fn secure_request_forces_https() {
        assert_eq!(
            base(true).absolute_media_url("recipes/a.jpg"),
            "https://api.example.com/media/recipes/a.jpg"
        );
    }

    #[test]
    fn missing_base_leaves_stored_path() {
        assert_eq!(
            image_url(None, Some("recipes/a.jpg".to_string())),
            Some("recipes/a.jpg".to_string())
        );
        assert_eq!(image_url(Some(&base(true)), None), None);
    }

    #[test]
    fn request_base_reads_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "api.example.com".parse().unwrap());
        headers.insert("x-forwarded-proto", "HTTPS".parse().unwrap());

        let parsed = RequestBase::from_headers(&headers).unwrap();
        assert_eq!(parsed.host, "api.example.com");
        assert!(parsed.secure);
    }

    #[test]
    fn request_base_requires_host() {
        assert!(RequestBase::from_headers(&HeaderMap::new()).is_none());
    }
}
