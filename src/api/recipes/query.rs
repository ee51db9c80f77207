//! Boxed query builders for the recipe listings.
//!
//! Two deliberately different filter semantics live here. The main listing
//! conjoins one subquery per id, so a recipe must carry every listed tag and
//! ingredient. The user-recipes and liked-recipes listings use a single
//! any-of membership test per filter instead.

use crate::api::recipes::params::like_pattern;
use crate::schema::{likes, recipe_ingredients, recipe_tags, recipes};
use diesel::pg::Pg;
use diesel::prelude::*;

pub type BoxedRecipeQuery = recipes::BoxedQuery<'static, Pg>;

/// Main listing: every listed tag id and ingredient id must match.
/// Ordered newest-first by id, duplicates removed.
pub fn filtered(tag_ids: Vec<i32>, ingredient_ids: Vec<i32>) -> BoxedRecipeQuery {
    let mut query = recipes::table.distinct().into_boxed();

    for tag_id in tag_ids {
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .filter(recipe_tags::tag_id.eq(tag_id))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    for ingredient_id in ingredient_ids {
        query = query.filter(
            recipes::id.eq_any(
                recipe_ingredients::table
                    .filter(recipe_ingredients::ingredient_id.eq(ingredient_id))
                    .select(recipe_ingredients::recipe_id),
            ),
        );
    }

    query.order(recipes::id.desc())
}

/// The caller's own recipes, with optional title search and any-of id
/// filters.
pub fn owned_filtered(
    user_id: i32,
    search: Option<&str>,
    tag_ids: Vec<i32>,
    ingredient_ids: Vec<i32>,
) -> BoxedRecipeQuery {
    let query = recipes::table
        .distinct()
        .into_boxed()
        .filter(recipes::user_id.eq(user_id));

    apply_search_filters(query, search, tag_ids, ingredient_ids).order(recipes::id.desc())
}

/// The recipes the caller has liked, with the same search and any-of
/// filters as `owned_filtered`.
pub fn liked_filtered(
    user_id: i32,
    search: Option<&str>,
    tag_ids: Vec<i32>,
    ingredient_ids: Vec<i32>,
) -> BoxedRecipeQuery {
    let liked = likes::table
        .filter(likes::user_id.eq(user_id))
        .select(likes::recipe_id);

    let query = recipes::table
        .distinct()
        .into_boxed()
        .filter(recipes::id.eq_any(liked));

    apply_search_filters(query, search, tag_ids, ingredient_ids).order(recipes::id.desc())
}

/// Every recipe regardless of owner, oldest-first.
pub fn all_recipes() -> BoxedRecipeQuery {
    recipes::table.into_boxed().order(recipes::id.asc())
}

fn apply_search_filters(
    mut query: BoxedRecipeQuery,
    search: Option<&str>,
    tag_ids: Vec<i32>,
    ingredient_ids: Vec<i32>,
) -> BoxedRecipeQuery {
    if let Some(search) = search {
        if !search.is_empty() {
            query = query.filter(recipes::title.ilike(like_pattern(search)));
        }
    }

    if !tag_ids.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .filter(recipe_tags::tag_id.eq_any(tag_ids))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    if !ingredient_ids.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_ingredients::table
                    .filter(recipe_ingredients::ingredient_id.eq_any(ingredient_ids))
                    .select(recipe_ingredients::recipe_id),
            ),
        );
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;

    #[test]
    fn main_listing_conjoins_one_subquery_per_tag_id() {
        let query = filtered(vec![1, 2], vec![]);
        let sql = debug_query::<Pg, _>(&query).to_string();

        // Two ids, two independent membership tests: a recipe must carry both.
        assert_eq!(sql.matches("IN (SELECT").count(), 2);
        assert!(sql.contains("ORDER BY \"recipes\".\"id\" DESC"));
        assert!(sql.contains("SELECT DISTINCT"));
    }

    #[test]
    fn main_listing_conjoins_tags_and_ingredients_independently() {
        let query = filtered(vec![1], vec![2, 3]);
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert_eq!(sql.matches("FROM \"recipe_tags\"").count(), 1);
        assert_eq!(sql.matches("FROM \"recipe_ingredients\"").count(), 2);
    }

    #[test]
    fn owned_listing_matches_any_listed_tag() {
        let query = owned_filtered(7, None, vec![1, 2], vec![]);
        let sql = debug_query::<Pg, _>(&query).to_string();

        // One membership test over the whole id list: any listed tag matches.
        assert_eq!(sql.matches("IN (SELECT").count(), 1);
        assert!(sql.contains("= ANY("));
        assert!(sql.contains("\"recipes\".\"user_id\" ="));
    }

    #[test]
    fn owned_listing_applies_title_search() {
        let query = owned_filtered(7, Some("curry"), vec![], vec![]);
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(sql.contains("ILIKE"));
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = owned_filtered(7, Some(""), vec![], vec![]);
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn liked_listing_restricts_to_liked_recipe_ids() {
        let query = liked_filtered(7, None, vec![], vec![]);
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(sql.contains("\"likes\".\"recipe_id\""));
        assert!(sql.contains("\"likes\".\"user_id\" ="));
    }

    #[test]
    fn all_recipes_has_no_owner_filter_and_ascends() {
        let query = all_recipes();
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(!sql.contains("WHERE"));
        assert!(sql.contains("ORDER BY \"recipes\".\"id\" ASC"));
    }
}
