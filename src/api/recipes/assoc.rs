//! Resolution of nested tag/ingredient payloads into rows, kept separate
//! from request parsing so create and update can invoke it explicitly.

use crate::models::{
    Ingredient, NewIngredient, NewRecipeIngredient, NewRecipeTag, NewTag, Tag,
};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, tags};
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::ToSchema;

/// Nested attribute object on recipe writes.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttrInput {
    pub name: String,
}

/// Reject attribute payloads with blank names before touching the database.
pub fn validate_attr_names(attrs: &[AttrInput], field: &str) -> Result<(), String> {
    if attrs.iter().any(|attr| attr.name.trim().is_empty()) {
        Err(format!("{} names cannot be empty", field))
    } else {
        Ok(())
    }
}

/// Resolve each name against the acting user's tag pool, creating what is
/// missing. The upsert keeps a concurrent creator from failing the request.
pub fn get_or_create_tags(
    conn: &mut PgConnection,
    user_id: i32,
    attrs: &[AttrInput],
) -> QueryResult<Vec<Tag>> {
    let mut resolved = Vec::with_capacity(attrs.len());

    for attr in attrs {
        let existing = tags::table
            .filter(tags::user_id.eq(user_id))
            .filter(tags::name.eq(&attr.name))
            .select(Tag::as_select())
            .first(conn)
            .optional()?;

        let tag = match existing {
            Some(tag) => tag,
            None => diesel::insert_into(tags::table)
                .values(&NewTag {
                    user_id,
                    name: &attr.name,
                })
                .on_conflict((tags::user_id, tags::name))
                .do_update()
                .set(tags::name.eq(&attr.name))
                .returning(Tag::as_returning())
                .get_result(conn)?,
        };

        resolved.push(tag);
    }

    Ok(resolved)
}

pub fn get_or_create_ingredients(
    conn: &mut PgConnection,
    user_id: i32,
    attrs: &[AttrInput],
) -> QueryResult<Vec<Ingredient>> {
    let mut resolved = Vec::with_capacity(attrs.len());

    for attr in attrs {
        let existing = ingredients::table
            .filter(ingredients::user_id.eq(user_id))
            .filter(ingredients::name.eq(&attr.name))
            .select(Ingredient::as_select())
            .first(conn)
            .optional()?;

        let ingredient = match existing {
            Some(ingredient) => ingredient,
            None => diesel::insert_into(ingredients::table)
                .values(&NewIngredient {
                    user_id,
                    name: &attr.name,
                })
                .on_conflict((ingredients::user_id, ingredients::name))
                .do_update()
                .set(ingredients::name.eq(&attr.name))
                .returning(Ingredient::as_returning())
                .get_result(conn)?,
        };

        resolved.push(ingredient);
    }

    Ok(resolved)
}

/// Clear a recipe's tag associations and rebuild them from the resolved
/// rows. Callers pass the full desired set; an empty slice just clears.
pub fn replace_tags(conn: &mut PgConnection, recipe_id: i32, tags_for_recipe: &[Tag]) -> QueryResult<()> {
    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
        .execute(conn)?;

    let rows: Vec<NewRecipeTag> = tags_for_recipe
        .iter()
        .map(|tag| NewRecipeTag {
            recipe_id,
            tag_id: tag.id,
        })
        .collect();

    if !rows.is_empty() {
        diesel::insert_into(recipe_tags::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(conn)?;
    }

    Ok(())
}

pub fn replace_ingredients(
    conn: &mut PgConnection,
    recipe_id: i32,
    ingredients_for_recipe: &[Ingredient],
) -> QueryResult<()> {
    diesel::delete(
        recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
    )
    .execute(conn)?;

    let rows: Vec<NewRecipeIngredient> = ingredients_for_recipe
        .iter()
        .map(|ingredient| NewRecipeIngredient {
            recipe_id,
            ingredient_id: ingredient.id,
        })
        .collect();

    if !rows.is_empty() {
        diesel::insert_into(recipe_ingredients::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(conn)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_attr_names_are_rejected() {
        let attrs = vec![
            AttrInput {
                name: "Dinner".to_string(),
            },
            AttrInput {
                name: "   ".to_string(),
            },
        ];
        assert!(validate_attr_names(&attrs, "Tag").is_err());
    }

    #[test]
    fn empty_attr_list_is_valid() {
        assert!(validate_attr_names(&[], "Tag").is_ok());
    }
}
