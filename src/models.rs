use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Tag {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tags)]
pub struct NewTag<'a> {
    pub user_id: i32,
    pub name: &'a str,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Ingredient {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ingredients)]
pub struct NewIngredient<'a> {
    pub user_id: i32,
    pub name: &'a str,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Recipe {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: BigDecimal,
    pub link: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub user_id: i32,
    pub title: &'a str,
    pub time_minutes: i32,
    pub price: &'a BigDecimal,
    pub link: Option<&'a str>,
    pub description: Option<&'a str>,
}

/// Field-level recipe update. `None` leaves the column untouched, so the
/// same changeset serves both full and partial updates.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::recipes)]
pub struct RecipeChangeset<'a> {
    pub title: Option<&'a str>,
    pub time_minutes: Option<i32>,
    pub price: Option<&'a BigDecimal>,
    pub link: Option<&'a str>,
    pub description: Option<&'a str>,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::likes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct Like {
    pub id: i32,
    pub user_id: i32,
    pub recipe_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::likes)]
pub struct NewLike {
    pub user_id: i32,
    pub recipe_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_tags)]
pub struct NewRecipeTag {
    pub recipe_id: i32,
    pub tag_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_ingredients)]
pub struct NewRecipeIngredient {
    pub recipe_id: i32,
    pub ingredient_id: i32,
}
