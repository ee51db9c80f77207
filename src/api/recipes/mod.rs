pub mod all_recipes;
pub mod assoc;
pub mod create;
pub mod delete;
pub mod get;
pub mod like;
pub mod liked_recipes;
pub mod list;
pub mod params;
pub mod query;
pub mod repr;
pub mod update;
pub mod upload_image;
pub mod user_recipes;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route("/user-recipes", get(user_recipes::user_recipes))
        .route("/liked-recipes", get(liked_recipes::liked_recipes))
        .route("/all-recipes", get(all_recipes::all_recipes))
        .route(
            "/{id}",
            get(get::get_recipe)
                .put(update::update_recipe)
                .patch(update::patch_recipe)
                .delete(delete::delete_recipe),
        )
        .route("/{id}/like-recipe", post(like::like_recipe))
        .route("/{id}/upload-image", post(upload_image::upload_image))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        create::create_recipe,
        get::get_recipe,
        update::update_recipe,
        update::patch_recipe,
        delete::delete_recipe,
        user_recipes::user_recipes,
        liked_recipes::liked_recipes,
        all_recipes::all_recipes,
        like::like_recipe,
        upload_image::upload_image,
    ),
    components(schemas(
        list::ListRecipesResponse,
        create::CreateRecipeRequest,
        update::UpdateRecipeRequest,
        update::PatchRecipeRequest,
        like::LikeStatusResponse,
        upload_image::UploadImageRequest,
        upload_image::UploadImageResponse,
        assoc::AttrInput,
        repr::RecipeSummary,
        repr::RecipeDetail,
        repr::TagItem,
        repr::IngredientItem,
        repr::UserSummary,
    ))
)]
pub struct ApiDoc;
