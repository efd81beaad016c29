pub mod auth;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use crate::models::{
    AuthResponse, IngredientAmount, IngredientCreateRequest, IngredientInRecipe,
    IngredientResponse, LoginRequest, RecipeBrief, RecipeResponse, RecipeWriteRequest,
    SignupRequest, SubscriptionResponse, TagCreateRequest, TagResponse, UserResponse,
};
use crate::pagination::{PageQuery, PaginatedRecipes, PaginatedSubscriptions, PaginatedUsers};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth endpoints
        auth::signup,
        auth::login,
        // User endpoints
        users::get_users,
        users::me,
        users::get_user,
        users::my_subscriptions,
        users::subscribe,
        users::unsubscribe,
        // Recipe endpoints
        recipes::get_recipes,
        recipes::create_recipe,
        recipes::get_recipe,
        recipes::update_recipe,
        recipes::delete_recipe,
        recipes::favorite_recipe,
        recipes::unfavorite_recipe,
        recipes::add_to_shopping_cart,
        recipes::remove_from_shopping_cart,
        recipes::download_shopping_cart,
        // Reference data endpoints
        tags::get_tags,
        tags::get_tag,
        tags::create_tag,
        tags::delete_tag,
        ingredients::get_ingredients,
        ingredients::get_ingredient,
        ingredients::create_ingredient,
    ),
    components(schemas(
        // Auth schemas
        SignupRequest,
        LoginRequest,
        AuthResponse,
        UserResponse,
        // Recipe schemas
        RecipeWriteRequest,
        RecipeResponse,
        RecipeBrief,
        IngredientAmount,
        IngredientInRecipe,
        SubscriptionResponse,
        // Reference data schemas
        TagResponse,
        TagCreateRequest,
        IngredientResponse,
        IngredientCreateRequest,
        // Listing schemas
        PaginatedUsers,
        PaginatedRecipes,
        PaginatedSubscriptions,
        PageQuery,
        users::SubscriptionQuery,
        recipes::RecipeListQuery,
        ingredients::IngredientListQuery,
    )),
    tags(
        (name = "auth", description = "Signup and login"),
        (name = "users", description = "Profiles and subscriptions"),
        (name = "recipes", description = "Recipes, favorites and the shopping cart"),
        (name = "tags", description = "Tag reference data"),
        (name = "ingredients", description = "Ingredient reference data"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

use utoipa::Modify;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
