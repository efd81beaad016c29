use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::recipe;
use crate::models::{TagResponse, UserResponse};

/// One (ingredient, amount) pair in a write payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientAmount {
    pub id: i64,
    #[schema(example = 200)]
    pub amount: i32,
}

/// Write-shape shared by create and update. The author comes from the
/// bearer token, never from the payload; responses are re-rendered through
/// the read-shape after the write.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecipeWriteRequest {
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i64>,
    /// Opaque image payload, stored and echoed back verbatim.
    pub image: String,
    pub name: String,
    pub text: String,
    #[schema(example = 30)]
    pub cooking_time: i32,
}

/// Ingredient line inside a recipe read-shape: reference data plus the
/// amount recorded for this specific recipe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientInRecipe {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full read-shape. The three derived booleans are viewer-relative and
/// always false for anonymous requests.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i64,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<IngredientInRecipe>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Brief representation used inside favorite/cart responses and
/// subscription listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeBrief {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<recipe::Model> for RecipeBrief {
    fn from(model: recipe::Model) -> Self {
        RecipeBrief {
            id: model.id,
            name: model.name,
            image: model.image,
            cooking_time: model.cooking_time,
        }
    }
}
