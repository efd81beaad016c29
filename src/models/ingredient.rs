use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::ingredient;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
    #[schema(example = "g")]
    pub measurement_unit: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(model: ingredient::Model) -> Self {
        IngredientResponse {
            id: model.id,
            name: model.name,
            measurement_unit: model.measurement_unit,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IngredientCreateRequest {
    pub name: String,
    pub measurement_unit: String,
}
