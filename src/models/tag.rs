use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::tag;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    #[schema(example = "#49B64E")]
    pub color: String,
    pub slug: String,
}

impl From<tag::Model> for TagResponse {
    fn from(model: tag::Model) -> Self {
        TagResponse {
            id: model.id,
            name: model.name,
            color: model.color,
            slug: model.slug,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TagCreateRequest {
    pub name: String,
    #[schema(example = "#49B64E")]
    pub color: String,
    pub slug: String,
}
