use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::RecipeBrief;

/// Read-shape for one followed author: profile fields, the author's recipe
/// count, and their newest recipes as brief representations (optionally
/// truncated by the `recipes_limit` query parameter).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeBrief>,
    pub recipes_count: i64,
}
