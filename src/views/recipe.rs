use std::collections::HashMap;

use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};

use crate::db::DbPool;
use crate::entities::{
    favorite, ingredient, recipe, recipe_ingredient, recipe_tag, shopping_cart, tag, user,
};
use crate::error::ApiError;
use crate::models::{
    IngredientInRecipe, RecipeBrief, RecipeResponse, SubscriptionResponse, TagResponse,
};
use crate::views::user::{is_subscribed, user_response};

pub async fn is_favorited(
    db: &DbPool,
    viewer: Option<i64>,
    recipe_id: i64,
) -> Result<bool, ApiError> {
    let Some(viewer_id) = viewer else {
        return Ok(false);
    };
    let existing = favorite::Entity::find()
        .filter(
            Condition::all()
                .add(favorite::Column::UserId.eq(viewer_id))
                .add(favorite::Column::RecipeId.eq(recipe_id)),
        )
        .one(db)
        .await?;
    Ok(existing.is_some())
}

pub async fn is_in_shopping_cart(
    db: &DbPool,
    viewer: Option<i64>,
    recipe_id: i64,
) -> Result<bool, ApiError> {
    let Some(viewer_id) = viewer else {
        return Ok(false);
    };
    let existing = shopping_cart::Entity::find()
        .filter(
            Condition::all()
                .add(shopping_cart::Column::UserId.eq(viewer_id))
                .add(shopping_cart::Column::RecipeId.eq(recipe_id)),
        )
        .one(db)
        .await?;
    Ok(existing.is_some())
}

/// Full read-shape for one recipe. Tags come back name-ascending; ingredient
/// lines keep the order they were written in, each joined with its reference
/// row for name and unit.
pub async fn recipe_response(
    db: &DbPool,
    recipe: &recipe::Model,
    viewer: Option<i64>,
) -> Result<RecipeResponse, ApiError> {
    let tag_links = recipe_tag::Entity::find()
        .filter(recipe_tag::Column::RecipeId.eq(recipe.id))
        .all(db)
        .await?;
    let tag_ids: Vec<i64> = tag_links.iter().map(|link| link.tag_id).collect();
    let mut tags: Vec<TagResponse> = tag::Entity::find()
        .filter(tag::Column::Id.is_in(tag_ids))
        .all(db)
        .await?
        .into_iter()
        .map(TagResponse::from)
        .collect();
    tags.sort_by(|a, b| a.name.cmp(&b.name));

    let lines = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe.id))
        .order_by_asc(recipe_ingredient::Column::Id)
        .all(db)
        .await?;
    let ingredient_ids: Vec<i64> = lines.iter().map(|line| line.ingredient_id).collect();
    let by_id: HashMap<i64, ingredient::Model> = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ingredient_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|reference| (reference.id, reference))
        .collect();
    let mut ingredients = Vec::with_capacity(lines.len());
    for line in &lines {
        if let Some(reference) = by_id.get(&line.ingredient_id) {
            ingredients.push(IngredientInRecipe {
                id: reference.id,
                name: reference.name.clone(),
                measurement_unit: reference.measurement_unit.clone(),
                amount: line.amount,
            });
        }
    }

    let author_row = user::Entity::find_by_id(recipe.author_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    let author = user_response(db, &author_row, viewer).await?;

    let is_favorited = is_favorited(db, viewer, recipe.id).await?;
    let is_in_shopping_cart = is_in_shopping_cart(db, viewer, recipe.id).await?;

    Ok(RecipeResponse {
        id: recipe.id,
        tags,
        author,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name.clone(),
        image: recipe.image.clone(),
        text: recipe.text.clone(),
        cooking_time: recipe.cooking_time,
    })
}

/// Read-shape for one followed author: profile fields plus their newest
/// recipes as briefs. `recipes_count` is the total before truncation.
pub async fn subscription_response(
    db: &DbPool,
    author: &user::Model,
    viewer: Option<i64>,
    recipes_limit: Option<u64>,
) -> Result<SubscriptionResponse, ApiError> {
    let recipes = recipe::Entity::find()
        .filter(recipe::Column::AuthorId.eq(author.id))
        .order_by_desc(recipe::Column::CreatedAt)
        .all(db)
        .await?;
    let recipes_count = recipes.len() as i64;
    let mut briefs: Vec<RecipeBrief> = recipes.into_iter().map(RecipeBrief::from).collect();
    if let Some(limit) = recipes_limit {
        briefs.truncate(limit as usize);
    }

    Ok(SubscriptionResponse {
        id: author.id,
        email: author.email.clone(),
        username: author.username.clone(),
        first_name: author.first_name.clone(),
        last_name: author.last_name.clone(),
        is_subscribed: is_subscribed(db, viewer, author.id).await?,
        recipes: briefs,
        recipes_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::subscription;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user_row(id: i64) -> user::Model {
        user::Model {
            id,
            email: format!("user{}@example.com", id),
            username: format!("user{}", id),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: "hash".to_string(),
            is_staff: false,
            created_at: Utc::now(),
        }
    }

    fn recipe_row(id: i64, author_id: i64, name: &str) -> recipe::Model {
        recipe::Model {
            id,
            author_id,
            name: name.to_string(),
            text: "Mix and bake".to_string(),
            image: "data:image/png;base64,xyz".to_string(),
            cooking_time: 25,
            created_at: Utc::now(),
        }
    }

    fn tag_row(id: i64, name: &str, slug: &str) -> tag::Model {
        tag::Model {
            id,
            name: name.to_string(),
            color: "#49B64E".to_string(),
            slug: slug.to_string(),
        }
    }

    fn ingredient_row(id: i64, name: &str, unit: &str) -> ingredient::Model {
        ingredient::Model {
            id,
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        }
    }

    #[tokio::test]
    async fn anonymous_view_has_all_flags_false() {
        // Result sets in query order: tag links, tags, ingredient lines,
        // ingredient reference rows, author. No flag queries fire for an
        // anonymous viewer.
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![
                recipe_tag::Model {
                    id: 1,
                    recipe_id: 10,
                    tag_id: 2,
                },
                recipe_tag::Model {
                    id: 2,
                    recipe_id: 10,
                    tag_id: 1,
                },
            ]])
            .append_query_results([vec![
                tag_row(1, "lunch", "lunch"),
                tag_row(2, "breakfast", "breakfast"),
            ]])
            .append_query_results([vec![recipe_ingredient::Model {
                id: 1,
                recipe_id: 10,
                ingredient_id: 7,
                amount: 200,
            }]])
            .append_query_results([vec![ingredient_row(7, "flour", "g")]])
            .append_query_results([vec![user_row(1)]])
            .into_connection();

        let view = recipe_response(&db, &recipe_row(10, 1, "Pancakes"), None)
            .await
            .unwrap();

        assert!(!view.is_favorited);
        assert!(!view.is_in_shopping_cart);
        assert!(!view.author.is_subscribed);
        // Tags come back sorted by name even when the store returns them
        // in id order.
        let tag_names: Vec<&str> = view.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tag_names, vec!["breakfast", "lunch"]);
        assert_eq!(view.ingredients.len(), 1);
        assert_eq!(view.ingredients[0].name, "flour");
        assert_eq!(view.ingredients[0].amount, 200);
    }

    #[tokio::test]
    async fn ingredient_lines_keep_submission_order() {
        // Two lines written as (ingredient 7, then 3); the reference fetch
        // returns them in id order and must not reorder the view.
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![recipe_tag::Model {
                id: 1,
                recipe_id: 10,
                tag_id: 1,
            }]])
            .append_query_results([vec![tag_row(1, "lunch", "lunch")]])
            .append_query_results([vec![
                recipe_ingredient::Model {
                    id: 1,
                    recipe_id: 10,
                    ingredient_id: 7,
                    amount: 200,
                },
                recipe_ingredient::Model {
                    id: 2,
                    recipe_id: 10,
                    ingredient_id: 3,
                    amount: 2,
                },
            ]])
            .append_query_results([vec![
                ingredient_row(3, "egg", "pcs"),
                ingredient_row(7, "flour", "g"),
            ]])
            .append_query_results([vec![user_row(1)]])
            .into_connection();

        let view = recipe_response(&db, &recipe_row(10, 1, "Pancakes"), None)
            .await
            .unwrap();

        let names: Vec<&str> = view.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["flour", "egg"]);
    }

    #[tokio::test]
    async fn viewer_flags_reflect_store_rows() {
        // Flag queries run in order: subscription (inside the author
        // profile), favorite, shopping cart.
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![recipe_tag::Model {
                id: 1,
                recipe_id: 10,
                tag_id: 1,
            }]])
            .append_query_results([vec![tag_row(1, "lunch", "lunch")]])
            .append_query_results([vec![recipe_ingredient::Model {
                id: 1,
                recipe_id: 10,
                ingredient_id: 7,
                amount: 200,
            }]])
            .append_query_results([vec![ingredient_row(7, "flour", "g")]])
            .append_query_results([vec![user_row(1)]])
            .append_query_results([Vec::<subscription::Model>::new()])
            .append_query_results([vec![favorite::Model {
                id: 1,
                user_id: 5,
                recipe_id: 10,
            }]])
            .append_query_results([Vec::<shopping_cart::Model>::new()])
            .into_connection();

        let view = recipe_response(&db, &recipe_row(10, 1, "Pancakes"), Some(5))
            .await
            .unwrap();

        assert!(view.is_favorited);
        assert!(!view.is_in_shopping_cart);
        assert!(!view.author.is_subscribed);
    }

    #[tokio::test]
    async fn subscription_view_truncates_recipes_but_counts_all() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![
                recipe_row(3, 2, "Newest"),
                recipe_row(2, 2, "Middle"),
                recipe_row(1, 2, "Oldest"),
            ]])
            .append_query_results([vec![subscription::Model {
                id: 1,
                user_id: 5,
                author_id: 2,
            }]])
            .into_connection();

        let view = subscription_response(&db, &user_row(2), Some(5), Some(2))
            .await
            .unwrap();

        assert_eq!(view.recipes_count, 3);
        assert_eq!(view.recipes.len(), 2);
        assert_eq!(view.recipes[0].name, "Newest");
        assert!(view.is_subscribed);
    }
}
