use std::collections::HashSet;

use actix_web::{web, HttpRequest, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;

use crate::auth::{require_author_or_staff, AuthenticatedUser};
use crate::db::DbPool;
use crate::entities::{
    favorite, ingredient, recipe, recipe_ingredient, recipe_tag, shopping_cart, tag,
};
use crate::error::{is_unique_violation, ApiError};
use crate::models::{IngredientAmount, RecipeBrief, RecipeResponse, RecipeWriteRequest};
use crate::pagination::{page_slice, PageQuery, Paginated, PaginatedRecipes};
use crate::services::shopping_list::{build_shopping_list, LIST_FILENAME};
use crate::validators::validate_recipe_payload;
use crate::views::recipe_response;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RecipeListQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 6)]
    pub limit: Option<u64>,
    pub author: Option<i64>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

/// `tags` may repeat (`?tags=lunch&tags=dinner`), which `web::Query` cannot
/// express, so the slugs are pulled straight off the query string.
fn tag_slugs(req: &HttpRequest) -> Vec<String> {
    req.query_string()
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| *key == "tags")
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn is_truthy(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("1") | Some("true") | Some("True"))
}

/// Referenced tag ids, deduplicated and checked against the store.
async fn validated_tag_ids(db: &DbPool, tags: &[i64]) -> Result<Vec<i64>, ApiError> {
    let mut tag_ids = tags.to_vec();
    tag_ids.sort_unstable();
    tag_ids.dedup();

    let found = tag::Entity::find()
        .filter(tag::Column::Id.is_in(tag_ids.clone()))
        .all(db)
        .await?;
    if found.len() != tag_ids.len() {
        let known: HashSet<i64> = found.iter().map(|t| t.id).collect();
        if let Some(missing) = tag_ids.iter().find(|id| !known.contains(id)) {
            return Err(ApiError::validation(
                "tags",
                format!("tag {} does not exist", missing),
            ));
        }
    }
    Ok(tag_ids)
}

async fn check_ingredients_exist(
    db: &DbPool,
    entries: &[IngredientAmount],
) -> Result<(), ApiError> {
    let ids: Vec<i64> = entries.iter().map(|entry| entry.id).collect();
    let found = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ids.clone()))
        .all(db)
        .await?;
    if found.len() != ids.len() {
        let known: HashSet<i64> = found.iter().map(|i| i.id).collect();
        if let Some(missing) = ids.iter().find(|id| !known.contains(id)) {
            return Err(ApiError::validation(
                "ingredients",
                format!("ingredient {} does not exist", missing),
            ));
        }
    }
    Ok(())
}

/// Writes the tag and ingredient link rows for one recipe inside the
/// caller's transaction. Validation has already ruled out empty sets.
async fn write_links(
    txn: &DatabaseTransaction,
    recipe_id: i64,
    tag_ids: &[i64],
    entries: &[IngredientAmount],
) -> Result<(), DbErr> {
    let tag_rows: Vec<recipe_tag::ActiveModel> = tag_ids
        .iter()
        .map(|tag_id| recipe_tag::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(*tag_id),
            ..Default::default()
        })
        .collect();
    recipe_tag::Entity::insert_many(tag_rows).exec(txn).await?;

    let ingredient_rows: Vec<recipe_ingredient::ActiveModel> = entries
        .iter()
        .map(|entry| recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(entry.id),
            amount: Set(entry.amount),
            ..Default::default()
        })
        .collect();
    recipe_ingredient::Entity::insert_many(ingredient_rows)
        .exec(txn)
        .await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 6)"),
        ("author" = Option<i64>, Query, description = "Only recipes by this author"),
        ("tags" = Option<String>, Query, description = "Tag slug, may repeat"),
        ("is_favorited" = Option<String>, Query, description = "1/true: only the caller's favorites"),
        ("is_in_shopping_cart" = Option<String>, Query, description = "1/true: only the caller's cart")
    ),
    responses(
        (status = 200, description = "Page of recipes", body = PaginatedRecipes)
    ),
    tag = "recipes"
)]
pub async fn get_recipes(
    req: HttpRequest,
    viewer: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
    query: web::Query<RecipeListQuery>,
) -> Result<HttpResponse, ApiError> {
    let viewer_id = viewer.map(|v| v.user_id);
    let pagination = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let page = pagination.page();
    let limit = pagination.limit();

    let mut condition = Condition::all();
    if let Some(author_id) = query.author {
        condition = condition.add(recipe::Column::AuthorId.eq(author_id));
    }

    let slugs = tag_slugs(&req);
    if !slugs.is_empty() {
        let tags = tag::Entity::find()
            .filter(tag::Column::Slug.is_in(slugs))
            .all(pool.get_ref())
            .await?;
        let tag_ids: Vec<i64> = tags.iter().map(|t| t.id).collect();
        let links = recipe_tag::Entity::find()
            .filter(recipe_tag::Column::TagId.is_in(tag_ids))
            .all(pool.get_ref())
            .await?;
        let mut recipe_ids: Vec<i64> = links.iter().map(|link| link.recipe_id).collect();
        recipe_ids.sort_unstable();
        recipe_ids.dedup();
        condition = condition.add(recipe::Column::Id.is_in(recipe_ids));
    }

    // The boolean filters silently pass through for anonymous callers.
    if let Some(viewer_id) = viewer_id {
        if is_truthy(&query.is_favorited) {
            let rows = favorite::Entity::find()
                .filter(favorite::Column::UserId.eq(viewer_id))
                .all(pool.get_ref())
                .await?;
            let ids: Vec<i64> = rows.iter().map(|row| row.recipe_id).collect();
            condition = condition.add(recipe::Column::Id.is_in(ids));
        }
        if is_truthy(&query.is_in_shopping_cart) {
            let rows = shopping_cart::Entity::find()
                .filter(shopping_cart::Column::UserId.eq(viewer_id))
                .all(pool.get_ref())
                .await?;
            let ids: Vec<i64> = rows.iter().map(|row| row.recipe_id).collect();
            condition = condition.add(recipe::Column::Id.is_in(ids));
        }
    }

    let recipes = recipe::Entity::find()
        .filter(condition)
        .order_by_desc(recipe::Column::CreatedAt)
        .order_by_desc(recipe::Column::Id)
        .all(pool.get_ref())
        .await?;
    let count = recipes.len() as u64;

    let mut results = Vec::new();
    for row in page_slice(recipes, page, limit) {
        results.push(recipe_response(pool.get_ref(), &row, viewer_id).await?);
    }

    Ok(HttpResponse::Ok().json(Paginated::new("/api/recipes", page, limit, count, results)))
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    request_body = RecipeWriteRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "recipes"
)]
pub async fn create_recipe(
    req: web::Json<RecipeWriteRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    validate_recipe_payload(&req.tags, &req.ingredients, req.cooking_time)?;
    let tag_ids = validated_tag_ids(pool.get_ref(), &req.tags).await?;
    check_ingredients_exist(pool.get_ref(), &req.ingredients).await?;

    // Recipe row and both link sets land atomically.
    let txn = pool.get_ref().begin().await?;
    let new_recipe = recipe::ActiveModel {
        author_id: Set(user.user_id),
        name: Set(req.name.clone()),
        text: Set(req.text.clone()),
        image: Set(req.image.clone()),
        cooking_time: Set(req.cooking_time),
        ..Default::default()
    };
    let row = recipe::Entity::insert(new_recipe)
        .exec_with_returning(&txn)
        .await?;
    write_links(&txn, row.id, &tag_ids, &req.ingredients).await?;
    txn.commit().await?;

    // Re-render through the read path so the response matches a later GET.
    let body = recipe_response(pool.get_ref(), &row, Some(user.user_id)).await?;
    Ok(HttpResponse::Created().json(body))
}

#[utoipa::path(
    get,
    path = "/api/recipes/{recipe_id}",
    params(
        ("recipe_id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 404, description = "Recipe not found")
    ),
    tag = "recipes"
)]
pub async fn get_recipe(
    path: web::Path<i64>,
    viewer: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let row = recipe::Entity::find_by_id(recipe_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    let body = recipe_response(pool.get_ref(), &row, viewer.map(|v| v.user_id)).await?;
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    put,
    path = "/api/recipes/{recipe_id}",
    params(
        ("recipe_id" = i64, Path, description = "Recipe ID")
    ),
    request_body = RecipeWriteRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "recipes"
)]
pub async fn update_recipe(
    path: web::Path<i64>,
    req: web::Json<RecipeWriteRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let row = recipe::Entity::find_by_id(recipe_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    require_author_or_staff(pool.get_ref(), &user, &row).await?;

    validate_recipe_payload(&req.tags, &req.ingredients, req.cooking_time)?;
    let tag_ids = validated_tag_ids(pool.get_ref(), &req.tags).await?;
    check_ingredients_exist(pool.get_ref(), &req.ingredients).await?;

    // Field update plus full replacement of both link sets, atomically.
    let txn = pool.get_ref().begin().await?;
    let mut active: recipe::ActiveModel = row.into();
    active.name = Set(req.name.clone());
    active.text = Set(req.text.clone());
    active.image = Set(req.image.clone());
    active.cooking_time = Set(req.cooking_time);
    let updated = active.update(&txn).await?;

    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .exec(&txn)
        .await?;
    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(&txn)
        .await?;
    write_links(&txn, recipe_id, &tag_ids, &req.ingredients).await?;
    txn.commit().await?;

    let body = recipe_response(pool.get_ref(), &updated, Some(user.user_id)).await?;
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{recipe_id}",
    params(
        ("recipe_id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "recipes"
)]
pub async fn delete_recipe(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let row = recipe::Entity::find_by_id(recipe_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    require_author_or_staff(pool.get_ref(), &user, &row).await?;

    recipe::Entity::delete_by_id(recipe_id)
        .exec(pool.get_ref())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/recipes/{recipe_id}/favorite",
    params(
        ("recipe_id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Added to favorites", body = RecipeBrief),
        (status = 404, description = "Recipe not found"),
        (status = 409, description = "Already in favorites")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "recipes"
)]
pub async fn favorite_recipe(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let row = recipe::Entity::find_by_id(recipe_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    let existing = favorite::Entity::find()
        .filter(
            Condition::all()
                .add(favorite::Column::UserId.eq(user.user_id))
                .add(favorite::Column::RecipeId.eq(recipe_id)),
        )
        .one(pool.get_ref())
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("recipe is already in favorites"));
    }

    let entry = favorite::ActiveModel {
        user_id: Set(user.user_id),
        recipe_id: Set(recipe_id),
        ..Default::default()
    };
    match favorite::Entity::insert(entry).exec(pool.get_ref()).await {
        Ok(_) => {}
        // Lost the insert race: same outcome as the pre-check.
        Err(err) if is_unique_violation(&err) => {
            return Err(ApiError::conflict("recipe is already in favorites"))
        }
        Err(err) => return Err(err.into()),
    }

    Ok(HttpResponse::Created().json(RecipeBrief::from(row)))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{recipe_id}/favorite",
    params(
        ("recipe_id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Removed from favorites"),
        (status = 404, description = "Not in favorites")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "recipes"
)]
pub async fn unfavorite_recipe(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let result = favorite::Entity::delete_many()
        .filter(
            Condition::all()
                .add(favorite::Column::UserId.eq(user.user_id))
                .add(favorite::Column::RecipeId.eq(recipe_id)),
        )
        .exec(pool.get_ref())
        .await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound("favorite"));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/recipes/{recipe_id}/shopping_cart",
    params(
        ("recipe_id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Added to the shopping cart", body = RecipeBrief),
        (status = 404, description = "Recipe not found"),
        (status = 409, description = "Already in the shopping cart")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "recipes"
)]
pub async fn add_to_shopping_cart(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let row = recipe::Entity::find_by_id(recipe_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    let existing = shopping_cart::Entity::find()
        .filter(
            Condition::all()
                .add(shopping_cart::Column::UserId.eq(user.user_id))
                .add(shopping_cart::Column::RecipeId.eq(recipe_id)),
        )
        .one(pool.get_ref())
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("recipe is already in the shopping cart"));
    }

    let entry = shopping_cart::ActiveModel {
        user_id: Set(user.user_id),
        recipe_id: Set(recipe_id),
        ..Default::default()
    };
    match shopping_cart::Entity::insert(entry).exec(pool.get_ref()).await {
        Ok(_) => {}
        Err(err) if is_unique_violation(&err) => {
            return Err(ApiError::conflict("recipe is already in the shopping cart"))
        }
        Err(err) => return Err(err.into()),
    }

    Ok(HttpResponse::Created().json(RecipeBrief::from(row)))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{recipe_id}/shopping_cart",
    params(
        ("recipe_id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Removed from the shopping cart"),
        (status = 404, description = "Not in the shopping cart")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "recipes"
)]
pub async fn remove_from_shopping_cart(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = path.into_inner();
    let result = shopping_cart::Entity::delete_many()
        .filter(
            Condition::all()
                .add(shopping_cart::Column::UserId.eq(user.user_id))
                .add(shopping_cart::Column::RecipeId.eq(recipe_id)),
        )
        .exec(pool.get_ref())
        .await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound("shopping cart entry"));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    responses(
        (status = 200, description = "Aggregated shopping list as a text attachment"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "recipes"
)]
pub async fn download_shopping_cart(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let body = build_shopping_list(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", LIST_FILENAME),
        ))
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn repeated_tag_params_are_all_collected() {
        let req = TestRequest::with_uri("/api/recipes?tags=lunch&page=1&tags=dinner")
            .to_http_request();
        assert_eq!(tag_slugs(&req), vec!["lunch", "dinner"]);
    }

    #[test]
    fn absent_or_empty_tag_params_collect_nothing() {
        let req = TestRequest::with_uri("/api/recipes?page=2").to_http_request();
        assert!(tag_slugs(&req).is_empty());

        let req = TestRequest::with_uri("/api/recipes?tags=").to_http_request();
        assert!(tag_slugs(&req).is_empty());
    }

    #[test]
    fn boolean_filters_accept_one_and_true() {
        assert!(is_truthy(&Some("1".to_string())));
        assert!(is_truthy(&Some("true".to_string())));
        assert!(is_truthy(&Some("True".to_string())));
        assert!(!is_truthy(&Some("0".to_string())));
        assert!(!is_truthy(&Some("false".to_string())));
        assert!(!is_truthy(&None));
    }
}
