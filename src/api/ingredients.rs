use actix_web::{web, HttpResponse};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::auth::{require_staff, AuthenticatedUser};
use crate::db::DbPool;
use crate::entities::ingredient;
use crate::error::{is_unique_violation, ApiError};
use crate::models::{IngredientCreateRequest, IngredientResponse};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct IngredientListQuery {
    /// Name prefix to search for.
    pub name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    params(
        ("name" = Option<String>, Query, description = "Name prefix filter")
    ),
    responses(
        (status = 200, description = "Matching ingredients", body = Vec<IngredientResponse>)
    ),
    tag = "ingredients"
)]
pub async fn get_ingredients(
    pool: web::Data<DbPool>,
    query: web::Query<IngredientListQuery>,
) -> Result<HttpResponse, ApiError> {
    let mut select = ingredient::Entity::find().order_by_asc(ingredient::Column::Name);
    if let Some(name) = query.name.as_deref().filter(|n| !n.is_empty()) {
        select = select.filter(ingredient::Column::Name.starts_with(name));
    }
    let ingredients: Vec<IngredientResponse> = select
        .all(pool.get_ref())
        .await?
        .into_iter()
        .map(IngredientResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(ingredients))
}

#[utoipa::path(
    get,
    path = "/api/ingredients/{ingredient_id}",
    params(
        ("ingredient_id" = i64, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Ingredient not found")
    ),
    tag = "ingredients"
)]
pub async fn get_ingredient(
    path: web::Path<i64>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let ingredient_id = path.into_inner();
    let row = ingredient::Entity::find_by_id(ingredient_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("ingredient"))?;
    Ok(HttpResponse::Ok().json(IngredientResponse::from(row)))
}

#[utoipa::path(
    post,
    path = "/api/ingredients",
    request_body = IngredientCreateRequest,
    responses(
        (status = 201, description = "Ingredient created", body = IngredientResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Staff only"),
        (status = 409, description = "Name and unit pair already exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "ingredients"
)]
pub async fn create_ingredient(
    req: web::Json<IngredientCreateRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    require_staff(pool.get_ref(), &user).await?;

    if req.name.trim().is_empty() {
        return Err(ApiError::validation("name", "this field may not be blank"));
    }
    if req.measurement_unit.trim().is_empty() {
        return Err(ApiError::validation(
            "measurement_unit",
            "this field may not be blank",
        ));
    }

    let existing = ingredient::Entity::find()
        .filter(
            Condition::all()
                .add(ingredient::Column::Name.eq(&req.name))
                .add(ingredient::Column::MeasurementUnit.eq(&req.measurement_unit)),
        )
        .one(pool.get_ref())
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict(
            "an ingredient with this name and unit already exists",
        ));
    }

    let new_ingredient = ingredient::ActiveModel {
        name: Set(req.name.clone()),
        measurement_unit: Set(req.measurement_unit.clone()),
        ..Default::default()
    };
    let row = match ingredient::Entity::insert(new_ingredient)
        .exec_with_returning(pool.get_ref())
        .await
    {
        Ok(row) => row,
        Err(err) if is_unique_violation(&err) => {
            return Err(ApiError::conflict(
                "an ingredient with this name and unit already exists",
            ))
        }
        Err(err) => return Err(err.into()),
    };

    Ok(HttpResponse::Created().json(IngredientResponse::from(row)))
}
