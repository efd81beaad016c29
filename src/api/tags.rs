use actix_web::{web, HttpResponse};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::auth::{require_staff, AuthenticatedUser};
use crate::db::DbPool;
use crate::entities::tag;
use crate::error::{is_unique_violation, ApiError};
use crate::models::{TagCreateRequest, TagResponse};
use crate::validators::is_hex_color;

#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "All tags", body = Vec<TagResponse>)
    ),
    tag = "tags"
)]
pub async fn get_tags(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let tags: Vec<TagResponse> = tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(pool.get_ref())
        .await?
        .into_iter()
        .map(TagResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(tags))
}

#[utoipa::path(
    get,
    path = "/api/tags/{tag_id}",
    params(
        ("tag_id" = i64, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Tag", body = TagResponse),
        (status = 404, description = "Tag not found")
    ),
    tag = "tags"
)]
pub async fn get_tag(
    path: web::Path<i64>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let tag_id = path.into_inner();
    let row = tag::Entity::find_by_id(tag_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("tag"))?;
    Ok(HttpResponse::Ok().json(TagResponse::from(row)))
}

#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = TagCreateRequest,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Staff only"),
        (status = 409, description = "Name, color or slug already taken")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "tags"
)]
pub async fn create_tag(
    req: web::Json<TagCreateRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    require_staff(pool.get_ref(), &user).await?;

    if req.name.trim().is_empty() {
        return Err(ApiError::validation("name", "this field may not be blank"));
    }
    if req.slug.trim().is_empty() {
        return Err(ApiError::validation("slug", "this field may not be blank"));
    }
    if !is_hex_color(&req.color) {
        return Err(ApiError::validation(
            "color",
            "must be a hex color code like #49B64E",
        ));
    }

    let existing = tag::Entity::find()
        .filter(
            Condition::any()
                .add(tag::Column::Name.eq(&req.name))
                .add(tag::Column::Color.eq(&req.color))
                .add(tag::Column::Slug.eq(&req.slug)),
        )
        .one(pool.get_ref())
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict(
            "a tag with this name, color or slug already exists",
        ));
    }

    let new_tag = tag::ActiveModel {
        name: Set(req.name.clone()),
        color: Set(req.color.clone()),
        slug: Set(req.slug.clone()),
        ..Default::default()
    };
    let row = match tag::Entity::insert(new_tag)
        .exec_with_returning(pool.get_ref())
        .await
    {
        Ok(row) => row,
        Err(err) if is_unique_violation(&err) => {
            return Err(ApiError::conflict(
                "a tag with this name, color or slug already exists",
            ))
        }
        Err(err) => return Err(err.into()),
    };

    Ok(HttpResponse::Created().json(TagResponse::from(row)))
}

#[utoipa::path(
    delete,
    path = "/api/tags/{tag_id}",
    params(
        ("tag_id" = i64, Path, description = "Tag ID")
    ),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Tag not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "tags"
)]
pub async fn delete_tag(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    require_staff(pool.get_ref(), &user).await?;

    let tag_id = path.into_inner();
    let result = tag::Entity::delete_by_id(tag_id).exec(pool.get_ref()).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound("tag"));
    }
    Ok(HttpResponse::NoContent().finish())
}
