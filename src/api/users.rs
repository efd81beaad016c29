use actix_web::{web, HttpResponse};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::auth::{require_user, AuthenticatedUser};
use crate::db::DbPool;
use crate::entities::{subscription, user};
use crate::error::{is_unique_violation, ApiError};
use crate::models::{SubscriptionResponse, UserResponse};
use crate::pagination::{page_slice, PageQuery, Paginated, PaginatedSubscriptions, PaginatedUsers};
use crate::validators::{validate_subscription, SubscriptionValidationError};
use crate::views::{subscription_response, user_response};

#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 6)")
    ),
    responses(
        (status = 200, description = "Page of user profiles", body = PaginatedUsers)
    ),
    tag = "users"
)]
pub async fn get_users(
    viewer: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let viewer_id = viewer.map(|v| v.user_id);
    let page = query.page();
    let limit = query.limit();

    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(pool.get_ref())
        .await?;
    let count = users.len() as u64;

    let mut results = Vec::new();
    for row in page_slice(users, page, limit) {
        results.push(user_response(pool.get_ref(), &row, viewer_id).await?);
    }

    Ok(HttpResponse::Ok().json(Paginated::new("/api/users", page, limit, count, results)))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "The caller's own profile", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "users"
)]
pub async fn me(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let row = require_user(pool.get_ref(), &user).await?;
    let profile = user_response(pool.get_ref(), &row, Some(user.user_id)).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    path: web::Path<i64>,
    viewer: Option<AuthenticatedUser>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let row = user::Entity::find_by_id(user_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    let profile = user_response(pool.get_ref(), &row, viewer.map(|v| v.user_id)).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubscriptionQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 6)]
    pub limit: Option<u64>,
    /// Caps how many brief recipes each author entry carries.
    #[schema(example = 3)]
    pub recipes_limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 6)"),
        ("recipes_limit" = Option<u64>, Query, description = "Max recipes per author entry")
    ),
    responses(
        (status = 200, description = "Authors the caller follows", body = PaginatedSubscriptions),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "users"
)]
pub async fn my_subscriptions(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    query: web::Query<SubscriptionQuery>,
) -> Result<HttpResponse, ApiError> {
    let pagination = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let page = pagination.page();
    let limit = pagination.limit();

    let subs = subscription::Entity::find()
        .filter(subscription::Column::UserId.eq(user.user_id))
        .order_by_asc(subscription::Column::Id)
        .all(pool.get_ref())
        .await?;
    let count = subs.len() as u64;

    let mut results = Vec::new();
    for link in page_slice(subs, page, limit) {
        let Some(author) = user::Entity::find_by_id(link.author_id)
            .one(pool.get_ref())
            .await?
        else {
            continue;
        };
        results.push(
            subscription_response(
                pool.get_ref(),
                &author,
                Some(user.user_id),
                query.recipes_limit,
            )
            .await?,
        );
    }

    Ok(HttpResponse::Ok().json(Paginated::new(
        "/api/users/subscriptions",
        page,
        limit,
        count,
        results,
    )))
}

#[utoipa::path(
    post,
    path = "/api/users/{user_id}/subscribe",
    params(
        ("user_id" = i64, Path, description = "Author to follow")
    ),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionResponse),
        (status = 400, description = "Self-subscription"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Already subscribed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "users"
)]
pub async fn subscribe(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let author_id = path.into_inner();
    validate_subscription(user.user_id, author_id)?;

    let author = user::Entity::find_by_id(author_id)
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let existing = subscription::Entity::find()
        .filter(
            Condition::all()
                .add(subscription::Column::UserId.eq(user.user_id))
                .add(subscription::Column::AuthorId.eq(author_id)),
        )
        .one(pool.get_ref())
        .await?;
    if existing.is_some() {
        return Err(SubscriptionValidationError::DuplicateSubscription.into());
    }

    let link = subscription::ActiveModel {
        user_id: Set(user.user_id),
        author_id: Set(author_id),
        ..Default::default()
    };
    match subscription::Entity::insert(link).exec(pool.get_ref()).await {
        Ok(_) => {}
        // Lost the insert race: same outcome as the pre-check.
        Err(err) if is_unique_violation(&err) => {
            return Err(SubscriptionValidationError::DuplicateSubscription.into())
        }
        Err(err) => return Err(err.into()),
    }

    let body = subscription_response(pool.get_ref(), &author, Some(user.user_id), None).await?;
    Ok(HttpResponse::Created().json(body))
}

#[utoipa::path(
    delete,
    path = "/api/users/{user_id}/subscribe",
    params(
        ("user_id" = i64, Path, description = "Author to unfollow")
    ),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 404, description = "Not subscribed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "users"
)]
pub async fn unsubscribe(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let author_id = path.into_inner();
    let result = subscription::Entity::delete_many()
        .filter(
            Condition::all()
                .add(subscription::Column::UserId.eq(user.user_id))
                .add(subscription::Column::AuthorId.eq(author_id)),
        )
        .exec(pool.get_ref())
        .await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound("subscription"));
    }
    Ok(HttpResponse::NoContent().finish())
}
