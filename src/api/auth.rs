use actix_web::{web, HttpResponse};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, Set};

use crate::auth::{create_token, hash_password, verify_password, Claims};
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::user;
use crate::error::{is_unique_violation, ApiError};
use crate::models::{AuthResponse, LoginRequest, SignupRequest, UserResponse};

fn require_field(field: &'static str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(field, "this field may not be blank"));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email or username already taken")
    ),
    tag = "auth"
)]
pub async fn signup(
    req: web::Json<SignupRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    require_field("email", &req.email)?;
    require_field("username", &req.username)?;
    require_field("first_name", &req.first_name)?;
    require_field("last_name", &req.last_name)?;
    require_field("password", &req.password)?;

    let existing = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(&req.email))
                .add(user::Column::Username.eq(&req.username)),
        )
        .one(pool.get_ref())
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict(
            "a user with this email or username already exists",
        ));
    }

    let password_hash = hash_password(&req.password)?;

    let new_user = user::ActiveModel {
        email: Set(req.email.clone()),
        username: Set(req.username.clone()),
        first_name: Set(req.first_name.clone()),
        last_name: Set(req.last_name.clone()),
        password_hash: Set(password_hash),
        ..Default::default()
    };

    // Two signups racing on the same email or username: the unique keys let
    // exactly one insert win.
    let user = match user::Entity::insert(new_user)
        .exec_with_returning(pool.get_ref())
        .await
    {
        Ok(user) => user,
        Err(err) if is_unique_violation(&err) => {
            return Err(ApiError::conflict(
                "a user with this email or username already exists",
            ))
        }
        Err(err) => return Err(err.into()),
    };

    let claims = Claims::new(user.id, user.email.clone(), config.jwt.expiration_hours);
    let token = create_token(&claims, &config.jwt.secret)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: UserResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed: false,
        },
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Wrong password"),
        (status = 404, description = "Unknown email")
    ),
    tag = "auth"
)]
pub async fn login(
    req: web::Json<LoginRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized);
    }

    let claims = Claims::new(user.id, user.email.clone(), config.jwt.expiration_hours);
    let token = create_token(&claims, &config.jwt.secret)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed: false,
        },
    }))
}
