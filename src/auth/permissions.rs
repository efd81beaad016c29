use sea_orm::EntityTrait;

use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::entities::{recipe, user};
use crate::error::ApiError;

/// Resolves the token's subject to a live user row. A token whose user has
/// been deleted is treated the same as no token.
pub async fn require_user(db: &DbPool, auth: &AuthenticatedUser) -> Result<user::Model, ApiError> {
    user::Entity::find_by_id(auth.user_id)
        .one(db)
        .await?
        .ok_or(ApiError::Unauthorized)
}

/// Tag/ingredient writes are reserved for staff accounts. The role is read
/// from the store on every call, not baked into the token.
pub async fn require_staff(db: &DbPool, auth: &AuthenticatedUser) -> Result<user::Model, ApiError> {
    let user = require_user(db, auth).await?;
    if user.is_staff {
        Ok(user)
    } else {
        Err(ApiError::PermissionDenied("staff role required"))
    }
}

/// Recipe mutation is allowed to the recipe's author or to staff.
pub async fn require_author_or_staff(
    db: &DbPool,
    auth: &AuthenticatedUser,
    recipe: &recipe::Model,
) -> Result<(), ApiError> {
    if recipe.author_id == auth.user_id {
        return Ok(());
    }
    let user = require_user(db, auth).await?;
    if user.is_staff {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied(
            "only the author may modify this recipe",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user_row(id: i64, is_staff: bool) -> user::Model {
        user::Model {
            id,
            email: format!("user{}@example.com", id),
            username: format!("user{}", id),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: "hash".to_string(),
            is_staff,
            created_at: Utc::now(),
        }
    }

    fn recipe_row(id: i64, author_id: i64) -> recipe::Model {
        recipe::Model {
            id,
            author_id,
            name: "Pancakes".to_string(),
            text: "Mix and fry".to_string(),
            image: "data:image/png;base64,xyz".to_string(),
            cooking_time: 20,
            created_at: Utc::now(),
        }
    }

    fn auth(user_id: i64) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id,
            email: format!("user{}@example.com", user_id),
        }
    }

    #[tokio::test]
    async fn staff_check_rejects_regular_users() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![user_row(1, false)]])
            .into_connection();

        let err = require_staff(&db, &auth(1)).await.unwrap_err();
        assert!(matches!(err, ApiError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn staff_check_accepts_staff() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![user_row(1, true)]])
            .into_connection();

        let user = require_staff(&db, &auth(1)).await.unwrap();
        assert!(user.is_staff);
    }

    #[tokio::test]
    async fn author_may_modify_own_recipe_without_a_lookup() {
        // No query results appended: the author path must not hit the store.
        let db = MockDatabase::new(DatabaseBackend::MySql).into_connection();

        let recipe = recipe_row(10, 1);
        assert!(require_author_or_staff(&db, &auth(1), &recipe).await.is_ok());
    }

    #[tokio::test]
    async fn non_author_is_denied() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![user_row(2, false)]])
            .into_connection();

        let recipe = recipe_row(10, 1);
        let err = require_author_or_staff(&db, &auth(2), &recipe)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn staff_may_modify_any_recipe() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![user_row(2, true)]])
            .into_connection();

        let recipe = recipe_row(10, 1);
        assert!(require_author_or_staff(&db, &auth(2), &recipe).await.is_ok());
    }

    #[tokio::test]
    async fn deleted_user_token_is_unauthorized() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let err = require_user(&db, &auth(9)).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }
}
