use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter};

use crate::db::DbPool;
use crate::entities::{subscription, user};
use crate::error::ApiError;
use crate::models::UserResponse;

/// True iff `viewer` currently follows `author_id`. Anonymous viewers are
/// never subscribed and the check never errors for them.
pub async fn is_subscribed(
    db: &DbPool,
    viewer: Option<i64>,
    author_id: i64,
) -> Result<bool, ApiError> {
    let Some(viewer_id) = viewer else {
        return Ok(false);
    };
    let existing = subscription::Entity::find()
        .filter(
            Condition::all()
                .add(subscription::Column::UserId.eq(viewer_id))
                .add(subscription::Column::AuthorId.eq(author_id)),
        )
        .one(db)
        .await?;
    Ok(existing.is_some())
}

/// Profile read-shape relative to the requesting user. Recomputed on every
/// request; `is_subscribed` is never stored on the user row.
pub async fn user_response(
    db: &DbPool,
    user: &user::Model,
    viewer: Option<i64>,
) -> Result<UserResponse, ApiError> {
    Ok(UserResponse {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        is_subscribed: is_subscribed(db, viewer, user.id).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[tokio::test]
    async fn anonymous_viewer_is_never_subscribed() {
        // No appended results: the anonymous path must not touch the store.
        let db = MockDatabase::new(DatabaseBackend::MySql).into_connection();

        assert!(!is_subscribed(&db, None, 1).await.unwrap());
    }

    #[tokio::test]
    async fn subscription_row_turns_the_flag_on() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![subscription::Model {
                id: 1,
                user_id: 5,
                author_id: 2,
            }]])
            .into_connection();

        assert!(is_subscribed(&db, Some(5), 2).await.unwrap());
    }

    #[tokio::test]
    async fn missing_subscription_row_leaves_the_flag_off() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<subscription::Model>::new()])
            .into_connection();

        assert!(!is_subscribed(&db, Some(5), 2).await.unwrap());
    }

    #[tokio::test]
    async fn profile_carries_the_subscription_flag() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![subscription::Model {
                id: 1,
                user_id: 5,
                author_id: 2,
            }]])
            .into_connection();

        let author = user_row(2);
        let profile = user_response(&db, &author, Some(5)).await.unwrap();
        assert_eq!(profile.id, 2);
        assert_eq!(profile.username, "user2");
        assert!(profile.is_subscribed);
    }
}
