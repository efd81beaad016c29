use log::info;
use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::auth::hash_password;
use crate::config::Config;
use crate::entities::user;

pub type DbPool = DatabaseConnection;

pub async fn create_mysql_pool(config: &Config) -> Result<DbPool, anyhow::Error> {
    let url = config.mysql_url();
    let db = Database::connect(&url).await?;

    // Schema bootstrap via raw SQL; uniqueness constraints double as the
    // concurrency guard for every toggle insert.
    let sql = r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            email VARCHAR(254) UNIQUE NOT NULL,
            username VARCHAR(150) UNIQUE NOT NULL,
            first_name VARCHAR(150) NOT NULL,
            last_name VARCHAR(150) NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            is_staff BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS tags (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            name VARCHAR(200) UNIQUE NOT NULL,
            color VARCHAR(7) UNIQUE NOT NULL,
            slug VARCHAR(200) UNIQUE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS ingredients (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            name VARCHAR(200) NOT NULL,
            measurement_unit VARCHAR(200) NOT NULL,
            UNIQUE KEY unique_name_unit (name, measurement_unit),
            INDEX idx_name (name)
        );

        CREATE TABLE IF NOT EXISTS recipes (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            author_id BIGINT NOT NULL,
            name VARCHAR(200) NOT NULL,
            text TEXT NOT NULL,
            image LONGTEXT NOT NULL,
            cooking_time INT NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE,
            INDEX idx_author_id (author_id),
            INDEX idx_created_at (created_at)
        );

        CREATE TABLE IF NOT EXISTS recipe_tags (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            recipe_id BIGINT NOT NULL,
            tag_id BIGINT NOT NULL,
            UNIQUE KEY unique_recipe_tag (recipe_id, tag_id),
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE,
            FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE,
            INDEX idx_recipe_id (recipe_id),
            INDEX idx_tag_id (tag_id)
        );

        CREATE TABLE IF NOT EXISTS recipe_ingredients (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            recipe_id BIGINT NOT NULL,
            ingredient_id BIGINT NOT NULL,
            amount INT NOT NULL,
            UNIQUE KEY unique_recipe_ingredient (recipe_id, ingredient_id),
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE,
            FOREIGN KEY (ingredient_id) REFERENCES ingredients(id) ON DELETE CASCADE,
            INDEX idx_recipe_id (recipe_id),
            INDEX idx_ingredient_id (ingredient_id)
        );

        CREATE TABLE IF NOT EXISTS favorites (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            recipe_id BIGINT NOT NULL,
            UNIQUE KEY unique_user_recipe (user_id, recipe_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE,
            INDEX idx_user_id (user_id),
            INDEX idx_recipe_id (recipe_id)
        );

        CREATE TABLE IF NOT EXISTS shopping_cart (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            recipe_id BIGINT NOT NULL,
            UNIQUE KEY unique_user_recipe (user_id, recipe_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE,
            INDEX idx_user_id (user_id),
            INDEX idx_recipe_id (recipe_id)
        );

        CREATE TABLE IF NOT EXISTS subscriptions (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            author_id BIGINT NOT NULL,
            UNIQUE KEY unique_user_author (user_id, author_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE,
            INDEX idx_user_id (user_id),
            INDEX idx_author_id (author_id)
        );
    "#;

    for statement in sql.split(';') {
        let statement = statement.trim();
        if !statement.is_empty() {
            let stmt = sea_orm::Statement::from_string(
                sea_orm::DatabaseBackend::MySql,
                statement.to_string(),
            );
            db.execute(stmt).await?;
        }
    }

    Ok(db)
}

/// Creates the configured staff account when it does not exist yet.
/// No-op unless both ADMIN_EMAIL and ADMIN_PASSWORD are set.
pub async fn ensure_admin_user(db: &DbPool, config: &Config) -> Result<(), anyhow::Error> {
    let (Some(email), Some(password)) = (&config.seed.admin_email, &config.seed.admin_password)
    else {
        return Ok(());
    };

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let admin = user::ActiveModel {
        email: Set(email.clone()),
        username: Set(config.seed.admin_username.clone()),
        first_name: Set("Admin".to_string()),
        last_name: Set("User".to_string()),
        password_hash: Set(hash_password(password)?),
        is_staff: Set(true),
        ..Default::default()
    };
    user::Entity::insert(admin).exec(db).await?;
    info!("Seeded staff account {}", email);
    Ok(())
}
