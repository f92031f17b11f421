use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::{models::users::User, Error, Result};

use super::PostgresRepo;

pub const USER_EXISTS: &str = "User already exists";

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn create_user(
        &self,
        name: String,
        email: String,
        password: String,
        avatar: String,
    ) -> Result<User>;
}

#[async_trait]
impl UserRepository for PostgresRepo {
    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, avatar, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        tracing::debug!(user_found = user.is_some(), "User query completed");

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, avatar, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self, password))]
    async fn create_user(
        &self,
        name: String,
        email: String,
        password: String,
        avatar: String,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password, avatar)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password, avatar, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(email)
        .bind(password)
        .bind(avatar)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            // Registrations racing past the e-mail lookup meet the unique index.
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::BadRequest(USER_EXISTS.to_string())
            }
            err => err.into(),
        })?;

        Ok(user)
    }
}
