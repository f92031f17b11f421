use async_trait::async_trait;
use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    models::profile::{Profile, ProfileRow},
    Error, Result,
};

use super::PostgresRepo;

pub const PROFILE_EXISTS: &str = "Profile already exists";

/// In-place edit of a stored profile. An `Err` aborts the write.
pub type ProfileMutation = Box<dyn FnOnce(&mut Profile) -> Result<()> + Send>;

#[async_trait]
pub trait ProfileRepository: Sync + Send {
    async fn get_profiles(&self) -> Result<Vec<Profile>>;
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;
    /// Fails with `PROFILE_EXISTS` when the user already has one.
    async fn create_profile(&self, profile: &Profile) -> Result<Profile>;
    /// Applies `mutation` to the user's profile as one atomic read-modify-write.
    /// `Ok(None)` when the user has no profile.
    async fn update_profile(
        &self,
        user_id: Uuid,
        mutation: ProfileMutation,
    ) -> Result<Option<Profile>>;
    async fn delete_profile(&self, user_id: Uuid) -> Result<bool>;
}

#[async_trait]
impl ProfileRepository for PostgresRepo {
    #[instrument(skip(self))]
    async fn get_profiles(&self) -> Result<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, user_id, user_name, user_avatar, company, website, location, status,
                   skills, bio, github_username, social, experience, education, created_at
            FROM profiles
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Profile::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, user_id, user_name, user_avatar, company, website, location, status,
                   skills, bio, github_username, social, experience, education, created_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.user_id))]
    async fn create_profile(&self, profile: &Profile) -> Result<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (id, user_id, user_name, user_avatar, company, website, location,
                                  status, skills, bio, github_username, social, experience,
                                  education, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id, user_id, user_name, user_avatar, company, website, location, status,
                      skills, bio, github_username, social, experience, education, created_at
            "#,
        )
        .bind(profile.id)
        .bind(profile.user_id)
        .bind(&profile.user_name)
        .bind(&profile.user_avatar)
        .bind(&profile.company)
        .bind(&profile.website)
        .bind(&profile.location)
        .bind(&profile.status)
        .bind(&profile.skills)
        .bind(&profile.bio)
        .bind(&profile.github_username)
        .bind(Json(profile.social.clone()))
        .bind(Json(profile.experience.clone()))
        .bind(Json(profile.education.clone()))
        .bind(profile.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::Conflict(PROFILE_EXISTS)
            }
            err => err.into(),
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, mutation))]
    async fn update_profile(
        &self,
        user_id: Uuid,
        mutation: ProfileMutation,
    ) -> Result<Option<Profile>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, user_id, user_name, user_avatar, company, website, location, status,
                   skills, bio, github_username, social, experience, education, created_at
            FROM profiles
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut profile = Profile::from(row);
        mutation(&mut profile)?;

        sqlx::query(
            r#"
            UPDATE profiles
            SET user_name = $2,
                user_avatar = $3,
                company = $4,
                website = $5,
                location = $6,
                status = $7,
                skills = $8,
                bio = $9,
                github_username = $10,
                social = $11,
                experience = $12,
                education = $13
            WHERE id = $1
            "#,
        )
        .bind(profile.id)
        .bind(&profile.user_name)
        .bind(&profile.user_avatar)
        .bind(&profile.company)
        .bind(&profile.website)
        .bind(&profile.location)
        .bind(&profile.status)
        .bind(&profile.skills)
        .bind(&profile.bio)
        .bind(&profile.github_username)
        .bind(Json(profile.social.clone()))
        .bind(Json(profile.experience.clone()))
        .bind(Json(profile.education.clone()))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(profile))
    }

    #[instrument(skip(self))]
    async fn delete_profile(&self, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM profiles WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
