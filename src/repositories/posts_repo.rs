use async_trait::async_trait;
use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    models::posts::{Post, PostRow},
    Result,
};

use super::PostgresRepo;

/// In-place edit of a stored post. An `Err` aborts the write.
pub type PostMutation = Box<dyn FnOnce(&mut Post) -> Result<()> + Send>;

#[async_trait]
pub trait PostsRepository: Sync + Send {
    /// All posts, newest first.
    async fn get_posts(&self) -> Result<Vec<Post>>;
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>>;
    async fn create_post(&self, post: &Post) -> Result<Post>;
    /// Applies `mutation` to the post and persists it as one atomic
    /// read-modify-write. `Ok(None)` when the post does not exist.
    async fn update_post(&self, post_id: Uuid, mutation: PostMutation) -> Result<Option<Post>>;
    /// Deletes the post only if `author_id` owns it. Returns whether a row went away.
    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool>;
}

#[async_trait]
impl PostsRepository for PostgresRepo {
    #[instrument(skip(self))]
    async fn get_posts(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, text, author_id, author_name, author_avatar, likes, comments, created_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, text, author_id, author_name, author_avatar, likes, comments, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn create_post(&self, post: &Post) -> Result<Post> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, text, author_id, author_name, author_avatar, likes, comments, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, text, author_id, author_name, author_avatar, likes, comments, created_at
            "#,
        )
        .bind(post.id)
        .bind(&post.text)
        .bind(post.author_id)
        .bind(&post.author_name)
        .bind(&post.author_avatar)
        .bind(Json(post.likes.clone()))
        .bind(Json(post.comments.clone()))
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[instrument(skip(self, mutation))]
    async fn update_post(&self, post_id: Uuid, mutation: PostMutation) -> Result<Option<Post>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, text, author_id, author_name, author_avatar, likes, comments, created_at
            FROM posts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut post = Post::from(row);
        mutation(&mut post)?;

        sqlx::query(
            r#"
            UPDATE posts
            SET likes = $2,
                comments = $3
            WHERE id = $1
            "#,
        )
        .bind(post.id)
        .bind(Json(post.likes.clone()))
        .bind(Json(post.comments.clone()))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(post))
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
