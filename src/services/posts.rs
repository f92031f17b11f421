use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::{
        posts::{CreateCommentDto, CreatePostDto, Post},
        users::User,
    },
    repositories::{posts_repo::PostsRepository, user_repo::UserRepository},
    Error, Result,
};

#[derive(Clone)]
pub struct PostsService {
    posts: Arc<dyn PostsRepository>,
    users: Arc<dyn UserRepository>,
}

/// Ids that do not parse are treated like ids that are not stored.
fn parse_id(raw: &str, not_found: &'static str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::NotFound(not_found))
}

impl PostsService {
    pub fn new(posts: Arc<dyn PostsRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    async fn caller(&self, caller_id: Uuid) -> Result<User> {
        self.users
            .find_by_id(caller_id)
            .await?
            .ok_or(Error::NotFound("User not found"))
    }

    pub async fn create_post(&self, caller_id: Uuid, new_post: CreatePostDto) -> Result<Post> {
        new_post.validate()?;

        let author = self.caller(caller_id).await?;
        let post = self
            .posts
            .create_post(&Post::new(&author, new_post.text))
            .await?;

        info!(post_id = %post.id, author_id = %caller_id, "Post created");
        Ok(post)
    }

    pub async fn get_posts(&self) -> Result<Vec<Post>> {
        self.posts.get_posts().await
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post> {
        const NOT_FOUND: &str = "No Posts Found";

        let post_id = parse_id(post_id, NOT_FOUND)?;
        self.posts
            .get_post(post_id)
            .await?
            .ok_or(Error::NotFound(NOT_FOUND))
    }

    pub async fn delete_post(&self, caller_id: Uuid, post_id: &str) -> Result<()> {
        const NOT_FOUND: &str = "No post found";

        let post_id = parse_id(post_id, NOT_FOUND)?;
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or(Error::NotFound(NOT_FOUND))?;

        if post.author_id != caller_id {
            warn!(%post_id, %caller_id, "Refused to delete post owned by another user");
            return Err(Error::Forbidden("Not authorized to delete"));
        }

        if !self.posts.delete_post(post_id, caller_id).await? {
            // Removed by a concurrent request between the read and the delete.
            return Err(Error::NotFound(NOT_FOUND));
        }

        info!(%post_id, "Post deleted");
        Ok(())
    }

    pub async fn like_post(&self, caller_id: Uuid, post_id: &str) -> Result<Post> {
        const NOT_FOUND: &str = "No post found";

        let post_id = parse_id(post_id, NOT_FOUND)?;
        self.posts
            .update_post(post_id, Box::new(move |post: &mut Post| post.add_like(caller_id)))
            .await?
            .ok_or(Error::NotFound(NOT_FOUND))
    }

    pub async fn unlike_post(&self, caller_id: Uuid, post_id: &str) -> Result<Post> {
        const NOT_FOUND: &str = "No post found";

        let post_id = parse_id(post_id, NOT_FOUND)?;
        self.posts
            .update_post(
                post_id,
                Box::new(move |post: &mut Post| post.remove_like(caller_id)),
            )
            .await?
            .ok_or(Error::NotFound(NOT_FOUND))
    }

    pub async fn add_comment(
        &self,
        caller_id: Uuid,
        post_id: &str,
        new_comment: CreateCommentDto,
    ) -> Result<Post> {
        const NOT_FOUND: &str = "No Post found";

        new_comment.validate()?;

        let post_id = parse_id(post_id, NOT_FOUND)?;
        if self.posts.get_post(post_id).await?.is_none() {
            return Err(Error::NotFound(NOT_FOUND));
        }

        let author = self.caller(caller_id).await?;
        let text = new_comment.text;

        self.posts
            .update_post(
                post_id,
                Box::new(move |post: &mut Post| -> Result<()> {
                    post.add_comment(&author, text);
                    Ok(())
                }),
            )
            .await?
            .ok_or(Error::NotFound(NOT_FOUND))
    }

    pub async fn delete_comment(
        &self,
        caller_id: Uuid,
        post_id: &str,
        comment_id: &str,
    ) -> Result<Post> {
        const NOT_FOUND: &str = "No Post found";

        let post_id = parse_id(post_id, NOT_FOUND)?;
        let comment_id = match Uuid::parse_str(comment_id) {
            Ok(id) => id,
            Err(_) => {
                // A malformed comment id still has to report a missing post first.
                if self.posts.get_post(post_id).await?.is_none() {
                    return Err(Error::NotFound(NOT_FOUND));
                }
                return Err(Error::NotFound("No Comment found"));
            }
        };

        self.posts
            .update_post(
                post_id,
                Box::new(move |post: &mut Post| {
                    post.remove_comment(comment_id, caller_id).map(|_| ())
                }),
            )
            .await?
            .ok_or(Error::NotFound(NOT_FOUND))
    }
}
