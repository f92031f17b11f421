use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;
use validator::Validate;

use crate::{models::users::User, Error, Result};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    #[serde(rename = "authorId")]
    pub author_id: Uuid,
    #[serde(rename = "authorName")]
    pub author_name: String,
    #[serde(rename = "authorAvatar")]
    pub author_avatar: String,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Like {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    #[serde(rename = "authorId")]
    pub author_id: Uuid,
    #[serde(rename = "authorName")]
    pub author_name: String,
    #[serde(rename = "authorAvatar")]
    pub author_avatar: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Row shape of the `posts` table; likes and comments live in JSONB columns.
#[derive(Debug, sqlx::FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub text: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_avatar: String,
    pub likes: Json<Vec<Like>>,
    pub comments: Json<Vec<Comment>>,
    pub created_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            text: row.text,
            author_id: row.author_id,
            author_name: row.author_name,
            author_avatar: row.author_avatar,
            likes: row.likes.0,
            comments: row.comments.0,
            created_at: row.created_at,
        }
    }
}

#[derive(Validate, Debug, Default, Clone, Deserialize)]
pub struct CreatePostDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,
    // Accepted for compatibility; the stored profile always wins.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Validate, Debug, Default, Clone, Deserialize)]
pub struct CreateCommentDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,
}

impl Post {
    pub fn new(author: &User, text: String) -> Self {
        Post {
            id: Uuid::now_v7(),
            text,
            author_id: author.id,
            author_name: author.name.clone(),
            author_avatar: author.avatar.clone(),
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.iter().any(|like| like.user_id == user_id)
    }

    pub fn add_like(&mut self, user_id: Uuid) -> Result<()> {
        if self.is_liked_by(user_id) {
            return Err(Error::Conflict("Post already liked by user"));
        }
        self.likes.insert(0, Like { user_id });
        Ok(())
    }

    pub fn remove_like(&mut self, user_id: Uuid) -> Result<()> {
        let index = self
            .likes
            .iter()
            .position(|like| like.user_id == user_id)
            .ok_or(Error::Conflict("No Post to unlike!"))?;
        self.likes.remove(index);
        Ok(())
    }

    pub fn add_comment(&mut self, author: &User, text: String) -> &Comment {
        self.comments.insert(
            0,
            Comment {
                id: Uuid::now_v7(),
                text,
                author_id: author.id,
                author_name: author.name.clone(),
                author_avatar: author.avatar.clone(),
                created_at: Utc::now(),
            },
        );
        &self.comments[0]
    }

    /// Removes the comment with `comment_id` if `caller_id` wrote it.
    pub fn remove_comment(&mut self, comment_id: Uuid, caller_id: Uuid) -> Result<Comment> {
        let index = self
            .comments
            .iter()
            .position(|comment| comment.id == comment_id)
            .ok_or(Error::NotFound("No Comment found"))?;

        if self.comments[index].author_id != caller_id {
            return Err(Error::Forbidden("Not Authorized To Delete"));
        }

        Ok(self.comments.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User {
            id: Uuid::now_v7(),
            name: name.to_string(),
            email: format!("{name}@example.com"),
            password: String::new(),
            avatar: format!("https://avatars.example.com/{name}"),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn new_post_snapshots_author_profile() {
        let author = user("ada");
        let post = Post::new(&author, "hello".to_string());

        assert_eq!(post.author_id, author.id);
        assert_eq!(post.author_name, "ada");
        assert_eq!(post.author_avatar, author.avatar);
        assert!(post.likes.is_empty());
        assert!(post.comments.is_empty());
    }

    #[test]
    fn likes_are_prepended_and_unique() {
        let mut post = Post::new(&user("ada"), "hello".to_string());
        let first = Uuid::now_v7();
        let second = Uuid::now_v7();

        post.add_like(first).unwrap();
        post.add_like(second).unwrap();
        assert!(matches!(post.add_like(first), Err(Error::Conflict(_))));

        assert_eq!(
            post.likes,
            vec![Like { user_id: second }, Like { user_id: first }]
        );
    }

    #[test]
    fn remove_like_finds_the_callers_entry() {
        let mut post = Post::new(&user("ada"), "hello".to_string());
        let first = Uuid::now_v7();
        let second = Uuid::now_v7();
        post.add_like(first).unwrap();
        post.add_like(second).unwrap();

        post.remove_like(first).unwrap();

        assert_eq!(post.likes, vec![Like { user_id: second }]);
        assert!(matches!(post.remove_like(first), Err(Error::Conflict(_))));
        assert_eq!(post.likes.len(), 1);
    }

    #[test]
    fn remove_comment_targets_the_requested_id() {
        let author = user("ada");
        let mut post = Post::new(&author, "hello".to_string());
        let older = post.add_comment(&author, "first".to_string()).id;
        let newer = post.add_comment(&author, "second".to_string()).id;

        let removed = post.remove_comment(older, author.id).unwrap();

        assert_eq!(removed.text, "first");
        assert_eq!(post.comments.len(), 1);
        assert_eq!(post.comments[0].id, newer);
    }

    #[test]
    fn remove_comment_rejects_other_authors() {
        let author = user("ada");
        let other = user("bob");
        let mut post = Post::new(&author, "hello".to_string());
        let id = post.add_comment(&author, "mine".to_string()).id;

        assert!(matches!(
            post.remove_comment(id, other.id),
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            post.remove_comment(Uuid::now_v7(), author.id),
            Err(Error::NotFound(_))
        ));
        assert_eq!(post.comments.len(), 1);
    }
}
