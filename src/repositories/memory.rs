use std::{
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    models::{posts::Post, profile::Profile, users::User},
    Error, Result,
};

use super::{
    posts_repo::{PostMutation, PostsRepository},
    profile_repo::{ProfileMutation, ProfileRepository, PROFILE_EXISTS},
    user_repo::{UserRepository, USER_EXISTS},
};

/// Process-local store used when no database is configured.
#[derive(Clone, Default)]
pub struct MemoryRepo {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    posts: Arc<RwLock<HashMap<Uuid, Post>>>,
    /// Keyed by owner.
    profiles: Arc<RwLock<HashMap<Uuid, Profile>>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryRepo {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(
        &self,
        name: String,
        email: String,
        password: String,
        avatar: String,
    ) -> Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(Error::BadRequest(USER_EXISTS.to_string()));
        }

        let user = User {
            id: Uuid::now_v7(),
            name,
            email,
            password,
            avatar,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl PostsRepository for MemoryRepo {
    async fn get_posts(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self.posts.read().await.values().cloned().collect();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(posts)
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.read().await.get(&post_id).cloned())
    }

    async fn create_post(&self, post: &Post) -> Result<Post> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post.clone())
    }

    async fn update_post(&self, post_id: Uuid, mutation: PostMutation) -> Result<Option<Post>> {
        let mut posts = self.posts.write().await;
        let Some(stored) = posts.get_mut(&post_id) else {
            return Ok(None);
        };

        // Edit a copy so a rejected mutation leaves the stored post untouched.
        let mut post = stored.clone();
        mutation(&mut post)?;
        *stored = post.clone();

        Ok(Some(post))
    }

    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut posts = self.posts.write().await;
        let owned = posts
            .get(&post_id)
            .is_some_and(|post| post.author_id == author_id);
        if owned {
            posts.remove(&post_id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl ProfileRepository for MemoryRepo {
    async fn get_profiles(&self) -> Result<Vec<Profile>> {
        let mut profiles: Vec<Profile> = self.profiles.read().await.values().cloned().collect();
        profiles.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(profiles)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn create_profile(&self, profile: &Profile) -> Result<Profile> {
        match self.profiles.write().await.entry(profile.user_id) {
            Entry::Occupied(_) => Err(Error::Conflict(PROFILE_EXISTS)),
            Entry::Vacant(slot) => Ok(slot.insert(profile.clone()).clone()),
        }
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        mutation: ProfileMutation,
    ) -> Result<Option<Profile>> {
        let mut profiles = self.profiles.write().await;
        let Some(stored) = profiles.get_mut(&user_id) else {
            return Ok(None);
        };

        let mut profile = stored.clone();
        mutation(&mut profile)?;
        *stored = profile.clone();

        Ok(Some(profile))
    }

    async fn delete_profile(&self, user_id: Uuid) -> Result<bool> {
        Ok(self.profiles.write().await.remove(&user_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::profile::ProfileDto;

    async fn seeded() -> (MemoryRepo, User) {
        let repo = MemoryRepo::new();
        let user = repo
            .create_user(
                "ada".into(),
                "ada@example.com".into(),
                "hash".into(),
                String::new(),
            )
            .await
            .unwrap();
        (repo, user)
    }

    #[tokio::test]
    async fn posts_are_listed_newest_first_regardless_of_insert_order() {
        let (repo, user) = seeded().await;
        let now = Utc::now();

        for offset in [2, 0, 3, 1] {
            let mut post = Post::new(&user, format!("post {offset}"));
            post.created_at = now + Duration::seconds(offset);
            repo.create_post(&post).await.unwrap();
        }

        let texts: Vec<_> = repo
            .get_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.text)
            .collect();
        assert_eq!(texts, ["post 3", "post 2", "post 1", "post 0"]);
    }

    #[tokio::test]
    async fn failed_mutation_is_not_persisted() {
        let (repo, user) = seeded().await;
        let post = repo
            .create_post(&Post::new(&user, "hello".into()))
            .await
            .unwrap();

        let result = repo
            .update_post(
                post.id,
                Box::new(|post: &mut Post| -> Result<()> {
                    post.likes.clear();
                    Err(Error::Conflict("nope"))
                }),
            )
            .await;
        assert!(matches!(result, Err(Error::Conflict(_))));

        let stored = repo.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(stored, post);
    }

    #[tokio::test]
    async fn concurrent_likes_are_not_lost() {
        let (repo, user) = seeded().await;
        let post = repo
            .create_post(&Post::new(&user, "hello".into()))
            .await
            .unwrap();
        let post_id = post.id;

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    let liker = Uuid::now_v7();
                    repo.update_post(post_id, Box::new(move |p: &mut Post| p.add_like(liker)))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = repo.get_post(post_id).await.unwrap().unwrap();
        assert_eq!(stored.likes.len(), 16);
    }

    #[tokio::test]
    async fn delete_requires_matching_author() {
        let (repo, user) = seeded().await;
        let post = repo
            .create_post(&Post::new(&user, "hello".into()))
            .await
            .unwrap();

        assert!(!repo.delete_post(post.id, Uuid::now_v7()).await.unwrap());
        assert!(repo.get_post(post.id).await.unwrap().is_some());
        assert!(repo.delete_post(post.id, user.id).await.unwrap());
        assert!(repo.get_post(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn emails_are_unique_at_insert() {
        let (repo, _) = seeded().await;

        let err = repo
            .create_user(
                "impostor".into(),
                "ada@example.com".into(),
                "hash".into(),
                String::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::BadRequest(ref m) if m == USER_EXISTS));
        assert_eq!(repo.users.read().await.len(), 1);
    }

    #[tokio::test]
    async fn one_profile_per_user() {
        let (repo, user) = seeded().await;
        let fields = ProfileDto {
            status: "Developer".into(),
            skills: "rust".into(),
            ..Default::default()
        };
        repo.create_profile(&Profile::new(&user, fields.clone()))
            .await
            .unwrap();

        let err = repo
            .create_profile(&Profile::new(&user, fields))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Conflict(PROFILE_EXISTS)));
        assert_eq!(repo.get_profiles().await.unwrap().len(), 1);
    }
}
