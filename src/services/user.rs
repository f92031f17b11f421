use std::sync::Arc;

use uuid::Uuid;

use crate::{models::users::User, repositories::user_repo::UserRepository, Error, Result};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(Error::NotFound("User not found"))
    }
}
