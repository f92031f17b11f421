use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::{
        profile::{EducationDto, ExperienceDto, Profile, ProfileDto},
        users::User,
    },
    repositories::{
        profile_repo::{ProfileMutation, ProfileRepository, PROFILE_EXISTS},
        user_repo::UserRepository,
    },
    Error, Result,
};

const NO_PROFILE: &str = "There is no profile for this user";

#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    users: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { profiles, users }
    }

    async fn owner(&self, user_id: Uuid) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(Error::NotFound("User not found"))
    }

    async fn update(&self, caller_id: Uuid, mutation: ProfileMutation) -> Result<Profile> {
        self.profiles
            .update_profile(caller_id, mutation)
            .await?
            .ok_or(Error::NotFound(NO_PROFILE))
    }

    pub async fn get_my_profile(&self, caller_id: Uuid) -> Result<Profile> {
        self.profiles
            .get_profile(caller_id)
            .await?
            .ok_or(Error::NotFound(NO_PROFILE))
    }

    pub async fn get_profiles(&self) -> Result<Vec<Profile>> {
        self.profiles.get_profiles().await
    }

    pub async fn get_profile_by_user(&self, user_id: &str) -> Result<Profile> {
        const NOT_FOUND: &str = "Profile not found";

        let user_id = Uuid::parse_str(user_id).map_err(|_| Error::NotFound(NOT_FOUND))?;
        self.profiles
            .get_profile(user_id)
            .await?
            .ok_or(Error::NotFound(NOT_FOUND))
    }

    /// Creates the caller's profile, or updates the fields sent if one exists.
    pub async fn upsert_profile(&self, caller_id: Uuid, fields: ProfileDto) -> Result<Profile> {
        fields.validate()?;
        let owner = self.owner(caller_id).await?;

        let apply = |owner: User, fields: ProfileDto| -> ProfileMutation {
            Box::new(move |profile: &mut Profile| -> Result<()> {
                profile.apply(&owner, fields);
                Ok(())
            })
        };

        if let Some(profile) = self
            .profiles
            .update_profile(caller_id, apply(owner.clone(), fields.clone()))
            .await?
        {
            info!(user_id = %caller_id, "Profile updated");
            return Ok(profile);
        }

        match self
            .profiles
            .create_profile(&Profile::new(&owner, fields.clone()))
            .await
        {
            Ok(profile) => {
                info!(user_id = %caller_id, "Profile created");
                Ok(profile)
            }
            // Lost a race with another create; the row is there now.
            Err(Error::Conflict(PROFILE_EXISTS)) => {
                self.update(caller_id, apply(owner, fields)).await
            }
            Err(err) => Err(err),
        }
    }

    pub async fn delete_profile(&self, caller_id: Uuid) -> Result<()> {
        if !self.profiles.delete_profile(caller_id).await? {
            return Err(Error::NotFound(NO_PROFILE));
        }

        info!(user_id = %caller_id, "Profile deleted");
        Ok(())
    }

    pub async fn add_experience(&self, caller_id: Uuid, entry: ExperienceDto) -> Result<Profile> {
        entry.validate()?;

        self.update(
            caller_id,
            Box::new(move |profile: &mut Profile| -> Result<()> {
                profile.add_experience(entry)?;
                Ok(())
            }),
        )
        .await
    }

    pub async fn delete_experience(&self, caller_id: Uuid, experience_id: &str) -> Result<Profile> {
        let experience_id = Uuid::parse_str(experience_id)
            .map_err(|_| Error::NotFound("Experience not found"))?;

        self.update(
            caller_id,
            Box::new(move |profile: &mut Profile| -> Result<()> {
                profile.remove_experience(experience_id)?;
                Ok(())
            }),
        )
        .await
    }

    pub async fn add_education(&self, caller_id: Uuid, entry: EducationDto) -> Result<Profile> {
        entry.validate()?;

        self.update(
            caller_id,
            Box::new(move |profile: &mut Profile| -> Result<()> {
                profile.add_education(entry)?;
                Ok(())
            }),
        )
        .await
    }

    pub async fn delete_education(&self, caller_id: Uuid, education_id: &str) -> Result<Profile> {
        let education_id = Uuid::parse_str(education_id)
            .map_err(|_| Error::NotFound("Education not found"))?;

        self.update(
            caller_id,
            Box::new(move |profile: &mut Profile| -> Result<()> {
                profile.remove_education(education_id)?;
                Ok(())
            }),
        )
        .await
    }
}
