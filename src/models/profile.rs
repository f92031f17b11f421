use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{models::users::User, Error, Result};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "userAvatar")]
    pub user_avatar: String,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    #[serde(rename = "githubUsername")]
    pub github_username: Option<String>,
    pub social: Social,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct Social {
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Education {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    #[serde(rename = "fieldOfStudy")]
    pub field_of_study: String,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

/// Row shape of the `profiles` table; social links and the two histories are JSONB.
#[derive(Debug, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: String,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub github_username: Option<String>,
    pub social: Json<Social>,
    pub experience: Json<Vec<Experience>>,
    pub education: Json<Vec<Education>>,
    pub created_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            user_avatar: row.user_avatar,
            company: row.company,
            website: row.website,
            location: row.location,
            status: row.status,
            skills: row.skills,
            bio: row.bio,
            github_username: row.github_username,
            social: row.social.0,
            experience: row.experience.0,
            education: row.education.0,
            created_at: row.created_at,
        }
    }
}

/// Create-or-update body. Fields left out keep their stored value.
#[derive(Validate, Debug, Default, Clone, Deserialize)]
pub struct ProfileDto {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
    /// Comma separated.
    #[serde(default)]
    #[validate(custom(function = "skills_present"))]
    pub skills: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, rename = "githubUsername")]
    pub github_username: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
}

fn skills_present(skills: &str) -> std::result::Result<(), ValidationError> {
    if split_skills(skills).is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("Skills is required".into());
        return Err(error);
    }
    Ok(())
}

fn split_skills(skills: &str) -> Vec<String> {
    skills
        .split(',')
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Validate, Debug, Default, Clone, Deserialize)]
pub struct ExperienceDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Company is required"))]
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(required(message = "From date is required"))]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Validate, Debug, Default, Clone, Deserialize)]
pub struct EducationDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "School is required"))]
    pub school: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Degree is required"))]
    pub degree: String,
    // Validation errors name it `field_of_study`.
    #[serde(default, alias = "fieldOfStudy")]
    #[validate(length(min = 1, message = "Field of study is required"))]
    pub field_of_study: String,
    #[serde(default)]
    #[validate(required(message = "From date is required"))]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl Profile {
    pub fn new(owner: &User, fields: ProfileDto) -> Self {
        let mut profile = Profile {
            id: Uuid::now_v7(),
            user_id: owner.id,
            user_name: owner.name.clone(),
            user_avatar: owner.avatar.clone(),
            company: None,
            website: None,
            location: None,
            status: String::new(),
            skills: Vec::new(),
            bio: None,
            github_username: None,
            social: Social::default(),
            experience: Vec::new(),
            education: Vec::new(),
            created_at: Utc::now(),
        };
        profile.apply(owner, fields);
        profile
    }

    /// Overwrites the fields present in `fields` and refreshes the owner snapshot.
    pub fn apply(&mut self, owner: &User, fields: ProfileDto) {
        self.user_name = owner.name.clone();
        self.user_avatar = owner.avatar.clone();

        self.status = fields.status;
        self.skills = split_skills(&fields.skills);
        self.company = fields.company.or(self.company.take());
        self.website = fields.website.or(self.website.take());
        self.location = fields.location.or(self.location.take());
        self.bio = fields.bio.or(self.bio.take());
        self.github_username = fields.github_username.or(self.github_username.take());

        let social = &mut self.social;
        social.youtube = fields.youtube.or(social.youtube.take());
        social.twitter = fields.twitter.or(social.twitter.take());
        social.facebook = fields.facebook.or(social.facebook.take());
        social.linkedin = fields.linkedin.or(social.linkedin.take());
        social.instagram = fields.instagram.or(social.instagram.take());
    }

    /// Validated `entry` goes to the head of the list.
    pub fn add_experience(&mut self, entry: ExperienceDto) -> Result<&Experience> {
        let from = entry
            .from
            .ok_or_else(|| Error::BadRequest("From date is required".into()))?;
        self.experience.insert(
            0,
            Experience {
                id: Uuid::now_v7(),
                title: entry.title,
                company: entry.company,
                location: entry.location,
                from,
                to: if entry.current { None } else { entry.to },
                current: entry.current,
                description: entry.description,
            },
        );
        Ok(&self.experience[0])
    }

    pub fn remove_experience(&mut self, experience_id: Uuid) -> Result<Experience> {
        let index = self
            .experience
            .iter()
            .position(|e| e.id == experience_id)
            .ok_or(Error::NotFound("Experience not found"))?;
        Ok(self.experience.remove(index))
    }

    pub fn add_education(&mut self, entry: EducationDto) -> Result<&Education> {
        let from = entry
            .from
            .ok_or_else(|| Error::BadRequest("From date is required".into()))?;
        self.education.insert(
            0,
            Education {
                id: Uuid::now_v7(),
                school: entry.school,
                degree: entry.degree,
                field_of_study: entry.field_of_study,
                from,
                to: if entry.current { None } else { entry.to },
                current: entry.current,
                description: entry.description,
            },
        );
        Ok(&self.education[0])
    }

    pub fn remove_education(&mut self, education_id: Uuid) -> Result<Education> {
        let index = self
            .education
            .iter()
            .position(|e| e.id == education_id)
            .ok_or(Error::NotFound("Education not found"))?;
        Ok(self.education.remove(index))
    }
}
