use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::users::{LoginUserDto, RegisterUserDto, User},
    repositories::user_repo::{UserRepository, USER_EXISTS},
    Error, Result,
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_secret: String,
    /// Minutes.
    jwt_expiration: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: usize,
    exp: usize,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_secret: String,
        jwt_expiration: i64,
    ) -> Self {
        Self {
            user_repo,
            jwt_secret,
            jwt_expiration,
        }
    }

    pub async fn register(&self, new_user: RegisterUserDto) -> Result<User> {
        new_user.validate()?;

        if self.user_repo.find_by_email(&new_user.email).await?.is_some() {
            return Err(Error::BadRequest(USER_EXISTS.to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(new_user.password.as_bytes(), &salt)?
            .to_string();

        let user = self
            .user_repo
            .create_user(
                new_user.name,
                new_user.email,
                password_hash,
                new_user.avatar.unwrap_or_default(),
            )
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn login(&self, credentials: LoginUserDto) -> Result<String> {
        credentials.validate()?;

        let user = self
            .user_repo
            .find_by_email(&credentials.email)
            .await?
            .ok_or_else(|| Error::BadRequest("Invalid credentials".to_string()))?;

        let parsed_hash = PasswordHash::new(&user.password)?;
        Argon2::default()
            .verify_password(credentials.password.as_bytes(), &parsed_hash)
            .map_err(|_| Error::BadRequest("Invalid credentials".to_string()))?;

        self.generate_token(user.id)
    }

    pub fn generate_token(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let exp = Duration::try_minutes(self.jwt_expiration)
            .filter(|lifetime| *lifetime > Duration::zero())
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(Error::InternalServerError)?
            .timestamp() as usize;
        let iat = now.timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|_| Error::InternalServerError)
    }

    pub fn decode_token<T: Into<String>>(&self, token: T) -> Result<Uuid> {
        let decoded = decode::<Claims>(
            &token.into(),
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| Error::Unauthorized("Token is not valid"))?;

        Uuid::parse_str(&decoded.claims.sub).map_err(|_| Error::Unauthorized("Token is not valid"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryRepo;

    fn service(secret: &str) -> AuthService {
        AuthService::new(Arc::new(MemoryRepo::new()), secret.to_string(), 60)
    }

    fn registration(email: &str) -> RegisterUserDto {
        RegisterUserDto {
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            password: "123456".to_string(),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn register_then_login_yields_token_for_user() {
        let auth = service("secret");
        let user = auth.register(registration("ada@example.com")).await.unwrap();
        assert_ne!(user.password, "123456");

        let token = auth
            .login(LoginUserDto {
                email: "ada@example.com".to_string(),
                password: "123456".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(auth.decode_token(token).unwrap(), user.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let auth = service("secret");
        auth.register(registration("ada@example.com")).await.unwrap();

        let err = auth
            .register(registration("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(ref m) if m == "User already exists"));
    }

    #[tokio::test]
    async fn concurrent_registrations_store_one_account() {
        let auth = service("secret");

        let (first, second) = tokio::join!(
            auth.register(registration("ada@example.com")),
            auth.register(registration("ada@example.com")),
        );

        let failures: Vec<_> = [first, second].into_iter().filter_map(|r| r.err()).collect();
        assert_eq!(failures.len(), 1);
        assert!(matches!(&failures[0], Error::BadRequest(m) if m == USER_EXISTS));
    }

    #[tokio::test]
    async fn invalid_registration_fails_validation() {
        let auth = service("secret");
        let mut dto = registration("not-an-email");
        dto.password = "123".to_string();

        let err = auth.register(dto).await.unwrap_err();
        let Error::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = service("secret");
        auth.register(registration("ada@example.com")).await.unwrap();

        let err = auth
            .login(LoginUserDto {
                email: "ada@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn out_of_range_lifetime_fails_instead_of_panicking() {
        for minutes in [i64::MAX, i64::MIN, 0] {
            let auth = AuthService::new(Arc::new(MemoryRepo::new()), "secret".into(), minutes);

            assert!(matches!(
                auth.generate_token(Uuid::now_v7()),
                Err(Error::InternalServerError)
            ));
        }
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = service("one").generate_token(Uuid::now_v7()).unwrap();

        let err = service("two").decode_token(token).unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }
}
