use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use tracing::info;

use crate::{
    models::users::User,
    repositories::{auth_repo::AuthRepository, user_repo::UserRepository},
    Error, Result,
};

use super::user::Claims;

#[derive(Clone)]
pub struct AuthService {
    auth_repo: Arc<dyn AuthRepository>,
    user_repo: Arc<dyn UserRepository>,
    jwt_secret: String,
    /// Minutes.
    jwt_expiration: i64,
}

impl AuthService {
    pub fn new(
        auth_repo: Arc<dyn AuthRepository>,
        user_repo: Arc<dyn UserRepository>,
        jwt_secret: String,
        jwt_expiration: i64,
    ) -> Self {
        Self {
            auth_repo,
            user_repo,
            jwt_secret,
            jwt_expiration,
        }
    }

    /// Creates an account. The first account ever registered is the
    /// administrator.
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(Error::Conflict("Username already exists".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = self.auth_repo.create_user(username, &password_hash).await?;

        info!(user_id = user.id, role = user.role.to_str(), "Registered user");
        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(Error::Unauthorized)?;

        if !verify_password(&user, password)? {
            return Err(Error::Unauthorized);
        }

        self.generate_token(user.id)
    }

    pub fn token_max_age_minutes(&self) -> i64 {
        self.jwt_expiration
    }

    fn generate_token(&self, user_id: i64) -> Result<String> {
        let now = Utc::now();
        let exp = (now + Duration::minutes(self.jwt_expiration)).timestamp() as usize;
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
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(password_hash)
}

/// Checks `password` against the user's stored Argon2 hash.
pub fn verify_password(user: &User, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(&user.password)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
