use std::sync::Arc;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{models::users::User, repositories::user_repo::UserRepository, Error, Result};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    jwt_secret: String,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, jwt_secret: String) -> Self {
        Self { repo, jwt_secret }
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        let user = self.repo.get_user(user_id).await?;
        let user = user.ok_or(Error::NotFound)?;
        Ok(user)
    }

    pub fn decode_token<T: Into<String>>(&self, token: T) -> Result<i64> {
        let decode = decode::<Claims>(
            &token.into(),
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| Error::Unauthorized)?;

        decode.claims.sub.parse().map_err(|_| Error::Unauthorized)
    }

    /// Resolves a session token to its user, if both are still valid.
    pub async fn user_from_token(&self, token: &str) -> Option<User> {
        let user_id = self.decode_token(token).ok()?;
        self.get_user(user_id).await.ok()
    }
}
