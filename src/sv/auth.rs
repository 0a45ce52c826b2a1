//! Password hashing and access tokens.

use argon2::{
  Argon2,
  password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    rand_core::OsRng,
  },
};
use jsonwebtoken::{
  DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Hash a password with Argon2id into a PHC string.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Internal(format!("Password hash error: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    warn!("Stored password hash is not a valid PHC string");
    return false;
  };
  Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  pub sub: String,
  pub iat: i64,
  pub exp: i64,
}

pub struct Jwt {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  ttl: Duration,
}

impl Jwt {
  pub fn new(secret: &str, ttl: Duration) -> Self {
    Self {
      encoding_key: EncodingKey::from_secret(secret.as_bytes()),
      decoding_key: DecodingKey::from_secret(secret.as_bytes()),
      ttl,
    }
  }

  pub fn issue(&self, user_id: Uuid) -> Result<String> {
    let now = Utc::now();
    let ttl = chrono::TimeDelta::from_std(self.ttl)
      .map_err(|e| Error::Internal(format!("Invalid token lifetime: {e}")))?;
    let claims = Claims {
      sub: user_id.to_string(),
      iat: now.timestamp(),
      exp: (now + ttl).timestamp(),
    };

    encode(&Header::default(), &claims, &self.encoding_key)
      .map_err(|e| Error::Internal(format!("Failed to sign token: {e}")))
  }

  /// Validate a token and return the user id it was issued for.
  pub fn verify(&self, token: &str) -> Result<Uuid> {
    let validation = Validation::default();
    let data = decode::<Claims>(token, &self.decoding_key, &validation)
      .map_err(|e| {
        debug!("Rejected token: {e}");
        Error::Unauthorized
      })?;

    data.claims.sub.parse().map_err(|_| Error::Unauthorized)
  }
}
