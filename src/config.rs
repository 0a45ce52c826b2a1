use std::env;

use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub jwt_secret: String,
  pub jwt_ttl: Duration,
  pub port: u16,
  pub admin: Option<AdminSeed>,
}

/// Administrator account ensured on startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
  pub username: String,
  pub email: String,
  pub password: String,
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let database_url = env::var("DATABASE_URL")
      .unwrap_or_else(|_| "sqlite:squad.db?mode=rwc".into());
    let jwt_secret =
      env::var("JWT_SECRET_KEY").context("JWT_SECRET_KEY not set")?;

    let jwt_ttl = match env::var("JWT_TTL") {
      Ok(ttl) => humantime::parse_duration(&ttl)
        .with_context(|| format!("Invalid JWT_TTL `{ttl}`"))?,
      Err(_) => Duration::from_secs(24 * 60 * 60),
    };

    let port: u16 = match env::var("PORT") {
      Ok(port) => {
        port.parse().with_context(|| format!("Invalid PORT `{port}`"))?
      }
      Err(_) => 3000,
    };

    let admin = match (
      env::var("ADMIN_USERNAME"),
      env::var("ADMIN_EMAIL"),
      env::var("ADMIN_PASSWORD"),
    ) {
      (Ok(username), Ok(email), Ok(password)) => {
        Some(AdminSeed { username, email, password })
      }
      _ => None,
    };

    Ok(Self { database_url, jwt_secret, jwt_ttl, port, admin })
  }
}
