use crate::{config::Config, prelude::*, sv::auth::Jwt};

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  pub jwt: Jwt,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;

    migration::Migrator::up(&db, None)
      .await
      .context("Failed to run migrations")?;

    Ok(Self::with_db(db, config))
  }

  pub fn with_db(db: DatabaseConnection, config: Config) -> Self {
    let jwt = Jwt::new(&config.jwt_secret, config.jwt_ttl);
    Self { db, config, jwt }
  }
}
