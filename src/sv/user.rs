use serde::Deserialize;

use crate::{entity::user, prelude::*, sv::auth};

pub struct User<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
  pub name: String,
  pub username: String,
  pub email: String,
  pub password: String,
  #[serde(default)]
  pub is_admin: bool,
}

impl<'a> User<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(&self, new: NewUser) -> Result<user::Model> {
    if new.username.trim().is_empty() || new.password.is_empty() {
      return Err(Error::InvalidArgs(
        "Username and password are required".into(),
      ));
    }

    let taken = user::Entity::find()
      .filter(
        user::Column::Username
          .eq(new.username.as_str())
          .or(user::Column::Email.eq(new.email.as_str())),
      )
      .one(self.db)
      .await?;

    if taken.is_some() {
      return Err(Error::UserExists);
    }

    let user = user::ActiveModel {
      id: Set(Uuid::new_v4()),
      name: Set(new.name),
      username: Set(new.username),
      email: Set(new.email),
      password_hash: Set(auth::hash_password(&new.password)?),
      is_active: Set(true),
      is_admin: Set(new.is_admin),
      created_at: Set(Utc::now().naive_utc()),
    };

    Ok(user.insert(self.db).await?)
  }

  pub async fn by_id(&self, id: Uuid) -> Result<Option<user::Model>> {
    Ok(user::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn by_username(
    &self,
    username: &str,
  ) -> Result<Option<user::Model>> {
    Ok(
      user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(self.db)
        .await?,
    )
  }

  pub async fn authenticate(
    &self,
    username: &str,
    password: &str,
  ) -> Result<user::Model> {
    let user =
      self.by_username(username).await?.ok_or(Error::BadCredentials)?;

    if !auth::verify_password(password, &user.password_hash) {
      return Err(Error::BadCredentials);
    }

    if !user.is_active {
      return Err(Error::InactiveUser);
    }

    Ok(user)
  }

  pub async fn set_active(&self, id: Uuid, active: bool) -> Result<()> {
    let user = user::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    user::ActiveModel { is_active: Set(active), ..user.into() }
      .update(self.db)
      .await?;

    Ok(())
  }

  pub async fn all(&self) -> Result<Vec<user::Model>> {
    Ok(
      user::Entity::find()
        .order_by_asc(user::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }

  /// Create the configured administrator unless the username exists.
  pub async fn ensure_admin(
    &self,
    username: &str,
    email: &str,
    password: &str,
  ) -> Result<user::Model> {
    if let Some(user) = self.by_username(username).await? {
      return Ok(user);
    }

    info!("Creating administrator `{username}`");
    self
      .create(NewUser {
        name: username.into(),
        username: username.into(),
        email: email.into(),
        password: password.into(),
        is_admin: true,
      })
      .await
  }
}
