use axum::{
  extract::FromRequestParts,
  http::{header::AUTHORIZATION, request::Parts},
};

use crate::{entity::user, prelude::*, state::AppState, sv};

/// Active user resolved from the `Authorization: Bearer` header.
pub struct CurrentUser(pub user::Model);

/// Same as [`CurrentUser`] but only admits administrators.
pub struct AdminUser(pub user::Model);

fn bearer(parts: &Parts) -> Option<&str> {
  let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  scheme.eq_ignore_ascii_case("bearer").then_some(token.trim())
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    app: &Arc<AppState>,
  ) -> Result<Self> {
    let token = bearer(parts).ok_or(Error::Unauthorized)?;
    let user_id = app.jwt.verify(token)?;

    let user =
      sv::User::new(&app.db).by_id(user_id).await?.ok_or(Error::Unauthorized)?;

    if !user.is_active {
      return Err(Error::InactiveUser);
    }

    Ok(Self(user))
  }
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    app: &Arc<AppState>,
  ) -> Result<Self> {
    let CurrentUser(user) = CurrentUser::from_request_parts(parts, app).await?;
    if !user.is_admin {
      return Err(Error::Forbidden);
    }
    Ok(Self(user))
  }
}
