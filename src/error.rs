use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Db(#[from] DbErr),
  #[error("User not found")]
  UserNotFound,
  #[error("Project not found")]
  ProjectNotFound,
  #[error("Casa parceira not found")]
  PartnerNotFound,
  #[error("Casa parceira is not active")]
  PartnerInactive,
  #[error("Slug already exists")]
  SlugTaken,
  #[error("Username or email already registered")]
  UserExists,
  #[error("Incorrect username or password")]
  BadCredentials,
  #[error("Could not validate credentials")]
  Unauthorized,
  #[error("Inactive user")]
  InactiveUser,
  #[error("Not enough permissions")]
  Forbidden,
  #[error("{0}")]
  InvalidArgs(String),
  #[error("Invalid URL: {0}")]
  InvalidUrl(String),
  #[error("Malformed link base: {0}")]
  MalformedLink(#[from] url::ParseError),
  #[error("Internal error: {0}")]
  Internal(String),
}

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Error::UserNotFound | Error::ProjectNotFound | Error::PartnerNotFound => {
        StatusCode::NOT_FOUND
      }
      Error::PartnerInactive
      | Error::SlugTaken
      | Error::UserExists
      | Error::InactiveUser
      | Error::InvalidArgs(_)
      | Error::InvalidUrl(_) => StatusCode::BAD_REQUEST,
      Error::BadCredentials | Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::Forbidden => StatusCode::FORBIDDEN,
      Error::Db(_) | Error::MalformedLink(_) | Error::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

#[derive(Serialize)]
struct Detail {
  detail: String,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!("{self}");
    }

    let mut response =
      (status, Json(Detail { detail: self.to_string() })).into_response();
    if status == StatusCode::UNAUTHORIZED {
      response.headers_mut().insert(
        axum::http::header::WWW_AUTHENTICATE,
        axum::http::HeaderValue::from_static("Bearer"),
      );
    }
    response
  }
}
