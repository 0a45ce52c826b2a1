use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::{Deserialize, Serialize};

use super::auth::{AdminUser, CurrentUser};
use crate::{
  entity::{partner, project, user},
  prelude::*,
  state::AppState,
  sv::{
    self,
    link::{GeneratedLink, LinkRequest},
    partner::{PartnerCreate, PartnerUpdate},
    project::{ProjectCreate, ProjectUpdate},
    user::NewUser,
  },
};

type App = State<Arc<AppState>>;

#[derive(Serialize)]
pub struct Message {
  message: String,
}

impl Message {
  fn new(message: impl Into<String>) -> Json<Self> {
    Json(Self { message: message.into() })
  }
}

pub async fn health() -> &'static str {
  "OK"
}

#[derive(Deserialize)]
pub struct LoginReq {
  username: String,
  password: String,
}

#[derive(Serialize)]
pub struct Token {
  access_token: String,
  token_type: &'static str,
}

pub async fn login(
  State(app): App,
  Json(req): Json<LoginReq>,
) -> Result<Json<Token>> {
  let user =
    sv::User::new(&app.db).authenticate(&req.username, &req.password).await?;
  let access_token = app.jwt.issue(user.id)?;

  info!("User `{}` logged in", user.username);
  Ok(Json(Token { access_token, token_type: "bearer" }))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<user::Model> {
  Json(user)
}

pub async fn list_users(
  State(app): App,
  _: AdminUser,
) -> Result<Json<Vec<user::Model>>> {
  Ok(Json(sv::User::new(&app.db).all().await?))
}

pub async fn create_user(
  State(app): App,
  AdminUser(admin): AdminUser,
  Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<user::Model>)> {
  let user = sv::User::new(&app.db).create(req).await?;
  info!("`{}` created user `{}`", admin.username, user.username);
  Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Deserialize)]
pub struct ActiveReq {
  active: bool,
}

pub async fn set_user_active(
  State(app): App,
  AdminUser(admin): AdminUser,
  Path(id): Path<Uuid>,
  Json(req): Json<ActiveReq>,
) -> Result<Json<Message>> {
  if admin.id == id && !req.active {
    return Err(Error::InvalidArgs("Cannot deactivate yourself".into()));
  }

  sv::User::new(&app.db).set_active(id, req.active).await?;
  Ok(Message::new(if req.active {
    "User activated"
  } else {
    "User deactivated"
  }))
}

pub async fn list_projects(
  State(app): App,
  CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<project::Model>>> {
  Ok(Json(sv::Project::new(&app.db).accessible(&user).await?))
}

pub async fn create_project(
  State(app): App,
  CurrentUser(user): CurrentUser,
  Json(req): Json<ProjectCreate>,
) -> Result<(StatusCode, Json<project::Model>)> {
  let project = sv::Project::new(&app.db).create(&user, req).await?;
  Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
  State(app): App,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<project::Model>> {
  Ok(Json(sv::Project::new(&app.db).owned(id, &user).await?))
}

pub async fn update_project(
  State(app): App,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
  Json(req): Json<ProjectUpdate>,
) -> Result<Json<project::Model>> {
  let projects = sv::Project::new(&app.db);
  let project = projects.owned(id, &user).await?;
  Ok(Json(projects.update(project, req).await?))
}

pub async fn delete_project(
  State(app): App,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Message>> {
  let projects = sv::Project::new(&app.db);
  projects.owned(id, &user).await?;
  projects.delete(id).await?;
  Ok(Message::new("Project deleted successfully"))
}

pub async fn partners_by_project(
  State(app): App,
  _: CurrentUser,
  Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<partner::Model>>> {
  sv::Project::new(&app.db)
    .by_id(project_id)
    .await?
    .ok_or(Error::ProjectNotFound)?;

  Ok(Json(sv::Partner::new(&app.db).by_project(project_id).await?))
}

pub async fn get_partner(
  State(app): App,
  _: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<partner::Model>> {
  let partner =
    sv::Partner::new(&app.db).by_id(id).await?.ok_or(Error::PartnerNotFound)?;
  Ok(Json(partner))
}

pub async fn create_partner(
  State(app): App,
  CurrentUser(user): CurrentUser,
  Json(req): Json<PartnerCreate>,
) -> Result<(StatusCode, Json<partner::Model>)> {
  sv::Project::new(&app.db).owned(req.project_id, &user).await?;
  let partner = sv::Partner::new(&app.db).create(req).await?;
  Ok((StatusCode::CREATED, Json(partner)))
}

pub async fn update_partner(
  State(app): App,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
  Json(req): Json<PartnerUpdate>,
) -> Result<Json<partner::Model>> {
  let partners = sv::Partner::new(&app.db);
  let (partner, project) = partners.with_project(id).await?;
  sv::project::check_owner(&project, &user)?;
  Ok(Json(partners.update(partner, req).await?))
}

pub async fn delete_partner(
  State(app): App,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Message>> {
  let partners = sv::Partner::new(&app.db);
  let (partner, project) = partners.with_project(id).await?;
  sv::project::check_owner(&project, &user)?;
  partners.delete(partner.id).await?;
  Ok(Message::new("Casa parceira deleted successfully"))
}

pub async fn generate_link(
  State(app): App,
  CurrentUser(user): CurrentUser,
  Path(id): Path<Uuid>,
  Json(req): Json<LinkRequest>,
) -> Result<Json<GeneratedLink>> {
  let partners = sv::Partner::new(&app.db);
  let (partner, project) = partners.with_project(id).await?;
  sv::project::check_owner(&project, &user)?;
  Ok(Json(partners.generate_link(&partner, &req).await?))
}

pub async fn generate_link_public(
  State(app): App,
  Path(slug): Path<String>,
  Json(req): Json<LinkRequest>,
) -> Result<Json<GeneratedLink>> {
  let partners = sv::Partner::new(&app.db);
  let partner = partners.by_slug(&slug).await?.ok_or(Error::PartnerNotFound)?;
  Ok(Json(partners.generate_link(&partner, &req).await?))
}
