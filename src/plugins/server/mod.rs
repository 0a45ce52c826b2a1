mod auth;
mod handlers;

use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use axum::{
  Router,
  routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

fn api() -> Router<Arc<AppState>> {
  Router::new()
    .route("/auth/login", post(handlers::login))
    .route("/auth/me", get(handlers::me))
    .route("/users", get(handlers::list_users).post(handlers::create_user))
    .route("/users/{id}/active", put(handlers::set_user_active))
    .route(
      "/projects",
      get(handlers::list_projects).post(handlers::create_project),
    )
    .route(
      "/projects/{id}",
      get(handlers::get_project)
        .put(handlers::update_project)
        .delete(handlers::delete_project),
    )
    .route("/casas-parceiras", post(handlers::create_partner))
    .route(
      "/casas-parceiras/projeto/{project_id}",
      get(handlers::partners_by_project),
    )
    .route(
      "/casas-parceiras/{id}",
      get(handlers::get_partner)
        .put(handlers::update_partner)
        .delete(handlers::delete_partner),
    )
    .route(
      "/casas-parceiras/{id}/generate-link",
      post(handlers::generate_link),
    )
    .route(
      "/casas-parceiras/public/{slug}/generate-link",
      post(handlers::generate_link_public),
    )
}

/// Application routes without the rate limiter, which needs peer addresses.
pub fn router(app: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    .nest("/api/v1", api())
    .layer(
      ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
          .allow_origin(Any)
          .allow_methods(Any)
          .allow_headers(Any),
      ),
    )
    .with_state(app)
}

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(100)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let governor_limiter = governor_conf.limiter().clone();

    tokio::spawn(async move {
      loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        governor_limiter.retain_recent();
      }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));
    let router = router(app)
      .layer(GovernorLayer::new(governor_conf))
      .into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("HTTP Server listening on {addr}");

    tokio::spawn(async move {
      if let Err(err) = axum::serve(listener, router).await {
        tracing::error!("HTTP server stopped: {err}");
      }
    });

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
  };
  use serde_json::{Value, json};
  use tower::ServiceExt;

  use super::*;
  use crate::{
    config::Config,
    entity::user,
    sv::test_utils::{fixtures, test_db},
  };

  async fn setup() -> Arc<AppState> {
    let config = Config {
      database_url: "sqlite::memory:".into(),
      jwt_secret: "test_secret".into(),
      jwt_ttl: Duration::from_secs(3600),
      port: 0,
      admin: None,
    };
    Arc::new(AppState::with_db(test_db::setup().await, config))
  }

  fn token(app: &AppState, user: &user::Model) -> String {
    app.jwt.issue(user.id).unwrap()
  }

  async fn call(
    app: &Arc<AppState>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> Response {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(body) => req
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string())),
      None => req.body(Body::empty()),
    }
    .unwrap();

    router(app.clone()).oneshot(req).await.unwrap()
  }

  async fn body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn test_health() {
    let app = setup().await;
    let response = call(&app, "GET", "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn test_login_and_me() {
    let app = setup().await;
    fixtures::user(&app.db, "ana").await;

    let response = call(
      &app,
      "POST",
      "/api/v1/auth/login",
      None,
      Some(json!({ "username": "ana", "password": "password" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let login = body(response).await;
    assert_eq!(login["token_type"], "bearer");

    let token = login["access_token"].as_str().unwrap();
    let response =
      call(&app, "GET", "/api/v1/auth/me", Some(token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body(response).await;
    assert_eq!(me["username"], "ana");
    assert!(me.get("password_hash").is_none());
  }

  #[tokio::test]
  async fn test_wrong_password() {
    let app = setup().await;
    fixtures::user(&app.db, "ana").await;

    let response = call(
      &app,
      "POST",
      "/api/v1/auth/login",
      None,
      Some(json!({ "username": "ana", "password": "nope" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn test_requires_token() {
    let app = setup().await;

    let response = call(&app, "GET", "/api/v1/projects", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response =
      call(&app, "GET", "/api/v1/projects", Some("garbage"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn test_users_admin_only() {
    let app = setup().await;
    let ana = fixtures::user(&app.db, "ana").await;
    let admin = fixtures::admin(&app.db).await;
    let new_user = json!({
      "name": "Bia",
      "username": "bia",
      "email": "bia@squad.test",
      "password": "pw"
    });

    let response = call(
      &app,
      "POST",
      "/api/v1/users",
      Some(&token(&app, &ana)),
      Some(new_user.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = call(
      &app,
      "POST",
      "/api/v1/users",
      Some(&token(&app, &admin)),
      Some(new_user),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
  }

  #[tokio::test]
  async fn test_deactivated_user_is_locked_out() {
    let app = setup().await;
    let ana = fixtures::user(&app.db, "ana").await;
    let admin = fixtures::admin(&app.db).await;
    let ana_token = token(&app, &ana);

    let uri = format!("/api/v1/users/{}/active", ana.id);
    let response = call(
      &app,
      "PUT",
      &uri,
      Some(&token(&app, &admin)),
      Some(json!({ "active": false })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response =
      call(&app, "GET", "/api/v1/auth/me", Some(&ana_token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(response).await["detail"], "Inactive user");
  }

  #[tokio::test]
  async fn test_partner_crud_and_permissions() {
    let app = setup().await;
    let ana = fixtures::user(&app.db, "ana").await;
    let bia = fixtures::user(&app.db, "bia").await;
    let project = fixtures::project(&app.db, &ana, "Copa").await;
    let ana_token = token(&app, &ana);
    let bia_token = token(&app, &bia);

    let new_partner = json!({
      "name": "Bet365",
      "slug": "bet365",
      "link_base": "https://example.com/ref?x=1",
      "project_id": project.id,
      "channel_config": { "general": { "utm_content": "geral" } }
    });

    let response = call(
      &app,
      "POST",
      "/api/v1/casas-parceiras",
      Some(&bia_token),
      Some(new_partner.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = call(
      &app,
      "POST",
      "/api/v1/casas-parceiras",
      Some(&ana_token),
      Some(new_partner.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body(response).await;
    let id = created["id"].as_str().unwrap().to_owned();
    assert_eq!(created["channel_config"]["general"]["utm_content"], "geral");

    let response = call(
      &app,
      "POST",
      "/api/v1/casas-parceiras",
      Some(&ana_token),
      Some(new_partner),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(response).await["detail"], "Slug already exists");

    let uri = format!("/api/v1/casas-parceiras/projeto/{}", project.id);
    let response = call(&app, "GET", &uri, Some(&bia_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(response).await.as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/casas-parceiras/{id}");
    let response = call(
      &app,
      "PUT",
      &uri,
      Some(&bia_token),
      Some(json!({ "active": false })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = call(
      &app,
      "PUT",
      &uri,
      Some(&ana_token),
      Some(json!({ "affiliate_code": "ABC" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(response).await["affiliate_code"], "ABC");

    let response = call(&app, "DELETE", &uri, Some(&ana_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = call(&app, "GET", &uri, Some(&ana_token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(response).await["detail"], "Casa parceira not found");
  }

  #[tokio::test]
  async fn test_rejects_malformed_channel_config() {
    let app = setup().await;
    let ana = fixtures::user(&app.db, "ana").await;
    let project = fixtures::project(&app.db, &ana, "Copa").await;

    let response = call(
      &app,
      "POST",
      "/api/v1/casas-parceiras",
      Some(&token(&app, &ana)),
      Some(json!({
        "name": "Bet365",
        "slug": "bet365",
        "link_base": "https://example.com/ref",
        "project_id": project.id,
        "channel_config": { "instagram": { "utm_content": "flat" } }
      })),
    )
    .await;
    assert!(response.status().is_client_error());
  }

  #[tokio::test]
  async fn test_accepts_null_channel_entries() {
    let app = setup().await;
    let ana = fixtures::user(&app.db, "ana").await;
    let project = fixtures::project(&app.db, &ana, "Copa").await;
    let token = token(&app, &ana);

    let response = call(
      &app,
      "POST",
      "/api/v1/casas-parceiras",
      Some(&token),
      Some(json!({
        "name": "Bet365",
        "slug": "bet365",
        "link_base": "https://example.com/ref",
        "project_id": project.id,
        "channel_config": {
          "general": { "utm_content": "geral" },
          "instagram": null
        }
      })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body(response).await;
    assert_eq!(created["channel_config"]["general"]["utm_content"], "geral");

    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/v1/casas-parceiras/{id}");
    let response = call(
      &app,
      "PUT",
      &uri,
      Some(&token),
      Some(json!({
        "channel_config": {
          "instagram": {
            "close_friends": { "utm_term": "vip" },
            "normal": null
          }
        }
      })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body(response).await;
    assert_eq!(
      updated["channel_config"]["instagram"]["close_friends"]["utm_term"],
      "vip"
    );
    assert!(updated["channel_config"]["instagram"].get("normal").is_none());
  }

  #[tokio::test]
  async fn test_generate_link_authenticated() {
    let app = setup().await;
    let ana = fixtures::user(&app.db, "ana").await;
    let bia = fixtures::user(&app.db, "bia").await;
    let admin = fixtures::admin(&app.db).await;
    let project = fixtures::project(&app.db, &ana, "Copa do Mundo").await;
    let partner = fixtures::partner(&app.db, &project, "bet365").await;

    let uri = format!("/api/v1/casas-parceiras/{}/generate-link", partner.id);
    let req = json!({ "channel": "general" });

    let response =
      call(&app, "POST", &uri, Some(&token(&app, &bia)), Some(req.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response =
      call(&app, "POST", &uri, Some(&token(&app, &admin)), Some(req.clone()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response =
      call(&app, "POST", &uri, Some(&token(&app, &ana)), Some(req)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let link = body(response).await;
    assert_eq!(
      link["utm_params"],
      json!({
        "utm_source": "bet365",
        "utm_medium": "affiliate",
        "utm_campaign": "copa_do_mundo"
      })
    );
    assert!(link["final_link"].as_str().unwrap().contains("x=1"));

    let uri =
      format!("/api/v1/casas-parceiras/{}/generate-link", Uuid::new_v4());
    let response = call(
      &app,
      "POST",
      &uri,
      Some(&token(&app, &ana)),
      Some(json!({ "channel": "general" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn test_generate_link_public() {
    let app = setup().await;
    let ana = fixtures::user(&app.db, "ana").await;
    let project = fixtures::project(&app.db, &ana, "Copa").await;
    let partner = fixtures::partner(&app.db, &project, "bet365").await;

    let response = call(
      &app,
      "POST",
      "/api/v1/casas-parceiras/public/bet365/generate-link",
      None,
      Some(json!({ "channel": "general", "override_utm_content": "manual" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(response).await["utm_params"]["utm_content"], "manual");

    let response = call(
      &app,
      "POST",
      "/api/v1/casas-parceiras/public/unknown/generate-link",
      None,
      Some(json!({ "channel": "general" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    crate::sv::Partner::new(&app.db)
      .update(
        partner,
        crate::sv::partner::PartnerUpdate {
          active: Some(false),
          ..Default::default()
        },
      )
      .await
      .unwrap();

    let response = call(
      &app,
      "POST",
      "/api/v1/casas-parceiras/public/bet365/generate-link",
      None,
      Some(json!({ "channel": "general" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(response).await["detail"], "Casa parceira is not active");
  }

  #[tokio::test]
  async fn test_project_lifecycle() {
    let app = setup().await;
    let ana = fixtures::user(&app.db, "ana").await;
    let bia = fixtures::user(&app.db, "bia").await;
    let ana_token = token(&app, &ana);

    let response = call(
      &app,
      "POST",
      "/api/v1/projects",
      Some(&ana_token),
      Some(json!({ "name": "Copa" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body(response).await["id"].as_str().unwrap().to_owned();
    let uri = format!("/api/v1/projects/{id}");

    let response =
      call(&app, "GET", &uri, Some(&token(&app, &bia)), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = call(
      &app,
      "PUT",
      &uri,
      Some(&ana_token),
      Some(json!({ "status": "paused" })),
    )
    .await;
    assert_eq!(body(response).await["status"], "paused");

    let response = call(&app, "DELETE", &uri, Some(&ana_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = call(&app, "GET", &uri, Some(&ana_token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
  }
}
