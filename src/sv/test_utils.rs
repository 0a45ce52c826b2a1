//! Shared test utilities for database setup

#[cfg(test)]
pub mod test_db {
  use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema,
  };

  use crate::entity::*;

  /// Creates an in-memory SQLite database with all required tables
  pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(user::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(project::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(partner::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }
}

#[cfg(test)]
pub mod fixtures {
  use sea_orm::DatabaseConnection;

  use crate::{
    entity::{partner, project, user},
    sv,
  };

  pub async fn user(db: &DatabaseConnection, username: &str) -> user::Model {
    sv::User::new(db)
      .create(sv::user::NewUser {
        name: username.to_uppercase(),
        username: username.into(),
        email: format!("{username}@squad.test"),
        password: "password".into(),
        is_admin: false,
      })
      .await
      .unwrap()
  }

  pub async fn admin(db: &DatabaseConnection) -> user::Model {
    sv::User::new(db)
      .create(sv::user::NewUser {
        name: "Admin".into(),
        username: "admin".into(),
        email: "admin@squad.test".into(),
        password: "password".into(),
        is_admin: true,
      })
      .await
      .unwrap()
  }

  pub async fn project(
    db: &DatabaseConnection,
    owner: &user::Model,
    name: &str,
  ) -> project::Model {
    sv::Project::new(db)
      .create(
        owner,
        sv::project::ProjectCreate {
          name: name.into(),
          description: None,
          status: None,
        },
      )
      .await
      .unwrap()
  }

  pub fn partner_create(
    project: &project::Model,
    slug: &str,
  ) -> sv::partner::PartnerCreate {
    sv::partner::PartnerCreate {
      name: slug.to_uppercase(),
      slug: slug.into(),
      logo_url: None,
      link_base: "https://example.com/ref?x=1".into(),
      affiliate_code: None,
      utm_source: None,
      utm_medium: None,
      utm_campaign: None,
      channel_config: None,
      active: true,
      project_id: project.id,
    }
  }

  pub async fn partner(
    db: &DatabaseConnection,
    project: &project::Model,
    slug: &str,
  ) -> partner::Model {
    sv::Partner::new(db).create(partner_create(project, slug)).await.unwrap()
  }
}
