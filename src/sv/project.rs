use serde::Deserialize;

use crate::{
  entity::{partner, project, user},
  prelude::*,
};

pub struct Project<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Deserialize)]
pub struct ProjectCreate {
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectUpdate {
  pub name: Option<String>,
  #[serde(default, deserialize_with = "crate::utils::double_option")]
  pub description: Option<Option<String>>,
  pub status: Option<String>,
}

/// Owners and administrators may manage a project.
pub fn check_owner(project: &project::Model, user: &user::Model) -> Result<()> {
  if project.owner_id == user.id || user.is_admin {
    Ok(())
  } else {
    Err(Error::Forbidden)
  }
}

impl<'a> Project<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(
    &self,
    owner: &user::Model,
    new: ProjectCreate,
  ) -> Result<project::Model> {
    if new.name.trim().is_empty() {
      return Err(Error::InvalidArgs("Project name is required".into()));
    }

    let now = Utc::now().naive_utc();
    let project = project::ActiveModel {
      id: Set(Uuid::new_v4()),
      name: Set(new.name),
      description: Set(new.description),
      status: Set(new.status.unwrap_or_else(|| "active".into())),
      owner_id: Set(owner.id),
      created_at: Set(now),
      updated_at: Set(now),
    };

    Ok(project.insert(self.db).await?)
  }

  pub async fn by_id(&self, id: Uuid) -> Result<Option<project::Model>> {
    Ok(project::Entity::find_by_id(id).one(self.db).await?)
  }

  /// Project the user may manage, or the matching error.
  pub async fn owned(
    &self,
    id: Uuid,
    user: &user::Model,
  ) -> Result<project::Model> {
    let project = self.by_id(id).await?.ok_or(Error::ProjectNotFound)?;
    check_owner(&project, user)?;
    Ok(project)
  }

  pub async fn accessible(
    &self,
    user: &user::Model,
  ) -> Result<Vec<project::Model>> {
    let mut query = project::Entity::find();
    if !user.is_admin {
      query = query.filter(project::Column::OwnerId.eq(user.id));
    }

    Ok(query.order_by_asc(project::Column::CreatedAt).all(self.db).await?)
  }

  pub async fn update(
    &self,
    project: project::Model,
    update: ProjectUpdate,
  ) -> Result<project::Model> {
    let mut active: project::ActiveModel = project.into();

    if let Some(name) = update.name {
      if name.trim().is_empty() {
        return Err(Error::InvalidArgs("Project name is required".into()));
      }
      active.name = Set(name);
    }
    if let Some(description) = update.description {
      active.description = Set(description);
    }
    if let Some(status) = update.status {
      active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().naive_utc());

    Ok(active.update(self.db).await?)
  }

  /// Delete a project together with its partners.
  pub async fn delete(&self, id: Uuid) -> Result<()> {
    let txn = self.db.begin().await?;

    let partners = partner::Entity::delete_many()
      .filter(partner::Column::ProjectId.eq(id))
      .exec(&txn)
      .await?;

    let result = project::Entity::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
      return Err(Error::ProjectNotFound);
    }

    txn.commit().await?;
    debug!("Deleted project {id} with {} partners", partners.rows_affected);
    Ok(())
  }
}
