use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::project;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: Uuid,
  pub name: String,
  #[sea_orm(unique)]
  pub username: String,
  #[sea_orm(unique)]
  pub email: String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub is_active: bool,
  pub is_admin: bool,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "project::Entity")]
  Projects,
}

impl Related<project::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Projects.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
