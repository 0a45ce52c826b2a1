use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{partner, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: Uuid,
  pub name: String,
  #[sea_orm(column_type = "Text", nullable)]
  pub description: Option<String>,
  pub status: String,
  pub owner_id: Uuid,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

impl Model {
  /// Campaign name used when a partner has no explicit `utm_campaign`.
  pub fn campaign_slug(&self) -> String {
    self.name.to_lowercase().replace(' ', "_")
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "user::Entity",
    from = "Column::OwnerId",
    to = "user::Column::Id"
  )]
  Owner,
  #[sea_orm(has_many = "partner::Entity")]
  Partners,
}

impl Related<user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Owner.def()
  }
}

impl Related<partner::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Partners.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
