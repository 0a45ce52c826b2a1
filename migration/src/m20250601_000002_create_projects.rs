use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Projects::Table)
          .if_not_exists()
          .col(ColumnDef::new(Projects::Id).uuid().not_null().primary_key())
          .col(ColumnDef::new(Projects::Name).string().not_null())
          .col(ColumnDef::new(Projects::Description).text().null())
          .col(
            ColumnDef::new(Projects::Status)
              .string()
              .not_null()
              .default("active"),
          )
          .col(ColumnDef::new(Projects::OwnerId).uuid().not_null())
          .col(ColumnDef::new(Projects::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Projects::UpdatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_projects_owner")
              .from(Projects::Table, Projects::OwnerId)
              .to(Users::Table, Users::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_projects_owner")
          .table(Projects::Table)
          .col(Projects::OwnerId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Projects::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Projects {
  Table,
  Id,
  Name,
  Description,
  Status,
  OwnerId,
  CreatedAt,
  UpdatedAt,
}
