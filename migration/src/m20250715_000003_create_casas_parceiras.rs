use sea_orm_migration::prelude::*;

use super::m20250601_000002_create_projects::Projects;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(CasasParceiras::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(CasasParceiras::Id).uuid().not_null().primary_key(),
          )
          .col(ColumnDef::new(CasasParceiras::Name).string().not_null())
          .col(ColumnDef::new(CasasParceiras::Slug).string().not_null())
          .col(ColumnDef::new(CasasParceiras::LogoUrl).string().null())
          .col(ColumnDef::new(CasasParceiras::LinkBase).string().not_null())
          .col(ColumnDef::new(CasasParceiras::AffiliateCode).string().null())
          .col(ColumnDef::new(CasasParceiras::UtmSource).string().null())
          .col(ColumnDef::new(CasasParceiras::UtmMedium).string().null())
          .col(ColumnDef::new(CasasParceiras::UtmCampaign).string().null())
          .col(ColumnDef::new(CasasParceiras::ChannelConfig).json().null())
          .col(
            ColumnDef::new(CasasParceiras::Active)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(CasasParceiras::ProjectId).uuid().not_null())
          .col(ColumnDef::new(CasasParceiras::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(CasasParceiras::UpdatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_casas_parceiras_project")
              .from(CasasParceiras::Table, CasasParceiras::ProjectId)
              .to(Projects::Table, Projects::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    // Slugs appear in public URLs
    manager
      .create_index(
        Index::create()
          .name("idx_casas_parceiras_slug")
          .table(CasasParceiras::Table)
          .col(CasasParceiras::Slug)
          .unique()
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_casas_parceiras_project")
          .table(CasasParceiras::Table)
          .col(CasasParceiras::ProjectId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(CasasParceiras::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum CasasParceiras {
  Table,
  Id,
  Name,
  Slug,
  LogoUrl,
  LinkBase,
  AffiliateCode,
  UtmSource,
  UtmMedium,
  UtmCampaign,
  ChannelConfig,
  Active,
  ProjectId,
  CreatedAt,
  UpdatedAt,
}
