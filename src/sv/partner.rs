use sea_orm::{DbErr, SqlErr};
use serde::Deserialize;

use crate::{
  entity::{ChannelConfig, partner, project},
  prelude::*,
  sv::link::{self, GeneratedLink, LinkRequest},
  utils,
};

pub struct Partner<'a> {
  db: &'a DatabaseConnection,
}

#[derive(Debug, Deserialize)]
pub struct PartnerCreate {
  pub name: String,
  pub slug: String,
  #[serde(default)]
  pub logo_url: Option<String>,
  pub link_base: String,
  #[serde(default)]
  pub affiliate_code: Option<String>,
  #[serde(default)]
  pub utm_source: Option<String>,
  #[serde(default)]
  pub utm_medium: Option<String>,
  #[serde(default)]
  pub utm_campaign: Option<String>,
  #[serde(default)]
  pub channel_config: Option<ChannelConfig>,
  #[serde(default = "default_active")]
  pub active: bool,
  pub project_id: Uuid,
}

fn default_active() -> bool {
  true
}

/// A concurrent write can take the slug after `ensure_slug_free` passed.
fn slug_conflict(err: DbErr) -> Error {
  match err.sql_err() {
    Some(SqlErr::UniqueConstraintViolation(_)) => Error::SlugTaken,
    _ => Error::Db(err),
  }
}

/// Partial update; `null` clears a nullable field.
#[derive(Debug, Default, Deserialize)]
pub struct PartnerUpdate {
  pub name: Option<String>,
  pub slug: Option<String>,
  #[serde(default, deserialize_with = "utils::double_option")]
  pub logo_url: Option<Option<String>>,
  pub link_base: Option<String>,
  #[serde(default, deserialize_with = "utils::double_option")]
  pub affiliate_code: Option<Option<String>>,
  #[serde(default, deserialize_with = "utils::double_option")]
  pub utm_source: Option<Option<String>>,
  #[serde(default, deserialize_with = "utils::double_option")]
  pub utm_medium: Option<Option<String>>,
  #[serde(default, deserialize_with = "utils::double_option")]
  pub utm_campaign: Option<Option<String>>,
  #[serde(default, deserialize_with = "utils::double_option")]
  pub channel_config: Option<Option<ChannelConfig>>,
  pub active: Option<bool>,
}

impl<'a> Partner<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Active partners of a project.
  pub async fn by_project(
    &self,
    project_id: Uuid,
  ) -> Result<Vec<partner::Model>> {
    Ok(
      partner::Entity::find()
        .filter(partner::Column::ProjectId.eq(project_id))
        .filter(partner::Column::Active.eq(true))
        .order_by_asc(partner::Column::Name)
        .all(self.db)
        .await?,
    )
  }

  pub async fn by_id(&self, id: Uuid) -> Result<Option<partner::Model>> {
    Ok(partner::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn by_slug(&self, slug: &str) -> Result<Option<partner::Model>> {
    Ok(
      partner::Entity::find()
        .filter(partner::Column::Slug.eq(slug))
        .one(self.db)
        .await?,
    )
  }

  pub async fn with_project(
    &self,
    id: Uuid,
  ) -> Result<(partner::Model, project::Model)> {
    let (partner, project) = partner::Entity::find_by_id(id)
      .find_also_related(project::Entity)
      .one(self.db)
      .await?
      .ok_or(Error::PartnerNotFound)?;

    let project = project.ok_or(Error::ProjectNotFound)?;
    Ok((partner, project))
  }

  async fn ensure_slug_free(&self, slug: &str) -> Result<()> {
    utils::validate_slug(slug)?;
    if self.by_slug(slug).await?.is_some() {
      return Err(Error::SlugTaken);
    }
    Ok(())
  }

  pub async fn create(&self, new: PartnerCreate) -> Result<partner::Model> {
    project::Entity::find_by_id(new.project_id)
      .one(self.db)
      .await?
      .ok_or(Error::ProjectNotFound)?;

    self.ensure_slug_free(&new.slug).await?;
    utils::validate_link_base(&new.link_base)?;

    let now = Utc::now().naive_utc();
    let partner = partner::ActiveModel {
      id: Set(Uuid::new_v4()),
      name: Set(new.name),
      slug: Set(new.slug),
      logo_url: Set(new.logo_url),
      link_base: Set(new.link_base.trim().to_owned()),
      affiliate_code: Set(new.affiliate_code),
      utm_source: Set(new.utm_source),
      utm_medium: Set(new.utm_medium),
      utm_campaign: Set(new.utm_campaign),
      channel_config: Set(new.channel_config),
      active: Set(new.active),
      project_id: Set(new.project_id),
      created_at: Set(now),
      updated_at: Set(now),
    };

    let partner = partner.insert(self.db).await.map_err(slug_conflict)?;
    info!("Created casa parceira `{}` ({})", partner.slug, partner.id);
    Ok(partner)
  }

  pub async fn update(
    &self,
    partner: partner::Model,
    update: PartnerUpdate,
  ) -> Result<partner::Model> {
    if let Some(slug) = &update.slug
      && *slug != partner.slug
    {
      self.ensure_slug_free(slug).await?;
    }
    if let Some(link_base) = &update.link_base {
      utils::validate_link_base(link_base)?;
    }

    let mut active: partner::ActiveModel = partner.into();

    if let Some(name) = update.name {
      active.name = Set(name);
    }
    if let Some(slug) = update.slug {
      active.slug = Set(slug);
    }
    if let Some(logo_url) = update.logo_url {
      active.logo_url = Set(logo_url);
    }
    if let Some(link_base) = update.link_base {
      active.link_base = Set(link_base.trim().to_owned());
    }
    if let Some(affiliate_code) = update.affiliate_code {
      active.affiliate_code = Set(affiliate_code);
    }
    if let Some(utm_source) = update.utm_source {
      active.utm_source = Set(utm_source);
    }
    if let Some(utm_medium) = update.utm_medium {
      active.utm_medium = Set(utm_medium);
    }
    if let Some(utm_campaign) = update.utm_campaign {
      active.utm_campaign = Set(utm_campaign);
    }
    if let Some(channel_config) = update.channel_config {
      active.channel_config = Set(channel_config);
    }
    if let Some(is_active) = update.active {
      active.active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().naive_utc());

    active.update(self.db).await.map_err(slug_conflict)
  }

  pub async fn delete(&self, id: Uuid) -> Result<()> {
    let result = partner::Entity::delete_by_id(id).exec(self.db).await?;
    if result.rows_affected == 0 {
      return Err(Error::PartnerNotFound);
    }
    Ok(())
  }

  /// Tracked link for an active partner.
  pub async fn generate_link(
    &self,
    partner: &partner::Model,
    req: &LinkRequest,
  ) -> Result<GeneratedLink> {
    if !partner.active {
      return Err(Error::PartnerInactive);
    }

    let project = project::Entity::find_by_id(partner.project_id)
      .one(self.db)
      .await?
      .ok_or(Error::ProjectNotFound)?;

    let link = link::resolve(partner, &project.campaign_slug(), req)?;
    debug!(
      slug = %partner.slug,
      channel = %req.channel,
      "generated link {}",
      link.final_link
    );
    Ok(link)
  }
}
