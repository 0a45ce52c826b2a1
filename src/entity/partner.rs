//! Casa parceira: an affiliate partner with a base outbound link and the
//! UTM configuration used to build tracked links for it.

use std::collections::BTreeMap;

use sea_orm::{FromJsonQueryResult, entity::prelude::*};
use serde::{Deserialize, Deserializer, Serialize};

use super::project;

/// Flat UTM override applied on top of a partner's base parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Overrides {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub utm_content: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub utm_term: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub utm_medium: Option<String>,
}

/// Per-channel overrides.
///
/// `general` holds a single flat override. Every other key names a channel
/// (`instagram`, `telegram`, ...) mapping sub-channel names to overrides.
/// Leaves never nest further, so anything deeper fails to deserialize.
/// `null` channels and sub-channels are accepted and dropped.
#[derive(
  Clone,
  Debug,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  FromJsonQueryResult,
)]
pub struct ChannelConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub general: Option<Overrides>,
  #[serde(flatten, deserialize_with = "drop_null_channels")]
  pub channels: Channels,
}

pub type Channels = BTreeMap<String, BTreeMap<String, Overrides>>;

fn drop_null_channels<'de, D>(deserializer: D) -> Result<Channels, D::Error>
where
  D: Deserializer<'de>,
{
  type Nullable =
    BTreeMap<String, Option<BTreeMap<String, Option<Overrides>>>>;

  let raw = Nullable::deserialize(deserializer)?;
  Ok(
    raw
      .into_iter()
      .filter_map(|(channel, subs)| {
        let subs = subs?
          .into_iter()
          .filter_map(|(name, overrides)| Some((name, overrides?)))
          .collect();
        Some((channel, subs))
      })
      .collect(),
  )
}

pub const GENERAL: &str = "general";

impl ChannelConfig {
  /// Override configured for `channel`/`sub_channel`, if any.
  ///
  /// `sub_channel` is ignored for the general channel.
  pub fn lookup(
    &self,
    channel: &str,
    sub_channel: Option<&str>,
  ) -> Option<&Overrides> {
    if channel == GENERAL {
      return self.general.as_ref();
    }
    self.channels.get(channel)?.get(sub_channel?)
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "casas_parceiras")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: Uuid,
  pub name: String,
  #[sea_orm(unique)]
  pub slug: String,
  pub logo_url: Option<String>,
  pub link_base: String,
  pub affiliate_code: Option<String>,
  pub utm_source: Option<String>,
  pub utm_medium: Option<String>,
  pub utm_campaign: Option<String>,
  #[sea_orm(column_type = "Json", nullable)]
  pub channel_config: Option<ChannelConfig>,
  pub active: bool,
  pub project_id: Uuid,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "project::Entity",
    from = "Column::ProjectId",
    to = "project::Column::Id",
    on_delete = "Cascade"
  )]
  Project,
}

impl Related<project::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Project.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
