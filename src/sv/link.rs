//! Affiliate link generation.
//!
//! UTM values are layered from lowest to highest precedence: partner
//! defaults, the channel override configured on the partner, then the
//! per-request overrides. The result is merged into the query string of
//! the partner's `link_base`.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
  entity::{Overrides, partner},
  prelude::*,
};

pub const SHARE_CODE: &str = "shareCode";
pub const DEFAULT_MEDIUM: &str = "affiliate";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkRequest {
  pub channel: String,
  #[serde(default)]
  pub sub_channel: Option<String>,
  #[serde(default)]
  pub override_utm_content: Option<String>,
  #[serde(default)]
  pub override_utm_term: Option<String>,
}

/// UTM parameters actually applied to a link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UtmParams {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub utm_source: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub utm_medium: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub utm_campaign: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub utm_content: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub utm_term: Option<String>,
}

impl UtmParams {
  /// Set keys in canonical order.
  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
    [
      ("utm_source", &self.utm_source),
      ("utm_medium", &self.utm_medium),
      ("utm_campaign", &self.utm_campaign),
      ("utm_content", &self.utm_content),
      ("utm_term", &self.utm_term),
    ]
    .into_iter()
    .filter_map(|(key, value)| Some((key, value.as_deref()?)))
  }

  fn apply(&mut self, overrides: &Overrides) {
    replace(&mut self.utm_content, overrides.utm_content.as_deref());
    replace(&mut self.utm_term, overrides.utm_term.as_deref());
    replace(&mut self.utm_medium, overrides.utm_medium.as_deref());
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedLink {
  pub final_link: String,
  pub utm_params: UtmParams,
}

/// Empty strings never replace a value.
fn replace(slot: &mut Option<String>, value: Option<&str>) {
  if let Some(value) = non_empty(value) {
    *slot = Some(value.to_owned());
  }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
  value.filter(|v| !v.is_empty())
}

/// Build the tracked link for `partner`.
///
/// Unknown channels and missing sub-channels fall back to the base values.
/// Callers must reject inactive partners before calling this.
pub fn resolve(
  partner: &partner::Model,
  campaign_fallback: &str,
  req: &LinkRequest,
) -> Result<GeneratedLink> {
  let mut utm = UtmParams {
    utm_source: Some(
      non_empty(partner.utm_source.as_deref())
        .unwrap_or(&partner.slug)
        .to_owned(),
    ),
    utm_medium: Some(
      non_empty(partner.utm_medium.as_deref())
        .unwrap_or(DEFAULT_MEDIUM)
        .to_owned(),
    ),
    utm_campaign: Some(
      non_empty(partner.utm_campaign.as_deref())
        .unwrap_or(campaign_fallback)
        .to_owned(),
    ),
    ..Default::default()
  };

  if let Some(overrides) = partner
    .channel_config
    .as_ref()
    .and_then(|config| config.lookup(&req.channel, req.sub_channel.as_deref()))
  {
    utm.apply(overrides);
  } else {
    trace!(
      channel = %req.channel,
      sub_channel = ?req.sub_channel,
      slug = %partner.slug,
      "no channel override configured"
    );
  }

  replace(&mut utm.utm_content, req.override_utm_content.as_deref());
  replace(&mut utm.utm_term, req.override_utm_term.as_deref());

  let final_link = assemble(
    &partner.link_base,
    non_empty(partner.affiliate_code.as_deref()),
    &utm,
  )?;

  Ok(GeneratedLink { final_link, utm_params: utm })
}

/// Merge the share code and UTM values into `link_base`'s query.
///
/// Existing keys keep their position and take the new value; only the first
/// value of a repeated key survives. Blank values are dropped.
fn assemble(
  link_base: &str,
  share_code: Option<&str>,
  utm: &UtmParams,
) -> Result<String> {
  let mut url = Url::parse(link_base)?;

  let mut pairs: Vec<(String, String)> = Vec::new();
  for (key, value) in url.query_pairs() {
    if !value.is_empty() && !pairs.iter().any(|(k, _)| *k == key) {
      pairs.push((key.into_owned(), value.into_owned()));
    }
  }

  let mut set = |key: &str, value: &str| {
    match pairs.iter_mut().find(|(k, _)| k == key) {
      Some((_, v)) => *v = value.to_owned(),
      None => pairs.push((key.to_owned(), value.to_owned())),
    }
  };

  if let Some(code) = share_code {
    set(SHARE_CODE, code);
  }
  for (key, value) in utm.iter() {
    set(key, value);
  }

  if pairs.is_empty() {
    url.set_query(None);
  } else {
    url.query_pairs_mut().clear().extend_pairs(&pairs);
  }

  Ok(url.into())
}
