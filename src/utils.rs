use serde::{Deserialize, Deserializer};
use url::Url;

use crate::prelude::*;

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in partial updates.
pub fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

/// Slugs appear in public URLs: lowercase ASCII letters, digits, `-`, `_`.
pub fn validate_slug(slug: &str) -> Result<()> {
  let valid = !slug.is_empty()
    && slug
      .bytes()
      .all(|b| {
        b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_'
      });

  if valid {
    Ok(())
  } else {
    Err(Error::InvalidArgs(format!(
      "Invalid slug `{slug}`: use lowercase letters, digits, `-` or `_`"
    )))
  }
}

/// Only absolute http(s) URLs can serve as a link base.
pub fn validate_link_base(link: &str) -> Result<()> {
  let url =
    Url::parse(link.trim()).map_err(|e| Error::InvalidUrl(e.to_string()))?;

  match url.scheme() {
    "http" | "https" if url.has_host() => Ok(()),
    "http" | "https" => Err(Error::InvalidUrl("missing host".into())),
    scheme => Err(Error::InvalidUrl(format!(
      "unsupported scheme `{scheme}`, only http and https are allowed"
    ))),
  }
}
