use std::sync::Arc;

use async_trait::async_trait;

use crate::{prelude::*, state::AppState, sv};

/// Ensures the administrator from the environment exists.
pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let Some(admin) = &app.config.admin else {
      warn!("ADMIN_USERNAME/ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping seed");
      return Ok(());
    };

    let user = sv::User::new(&app.db)
      .ensure_admin(&admin.username, &admin.email, &admin.password)
      .await?;

    if !user.is_admin {
      warn!("`{}` exists but is not an administrator", user.username);
    }

    Ok(())
  }
}
