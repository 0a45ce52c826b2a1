pub use std::{sync::Arc, time::Duration};

pub use anyhow::Context;
pub use chrono::Utc;
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait,
  QueryFilter, QueryOrder, Set, TransactionTrait,
};
pub use sea_orm_migration::MigratorTrait;
pub use tracing::{debug, info, trace, warn};
pub use uuid::Uuid;

pub use crate::error::{Error, Result};
