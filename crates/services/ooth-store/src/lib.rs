//! Ooth Store Library
//!
//! Stores users for the authentication layer in a relational database:
//! native columns on `users`, every other field as a `user_meta` row.
//! Use [`connect`] to get a ready [`OothStore`], or build one around any
//! [`repository::UserRepository`].

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use common::AppResult;

use crate::config::StoreConfig;
use crate::infra::Database;
use crate::repository::UserStore;

pub use infra::MigrateAction;
pub use service::{CleanupStatus, OothStore, OothStoreBuilder, UpdateOutcome, UserAdapter};

/// Connect to the configured database and build a store on top of it.
pub async fn connect(config: &StoreConfig) -> AppResult<OothStore> {
    let db = if config.run_migrations {
        Database::connect(&config.database).await?
    } else {
        Database::connect_without_migrations(&config.database).await?
    };

    let user_repo = Arc::new(UserStore::new(db.get_connection()));
    OothStore::builder().repository(user_repo).build()
}

/// Run a migration action and print the resulting status (for CLI commands).
pub async fn run_migrations(config: &StoreConfig, action: MigrateAction) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config.database).await?;

    let status = db.migrate(action).await?;
    info!(?action, "Migration command finished");

    for (name, applied) in status {
        let marker = if applied { "[x]" } else { "[ ]" };
        println!("{} {}", marker, name);
    }

    Ok(())
}

/// Check that the configured database answers.
pub async fn ping(config: &StoreConfig) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config.database).await?;
    db.ping().await?;
    info!("Database is reachable");
    Ok(())
}
