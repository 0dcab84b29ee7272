//! Database connection and schema management.

use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr};
use sea_orm_migration::{MigrationStatus, MigratorTrait};

use common::DatabaseConfig;

use super::migrations::Migrator;

/// Schema change requested from the CLI.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Connect and bring the schema up to date.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let db = Self::connect_without_migrations(config).await?;
        db.migrate(MigrateAction::Up).await?;
        tracing::info!("Database connected and migrations applied");
        Ok(db)
    }

    /// Connect without touching the schema.
    pub async fn connect_without_migrations(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections);

        let connection = SeaDatabase::connect(options).await?;
        tracing::debug!(?config, "Database connected");
        Ok(Self { connection })
    }

    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    /// Apply `action` and report every known migration with whether it is applied.
    pub async fn migrate(&self, action: MigrateAction) -> Result<Vec<(String, bool)>, DbErr> {
        match action {
            MigrateAction::Up => Migrator::up(&self.connection, None).await?,
            MigrateAction::Down => Migrator::down(&self.connection, Some(1)).await?,
            MigrateAction::Fresh => Migrator::fresh(&self.connection).await?,
            MigrateAction::Status => {}
        }

        let status = Migrator::get_migration_with_status(&self.connection)
            .await?
            .iter()
            .map(|m| {
                let applied = matches!(m.status(), MigrationStatus::Applied);
                (m.name().to_string(), applied)
            })
            .collect();
        Ok(status)
    }

    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_config() -> DatabaseConfig {
        // One connection, otherwise every pooled connection gets its own in-memory database
        DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        }
    }

    #[tokio::test]
    async fn test_connect_applies_all_migrations() {
        let db = Database::connect(&sqlite_config()).await.unwrap();

        let status = db.migrate(MigrateAction::Status).await.unwrap();

        assert_eq!(status.len(), 2);
        assert!(status.iter().all(|(_, applied)| *applied));
        assert!(db.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_down_reverts_last_migration() {
        let db = Database::connect(&sqlite_config()).await.unwrap();

        let status = db.migrate(MigrateAction::Down).await.unwrap();

        assert_eq!(status[0], ("m20240101_000001_create_users_table".to_string(), true));
        assert_eq!(status[1], ("m20240101_000002_create_user_meta_table".to_string(), false));
    }
}
