//! User repository: the database client the store adapter talks to.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::user::{self, Entity as UserEntity};
use super::entities::user_meta::{self, Entity as UserMetaEntity};
use common::{AppError, AppResult, OptionExt};
use domain::{MetaAttr, StoredUser};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Identifiers are opaque strings at this boundary.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user together with all of its meta rows
    async fn fetch_user(&self, id: &str) -> AppResult<Option<StoredUser>>;

    /// Add meta rows to an existing user and return the user as stored afterwards
    async fn update_user(&self, id: &str, rows: Vec<MetaAttr>) -> AppResult<StoredUser>;

    /// Delete meta rows by id, returning how many were removed
    async fn delete_meta(&self, ids: Vec<String>) -> AppResult<u64>;

    /// Create a user with its initial meta rows, returning the new id
    async fn create_user(&self, rows: Vec<MetaAttr>) -> AppResult<String>;
}

/// SeaORM implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn parse_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::validation(format!("Invalid identifier: {}", id)))
}

/// Meta rows of a user, in write order
async fn meta_of<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<Vec<user_meta::Model>> {
    UserMetaEntity::find()
        .filter(user_meta::Column::UserId.eq(user_id))
        .order_by_asc(user_meta::Column::CreatedAt)
        .order_by_asc(user_meta::Column::Position)
        .all(conn)
        .await
        .map_err(AppError::from)
}

/// Write one batch of meta rows; rows keep their order through `position`
async fn insert_meta<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    rows: Vec<MetaAttr>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let models = rows
        .into_iter()
        .enumerate()
        .map(|(i, attr)| user_meta::ActiveModel::from_attr(user_id, attr, now, i as i32));
    UserMetaEntity::insert_many(models)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl UserRepository for UserStore {
    async fn fetch_user(&self, id: &str) -> AppResult<Option<StoredUser>> {
        // No user can have an id that is not a UUID
        let Ok(user_id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let Some(user) = UserEntity::find_by_id(user_id).one(&self.db).await? else {
            return Ok(None);
        };

        let meta = meta_of(&self.db, user_id).await?;
        Ok(Some(user.with_meta(meta)))
    }

    async fn update_user(&self, id: &str, rows: Vec<MetaAttr>) -> AppResult<StoredUser> {
        let user_id = parse_id(id)?;
        let txn = self.db.begin().await?;

        let user = UserEntity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_not_found()?;

        let now = Utc::now();
        insert_meta(&txn, user_id, rows, now).await?;

        let mut active: user::ActiveModel = user.into();
        active.updated_at = Set(now);
        let user = active.update(&txn).await?;

        let meta = meta_of(&txn, user_id).await?;
        txn.commit().await?;

        Ok(user.with_meta(meta))
    }

    async fn delete_meta(&self, ids: Vec<String>) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let ids = ids
            .iter()
            .map(|id| parse_id(id))
            .collect::<AppResult<Vec<_>>>()?;

        let result = UserMetaEntity::delete_many()
            .filter(user_meta::Column::Id.is_in(ids))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn create_user(&self, rows: Vec<MetaAttr>) -> AppResult<String> {
        let txn = self.db.begin().await?;

        let now = Utc::now();
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        insert_meta(&txn, user.id, rows, now).await?;

        txn.commit().await?;
        Ok(user.id.to_string())
    }
}
