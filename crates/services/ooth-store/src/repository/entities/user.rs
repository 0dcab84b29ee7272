//! User database entity for SeaORM.
//!
//! Only the native columns live here; every other field is a `user_meta` row.

use sea_orm::entity::prelude::*;

use domain::StoredUser;

use super::user_meta;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_meta::Entity")]
    UserMeta,
}

impl Related<user_meta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserMeta.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Combine the user row with its meta rows into the storage shape
    pub fn with_meta(self, meta: Vec<user_meta::Model>) -> StoredUser {
        StoredUser {
            id: self.id.to_string(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            meta: meta.into_iter().map(Into::into).collect(),
        }
    }
}
