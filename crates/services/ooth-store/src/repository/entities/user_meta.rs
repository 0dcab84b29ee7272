//! User meta database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::{MetaAttr, StoredMeta};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_meta")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub key: String,
    /// String values
    #[sea_orm(column_type = "Text", nullable)]
    pub value: Option<String>,
    /// Everything that is not a string
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub data: Option<Json>,
    pub created_at: DateTimeUtc,
    /// Index within the batch the row was written in
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// New row owned by `user_id`, with a fresh identifier
    pub fn from_attr(user_id: Uuid, attr: MetaAttr, now: DateTimeUtc, position: i32) -> Self {
        let (key, value, data) = attr.into_columns();
        Self {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            key: Set(key),
            value: Set(value),
            data: Set(data),
            created_at: Set(now),
            position: Set(position),
        }
    }
}

/// Convert database model to domain row
impl From<Model> for StoredMeta {
    fn from(model: Model) -> Self {
        StoredMeta {
            id: model.id.to_string(),
            key: model.key,
            value: model.value,
            data: model.data,
        }
    }
}
