//! Migration: Create user_meta table for non-native user fields.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserMeta::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserMeta::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(UserMeta::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserMeta::Key).string().not_null())
                    // Exactly one of value/data is set per row
                    .col(ColumnDef::new(UserMeta::Value).text().null())
                    .col(ColumnDef::new(UserMeta::Data).json_binary().null())
                    .col(
                        ColumnDef::new(UserMeta::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UserMeta::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_meta_user_id")
                            .from(UserMeta::Table, UserMeta::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_meta_user_id")
                    .table(UserMeta::Table)
                    .col(UserMeta::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserMeta::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserMeta {
    Table,
    Id,
    UserId,
    Key,
    Value,
    Data,
    CreatedAt,
    Position,
}
