use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PendingPasswordResets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingPasswordResets::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PendingPasswordResets::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingPasswordResets::NewPasswordHash)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingPasswordResets::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PendingPasswordResets::ConsumedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(PendingPasswordResets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PendingPasswordResets::Table, PendingPasswordResets::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(PendingPasswordResets::Table)
                    .col(PendingPasswordResets::UserId)
                    .name("idx_pending_password_resets_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingPasswordResets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PendingPasswordResets {
    Table,
    Id,
    UserId,
    NewPasswordHash,
    ExpiresAt,
    ConsumedAt,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
