//! Row version on stock items and the per-type document code counters.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(InventoryItems::Table)
                    .add_column(
                        ColumnDef::new(InventoryItems::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DocumentSequences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentSequences::DocType)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DocumentSequences::LastValue)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .check(Expr::col(DocumentSequences::LastValue).gte(0))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DocumentSequences::Table).to_owned())
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(InventoryItems::Table)
                    .drop_column(InventoryItems::Version)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum InventoryItems {
    Table,
    Version,
}

#[derive(DeriveIden)]
enum DocumentSequences {
    Table,
    DocType,
    LastValue,
}
