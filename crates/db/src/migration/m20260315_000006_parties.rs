//! Party master (customers and suppliers), and the party and origin links
//! on source documents.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Parties::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Parties::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Parties::Code)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Parties::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Parties::PartyType).text().not_null())
                    .col(ColumnDef::new(Parties::Phone).string_len(64).null())
                    .col(ColumnDef::new(Parties::City).string_len(100).null())
                    .col(
                        ColumnDef::new(Parties::RiskLimit)
                            .decimal_len(20, 6)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Parties::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Parties::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Parties::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .check(Expr::col(Parties::RiskLimit).gte(0))
                    .to_owned(),
            )
            .await?;

        // One column per statement; SQLite cannot add several at once.
        manager
            .alter_table(
                Table::alter()
                    .table(SourceDocuments::Table)
                    .add_column(ColumnDef::new(SourceDocuments::PartyId).uuid().null())
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(SourceDocuments::Table)
                    .add_column(ColumnDef::new(SourceDocuments::OriginId).uuid().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_source_documents_party")
                    .table(SourceDocuments::Table)
                    .col(SourceDocuments::PartyId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_source_documents_party")
                    .table(SourceDocuments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(SourceDocuments::Table)
                    .drop_column(SourceDocuments::OriginId)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(SourceDocuments::Table)
                    .drop_column(SourceDocuments::PartyId)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Parties::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Parties {
    Table,
    Id,
    Code,
    Name,
    PartyType,
    Phone,
    City,
    RiskLimit,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SourceDocuments {
    Table,
    PartyId,
    OriginId,
}
