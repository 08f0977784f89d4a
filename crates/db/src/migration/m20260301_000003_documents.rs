//! Source documents (sales, purchases, cash movements, transfers) and their lines.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SourceDocuments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SourceDocuments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SourceDocuments::DocType).text().not_null())
                    .col(
                        ColumnDef::new(SourceDocuments::Code)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SourceDocuments::Status).text().not_null())
                    .col(ColumnDef::new(SourceDocuments::Party).string_len(200).null())
                    .col(ColumnDef::new(SourceDocuments::Method).text().null())
                    .col(ColumnDef::new(SourceDocuments::Description).text().null())
                    .col(ColumnDef::new(SourceDocuments::DocumentDate).date().not_null())
                    .col(
                        ColumnDef::new(SourceDocuments::NetTotal)
                            .decimal_len(20, 6)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SourceDocuments::VatTotal)
                            .decimal_len(20, 6)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SourceDocuments::GrossTotal)
                            .decimal_len(20, 6)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SourceDocuments::WarehouseId).uuid().null())
                    .col(ColumnDef::new(SourceDocuments::ToWarehouseId).uuid().null())
                    .col(ColumnDef::new(SourceDocuments::VoucherId).uuid().null())
                    .col(ColumnDef::new(SourceDocuments::ReversalVoucherId).uuid().null())
                    .col(ColumnDef::new(SourceDocuments::VoidReason).text().null())
                    .col(
                        ColumnDef::new(SourceDocuments::VoidedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(SourceDocuments::CreatedBy).uuid().null())
                    .col(
                        ColumnDef::new(SourceDocuments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_source_documents_type_date")
                    .table(SourceDocuments::Table)
                    .col(SourceDocuments::DocType)
                    .col(SourceDocuments::DocumentDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DocumentLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentLines::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DocumentLines::DocumentId).uuid().not_null())
                    .col(ColumnDef::new(DocumentLines::LineNo).integer().not_null())
                    .col(ColumnDef::new(DocumentLines::ItemId).uuid().null())
                    .col(ColumnDef::new(DocumentLines::Description).text().null())
                    .col(ColumnDef::new(DocumentLines::Qty).decimal_len(20, 6).not_null())
                    .col(
                        ColumnDef::new(DocumentLines::UnitPrice)
                            .decimal_len(20, 6)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentLines::VatRate)
                            .decimal_len(20, 6)
                            .not_null(),
                    )
                    .col(ColumnDef::new(DocumentLines::Net).decimal_len(20, 6).not_null())
                    .col(ColumnDef::new(DocumentLines::Vat).decimal_len(20, 6).not_null())
                    .col(ColumnDef::new(DocumentLines::Gross).decimal_len(20, 6).not_null())
                    .col(ColumnDef::new(DocumentLines::UnitCost).decimal_len(20, 6).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_lines_document")
                            .from(DocumentLines::Table, DocumentLines::DocumentId)
                            .to(SourceDocuments::Table, SourceDocuments::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_document_lines_document")
                    .table(DocumentLines::Table)
                    .col(DocumentLines::DocumentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DocumentLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SourceDocuments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SourceDocuments {
    Table,
    Id,
    DocType,
    Code,
    Status,
    Party,
    Method,
    Description,
    DocumentDate,
    NetTotal,
    VatTotal,
    GrossTotal,
    WarehouseId,
    ToWarehouseId,
    VoucherId,
    ReversalVoucherId,
    VoidReason,
    VoidedAt,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DocumentLines {
    Table,
    Id,
    DocumentId,
    LineNo,
    ItemId,
    Description,
    Qty,
    UnitPrice,
    VatRate,
    Net,
    Vat,
    Gross,
    UnitCost,
}
