//! Chart of accounts, account mappings, fiscal period locks and the journal.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Code)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Accounts::AccountType).text().not_null())
                    .col(
                        ColumnDef::new(Accounts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccountMappings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountMappings::Key)
                            .string_len(100)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountMappings::AccountCode)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountMappings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_mappings_account")
                            .from(AccountMappings::Table, AccountMappings::AccountCode)
                            .to(Accounts::Table, Accounts::Code)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FiscalPeriods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FiscalPeriods::PeriodKey)
                            .string_len(7)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FiscalPeriods::IsClosed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(FiscalPeriods::ClosedBy).string_len(200).null())
                    .col(
                        ColumnDef::new(FiscalPeriods::ClosedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FiscalPeriods::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JournalVouchers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JournalVouchers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(JournalVouchers::Code)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(JournalVouchers::Status).text().not_null())
                    .col(
                        ColumnDef::new(JournalVouchers::SourceType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(JournalVouchers::SourceId).uuid().null())
                    .col(ColumnDef::new(JournalVouchers::VoucherDate).date().not_null())
                    .col(ColumnDef::new(JournalVouchers::Description).text().null())
                    .col(
                        ColumnDef::new(JournalVouchers::ReversedByVoucherId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(JournalVouchers::ReversesVoucherId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(JournalVouchers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_vouchers_source")
                    .table(JournalVouchers::Table)
                    .col(JournalVouchers::SourceType)
                    .col(JournalVouchers::SourceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_vouchers_date")
                    .table(JournalVouchers::Table)
                    .col(JournalVouchers::VoucherDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JournalLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JournalLines::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JournalLines::VoucherId).uuid().not_null())
                    .col(ColumnDef::new(JournalLines::LineNo).integer().not_null())
                    .col(
                        ColumnDef::new(JournalLines::AccountCode)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(JournalLines::Dc).string_len(1).not_null())
                    .col(
                        ColumnDef::new(JournalLines::Amount)
                            .decimal_len(20, 6)
                            .not_null(),
                    )
                    .col(ColumnDef::new(JournalLines::Description).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journal_lines_voucher")
                            .from(JournalLines::Table, JournalLines::VoucherId)
                            .to(JournalVouchers::Table, JournalVouchers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journal_lines_account")
                            .from(JournalLines::Table, JournalLines::AccountCode)
                            .to(Accounts::Table, Accounts::Code)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .check(Expr::col(JournalLines::Amount).gt(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_lines_voucher")
                    .table(JournalLines::Table)
                    .col(JournalLines::VoucherId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_lines_account")
                    .table(JournalLines::Table)
                    .col(JournalLines::AccountCode)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JournalLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JournalVouchers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FiscalPeriods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountMappings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Code,
    Name,
    AccountType,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AccountMappings {
    Table,
    Key,
    AccountCode,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FiscalPeriods {
    Table,
    PeriodKey,
    IsClosed,
    ClosedBy,
    ClosedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JournalVouchers {
    Table,
    Id,
    Code,
    Status,
    SourceType,
    SourceId,
    VoucherDate,
    Description,
    ReversedByVoucherId,
    ReversesVoucherId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum JournalLines {
    Table,
    Id,
    VoucherId,
    LineNo,
    AccountCode,
    Dc,
    Amount,
    Description,
}
