//! Warehouses, stock items and the stock movement log.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Warehouses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Warehouses::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Warehouses::Code)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Warehouses::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Warehouses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InventoryItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::Sku)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(InventoryItems::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(InventoryItems::Qty)
                            .decimal_len(20, 6)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::AvgCost)
                            .decimal_len(20, 6)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::MinQty)
                            .decimal_len(20, 6)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .check(Expr::col(InventoryItems::Qty).gte(0))
                    .check(Expr::col(InventoryItems::AvgCost).gte(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InventoryMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryMovements::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InventoryMovements::ItemId).uuid().not_null())
                    .col(
                        ColumnDef::new(InventoryMovements::MovementType)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::Qty)
                            .decimal_len(20, 6)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::UnitCost)
                            .decimal_len(20, 6)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryMovements::WarehouseId).uuid().null())
                    .col(ColumnDef::new(InventoryMovements::ToWarehouseId).uuid().null())
                    .col(
                        ColumnDef::new(InventoryMovements::SourceType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryMovements::SourceId).uuid().null())
                    .col(
                        ColumnDef::new(InventoryMovements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventory_movements_item")
                            .from(InventoryMovements::Table, InventoryMovements::ItemId)
                            .to(InventoryItems::Table, InventoryItems::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .check(Expr::col(InventoryMovements::Qty).gt(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_movements_item")
                    .table(InventoryMovements::Table)
                    .col(InventoryMovements::ItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_movements_source")
                    .table(InventoryMovements::Table)
                    .col(InventoryMovements::SourceType)
                    .col(InventoryMovements::SourceId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Warehouses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Warehouses {
    Table,
    Id,
    Code,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum InventoryItems {
    Table,
    Id,
    Sku,
    Name,
    Qty,
    AvgCost,
    MinQty,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InventoryMovements {
    Table,
    Id,
    ItemId,
    MovementType,
    Qty,
    UnitCost,
    WarehouseId,
    ToWarehouseId,
    SourceType,
    SourceId,
    CreatedAt,
}
