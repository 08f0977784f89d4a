//! Inventory repository: stock items, warehouses and the movement log.
//!
//! Item quantity and average cost change only here, by applying a
//! [`StockApplication`] computed by the costing engine and appending the
//! matching movement in the same call.

use chrono::Utc;
use mizan_core::inventory::{CostingEngine, InventoryError, StockApplication, StockItem};
use mizan_core::ledger::LedgerError;
use mizan_shared::types::{ItemId, MovementId, WarehouseId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entities::{inventory_items, inventory_movements, warehouses};
use crate::error::{EngineError, EngineResult};

/// Compare-and-set rounds before a stock write gives up with `Contention`.
const MAX_STOCK_ATTEMPTS: usize = 32;

/// What caused a movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementSource {
    /// Source type, e.g. `sale`, `purchase_void`, `opening`.
    pub source_type: String,
    /// Source id, usually a document.
    pub source_id: Option<Uuid>,
}

impl MovementSource {
    /// A source with an id.
    pub fn new(source_type: impl Into<String>, source_id: Uuid) -> Self {
        Self {
            source_type: source_type.into(),
            source_id: Some(source_id),
        }
    }

    /// A source without an id, e.g. a manual adjustment.
    pub fn untracked(source_type: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            source_id: None,
        }
    }
}

/// Input for creating a stock item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateItemInput {
    /// SKU, unique.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Reorder threshold for the low stock report.
    pub min_qty: Decimal,
    /// Quantity on hand at creation.
    pub opening_qty: Option<Decimal>,
    /// Unit cost of the opening quantity.
    pub opening_cost: Option<Decimal>,
}

/// Inventory repository.
pub struct InventoryRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> InventoryRepository<'a, C> {
    /// Creates a repository over a connection or open transaction.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    // ========== Items ==========

    /// Finds an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_item(&self, id: ItemId) -> EngineResult<Option<inventory_items::Model>> {
        Ok(inventory_items::Entity::find_by_id(id.into_inner())
            .one(self.conn)
            .await?)
    }

    /// Loads an item.
    ///
    /// # Errors
    ///
    /// `ItemMissing` for an unknown id.
    pub async fn item(&self, id: ItemId) -> EngineResult<inventory_items::Model> {
        self.find_item(id)
            .await?
            .ok_or_else(|| InventoryError::ItemMissing(id.to_string()).into())
    }

    /// Finds an item by SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_sku(&self, sku: &str) -> EngineResult<Option<inventory_items::Model>> {
        Ok(inventory_items::Entity::find()
            .filter(inventory_items::Column::Sku.eq(sku))
            .one(self.conn)
            .await?)
    }

    /// All items ordered by SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_items(&self) -> EngineResult<Vec<inventory_items::Model>> {
        Ok(inventory_items::Entity::find()
            .order_by_asc(inventory_items::Column::Sku)
            .all(self.conn)
            .await?)
    }

    /// Creates an item. An opening quantity is booked as an `adjust`
    /// movement with source type `opening`.
    ///
    /// # Errors
    ///
    /// `DuplicateSku`, a validation error for blank fields, or a costing
    /// error for a bad opening quantity or cost.
    pub async fn create_item(&self, input: CreateItemInput) -> EngineResult<inventory_items::Model> {
        let sku = input.sku.trim().to_string();
        let name = input.name.trim().to_string();
        if sku.is_empty() || name.is_empty() {
            return Err(LedgerError::Validation("item sku and name are required".into()).into());
        }
        if input.min_qty < Decimal::ZERO {
            return Err(LedgerError::Validation("minimum quantity cannot be negative".into()).into());
        }
        if self.find_by_sku(&sku).await?.is_some() {
            return Err(InventoryError::DuplicateSku(sku).into());
        }

        let now = Utc::now();
        let item = inventory_items::ActiveModel {
            id: Set(ItemId::new().into_inner()),
            sku: Set(sku),
            name: Set(name),
            qty: Set(Decimal::ZERO),
            avg_cost: Set(Decimal::ZERO),
            min_qty: Set(input.min_qty),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;

        match input.opening_qty {
            Some(qty) if !qty.is_zero() => {
                let cost = input.opening_cost.unwrap_or(Decimal::ZERO);
                let item_id = ItemId::from_uuid(item.id);
                self.apply(item_id, &MovementSource::new("opening", item.id), |_| {
                    CostingEngine::opening(qty, cost)
                })
                .await?;
                self.item(item_id).await
            }
            _ => Ok(item),
        }
    }

    /// Items whose quantity is below their reorder threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn low_stock(&self) -> EngineResult<Vec<inventory_items::Model>> {
        Ok(inventory_items::Entity::find()
            .filter(
                Expr::col(inventory_items::Column::Qty)
                    .lt(Expr::col(inventory_items::Column::MinQty)),
            )
            .order_by_asc(inventory_items::Column::Sku)
            .all(self.conn)
            .await?)
    }

    // ========== Warehouses ==========

    /// Creates a warehouse.
    ///
    /// # Errors
    ///
    /// A validation error for a blank or taken code.
    pub async fn create_warehouse(&self, code: &str, name: &str) -> EngineResult<warehouses::Model> {
        let code = code.trim();
        if code.is_empty() || name.trim().is_empty() {
            return Err(
                LedgerError::Validation("warehouse code and name are required".into()).into(),
            );
        }
        if self.warehouse_by_code(code).await?.is_some() {
            return Err(
                LedgerError::Validation(format!("warehouse code already exists: {code}")).into(),
            );
        }

        Ok(warehouses::ActiveModel {
            id: Set(WarehouseId::new().into_inner()),
            code: Set(code.to_string()),
            name: Set(name.trim().to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?)
    }

    /// Finds a warehouse by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn warehouse_by_code(&self, code: &str) -> EngineResult<Option<warehouses::Model>> {
        Ok(warehouses::Entity::find()
            .filter(warehouses::Column::Code.eq(code))
            .one(self.conn)
            .await?)
    }

    /// Loads a warehouse.
    ///
    /// # Errors
    ///
    /// `WarehouseMissing` for an unknown id.
    pub async fn warehouse(&self, id: WarehouseId) -> EngineResult<warehouses::Model> {
        warehouses::Entity::find_by_id(id.into_inner())
            .one(self.conn)
            .await?
            .ok_or_else(|| InventoryError::WarehouseMissing(id.to_string()).into())
    }

    /// All warehouses ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_warehouses(&self) -> EngineResult<Vec<warehouses::Model>> {
        Ok(warehouses::Entity::find()
            .order_by_asc(warehouses::Column::Code)
            .all(self.conn)
            .await?)
    }

    // ========== Movements ==========

    /// Issues `qty` at the current average cost.
    ///
    /// # Errors
    ///
    /// `ItemMissing`, or `NegativeStock` with nothing changed.
    pub async fn apply_outbound(
        &self,
        item_id: ItemId,
        qty: Decimal,
        source: &MovementSource,
    ) -> EngineResult<inventory_movements::Model> {
        self.apply(item_id, source, |stock| CostingEngine::outbound(stock, qty))
            .await
    }

    /// Receives `qty` at `unit_cost` into the weighted average.
    ///
    /// # Errors
    ///
    /// `ItemMissing`, or a costing error for bad inputs.
    pub async fn apply_inbound(
        &self,
        item_id: ItemId,
        qty: Decimal,
        unit_cost: Decimal,
        source: &MovementSource,
    ) -> EngineResult<inventory_movements::Model> {
        self.apply(item_id, source, |stock| {
            CostingEngine::inbound(stock, qty, unit_cost)
        })
        .await
    }

    /// Puts `qty` back on hand; the average is unchanged.
    ///
    /// # Errors
    ///
    /// `ItemMissing`, or a costing error for bad inputs.
    pub async fn apply_return(
        &self,
        item_id: ItemId,
        qty: Decimal,
        unit_cost: Decimal,
        source: &MovementSource,
    ) -> EngineResult<inventory_movements::Model> {
        self.apply(item_id, source, |stock| {
            CostingEngine::restock(stock, qty, unit_cost)
        })
        .await
    }

    /// Moves `qty` from one warehouse to another.
    ///
    /// # Errors
    ///
    /// `ItemMissing`, `WarehouseMissing`, `SameWarehouse` or `NegativeStock`.
    pub async fn apply_transfer(
        &self,
        item_id: ItemId,
        qty: Decimal,
        from: WarehouseId,
        to: WarehouseId,
        source: &MovementSource,
    ) -> EngineResult<inventory_movements::Model> {
        self.item(item_id).await?;
        self.warehouse(from).await?;
        self.warehouse(to).await?;
        self.apply(item_id, source, |stock| {
            CostingEngine::transfer(stock, qty, from, to)
        })
        .await
    }

    /// Takes back a receipt of `qty` at `unit_cost`, unwinding the average.
    ///
    /// # Errors
    ///
    /// `ItemMissing`, or `NegativeStock` when the received goods are gone.
    pub async fn reverse_inbound(
        &self,
        item_id: ItemId,
        qty: Decimal,
        unit_cost: Decimal,
        source: &MovementSource,
    ) -> EngineResult<inventory_movements::Model> {
        self.apply(item_id, source, |stock| {
            CostingEngine::reverse_inbound(stock, qty, unit_cost)
        })
        .await
    }

    /// Movements recorded for a source, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn movements_for_source(
        &self,
        source_type: &str,
        source_id: Uuid,
    ) -> EngineResult<Vec<inventory_movements::Model>> {
        Ok(inventory_movements::Entity::find()
            .filter(inventory_movements::Column::SourceType.eq(source_type))
            .filter(inventory_movements::Column::SourceId.eq(source_id))
            .order_by_asc(inventory_movements::Column::CreatedAt)
            .order_by_asc(inventory_movements::Column::Id)
            .all(self.conn)
            .await?)
    }

    /// Movements of one item, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn movements_for_item(
        &self,
        item_id: ItemId,
    ) -> EngineResult<Vec<inventory_movements::Model>> {
        Ok(inventory_movements::Entity::find()
            .filter(inventory_movements::Column::ItemId.eq(item_id.into_inner()))
            .order_by_asc(inventory_movements::Column::CreatedAt)
            .order_by_asc(inventory_movements::Column::Id)
            .all(self.conn)
            .await?)
    }

    /// Reads the item, computes the new level and writes it only if the
    /// row still carries the version that was read. A lost race re-reads
    /// and recomputes, so a rule such as non-negative stock is always
    /// checked against the level actually being replaced.
    async fn apply<F>(
        &self,
        item_id: ItemId,
        source: &MovementSource,
        compute: F,
    ) -> EngineResult<inventory_movements::Model>
    where
        F: Fn(&StockItem) -> Result<StockApplication, InventoryError>,
    {
        for attempt in 1..=MAX_STOCK_ATTEMPTS {
            let item = self.item(item_id).await?;
            let applied = compute(&stock_of(&item)).inspect_err(log_rejection)?;
            if self.write_level(&item, &applied).await? {
                return self.record_movement(item.id, applied, source).await;
            }
            debug!(%item_id, attempt, "stock level changed concurrently, re-reading");
        }

        warn!(%item_id, attempts = MAX_STOCK_ATTEMPTS, "stock update gave up");
        Err(EngineError::Contention {
            entity: "inventory_items",
            id: item_id.into_inner(),
        })
    }

    /// Compare-and-set on the item's version. Returns `false` when another
    /// writer got there first.
    async fn write_level(
        &self,
        item: &inventory_items::Model,
        applied: &StockApplication,
    ) -> EngineResult<bool> {
        let result = inventory_items::Entity::update_many()
            .col_expr(inventory_items::Column::Qty, Expr::value(applied.qty))
            .col_expr(inventory_items::Column::AvgCost, Expr::value(applied.avg_cost))
            .col_expr(inventory_items::Column::UpdatedAt, Expr::value(Utc::now()))
            .col_expr(
                inventory_items::Column::Version,
                Expr::col(inventory_items::Column::Version).add(1),
            )
            .filter(inventory_items::Column::Id.eq(item.id))
            .filter(inventory_items::Column::Version.eq(item.version))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn record_movement(
        &self,
        item_id: Uuid,
        applied: StockApplication,
        source: &MovementSource,
    ) -> EngineResult<inventory_movements::Model> {
        let draft = applied.movement;
        let movement = inventory_movements::ActiveModel {
            id: Set(MovementId::new().into_inner()),
            item_id: Set(item_id),
            movement_type: Set(draft.movement_type.into()),
            qty: Set(draft.qty),
            unit_cost: Set(draft.unit_cost),
            warehouse_id: Set(draft.warehouse_id.map(WarehouseId::into_inner)),
            to_warehouse_id: Set(draft.to_warehouse_id.map(WarehouseId::into_inner)),
            source_type: Set(source.source_type.clone()),
            source_id: Set(source.source_id),
            created_at: Set(Utc::now()),
        }
        .insert(self.conn)
        .await?;

        debug!(
            %item_id,
            movement_type = %draft.movement_type,
            qty = %draft.qty,
            source_type = %source.source_type,
            "stock movement applied"
        );
        Ok(movement)
    }
}

fn stock_of(item: &inventory_items::Model) -> StockItem {
    StockItem {
        sku: item.sku.clone(),
        qty: item.qty,
        avg_cost: item.avg_cost,
    }
}

fn log_rejection(err: &InventoryError) {
    warn!(error_code = err.error_code(), "stock movement rejected: {err}");
}
