//! `SeaORM` Entity for stock items.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub sku: String,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub avg_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub min_qty: Decimal,
    /// Bumped on every stock write; writers compare it before updating.
    #[serde(default)]
    pub version: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_movements::Entity")]
    InventoryMovements,
}

impl Related<super::inventory_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
