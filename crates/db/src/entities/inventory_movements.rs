//! `SeaORM` Entity for the append-only stock movement log.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::MovementType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub movement_type: MovementType,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub unit_cost: Decimal,
    pub warehouse_id: Option<Uuid>,
    pub to_warehouse_id: Option<Uuid>,
    pub source_type: String,
    pub source_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_items::Entity",
        from = "Column::ItemId",
        to = "super::inventory_items::Column::Id",
        on_delete = "Restrict"
    )]
    InventoryItems,
}

impl Related<super::inventory_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
