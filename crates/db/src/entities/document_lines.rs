//! `SeaORM` Entity for source document lines.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub document_id: Uuid,
    pub line_no: i32,
    pub item_id: Option<Uuid>,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub vat_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub net: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub vat: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub gross: Decimal,
    /// Cost per unit taken out of stock, for sale lines.
    #[sea_orm(column_type = "Decimal(Some((20, 6)))", nullable)]
    pub unit_cost: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::source_documents::Entity",
        from = "Column::DocumentId",
        to = "super::source_documents::Column::Id",
        on_delete = "Restrict"
    )]
    SourceDocuments,
}

impl Related<super::source_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SourceDocuments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
