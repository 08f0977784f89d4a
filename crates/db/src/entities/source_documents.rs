//! `SeaORM` Entity for business source documents.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{DocumentStatus, DocumentType, PaymentMethod};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "source_documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub doc_type: DocumentType,
    #[sea_orm(unique)]
    pub code: String,
    pub status: DocumentStatus,
    /// Customer, supplier or expense category.
    pub party: Option<String>,
    pub party_id: Option<Uuid>,
    pub method: Option<PaymentMethod>,
    pub description: Option<String>,
    pub document_date: Date,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub net_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub vat_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub gross_total: Decimal,
    pub warehouse_id: Option<Uuid>,
    pub to_warehouse_id: Option<Uuid>,
    pub voucher_id: Option<Uuid>,
    pub reversal_voucher_id: Option<Uuid>,
    pub void_reason: Option<String>,
    pub voided_at: Option<DateTimeUtc>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeUtc,
    /// The order an invoice was raised from, or the invoice raised from an order.
    pub origin_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::document_lines::Entity")]
    DocumentLines,
}

impl Related<super::document_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
