//! Stock transfers between warehouses. No voucher is posted.

use chrono::NaiveDate;
use mizan_core::documents::{DocumentTotals, DocumentType};
use mizan_core::inventory::InventoryError;
use mizan_shared::types::{Actor, ItemId, WarehouseId};
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{PostedDocument, audit_created, business_date};
use crate::error::EngineResult;
use crate::repositories::{
    DocumentRepository, FiscalRepository, InventoryRepository, MovementSource, NewDocument,
    NewDocumentLine,
};

/// A transfer to record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferInput {
    /// Item moved.
    pub item_id: ItemId,
    /// Quantity moved.
    pub qty: Decimal,
    /// Source warehouse.
    pub from: WarehouseId,
    /// Destination warehouse.
    pub to: WarehouseId,
    /// Business date, today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

/// Transfer service.
pub struct TransferService;

impl TransferService {
    /// Records a transfer.
    ///
    /// # Errors
    ///
    /// `PeriodLocked`, `SameWarehouse`, `WarehouseMissing`, `ItemMissing`
    /// or `NegativeStock`.
    #[instrument(skip(conn, actor, input), fields(item_id = %input.item_id))]
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        actor: &Actor,
        input: TransferInput,
    ) -> EngineResult<PostedDocument> {
        let date = business_date(input.date);
        FiscalRepository::new(conn).ensure_open(date).await?;

        if input.from == input.to {
            return Err(InventoryError::SameWarehouse.into());
        }

        let documents = DocumentRepository::new(conn);
        let doc = documents
            .insert(NewDocument {
                doc_type: DocumentType::Transfer,
                party: None,
                party_id: None,
                origin_id: None,
                method: None,
                description: input.description,
                document_date: date,
                warehouse_id: Some(input.from),
                to_warehouse_id: Some(input.to),
                created_by: actor.user_id,
            })
            .await?;

        let movement = InventoryRepository::new(conn)
            .apply_transfer(
                input.item_id,
                input.qty,
                input.from,
                input.to,
                &MovementSource::new(DocumentType::Transfer.as_str(), doc.id),
            )
            .await?;

        let lines = documents
            .insert_lines(
                doc.id,
                vec![NewDocumentLine {
                    item_id: Some(input.item_id.into_inner()),
                    qty: input.qty,
                    unit_cost: Some(movement.unit_cost),
                    ..NewDocumentLine::default()
                }],
            )
            .await?;

        let document = documents
            .mark_posted(doc, None, DocumentTotals::default())
            .await?;
        audit_created(conn, actor, &document).await?;

        info!(code = %document.code, qty = %input.qty, "transfer posted");
        Ok(PostedDocument {
            document,
            lines,
            vouchers: Vec::new(),
        })
    }
}
