//! Void coordinator.
//!
//! Voiding never edits or deletes what was posted. Stock movements are
//! answered with inverse movements, vouchers with reversal vouchers, and the
//! document itself only changes status.

use chrono::{NaiveDate, Utc};
use mizan_core::documents::{DocumentStatus, DocumentType};
use mizan_core::inventory::MovementType;
use mizan_core::ledger::LedgerError;
use mizan_shared::types::{Actor, DocumentId, ItemId, VoucherId};
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::business_date;
use crate::entities::{inventory_movements, journal_vouchers, source_documents};
use crate::error::EngineResult;
use crate::repositories::{
    AuditRecord, AuditRepository, DocumentRepository, FiscalRepository, InventoryRepository,
    LedgerRepository, MovementSource,
};

/// A void request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoidInput {
    /// Document to void.
    pub document_id: DocumentId,
    /// Why, kept on the document and the reversal vouchers.
    #[serde(default)]
    pub reason: Option<String>,
    /// Date of the reversal postings, today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl VoidInput {
    /// A void dated today.
    #[must_use]
    pub fn new(document_id: DocumentId, reason: Option<String>) -> Self {
        Self {
            document_id,
            reason,
            date: None,
        }
    }
}

/// What a void produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoidOutcome {
    /// The document, now void.
    pub document: source_documents::Model,
    /// Reversal vouchers, in the order the originals were posted.
    pub reversals: Vec<journal_vouchers::Model>,
    /// Inverse stock movements.
    pub movements: Vec<inventory_movements::Model>,
    /// The order a voided invoice was raised from, back to draft.
    pub reopened_order: Option<source_documents::Model>,
}

impl VoidOutcome {
    /// The reversal of the document's main voucher, if it posted one.
    #[must_use]
    pub fn reversal_voucher_id(&self) -> Option<Uuid> {
        self.reversals.first().map(|v| v.id)
    }
}

/// Void service.
pub struct VoidService;

impl VoidService {
    /// Voids a posted document, or cancels a draft order.
    ///
    /// 1. Every movement tagged with the document is answered by its
    ///    inverse, tagged `<type>_void`.
    /// 2. Every posted voucher of the document is reversed.
    /// 3. The document becomes void.
    /// 4. An invoice raised from an order puts the order back to draft.
    /// 5. An audit event records the document before and after.
    ///
    /// An order has neither movements nor vouchers, so cancelling one only
    /// changes its status.
    ///
    /// # Errors
    ///
    /// `PeriodLocked`, `DocumentNotFound`, `AlreadyVoid`, a validation
    /// error for a draft invoice or an invoiced order, `NegativeStock` when
    /// received goods were already issued, or a posting error.
    #[instrument(skip(conn, actor, input), fields(document_id = %input.document_id))]
    pub async fn void_document<C: ConnectionTrait>(
        conn: &C,
        tolerance: Decimal,
        actor: &Actor,
        input: VoidInput,
    ) -> EngineResult<VoidOutcome> {
        let date = business_date(input.date);
        FiscalRepository::new(conn).ensure_open(date).await?;

        let documents = DocumentRepository::new(conn);
        let doc = documents.get(input.document_id).await?;
        let status: DocumentStatus = doc.status.into();
        let doc_type: DocumentType = doc.doc_type.into();
        status.ensure_voidable(doc_type, doc.id).inspect_err(|e| {
            warn!(code = %doc.code, error_code = e.error_code(), "void rejected");
        })?;
        let before = serde_json::to_value(&doc)?;

        let inventory = InventoryRepository::new(conn);
        let void_source = MovementSource::new(doc_type.void_source_type(), doc.id);
        let mut movements = Vec::new();
        for original in inventory
            .movements_for_source(doc_type.as_str(), doc.id)
            .await?
        {
            let item_id = ItemId::from_uuid(original.item_id);
            let inverse = match MovementType::from(original.movement_type) {
                MovementType::Out | MovementType::Transfer => {
                    inventory
                        .apply_return(item_id, original.qty, original.unit_cost, &void_source)
                        .await?
                }
                MovementType::In => {
                    inventory
                        .reverse_inbound(item_id, original.qty, original.unit_cost, &void_source)
                        .await?
                }
                MovementType::Adjust | MovementType::Return => {
                    inventory
                        .apply_outbound(item_id, original.qty, &void_source)
                        .await?
                }
            };
            movements.push(inverse);
        }

        let ledger = LedgerRepository::new(conn, tolerance);
        let mut reversals = Vec::new();
        for voucher in ledger
            .posted_for_source(doc_type.voucher_source_types(), doc.id)
            .await?
        {
            reversals.push(
                ledger
                    .reverse(voucher.id, input.reason.clone(), Some(date))
                    .await?,
            );
        }

        let reversal_id = reversals.first().map(|v| v.id);
        let origin_id = doc.origin_id;
        let document = documents
            .mark_void(doc, reversal_id, input.reason, Utc::now())
            .await?;

        let reopened_order = match origin_id {
            Some(order_id) if !doc_type.is_order() => {
                reopen_order(conn, actor, order_id, document.id).await?
            }
            _ => None,
        };

        AuditRepository::new(conn)
            .record(
                actor,
                AuditRecord::new(doc_type.as_str(), document.id, "void")
                    .before(before)
                    .after(serde_json::to_value(&document)?),
            )
            .await?;

        info!(
            code = %document.code,
            reversals = reversals.len(),
            movements = movements.len(),
            "document voided"
        );
        Ok(VoidOutcome {
            document,
            reversals,
            movements,
            reopened_order,
        })
    }

    /// Reverses a voucher posted directly through the ledger.
    ///
    /// Vouchers that belong to a document are voided through the document
    /// so stock and status follow.
    ///
    /// # Errors
    ///
    /// `PeriodLocked`, `VoucherNotFound`, `AlreadyVoid`, a validation error
    /// for a document voucher, or a posting error.
    #[instrument(skip(conn, actor))]
    pub async fn void_voucher<C: ConnectionTrait>(
        conn: &C,
        tolerance: Decimal,
        actor: &Actor,
        voucher_id: VoucherId,
        reason: Option<String>,
        date: Option<NaiveDate>,
    ) -> EngineResult<journal_vouchers::Model> {
        let date = business_date(date);
        FiscalRepository::new(conn).ensure_open(date).await?;

        let ledger = LedgerRepository::new(conn, tolerance);
        let voucher = ledger.get(voucher_id.into_inner()).await?;
        if let Some(source_id) = voucher.source_id {
            if DocumentRepository::new(conn).exists(source_id).await? {
                return Err(LedgerError::Validation(format!(
                    "voucher {} belongs to document {source_id}; void the document instead",
                    voucher.code
                ))
                .into());
            }
        }

        let before = serde_json::to_value(&voucher)?;
        let reversal = ledger.reverse(voucher.id, reason, Some(date)).await?;

        AuditRepository::new(conn)
            .record(
                actor,
                AuditRecord::new("voucher", voucher.id, "void")
                    .before(before)
                    .after(serde_json::to_value(&reversal)?),
            )
            .await?;

        info!(code = %voucher.code, reversal = %reversal.code, "voucher voided");
        Ok(reversal)
    }
}

/// Puts the order an invoice came from back to draft, if it still points
/// at that invoice.
async fn reopen_order<C: ConnectionTrait>(
    conn: &C,
    actor: &Actor,
    order_id: Uuid,
    invoice_id: Uuid,
) -> EngineResult<Option<source_documents::Model>> {
    let documents = DocumentRepository::new(conn);
    let Some(order) = documents.find(DocumentId::from_uuid(order_id)).await? else {
        return Ok(None);
    };
    let invoiced = DocumentStatus::from(order.status) == DocumentStatus::Posted
        && order.origin_id == Some(invoice_id);
    if !invoiced {
        return Ok(None);
    }

    let doc_type: DocumentType = order.doc_type.into();
    let before = serde_json::to_value(&order)?;
    let order = documents.reopen(order).await?;
    AuditRepository::new(conn)
        .record(
            actor,
            AuditRecord::new(doc_type.as_str(), order.id, "reopen")
                .before(before)
                .after(serde_json::to_value(&order)?),
        )
        .await?;

    info!(code = %order.code, "order reopened");
    Ok(Some(order))
}
