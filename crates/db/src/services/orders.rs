//! Sales and purchase orders.
//!
//! An order is a priced draft against a party. Saving one moves no stock
//! and posts nothing; invoicing it records the sale or purchase through
//! the normal services and links the two documents both ways.

use chrono::NaiveDate;
use mizan_core::documents::{DocumentStatus, DocumentTotals, DocumentType, PaymentMethod};
use mizan_core::ledger::LedgerError;
use mizan_shared::types::{Actor, DocumentId, ItemId};
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::{
    ItemLineInput, PostedDocument, PurchaseInput, PurchaseService, SaleInput, SalesService,
    audit_created, business_date, price_lines,
};
use crate::entities::source_documents;
use crate::error::EngineResult;
use crate::repositories::{
    AuditRecord, AuditRepository, DocumentRepository, FiscalRepository, InventoryRepository,
    NewDocument, NewDocumentLine, PartyRepository,
};

/// An order to save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderInput {
    /// Party code: a customer for sales orders, a supplier for purchase
    /// orders.
    pub party: String,
    /// Goods ordered, at the agreed price.
    pub lines: Vec<ItemLineInput>,
    /// Business date, today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

/// How to invoice an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceOrderInput {
    /// The order.
    pub order_id: DocumentId,
    /// Settlement of a sales invoice. Purchases are always on account.
    pub method: PaymentMethod,
    /// Invoice date, today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// An order and the invoice raised from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicedOrder {
    /// The order, now posted and linked to the invoice.
    pub order: source_documents::Model,
    /// The sale or purchase.
    pub invoice: PostedDocument,
}

/// Order service.
pub struct OrderService;

impl OrderService {
    /// Saves a sales or purchase order as a draft.
    ///
    /// # Errors
    ///
    /// A validation error for a type that is not an order or for bad
    /// lines, `PeriodLocked`, `PartyNotFound`, or `ItemMissing`.
    #[instrument(skip(conn, actor, input), fields(party = %input.party))]
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        actor: &Actor,
        doc_type: DocumentType,
        input: OrderInput,
    ) -> EngineResult<PostedDocument> {
        let Some(role) = doc_type.party_role().filter(|_| doc_type.is_order()) else {
            return Err(
                LedgerError::Validation(format!("{doc_type} is not an order type")).into(),
            );
        };
        let date = business_date(input.date);
        FiscalRepository::new(conn).ensure_open(date).await?;

        let party = PartyRepository::new(conn).require(&input.party, role).await?;
        let amounts = price_lines(&input.lines)?;
        let inventory = InventoryRepository::new(conn);
        for line in &input.lines {
            inventory.item(line.item_id).await?;
        }

        let documents = DocumentRepository::new(conn);
        let doc = documents
            .insert(NewDocument {
                doc_type,
                party: Some(party.name),
                party_id: Some(party.id),
                origin_id: None,
                method: None,
                description: input.description,
                document_date: date,
                warehouse_id: None,
                to_warehouse_id: None,
                created_by: actor.user_id,
            })
            .await?;

        let stored = input
            .lines
            .into_iter()
            .zip(amounts.iter().copied())
            .map(|(line, amount)| NewDocumentLine {
                item_id: Some(line.item_id.into_inner()),
                description: line.description,
                qty: line.qty,
                unit_price: line.unit_price,
                vat_rate: line.vat_rate,
                net: amount.net,
                vat: amount.vat,
                gross: amount.gross,
                unit_cost: None,
            })
            .collect();
        let lines = documents.insert_lines(doc.id, stored).await?;
        let totals = DocumentTotals::of(amounts);
        let document = documents.set_totals(doc, totals).await?;
        audit_created(conn, actor, &document).await?;

        info!(code = %document.code, gross = %totals.gross, "order saved");
        Ok(PostedDocument {
            document,
            lines,
            vouchers: Vec::new(),
        })
    }

    /// Invoices a draft order.
    ///
    /// The order's lines become a sale or purchase against the same party,
    /// dated `input.date`; stock moves and vouchers post exactly as for a
    /// document entered directly. The order turns posted and points at the
    /// invoice, and the invoice points back at the order.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound`, a validation error for a document that is not
    /// an order or is already invoiced, `AlreadyVoid` for a cancelled
    /// order, or any error of the sale or purchase.
    #[instrument(skip(conn, actor, input), fields(order_id = %input.order_id))]
    pub async fn invoice<C: ConnectionTrait>(
        conn: &C,
        tolerance: Decimal,
        actor: &Actor,
        input: InvoiceOrderInput,
    ) -> EngineResult<InvoicedOrder> {
        let documents = DocumentRepository::new(conn);
        let order = documents.get(input.order_id).await?;
        let doc_type: DocumentType = order.doc_type.into();
        let Some(invoice_type) = doc_type.invoice_type() else {
            return Err(
                LedgerError::Validation(format!("document {} is not an order", order.code)).into(),
            );
        };
        DocumentStatus::from(order.status)
            .ensure_invoiceable(order.id)
            .inspect_err(|e| {
                warn!(code = %order.code, error_code = e.error_code(), "invoice rejected");
            })?;

        let party_id = order.party_id.ok_or_else(|| {
            LedgerError::Validation(format!("order {} has no party", order.code))
        })?;
        let party = PartyRepository::new(conn).get(party_id).await?;
        let lines = documents
            .lines(order.id)
            .await?
            .into_iter()
            .map(|line| {
                let item_id = line.item_id.ok_or_else(|| {
                    LedgerError::Validation(format!(
                        "line {} of order {} has no item",
                        line.line_no, order.code
                    ))
                })?;
                Ok(ItemLineInput {
                    item_id: ItemId::from_uuid(item_id),
                    qty: line.qty,
                    unit_price: line.unit_price,
                    vat_rate: line.vat_rate,
                    description: line.description,
                })
            })
            .collect::<Result<Vec<_>, LedgerError>>()?;
        let description = Some(format!("Invoice of order {}", order.code));

        let invoice = match invoice_type {
            DocumentType::Purchase => {
                let purchase = PurchaseInput {
                    supplier: party.code,
                    lines,
                    date: input.date,
                    description,
                };
                PurchaseService::record(conn, tolerance, actor, purchase, Some(order.id)).await?
            }
            _ => {
                let sale = SaleInput {
                    customer: party.code,
                    method: input.method,
                    lines,
                    date: input.date,
                    description,
                };
                SalesService::record(conn, tolerance, actor, sale, Some(order.id)).await?
            }
        };

        let before = serde_json::to_value(&order)?;
        let order = documents.mark_invoiced(order, invoice.document.id).await?;
        AuditRepository::new(conn)
            .record(
                actor,
                AuditRecord::new(doc_type.as_str(), order.id, "invoice")
                    .before(before)
                    .after(serde_json::to_value(&order)?),
            )
            .await?;

        info!(order = %order.code, invoice = %invoice.document.code, "order invoiced");
        Ok(InvoicedOrder { order, invoice })
    }
}
