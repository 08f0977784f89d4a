//! Purchases: stock in at cost, payable voucher.

use chrono::NaiveDate;
use mizan_core::documents::{DocumentTotals, DocumentType, PartyType};
use mizan_core::ledger::{PostVoucherInput, VoucherLine, without_zero_lines};
use mizan_core::mapping::MappingKey;
use mizan_shared::types::Actor;
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    ItemLineInput, PostedDocument, account_for, audit_created, business_date, price_lines,
};
use crate::error::EngineResult;
use crate::repositories::{
    DocumentRepository, FiscalRepository, InventoryRepository, LedgerRepository, MovementSource,
    NewDocument, NewDocumentLine, PartyRepository,
};

/// A purchase to record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseInput {
    /// Supplier code from the party master.
    pub supplier: String,
    /// Goods received. The unit price is the unit cost.
    pub lines: Vec<ItemLineInput>,
    /// Business date, today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

/// Purchase service.
pub struct PurchaseService;

impl PurchaseService {
    /// Records a purchase on account.
    ///
    /// Each line is received into stock at its unit price. The voucher
    /// debits stock with the net amount and input VAT with the tax, and
    /// credits the vendor with the gross.
    ///
    /// # Errors
    ///
    /// `PeriodLocked`, `PartyNotFound`, a validation error, `ItemMissing`,
    /// `MappingMissing`, or any posting error.
    #[instrument(skip(conn, actor, input), fields(supplier = %input.supplier))]
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        tolerance: Decimal,
        actor: &Actor,
        input: PurchaseInput,
    ) -> EngineResult<PostedDocument> {
        Self::record(conn, tolerance, actor, input, None).await
    }

    /// Records a purchase, optionally as the invoice of an order.
    pub(crate) async fn record<C: ConnectionTrait>(
        conn: &C,
        tolerance: Decimal,
        actor: &Actor,
        input: PurchaseInput,
        origin_id: Option<Uuid>,
    ) -> EngineResult<PostedDocument> {
        let date = business_date(input.date);
        FiscalRepository::new(conn).ensure_open(date).await?;

        let supplier = PartyRepository::new(conn)
            .require(&input.supplier, PartyType::Supplier)
            .await?;
        let amounts = price_lines(&input.lines)?;

        let documents = DocumentRepository::new(conn);
        let doc = documents
            .insert(NewDocument {
                doc_type: DocumentType::Purchase,
                party: Some(supplier.name),
                party_id: Some(supplier.id),
                origin_id,
                method: None,
                description: input.description,
                document_date: date,
                warehouse_id: None,
                to_warehouse_id: None,
                created_by: actor.user_id,
            })
            .await?;

        let inventory = InventoryRepository::new(conn);
        let source = MovementSource::new(DocumentType::Purchase.as_str(), doc.id);
        let mut stored = Vec::with_capacity(input.lines.len());
        for (line, amount) in input.lines.into_iter().zip(amounts.iter().copied()) {
            inventory
                .apply_inbound(line.item_id, line.qty, line.unit_price, &source)
                .await?;
            stored.push(NewDocumentLine {
                item_id: Some(line.item_id.into_inner()),
                description: line.description,
                qty: line.qty,
                unit_price: line.unit_price,
                vat_rate: line.vat_rate,
                net: amount.net,
                vat: amount.vat,
                gross: amount.gross,
                unit_cost: Some(line.unit_price),
            });
        }
        let lines = documents.insert_lines(doc.id, stored).await?;
        let totals = DocumentTotals::of(amounts);

        let mut vouchers = Vec::with_capacity(1);
        if !totals.gross.is_zero() {
            let stock = account_for(conn, MappingKey::INVENTORY_STOCK).await?;
            let input_vat = account_for(conn, MappingKey::PURCHASE_VAT).await?;
            let vendor = account_for(conn, MappingKey::PURCHASE_VENDOR).await?;
            let description = format!("Purchase {}", doc.code);
            let voucher_lines = without_zero_lines(vec![
                VoucherLine::debit(stock, totals.net).with_description(&description),
                VoucherLine::debit(input_vat, totals.vat).with_description(&description),
                VoucherLine::credit(vendor, totals.gross).with_description(&description),
            ]);
            vouchers.push(
                LedgerRepository::new(conn, tolerance)
                    .post(PostVoucherInput::new(
                        doc.code.clone(),
                        DocumentType::Purchase.as_str(),
                        Some(doc.id),
                        Some(date),
                        voucher_lines,
                    ))
                    .await?,
            );
        }

        let voucher_id = vouchers.first().map(|v| v.id);
        let document = documents.mark_posted(doc, voucher_id, totals).await?;
        audit_created(conn, actor, &document).await?;

        info!(code = %document.code, gross = %totals.gross, "purchase posted");
        Ok(PostedDocument {
            document,
            lines,
            vouchers,
        })
    }
}
