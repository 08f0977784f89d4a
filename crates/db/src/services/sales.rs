//! Sales: stock out, revenue voucher, cost-of-goods voucher.

use chrono::NaiveDate;
use mizan_core::documents::{
    DocumentTotals, DocumentType, PartyType, PaymentMethod, cogs_voucher_code, round_money,
    within_risk_limit,
};
use mizan_core::ledger::{PostVoucherInput, VoucherLine, without_zero_lines};
use mizan_core::mapping::MappingKey;
use mizan_shared::types::Actor;
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    ItemLineInput, PostedDocument, account_for, audit_created, business_date, price_lines,
};
use crate::entities::parties;
use crate::error::{EngineError, EngineResult};
use crate::repositories::{
    DocumentRepository, FiscalRepository, InventoryRepository, LedgerRepository, MovementSource,
    NewDocument, NewDocumentLine, PartyRepository,
};

/// A sale to record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleInput {
    /// Customer code from the party master.
    pub customer: String,
    /// Settlement: on account, cash or bank.
    pub method: PaymentMethod,
    /// Goods sold.
    pub lines: Vec<ItemLineInput>,
    /// Business date, today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

/// Sales service.
pub struct SalesService;

impl SalesService {
    /// Records a sale.
    ///
    /// Each line issues stock at the item's average cost. The revenue
    /// voucher debits the settlement account with the gross amount and
    /// credits revenue and output VAT; a second voucher moves the cost of
    /// the goods from stock to cost of sales when it is not zero.
    ///
    /// # Errors
    ///
    /// `PeriodLocked`, `PartyNotFound`, `RiskLimitExceeded`, a validation
    /// error, `ItemMissing`, `NegativeStock`, `MappingMissing`, or any
    /// posting error. Nothing is kept on failure once the caller rolls back.
    #[instrument(skip(conn, actor, input), fields(customer = %input.customer))]
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        tolerance: Decimal,
        actor: &Actor,
        input: SaleInput,
    ) -> EngineResult<PostedDocument> {
        Self::record(conn, tolerance, actor, input, None).await
    }

    /// Records a sale, optionally as the invoice of an order.
    pub(crate) async fn record<C: ConnectionTrait>(
        conn: &C,
        tolerance: Decimal,
        actor: &Actor,
        input: SaleInput,
        origin_id: Option<Uuid>,
    ) -> EngineResult<PostedDocument> {
        let date = business_date(input.date);
        FiscalRepository::new(conn).ensure_open(date).await?;

        let customer = PartyRepository::new(conn)
            .require(&input.customer, PartyType::Customer)
            .await?;
        let amounts = price_lines(&input.lines)?;
        if input.method == PaymentMethod::Credit {
            let gross = DocumentTotals::of(amounts.iter().copied()).gross;
            ensure_risk_headroom(conn, &customer, gross).await?;
        }

        let documents = DocumentRepository::new(conn);
        let doc = documents
            .insert(NewDocument {
                doc_type: DocumentType::Sale,
                party: Some(customer.name),
                party_id: Some(customer.id),
                origin_id,
                method: Some(input.method),
                description: input.description,
                document_date: date,
                warehouse_id: None,
                to_warehouse_id: None,
                created_by: actor.user_id,
            })
            .await?;

        let inventory = InventoryRepository::new(conn);
        let source = MovementSource::new(DocumentType::Sale.as_str(), doc.id);
        let mut cogs = Decimal::ZERO;
        let mut stored = Vec::with_capacity(input.lines.len());
        for (line, amount) in input.lines.into_iter().zip(amounts.iter().copied()) {
            let movement = inventory
                .apply_outbound(line.item_id, line.qty, &source)
                .await?;
            cogs += round_money(line.qty * movement.unit_cost);
            stored.push(NewDocumentLine {
                item_id: Some(line.item_id.into_inner()),
                description: line.description,
                qty: line.qty,
                unit_price: line.unit_price,
                vat_rate: line.vat_rate,
                net: amount.net,
                vat: amount.vat,
                gross: amount.gross,
                unit_cost: Some(movement.unit_cost),
            });
        }
        let lines = documents.insert_lines(doc.id, stored).await?;
        let totals = DocumentTotals::of(amounts);

        let ledger = LedgerRepository::new(conn, tolerance);
        let mut vouchers = Vec::with_capacity(2);

        if !totals.gross.is_zero() {
            let settlement = account_for(conn, input.method.settlement_key()).await?;
            let revenue = account_for(conn, MappingKey::SALES_REVENUE).await?;
            let output_vat = account_for(conn, MappingKey::SALES_VAT).await?;
            let description = format!("Sale {}", doc.code);
            let voucher_lines = without_zero_lines(vec![
                VoucherLine::debit(settlement, totals.gross).with_description(&description),
                VoucherLine::credit(revenue, totals.net).with_description(&description),
                VoucherLine::credit(output_vat, totals.vat).with_description(&description),
            ]);
            vouchers.push(
                ledger
                    .post(PostVoucherInput::new(
                        doc.code.clone(),
                        DocumentType::Sale.as_str(),
                        Some(doc.id),
                        Some(date),
                        voucher_lines,
                    ))
                    .await?,
            );
        }

        if cogs > Decimal::ZERO {
            let cost_of_sales = account_for(conn, MappingKey::SALES_COGS).await?;
            let stock = account_for(conn, MappingKey::INVENTORY_STOCK).await?;
            let description = format!("Cost of sale {}", doc.code);
            vouchers.push(
                ledger
                    .post(PostVoucherInput::new(
                        cogs_voucher_code(&doc.code),
                        "cogs",
                        Some(doc.id),
                        Some(date),
                        vec![
                            VoucherLine::debit(cost_of_sales, cogs).with_description(&description),
                            VoucherLine::credit(stock, cogs).with_description(&description),
                        ],
                    ))
                    .await?,
            );
        }

        let voucher_id = vouchers.first().map(|v| v.id);
        let document = documents.mark_posted(doc, voucher_id, totals).await?;
        audit_created(conn, actor, &document).await?;

        info!(code = %document.code, gross = %totals.gross, %cogs, "sale posted");
        Ok(PostedDocument {
            document,
            lines,
            vouchers,
        })
    }
}

/// Rejects a credit sale that would take the customer past their limit.
async fn ensure_risk_headroom<C: ConnectionTrait>(
    conn: &C,
    customer: &parties::Model,
    gross: Decimal,
) -> EngineResult<()> {
    if customer.risk_limit.is_zero() {
        return Ok(());
    }
    let open = PartyRepository::new(conn).receivable(customer.id).await?;
    if within_risk_limit(customer.risk_limit, open, gross) {
        return Ok(());
    }
    warn!(code = %customer.code, limit = %customer.risk_limit, %open, %gross, "risk limit exceeded");
    Err(EngineError::RiskLimitExceeded {
        party: customer.code.clone(),
        limit: customer.risk_limit,
        exposure: open + gross,
    })
}
