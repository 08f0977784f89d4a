//! Money movements: customer collections, supplier payments and expenses.

use chrono::NaiveDate;
use mizan_core::documents::{DocumentTotals, DocumentType, PartyType, PaymentMethod};
use mizan_core::ledger::{PostVoucherInput, VoucherLine};
use mizan_core::mapping::MappingKey;
use mizan_shared::types::Actor;
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    PostedDocument, account_for, audit_created, business_date, require_amount, require_text,
};
use crate::error::EngineResult;
use crate::repositories::{
    DocumentRepository, FiscalRepository, LedgerRepository, MappingRepository, NewDocument,
    PartyRepository,
};

/// Money received from a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInput {
    /// Customer code from the party master.
    pub customer: String,
    /// Amount received.
    pub amount: Decimal,
    /// Cash or bank.
    pub method: PaymentMethod,
    /// Business date, today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

/// Money paid to a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    /// Supplier code from the party master.
    pub supplier: String,
    /// Amount paid.
    pub amount: Decimal,
    /// Cash or bank.
    pub method: PaymentMethod,
    /// Business date, today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

/// An operating expense paid on the spot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseInput {
    /// Category, e.g. `rent`. A mapping `expense.<category>` overrides the
    /// general expense account.
    pub category: String,
    /// What was paid for.
    pub description: String,
    /// Amount paid.
    pub amount: Decimal,
    /// Cash or bank.
    pub method: PaymentMethod,
    /// Business date, today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Everything a two-line cash document needs.
struct CashPosting {
    doc_type: DocumentType,
    party: String,
    party_id: Option<Uuid>,
    method: PaymentMethod,
    amount: Decimal,
    date: NaiveDate,
    description: Option<String>,
    debit_account: String,
    credit_account: String,
}

/// Cash service.
pub struct CashService;

impl CashService {
    /// Records a collection: Dr cash or bank, Cr receivable.
    ///
    /// # Errors
    ///
    /// `PeriodLocked`, `PartyNotFound`, a validation error (blank or
    /// non-customer party, non-positive amount, method `credit`),
    /// `MappingMissing` or a posting error.
    #[instrument(skip(conn, actor, input), fields(customer = %input.customer))]
    pub async fn record_collection<C: ConnectionTrait>(
        conn: &C,
        tolerance: Decimal,
        actor: &Actor,
        input: CollectionInput,
    ) -> EngineResult<PostedDocument> {
        let date = business_date(input.date);
        FiscalRepository::new(conn).ensure_open(date).await?;

        let customer = PartyRepository::new(conn)
            .require(&input.customer, PartyType::Customer)
            .await?;
        require_amount(input.amount)?;
        input.method.ensure_settles_in_money()?;

        let posting = CashPosting {
            doc_type: DocumentType::Collection,
            party: customer.name,
            party_id: Some(customer.id),
            method: input.method,
            amount: input.amount,
            date,
            description: input.description,
            debit_account: account_for(conn, input.method.settlement_key()).await?,
            credit_account: account_for(conn, MappingKey::SALES_RECEIVABLE).await?,
        };
        Self::post(conn, tolerance, actor, posting).await
    }

    /// Records a supplier payment: Dr vendor, Cr cash or bank.
    ///
    /// # Errors
    ///
    /// Same as [`Self::record_collection`].
    #[instrument(skip(conn, actor, input), fields(supplier = %input.supplier))]
    pub async fn record_payment<C: ConnectionTrait>(
        conn: &C,
        tolerance: Decimal,
        actor: &Actor,
        input: PaymentInput,
    ) -> EngineResult<PostedDocument> {
        let date = business_date(input.date);
        FiscalRepository::new(conn).ensure_open(date).await?;

        let supplier = PartyRepository::new(conn)
            .require(&input.supplier, PartyType::Supplier)
            .await?;
        require_amount(input.amount)?;
        input.method.ensure_settles_in_money()?;

        let posting = CashPosting {
            doc_type: DocumentType::Payment,
            party: supplier.name,
            party_id: Some(supplier.id),
            method: input.method,
            amount: input.amount,
            date,
            description: input.description,
            debit_account: account_for(conn, MappingKey::PURCHASE_VENDOR).await?,
            credit_account: account_for(conn, input.method.settlement_key()).await?,
        };
        Self::post(conn, tolerance, actor, posting).await
    }

    /// Records an expense: Dr expense, Cr cash or bank.
    ///
    /// # Errors
    ///
    /// Same as [`Self::record_collection`], with a blank category or
    /// description rejected.
    #[instrument(skip(conn, actor, input), fields(category = %input.category))]
    pub async fn record_expense<C: ConnectionTrait>(
        conn: &C,
        tolerance: Decimal,
        actor: &Actor,
        input: ExpenseInput,
    ) -> EngineResult<PostedDocument> {
        let date = business_date(input.date);
        FiscalRepository::new(conn).ensure_open(date).await?;

        let category = require_text("expense category", &input.category)?;
        let description = require_text("expense description", &input.description)?;
        require_amount(input.amount)?;
        input.method.ensure_settles_in_money()?;

        let posting = CashPosting {
            doc_type: DocumentType::Expense,
            debit_account: expense_account(conn, &category).await?,
            credit_account: account_for(conn, input.method.settlement_key()).await?,
            party: category,
            party_id: None,
            method: input.method,
            amount: input.amount,
            date,
            description: Some(description),
        };
        Self::post(conn, tolerance, actor, posting).await
    }

    async fn post<C: ConnectionTrait>(
        conn: &C,
        tolerance: Decimal,
        actor: &Actor,
        posting: CashPosting,
    ) -> EngineResult<PostedDocument> {
        let documents = DocumentRepository::new(conn);
        let doc = documents
            .insert(NewDocument {
                doc_type: posting.doc_type,
                party: Some(posting.party),
                party_id: posting.party_id,
                origin_id: None,
                method: Some(posting.method),
                description: posting.description,
                document_date: posting.date,
                warehouse_id: None,
                to_warehouse_id: None,
                created_by: actor.user_id,
            })
            .await?;

        let line_text = format!("{} {}", posting.doc_type, doc.code);
        let voucher = LedgerRepository::new(conn, tolerance)
            .post(PostVoucherInput::new(
                doc.code.clone(),
                posting.doc_type.as_str(),
                Some(doc.id),
                Some(posting.date),
                vec![
                    VoucherLine::debit(posting.debit_account, posting.amount)
                        .with_description(&line_text),
                    VoucherLine::credit(posting.credit_account, posting.amount)
                        .with_description(&line_text),
                ],
            ))
            .await?;

        let totals = DocumentTotals {
            net: posting.amount,
            vat: Decimal::ZERO,
            gross: posting.amount,
        };
        let document = documents.mark_posted(doc, Some(voucher.id), totals).await?;
        audit_created(conn, actor, &document).await?;

        info!(code = %document.code, amount = %posting.amount, "cash document posted");
        Ok(PostedDocument {
            document,
            lines: Vec::new(),
            vouchers: vec![voucher],
        })
    }
}

/// Account for an expense category: `expense.<category>` when mapped,
/// otherwise the general expense account.
async fn expense_account<C: ConnectionTrait>(conn: &C, category: &str) -> EngineResult<String> {
    let key = format!("expense.{}", category.to_lowercase());
    match MappingRepository::new(conn).get(&key).await? {
        Some(code) => Ok(code),
        None => account_for(conn, MappingKey::EXPENSE).await,
    }
}
