//! The engine facade.
//!
//! Every public operation is one unit of work: begin a transaction, run the
//! repositories and services on it, commit, then publish an event. Any error
//! drops the transaction, which rolls it back.

use chrono::NaiveDate;
use mizan_core::documents::{DocumentType, PartyType};
use mizan_core::fiscal::PeriodKey;
use mizan_core::integrity::HealthReport;
use mizan_core::ledger::PostVoucherInput;
use mizan_shared::config::LedgerConfig;
use mizan_shared::types::{Actor, DocumentId, ItemId, VoucherId, WarehouseId};
use mizan_shared::{AppConfig, EventBus, LedgerEvent};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::backup::{self, Snapshot};
use crate::entities::{
    account_mappings, accounts, audit_events, fiscal_periods, inventory_items, inventory_movements,
    journal_vouchers, parties, source_documents, warehouses,
};
use crate::error::EngineResult;
use crate::health;
use crate::repositories::{
    AccountRepository, AuditRecord, AuditRepository, CreateAccountInput, CreateItemInput,
    CreatePartyInput, DocumentRepository, DocumentWithLines, FiscalRepository,
    InventoryRepository, LedgerRepository, MappingRepository, MovementSource, PartyRepository,
    TrialBalanceRow, UpdateAccountInput, VoucherWithLines,
};
use crate::seed::{self, SeedSummary};
use crate::services::{
    CashService, CollectionInput, ExpenseInput, InvoiceOrderInput, InvoicedOrder, OrderInput,
    OrderService, PaymentInput, PostedDocument, PurchaseInput, PurchaseService, SaleInput,
    SalesService, TransferInput, TransferService, VoidInput, VoidOutcome, VoidService,
};

/// Ledger and inventory engine over one database.
#[derive(Debug, Clone)]
pub struct Engine {
    db: DatabaseConnection,
    events: EventBus,
    ledger: LedgerConfig,
}

impl Engine {
    /// Creates an engine over an existing connection.
    #[must_use]
    pub fn new(db: DatabaseConnection, events: EventBus, ledger: LedgerConfig) -> Self {
        Self { db, events, ledger }
    }

    /// Connects using the application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn from_config(config: &AppConfig) -> EngineResult<Self> {
        let db = crate::connect_with(&config.database).await?;
        Ok(Self::new(
            db,
            EventBus::new(&config.events),
            config.ledger.clone(),
        ))
    }

    /// Underlying connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Bus on which committed operations are announced.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Balance tolerance applied to every voucher.
    #[must_use]
    pub fn tolerance(&self) -> Decimal {
        self.ledger.balance_tolerance
    }

    fn publish(&self, entity_type: &str, entity_id: Uuid, action: &str) {
        self.events
            .publish(LedgerEvent::new(entity_type, entity_id, action));
    }

    // ========== Ledger ==========

    /// Posts a manual voucher.
    ///
    /// # Errors
    ///
    /// `VoucherUnbalanced`, `PeriodLocked`, `DuplicateVoucherCode`, or an
    /// account error.
    #[instrument(skip(self, actor, input), fields(code = %input.code))]
    pub async fn post(
        &self,
        actor: &Actor,
        input: PostVoucherInput,
    ) -> EngineResult<journal_vouchers::Model> {
        let txn = self.db.begin().await?;

        let voucher = LedgerRepository::new(&txn, self.tolerance())
            .post(input)
            .await?;
        AuditRepository::new(&txn)
            .record(
                actor,
                AuditRecord::new("voucher", voucher.id, "create")
                    .after(serde_json::to_value(&voucher)?),
            )
            .await?;

        txn.commit().await?;
        info!(code = %voucher.code, "voucher committed");
        self.publish("voucher", voucher.id, "create");
        Ok(voucher)
    }

    /// Loads a voucher with its lines.
    ///
    /// # Errors
    ///
    /// `VoucherNotFound`.
    pub async fn voucher(&self, id: VoucherId) -> EngineResult<VoucherWithLines> {
        LedgerRepository::new(&self.db, self.tolerance())
            .with_lines(id)
            .await
    }

    /// Vouchers dated within the range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_vouchers(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> EngineResult<Vec<journal_vouchers::Model>> {
        LedgerRepository::new(&self.db, self.tolerance())
            .list(from, to)
            .await
    }

    /// Reverses a manual voucher. Returns the reversal.
    ///
    /// # Errors
    ///
    /// See [`VoidService::void_voucher`].
    #[instrument(skip(self, actor, reason, date), fields(voucher_id = %id))]
    pub async fn void_voucher(
        &self,
        actor: &Actor,
        id: VoucherId,
        reason: Option<String>,
        date: Option<NaiveDate>,
    ) -> EngineResult<journal_vouchers::Model> {
        let txn = self.db.begin().await?;
        let reversal =
            VoidService::void_voucher(&txn, self.tolerance(), actor, id, reason, date).await?;
        txn.commit().await?;
        info!(reversal = %reversal.code, "voucher voided");

        self.publish("voucher", id.into_inner(), "void");
        Ok(reversal)
    }

    /// Debit, credit and net per account.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn trial_balance(&self) -> EngineResult<Vec<TrialBalanceRow>> {
        LedgerRepository::new(&self.db, self.tolerance())
            .trial_balance()
            .await
    }

    // ========== Accounts and mappings ==========

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// `DuplicateAccountCode` or a validation error.
    pub async fn create_account(
        &self,
        actor: &Actor,
        input: CreateAccountInput,
    ) -> EngineResult<accounts::Model> {
        let txn = self.db.begin().await?;
        let account = AccountRepository::new(&txn).create(input).await?;
        AuditRepository::new(&txn)
            .record(
                actor,
                AuditRecord::new("account", &account.code, "create")
                    .after(serde_json::to_value(&account)?),
            )
            .await?;
        txn.commit().await?;
        Ok(account)
    }

    /// Renames or retypes an account nothing has posted to.
    ///
    /// # Errors
    ///
    /// `UnknownAccount` or `AccountInUse`.
    pub async fn update_account(
        &self,
        actor: &Actor,
        code: &str,
        input: UpdateAccountInput,
    ) -> EngineResult<accounts::Model> {
        let txn = self.db.begin().await?;
        let accounts = AccountRepository::new(&txn);
        let before = accounts.get(code).await?;
        let account = accounts.update(code, input).await?;
        AuditRepository::new(&txn)
            .record(
                actor,
                AuditRecord::new("account", code, "update")
                    .before(serde_json::to_value(&before)?)
                    .after(serde_json::to_value(&account)?),
            )
            .await?;
        txn.commit().await?;
        Ok(account)
    }

    /// Deactivates an account.
    ///
    /// # Errors
    ///
    /// `UnknownAccount`.
    pub async fn deactivate_account(
        &self,
        actor: &Actor,
        code: &str,
    ) -> EngineResult<accounts::Model> {
        let txn = self.db.begin().await?;
        let account = AccountRepository::new(&txn).deactivate(code).await?;
        AuditRepository::new(&txn)
            .record(actor, AuditRecord::new("account", code, "deactivate"))
            .await?;
        txn.commit().await?;
        Ok(account)
    }

    /// Lists accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_accounts(&self, include_inactive: bool) -> EngineResult<Vec<accounts::Model>> {
        AccountRepository::new(&self.db).list(include_inactive).await
    }

    /// Resolves a mapping key.
    ///
    /// # Errors
    ///
    /// `MappingMissing` without a stored mapping or fallback.
    pub async fn resolve(&self, key: &str, fallback: Option<&str>) -> EngineResult<String> {
        MappingRepository::new(&self.db).resolve(key, fallback).await
    }

    /// Points a mapping key at an account.
    ///
    /// # Errors
    ///
    /// `UnknownAccount` or `InactiveAccount`.
    pub async fn set_mapping(
        &self,
        actor: &Actor,
        key: &str,
        account_code: &str,
    ) -> EngineResult<account_mappings::Model> {
        let txn = self.db.begin().await?;
        let mappings = MappingRepository::new(&txn);
        let before = mappings.get(key).await?;
        let mapping = mappings.set(key, account_code).await?;
        let mut record = AuditRecord::new("account_mapping", key, "set")
            .after(serde_json::to_value(&mapping)?);
        if let Some(previous) = before {
            record = record.before(serde_json::json!({ "account_code": previous }));
        }
        AuditRepository::new(&txn).record(actor, record).await?;
        txn.commit().await?;
        Ok(mapping)
    }

    /// Lists mappings.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_mappings(&self) -> EngineResult<Vec<account_mappings::Model>> {
        MappingRepository::new(&self.db).list().await
    }

    // ========== Fiscal periods ==========

    /// Whether postings dated `date` are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn is_locked(&self, date: NaiveDate) -> EngineResult<bool> {
        FiscalRepository::new(&self.db).is_locked(date).await
    }

    /// Closes a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    #[instrument(skip(self, actor), fields(period = %key))]
    pub async fn close_period(
        &self,
        actor: &Actor,
        key: PeriodKey,
    ) -> EngineResult<fiscal_periods::Model> {
        let txn = self.db.begin().await?;
        let period = FiscalRepository::new(&txn).close(key, &actor.name).await?;
        AuditRepository::new(&txn)
            .record(actor, AuditRecord::new("fiscal_period", key, "close"))
            .await?;
        txn.commit().await?;
        info!("period closed");
        Ok(period)
    }

    /// Reopens a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    #[instrument(skip(self, actor), fields(period = %key))]
    pub async fn open_period(
        &self,
        actor: &Actor,
        key: PeriodKey,
    ) -> EngineResult<fiscal_periods::Model> {
        let txn = self.db.begin().await?;
        let period = FiscalRepository::new(&txn).open(key).await?;
        AuditRepository::new(&txn)
            .record(actor, AuditRecord::new("fiscal_period", key, "open"))
            .await?;
        txn.commit().await?;
        info!("period opened");
        Ok(period)
    }

    /// Periods that were ever closed or reopened.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_periods(&self) -> EngineResult<Vec<fiscal_periods::Model>> {
        FiscalRepository::new(&self.db).list().await
    }

    // ========== Inventory ==========

    /// Creates a warehouse.
    ///
    /// # Errors
    ///
    /// A validation error for a blank or taken code.
    pub async fn create_warehouse(
        &self,
        actor: &Actor,
        code: &str,
        name: &str,
    ) -> EngineResult<warehouses::Model> {
        let txn = self.db.begin().await?;
        let warehouse = InventoryRepository::new(&txn)
            .create_warehouse(code, name)
            .await?;
        AuditRepository::new(&txn)
            .record(
                actor,
                AuditRecord::new("warehouse", warehouse.id, "create")
                    .after(serde_json::to_value(&warehouse)?),
            )
            .await?;
        txn.commit().await?;
        self.publish("warehouse", warehouse.id, "create");
        Ok(warehouse)
    }

    /// Lists warehouses.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_warehouses(&self) -> EngineResult<Vec<warehouses::Model>> {
        InventoryRepository::new(&self.db).list_warehouses().await
    }

    /// Creates a stock item, with an optional opening balance.
    ///
    /// # Errors
    ///
    /// `DuplicateSku`, a validation error, or a costing error.
    pub async fn create_item(
        &self,
        actor: &Actor,
        input: CreateItemInput,
    ) -> EngineResult<inventory_items::Model> {
        let txn = self.db.begin().await?;
        let item = InventoryRepository::new(&txn).create_item(input).await?;
        AuditRepository::new(&txn)
            .record(
                actor,
                AuditRecord::new("inventory_item", item.id, "create")
                    .after(serde_json::to_value(&item)?),
            )
            .await?;
        txn.commit().await?;
        self.publish("inventory_item", item.id, "create");
        Ok(item)
    }

    /// Loads an item.
    ///
    /// # Errors
    ///
    /// `ItemMissing`.
    pub async fn item(&self, id: ItemId) -> EngineResult<inventory_items::Model> {
        InventoryRepository::new(&self.db).item(id).await
    }

    /// Lists items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_items(&self) -> EngineResult<Vec<inventory_items::Model>> {
        InventoryRepository::new(&self.db).list_items().await
    }

    /// Items below their reorder threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn low_stock(&self) -> EngineResult<Vec<inventory_items::Model>> {
        InventoryRepository::new(&self.db).low_stock().await
    }

    /// Movement history of an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn item_movements(
        &self,
        id: ItemId,
    ) -> EngineResult<Vec<inventory_movements::Model>> {
        InventoryRepository::new(&self.db).movements_for_item(id).await
    }

    /// Issues stock outside any document.
    ///
    /// # Errors
    ///
    /// `ItemMissing` or `NegativeStock`.
    pub async fn apply_outbound(
        &self,
        actor: &Actor,
        item_id: ItemId,
        qty: Decimal,
        source: MovementSource,
    ) -> EngineResult<inventory_movements::Model> {
        let txn = self.db.begin().await?;
        let movement = InventoryRepository::new(&txn)
            .apply_outbound(item_id, qty, &source)
            .await?;
        self.finish_movement(txn, actor, movement).await
    }

    /// Receives stock outside any document.
    ///
    /// # Errors
    ///
    /// `ItemMissing` or a costing error.
    pub async fn apply_inbound(
        &self,
        actor: &Actor,
        item_id: ItemId,
        qty: Decimal,
        unit_cost: Decimal,
        source: MovementSource,
    ) -> EngineResult<inventory_movements::Model> {
        let txn = self.db.begin().await?;
        let movement = InventoryRepository::new(&txn)
            .apply_inbound(item_id, qty, unit_cost, &source)
            .await?;
        self.finish_movement(txn, actor, movement).await
    }

    /// Takes returned stock back in outside any document.
    ///
    /// # Errors
    ///
    /// `ItemMissing` or a costing error.
    pub async fn apply_return(
        &self,
        actor: &Actor,
        item_id: ItemId,
        qty: Decimal,
        unit_cost: Decimal,
        source: MovementSource,
    ) -> EngineResult<inventory_movements::Model> {
        let txn = self.db.begin().await?;
        let movement = InventoryRepository::new(&txn)
            .apply_return(item_id, qty, unit_cost, &source)
            .await?;
        self.finish_movement(txn, actor, movement).await
    }

    /// Moves stock between warehouses outside any document.
    ///
    /// # Errors
    ///
    /// `ItemMissing`, `WarehouseMissing`, `SameWarehouse` or `NegativeStock`.
    pub async fn apply_transfer(
        &self,
        actor: &Actor,
        item_id: ItemId,
        qty: Decimal,
        from: WarehouseId,
        to: WarehouseId,
        source: MovementSource,
    ) -> EngineResult<inventory_movements::Model> {
        let txn = self.db.begin().await?;
        let movement = InventoryRepository::new(&txn)
            .apply_transfer(item_id, qty, from, to, &source)
            .await?;
        self.finish_movement(txn, actor, movement).await
    }

    async fn finish_movement(
        &self,
        txn: sea_orm::DatabaseTransaction,
        actor: &Actor,
        movement: inventory_movements::Model,
    ) -> EngineResult<inventory_movements::Model> {
        AuditRepository::new(&txn)
            .record(
                actor,
                AuditRecord::new("inventory_movement", movement.id, "create")
                    .after(serde_json::to_value(&movement)?),
            )
            .await?;
        txn.commit().await?;
        self.publish("inventory_item", movement.item_id, "movement");
        Ok(movement)
    }

    // ========== Parties ==========

    /// Adds a customer or supplier.
    ///
    /// # Errors
    ///
    /// `DuplicatePartyCode`, or a validation error for blank fields or a
    /// negative risk limit.
    pub async fn create_party(
        &self,
        actor: &Actor,
        input: CreatePartyInput,
    ) -> EngineResult<parties::Model> {
        let txn = self.db.begin().await?;
        let party = PartyRepository::new(&txn).create(input).await?;
        AuditRepository::new(&txn)
            .record(
                actor,
                AuditRecord::new("party", party.id, "create")
                    .after(serde_json::to_value(&party)?),
            )
            .await?;
        txn.commit().await?;
        info!(
            code = %party.code,
            party_type = %PartyType::from(party.party_type),
            "party created"
        );
        self.publish("party", party.id, "create");
        Ok(party)
    }

    /// Loads a party by code.
    ///
    /// # Errors
    ///
    /// `PartyNotFound`.
    pub async fn party(&self, code: &str) -> EngineResult<parties::Model> {
        PartyRepository::new(&self.db).get_by_code(code).await
    }

    /// Parties by code, optionally only those able to act in `role`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_parties(&self, role: Option<PartyType>) -> EngineResult<Vec<parties::Model>> {
        PartyRepository::new(&self.db).list(role).await
    }

    /// Open receivable of a customer.
    ///
    /// # Errors
    ///
    /// `PartyNotFound`.
    pub async fn party_receivable(&self, code: &str) -> EngineResult<Decimal> {
        let parties = PartyRepository::new(&self.db);
        let party = parties.get_by_code(code).await?;
        parties.receivable(party.id).await
    }

    // ========== Documents ==========

    /// Records a sale.
    ///
    /// # Errors
    ///
    /// See [`SalesService::create`].
    pub async fn create_sale(&self, actor: &Actor, input: SaleInput) -> EngineResult<PostedDocument> {
        let txn = self.db.begin().await?;
        let posted = SalesService::create(&txn, self.tolerance(), actor, input).await?;
        txn.commit().await?;
        self.publish_document(&posted.document, "create");
        Ok(posted)
    }

    /// Records a purchase.
    ///
    /// # Errors
    ///
    /// See [`PurchaseService::create`].
    pub async fn create_purchase(
        &self,
        actor: &Actor,
        input: PurchaseInput,
    ) -> EngineResult<PostedDocument> {
        let txn = self.db.begin().await?;
        let posted = PurchaseService::create(&txn, self.tolerance(), actor, input).await?;
        txn.commit().await?;
        self.publish_document(&posted.document, "create");
        Ok(posted)
    }

    /// Records a customer collection.
    ///
    /// # Errors
    ///
    /// See [`CashService::record_collection`].
    pub async fn record_collection(
        &self,
        actor: &Actor,
        input: CollectionInput,
    ) -> EngineResult<PostedDocument> {
        let txn = self.db.begin().await?;
        let posted = CashService::record_collection(&txn, self.tolerance(), actor, input).await?;
        txn.commit().await?;
        self.publish_document(&posted.document, "create");
        Ok(posted)
    }

    /// Records a supplier payment.
    ///
    /// # Errors
    ///
    /// See [`CashService::record_payment`].
    pub async fn record_payment(
        &self,
        actor: &Actor,
        input: PaymentInput,
    ) -> EngineResult<PostedDocument> {
        let txn = self.db.begin().await?;
        let posted = CashService::record_payment(&txn, self.tolerance(), actor, input).await?;
        txn.commit().await?;
        self.publish_document(&posted.document, "create");
        Ok(posted)
    }

    /// Records an expense.
    ///
    /// # Errors
    ///
    /// See [`CashService::record_expense`].
    pub async fn record_expense(
        &self,
        actor: &Actor,
        input: ExpenseInput,
    ) -> EngineResult<PostedDocument> {
        let txn = self.db.begin().await?;
        let posted = CashService::record_expense(&txn, self.tolerance(), actor, input).await?;
        txn.commit().await?;
        self.publish_document(&posted.document, "create");
        Ok(posted)
    }

    /// Records a warehouse transfer.
    ///
    /// # Errors
    ///
    /// See [`TransferService::create`].
    pub async fn create_transfer(
        &self,
        actor: &Actor,
        input: TransferInput,
    ) -> EngineResult<PostedDocument> {
        let txn = self.db.begin().await?;
        let posted = TransferService::create(&txn, actor, input).await?;
        txn.commit().await?;
        self.publish_document(&posted.document, "create");
        Ok(posted)
    }

    /// Voids a document of any type.
    ///
    /// # Errors
    ///
    /// See [`VoidService::void_document`].
    pub async fn void_document(&self, actor: &Actor, input: VoidInput) -> EngineResult<VoidOutcome> {
        let txn = self.db.begin().await?;
        let outcome = VoidService::void_document(&txn, self.tolerance(), actor, input).await?;
        txn.commit().await?;
        self.publish_document(&outcome.document, "void");
        if let Some(order) = &outcome.reopened_order {
            self.publish_document(order, "reopen");
        }
        Ok(outcome)
    }

    /// Loads a document with its lines.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound`.
    pub async fn document(&self, id: DocumentId) -> EngineResult<DocumentWithLines> {
        DocumentRepository::new(&self.db).with_lines(id).await
    }

    /// Lists documents, optionally of one type.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_documents(
        &self,
        doc_type: Option<DocumentType>,
    ) -> EngineResult<Vec<source_documents::Model>> {
        DocumentRepository::new(&self.db).list(doc_type).await
    }

    /// Saves a sales order as a draft.
    ///
    /// # Errors
    ///
    /// See [`OrderService::create`].
    pub async fn create_sales_order(
        &self,
        actor: &Actor,
        input: OrderInput,
    ) -> EngineResult<PostedDocument> {
        self.create_order(actor, DocumentType::SalesOrder, input).await
    }

    /// Saves a purchase order as a draft.
    ///
    /// # Errors
    ///
    /// See [`OrderService::create`].
    pub async fn create_purchase_order(
        &self,
        actor: &Actor,
        input: OrderInput,
    ) -> EngineResult<PostedDocument> {
        self.create_order(actor, DocumentType::PurchaseOrder, input).await
    }

    async fn create_order(
        &self,
        actor: &Actor,
        doc_type: DocumentType,
        input: OrderInput,
    ) -> EngineResult<PostedDocument> {
        let txn = self.db.begin().await?;
        let saved = OrderService::create(&txn, actor, doc_type, input).await?;
        txn.commit().await?;
        self.publish_document(&saved.document, "create");
        Ok(saved)
    }

    /// Invoices a draft order as a sale or purchase.
    ///
    /// # Errors
    ///
    /// See [`OrderService::invoice`].
    pub async fn invoice_order(
        &self,
        actor: &Actor,
        input: InvoiceOrderInput,
    ) -> EngineResult<InvoicedOrder> {
        let txn = self.db.begin().await?;
        let invoiced = OrderService::invoice(&txn, self.tolerance(), actor, input).await?;
        txn.commit().await?;
        self.publish_document(&invoiced.invoice.document, "create");
        self.publish_document(&invoiced.order, "invoice");
        Ok(invoiced)
    }

    fn publish_document(&self, document: &source_documents::Model, action: &str) {
        let doc_type: DocumentType = document.doc_type.into();
        self.publish(doc_type.as_str(), document.id, action);
    }

    // ========== Audit ==========

    /// Appends an audit event on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn record_audit(
        &self,
        actor: &Actor,
        record: AuditRecord,
    ) -> EngineResult<audit_events::Model> {
        AuditRepository::new(&self.db).record(actor, record).await
    }

    /// Audit events of one entity, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn audit_trail(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> EngineResult<Vec<audit_events::Model>> {
        AuditRepository::new(&self.db)
            .for_entity(entity_type, entity_id)
            .await
    }

    // ========== Maintenance ==========

    /// Read-only invariant scan.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails.
    pub async fn health_check(&self) -> EngineResult<HealthReport> {
        health::check(&self.db, self.tolerance()).await
    }

    /// Dumps every table.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails.
    pub async fn dump(&self) -> EngineResult<Snapshot> {
        let txn = self.db.begin().await?;
        let snapshot = backup::dump(&txn).await?;
        txn.commit().await?;
        Ok(snapshot)
    }

    /// Replaces every table with a snapshot that passes the invariant scan.
    ///
    /// # Errors
    ///
    /// `RestoreRejected`, or a database error with the previous book kept.
    pub async fn restore(&self, snapshot: Snapshot) -> EngineResult<()> {
        let txn = self.db.begin().await?;
        backup::restore(&txn, snapshot, self.tolerance()).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Inserts missing default accounts, mappings and warehouse.
    ///
    /// # Errors
    ///
    /// Returns an error if a query or insert fails.
    pub async fn seed_defaults(&self) -> EngineResult<SeedSummary> {
        let txn = self.db.begin().await?;
        let summary = seed::seed_defaults(&txn).await?;
        txn.commit().await?;
        Ok(summary)
    }
}
