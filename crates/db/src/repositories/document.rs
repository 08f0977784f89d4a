//! Source document repository.

use chrono::{DateTime, NaiveDate, Utc};
use mizan_core::documents::{
    DocumentStatus, DocumentTotals, DocumentType, PaymentMethod, format_code, highest_number,
};
use mizan_shared::types::{DocumentId, UserId, WarehouseId};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{document_lines, document_sequences, sea_orm_active_enums, source_documents};
use crate::error::{EngineError, EngineResult};

/// Header of a new document. It is stored as a draft.
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// Kind of document.
    pub doc_type: DocumentType,
    /// Customer, supplier or expense category.
    pub party: Option<String>,
    /// Master record of the party, when there is one.
    pub party_id: Option<Uuid>,
    /// Order this document invoices.
    pub origin_id: Option<Uuid>,
    /// Settlement method.
    pub method: Option<PaymentMethod>,
    /// Free text.
    pub description: Option<String>,
    /// Business date.
    pub document_date: NaiveDate,
    /// Source warehouse, for transfers.
    pub warehouse_id: Option<WarehouseId>,
    /// Destination warehouse, for transfers.
    pub to_warehouse_id: Option<WarehouseId>,
    /// Acting user.
    pub created_by: Option<UserId>,
}

/// A priced line to store under a document.
#[derive(Debug, Clone, Default)]
pub struct NewDocumentLine {
    /// Stock item, if the line moves goods.
    pub item_id: Option<Uuid>,
    /// Free text.
    pub description: Option<String>,
    /// Quantity.
    pub qty: Decimal,
    /// Unit price before VAT.
    pub unit_price: Decimal,
    /// VAT rate as a fraction.
    pub vat_rate: Decimal,
    /// Net amount.
    pub net: Decimal,
    /// VAT amount.
    pub vat: Decimal,
    /// Gross amount.
    pub gross: Decimal,
    /// Unit cost taken out of stock.
    pub unit_cost: Option<Decimal>,
}

/// A document with its lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentWithLines {
    /// Header.
    pub document: source_documents::Model,
    /// Lines in entry order.
    pub lines: Vec<document_lines::Model>,
}

/// Document repository.
pub struct DocumentRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> DocumentRepository<'a, C> {
    /// Creates a repository over a connection or open transaction.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Takes the next code for `doc_type`, e.g. `SAL-0004`.
    ///
    /// The per-type counter row is bumped in place, so concurrent writers
    /// queue on its row lock instead of reading the same maximum. The
    /// first use of a type seeds the counter from the codes already
    /// stored. A rolled back transaction gives its number back.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn next_code(&self, doc_type: DocumentType) -> EngineResult<String> {
        let key = doc_type.as_str();
        if !self.bump_sequence(key).await? {
            self.seed_sequence(doc_type).await?;
            self.bump_sequence(key).await?;
        }

        let last = document_sequences::Entity::find_by_id(key.to_string())
            .one(self.conn)
            .await?
            .map_or(0, |row| row.last_value);
        Ok(format_code(
            doc_type.code_prefix(),
            u64::try_from(last).unwrap_or_default(),
        ))
    }

    async fn bump_sequence(&self, key: &str) -> EngineResult<bool> {
        let result = document_sequences::Entity::update_many()
            .col_expr(
                document_sequences::Column::LastValue,
                Expr::col(document_sequences::Column::LastValue).add(1),
            )
            .filter(document_sequences::Column::DocType.eq(key))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn seed_sequence(&self, doc_type: DocumentType) -> EngineResult<()> {
        let prefix = doc_type.code_prefix();
        let codes: Vec<String> = source_documents::Entity::find()
            .select_only()
            .column(source_documents::Column::Code)
            .filter(source_documents::Column::Code.starts_with(format!("{prefix}-")))
            .into_tuple()
            .all(self.conn)
            .await?;
        let start = highest_number(prefix, codes.iter().map(String::as_str));

        // A concurrent first use may have seeded it already; keep theirs.
        document_sequences::Entity::insert(document_sequences::ActiveModel {
            doc_type: Set(doc_type.as_str().to_string()),
            last_value: Set(i64::try_from(start).unwrap_or(i64::MAX)),
        })
        .on_conflict(
            OnConflict::column(document_sequences::Column::DocType)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.conn)
        .await?;

        debug!(doc_type = %doc_type, start, "document sequence seeded");
        Ok(())
    }

    /// Inserts a draft document under a freshly generated code.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert(&self, doc: NewDocument) -> EngineResult<source_documents::Model> {
        let code = self.next_code(doc.doc_type).await?;
        let model = source_documents::ActiveModel {
            id: Set(DocumentId::new().into_inner()),
            doc_type: Set(doc.doc_type.into()),
            code: Set(code),
            status: Set(sea_orm_active_enums::DocumentStatus::Draft),
            party: Set(doc.party),
            party_id: Set(doc.party_id),
            method: Set(doc.method.map(Into::into)),
            description: Set(doc.description),
            document_date: Set(doc.document_date),
            net_total: Set(Decimal::ZERO),
            vat_total: Set(Decimal::ZERO),
            gross_total: Set(Decimal::ZERO),
            warehouse_id: Set(doc.warehouse_id.map(WarehouseId::into_inner)),
            to_warehouse_id: Set(doc.to_warehouse_id.map(WarehouseId::into_inner)),
            voucher_id: Set(None),
            reversal_voucher_id: Set(None),
            void_reason: Set(None),
            voided_at: Set(None),
            created_by: Set(doc.created_by.map(UserId::into_inner)),
            created_at: Set(Utc::now()),
            origin_id: Set(doc.origin_id),
        };
        Ok(model.insert(self.conn).await?)
    }

    /// Appends lines to a document, numbered from 1.
    ///
    /// # Errors
    ///
    /// Returns an error if an insert fails.
    pub async fn insert_lines(
        &self,
        document_id: Uuid,
        lines: Vec<NewDocumentLine>,
    ) -> EngineResult<Vec<document_lines::Model>> {
        let mut stored = Vec::with_capacity(lines.len());
        for (line_no, line) in (1_i32..).zip(lines) {
            let model = document_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                document_id: Set(document_id),
                line_no: Set(line_no),
                item_id: Set(line.item_id),
                description: Set(line.description),
                qty: Set(line.qty),
                unit_price: Set(line.unit_price),
                vat_rate: Set(line.vat_rate),
                net: Set(line.net),
                vat: Set(line.vat),
                gross: Set(line.gross),
                unit_cost: Set(line.unit_cost),
            };
            stored.push(model.insert(self.conn).await?);
        }
        Ok(stored)
    }

    /// Finds a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find(&self, id: DocumentId) -> EngineResult<Option<source_documents::Model>> {
        Ok(source_documents::Entity::find_by_id(id.into_inner())
            .one(self.conn)
            .await?)
    }

    /// Loads a document.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` for an unknown id.
    pub async fn get(&self, id: DocumentId) -> EngineResult<source_documents::Model> {
        self.find(id)
            .await?
            .ok_or(EngineError::DocumentNotFound(id.into_inner()))
    }

    /// Whether `id` names a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn exists(&self, id: Uuid) -> EngineResult<bool> {
        Ok(self.find(DocumentId::from_uuid(id)).await?.is_some())
    }

    /// Loads a document with its lines.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` for an unknown id.
    pub async fn with_lines(&self, id: DocumentId) -> EngineResult<DocumentWithLines> {
        let document = self.get(id).await?;
        let lines = self.lines(document.id).await?;
        Ok(DocumentWithLines { document, lines })
    }

    /// Lines of a document in entry order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn lines(&self, document_id: Uuid) -> EngineResult<Vec<document_lines::Model>> {
        Ok(document_lines::Entity::find()
            .filter(document_lines::Column::DocumentId.eq(document_id))
            .order_by_asc(document_lines::Column::LineNo)
            .all(self.conn)
            .await?)
    }

    /// Documents of a type, newest code first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        doc_type: Option<DocumentType>,
    ) -> EngineResult<Vec<source_documents::Model>> {
        let mut query = source_documents::Entity::find();
        if let Some(doc_type) = doc_type {
            query = query.filter(
                source_documents::Column::DocType
                    .eq(sea_orm_active_enums::DocumentType::from(doc_type)),
            );
        }
        Ok(query
            .order_by_desc(source_documents::Column::DocumentDate)
            .order_by_desc(source_documents::Column::Code)
            .all(self.conn)
            .await?)
    }

    /// Moves a draft to posted, recording its voucher and totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn mark_posted(
        &self,
        doc: source_documents::Model,
        voucher_id: Option<Uuid>,
        totals: DocumentTotals,
    ) -> EngineResult<source_documents::Model> {
        let mut model: source_documents::ActiveModel = doc.into();
        model.status = Set(DocumentStatus::Posted.into());
        model.voucher_id = Set(voucher_id);
        model.net_total = Set(totals.net);
        model.vat_total = Set(totals.vat);
        model.gross_total = Set(totals.gross);
        Ok(model.update(self.conn).await?)
    }

    /// Records the totals of a draft without posting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn set_totals(
        &self,
        doc: source_documents::Model,
        totals: DocumentTotals,
    ) -> EngineResult<source_documents::Model> {
        let mut model: source_documents::ActiveModel = doc.into();
        model.net_total = Set(totals.net);
        model.vat_total = Set(totals.vat);
        model.gross_total = Set(totals.gross);
        Ok(model.update(self.conn).await?)
    }

    /// Marks a draft order invoiced, linking it to the invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn mark_invoiced(
        &self,
        order: source_documents::Model,
        invoice_id: Uuid,
    ) -> EngineResult<source_documents::Model> {
        let mut model: source_documents::ActiveModel = order.into();
        model.status = Set(DocumentStatus::Posted.into());
        model.origin_id = Set(Some(invoice_id));
        Ok(model.update(self.conn).await?)
    }

    /// Puts an invoiced order back to draft after its invoice was voided.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn reopen(
        &self,
        order: source_documents::Model,
    ) -> EngineResult<source_documents::Model> {
        let mut model: source_documents::ActiveModel = order.into();
        model.status = Set(DocumentStatus::Draft.into());
        model.origin_id = Set(None);
        Ok(model.update(self.conn).await?)
    }

    /// Moves a posted document, or a draft order, to void.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn mark_void(
        &self,
        doc: source_documents::Model,
        reversal_voucher_id: Option<Uuid>,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> EngineResult<source_documents::Model> {
        let mut model: source_documents::ActiveModel = doc.into();
        model.status = Set(DocumentStatus::Void.into());
        model.reversal_voucher_id = Set(reversal_voucher_id);
        model.void_reason = Set(reason);
        model.voided_at = Set(Some(at));
        Ok(model.update(self.conn).await?)
    }
}
