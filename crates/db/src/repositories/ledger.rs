//! Ledger repository: the single gateway for journal postings.
//!
//! Every voucher, whatever its source, goes through [`LedgerRepository::post`]
//! or [`LedgerRepository::reverse`]. Both run on the caller's connection, so a
//! document service can post several vouchers inside one transaction.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use mizan_core::ledger::{
    AccountType, Dc, LedgerError, LedgerService, PostVoucherInput, VoucherLine, VoucherStatus,
};
use mizan_core::reversal::{ReversalInput, ReversalService};
use mizan_shared::types::VoucherId;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::account::AccountRepository;
use super::fiscal::FiscalRepository;
use crate::entities::{accounts, journal_lines, journal_vouchers, sea_orm_active_enums};
use crate::error::{EngineError, EngineResult};

/// A voucher header with its lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherWithLines {
    /// Header.
    pub voucher: journal_vouchers::Model,
    /// Lines in posting order.
    pub lines: Vec<journal_lines::Model>,
}

/// One row of the trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account code.
    pub account_code: String,
    /// Account name.
    pub account_name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Sum of debit lines.
    pub debit: Decimal,
    /// Sum of credit lines.
    pub credit: Decimal,
    /// `debit - credit`.
    pub net: Decimal,
}

/// Header fields not carried by [`PostVoucherInput`].
#[derive(Debug, Clone, Default)]
struct HeaderExtras {
    description: Option<String>,
    reverses_voucher_id: Option<Uuid>,
}

/// Ledger repository.
pub struct LedgerRepository<'a, C> {
    conn: &'a C,
    tolerance: Decimal,
}

impl<'a, C: ConnectionTrait> LedgerRepository<'a, C> {
    /// Creates a repository that checks balance within `tolerance`.
    #[must_use]
    pub const fn new(conn: &'a C, tolerance: Decimal) -> Self {
        Self { conn, tolerance }
    }

    /// Validates and posts a voucher.
    ///
    /// Line checks and the balance check run before anything is read or
    /// written; then accounts, the period lock and the code are checked.
    /// The voucher date defaults to today.
    ///
    /// # Errors
    ///
    /// `VoucherUnbalanced`, `InsufficientLines`, `NonPositiveAmount`,
    /// `UnknownAccount`, `InactiveAccount`, `PeriodLocked` or
    /// `DuplicateVoucherCode`.
    pub async fn post(&self, input: PostVoucherInput) -> EngineResult<journal_vouchers::Model> {
        self.insert_voucher(input, HeaderExtras::default()).await
    }

    /// Posts the exact debit/credit swap of a posted voucher and marks the
    /// original void. The original's lines are untouched.
    ///
    /// # Errors
    ///
    /// `VoucherNotFound`, `AlreadyVoid`, or any error of [`Self::post`] for
    /// the reversal.
    pub async fn reverse(
        &self,
        voucher_id: Uuid,
        reason: Option<String>,
        reversal_date: Option<NaiveDate>,
    ) -> EngineResult<journal_vouchers::Model> {
        let original = self.get(voucher_id).await?;
        LedgerService::validate_can_void(original.id, original.status.into())?;

        let original_lines = self.voucher_lines(original.id).await?;
        if !ReversalService::validate_reversal(&original_lines) {
            warn!(code = %original.code, "reversing a voucher balanced only within tolerance");
        }
        let reversal = ReversalService::create_reversal(&ReversalInput {
            original_voucher_id: original.id,
            original_code: original.code.clone(),
            original_source_type: original.source_type.clone(),
            original_lines,
            void_reason: reason,
        });

        let input = PostVoucherInput {
            code: reversal.code,
            source_type: reversal.source_type,
            source_id: original.source_id,
            voucher_date: reversal_date,
            lines: reversal.lines,
        };
        let posted = self
            .insert_voucher(
                input,
                HeaderExtras {
                    description: Some(reversal.description),
                    reverses_voucher_id: Some(original.id),
                },
            )
            .await?;

        let mut voided: journal_vouchers::ActiveModel = original.into();
        voided.status = Set(sea_orm_active_enums::VoucherStatus::Void);
        voided.reversed_by_voucher_id = Set(Some(posted.id));
        voided.update(self.conn).await?;

        debug!(reversal_id = %posted.id, original_id = %voucher_id, "voucher reversed");
        Ok(posted)
    }

    /// Finds a voucher header.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find(&self, id: Uuid) -> EngineResult<Option<journal_vouchers::Model>> {
        Ok(journal_vouchers::Entity::find_by_id(id).one(self.conn).await?)
    }

    /// Loads a voucher header.
    ///
    /// # Errors
    ///
    /// `VoucherNotFound` for an unknown id.
    pub async fn get(&self, id: Uuid) -> EngineResult<journal_vouchers::Model> {
        self.find(id)
            .await?
            .ok_or_else(|| LedgerError::VoucherNotFound(id).into())
    }

    /// Finds a voucher by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_code(&self, code: &str) -> EngineResult<Option<journal_vouchers::Model>> {
        Ok(journal_vouchers::Entity::find()
            .filter(journal_vouchers::Column::Code.eq(code))
            .one(self.conn)
            .await?)
    }

    /// Loads a voucher with its lines.
    ///
    /// # Errors
    ///
    /// `VoucherNotFound` for an unknown id.
    pub async fn with_lines(&self, id: VoucherId) -> EngineResult<VoucherWithLines> {
        let voucher = self.get(id.into_inner()).await?;
        let lines = self.lines(voucher.id).await?;
        Ok(VoucherWithLines { voucher, lines })
    }

    /// Stored lines of a voucher in posting order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn lines(&self, voucher_id: Uuid) -> EngineResult<Vec<journal_lines::Model>> {
        Ok(journal_lines::Entity::find()
            .filter(journal_lines::Column::VoucherId.eq(voucher_id))
            .order_by_asc(journal_lines::Column::LineNo)
            .all(self.conn)
            .await?)
    }

    /// Lines of a voucher as domain values.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn voucher_lines(&self, voucher_id: Uuid) -> EngineResult<Vec<VoucherLine>> {
        Ok(self
            .lines(voucher_id)
            .await?
            .into_iter()
            .map(|l| VoucherLine {
                account_code: l.account_code,
                dc: l.dc.into(),
                amount: l.amount,
                description: l.description,
            })
            .collect())
    }

    /// Posted vouchers a source produced, under any of `source_types`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn posted_for_source(
        &self,
        source_types: &[&str],
        source_id: Uuid,
    ) -> EngineResult<Vec<journal_vouchers::Model>> {
        if source_types.is_empty() {
            return Ok(Vec::new());
        }
        Ok(journal_vouchers::Entity::find()
            .filter(journal_vouchers::Column::SourceType.is_in(source_types.iter().copied()))
            .filter(journal_vouchers::Column::SourceId.eq(source_id))
            .filter(journal_vouchers::Column::Status.eq(sea_orm_active_enums::VoucherStatus::Posted))
            .order_by_asc(journal_vouchers::Column::CreatedAt)
            .order_by_asc(journal_vouchers::Column::Id)
            .all(self.conn)
            .await?)
    }

    /// Vouchers dated within `[from, to]`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> EngineResult<Vec<journal_vouchers::Model>> {
        let mut query = journal_vouchers::Entity::find();
        if let Some(from) = from {
            query = query.filter(journal_vouchers::Column::VoucherDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(journal_vouchers::Column::VoucherDate.lte(to));
        }
        Ok(query
            .order_by_asc(journal_vouchers::Column::VoucherDate)
            .order_by_asc(journal_vouchers::Column::Code)
            .all(self.conn)
            .await?)
    }

    /// Debit and credit totals per account over every line, void vouchers
    /// included: a void voucher and its reversal cancel out.
    ///
    /// Accounts without lines are listed with zero totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn trial_balance(&self) -> EngineResult<Vec<TrialBalanceRow>> {
        let accounts = accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .all(self.conn)
            .await?;
        let lines = journal_lines::Entity::find().all(self.conn).await?;

        let mut totals: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
        for line in lines {
            let entry = totals.entry(line.account_code).or_default();
            match Dc::from(line.dc) {
                Dc::Debit => entry.0 += line.amount,
                Dc::Credit => entry.1 += line.amount,
            }
        }

        Ok(accounts
            .into_iter()
            .map(|a| {
                let (debit, credit) = totals.get(&a.code).copied().unwrap_or_default();
                TrialBalanceRow {
                    account_code: a.code,
                    account_name: a.name,
                    account_type: a.account_type.into(),
                    debit,
                    credit,
                    net: debit - credit,
                }
            })
            .collect())
    }

    async fn insert_voucher(
        &self,
        input: PostVoucherInput,
        extras: HeaderExtras,
    ) -> EngineResult<journal_vouchers::Model> {
        mizan_core::ledger::validate_lines(&input.lines, self.tolerance).inspect_err(|e| {
            warn!(code = %input.code, error_code = e.error_code(), "voucher rejected");
        })?;

        let accounts = AccountRepository::new(self.conn)
            .lookup(input.lines.iter().map(|l| l.account_code.as_str()))
            .await?;
        LedgerService::validate_voucher(&input.lines, self.tolerance, |code| {
            accounts.get(code).cloned()
        })?;

        let voucher_date = input
            .voucher_date
            .unwrap_or_else(|| Utc::now().date_naive());
        FiscalRepository::new(self.conn)
            .ensure_open(voucher_date)
            .await?;

        if self.find_by_code(&input.code).await?.is_some() {
            warn!(code = %input.code, "duplicate voucher code");
            return Err(LedgerError::DuplicateVoucherCode(input.code).into());
        }

        let voucher_id = VoucherId::new().into_inner();
        let code = input.code;
        let header = journal_vouchers::ActiveModel {
            id: Set(voucher_id),
            code: Set(code.clone()),
            status: Set(VoucherStatus::Posted.into()),
            source_type: Set(input.source_type),
            source_id: Set(input.source_id),
            voucher_date: Set(voucher_date),
            description: Set(extras.description),
            reversed_by_voucher_id: Set(None),
            reverses_voucher_id: Set(extras.reverses_voucher_id),
            created_at: Set(Utc::now()),
        };
        // The check above can race another writer; the unique index decides.
        let header = header.insert(self.conn).await.map_err(|err| {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                warn!(code = %code, "duplicate voucher code on insert");
                EngineError::from(LedgerError::DuplicateVoucherCode(code))
            } else {
                err.into()
            }
        })?;

        for (line_no, line) in (1_i32..).zip(input.lines) {
            journal_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                voucher_id: Set(voucher_id),
                line_no: Set(line_no),
                account_code: Set(line.account_code),
                dc: Set(line.dc.into()),
                amount: Set(line.amount),
                description: Set(line.description),
            }
            .insert(self.conn)
            .await?;
        }

        debug!(voucher_id = %header.id, code = %header.code, "voucher posted");
        Ok(header)
    }
}
