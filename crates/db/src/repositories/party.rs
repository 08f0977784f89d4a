//! Party repository: the customer and supplier master.

use chrono::Utc;
use mizan_core::documents::{DocumentStatus, DocumentType, PartyType, PaymentMethod};
use mizan_core::ledger::LedgerError;
use mizan_shared::types::PartyId;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::entities::{parties, sea_orm_active_enums, source_documents};
use crate::error::{EngineError, EngineResult};

/// Input for creating a party.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePartyInput {
    /// Party code, unique, e.g. `C0001`.
    pub code: String,
    /// Trade name.
    pub name: String,
    /// Customer, supplier or both.
    pub party_type: PartyType,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Open credit balance allowed; zero for no limit.
    #[serde(default)]
    pub risk_limit: Decimal,
}

impl CreatePartyInput {
    /// A party with no contact details and no risk limit.
    pub fn new(code: impl Into<String>, name: impl Into<String>, party_type: PartyType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            party_type,
            phone: None,
            city: None,
            risk_limit: Decimal::ZERO,
        }
    }
}

/// Party repository.
pub struct PartyRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> PartyRepository<'a, C> {
    /// Creates a repository over a connection or open transaction.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Creates a party.
    ///
    /// # Errors
    ///
    /// A validation error for a blank code or name or a negative limit,
    /// `DuplicatePartyCode` for a taken code.
    pub async fn create(&self, input: CreatePartyInput) -> EngineResult<parties::Model> {
        let code = input.code.trim().to_string();
        let name = input.name.trim().to_string();
        if code.is_empty() || name.is_empty() {
            return Err(LedgerError::Validation("party code and name are required".into()).into());
        }
        if input.risk_limit < Decimal::ZERO {
            return Err(LedgerError::Validation("risk limit cannot be negative".into()).into());
        }
        if self.find_by_code(&code).await?.is_some() {
            return Err(EngineError::DuplicatePartyCode(code));
        }

        let now = Utc::now();
        parties::ActiveModel {
            id: Set(PartyId::new().into_inner()),
            code: Set(code.clone()),
            name: Set(name),
            party_type: Set(input.party_type.into()),
            phone: Set(blank_to_none(input.phone)),
            city: Set(blank_to_none(input.city)),
            risk_limit: Set(input.risk_limit),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await
        .map_err(|err| {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                EngineError::DuplicatePartyCode(code)
            } else {
                err.into()
            }
        })
    }

    /// Finds a party by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_code(&self, code: &str) -> EngineResult<Option<parties::Model>> {
        Ok(parties::Entity::find()
            .filter(parties::Column::Code.eq(code.trim()))
            .one(self.conn)
            .await?)
    }

    /// Loads a party by code.
    ///
    /// # Errors
    ///
    /// `PartyNotFound` for an unknown code.
    pub async fn get_by_code(&self, code: &str) -> EngineResult<parties::Model> {
        self.find_by_code(code)
            .await?
            .ok_or_else(|| EngineError::PartyNotFound(code.trim().to_string()))
    }

    /// Loads a party by id.
    ///
    /// # Errors
    ///
    /// `PartyNotFound` for an unknown id.
    pub async fn get(&self, id: Uuid) -> EngineResult<parties::Model> {
        parties::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| EngineError::PartyNotFound(id.to_string()))
    }

    /// Loads the party a document is raised against and checks it may act
    /// in `role`.
    ///
    /// # Errors
    ///
    /// `PartyNotFound`, or a validation error for a blank code, an
    /// inactive party, or one of the wrong type.
    pub async fn require(&self, code: &str, role: PartyType) -> EngineResult<parties::Model> {
        if code.trim().is_empty() {
            return Err(LedgerError::Validation(format!("{role} is required")).into());
        }
        let party = self.get_by_code(code).await?;
        let party_type: PartyType = party.party_type.into();
        if !party.is_active {
            return Err(
                LedgerError::Validation(format!("party {} is inactive", party.code)).into(),
            );
        }
        if !party_type.covers(role) {
            warn!(code = %party.code, %party_type, %role, "party role rejected");
            return Err(LedgerError::Validation(format!(
                "party {} is a {party_type}, not a {role}",
                party.code
            ))
            .into());
        }
        Ok(party)
    }

    /// All parties, optionally only those able to act in `role`, by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, role: Option<PartyType>) -> EngineResult<Vec<parties::Model>> {
        let mut query = parties::Entity::find();
        if let Some(role) = role {
            query = query.filter(
                parties::Column::PartyType.is_in([
                    sea_orm_active_enums::PartyType::from(role),
                    sea_orm_active_enums::PartyType::Both,
                ]),
            );
        }
        Ok(query
            .order_by_asc(parties::Column::Code)
            .all(self.conn)
            .await?)
    }

    /// Open receivable of a customer: posted credit sales less posted
    /// collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn receivable(&self, party_id: Uuid) -> EngineResult<Decimal> {
        let documents = source_documents::Entity::find()
            .filter(source_documents::Column::PartyId.eq(party_id))
            .filter(
                source_documents::Column::Status
                    .eq(sea_orm_active_enums::DocumentStatus::from(DocumentStatus::Posted)),
            )
            .filter(source_documents::Column::DocType.is_in([
                sea_orm_active_enums::DocumentType::from(DocumentType::Sale),
                sea_orm_active_enums::DocumentType::from(DocumentType::Collection),
            ]))
            .all(self.conn)
            .await?;

        Ok(documents.iter().fold(Decimal::ZERO, |open, doc| {
            let method = doc.method.map(PaymentMethod::from);
            match DocumentType::from(doc.doc_type) {
                DocumentType::Sale if method == Some(PaymentMethod::Credit) => {
                    open + doc.gross_total
                }
                DocumentType::Collection => open - doc.gross_total,
                _ => open,
            }
        }))
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
