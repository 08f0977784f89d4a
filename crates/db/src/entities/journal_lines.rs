//! `SeaORM` Entity for journal lines.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::Dc;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub voucher_id: Uuid,
    pub line_no: i32,
    pub account_code: String,
    pub dc: Dc,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal_vouchers::Entity",
        from = "Column::VoucherId",
        to = "super::journal_vouchers::Column::Id",
        on_delete = "Restrict"
    )]
    JournalVouchers,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountCode",
        to = "super::accounts::Column::Code",
        on_delete = "Restrict"
    )]
    Accounts,
}

impl Related<super::journal_vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalVouchers.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
