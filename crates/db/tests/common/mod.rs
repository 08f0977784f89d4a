//! Shared setup for engine integration tests.
//!
//! Every test gets its own in-memory SQLite book, migrated and seeded with
//! the default chart of accounts and three parties: customers `C0001` and
//! `C0002`, supplier `S0001`.

#![allow(dead_code)]

use chrono::NaiveDate;
use mizan_db::entities::inventory_items;
use mizan_db::migration::{Migrator, MigratorTrait};
use mizan_core::documents::PartyType;
use mizan_db::repositories::{CreateItemInput, CreatePartyInput};
use mizan_db::Engine;
use mizan_shared::config::LedgerConfig;
use mizan_shared::types::{Actor, ItemId};
use mizan_shared::EventBus;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database};

/// A fresh, seeded engine.
pub async fn engine() -> Engine {
    // One connection: every in-memory SQLite connection is its own database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect");
    Migrator::up(&db, None).await.expect("migrate");

    let engine = Engine::new(db, EventBus::with_capacity(64), LedgerConfig::default());
    engine.seed_defaults().await.expect("seed");
    for (code, name, party_type) in [
        ("C0001", "Ayşe Yılmaz", PartyType::Customer),
        ("C0002", "Mehmet Kaya", PartyType::Customer),
        ("S0001", "Toptan Ltd", PartyType::Supplier),
    ] {
        engine
            .create_party(&actor(), CreatePartyInput::new(code, name, party_type))
            .await
            .expect("party");
    }
    engine
}

pub fn actor() -> Actor {
    Actor::system()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Creates an item with an opening balance.
pub async fn stocked_item(
    engine: &Engine,
    sku: &str,
    qty: Decimal,
    unit_cost: Decimal,
) -> inventory_items::Model {
    engine
        .create_item(
            &actor(),
            CreateItemInput {
                sku: sku.to_string(),
                name: format!("Item {sku}"),
                opening_qty: Some(qty),
                opening_cost: Some(unit_cost),
                ..Default::default()
            },
        )
        .await
        .expect("create item")
}

/// Creates an item with nothing on hand.
pub async fn empty_item(engine: &Engine, sku: &str) -> inventory_items::Model {
    engine
        .create_item(
            &actor(),
            CreateItemInput {
                sku: sku.to_string(),
                name: format!("Item {sku}"),
                ..Default::default()
            },
        )
        .await
        .expect("create item")
}

pub fn item_id(item: &inventory_items::Model) -> ItemId {
    ItemId::from_uuid(item.id)
}

/// Net (debit - credit) of an account in the trial balance.
pub async fn net_of(engine: &Engine, code: &str) -> Decimal {
    engine
        .trial_balance()
        .await
        .expect("trial balance")
        .into_iter()
        .find(|row| row.account_code == code)
        .map(|row| row.net)
        .unwrap_or_default()
}
