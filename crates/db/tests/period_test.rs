//! Period locks across manual postings, documents and voids.

mod common;

use common::{actor, date, engine, item_id, stocked_item};
use mizan_core::documents::PaymentMethod;
use mizan_core::fiscal::PeriodKey;
use mizan_core::ledger::{PostVoucherInput, VoucherLine};
use mizan_db::services::{ItemLineInput, SaleInput, VoidInput};
use mizan_shared::types::DocumentId;
use rust_decimal_macros::dec;

fn january() -> PeriodKey {
    "2026-01".parse().unwrap()
}

fn voucher_on(code: &str, day: chrono::NaiveDate) -> PostVoucherInput {
    PostVoucherInput::new(
        code,
        "manual",
        None,
        Some(day),
        vec![
            VoucherLine::debit("100", dec!(10)),
            VoucherLine::credit("600", dec!(10)),
        ],
    )
}

#[tokio::test]
async fn test_closed_period_rejects_postings() {
    let engine = engine().await;
    engine.close_period(&actor(), january()).await.unwrap();

    assert!(engine.is_locked(date(2026, 1, 15)).await.unwrap());
    assert!(!engine.is_locked(date(2026, 2, 1)).await.unwrap());

    let err = engine
        .post(&actor(), voucher_on("MAN-1", date(2026, 1, 15)))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "PERIOD_LOCKED");
    assert_eq!(err.http_status_code(), 423);

    engine
        .post(&actor(), voucher_on("MAN-2", date(2026, 2, 1)))
        .await
        .unwrap();

    engine.open_period(&actor(), january()).await.unwrap();
    assert!(!engine.is_locked(date(2026, 1, 15)).await.unwrap());
    engine
        .post(&actor(), voucher_on("MAN-1", date(2026, 1, 15)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_closed_period_rejects_documents() {
    let engine = engine().await;
    let item = stocked_item(&engine, "TEA", dec!(10), dec!(20)).await;
    engine.close_period(&actor(), january()).await.unwrap();

    let err = engine
        .create_sale(
            &actor(),
            SaleInput {
                customer: "C0001".into(),
                method: PaymentMethod::Cash,
                lines: vec![ItemLineInput::new(item_id(&item), dec!(1), dec!(10), dec!(0))],
                date: Some(date(2026, 1, 31)),
                description: None,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "PERIOD_LOCKED");
    assert!(engine.list_documents(None).await.unwrap().is_empty());
    assert_eq!(engine.item(item_id(&item)).await.unwrap().qty, dec!(10));
}

#[tokio::test]
async fn test_void_dated_into_an_open_period() {
    let engine = engine().await;
    let item = stocked_item(&engine, "TEA", dec!(10), dec!(20)).await;
    let posted = engine
        .create_sale(
            &actor(),
            SaleInput {
                customer: "C0001".into(),
                method: PaymentMethod::Cash,
                lines: vec![ItemLineInput::new(item_id(&item), dec!(1), dec!(10), dec!(0))],
                date: Some(date(2026, 1, 20)),
                description: None,
            },
        )
        .await
        .unwrap();
    let doc_id = DocumentId::from_uuid(posted.document.id);
    engine.close_period(&actor(), january()).await.unwrap();

    let err = engine
        .void_document(
            &actor(),
            VoidInput {
                document_id: doc_id,
                reason: None,
                date: Some(date(2026, 1, 31)),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "PERIOD_LOCKED");

    let outcome = engine
        .void_document(
            &actor(),
            VoidInput {
                document_id: doc_id,
                reason: None,
                date: Some(date(2026, 2, 2)),
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.reversals[0].voucher_date, date(2026, 2, 2));
}

#[tokio::test]
async fn test_period_changes_are_listed_and_audited() {
    let engine = engine().await;
    engine.close_period(&actor(), january()).await.unwrap();
    engine.open_period(&actor(), january()).await.unwrap();

    let periods = engine.list_periods().await.unwrap();
    assert_eq!(periods.len(), 1);
    assert_eq!(periods[0].period_key, "2026-01");
    assert!(!periods[0].is_closed);

    let trail = engine.audit_trail("fiscal_period", "2026-01").await.unwrap();
    let actions: Vec<_> = trail.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, ["close", "open"]);
}
