//! The customer and supplier master.

mod common;

use common::{actor, date, engine, item_id, stocked_item};
use mizan_core::documents::{PartyType, PaymentMethod};
use mizan_db::entities::sea_orm_active_enums as db_enums;
use mizan_db::repositories::CreatePartyInput;
use mizan_db::services::{CollectionInput, ItemLineInput, PaymentInput, PurchaseInput, SaleInput};
use mizan_db::{Engine, EngineError};
use mizan_shared::types::ItemId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn sell(
    engine: &Engine,
    customer: &str,
    method: PaymentMethod,
    item: ItemId,
    price: Decimal,
) -> Result<String, EngineError> {
    engine
        .create_sale(
            &actor(),
            SaleInput {
                customer: customer.into(),
                method,
                lines: vec![ItemLineInput::new(item, dec!(1), price, dec!(0))],
                date: Some(date(2026, 3, 10)),
                description: None,
            },
        )
        .await
        .map(|posted| posted.document.code)
}

#[tokio::test]
async fn test_create_party() {
    let engine = engine().await;

    let mut input = CreatePartyInput::new(" C0100 ", "Deniz Gıda", PartyType::Both);
    input.phone = Some("0212 555 0100".into());
    input.city = Some("  ".into());
    input.risk_limit = dec!(5000);
    let party = engine.create_party(&actor(), input).await.unwrap();

    assert_eq!(party.code, "C0100");
    assert_eq!(party.party_type, db_enums::PartyType::Both);
    assert_eq!(party.phone.as_deref(), Some("0212 555 0100"));
    assert_eq!(party.city, None);
    assert_eq!(party.risk_limit, dec!(5000));
    assert!(party.is_active);
    assert_eq!(engine.party("C0100").await.unwrap().id, party.id);
}

#[tokio::test]
async fn test_party_input_rules() {
    let engine = engine().await;

    let err = engine
        .create_party(&actor(), CreatePartyInput::new("C0001", "Another", PartyType::Customer))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "DUPLICATE_PARTY_CODE");
    assert_eq!(err.http_status_code(), 409);

    let err = engine
        .create_party(&actor(), CreatePartyInput::new("  ", "Nameless", PartyType::Customer))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    let mut negative = CreatePartyInput::new("C0200", "Negative", PartyType::Customer);
    negative.risk_limit = dec!(-1);
    let err = engine.create_party(&actor(), negative).await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    let err = engine.party("C9999").await.unwrap_err();
    assert_eq!(err.error_code(), "PARTY_NOT_FOUND");
}

#[tokio::test]
async fn test_list_parties_by_role() {
    let engine = engine().await;
    engine
        .create_party(&actor(), CreatePartyInput::new("B0001", "Deniz Gıda", PartyType::Both))
        .await
        .unwrap();

    let codes = |parties: Vec<mizan_db::entities::parties::Model>| {
        parties.into_iter().map(|p| p.code).collect::<Vec<_>>()
    };
    assert_eq!(
        codes(engine.list_parties(None).await.unwrap()),
        ["B0001", "C0001", "C0002", "S0001"]
    );
    assert_eq!(
        codes(engine.list_parties(Some(PartyType::Customer)).await.unwrap()),
        ["B0001", "C0001", "C0002"]
    );
    assert_eq!(
        codes(engine.list_parties(Some(PartyType::Supplier)).await.unwrap()),
        ["B0001", "S0001"]
    );
}

#[tokio::test]
async fn test_documents_need_a_known_party_in_the_right_role() {
    let engine = engine().await;
    let item = stocked_item(&engine, "TEA", dec!(10), dec!(20)).await;

    let err = sell(&engine, "C9999", PaymentMethod::Cash, item_id(&item), dec!(30))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "PARTY_NOT_FOUND");

    let err = sell(&engine, "S0001", PaymentMethod::Cash, item_id(&item), dec!(30))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    let err = engine
        .create_purchase(
            &actor(),
            PurchaseInput {
                supplier: "C0001".into(),
                lines: vec![ItemLineInput::new(item_id(&item), dec!(1), dec!(10), dec!(0))],
                date: Some(date(2026, 3, 1)),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    let err = engine
        .record_payment(
            &actor(),
            PaymentInput {
                supplier: "C0002".into(),
                amount: dec!(10),
                method: PaymentMethod::Cash,
                date: Some(date(2026, 3, 1)),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    // Nothing left the shelf.
    assert_eq!(engine.item(item_id(&item)).await.unwrap().qty, dec!(10));
    assert!(engine.list_documents(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sale_records_the_party() {
    let engine = engine().await;
    let item = stocked_item(&engine, "TEA", dec!(10), dec!(20)).await;
    let customer = engine.party("C0002").await.unwrap();

    sell(&engine, "C0002", PaymentMethod::Cash, item_id(&item), dec!(30))
        .await
        .unwrap();

    let doc = engine.list_documents(None).await.unwrap().remove(0);
    assert_eq!(doc.party.as_deref(), Some("Mehmet Kaya"));
    assert_eq!(doc.party_id, Some(customer.id));
    assert_eq!(doc.origin_id, None);
}

#[tokio::test]
async fn test_risk_limit_caps_credit_sales() {
    let engine = engine().await;
    let item = stocked_item(&engine, "TEA", dec!(10), dec!(20)).await;
    let mut input = CreatePartyInput::new("C0300", "Riskli Market", PartyType::Customer);
    input.risk_limit = dec!(100);
    engine.create_party(&actor(), input).await.unwrap();

    sell(&engine, "C0300", PaymentMethod::Credit, item_id(&item), dec!(60))
        .await
        .unwrap();
    assert_eq!(engine.party_receivable("C0300").await.unwrap(), dec!(60));

    let err = sell(&engine, "C0300", PaymentMethod::Credit, item_id(&item), dec!(41))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "RISK_LIMIT_EXCEEDED");
    assert!(matches!(
        err,
        EngineError::RiskLimitExceeded { ref party, limit, exposure }
            if party == "C0300" && limit == dec!(100) && exposure == dec!(101)
    ));

    // Exactly at the limit is allowed.
    sell(&engine, "C0300", PaymentMethod::Credit, item_id(&item), dec!(40))
        .await
        .unwrap();
    assert_eq!(engine.party_receivable("C0300").await.unwrap(), dec!(100));

    // Cash sales carry no exposure.
    sell(&engine, "C0300", PaymentMethod::Cash, item_id(&item), dec!(500))
        .await
        .unwrap();

    // A collection frees headroom.
    engine
        .record_collection(
            &actor(),
            CollectionInput {
                customer: "C0300".into(),
                amount: dec!(50),
                method: PaymentMethod::Bank,
                date: Some(date(2026, 3, 11)),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(engine.party_receivable("C0300").await.unwrap(), dec!(50));
    sell(&engine, "C0300", PaymentMethod::Credit, item_id(&item), dec!(50))
        .await
        .unwrap();

    assert_eq!(engine.item(item_id(&item)).await.unwrap().qty, dec!(6));
}
