//! Weighted-average costing and stock movements against the store.

mod common;

use common::{actor, empty_item, engine, item_id, stocked_item};
use mizan_db::entities::sea_orm_active_enums::MovementType;
use mizan_db::repositories::{CreateItemInput, MovementSource};
use mizan_shared::types::WarehouseId;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_weighted_average_over_two_receipts() {
    let engine = engine().await;
    let item = empty_item(&engine, "CABLE").await;
    let id = item_id(&item);

    engine
        .apply_inbound(&actor(), id, dec!(10), dec!(100), MovementSource::untracked("manual"))
        .await
        .unwrap();
    engine
        .apply_inbound(&actor(), id, dec!(10), dec!(200), MovementSource::untracked("manual"))
        .await
        .unwrap();

    let item = engine.item(id).await.unwrap();
    assert_eq!(item.qty, dec!(20));
    assert_eq!(item.avg_cost, dec!(150));
}

#[tokio::test]
async fn test_outbound_uses_average_and_keeps_it() {
    let engine = engine().await;
    let item = stocked_item(&engine, "CABLE", dec!(8), dec!(25)).await;
    let id = item_id(&item);

    let movement = engine
        .apply_outbound(&actor(), id, dec!(3), MovementSource::untracked("manual"))
        .await
        .unwrap();

    assert_eq!(movement.movement_type, MovementType::Out);
    assert_eq!(movement.unit_cost, dec!(25));
    let item = engine.item(id).await.unwrap();
    assert_eq!(item.qty, dec!(5));
    assert_eq!(item.avg_cost, dec!(25));
}

#[tokio::test]
async fn test_negative_stock_is_rejected_without_a_movement() {
    let engine = engine().await;
    let item = stocked_item(&engine, "CABLE", dec!(10), dec!(4)).await;
    let id = item_id(&item);
    let before = engine.item_movements(id).await.unwrap().len();

    let err = engine
        .apply_outbound(&actor(), id, dec!(15), MovementSource::untracked("manual"))
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "NEGATIVE_STOCK");
    assert_eq!(engine.item(id).await.unwrap().qty, dec!(10));
    assert_eq!(engine.item_movements(id).await.unwrap().len(), before);
}

#[tokio::test]
async fn test_opening_balance_is_an_adjustment() {
    let engine = engine().await;
    let item = stocked_item(&engine, "CABLE", dec!(12), dec!(3)).await;

    assert_eq!(item.qty, dec!(12));
    assert_eq!(item.avg_cost, dec!(3));

    let movements = engine.item_movements(item_id(&item)).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].movement_type, MovementType::Adjust);
    assert_eq!(movements[0].source_type, "opening");
}

#[tokio::test]
async fn test_return_keeps_average() {
    let engine = engine().await;
    let item = stocked_item(&engine, "CABLE", dec!(10), dec!(20)).await;
    let id = item_id(&item);

    engine
        .apply_return(&actor(), id, dec!(2), dec!(20), MovementSource::untracked("manual"))
        .await
        .unwrap();

    let item = engine.item(id).await.unwrap();
    assert_eq!(item.qty, dec!(12));
    assert_eq!(item.avg_cost, dec!(20));
}

#[tokio::test]
async fn test_transfer_between_warehouses() {
    let engine = engine().await;
    let item = stocked_item(&engine, "CABLE", dec!(10), dec!(20)).await;
    let id = item_id(&item);
    let warehouses = engine.list_warehouses().await.unwrap();
    let main = WarehouseId::from_uuid(warehouses[0].id);
    let annex = engine
        .create_warehouse(&actor(), "D02", "Yan Depo")
        .await
        .unwrap();
    let annex = WarehouseId::from_uuid(annex.id);

    let movement = engine
        .apply_transfer(&actor(), id, dec!(4), main, annex, MovementSource::untracked("manual"))
        .await
        .unwrap();
    assert_eq!(movement.movement_type, MovementType::Transfer);
    assert_eq!(movement.warehouse_id, Some(main.into_inner()));
    assert_eq!(movement.to_warehouse_id, Some(annex.into_inner()));
    assert_eq!(engine.item(id).await.unwrap().qty, dec!(6));

    let err = engine
        .apply_transfer(&actor(), id, dec!(1), main, main, MovementSource::untracked("manual"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "SAME_WAREHOUSE");

    let err = engine
        .apply_transfer(
            &actor(),
            id,
            dec!(1),
            main,
            WarehouseId::new(),
            MovementSource::untracked("manual"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "WAREHOUSE_MISSING");
}

#[tokio::test]
async fn test_item_rules() {
    let engine = engine().await;
    empty_item(&engine, "CABLE").await;

    let err = engine
        .create_item(
            &actor(),
            CreateItemInput {
                sku: "CABLE".into(),
                name: "Second cable".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "DUPLICATE_SKU");

    let err = engine
        .apply_inbound(
            &actor(),
            mizan_shared::types::ItemId::new(),
            dec!(1),
            dec!(1),
            MovementSource::untracked("manual"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ITEM_MISSING");
}

#[tokio::test]
async fn test_low_stock() {
    let engine = engine().await;
    engine
        .create_item(
            &actor(),
            CreateItemInput {
                sku: "LOW".into(),
                name: "Runs low".into(),
                min_qty: dec!(5),
                opening_qty: Some(dec!(3)),
                opening_cost: Some(dec!(1)),
            },
        )
        .await
        .unwrap();
    stocked_item(&engine, "PLENTY", dec!(50), dec!(1)).await;

    let low = engine.low_stock().await.unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].sku, "LOW");
}

#[tokio::test]
async fn test_every_stock_write_bumps_the_version() {
    let engine = engine().await;
    let item = empty_item(&engine, "CABLE").await;
    assert_eq!(item.version, 0);
    let id = item_id(&item);

    engine
        .apply_inbound(&actor(), id, dec!(5), dec!(10), MovementSource::untracked("manual"))
        .await
        .unwrap();
    engine
        .apply_outbound(&actor(), id, dec!(2), MovementSource::untracked("manual"))
        .await
        .unwrap();
    assert_eq!(engine.item(id).await.unwrap().version, 2);

    // A rejected issue writes nothing.
    let err = engine
        .apply_outbound(&actor(), id, dec!(4), MovementSource::untracked("manual"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NEGATIVE_STOCK");
    assert!(!err.is_retryable());
    assert_eq!(engine.item(id).await.unwrap().version, 2);

    let opened = stocked_item(&engine, "PLUG", dec!(3), dec!(7)).await;
    assert_eq!(opened.version, 1);
}
