//! Item/warehouse registries, stock queries, the low-stock report and
//! the consistency check.

mod common;

use common::{ctx, seed_item, seed_warehouse, ACTOR};
use depot_core::CoreError;
use depot_services::{NewInventoryItem, ServiceError, UpdateInventoryItem, UpdateWarehouse};

#[tokio::test]
async fn create_item_rejects_duplicate_product_and_sku() {
    let ctx = ctx().await;
    seed_item(&ctx, "P-100", 0).await;

    // Same product id.
    let err = ctx
        .inventory
        .create_inventory_item(NewInventoryItem {
            product_id: "P-100".into(),
            sku: "SKU-OTHER".into(),
            product_name: "Widget".into(),
            low_stock_threshold: 0,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::Duplicate { field, .. }) if field == "product_id"
    ));

    // Same sku, different product.
    let err = ctx
        .inventory
        .create_inventory_item(NewInventoryItem {
            product_id: "P-200".into(),
            sku: "SKU-P-100".into(),
            product_name: "Widget".into(),
            low_stock_threshold: 0,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::Duplicate { field, .. }) if field == "sku"
    ));
}

#[tokio::test]
async fn new_items_start_with_zero_counters() {
    let ctx = ctx().await;
    let item = seed_item(&ctx, "P-100", 5).await;

    assert_eq!(item.quantity, 0);
    assert_eq!(item.reserved_quantity, 0);
    assert_eq!(item.available_quantity(), 0);
    // Threshold 5 with zero available: already low.
    assert!(item.is_low_stock());
    assert!(!item.is_in_stock());
}

#[tokio::test]
async fn update_item_changes_details_but_never_counters() {
    let ctx = ctx().await;
    seed_item(&ctx, "P-100", 0).await;
    let warehouse = seed_warehouse(&ctx, "WH-EAST").await;
    ctx.movement
        .add_stock("P-100", &warehouse.id, 9, ACTOR)
        .await
        .unwrap();

    let updated = ctx
        .inventory
        .update_inventory_item(
            "P-100",
            UpdateInventoryItem {
                sku: "SKU-NEW".into(),
                product_name: "Widget Mk2".into(),
                low_stock_threshold: 3,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.sku, "SKU-NEW");
    assert_eq!(updated.product_name, "Widget Mk2");
    assert_eq!(updated.low_stock_threshold, 3);
    assert_eq!(updated.quantity, 9);
}

#[tokio::test]
async fn update_item_rejects_taken_sku() {
    let ctx = ctx().await;
    seed_item(&ctx, "P-100", 0).await;
    seed_item(&ctx, "P-200", 0).await;

    let err = ctx
        .inventory
        .update_inventory_item(
            "P-200",
            UpdateInventoryItem {
                sku: "SKU-P-100".into(),
                product_name: "Clash".into(),
                low_stock_threshold: 0,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::Duplicate { .. })
    ));
}

#[tokio::test]
async fn low_stock_report_follows_available_quantity() {
    let ctx = ctx().await;
    seed_item(&ctx, "P-LOW", 10).await;
    seed_item(&ctx, "P-OK", 10).await;
    let warehouse = seed_warehouse(&ctx, "WH-EAST").await;

    ctx.movement
        .add_stock("P-LOW", &warehouse.id, 30, ACTOR)
        .await
        .unwrap();
    ctx.movement
        .add_stock("P-OK", &warehouse.id, 30, ACTOR)
        .await
        .unwrap();

    // Both healthy so far.
    let low: Vec<_> = ctx
        .inventory
        .get_low_stock_items()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.product_id)
        .collect();
    assert!(low.is_empty());

    // Reserving 25 of P-LOW leaves 5 available <= threshold 10.
    ctx.reservation
        .reserve_stock("P-LOW", &warehouse.id, 25, ACTOR)
        .await
        .unwrap();

    let low: Vec<_> = ctx
        .inventory
        .get_low_stock_items()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.product_id)
        .collect();
    assert_eq!(low, vec!["P-LOW".to_string()]);
}

#[tokio::test]
async fn warehouse_crud_and_duplicate_code() {
    let ctx = ctx().await;
    let warehouse = seed_warehouse(&ctx, "WH-EAST").await;
    assert!(warehouse.is_active);

    let err = ctx
        .inventory
        .create_warehouse(depot_services::NewWarehouse {
            name: "Clone".into(),
            code: "WH-EAST".into(),
            address: None,
            city: None,
            contact_person: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::Duplicate { field, .. }) if field == "code"
    ));

    let updated = ctx
        .inventory
        .update_warehouse(
            &warehouse.id,
            UpdateWarehouse {
                name: "East Coast DC".into(),
                code: "WH-EAST".into(),
                address: Some("1 Dock Rd".into()),
                city: Some("Newark".into()),
                contact_person: Some("R. Alvarez".into()),
                is_active: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "East Coast DC");
    assert!(!updated.is_active);
}

#[tokio::test]
async fn delete_warehouse_blocked_while_it_holds_stock() {
    let ctx = ctx().await;
    seed_item(&ctx, "P-100", 0).await;
    let warehouse = seed_warehouse(&ctx, "WH-EAST").await;

    ctx.movement
        .add_stock("P-100", &warehouse.id, 5, ACTOR)
        .await
        .unwrap();

    let err = ctx.inventory.delete_warehouse(&warehouse.id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::WarehouseNotEmpty(_))
    ));

    // Drain it, then deletion goes through.
    ctx.movement
        .remove_stock("P-100", &warehouse.id, 5, ACTOR)
        .await
        .unwrap();
    ctx.inventory.delete_warehouse(&warehouse.id).await.unwrap();

    let err = ctx.inventory.get_warehouse(&warehouse.id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::WarehouseNotFound(_))
    ));
}

#[tokio::test]
async fn stock_queries_fail_not_found_for_unknown_identifiers() {
    let ctx = ctx().await;

    assert!(matches!(
        ctx.inventory.get_total_stock("P-404").await.unwrap_err(),
        ServiceError::Core(CoreError::ItemNotFound(_))
    ));
    assert!(matches!(
        ctx.inventory
            .get_stock_by_warehouse("wh-404")
            .await
            .unwrap_err(),
        ServiceError::Core(CoreError::WarehouseNotFound(_))
    ));
}

#[tokio::test]
async fn transaction_history_respects_date_bounds() {
    let ctx = ctx().await;
    seed_item(&ctx, "P-100", 0).await;
    let warehouse = seed_warehouse(&ctx, "WH-EAST").await;

    ctx.movement
        .add_stock("P-100", &warehouse.id, 5, ACTOR)
        .await
        .unwrap();

    let all = ctx
        .inventory
        .get_transaction_history("P-100", None, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 1);

    // A window far in the future excludes everything.
    let future = chrono::Utc::now() + chrono::Duration::days(365);
    let none = ctx
        .inventory
        .get_transaction_history("P-100", Some(future), None)
        .await
        .unwrap();
    assert!(none.is_empty());

    // A window that started in the past includes the row.
    let past = chrono::Utc::now() - chrono::Duration::days(1);
    let some = ctx
        .inventory
        .get_transaction_history("P-100", Some(past), Some(future))
        .await
        .unwrap();
    assert_eq!(some.len(), 1);
}

#[tokio::test]
async fn consistency_report_reflects_both_levels() {
    let ctx = ctx().await;
    seed_item(&ctx, "P-100", 0).await;
    let east = seed_warehouse(&ctx, "WH-EAST").await;
    let west = seed_warehouse(&ctx, "WH-WEST").await;

    ctx.movement
        .add_stock("P-100", &east.id, 20, ACTOR)
        .await
        .unwrap();
    ctx.movement
        .add_stock("P-100", &west.id, 10, ACTOR)
        .await
        .unwrap();
    ctx.reservation
        .reserve_stock("P-100", &east.id, 5, ACTOR)
        .await
        .unwrap();

    let report = ctx.inventory.verify_consistency("P-100").await.unwrap();
    assert!(report.is_consistent());
    assert_eq!(report.aggregate_quantity, 30);
    assert_eq!(report.warehouse_quantity, 30);
    assert_eq!(report.aggregate_reserved, 5);
    assert_eq!(report.warehouse_reserved, 5);
}
