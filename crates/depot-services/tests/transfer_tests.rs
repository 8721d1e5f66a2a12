//! Stock transfer workflow: the approval progression, movement on
//! completion only, all-or-nothing semantics, and cancellation.

mod common;

use common::{ctx, seed_item, seed_warehouse, Ctx, ACTOR};
use depot_core::{CoreError, TransactionType, TransferStatus};
use depot_services::{ServiceError, TransferItemInput};

fn line(product_id: &str, quantity: i64) -> TransferItemInput {
    TransferItemInput {
        product_id: product_id.to_string(),
        quantity,
        notes: None,
    }
}

/// Stocks P-1 (30 units) and P-2 (12 units) in a source warehouse and
/// creates an empty destination.
async fn stocked_pair(ctx: &Ctx) -> (String, String) {
    let source = seed_warehouse(ctx, "WH-SRC").await;
    let destination = seed_warehouse(ctx, "WH-DST").await;

    for (product, qty) in [("P-1", 30), ("P-2", 12)] {
        seed_item(ctx, product, 0).await;
        ctx.movement
            .add_stock(product, &source.id, qty, ACTOR)
            .await
            .unwrap();
    }

    (source.id, destination.id)
}

#[tokio::test]
async fn create_drafts_a_transfer_with_snapshotted_lines() {
    let ctx = ctx().await;
    let (source, destination) = stocked_pair(&ctx).await;

    let transfer = ctx
        .transfers
        .create(
            &source,
            &destination,
            &[line("P-1", 10), line("P-2", 5)],
            "planner-1",
            Some("rebalance"),
        )
        .await
        .unwrap();

    assert_eq!(transfer.status, TransferStatus::Draft);
    assert!(transfer.transfer_number.starts_with("ST-"));
    assert_eq!(transfer.requested_by, "planner-1");
    assert!(transfer.approved_by.is_none());

    let lines = ctx.transfers.get_items(&transfer.id).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines.iter().map(|l| l.quantity).sum::<i64>(), 15);
}

#[tokio::test]
async fn create_validates_everything_it_references() {
    let ctx = ctx().await;
    let (source, destination) = stocked_pair(&ctx).await;

    // Unknown destination.
    let err = ctx
        .transfers
        .create(&source, "wh-missing", &[line("P-1", 1)], ACTOR, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::WarehouseNotFound(_))
    ));

    // Unknown product, named in the error.
    let err = ctx
        .transfers
        .create(&source, &destination, &[line("P-404", 1)], ACTOR, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::ItemNotFound(id)) if id == "P-404"
    ));

    // Same warehouse on both ends.
    let err = ctx
        .transfers
        .create(&source, &source, &[line("P-1", 1)], ACTOR, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));

    // No lines.
    let err = ctx
        .transfers
        .create(&source, &destination, &[], ACTOR, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
}

#[tokio::test]
async fn full_lifecycle_moves_stock_only_on_completion() {
    let ctx = ctx().await;
    let (source, destination) = stocked_pair(&ctx).await;

    let transfer = ctx
        .transfers
        .create(&source, &destination, &[line("P-1", 10)], "planner-1", None)
        .await
        .unwrap();

    let pending = ctx.transfers.submit(&transfer.id).await.unwrap();
    assert_eq!(pending.status, TransferStatus::Pending);

    let approved = ctx
        .transfers
        .approve(&transfer.id, "supervisor-1", None)
        .await
        .unwrap();
    assert_eq!(approved.status, TransferStatus::Approved);
    assert_eq!(approved.approved_by.as_deref(), Some("supervisor-1"));
    assert!(approved.approval_date.is_some());

    let in_transit = ctx.transfers.mark_in_transit(&transfer.id).await.unwrap();
    assert_eq!(in_transit.status, TransferStatus::InTransit);

    // Through all of the above, nothing has moved.
    let rows = ctx.inventory.get_stock_by_warehouse(&source).await.unwrap();
    assert_eq!(rows.iter().map(|r| r.quantity).sum::<i64>(), 42);
    assert!(ctx
        .inventory
        .get_stock_by_warehouse(&destination)
        .await
        .unwrap()
        .is_empty());

    let completed = ctx
        .transfers
        .complete(&transfer.id, "driver-9", None)
        .await
        .unwrap();
    assert_eq!(completed.status, TransferStatus::Completed);

    // Source lost 10, destination gained 10, aggregate unchanged.
    let p1 = ctx.inventory.get_inventory_item("P-1").await.unwrap();
    assert_eq!(p1.quantity, 30);

    let source_rows = ctx.inventory.get_stock_by_warehouse(&source).await.unwrap();
    let p1_at_source = source_rows
        .iter()
        .find(|r| r.inventory_item_id == p1.id)
        .unwrap();
    assert_eq!(p1_at_source.quantity, 20);

    let dest_rows = ctx
        .inventory
        .get_stock_by_warehouse(&destination)
        .await
        .unwrap();
    assert_eq!(dest_rows.len(), 1);
    assert_eq!(dest_rows[0].quantity, 10);

    // One StockOut/StockIn pair referencing the transfer number.
    let ledger = ctx
        .db
        .transactions()
        .get_by_reference(&transfer.transfer_number)
        .await
        .unwrap();
    assert_eq!(ledger.len(), 2);
    assert!(ledger
        .iter()
        .any(|t| t.transaction_type == TransactionType::StockOut && t.quantity == 10));
    assert!(ledger
        .iter()
        .any(|t| t.transaction_type == TransactionType::StockIn && t.quantity == 10));
    assert!(ledger.iter().all(|t| t.created_by == "driver-9"));

    let report = ctx.inventory.verify_consistency("P-1").await.unwrap();
    assert!(report.is_consistent());
}

#[tokio::test]
async fn forward_path_cannot_skip_states() {
    let ctx = ctx().await;
    let (source, destination) = stocked_pair(&ctx).await;

    let transfer = ctx
        .transfers
        .create(&source, &destination, &[line("P-1", 5)], ACTOR, None)
        .await
        .unwrap();

    // Draft cannot be approved or completed directly.
    let err = ctx
        .transfers
        .approve(&transfer.id, "supervisor-1", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::InvalidStateTransition { .. })
    ));

    let err = ctx
        .transfers
        .complete(&transfer.id, ACTOR, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::InvalidStateTransition { .. })
    ));

    // And nothing moved.
    assert_eq!(ctx.inventory.get_total_stock("P-1").await.unwrap(), 30);
}

#[tokio::test]
async fn insufficient_source_stock_aborts_the_whole_transfer() {
    let ctx = ctx().await;
    let (source, destination) = stocked_pair(&ctx).await;

    // P-1 is coverable, P-2 is not (12 on hand, 20 requested).
    let transfer = ctx
        .transfers
        .create(
            &source,
            &destination,
            &[line("P-1", 10), line("P-2", 20)],
            ACTOR,
            None,
        )
        .await
        .unwrap();

    ctx.transfers.submit(&transfer.id).await.unwrap();
    ctx.transfers.approve(&transfer.id, ACTOR, None).await.unwrap();
    ctx.transfers.mark_in_transit(&transfer.id).await.unwrap();

    let err = ctx
        .transfers
        .complete(&transfer.id, ACTOR, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::InsufficientStock { .. })
    ));

    // All-or-nothing: the coverable first line did not move either.
    let still = ctx.transfers.get_by_id(&transfer.id).await.unwrap();
    assert_eq!(still.status, TransferStatus::InTransit);
    assert_eq!(ctx.inventory.get_total_stock("P-1").await.unwrap(), 30);
    assert!(ctx
        .inventory
        .get_stock_by_warehouse(&destination)
        .await
        .unwrap()
        .is_empty());
    assert!(ctx
        .db
        .transactions()
        .get_by_reference(&transfer.transfer_number)
        .await
        .unwrap()
        .is_empty());

    let report = ctx.inventory.verify_consistency("P-1").await.unwrap();
    assert!(report.is_consistent());
}

#[tokio::test]
async fn cancel_reachable_from_any_non_terminal_state() {
    let ctx = ctx().await;
    let (source, destination) = stocked_pair(&ctx).await;

    // Cancel from Pending.
    let transfer = ctx
        .transfers
        .create(&source, &destination, &[line("P-1", 5)], ACTOR, None)
        .await
        .unwrap();
    ctx.transfers.submit(&transfer.id).await.unwrap();
    let cancelled = ctx
        .transfers
        .cancel(&transfer.id, "no longer needed")
        .await
        .unwrap();
    assert_eq!(cancelled.status, TransferStatus::Cancelled);

    // Cancelled is terminal.
    let err = ctx.transfers.submit(&transfer.id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::InvalidStateTransition { .. })
    ));

    // Completed transfers cannot be cancelled.
    let second = ctx
        .transfers
        .create(&source, &destination, &[line("P-1", 5)], ACTOR, None)
        .await
        .unwrap();
    ctx.transfers.submit(&second.id).await.unwrap();
    ctx.transfers.approve(&second.id, ACTOR, None).await.unwrap();
    ctx.transfers.mark_in_transit(&second.id).await.unwrap();
    ctx.transfers.complete(&second.id, ACTOR, None).await.unwrap();

    let err = ctx.transfers.cancel(&second.id, "oops").await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::InvalidStateTransition { .. })
    ));
}

#[tokio::test]
async fn update_item_allowed_only_while_draft_or_pending() {
    let ctx = ctx().await;
    let (source, destination) = stocked_pair(&ctx).await;

    let transfer = ctx
        .transfers
        .create(&source, &destination, &[line("P-1", 5)], ACTOR, None)
        .await
        .unwrap();

    ctx.transfers
        .update_item(&transfer.id, "P-1", 8, Some("bumped"))
        .await
        .unwrap();

    let lines = ctx.transfers.get_items(&transfer.id).await.unwrap();
    assert_eq!(lines[0].quantity, 8);

    ctx.transfers.submit(&transfer.id).await.unwrap();
    ctx.transfers.approve(&transfer.id, ACTOR, None).await.unwrap();

    let err = ctx
        .transfers
        .update_item(&transfer.id, "P-1", 3, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::InvalidStateTransition { .. })
    ));
}

#[tokio::test]
async fn listings_filter_by_status_and_warehouse() {
    let ctx = ctx().await;
    let (source, destination) = stocked_pair(&ctx).await;

    let a = ctx
        .transfers
        .create(&source, &destination, &[line("P-1", 1)], ACTOR, None)
        .await
        .unwrap();
    let b = ctx
        .transfers
        .create(&source, &destination, &[line("P-2", 1)], ACTOR, None)
        .await
        .unwrap();
    ctx.transfers.submit(&b.id).await.unwrap();

    let drafts = ctx
        .transfers
        .get_by_status(TransferStatus::Draft)
        .await
        .unwrap();
    assert!(drafts.iter().any(|t| t.id == a.id));
    assert!(!drafts.iter().any(|t| t.id == b.id));

    assert_eq!(
        ctx.transfers.get_by_warehouse(&source, true).await.unwrap().len(),
        2
    );
    assert_eq!(
        ctx.transfers
            .get_by_warehouse(&destination, false)
            .await
            .unwrap()
            .len(),
        2
    );
    assert!(ctx
        .transfers
        .get_by_warehouse(&destination, true)
        .await
        .unwrap()
        .is_empty());
}
