//! # Stock Transfer Workflow
//!
//! Moves a batch of items from one warehouse to another through an
//! approval-style status progression.
//!
//! ## Lifecycle
//! ```text
//! create ──► Draft ──► Pending ──► Approved ──► InTransit ──► Completed
//!              │          │            │             │
//!              └──────────┴────cancel──┴─────────────┴──────► Cancelled
//! ```
//! Only the transition into `Completed` moves stock: it replays every
//! transfer line through the movement primitives (remove at source, add
//! at destination), atomically with the status change, emitting
//! `StockOut`/`StockIn` ledger pairs that reference the transfer number.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use depot_core::validation::{validate_actor, validate_quantity};
use depot_core::{
    CoreError, InventoryItem, StockTransfer, StockTransferItem, TransferStatus, ValidationError,
    Warehouse,
};
use depot_db::{Database, TransferRepository};
use serde::{Deserialize, Serialize};

use crate::error::ServiceResult;
use crate::movement::{apply_addition, apply_removal};

/// A requested transfer line, by product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferItemInput {
    pub product_id: String,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// Service for inter-warehouse stock transfers.
#[derive(Debug, Clone)]
pub struct StockTransferService {
    db: Database,
}

impl StockTransferService {
    /// Creates a new StockTransferService.
    pub fn new(db: Database) -> Self {
        StockTransferService { db }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Creates a transfer in `Draft` with a generated transfer number,
    /// snapshotting the requested quantities.
    ///
    /// Both warehouses and every referenced product must exist; the
    /// missing entity is named in the error. Source and destination must
    /// differ.
    pub async fn create(
        &self,
        source_warehouse_id: &str,
        destination_warehouse_id: &str,
        items: &[TransferItemInput],
        requested_by: &str,
        notes: Option<&str>,
    ) -> ServiceResult<StockTransfer> {
        validate_actor(requested_by)?;

        if items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            }
            .into());
        }
        if source_warehouse_id == destination_warehouse_id {
            return Err(ValidationError::Invalid {
                field: "destination_warehouse_id".to_string(),
                reason: "must differ from the source warehouse".to_string(),
            }
            .into());
        }
        for input in items {
            validate_quantity("quantity", input.quantity)?;
        }

        info!(
            source = %source_warehouse_id,
            destination = %destination_warehouse_id,
            items = items.len(),
            "Creating stock transfer"
        );

        self.resolve_warehouse(source_warehouse_id).await?;
        self.resolve_warehouse(destination_warehouse_id).await?;

        let mut resolved = Vec::with_capacity(items.len());
        for input in items {
            let item = self
                .db
                .items()
                .get_by_product_id(&input.product_id)
                .await?
                .ok_or_else(|| CoreError::ItemNotFound(input.product_id.clone()))?;
            resolved.push((item, input));
        }

        let now = Utc::now();
        let transfer = StockTransfer {
            id: Uuid::new_v4().to_string(),
            transfer_number: generate_transfer_number(),
            source_warehouse_id: source_warehouse_id.to_string(),
            destination_warehouse_id: destination_warehouse_id.to_string(),
            transfer_date: now,
            status: TransferStatus::Draft,
            requested_by: requested_by.to_string(),
            approved_by: None,
            approval_date: None,
            notes: notes.map(str::to_string),
            created_date: now,
            last_modified_date: None,
        };

        let mut tx = self.db.begin().await?;
        TransferRepository::insert(&mut tx, &transfer).await?;
        for (item, input) in &resolved {
            let line = StockTransferItem {
                id: Uuid::new_v4().to_string(),
                stock_transfer_id: transfer.id.clone(),
                inventory_item_id: item.id.clone(),
                quantity: input.quantity,
                notes: input.notes.clone(),
                created_date: now,
            };
            TransferRepository::insert_item(&mut tx, &line).await?;
        }
        tx.commit().await?;

        Ok(transfer)
    }

    // =========================================================================
    // Status progression
    // =========================================================================

    /// Submits a `Draft` transfer for approval.
    pub async fn submit(&self, transfer_id: &str) -> ServiceResult<StockTransfer> {
        self.transition(transfer_id, TransferStatus::Pending, None, None)
            .await
    }

    /// Approves a `Pending` transfer, recording the approver and the
    /// approval date.
    pub async fn approve(
        &self,
        transfer_id: &str,
        approved_by: &str,
        notes: Option<&str>,
    ) -> ServiceResult<StockTransfer> {
        validate_actor(approved_by)?;
        self.transition(transfer_id, TransferStatus::Approved, Some(approved_by), notes)
            .await
    }

    /// Marks an `Approved` transfer as in transit.
    pub async fn mark_in_transit(&self, transfer_id: &str) -> ServiceResult<StockTransfer> {
        self.transition(transfer_id, TransferStatus::InTransit, None, None)
            .await
    }

    /// Completes an `InTransit` transfer: removes every line's quantity
    /// from the source warehouse and adds it at the destination,
    /// atomically with the status change.
    ///
    /// A source shortfall on any line fails the whole transfer with
    /// `InsufficientStock` and nothing moves.
    pub async fn complete(
        &self,
        transfer_id: &str,
        actor: &str,
        notes: Option<&str>,
    ) -> ServiceResult<StockTransfer> {
        validate_actor(actor)?;

        info!(transfer_id = %transfer_id, "Completing stock transfer");

        let transfer = self.get_by_id(transfer_id).await?;
        if !transfer.status.can_transition_to(TransferStatus::Completed) {
            return Err(CoreError::invalid_transition(
                "stock transfer",
                transfer_id,
                transfer.status,
                "complete",
            )
            .into());
        }

        let source = self.resolve_warehouse(&transfer.source_warehouse_id).await?;
        let destination = self
            .resolve_warehouse(&transfer.destination_warehouse_id)
            .await?;

        let lines = self.db.transfers().get_items(transfer_id).await?;
        let mut resolved: Vec<(InventoryItem, i64)> = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = self
                .db
                .items()
                .get_by_id(&line.inventory_item_id)
                .await?
                .ok_or_else(|| CoreError::ItemNotFound(line.inventory_item_id.clone()))?;
            resolved.push((item, line.quantity));
        }

        let mut tx = self.db.begin().await?;

        for (item, quantity) in &resolved {
            apply_removal(&mut tx, item, &source, *quantity, &transfer.transfer_number, actor)
                .await?;
            apply_addition(
                &mut tx,
                item,
                &destination,
                *quantity,
                &transfer.transfer_number,
                actor,
            )
            .await?;
        }

        TransferRepository::set_status(
            &mut tx,
            transfer_id,
            TransferStatus::InTransit,
            TransferStatus::Completed,
            None,
            notes,
        )
        .await?;

        tx.commit().await?;

        self.get_by_id(transfer_id).await
    }

    /// Cancels a transfer from any non-terminal state. Never moves stock.
    pub async fn cancel(&self, transfer_id: &str, reason: &str) -> ServiceResult<StockTransfer> {
        info!(transfer_id = %transfer_id, reason = %reason, "Cancelling stock transfer");

        let transfer = self.get_by_id(transfer_id).await?;
        if !transfer.status.can_transition_to(TransferStatus::Cancelled) {
            return Err(CoreError::invalid_transition(
                "stock transfer",
                transfer_id,
                transfer.status,
                "cancel",
            )
            .into());
        }

        let mut tx = self.db.begin().await?;
        TransferRepository::set_status(
            &mut tx,
            transfer_id,
            transfer.status,
            TransferStatus::Cancelled,
            None,
            Some(&format!("Cancelled: {reason}")),
        )
        .await?;
        tx.commit().await?;

        self.get_by_id(transfer_id).await
    }

    /// Common path for the simple (non-moving) transitions.
    async fn transition(
        &self,
        transfer_id: &str,
        to: TransferStatus,
        approved_by: Option<&str>,
        notes: Option<&str>,
    ) -> ServiceResult<StockTransfer> {
        info!(transfer_id = %transfer_id, to = %to, "Transitioning stock transfer");

        let transfer = self.get_by_id(transfer_id).await?;
        if !transfer.status.can_transition_to(to) {
            return Err(CoreError::invalid_transition(
                "stock transfer",
                transfer_id,
                transfer.status,
                match to {
                    TransferStatus::Pending => "submit",
                    TransferStatus::Approved => "approve",
                    TransferStatus::InTransit => "mark in transit",
                    _ => "transition",
                },
            )
            .into());
        }

        let mut tx = self.db.begin().await?;
        TransferRepository::set_status(&mut tx, transfer_id, transfer.status, to, approved_by, notes)
            .await?;
        tx.commit().await?;

        self.get_by_id(transfer_id).await
    }

    // =========================================================================
    // Line maintenance
    // =========================================================================

    /// Updates the quantity/notes on one line while the transfer is still
    /// `Draft` or `Pending`.
    pub async fn update_item(
        &self,
        transfer_id: &str,
        product_id: &str,
        quantity: i64,
        notes: Option<&str>,
    ) -> ServiceResult<()> {
        validate_quantity("quantity", quantity)?;

        let transfer = self.get_by_id(transfer_id).await?;
        if !matches!(
            transfer.status,
            TransferStatus::Draft | TransferStatus::Pending
        ) {
            return Err(CoreError::invalid_transition(
                "stock transfer",
                transfer_id,
                transfer.status,
                "update transfer items",
            )
            .into());
        }

        let item = self
            .db
            .items()
            .get_by_product_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(product_id.to_string()))?;

        self.db
            .transfers()
            .update_item(transfer_id, &item.id, quantity, notes)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a transfer by ID.
    pub async fn get_by_id(&self, transfer_id: &str) -> ServiceResult<StockTransfer> {
        self.db
            .transfers()
            .get_by_id(transfer_id)
            .await?
            .ok_or_else(|| CoreError::TransferNotFound(transfer_id.to_string()).into())
    }

    /// Lists transfers in a given status.
    pub async fn get_by_status(&self, status: TransferStatus) -> ServiceResult<Vec<StockTransfer>> {
        Ok(self.db.transfers().get_by_status(status).await?)
    }

    /// Lists transfers touching a warehouse, as source or destination.
    pub async fn get_by_warehouse(
        &self,
        warehouse_id: &str,
        is_source: bool,
    ) -> ServiceResult<Vec<StockTransfer>> {
        Ok(self
            .db
            .transfers()
            .get_by_warehouse(warehouse_id, is_source)
            .await?)
    }

    /// Lists all transfers.
    pub async fn get_all(&self) -> ServiceResult<Vec<StockTransfer>> {
        Ok(self.db.transfers().get_all().await?)
    }

    /// Lists a transfer's lines.
    pub async fn get_items(&self, transfer_id: &str) -> ServiceResult<Vec<StockTransferItem>> {
        self.get_by_id(transfer_id).await?;
        Ok(self.db.transfers().get_items(transfer_id).await?)
    }

    async fn resolve_warehouse(&self, warehouse_id: &str) -> ServiceResult<Warehouse> {
        self.db
            .warehouses()
            .get_by_id(warehouse_id)
            .await?
            .ok_or_else(|| CoreError::WarehouseNotFound(warehouse_id.to_string()).into())
    }
}

/// Generates a transfer number in format: `ST-YYYYMMDD-XXXXXXXX`.
fn generate_transfer_number() -> String {
    let date_part = Utc::now().format("%Y%m%d");
    let unique: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase();
    format!("ST-{date_part}-{unique}")
}
