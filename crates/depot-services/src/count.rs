//! # Physical Count Workflow
//!
//! Session-scoped reconciliation of recorded quantities against a manual
//! count, with automatic ledger correction on completion.
//!
//! ## Lifecycle
//! ```text
//! create ──► Draft ──start──► InProgress ──complete──► Completed
//!              │                   │
//!              └──────cancel───────┴──────────────────► Cancelled
//! ```
//! `start` snapshots every warehouse row into a count item; `complete`
//! writes counted quantities back through the same guarded primitives as
//! any other movement. Cancellation never touches stock.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use depot_core::validation::validate_actor;
use depot_core::{
    CoreError, CountStatus, DiscrepancySummary, InventoryCount, InventoryCountItem,
    TransactionType, ValidationError,
};
use depot_db::{
    CountRepository, Database, InventoryItemRepository, TransactionRepository,
    WarehouseItemRepository,
};
use serde::{Deserialize, Serialize};

use crate::error::ServiceResult;
use crate::movement::ledger_row;

/// A counted quantity submitted to [`InventoryCountService::complete`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountItemInput {
    pub inventory_item_id: String,
    pub actual_quantity: i64,
    pub notes: Option<String>,
}

/// Service for physical count sessions.
#[derive(Debug, Clone)]
pub struct InventoryCountService {
    db: Database,
}

impl InventoryCountService {
    /// Creates a new InventoryCountService.
    pub fn new(db: Database) -> Self {
        InventoryCountService { db }
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Creates a count session in `Draft` with a generated count number.
    pub async fn create(
        &self,
        warehouse_id: &str,
        count_by: &str,
        notes: Option<&str>,
    ) -> ServiceResult<InventoryCount> {
        validate_actor(count_by)?;

        info!(warehouse_id = %warehouse_id, count_by = %count_by, "Creating inventory count");

        if self.db.warehouses().get_by_id(warehouse_id).await?.is_none() {
            return Err(CoreError::WarehouseNotFound(warehouse_id.to_string()).into());
        }

        let now = Utc::now();
        let count = InventoryCount {
            id: Uuid::new_v4().to_string(),
            warehouse_id: warehouse_id.to_string(),
            count_number: generate_count_number(),
            count_date: now,
            status: CountStatus::Draft,
            count_by: count_by.to_string(),
            notes: notes.map(str::to_string),
            created_date: now,
            last_modified_date: None,
        };

        self.db.counts().insert(&count).await?;

        Ok(count)
    }

    /// Starts a `Draft` session: snapshots every warehouse row in the
    /// target warehouse into one count item (`expected` = current
    /// quantity, `actual` = 0 placeholder) and transitions to
    /// `InProgress`, all in one transaction.
    pub async fn start(&self, count_id: &str) -> ServiceResult<InventoryCount> {
        info!(count_id = %count_id, "Starting inventory count");

        let count = self.get_by_id(count_id).await?;
        if !count.status.can_transition_to(CountStatus::InProgress) {
            return Err(CoreError::invalid_transition(
                "inventory count",
                count_id,
                count.status,
                "start",
            )
            .into());
        }

        let mut tx = self.db.begin().await?;

        // Snapshot inside the same transaction that flips the status, so
        // the expected quantities cannot interleave with a movement.
        let rows = WarehouseItemRepository::fetch_by_warehouse(&mut tx, &count.warehouse_id).await?;
        let now = Utc::now();
        for row in &rows {
            let item = InventoryCountItem {
                id: Uuid::new_v4().to_string(),
                inventory_count_id: count.id.clone(),
                inventory_item_id: row.inventory_item_id.clone(),
                expected_quantity: row.quantity,
                actual_quantity: 0,
                notes: Some("Created automatically when the count started".to_string()),
                created_date: now,
                last_modified_date: None,
            };
            CountRepository::insert_item(&mut tx, &item).await?;
        }

        CountRepository::set_status(&mut tx, count_id, CountStatus::Draft, CountStatus::InProgress, None)
            .await?;

        tx.commit().await?;

        self.get_by_id(count_id).await
    }

    /// Records a counted quantity while the session is `InProgress`.
    ///
    /// Creates the count item if it does not already exist (covers items
    /// discovered after the session snapshot, with `expected` taken from
    /// the current warehouse row, or 0 for items unknown to the
    /// warehouse); otherwise updates `actual_quantity`/notes in place.
    pub async fn update_count_item(
        &self,
        count_id: &str,
        inventory_item_id: &str,
        actual_quantity: i64,
        notes: Option<&str>,
    ) -> ServiceResult<InventoryCountItem> {
        if actual_quantity < 0 {
            return Err(ValidationError::Invalid {
                field: "actual_quantity".to_string(),
                reason: "must not be negative".to_string(),
            }
            .into());
        }

        info!(
            count_id = %count_id,
            inventory_item_id = %inventory_item_id,
            actual_quantity = %actual_quantity,
            "Updating count item"
        );

        let count = self.get_by_id(count_id).await?;
        if count.status != CountStatus::InProgress {
            return Err(CoreError::invalid_transition(
                "inventory count",
                count_id,
                count.status,
                "update count items",
            )
            .into());
        }

        if self.db.items().get_by_id(inventory_item_id).await?.is_none() {
            return Err(CoreError::ItemNotFound(inventory_item_id.to_string()).into());
        }

        let mut tx = self.db.begin().await?;

        let updated = match CountRepository::fetch_item(&mut tx, count_id, inventory_item_id).await? {
            Some(existing) => {
                CountRepository::update_item(&mut tx, &existing.id, actual_quantity, notes).await?;
                CountRepository::fetch_item(&mut tx, count_id, inventory_item_id).await?
            }
            None => {
                let expected =
                    WarehouseItemRepository::fetch_by_pair(&mut tx, &count.warehouse_id, inventory_item_id)
                        .await?
                        .map(|row| row.quantity)
                        .unwrap_or(0);

                let item = InventoryCountItem {
                    id: Uuid::new_v4().to_string(),
                    inventory_count_id: count.id.clone(),
                    inventory_item_id: inventory_item_id.to_string(),
                    expected_quantity: expected,
                    actual_quantity,
                    notes: notes.map(str::to_string),
                    created_date: Utc::now(),
                    last_modified_date: None,
                };
                CountRepository::insert_item(&mut tx, &item).await?;
                Some(item)
            }
        };

        tx.commit().await?;

        updated.ok_or_else(|| CoreError::CountNotFound(count_id.to_string()).into())
    }

    /// Completes an `InProgress` session, reconciling every submitted
    /// item in one transaction.
    ///
    /// For each submitted item with a nonzero `actual - expected`
    /// difference: the warehouse row's quantity is overwritten with the
    /// counted value (not a delta), the aggregate is adjusted by the
    /// difference through the guarded primitive, and one ledger row is
    /// appended - `Adjustment` for overages, `StockOut` for shortages -
    /// referencing the count number and authored by the session's
    /// counter. Items never recorded in the session are skipped.
    pub async fn complete(
        &self,
        count_id: &str,
        items: &[CountItemInput],
        notes: Option<&str>,
    ) -> ServiceResult<InventoryCount> {
        for input in items {
            if input.actual_quantity < 0 {
                return Err(ValidationError::Invalid {
                    field: "actual_quantity".to_string(),
                    reason: "must not be negative".to_string(),
                }
                .into());
            }
        }

        info!(count_id = %count_id, submitted = items.len(), "Completing inventory count");

        let count = self.get_by_id(count_id).await?;
        if !count.status.can_transition_to(CountStatus::Completed) {
            return Err(CoreError::invalid_transition(
                "inventory count",
                count_id,
                count.status,
                "complete",
            )
            .into());
        }

        let mut tx = self.db.begin().await?;

        for input in items {
            let Some(existing) =
                CountRepository::fetch_item(&mut tx, count_id, &input.inventory_item_id).await?
            else {
                // Only rows created by start/update_count_item reconcile
                // stock; unknown submissions are ignored.
                continue;
            };

            CountRepository::update_item(
                &mut tx,
                &existing.id,
                input.actual_quantity,
                input.notes.as_deref(),
            )
            .await?;

            let difference = input.actual_quantity - existing.expected_quantity;
            if difference == 0 {
                continue;
            }

            let item = InventoryItemRepository::fetch(&mut tx, &input.inventory_item_id)
                .await?
                .ok_or_else(|| CoreError::ItemNotFound(input.inventory_item_id.clone()))?;

            // Overwrite the warehouse row with the counted value. A row
            // can be absent when the item was discovered mid-count; it is
            // created so both counter levels stay in lockstep.
            match WarehouseItemRepository::fetch_by_pair(&mut tx, &count.warehouse_id, &item.id).await? {
                Some(row) => {
                    if !WarehouseItemRepository::set_quantity(&mut tx, &row.id, input.actual_quantity)
                        .await?
                    {
                        // The counted quantity cannot cover what is
                        // already promised at this location.
                        return Err(CoreError::InsufficientStock {
                            product_id: item.product_id.clone(),
                            requested: row.reserved_quantity,
                            available: input.actual_quantity,
                        }
                        .into());
                    }
                }
                None => {
                    let row = depot_core::WarehouseItem {
                        id: Uuid::new_v4().to_string(),
                        warehouse_id: count.warehouse_id.clone(),
                        inventory_item_id: item.id.clone(),
                        quantity: input.actual_quantity,
                        reserved_quantity: 0,
                        location: depot_core::DEFAULT_LOCATION.to_string(),
                        last_count_date: Some(Utc::now()),
                        created_date: Utc::now(),
                        last_modified_date: None,
                    };
                    WarehouseItemRepository::insert(&mut tx, &row).await?;
                }
            }

            if !InventoryItemRepository::adjust_quantity(&mut tx, &item.id, difference).await? {
                let available = InventoryItemRepository::fetch(&mut tx, &item.id)
                    .await?
                    .map(|i| i.available_quantity())
                    .unwrap_or(0);
                return Err(CoreError::InsufficientStock {
                    product_id: item.product_id.clone(),
                    requested: -difference,
                    available,
                }
                .into());
            }

            let transaction_type = if difference > 0 {
                TransactionType::Adjustment
            } else {
                TransactionType::StockOut
            };
            let ledger = ledger_row(
                &item,
                transaction_type,
                difference.abs(),
                &count.count_number,
                format!("Adjustment from count #{}: {:+}", count.count_number, difference),
                &count.count_by,
            );
            TransactionRepository::append(&mut tx, &ledger).await?;
        }

        CountRepository::set_status(
            &mut tx,
            count_id,
            CountStatus::InProgress,
            CountStatus::Completed,
            notes,
        )
        .await?;

        tx.commit().await?;

        self.get_by_id(count_id).await
    }

    /// Cancels a `Draft` or `InProgress` session. Never mutates stock;
    /// rejected with `InvalidStateTransition` once the session is
    /// terminal.
    pub async fn cancel(&self, count_id: &str, reason: &str) -> ServiceResult<InventoryCount> {
        info!(count_id = %count_id, reason = %reason, "Cancelling inventory count");

        let count = self.get_by_id(count_id).await?;
        if !count.status.can_transition_to(CountStatus::Cancelled) {
            return Err(CoreError::invalid_transition(
                "inventory count",
                count_id,
                count.status,
                "cancel",
            )
            .into());
        }

        let mut tx = self.db.begin().await?;
        CountRepository::set_status(
            &mut tx,
            count_id,
            count.status,
            CountStatus::Cancelled,
            Some(&format!("Cancelled: {reason}")),
        )
        .await?;
        tx.commit().await?;

        self.get_by_id(count_id).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a session by ID.
    pub async fn get_by_id(&self, count_id: &str) -> ServiceResult<InventoryCount> {
        self.db
            .counts()
            .get_by_id(count_id)
            .await?
            .ok_or_else(|| CoreError::CountNotFound(count_id.to_string()).into())
    }

    /// Lists sessions for a warehouse.
    pub async fn get_by_warehouse(&self, warehouse_id: &str) -> ServiceResult<Vec<InventoryCount>> {
        Ok(self.db.counts().get_by_warehouse(warehouse_id).await?)
    }

    /// Lists sessions in a given status.
    pub async fn get_by_status(&self, status: CountStatus) -> ServiceResult<Vec<InventoryCount>> {
        Ok(self.db.counts().get_by_status(status).await?)
    }

    /// Lists all sessions.
    pub async fn get_all(&self) -> ServiceResult<Vec<InventoryCount>> {
        Ok(self.db.counts().get_all().await?)
    }

    /// Lists a session's count items.
    pub async fn get_items(&self, count_id: &str) -> ServiceResult<Vec<InventoryCountItem>> {
        self.get_by_id(count_id).await?;
        Ok(self.db.counts().get_items(count_id).await?)
    }

    /// Pure read: counts of matching/overage/shortage items and the net
    /// quantity discrepancy for a session. No side effects.
    pub async fn discrepancy_summary(&self, count_id: &str) -> ServiceResult<DiscrepancySummary> {
        self.get_by_id(count_id).await?;
        let items = self.db.counts().get_items(count_id).await?;
        Ok(DiscrepancySummary::from_items(&items))
    }
}

/// Generates a count number in format: `IC-YYYYMMDD-XXXXXXXX`.
fn generate_count_number() -> String {
    let date_part = Utc::now().format("%Y%m%d");
    let unique: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase();
    format!("IC-{date_part}-{unique}")
}
