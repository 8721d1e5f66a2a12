//! # Stock Movement Service
//!
//! Adds and removes physical stock at a warehouse, keeping the aggregate
//! and per-warehouse counters in lockstep and emitting ledger entries.
//!
//! ## Transaction boundary
//! ```text
//! add_stock / remove_stock
//!   │ resolve item + warehouse (outside the transaction)
//!   ▼
//! BEGIN ─► warehouse row upsert/adjust ─► aggregate adjust ─► ledger ─► COMMIT
//! ```
//! Both counter levels and the ledger row for one movement commit or roll
//! back together. The [`apply_addition`]/[`apply_removal`] helpers run
//! inside a caller-owned transaction so transfer completion can compose
//! several movements with its own status change.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use depot_core::validation::{validate_actor, validate_quantity};
use depot_core::{
    CoreError, InventoryItem, InventoryTransaction, TransactionType, Warehouse, WarehouseItem,
    DEFAULT_LOCATION,
};
use depot_db::{
    Database, DbError, InventoryItemRepository, TransactionRepository, WarehouseItemRepository,
};

use crate::error::{ServiceError, ServiceResult};

/// Service for physical stock movements.
#[derive(Debug, Clone)]
pub struct StockMovementService {
    db: Database,
}

impl StockMovementService {
    /// Creates a new StockMovementService.
    pub fn new(db: Database) -> Self {
        StockMovementService { db }
    }

    /// Adds `quantity` units of a product at a warehouse.
    ///
    /// The per-warehouse stock row is created lazily (location
    /// "Default") on the first addition. Appends a `StockIn` ledger row
    /// and stamps the aggregate's `last_restock_date`.
    ///
    /// ## Errors
    /// * `ItemNotFound` / `WarehouseNotFound` - unknown identifiers
    /// * `Validation` - non-positive quantity or blank actor
    pub async fn add_stock(
        &self,
        product_id: &str,
        warehouse_id: &str,
        quantity: i64,
        actor: &str,
    ) -> ServiceResult<WarehouseItem> {
        validate_quantity("quantity", quantity)?;
        validate_actor(actor)?;

        info!(
            product_id = %product_id,
            warehouse_id = %warehouse_id,
            quantity = %quantity,
            "Adding stock"
        );

        let item = self.resolve_item(product_id).await?;
        let warehouse = self.resolve_warehouse(warehouse_id).await?;

        let reference = movement_reference();
        let mut tx = self.db.begin().await?;
        let updated = apply_addition(&mut tx, &item, &warehouse, quantity, &reference, actor).await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Removes `quantity` units of a product from a warehouse.
    ///
    /// Appends a `StockOut` ledger row. The aggregate decrement funnels
    /// through the guarded quantity primitive, so stock can never drop
    /// below what is already promised to reservations.
    ///
    /// ## Errors
    /// * `ItemNotFound` / `WarehouseNotFound` - unknown identifiers
    /// * `InsufficientStock` - the warehouse holds fewer units than
    ///   requested (carries requested vs. available)
    pub async fn remove_stock(
        &self,
        product_id: &str,
        warehouse_id: &str,
        quantity: i64,
        actor: &str,
    ) -> ServiceResult<WarehouseItem> {
        validate_quantity("quantity", quantity)?;
        validate_actor(actor)?;

        info!(
            product_id = %product_id,
            warehouse_id = %warehouse_id,
            quantity = %quantity,
            "Removing stock"
        );

        let item = self.resolve_item(product_id).await?;
        let warehouse = self.resolve_warehouse(warehouse_id).await?;

        let reference = movement_reference();
        let mut tx = self.db.begin().await?;
        let updated = apply_removal(&mut tx, &item, &warehouse, quantity, &reference, actor).await?;
        tx.commit().await?;

        Ok(updated)
    }

    async fn resolve_item(&self, product_id: &str) -> ServiceResult<InventoryItem> {
        self.db
            .items()
            .get_by_product_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(product_id.to_string()).into())
    }

    async fn resolve_warehouse(&self, warehouse_id: &str) -> ServiceResult<Warehouse> {
        self.db
            .warehouses()
            .get_by_id(warehouse_id)
            .await?
            .ok_or_else(|| CoreError::WarehouseNotFound(warehouse_id.to_string()).into())
    }
}

// =============================================================================
// Transaction-scoped movement primitives
// =============================================================================

/// Adds stock inside a caller-owned transaction: warehouse row
/// upsert/increment, aggregate increment, restock stamp, `StockIn` ledger
/// row. Returns the updated warehouse row.
pub(crate) async fn apply_addition(
    conn: &mut SqliteConnection,
    item: &InventoryItem,
    warehouse: &Warehouse,
    quantity: i64,
    reference_number: &str,
    actor: &str,
) -> ServiceResult<WarehouseItem> {
    // The upsert decision happens inside the transaction: two concurrent
    // first-additions must not both try to create the row.
    match WarehouseItemRepository::fetch_by_pair(conn, &warehouse.id, &item.id).await? {
        Some(row) => {
            if !WarehouseItemRepository::adjust_quantity(conn, &row.id, quantity).await? {
                return Err(warehouse_insufficient(conn, item, warehouse, quantity).await?);
            }
        }
        None => {
            let row = WarehouseItem {
                id: Uuid::new_v4().to_string(),
                warehouse_id: warehouse.id.clone(),
                inventory_item_id: item.id.clone(),
                quantity,
                reserved_quantity: 0,
                location: DEFAULT_LOCATION.to_string(),
                last_count_date: None,
                created_date: Utc::now(),
                last_modified_date: None,
            };
            WarehouseItemRepository::insert(conn, &row).await?;
        }
    }

    if !InventoryItemRepository::adjust_quantity(conn, &item.id, quantity).await? {
        return Err(aggregate_insufficient(conn, item, quantity).await?);
    }
    InventoryItemRepository::touch_restock_date(conn, &item.id).await?;

    let ledger = ledger_row(
        item,
        TransactionType::StockIn,
        quantity,
        reference_number,
        format!("Added {} units to warehouse {}", quantity, warehouse.name),
        actor,
    );
    TransactionRepository::append(conn, &ledger).await?;

    WarehouseItemRepository::fetch_by_pair(conn, &warehouse.id, &item.id)
        .await?
        .ok_or_else(|| ServiceError::Db(DbError::not_found("WarehouseItem", &item.id)))
}

/// Removes stock inside a caller-owned transaction: warehouse row
/// decrement, aggregate decrement, `StockOut` ledger row. Returns the
/// updated warehouse row.
pub(crate) async fn apply_removal(
    conn: &mut SqliteConnection,
    item: &InventoryItem,
    warehouse: &Warehouse,
    quantity: i64,
    reference_number: &str,
    actor: &str,
) -> ServiceResult<WarehouseItem> {
    let row = match WarehouseItemRepository::fetch_by_pair(conn, &warehouse.id, &item.id).await? {
        Some(row) if row.quantity >= quantity => row,
        other => {
            // Missing row counts as zero units on hand.
            return Err(CoreError::InsufficientStock {
                product_id: item.product_id.clone(),
                requested: quantity,
                available: other.map(|r| r.quantity).unwrap_or(0),
            }
            .into());
        }
    };

    if !WarehouseItemRepository::adjust_quantity(conn, &row.id, -quantity).await? {
        return Err(warehouse_insufficient(conn, item, warehouse, quantity).await?);
    }

    if !InventoryItemRepository::adjust_quantity(conn, &item.id, -quantity).await? {
        return Err(aggregate_insufficient(conn, item, quantity).await?);
    }

    let ledger = ledger_row(
        item,
        TransactionType::StockOut,
        quantity,
        reference_number,
        format!("Removed {} units from warehouse {}", quantity, warehouse.name),
        actor,
    );
    TransactionRepository::append(conn, &ledger).await?;

    WarehouseItemRepository::fetch_by_pair(conn, &warehouse.id, &item.id)
        .await?
        .ok_or_else(|| ServiceError::Db(DbError::not_found("WarehouseItem", &item.id)))
}

/// Builds an `InsufficientStock` error from the warehouse row's current
/// availability, after a guard rejected the change.
async fn warehouse_insufficient(
    conn: &mut SqliteConnection,
    item: &InventoryItem,
    warehouse: &Warehouse,
    requested: i64,
) -> ServiceResult<ServiceError> {
    let available = WarehouseItemRepository::fetch_by_pair(conn, &warehouse.id, &item.id)
        .await?
        .map(|r| r.available_quantity())
        .unwrap_or(0);

    Ok(CoreError::InsufficientStock {
        product_id: item.product_id.clone(),
        requested,
        available,
    }
    .into())
}

/// Builds an `InsufficientStock` error from the aggregate's current
/// availability, after a guard rejected the change.
async fn aggregate_insufficient(
    conn: &mut SqliteConnection,
    item: &InventoryItem,
    requested: i64,
) -> ServiceResult<ServiceError> {
    let available = InventoryItemRepository::fetch(conn, &item.id)
        .await?
        .map(|i| i.available_quantity())
        .unwrap_or(0);

    Ok(CoreError::InsufficientStock {
        product_id: item.product_id.clone(),
        requested,
        available,
    }
    .into())
}

/// Builds a ledger row for one movement.
pub(crate) fn ledger_row(
    item: &InventoryItem,
    transaction_type: TransactionType,
    quantity: i64,
    reference_number: &str,
    notes: String,
    actor: &str,
) -> InventoryTransaction {
    InventoryTransaction {
        id: Uuid::new_v4().to_string(),
        inventory_item_id: item.id.clone(),
        transaction_type,
        quantity,
        reference_number: reference_number.to_string(),
        notes,
        created_by: actor.to_string(),
        created_date: Utc::now(),
    }
}

/// Generates a reference number for an ad hoc movement (counts and
/// transfers use their session numbers instead).
pub(crate) fn movement_reference() -> String {
    Uuid::new_v4().to_string()
}
