//! # Reservation Service
//!
//! Promises stock to open demand and releases those promises, at both
//! counter levels, without permitting oversell.
//!
//! Reservation never moves physical units; it only earmarks them.
//! `available_quantity = quantity - reserved_quantity` is the amount
//! still promisable, and `reserve_stock` rejects anything beyond it.

use tracing::{info, warn};

use depot_core::validation::{validate_actor, validate_quantity};
use depot_core::{CoreError, InventoryItem, TransactionType, Warehouse, WarehouseItem};
use depot_db::{
    Database, DbError, InventoryItemRepository, TransactionRepository, WarehouseItemRepository,
};

use crate::error::{ServiceError, ServiceResult};
use crate::movement::{ledger_row, movement_reference};

/// Service for the reservation protocol.
#[derive(Debug, Clone)]
pub struct ReservationService {
    db: Database,
}

impl ReservationService {
    /// Creates a new ReservationService.
    pub fn new(db: Database) -> Self {
        ReservationService { db }
    }

    /// Reserves `quantity` units of a product at a warehouse.
    ///
    /// Within one transaction, increments `reserved_quantity` on both the
    /// warehouse row and the aggregate and appends a `Reserve` ledger
    /// row. All three commit together or not at all - a partial commit
    /// would break the cross-entity invariant.
    ///
    /// ## Errors
    /// * `ItemNotFound` / `WarehouseNotFound` / `StockNotFound` - any
    ///   lookup miss
    /// * `InsufficientStock` - requested exceeds the warehouse row's
    ///   available quantity; nothing is partially reserved
    pub async fn reserve_stock(
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
            "Reserving stock"
        );

        let (item, warehouse, row) = self.resolve(product_id, warehouse_id).await?;

        if row.available_quantity() < quantity {
            return Err(CoreError::InsufficientStock {
                product_id: item.product_id.clone(),
                requested: quantity,
                available: row.available_quantity(),
            }
            .into());
        }

        let mut tx = self.db.begin().await?;

        if !WarehouseItemRepository::reserve(&mut tx, &row.id, quantity).await? {
            // A concurrent writer took the stock between the check above
            // and the guarded update; report current availability.
            let available = WarehouseItemRepository::fetch_by_pair(&mut tx, &warehouse.id, &item.id)
                .await?
                .map(|r| r.available_quantity())
                .unwrap_or(0);
            return Err(CoreError::InsufficientStock {
                product_id: item.product_id.clone(),
                requested: quantity,
                available,
            }
            .into());
        }

        if !InventoryItemRepository::reserve(&mut tx, &item.id, quantity).await? {
            let available = InventoryItemRepository::fetch(&mut tx, &item.id)
                .await?
                .map(|i| i.available_quantity())
                .unwrap_or(0);
            return Err(CoreError::InsufficientStock {
                product_id: item.product_id.clone(),
                requested: quantity,
                available,
            }
            .into());
        }

        let ledger = ledger_row(
            &item,
            TransactionType::Reserve,
            quantity,
            &movement_reference(),
            format!("Reserved {} units in warehouse {}", quantity, warehouse.name),
            actor,
        );
        TransactionRepository::append(&mut tx, &ledger).await?;

        let updated = WarehouseItemRepository::fetch_by_pair(&mut tx, &warehouse.id, &item.id)
            .await?
            .ok_or_else(|| ServiceError::Db(DbError::not_found("WarehouseItem", &item.id)))?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Releases up to `quantity` previously reserved units back to
    /// available stock, returning the amount actually released.
    ///
    /// The release amount is clamped to the warehouse row's outstanding
    /// reservation rather than erroring on over-release; the clamp is
    /// logged. Callers that rely on exact accounting should treat a
    /// return value smaller than `quantity` as a signal of their own
    /// double-release.
    pub async fn release_reserved_stock(
        &self,
        product_id: &str,
        warehouse_id: &str,
        quantity: i64,
        actor: &str,
    ) -> ServiceResult<i64> {
        validate_quantity("quantity", quantity)?;
        validate_actor(actor)?;

        info!(
            product_id = %product_id,
            warehouse_id = %warehouse_id,
            quantity = %quantity,
            "Releasing reserved stock"
        );

        let (item, warehouse, row) = self.resolve(product_id, warehouse_id).await?;

        let release = quantity.min(row.reserved_quantity);
        if release < quantity {
            warn!(
                product_id = %product_id,
                requested = %quantity,
                reserved = %row.reserved_quantity,
                released = %release,
                "Release request exceeds outstanding reservation; clamping"
            );
        }

        let mut tx = self.db.begin().await?;

        if !WarehouseItemRepository::release(&mut tx, &row.id, release).await? {
            // Lost a race with another release; clamp to what is left now.
            let remaining = WarehouseItemRepository::fetch_by_pair(&mut tx, &warehouse.id, &item.id)
                .await?
                .map(|r| r.reserved_quantity)
                .unwrap_or(0);
            return Err(CoreError::InsufficientStock {
                product_id: item.product_id.clone(),
                requested: release,
                available: remaining,
            }
            .into());
        }

        if !InventoryItemRepository::release(&mut tx, &item.id, release).await? {
            let remaining = InventoryItemRepository::fetch(&mut tx, &item.id)
                .await?
                .map(|i| i.reserved_quantity)
                .unwrap_or(0);
            return Err(CoreError::InsufficientStock {
                product_id: item.product_id.clone(),
                requested: release,
                available: remaining,
            }
            .into());
        }

        let ledger = ledger_row(
            &item,
            TransactionType::Release,
            release,
            &movement_reference(),
            format!(
                "Released {} reserved units in warehouse {}",
                release, warehouse.name
            ),
            actor,
        );
        TransactionRepository::append(&mut tx, &ledger).await?;

        tx.commit().await?;

        Ok(release)
    }

    /// Whether at least `quantity` physical units of the product exist
    /// across all warehouses. Returns `false` (not an error) for unknown
    /// products.
    ///
    /// Compares against raw `quantity`, not `available_quantity`: the
    /// check deliberately ignores reservations, so it can disagree with
    /// `reserve_stock` when reservations exist. It is an advisory
    /// existence check, not a pre-check for reservation.
    pub async fn is_in_stock(&self, product_id: &str, quantity: i64) -> ServiceResult<bool> {
        let item = match self.db.items().get_by_product_id(product_id).await? {
            Some(item) => item,
            None => return Ok(false),
        };

        let total = self.db.warehouse_items().total_quantity(&item.id).await?;
        Ok(total >= quantity)
    }

    /// Returns the aggregate reserved quantity for a product.
    pub async fn get_reserved_stock(&self, product_id: &str) -> ServiceResult<i64> {
        let item = self
            .db
            .items()
            .get_by_product_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(product_id.to_string()))?;

        Ok(item.reserved_quantity)
    }

    /// Resolves item, warehouse and the warehouse stock row; every miss
    /// is a typed NotFound.
    async fn resolve(
        &self,
        product_id: &str,
        warehouse_id: &str,
    ) -> ServiceResult<(InventoryItem, Warehouse, WarehouseItem)> {
        let item = self
            .db
            .items()
            .get_by_product_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(product_id.to_string()))?;

        let warehouse = self
            .db
            .warehouses()
            .get_by_id(warehouse_id)
            .await?
            .ok_or_else(|| CoreError::WarehouseNotFound(warehouse_id.to_string()))?;

        let row = self
            .db
            .warehouse_items()
            .get_by_warehouse_and_item(warehouse_id, &item.id)
            .await?
            .ok_or_else(|| CoreError::StockNotFound {
                product_id: product_id.to_string(),
                warehouse_id: warehouse_id.to_string(),
            })?;

        Ok((item, warehouse, row))
    }
}
