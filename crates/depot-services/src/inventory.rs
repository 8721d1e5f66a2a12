//! # Inventory Management Service
//!
//! Item and warehouse registry operations plus the advisory stock
//! queries: totals, per-product and per-warehouse listings, the
//! transaction history and the low-stock report.
//!
//! Reads here run without locks and may observe slightly stale
//! aggregates; they are advisory and never gate a subsequent write in
//! the same call. `verify_consistency` is the standalone reconciliation
//! check (`aggregate == Σ warehouse rows`) used by tests and operational
//! audits.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use depot_core::validation::{validate_code, validate_name};
use depot_core::{
    ConsistencyReport, CoreError, InventoryItem, InventoryTransaction, Warehouse, WarehouseItem,
};
use depot_db::Database;
use serde::{Deserialize, Serialize};

use crate::error::ServiceResult;

// =============================================================================
// Inputs
// =============================================================================

/// Fields for creating an inventory item. Counters always start at zero;
/// stock arrives through the movement service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub product_id: String,
    pub sku: String,
    pub product_name: String,
    pub low_stock_threshold: i64,
}

/// Mutable detail fields of an inventory item. The counters are not
/// updatable from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateInventoryItem {
    pub sku: String,
    pub product_name: String,
    pub low_stock_threshold: i64,
}

/// Fields for creating a warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWarehouse {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact_person: Option<String>,
}

/// Mutable fields of a warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWarehouse {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact_person: Option<String>,
    pub is_active: bool,
}

// =============================================================================
// Service
// =============================================================================

/// Service for the item/warehouse registries and stock queries.
#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
}

impl InventoryService {
    /// Creates a new InventoryService.
    pub fn new(db: Database) -> Self {
        InventoryService { db }
    }

    // =========================================================================
    // Inventory items
    // =========================================================================

    /// Creates an inventory item. Rejected with `Duplicate` when the
    /// product or SKU is already tracked.
    pub async fn create_inventory_item(&self, new: NewInventoryItem) -> ServiceResult<InventoryItem> {
        validate_code("sku", &new.sku)?;
        validate_name("product_name", &new.product_name)?;

        info!(product_id = %new.product_id, sku = %new.sku, "Creating inventory item");

        if self
            .db
            .items()
            .get_by_product_id(&new.product_id)
            .await?
            .is_some()
        {
            return Err(CoreError::duplicate("product_id", &new.product_id).into());
        }
        if self.db.items().get_by_sku(&new.sku).await?.is_some() {
            return Err(CoreError::duplicate("sku", &new.sku).into());
        }

        let item = InventoryItem {
            id: Uuid::new_v4().to_string(),
            product_id: new.product_id,
            sku: new.sku,
            product_name: new.product_name,
            quantity: 0,
            reserved_quantity: 0,
            low_stock_threshold: new.low_stock_threshold,
            last_restock_date: None,
            created_date: Utc::now(),
            last_modified_date: None,
        };

        self.db.items().insert(&item).await?;

        Ok(item)
    }

    /// Gets an item by product identifier.
    pub async fn get_inventory_item(&self, product_id: &str) -> ServiceResult<InventoryItem> {
        self.db
            .items()
            .get_by_product_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(product_id.to_string()).into())
    }

    /// Lists all items.
    pub async fn get_all_items(&self) -> ServiceResult<Vec<InventoryItem>> {
        Ok(self.db.items().get_all().await?)
    }

    /// Updates an item's detail fields (name, SKU, threshold).
    pub async fn update_inventory_item(
        &self,
        product_id: &str,
        update: UpdateInventoryItem,
    ) -> ServiceResult<InventoryItem> {
        validate_code("sku", &update.sku)?;
        validate_name("product_name", &update.product_name)?;

        info!(product_id = %product_id, "Updating inventory item");

        let item = self.get_inventory_item(product_id).await?;

        if update.sku != item.sku {
            if let Some(other) = self.db.items().get_by_sku(&update.sku).await? {
                if other.id != item.id {
                    return Err(CoreError::duplicate("sku", &update.sku).into());
                }
            }
        }

        self.db
            .items()
            .update_details(
                &item.id,
                &update.product_name,
                &update.sku,
                update.low_stock_threshold,
            )
            .await?;

        self.get_inventory_item(product_id).await
    }

    /// Lists items whose available quantity is at or below their
    /// low-stock threshold.
    pub async fn get_low_stock_items(&self) -> ServiceResult<Vec<InventoryItem>> {
        Ok(self.db.items().get_low_stock().await?)
    }

    // =========================================================================
    // Warehouses
    // =========================================================================

    /// Creates a warehouse. Rejected with `Duplicate` on a known code.
    pub async fn create_warehouse(&self, new: NewWarehouse) -> ServiceResult<Warehouse> {
        validate_name("name", &new.name)?;
        validate_code("code", &new.code)?;

        info!(code = %new.code, "Creating warehouse");

        if self.db.warehouses().get_by_code(&new.code).await?.is_some() {
            return Err(CoreError::duplicate("code", &new.code).into());
        }

        let warehouse = Warehouse {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            code: new.code,
            address: new.address,
            city: new.city,
            contact_person: new.contact_person,
            is_active: true,
            created_date: Utc::now(),
            last_modified_date: None,
        };

        self.db.warehouses().insert(&warehouse).await?;

        Ok(warehouse)
    }

    /// Gets a warehouse by ID.
    pub async fn get_warehouse(&self, warehouse_id: &str) -> ServiceResult<Warehouse> {
        self.db
            .warehouses()
            .get_by_id(warehouse_id)
            .await?
            .ok_or_else(|| CoreError::WarehouseNotFound(warehouse_id.to_string()).into())
    }

    /// Lists all warehouses.
    pub async fn get_all_warehouses(&self) -> ServiceResult<Vec<Warehouse>> {
        Ok(self.db.warehouses().get_all().await?)
    }

    /// Updates a warehouse.
    pub async fn update_warehouse(
        &self,
        warehouse_id: &str,
        update: UpdateWarehouse,
    ) -> ServiceResult<Warehouse> {
        validate_name("name", &update.name)?;
        validate_code("code", &update.code)?;

        info!(warehouse_id = %warehouse_id, "Updating warehouse");

        let existing = self.get_warehouse(warehouse_id).await?;

        if update.code != existing.code {
            if let Some(other) = self.db.warehouses().get_by_code(&update.code).await? {
                if other.id != existing.id {
                    return Err(CoreError::duplicate("code", &update.code).into());
                }
            }
        }

        let warehouse = Warehouse {
            name: update.name,
            code: update.code,
            address: update.address,
            city: update.city,
            contact_person: update.contact_person,
            is_active: update.is_active,
            ..existing
        };

        self.db.warehouses().update(&warehouse).await?;

        self.get_warehouse(warehouse_id).await
    }

    /// Deletes a warehouse. Refused while any stock row in it still
    /// holds units.
    pub async fn delete_warehouse(&self, warehouse_id: &str) -> ServiceResult<()> {
        info!(warehouse_id = %warehouse_id, "Deleting warehouse");

        self.get_warehouse(warehouse_id).await?;

        if self
            .db
            .warehouse_items()
            .any_stock_in_warehouse(warehouse_id)
            .await?
        {
            return Err(CoreError::WarehouseNotEmpty(warehouse_id.to_string()).into());
        }

        self.db.warehouses().delete(warehouse_id).await?;

        Ok(())
    }

    // =========================================================================
    // Stock queries (advisory reads)
    // =========================================================================

    /// Sums raw physical quantity for a product across all warehouses.
    pub async fn get_total_stock(&self, product_id: &str) -> ServiceResult<i64> {
        let item = self.get_inventory_item(product_id).await?;
        Ok(self.db.warehouse_items().total_quantity(&item.id).await?)
    }

    /// Lists a product's stock rows across all warehouses.
    pub async fn get_stock_by_product(&self, product_id: &str) -> ServiceResult<Vec<WarehouseItem>> {
        let item = self.get_inventory_item(product_id).await?;
        Ok(self
            .db
            .warehouse_items()
            .get_by_inventory_item(&item.id)
            .await?)
    }

    /// Lists all stock rows in a warehouse.
    pub async fn get_stock_by_warehouse(
        &self,
        warehouse_id: &str,
    ) -> ServiceResult<Vec<WarehouseItem>> {
        self.get_warehouse(warehouse_id).await?;
        Ok(self.db.warehouse_items().get_by_warehouse(warehouse_id).await?)
    }

    /// Lists a product's ledger history, optionally bounded by date.
    pub async fn get_transaction_history(
        &self,
        product_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ServiceResult<Vec<InventoryTransaction>> {
        let item = self.get_inventory_item(product_id).await?;
        Ok(self
            .db
            .transactions()
            .get_by_inventory_item(&item.id, from, to)
            .await?)
    }

    /// Standalone reconciliation check: compares the aggregate counters
    /// against the sums over the product's warehouse rows.
    pub async fn verify_consistency(&self, product_id: &str) -> ServiceResult<ConsistencyReport> {
        let item = self.get_inventory_item(product_id).await?;
        let rows = self
            .db
            .warehouse_items()
            .get_by_inventory_item(&item.id)
            .await?;

        Ok(ConsistencyReport::compare(&item, &rows))
    }
}
