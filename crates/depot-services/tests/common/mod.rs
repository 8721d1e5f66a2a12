//! Shared fixture for service-level tests: an isolated in-memory SQLite
//! database with every service wired to it.

#![allow(dead_code)]

use depot_core::{InventoryItem, Warehouse};
use depot_db::{Database, DbConfig};
use depot_services::{
    InventoryCountService, InventoryService, NewInventoryItem, NewWarehouse, ReservationService,
    StockMovementService, StockTransferService,
};

/// The actor identity used by tests for mutating calls.
pub const ACTOR: &str = "test-operator";

pub struct Ctx {
    pub db: Database,
    pub inventory: InventoryService,
    pub movement: StockMovementService,
    pub reservation: ReservationService,
    pub counts: InventoryCountService,
    pub transfers: StockTransferService,
}

/// Creates a fresh, fully migrated in-memory database and the services
/// on top of it. Each call is an isolated world.
pub async fn ctx() -> Ctx {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");

    Ctx {
        inventory: InventoryService::new(db.clone()),
        movement: StockMovementService::new(db.clone()),
        reservation: ReservationService::new(db.clone()),
        counts: InventoryCountService::new(db.clone()),
        transfers: StockTransferService::new(db.clone()),
        db,
    }
}

/// Registers an inventory item with zero stock.
pub async fn seed_item(ctx: &Ctx, product_id: &str, threshold: i64) -> InventoryItem {
    ctx.inventory
        .create_inventory_item(NewInventoryItem {
            product_id: product_id.to_string(),
            sku: format!("SKU-{product_id}"),
            product_name: format!("Product {product_id}"),
            low_stock_threshold: threshold,
        })
        .await
        .expect("seed item")
}

/// Registers a warehouse.
pub async fn seed_warehouse(ctx: &Ctx, code: &str) -> Warehouse {
    ctx.inventory
        .create_warehouse(NewWarehouse {
            name: format!("Warehouse {code}"),
            code: code.to_string(),
            address: None,
            city: None,
            contact_person: None,
        })
        .await
        .expect("seed warehouse")
}
