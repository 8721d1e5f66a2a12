//! # depot-services: Inventory Service Layer
//!
//! The orchestration layer of the Depot inventory engine. Each service
//! holds a [`depot_db::Database`] handle and composes repository calls
//! inside explicit transactions: the two counter levels and the ledger
//! row for one operation commit or roll back together.
//!
//! ## Services
//!
//! - [`InventoryService`] - item/warehouse registries, stock queries,
//!   transaction history, the consistency check
//! - [`StockMovementService`] - add/remove physical stock
//! - [`ReservationService`] - reserve/release against open demand
//! - [`InventoryCountService`] - physical count sessions
//! - [`StockTransferService`] - inter-warehouse transfers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use depot_db::{Database, DbConfig};
//! use depot_services::{InventoryService, NewInventoryItem, StockMovementService};
//!
//! let db = Database::new(DbConfig::new("depot.db")).await?;
//!
//! let inventory = InventoryService::new(db.clone());
//! inventory.create_inventory_item(NewInventoryItem {
//!     product_id: "P-100".into(),
//!     sku: "SKU-100".into(),
//!     product_name: "Widget".into(),
//!     low_stock_threshold: 10,
//! }).await?;
//!
//! let movement = StockMovementService::new(db.clone());
//! movement.add_stock("P-100", &warehouse.id, 25, "receiving-bay-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod count;
pub mod error;
pub mod inventory;
pub mod movement;
pub mod reservation;
pub mod transfer;

// =============================================================================
// Re-exports
// =============================================================================

pub use count::{CountItemInput, InventoryCountService};
pub use error::{ServiceError, ServiceResult};
pub use inventory::{
    InventoryService, NewInventoryItem, NewWarehouse, UpdateInventoryItem, UpdateWarehouse,
};
pub use movement::StockMovementService;
pub use reservation::ReservationService;
pub use transfer::{StockTransferService, TransferItemInput};
