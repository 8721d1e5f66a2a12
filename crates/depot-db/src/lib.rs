//! # depot-db: Database Layer for Depot
//!
//! SQLite storage for the inventory engine, via sqlx.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per entity
//!
//! ## Transactions
//!
//! Repositories come in two flavors of method:
//!
//! - instance methods on a pool-holding repository struct, for reads and
//!   standalone single-statement writes;
//! - associated functions taking `&mut SqliteConnection`, for the guarded
//!   mutations that must compose into one transaction (both counter
//!   levels plus the ledger row commit together, or not at all).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use depot_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/depot.db")).await?;
//!
//! // Reads go through the pool:
//! let item = db.items().get_by_product_id("P-100").await?;
//!
//! // Mutations compose inside a transaction:
//! let mut tx = db.begin().await?;
//! InventoryItemRepository::adjust_quantity(&mut tx, &item.id, 10).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::count::CountRepository;
pub use repository::inventory_item::InventoryItemRepository;
pub use repository::transaction::TransactionRepository;
pub use repository::transfer::TransferRepository;
pub use repository::warehouse::WarehouseRepository;
pub use repository::warehouse_item::WarehouseItemRepository;
