//! # Repository Module
//!
//! Database repository implementations for Depot, one per entity.
//!
//! ## Repository Pattern
//! Each repository abstracts the SQL for its table behind a clean API:
//! services never issue raw queries. Reads go through pool-holding
//! instance methods; the guarded mutations that must compose into one
//! transaction are associated functions taking `&mut SqliteConnection`.
//!
//! ## Guarded counter updates
//! Counter mutations carry their invariant in the UPDATE's WHERE clause
//! (`quantity + delta >= reserved_quantity`, `available >= requested`).
//! A zero-row result means the guard rejected the change under a
//! concurrent writer; the caller re-reads and reports precisely. This is
//! what serializes writers to one `(product, warehouse)` pair.
//!
//! ## Available Repositories
//!
//! - [`inventory_item::InventoryItemRepository`] - Aggregate stock records
//! - [`warehouse::WarehouseRepository`] - Stock locations
//! - [`warehouse_item::WarehouseItemRepository`] - Per-location stock rows
//! - [`transaction::TransactionRepository`] - Append-only movement ledger
//! - [`count::CountRepository`] - Physical count sessions
//! - [`transfer::TransferRepository`] - Inter-warehouse transfers

pub mod count;
pub mod inventory_item;
pub mod transaction;
pub mod transfer;
pub mod warehouse;
pub mod warehouse_item;
