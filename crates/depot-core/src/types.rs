//! # Stock Ledger Types
//!
//! Entities of the inventory engine and their invariants.
//!
//! ## Dual-Level Counters
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  InventoryItem (aggregate, one per product)                         │
//! │    quantity ──────────── == Σ WarehouseItem.quantity                │
//! │    reserved_quantity ─── == Σ WarehouseItem.reserved_quantity       │
//! │                                                                     │
//! │  WarehouseItem (one per product per warehouse)                      │
//! │    quantity / reserved_quantity / location                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//! Both levels carry `0 <= reserved_quantity <= quantity`; the sums must
//! hold after every committed operation. Derived values
//! (`available_quantity`, `is_low_stock`, `difference`) are computed on
//! read and never stored, so they cannot drift.
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business key: (`product_id`, `sku`, warehouse `code`, `count_number`,
//!   `transfer_number`) - human-facing, unique

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{CountStatus, TransferStatus};

// =============================================================================
// Inventory Item (aggregate stock record)
// =============================================================================

/// Aggregate stock record, one per product.
///
/// `quantity` and `reserved_quantity` are maintained in lockstep with the
/// per-warehouse rows: every mutation updates both levels inside one
/// transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Product this record tracks - business identifier, unique.
    pub product_id: String,

    /// Stock Keeping Unit - business identifier, unique.
    pub sku: String,

    /// Display name carried from the catalog.
    pub product_name: String,

    /// Total physical units across all warehouses.
    pub quantity: i64,

    /// Units promised to open demand but not yet removed.
    pub reserved_quantity: i64,

    /// Available-quantity level at or below which the item is low stock.
    pub low_stock_threshold: i64,

    /// When stock was last added anywhere.
    pub last_restock_date: Option<DateTime<Utc>>,

    /// When the record was created.
    pub created_date: DateTime<Utc>,

    /// When the record was last modified.
    pub last_modified_date: Option<DateTime<Utc>>,
}

impl InventoryItem {
    /// Units that can still be promised: `quantity - reserved_quantity`.
    ///
    /// Derived on read, never stored.
    #[inline]
    pub fn available_quantity(&self) -> i64 {
        self.quantity - self.reserved_quantity
    }

    /// Whether available stock has fallen to or below the threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.available_quantity() <= self.low_stock_threshold
    }

    /// Whether any unpromised stock remains.
    #[inline]
    pub fn is_in_stock(&self) -> bool {
        self.available_quantity() > 0
    }
}

// =============================================================================
// Warehouse
// =============================================================================

/// A physical stock location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Warehouse {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Short warehouse code - business identifier, unique.
    pub code: String,

    /// Street address.
    pub address: Option<String>,

    /// City.
    pub city: Option<String>,

    /// On-site contact.
    pub contact_person: Option<String>,

    /// Whether the warehouse is accepting operations (soft delete).
    pub is_active: bool,

    pub created_date: DateTime<Utc>,
    pub last_modified_date: Option<DateTime<Utc>>,
}

// =============================================================================
// Warehouse Item (per-location stock record)
// =============================================================================

/// Per-warehouse stock record, one per product per warehouse.
///
/// Created lazily the first time stock is added at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct WarehouseItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Warehouse holding the stock.
    pub warehouse_id: String,

    /// Aggregate record this row contributes to.
    pub inventory_item_id: String,

    /// Physical units at this location.
    pub quantity: i64,

    /// Units promised to open demand at this location.
    pub reserved_quantity: i64,

    /// Free-text shelf/bin location within the warehouse.
    pub location: String,

    /// When a physical count last reconciled this row.
    pub last_count_date: Option<DateTime<Utc>>,

    pub created_date: DateTime<Utc>,
    pub last_modified_date: Option<DateTime<Utc>>,
}

impl WarehouseItem {
    /// Units that can still be promised at this location.
    #[inline]
    pub fn available_quantity(&self) -> i64 {
        self.quantity - self.reserved_quantity
    }
}

// =============================================================================
// Inventory Transaction (append-only ledger)
// =============================================================================

/// Kind of stock-affecting event recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Physical stock added at a location.
    StockIn,
    /// Physical stock removed from a location.
    StockOut,
    /// Upward correction from a physical count.
    Adjustment,
    /// Stock promised to open demand.
    Reserve,
    /// Promise released back to available stock.
    Release,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::StockIn => "stock_in",
            TransactionType::StockOut => "stock_out",
            TransactionType::Adjustment => "adjustment",
            TransactionType::Reserve => "reserve",
            TransactionType::Release => "release",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the append-only movement ledger.
///
/// Rows are inserted once and never updated or deleted; the ledger is the
/// sole audit source of truth for stock history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryTransaction {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Aggregate record the event concerns.
    pub inventory_item_id: String,

    /// What happened.
    pub transaction_type: TransactionType,

    /// Magnitude of the event. Always non-negative; direction is carried
    /// by `transaction_type`.
    pub quantity: i64,

    /// Correlates the row with its origin: a count number, a transfer
    /// number, or a generated reference for ad hoc movements.
    pub reference_number: String,

    /// Human-readable description of the event.
    pub notes: String,

    /// Identity of the caller that performed the operation.
    pub created_by: String,

    /// When the row was appended.
    pub created_date: DateTime<Utc>,
}

// =============================================================================
// Inventory Count (physical count session)
// =============================================================================

/// A physical count session for one warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryCount {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Warehouse being counted.
    pub warehouse_id: String,

    /// Session number (`IC-YYYYMMDD-XXXXXXXX`) - business identifier,
    /// unique. Ledger corrections reference it.
    pub count_number: String,

    /// When the session was opened.
    pub count_date: DateTime<Utc>,

    /// Where the session sits in its lifecycle.
    pub status: CountStatus,

    /// Who is performing the count.
    pub count_by: String,

    pub notes: Option<String>,

    pub created_date: DateTime<Utc>,
    pub last_modified_date: Option<DateTime<Utc>>,
}

/// One counted item within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryCountItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Session this row belongs to.
    pub inventory_count_id: String,

    /// Aggregate record being counted.
    pub inventory_item_id: String,

    /// Recorded quantity at the moment the session started (or the row
    /// was first created, for items discovered mid-count).
    pub expected_quantity: i64,

    /// Quantity found on the shelf.
    pub actual_quantity: i64,

    pub notes: Option<String>,

    pub created_date: DateTime<Utc>,
    pub last_modified_date: Option<DateTime<Utc>>,
}

impl InventoryCountItem {
    /// Signed discrepancy: `actual - expected`. Derived on read.
    #[inline]
    pub fn difference(&self) -> i64 {
        self.actual_quantity - self.expected_quantity
    }
}

// =============================================================================
// Discrepancy Summary (count read model)
// =============================================================================

/// Aggregated view of a count session's discrepancies. Pure read model;
/// producing it has no side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscrepancySummary {
    /// Items in the session.
    pub total_items: i64,
    /// Items where counted == expected.
    pub matching_items: i64,
    /// Items with any discrepancy.
    pub discrepancy_items: i64,
    /// Items counted above expectation.
    pub overage_items: i64,
    /// Items counted below expectation.
    pub shortage_items: i64,
    /// Net signed quantity discrepancy across the session.
    pub total_discrepancy: i64,
}

impl DiscrepancySummary {
    /// Summarize a session's count items.
    pub fn from_items(items: &[InventoryCountItem]) -> Self {
        let mut summary = DiscrepancySummary {
            total_items: items.len() as i64,
            ..Default::default()
        };

        for item in items {
            match item.difference() {
                0 => summary.matching_items += 1,
                d if d > 0 => {
                    summary.discrepancy_items += 1;
                    summary.overage_items += 1;
                    summary.total_discrepancy += d;
                }
                d => {
                    summary.discrepancy_items += 1;
                    summary.shortage_items += 1;
                    summary.total_discrepancy += d;
                }
            }
        }

        summary
    }
}

// =============================================================================
// Stock Transfer
// =============================================================================

/// A multi-item movement of stock between two warehouses, tracked through
/// an approval-style status progression. Only the transition into
/// `Completed` moves quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockTransfer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Transfer number (`ST-YYYYMMDD-XXXXXXXX`) - business identifier,
    /// unique. Ledger rows emitted on completion reference it.
    pub transfer_number: String,

    /// Warehouse the stock leaves.
    pub source_warehouse_id: String,

    /// Warehouse the stock arrives at.
    pub destination_warehouse_id: String,

    /// When the transfer was requested.
    pub transfer_date: DateTime<Utc>,

    /// Where the transfer sits in its lifecycle.
    pub status: TransferStatus,

    /// Who requested the transfer.
    pub requested_by: String,

    /// Who approved it; set by the `Pending -> Approved` transition.
    pub approved_by: Option<String>,

    /// When it was approved.
    pub approval_date: Option<DateTime<Utc>>,

    pub notes: Option<String>,

    pub created_date: DateTime<Utc>,
    pub last_modified_date: Option<DateTime<Utc>>,
}

/// One line of a stock transfer. Quantity is snapshotted at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockTransferItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Transfer this line belongs to.
    pub stock_transfer_id: String,

    /// Aggregate record being moved.
    pub inventory_item_id: String,

    /// Units to move.
    pub quantity: i64,

    pub notes: Option<String>,

    pub created_date: DateTime<Utc>,
}

// =============================================================================
// Consistency Report (reconciliation read model)
// =============================================================================

/// Result of the standalone `aggregate == Σ per-warehouse rows`
/// reconciliation check, usable in tests and operational audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub product_id: String,
    /// Counters on the aggregate record.
    pub aggregate_quantity: i64,
    pub aggregate_reserved: i64,
    /// Sums over the product's warehouse rows.
    pub warehouse_quantity: i64,
    pub warehouse_reserved: i64,
}

impl ConsistencyReport {
    /// Compare an aggregate record against its warehouse rows.
    pub fn compare(item: &InventoryItem, warehouse_items: &[WarehouseItem]) -> Self {
        ConsistencyReport {
            product_id: item.product_id.clone(),
            aggregate_quantity: item.quantity,
            aggregate_reserved: item.reserved_quantity,
            warehouse_quantity: warehouse_items.iter().map(|wi| wi.quantity).sum(),
            warehouse_reserved: warehouse_items.iter().map(|wi| wi.reserved_quantity).sum(),
        }
    }

    /// Whether both counter levels agree.
    pub fn is_consistent(&self) -> bool {
        self.aggregate_quantity == self.warehouse_quantity
            && self.aggregate_reserved == self.warehouse_reserved
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, reserved: i64, threshold: i64) -> InventoryItem {
        InventoryItem {
            id: "ii-1".into(),
            product_id: "P-100".into(),
            sku: "SKU-100".into(),
            product_name: "Widget".into(),
            quantity,
            reserved_quantity: reserved,
            low_stock_threshold: threshold,
            last_restock_date: None,
            created_date: Utc::now(),
            last_modified_date: None,
        }
    }

    fn warehouse_item(quantity: i64, reserved: i64) -> WarehouseItem {
        WarehouseItem {
            id: "wi-1".into(),
            warehouse_id: "wh-1".into(),
            inventory_item_id: "ii-1".into(),
            quantity,
            reserved_quantity: reserved,
            location: "A-01".into(),
            last_count_date: None,
            created_date: Utc::now(),
            last_modified_date: None,
        }
    }

    fn count_item(expected: i64, actual: i64) -> InventoryCountItem {
        InventoryCountItem {
            id: "ci-1".into(),
            inventory_count_id: "ic-1".into(),
            inventory_item_id: "ii-1".into(),
            expected_quantity: expected,
            actual_quantity: actual,
            notes: None,
            created_date: Utc::now(),
            last_modified_date: None,
        }
    }

    #[test]
    fn available_quantity_is_quantity_minus_reserved() {
        assert_eq!(item(100, 30, 0).available_quantity(), 70);
        assert_eq!(warehouse_item(10, 10).available_quantity(), 0);
    }

    #[test]
    fn low_stock_compares_against_available_not_total() {
        // 100 on hand but 95 promised: only 5 available, below threshold 10.
        let i = item(100, 95, 10);
        assert!(i.is_low_stock());
        assert!(i.is_in_stock());

        let healthy = item(100, 10, 10);
        assert!(!healthy.is_low_stock());
    }

    #[test]
    fn fully_reserved_item_is_not_in_stock() {
        assert!(!item(50, 50, 0).is_in_stock());
    }

    #[test]
    fn count_item_difference_is_signed() {
        assert_eq!(count_item(40, 50).difference(), 10);
        assert_eq!(count_item(40, 30).difference(), -10);
        assert_eq!(count_item(40, 40).difference(), 0);
    }

    #[test]
    fn discrepancy_summary_buckets_items() {
        let items = vec![
            count_item(10, 10), // match
            count_item(10, 15), // overage +5
            count_item(10, 7),  // shortage -3
            count_item(0, 2),   // overage +2 (discovered item)
        ];

        let summary = DiscrepancySummary::from_items(&items);
        assert_eq!(summary.total_items, 4);
        assert_eq!(summary.matching_items, 1);
        assert_eq!(summary.discrepancy_items, 3);
        assert_eq!(summary.overage_items, 2);
        assert_eq!(summary.shortage_items, 1);
        assert_eq!(summary.total_discrepancy, 4);
    }

    #[test]
    fn consistency_report_sums_warehouse_rows() {
        let aggregate = item(30, 5, 0);
        let rows = vec![warehouse_item(20, 5), warehouse_item(10, 0)];

        let report = ConsistencyReport::compare(&aggregate, &rows);
        assert!(report.is_consistent());

        let drifted = ConsistencyReport::compare(&item(31, 5, 0), &rows);
        assert!(!drifted.is_consistent());
    }

    #[test]
    fn transaction_type_names_are_stable() {
        assert_eq!(TransactionType::StockIn.to_string(), "stock_in");
        assert_eq!(TransactionType::Release.to_string(), "release");
    }
}
