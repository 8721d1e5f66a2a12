//! # Status State Machines
//!
//! Count and transfer sessions move through a finite set of states. Every
//! mutating call checks the allowed-transitions table below before touching
//! anything, so an illegal transition fails the same way everywhere.
//!
//! ## Lifecycles
//! ```text
//! InventoryCount:   Draft ──► InProgress ──► Completed
//!                     │            │
//!                     └────────────┴───────► Cancelled
//!
//! StockTransfer:    Draft ──► Pending ──► Approved ──► InTransit ──► Completed
//!                     │          │            │             │
//!                     └──────────┴────────────┴─────────────┴──────► Cancelled
//! ```
//!
//! `Completed` and `Cancelled` are terminal; sessions are never mutated
//! once terminal.

use serde::{Deserialize, Serialize};

// =============================================================================
// Inventory Count Status
// =============================================================================

/// The status of a physical count session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CountStatus {
    /// Session created, expected quantities not yet snapshotted.
    Draft,
    /// Snapshot taken, counted quantities being collected.
    InProgress,
    /// Differences reconciled into the ledger. Terminal.
    Completed,
    /// Abandoned without touching stock. Terminal.
    Cancelled,
}

impl CountStatus {
    /// Allowed-transitions table for count sessions.
    pub fn can_transition_to(self, next: CountStatus) -> bool {
        use CountStatus::*;
        matches!(
            (self, next),
            (Draft, InProgress) | (Draft, Cancelled) | (InProgress, Completed) | (InProgress, Cancelled)
        )
    }

    /// Terminal states accept no further mutation.
    pub fn is_terminal(self) -> bool {
        matches!(self, CountStatus::Completed | CountStatus::Cancelled)
    }

    /// Stable lowercase name, matching the stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            CountStatus::Draft => "draft",
            CountStatus::InProgress => "in_progress",
            CountStatus::Completed => "completed",
            CountStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for CountStatus {
    fn default() -> Self {
        CountStatus::Draft
    }
}

impl std::fmt::Display for CountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Stock Transfer Status
// =============================================================================

/// The status of an inter-warehouse stock transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Transfer drafted, not yet submitted.
    Draft,
    /// Submitted, awaiting approval.
    Pending,
    /// Approved, goods not yet moving.
    Approved,
    /// Goods in transit between warehouses.
    InTransit,
    /// Stock moved; the only transition that touches quantities. Terminal.
    Completed,
    /// Abandoned from any non-terminal state. Terminal.
    Cancelled,
}

impl TransferStatus {
    /// Allowed-transitions table for transfers.
    ///
    /// The forward path is strictly sequential; `Cancelled` is reachable
    /// from every non-terminal state.
    pub fn can_transition_to(self, next: TransferStatus) -> bool {
        use TransferStatus::*;
        match (self, next) {
            (Draft, Pending) | (Pending, Approved) | (Approved, InTransit) | (InTransit, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Terminal states accept no further mutation.
    pub fn is_terminal(self) -> bool {
        matches!(self, TransferStatus::Completed | TransferStatus::Cancelled)
    }

    /// Stable lowercase name, matching the stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TransferStatus::Draft => "draft",
            TransferStatus::Pending => "pending",
            TransferStatus::Approved => "approved",
            TransferStatus::InTransit => "in_transit",
            TransferStatus::Completed => "completed",
            TransferStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for TransferStatus {
    fn default() -> Self {
        TransferStatus::Draft
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
