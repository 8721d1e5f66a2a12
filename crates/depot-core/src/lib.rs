//! # depot-core: Pure Business Logic for Depot
//!
//! This crate is the heart of the Depot inventory engine. It contains the
//! stock ledger entities, their invariants, the count/transfer state
//! machines and the domain error taxonomy — all as pure types and
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Depot Architecture                         │
//! │                                                                 │
//! │  ┌───────────────────────────────────────────────────────────┐ │
//! │  │                    depot-services                         │ │
//! │  │   movement, reservation, counts, transfers, queries       │ │
//! │  └─────────────────────────────┬─────────────────────────────┘ │
//! │                                │                                │
//! │  ┌─────────────────────────────▼─────────────────────────────┐ │
//! │  │               ★ depot-core (THIS CRATE) ★                 │ │
//! │  │                                                           │ │
//! │  │  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌────────────┐   │ │
//! │  │  │  types  │  │  state  │  │  error  │  │ validation │   │ │
//! │  │  └─────────┘  └─────────┘  └─────────┘  └────────────┘   │ │
//! │  │                                                           │ │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS       │ │
//! │  └─────────────────────────────┬─────────────────────────────┘ │
//! │                                │                                │
//! │  ┌─────────────────────────────▼─────────────────────────────┐ │
//! │  │                    depot-db (SQLite)                      │ │
//! │  └───────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Stock ledger entities and derived-field functions
//! - [`state`] - Count and transfer status state machines
//! - [`error`] - Domain error taxonomy
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Derived fields are functions**: `available_quantity`,
//!    `is_low_stock` and `difference` are computed from stored fields on
//!    every read and never persisted.
//! 2. **Explicit state machines**: every status change is checked against
//!    an allowed-transitions table, not ad hoc comparisons.
//! 3. **Typed errors**: all failures are enum variants, never strings or
//!    panics.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use state::{CountStatus, TransferStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Shelf/bin location assigned to warehouse stock rows created lazily by
/// the first stock addition, before anyone has placed the goods.
pub const DEFAULT_LOCATION: &str = "Default";
