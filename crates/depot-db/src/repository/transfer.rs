//! # Stock Transfer Repository
//!
//! Database operations for inter-warehouse transfers and their lines.
//!
//! Like count sessions, status changes are guarded UPDATEs keyed on the
//! expected current status. Approval metadata (`approved_by`,
//! `approval_date`) is written by the same statement that performs the
//! `Pending -> Approved` move, so it can never exist on an unapproved
//! transfer.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use depot_core::{StockTransfer, StockTransferItem, TransferStatus};

/// Repository for stock transfers.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    pool: SqlitePool,
}

impl TransferRepository {
    /// Creates a new TransferRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransferRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a transfer by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockTransfer>> {
        let transfer = sqlx::query_as::<_, StockTransfer>("SELECT * FROM stock_transfers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(transfer)
    }

    /// Lists transfers in a given status, newest first.
    pub async fn get_by_status(&self, status: TransferStatus) -> DbResult<Vec<StockTransfer>> {
        let transfers = sqlx::query_as::<_, StockTransfer>(
            "SELECT * FROM stock_transfers WHERE status = ?1 ORDER BY transfer_date DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(transfers)
    }

    /// Lists transfers touching a warehouse, as source or destination.
    pub async fn get_by_warehouse(
        &self,
        warehouse_id: &str,
        is_source: bool,
    ) -> DbResult<Vec<StockTransfer>> {
        let column = if is_source {
            "source_warehouse_id"
        } else {
            "destination_warehouse_id"
        };

        let sql = format!(
            "SELECT * FROM stock_transfers WHERE {column} = ?1 ORDER BY transfer_date DESC"
        );

        let transfers = sqlx::query_as::<_, StockTransfer>(&sql)
            .bind(warehouse_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(transfers)
    }

    /// Lists all transfers, newest first.
    pub async fn get_all(&self) -> DbResult<Vec<StockTransfer>> {
        let transfers =
            sqlx::query_as::<_, StockTransfer>("SELECT * FROM stock_transfers ORDER BY transfer_date DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(transfers)
    }

    /// Lists a transfer's lines.
    pub async fn get_items(&self, transfer_id: &str) -> DbResult<Vec<StockTransferItem>> {
        let items = sqlx::query_as::<_, StockTransferItem>(
            "SELECT * FROM stock_transfer_items WHERE stock_transfer_id = ?1 ORDER BY created_date, id",
        )
        .bind(transfer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts the transfer header inside an open transaction (creation
    /// commits header and lines together).
    pub async fn insert(conn: &mut SqliteConnection, transfer: &StockTransfer) -> DbResult<()> {
        debug!(transfer_number = %transfer.transfer_number, "Inserting stock transfer");

        sqlx::query(
            r#"
            INSERT INTO stock_transfers (
                id, transfer_number, source_warehouse_id, destination_warehouse_id,
                transfer_date, status, requested_by, approved_by, approval_date,
                notes, created_date, last_modified_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&transfer.id)
        .bind(&transfer.transfer_number)
        .bind(&transfer.source_warehouse_id)
        .bind(&transfer.destination_warehouse_id)
        .bind(transfer.transfer_date)
        .bind(transfer.status)
        .bind(&transfer.requested_by)
        .bind(&transfer.approved_by)
        .bind(transfer.approval_date)
        .bind(&transfer.notes)
        .bind(transfer.created_date)
        .bind(transfer.last_modified_date)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts one transfer line.
    pub async fn insert_item(conn: &mut SqliteConnection, item: &StockTransferItem) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_transfer_items (
                id, stock_transfer_id, inventory_item_id, quantity, notes, created_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.stock_transfer_id)
        .bind(&item.inventory_item_id)
        .bind(item.quantity)
        .bind(&item.notes)
        .bind(item.created_date)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Moves a transfer from `from` to `to`. When `approved_by` is given
    /// (the approval transition), approval metadata is stamped in the
    /// same statement.
    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: &str,
        from: TransferStatus,
        to: TransferStatus,
        approved_by: Option<&str>,
        notes: Option<&str>,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE stock_transfers SET
                status = ?3,
                approved_by = COALESCE(?4, approved_by),
                approval_date = CASE WHEN ?4 IS NULL THEN approval_date ELSE ?6 END,
                notes = COALESCE(?5, notes),
                last_modified_date = ?6
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(approved_by)
        .bind(notes)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                format!("StockTransfer ({})", from.as_str()),
                id,
            ));
        }

        Ok(())
    }

    /// Updates quantity/notes on one line. The service layer only allows
    /// this while the transfer is still Draft or Pending.
    pub async fn update_item(
        &self,
        transfer_id: &str,
        inventory_item_id: &str,
        quantity: i64,
        notes: Option<&str>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE stock_transfer_items SET
                quantity = ?3,
                notes = COALESCE(?4, notes)
            WHERE stock_transfer_id = ?1 AND inventory_item_id = ?2
            "#,
        )
        .bind(transfer_id)
        .bind(inventory_item_id)
        .bind(quantity)
        .bind(notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("StockTransferItem", inventory_item_id));
        }

        Ok(())
    }
}
