//! # Inventory Count Repository
//!
//! Database operations for physical count sessions and their items.
//!
//! Status changes are guarded UPDATEs (`WHERE status = <expected>`), so a
//! session that moved under a concurrent caller affects zero rows instead
//! of silently re-transitioning.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use depot_core::{CountStatus, InventoryCount, InventoryCountItem};

/// Repository for count sessions.
#[derive(Debug, Clone)]
pub struct CountRepository {
    pool: SqlitePool,
}

impl CountRepository {
    /// Creates a new CountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CountRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a session by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<InventoryCount>> {
        let count = sqlx::query_as::<_, InventoryCount>("SELECT * FROM inventory_counts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(count)
    }

    /// Lists sessions for a warehouse, newest first.
    pub async fn get_by_warehouse(&self, warehouse_id: &str) -> DbResult<Vec<InventoryCount>> {
        let counts = sqlx::query_as::<_, InventoryCount>(
            "SELECT * FROM inventory_counts WHERE warehouse_id = ?1 ORDER BY count_date DESC",
        )
        .bind(warehouse_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Lists sessions in a given status, newest first.
    pub async fn get_by_status(&self, status: CountStatus) -> DbResult<Vec<InventoryCount>> {
        let counts = sqlx::query_as::<_, InventoryCount>(
            "SELECT * FROM inventory_counts WHERE status = ?1 ORDER BY count_date DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Lists all sessions, newest first.
    pub async fn get_all(&self) -> DbResult<Vec<InventoryCount>> {
        let counts =
            sqlx::query_as::<_, InventoryCount>("SELECT * FROM inventory_counts ORDER BY count_date DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(counts)
    }

    /// Lists a session's count items.
    pub async fn get_items(&self, count_id: &str) -> DbResult<Vec<InventoryCountItem>> {
        let items = sqlx::query_as::<_, InventoryCountItem>(
            "SELECT * FROM inventory_count_items WHERE inventory_count_id = ?1 ORDER BY created_date, id",
        )
        .bind(count_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a new session (always created in Draft).
    pub async fn insert(&self, count: &InventoryCount) -> DbResult<()> {
        debug!(count_number = %count.count_number, warehouse_id = %count.warehouse_id, "Inserting inventory count");

        sqlx::query(
            r#"
            INSERT INTO inventory_counts (
                id, warehouse_id, count_number, count_date,
                status, count_by, notes, created_date, last_modified_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&count.id)
        .bind(&count.warehouse_id)
        .bind(&count.count_number)
        .bind(count.count_date)
        .bind(count.status)
        .bind(&count.count_by)
        .bind(&count.notes)
        .bind(count.created_date)
        .bind(count.last_modified_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Moves a session from `from` to `to`, optionally replacing its
    /// notes. The WHERE clause carries the expected current status;
    /// zero rows affected means the session moved concurrently.
    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: &str,
        from: CountStatus,
        to: CountStatus,
        notes: Option<&str>,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE inventory_counts SET
                status = ?3,
                notes = COALESCE(?4, notes),
                last_modified_date = ?5
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(notes)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                format!("InventoryCount ({})", from.as_str()),
                id,
            ));
        }

        Ok(())
    }

    /// Fetches one count item row inside an open transaction.
    pub async fn fetch_item(
        conn: &mut SqliteConnection,
        count_id: &str,
        inventory_item_id: &str,
    ) -> DbResult<Option<InventoryCountItem>> {
        let item = sqlx::query_as::<_, InventoryCountItem>(
            "SELECT * FROM inventory_count_items WHERE inventory_count_id = ?1 AND inventory_item_id = ?2",
        )
        .bind(count_id)
        .bind(inventory_item_id)
        .fetch_optional(conn)
        .await?;

        Ok(item)
    }

    /// Inserts a count item row (snapshot at start, or an item discovered
    /// mid-count).
    pub async fn insert_item(conn: &mut SqliteConnection, item: &InventoryCountItem) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory_count_items (
                id, inventory_count_id, inventory_item_id,
                expected_quantity, actual_quantity, notes,
                created_date, last_modified_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.inventory_count_id)
        .bind(&item.inventory_item_id)
        .bind(item.expected_quantity)
        .bind(item.actual_quantity)
        .bind(&item.notes)
        .bind(item.created_date)
        .bind(item.last_modified_date)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Updates the counted quantity and notes on an existing count item.
    /// `expected_quantity` stays frozen at its snapshot value.
    pub async fn update_item(
        conn: &mut SqliteConnection,
        id: &str,
        actual_quantity: i64,
        notes: Option<&str>,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE inventory_count_items SET
                actual_quantity = ?2,
                notes = COALESCE(?3, notes),
                last_modified_date = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(actual_quantity)
        .bind(notes)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InventoryCountItem", id));
        }

        Ok(())
    }
}
