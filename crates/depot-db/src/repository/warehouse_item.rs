//! # Warehouse Item Repository
//!
//! Database operations for per-warehouse stock rows.
//!
//! Rows are created lazily by the first stock addition at a location, so
//! there is no standalone insert through the pool: creation always
//! happens inside the same transaction as the counter updates it
//! accompanies.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DbError, DbResult};
use depot_core::WarehouseItem;

/// Repository for per-warehouse stock records.
#[derive(Debug, Clone)]
pub struct WarehouseItemRepository {
    pool: SqlitePool,
}

impl WarehouseItemRepository {
    /// Creates a new WarehouseItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WarehouseItemRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a stock row by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<WarehouseItem>> {
        let item = sqlx::query_as::<_, WarehouseItem>("SELECT * FROM warehouse_items WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists all stock rows in a warehouse.
    pub async fn get_by_warehouse(&self, warehouse_id: &str) -> DbResult<Vec<WarehouseItem>> {
        let items = sqlx::query_as::<_, WarehouseItem>(
            "SELECT * FROM warehouse_items WHERE warehouse_id = ?1 ORDER BY location",
        )
        .bind(warehouse_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists a product's stock rows across all warehouses.
    pub async fn get_by_inventory_item(&self, inventory_item_id: &str) -> DbResult<Vec<WarehouseItem>> {
        let items = sqlx::query_as::<_, WarehouseItem>(
            "SELECT * FROM warehouse_items WHERE inventory_item_id = ?1",
        )
        .bind(inventory_item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets the stock row for one `(warehouse, item)` pair.
    pub async fn get_by_warehouse_and_item(
        &self,
        warehouse_id: &str,
        inventory_item_id: &str,
    ) -> DbResult<Option<WarehouseItem>> {
        let item = sqlx::query_as::<_, WarehouseItem>(
            "SELECT * FROM warehouse_items WHERE warehouse_id = ?1 AND inventory_item_id = ?2",
        )
        .bind(warehouse_id)
        .bind(inventory_item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Sums raw physical quantity for a product across all warehouses.
    pub async fn total_quantity(&self, inventory_item_id: &str) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(quantity) FROM warehouse_items WHERE inventory_item_id = ?1",
        )
        .bind(inventory_item_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }

    /// Whether any stock row in the warehouse still holds units.
    pub async fn any_stock_in_warehouse(&self, warehouse_id: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM warehouse_items WHERE warehouse_id = ?1 AND quantity > 0",
        )
        .bind(warehouse_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    // =========================================================================
    // Transaction-scoped mutations
    // =========================================================================

    /// Re-reads a `(warehouse, item)` pair inside an open transaction.
    /// The lazy-create decision in stock addition must be made here, not
    /// against the pool, or two concurrent first-additions would race.
    pub async fn fetch_by_pair(
        conn: &mut SqliteConnection,
        warehouse_id: &str,
        inventory_item_id: &str,
    ) -> DbResult<Option<WarehouseItem>> {
        let item = sqlx::query_as::<_, WarehouseItem>(
            "SELECT * FROM warehouse_items WHERE warehouse_id = ?1 AND inventory_item_id = ?2",
        )
        .bind(warehouse_id)
        .bind(inventory_item_id)
        .fetch_optional(conn)
        .await?;

        Ok(item)
    }

    /// Lists a warehouse's stock rows inside an open transaction. Count
    /// sessions snapshot expected quantities through this, in the same
    /// transaction that transitions the session, so the snapshot cannot
    /// interleave with a movement.
    pub async fn fetch_by_warehouse(
        conn: &mut SqliteConnection,
        warehouse_id: &str,
    ) -> DbResult<Vec<WarehouseItem>> {
        let items = sqlx::query_as::<_, WarehouseItem>(
            "SELECT * FROM warehouse_items WHERE warehouse_id = ?1 ORDER BY location",
        )
        .bind(warehouse_id)
        .fetch_all(conn)
        .await?;

        Ok(items)
    }

    /// Inserts a lazily-created stock row.
    pub async fn insert(conn: &mut SqliteConnection, item: &WarehouseItem) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO warehouse_items (
                id, warehouse_id, inventory_item_id,
                quantity, reserved_quantity, location,
                last_count_date, created_date, last_modified_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&item.id)
        .bind(&item.warehouse_id)
        .bind(&item.inventory_item_id)
        .bind(item.quantity)
        .bind(item.reserved_quantity)
        .bind(&item.location)
        .bind(item.last_count_date)
        .bind(item.created_date)
        .bind(item.last_modified_date)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Adjusts the row's quantity by `delta`.
    ///
    /// Guard: the new quantity may not drop below zero or below
    /// `reserved_quantity`. Returns `false` when the guard rejects.
    pub async fn adjust_quantity(
        conn: &mut SqliteConnection,
        id: &str,
        delta: i64,
    ) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE warehouse_items SET
                quantity = quantity + ?2,
                last_modified_date = ?3
            WHERE id = ?1
              AND quantity + ?2 >= reserved_quantity
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            if Self::fetch_by_id(conn, id).await?.is_none() {
                return Err(DbError::not_found("WarehouseItem", id));
            }
            return Ok(false);
        }

        Ok(true)
    }

    /// Overwrites the row's quantity with a counted value and stamps
    /// `last_count_date`. Used only by count completion, which writes the
    /// counted quantity directly rather than a delta.
    ///
    /// Guard: the counted quantity may not fall below the outstanding
    /// reservation. Returns `false` when it would.
    pub async fn set_quantity(
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
    ) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE warehouse_items SET
                quantity = ?2,
                last_count_date = ?3,
                last_modified_date = ?3
            WHERE id = ?1
              AND ?2 >= reserved_quantity
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            if Self::fetch_by_id(conn, id).await?.is_none() {
                return Err(DbError::not_found("WarehouseItem", id));
            }
            return Ok(false);
        }

        Ok(true)
    }

    /// Increments the row's `reserved_quantity`.
    ///
    /// Guard: available quantity at this location must cover the request.
    pub async fn reserve(conn: &mut SqliteConnection, id: &str, quantity: i64) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE warehouse_items SET
                reserved_quantity = reserved_quantity + ?2,
                last_modified_date = ?3
            WHERE id = ?1
              AND quantity - reserved_quantity >= ?2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            if Self::fetch_by_id(conn, id).await?.is_none() {
                return Err(DbError::not_found("WarehouseItem", id));
            }
            return Ok(false);
        }

        Ok(true)
    }

    /// Decrements the row's `reserved_quantity` (already clamped by the
    /// caller).
    pub async fn release(conn: &mut SqliteConnection, id: &str, quantity: i64) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE warehouse_items SET
                reserved_quantity = reserved_quantity - ?2,
                last_modified_date = ?3
            WHERE id = ?1
              AND reserved_quantity >= ?2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            if Self::fetch_by_id(conn, id).await?.is_none() {
                return Err(DbError::not_found("WarehouseItem", id));
            }
            return Ok(false);
        }

        Ok(true)
    }

    async fn fetch_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<WarehouseItem>> {
        let item = sqlx::query_as::<_, WarehouseItem>("SELECT * FROM warehouse_items WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(item)
    }
}
