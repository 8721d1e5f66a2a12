//! # Inventory Item Repository
//!
//! Database operations for the aggregate stock record (one per product).
//!
//! The counter mutations (`adjust_quantity`, `reserve`, `release`) are
//! transaction-scoped and guarded: the invariant `0 <= reserved <=
//! quantity` travels in the WHERE clause, so a concurrent writer that
//! would break it simply affects zero rows.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use depot_core::InventoryItem;

/// Repository for aggregate inventory records.
#[derive(Debug, Clone)]
pub struct InventoryItemRepository {
    pool: SqlitePool,
}

impl InventoryItemRepository {
    /// Creates a new InventoryItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryItemRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an item by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Gets an item by its product identifier.
    pub async fn get_by_product_id(&self, product_id: &str) -> DbResult<Option<InventoryItem>> {
        let item =
            sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE product_id = ?1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(item)
    }

    /// Gets an item by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE sku = ?1")
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists all items, ordered by product name.
    pub async fn get_all(&self) -> DbResult<Vec<InventoryItem>> {
        let items =
            sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items ORDER BY product_name")
                .fetch_all(&self.pool)
                .await?;

        Ok(items)
    }

    /// Lists items whose available quantity has fallen to or below their
    /// low-stock threshold.
    ///
    /// `available_quantity` is derived, so the comparison is computed in
    /// the query rather than read from a stored column.
    pub async fn get_low_stock(&self) -> DbResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT * FROM inventory_items
            WHERE quantity - reserved_quantity <= low_stock_threshold
            ORDER BY product_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // =========================================================================
    // Writes (standalone)
    // =========================================================================

    /// Inserts a new item. The UNIQUE indexes on `product_id` and `sku`
    /// surface duplicates as [`DbError::UniqueViolation`].
    pub async fn insert(&self, item: &InventoryItem) -> DbResult<()> {
        debug!(product_id = %item.product_id, sku = %item.sku, "Inserting inventory item");

        sqlx::query(
            r#"
            INSERT INTO inventory_items (
                id, product_id, sku, product_name,
                quantity, reserved_quantity, low_stock_threshold,
                last_restock_date, created_date, last_modified_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&item.product_id)
        .bind(&item.sku)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.reserved_quantity)
        .bind(item.low_stock_threshold)
        .bind(item.last_restock_date)
        .bind(item.created_date)
        .bind(item.last_modified_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates the mutable detail fields (name, sku, threshold). The
    /// counters are untouchable from here; they only move through the
    /// guarded transaction-scoped functions below.
    pub async fn update_details(
        &self,
        id: &str,
        product_name: &str,
        sku: &str,
        low_stock_threshold: i64,
    ) -> DbResult<()> {
        debug!(id = %id, "Updating inventory item details");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE inventory_items SET
                product_name = ?2,
                sku = ?3,
                low_stock_threshold = ?4,
                last_modified_date = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(product_name)
        .bind(sku)
        .bind(low_stock_threshold)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InventoryItem", id));
        }

        Ok(())
    }

    // =========================================================================
    // Transaction-scoped counter mutations
    // =========================================================================

    /// Re-reads an item inside an open transaction, for precise error
    /// reporting after a guard rejection.
    pub async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(item)
    }

    /// Adjusts the aggregate quantity by `delta` (positive or negative).
    ///
    /// Guard: the new quantity may not drop below `reserved_quantity` -
    /// stock can never fall under what is already promised. Returns
    /// `false` when the guard rejects the change.
    pub async fn adjust_quantity(
        conn: &mut SqliteConnection,
        id: &str,
        delta: i64,
    ) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE inventory_items SET
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
            if Self::fetch(conn, id).await?.is_none() {
                return Err(DbError::not_found("InventoryItem", id));
            }
            return Ok(false);
        }

        Ok(true)
    }

    /// Increments `reserved_quantity`.
    ///
    /// Guard: available quantity must cover the request. Returns `false`
    /// when it doesn't.
    pub async fn reserve(conn: &mut SqliteConnection, id: &str, quantity: i64) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE inventory_items SET
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
            if Self::fetch(conn, id).await?.is_none() {
                return Err(DbError::not_found("InventoryItem", id));
            }
            return Ok(false);
        }

        Ok(true)
    }

    /// Decrements `reserved_quantity`. The caller has already clamped the
    /// amount to the outstanding reservation; the guard only protects
    /// against a racing release.
    pub async fn release(conn: &mut SqliteConnection, id: &str, quantity: i64) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE inventory_items SET
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
            if Self::fetch(conn, id).await?.is_none() {
                return Err(DbError::not_found("InventoryItem", id));
            }
            return Ok(false);
        }

        Ok(true)
    }

    /// Stamps `last_restock_date`, called alongside a positive quantity
    /// adjustment when stock physically arrives.
    pub async fn touch_restock_date(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query("UPDATE inventory_items SET last_restock_date = ?2 WHERE id = ?1")
            .bind(id)
            .bind(now)
            .execute(conn)
            .await?;

        Ok(())
    }
}
