//! # Transaction Ledger Repository
//!
//! The append-only movement ledger. This repository exposes exactly one
//! write - `append` - and read queries. No update or delete exists, even
//! internally: rows are immutable once committed and the table is the
//! sole audit source of truth for stock history.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use depot_core::InventoryTransaction;

/// Repository for the append-only inventory ledger.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Appends a ledger row inside an open transaction, so the row
    /// commits together with the counter updates it records.
    pub async fn append(conn: &mut SqliteConnection, row: &InventoryTransaction) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory_transactions (
                id, inventory_item_id, transaction_type, quantity,
                reference_number, notes, created_by, created_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&row.id)
        .bind(&row.inventory_item_id)
        .bind(row.transaction_type)
        .bind(row.quantity)
        .bind(&row.reference_number)
        .bind(&row.notes)
        .bind(&row.created_by)
        .bind(row.created_date)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Lists a product's ledger history, optionally bounded by date,
    /// oldest first.
    pub async fn get_by_inventory_item(
        &self,
        inventory_item_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<InventoryTransaction>> {
        let rows = sqlx::query_as::<_, InventoryTransaction>(
            r#"
            SELECT * FROM inventory_transactions
            WHERE inventory_item_id = ?1
              AND (?2 IS NULL OR created_date >= ?2)
              AND (?3 IS NULL OR created_date <= ?3)
            ORDER BY created_date, id
            "#,
        )
        .bind(inventory_item_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Lists every ledger row carrying a reference number (a count number,
    /// a transfer number, or an ad hoc movement reference).
    pub async fn get_by_reference(&self, reference_number: &str) -> DbResult<Vec<InventoryTransaction>> {
        let rows = sqlx::query_as::<_, InventoryTransaction>(
            r#"
            SELECT * FROM inventory_transactions
            WHERE reference_number = ?1
            ORDER BY created_date, id
            "#,
        )
        .bind(reference_number)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
