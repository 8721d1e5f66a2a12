//! # Warehouse Repository
//!
//! Database operations for stock locations.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use depot_core::Warehouse;

/// Repository for warehouse records.
#[derive(Debug, Clone)]
pub struct WarehouseRepository {
    pool: SqlitePool,
}

impl WarehouseRepository {
    /// Creates a new WarehouseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WarehouseRepository { pool }
    }

    /// Gets a warehouse by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Warehouse>> {
        let warehouse = sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(warehouse)
    }

    /// Gets a warehouse by its unique code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Warehouse>> {
        let warehouse = sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses WHERE code = ?1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(warehouse)
    }

    /// Lists all warehouses, ordered by code.
    pub async fn get_all(&self) -> DbResult<Vec<Warehouse>> {
        let warehouses = sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses ORDER BY code")
            .fetch_all(&self.pool)
            .await?;

        Ok(warehouses)
    }

    /// Inserts a new warehouse. Duplicate codes surface as
    /// [`DbError::UniqueViolation`].
    pub async fn insert(&self, warehouse: &Warehouse) -> DbResult<()> {
        debug!(code = %warehouse.code, "Inserting warehouse");

        sqlx::query(
            r#"
            INSERT INTO warehouses (
                id, name, code, address, city, contact_person,
                is_active, created_date, last_modified_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&warehouse.id)
        .bind(&warehouse.name)
        .bind(&warehouse.code)
        .bind(&warehouse.address)
        .bind(&warehouse.city)
        .bind(&warehouse.contact_person)
        .bind(warehouse.is_active)
        .bind(warehouse.created_date)
        .bind(warehouse.last_modified_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing warehouse.
    pub async fn update(&self, warehouse: &Warehouse) -> DbResult<()> {
        debug!(id = %warehouse.id, "Updating warehouse");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE warehouses SET
                name = ?2,
                code = ?3,
                address = ?4,
                city = ?5,
                contact_person = ?6,
                is_active = ?7,
                last_modified_date = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&warehouse.id)
        .bind(&warehouse.name)
        .bind(&warehouse.code)
        .bind(&warehouse.address)
        .bind(&warehouse.city)
        .bind(&warehouse.contact_person)
        .bind(warehouse.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Warehouse", &warehouse.id));
        }

        Ok(())
    }

    /// Deletes a warehouse. The service layer refuses this while the
    /// warehouse still holds stock; the foreign keys back that up.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting warehouse");

        let result = sqlx::query("DELETE FROM warehouses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Warehouse", id));
        }

        Ok(())
    }
}
