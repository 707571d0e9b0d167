use async_trait::async_trait;
use chrono::{DateTime, Utc};
use explorer_core::error::{ExplorerError, Result};
use explorer_core::models::{StoredOverview, SummaryKey, TimePeriodOverview};
use sqlx::types::Json;
use sqlx::Row;
use std::sync::Arc;

use super::PostgresStore;
use crate::ports::OverviewStore;

/// Key columns, with absent components stored as 0
fn key_columns(key: &SummaryKey) -> (i32, i32, i32) {
    (
        key.year_value().unwrap_or(0),
        key.month_value().map(|m| m as i32).unwrap_or(0),
        key.day_value().map(|d| d as i32).unwrap_or(0),
    )
}

fn key_from_columns(product: String, year: i32, month: i32, day: i32) -> Result<SummaryKey> {
    let present = |v: i32| (v != 0).then_some(v);
    SummaryKey::new(
        product,
        present(year),
        present(month).map(|m| m as u32),
        present(day).map(|d| d as u32),
    )
}

fn persistence_error(action: &str, key: impl std::fmt::Display, e: sqlx::Error) -> ExplorerError {
    ExplorerError::Persistence(format!("Failed to {} {}: {}", action, key, e))
}

#[async_trait]
impl OverviewStore for PostgresStore {
    async fn load(&self, key: &SummaryKey) -> Result<Option<StoredOverview>> {
        let (year, month, day) = key_columns(key);

        let row = sqlx::query(
            r#"
            SELECT overview, generated_at, stale
            FROM time_overview
            WHERE product_name = $1 AND year = $2 AND month = $3 AND day = $4
            "#,
        )
        .bind(key.product_name())
        .bind(year)
        .bind(month)
        .bind(day)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| persistence_error("load overview", key, e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let overview: Json<TimePeriodOverview> = row
            .try_get("overview")
            .map_err(|e| ExplorerError::Serialization(format!("Corrupt overview {}: {}", key, e)))?;
        let generated_at: DateTime<Utc> =
            row.try_get("generated_at").map_err(|e| persistence_error("decode", key, e))?;
        let stale: bool = row.try_get("stale").map_err(|e| persistence_error("decode", key, e))?;

        Ok(Some(StoredOverview { overview: Arc::new(overview.0), generated_at, stale }))
    }

    async fn store(&self, key: &SummaryKey, stored: StoredOverview) -> Result<()> {
        let (year, month, day) = key_columns(key);

        // A single upsert is atomic: readers see the old row or the new one.
        sqlx::query(
            r#"
            INSERT INTO time_overview
                (product_name, year, month, day, dataset_count, overview, generated_at, stale)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (product_name, year, month, day) DO UPDATE
            SET dataset_count = EXCLUDED.dataset_count,
                overview = EXCLUDED.overview,
                generated_at = EXCLUDED.generated_at,
                stale = EXCLUDED.stale
            "#,
        )
        .bind(key.product_name())
        .bind(year)
        .bind(month)
        .bind(day)
        .bind(stored.overview.dataset_count as i64)
        .bind(Json(stored.overview.as_ref()))
        .bind(stored.generated_at)
        .bind(stored.stale)
        .execute(&self.pool)
        .await
        .map_err(|e| persistence_error("store overview", key, e))?;

        Ok(())
    }

    async fn mark_stale(&self, product: &str) -> Result<usize> {
        let result = sqlx::query(
            "UPDATE time_overview SET stale = TRUE WHERE product_name = $1 AND NOT stale",
        )
        .bind(product)
        .execute(&self.pool)
        .await
        .map_err(|e| persistence_error("mark stale", product, e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn list_keys(&self, product: &str) -> Result<Vec<SummaryKey>> {
        let rows = sqlx::query(
            r#"
            SELECT product_name, year, month, day
            FROM time_overview
            WHERE product_name = $1
            ORDER BY year, month, day
            "#,
        )
        .bind(product)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| persistence_error("list overviews of", product, e))?;

        rows.into_iter()
            .map(|row| {
                key_from_columns(
                    row.get("product_name"),
                    row.get("year"),
                    row.get("month"),
                    row.get("day"),
                )
            })
            .collect()
    }

    async fn delete_product(&self, product: &str) -> Result<usize> {
        let result = sqlx::query("DELETE FROM time_overview WHERE product_name = $1")
            .bind(product)
            .execute(&self.pool)
            .await
            .map_err(|e| persistence_error("delete overviews of", product, e))?;

        Ok(result.rows_affected() as usize)
    }
}
