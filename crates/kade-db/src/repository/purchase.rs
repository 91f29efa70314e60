//! # Purchase Repository
//!
//! Stock purchases from suppliers.
//!
//! ```text
//!   insert(purchase) ──► BEGIN
//!                         ├── INSERT purchases (lines as JSON)
//!                         ├── UPDATE products SET stock = stock + qty   (per line)
//!                         └── COMMIT   (any unknown product rolls it all back)
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kade_core::{Purchase, PurchaseItem};

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRecord {
    id: String,
    date: DateTime<Utc>,
    supplier: String,
    items: String,
    total_cost_cents: i64,
    note: Option<String>,
}

impl TryFrom<PurchaseRecord> for Purchase {
    type Error = DbError;

    fn try_from(r: PurchaseRecord) -> Result<Self, Self::Error> {
        let items: Vec<PurchaseItem> = serde_json::from_str(&r.items)?;
        Ok(Purchase {
            id: r.id,
            date: r.date,
            supplier: r.supplier,
            items,
            total_cost_cents: r.total_cost_cents,
            note: r.note,
        })
    }
}

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Every purchase, newest first.
    pub async fn list(&self) -> DbResult<Vec<Purchase>> {
        let records = sqlx::query_as::<_, PurchaseRecord>(
            r#"
            SELECT id, date, supplier, items, total_cost_cents, note
            FROM purchases
            ORDER BY date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(Purchase::try_from).collect()
    }

    /// Records a purchase and adds its quantities to product stock.
    ///
    /// An empty id is replaced with a fresh UUID. Returns the stored
    /// purchase.
    ///
    /// ## Errors
    /// [`DbError::NotFound`] when a line names an unknown product; nothing
    /// is written in that case.
    pub async fn insert(&self, purchase: &Purchase) -> DbResult<Purchase> {
        let mut purchase = purchase.clone();
        if purchase.id.trim().is_empty() {
            purchase.id = Uuid::new_v4().to_string();
        }
        let items_json = serde_json::to_string(&purchase.items)?;

        debug!(id = %purchase.id, lines = purchase.items.len(), "Recording purchase");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchases (id, date, supplier, items, total_cost_cents, note)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&purchase.id)
        .bind(purchase.date)
        .bind(&purchase.supplier)
        .bind(&items_json)
        .bind(purchase.total_cost_cents)
        .bind(&purchase.note)
        .execute(&mut *tx)
        .await?;

        let now = Utc::now();
        for item in &purchase.items {
            let result = sqlx::query(
                "UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1",
            )
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Product", &item.product_id));
            }
        }

        tx.commit().await?;

        info!(
            id = %purchase.id,
            supplier = %purchase.supplier,
            total = %purchase.total_cost(),
            "Purchase recorded"
        );
        Ok(purchase)
    }
}
