//! # Sale Repository
//!
//! Database operations for sales and their line snapshots.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CHECKOUT                                                           │
//! │     └── save() → sales row + sale_items rows, one transaction          │
//! │                                                                         │
//! │  2. (CREDIT ONLY) SETTLE                                               │
//! │     └── update(original_id, settled) → status Paid                     │
//! │         id may change ("settled-…"); sale_items follow by CASCADE      │
//! │                                                                         │
//! │  Sales are never deleted.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use kade_core::{CartItem, PaymentMethod, PaymentStatus, Sale};

// =============================================================================
// Row Records
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SaleRecord {
    id: String,
    date: DateTime<Utc>,
    customer_name: String,
    customer_contact: Option<String>,
    subtotal_cents: i64,
    discount_cents: i64,
    tax_cents: i64,
    tax_rate_bps: u32,
    total_cents: i64,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
}

impl SaleRecord {
    fn into_sale(self, items: Vec<CartItem>) -> Sale {
        Sale {
            id: self.id,
            date: self.date,
            customer_name: self.customer_name,
            customer_contact: self.customer_contact,
            items,
            subtotal_cents: self.subtotal_cents,
            discount_cents: self.discount_cents,
            tax_cents: self.tax_cents,
            tax_rate_bps: self.tax_rate_bps,
            total_cents: self.total_cents,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SaleItemRecord {
    sale_id: String,
    item_id: String,
    name: String,
    category: String,
    price_cents: i64,
    cost_cents: i64,
    stock: i64,
    min_stock_level: i64,
    quantity: i64,
}

impl From<SaleItemRecord> for CartItem {
    fn from(r: SaleItemRecord) -> Self {
        CartItem {
            id: r.item_id,
            name: r.name,
            category: r.category,
            price_cents: r.price_cents,
            cost_cents: r.cost_cents,
            stock: r.stock,
            min_stock_level: r.min_stock_level,
            quantity: r.quantity,
        }
    }
}

const SALE_COLUMNS: &str = r#"
    id, date, customer_name, customer_contact,
    subtotal_cents, discount_cents, tax_cents, tax_rate_bps, total_cents,
    payment_method, payment_status
"#;

const ITEM_COLUMNS: &str = r#"
    sale_id, item_id, name, category, price_cents, cost_cents,
    stock, min_stock_level, quantity
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Every sale with its lines, newest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sales_sql = format!(
            "SELECT {} FROM sales ORDER BY date DESC, id DESC",
            SALE_COLUMNS
        );
        let records = sqlx::query_as::<_, SaleRecord>(&sales_sql)
            .fetch_all(&self.pool)
            .await?;

        let items_sql = format!(
            "SELECT {} FROM sale_items ORDER BY sale_id, position",
            ITEM_COLUMNS
        );
        let item_records = sqlx::query_as::<_, SaleItemRecord>(&items_sql)
            .fetch_all(&self.pool)
            .await?;

        let mut items_by_sale: HashMap<String, Vec<CartItem>> = HashMap::new();
        for record in item_records {
            items_by_sale
                .entry(record.sale_id.clone())
                .or_default()
                .push(record.into());
        }

        let sales: Vec<Sale> = records
            .into_iter()
            .map(|r| {
                let items = items_by_sale.remove(&r.id).unwrap_or_default();
                r.into_sale(items)
            })
            .collect();

        debug!(count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {} FROM sales WHERE id = ?1", SALE_COLUMNS);
        let record = sqlx::query_as::<_, SaleRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        let items_sql = format!(
            "SELECT {} FROM sale_items WHERE sale_id = ?1 ORDER BY position",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, SaleItemRecord>(&items_sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(CartItem::from)
            .collect();

        Ok(Some(record.into_sale(items)))
    }

    /// Persists a new sale and its lines atomically.
    ///
    /// ## Errors
    /// [`DbError::UniqueViolation`] when the id is already taken.
    pub async fn save(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, lines = sale.items.len(), "Saving sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, date, customer_name, customer_contact,
                subtotal_cents, discount_cents, tax_cents, tax_rate_bps, total_cents,
                payment_method, payment_status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.date)
        .bind(&sale.customer_name)
        .bind(&sale.customer_contact)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.tax_cents)
        .bind(sale.tax_rate_bps)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(sale.payment_status)
        .execute(&mut *tx)
        .await?;

        for (position, item) in sale.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    sale_id, position, item_id, name, category,
                    price_cents, cost_cents, stock, min_stock_level, quantity
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&sale.id)
            .bind(position as i64)
            .bind(&item.id)
            .bind(&item.name)
            .bind(&item.category)
            .bind(item.price_cents)
            .bind(item.cost_cents)
            .bind(item.stock)
            .bind(item.min_stock_level)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            id = %sale.id,
            total = %sale.total(),
            method = %sale.payment_method,
            "Sale recorded"
        );
        Ok(())
    }

    /// Replaces a Pending sale's header with `sale`, keyed by `original_id`.
    ///
    /// The id itself may change (settlement tagging); line rows follow the
    /// rename through the foreign key. Lines are never rewritten.
    ///
    /// ## Errors
    /// [`DbError::NotFound`] when no Pending sale has `original_id`, so a
    /// sale can only be settled once.
    pub async fn update(&self, original_id: &str, sale: &Sale) -> DbResult<()> {
        debug!(original_id = %original_id, id = %sale.id, "Updating sale");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                id = ?2,
                date = ?3,
                customer_name = ?4,
                customer_contact = ?5,
                subtotal_cents = ?6,
                discount_cents = ?7,
                tax_cents = ?8,
                tax_rate_bps = ?9,
                total_cents = ?10,
                payment_method = ?11,
                payment_status = ?12
            WHERE id = ?1 AND payment_status = 'pending'
            "#,
        )
        .bind(original_id)
        .bind(&sale.id)
        .bind(sale.date)
        .bind(&sale.customer_name)
        .bind(&sale.customer_contact)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.tax_cents)
        .bind(sale.tax_rate_bps)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(sale.payment_status)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Pending sale", original_id));
        }

        tx.commit().await?;

        info!(
            original_id = %original_id,
            id = %sale.id,
            status = %sale.payment_status,
            "Sale updated"
        );
        Ok(())
    }

    /// Counts sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;
    use kade_core::ledger::{settle, SettlementMode};
    use kade_core::Money;

    fn sale(id: &str, method: PaymentMethod, second: u32) -> Sale {
        let items = vec![
            CartItem::manual(
                "manual-1".to_string(),
                "Lamination".to_string(),
                Money::from_major(150),
                3,
            ),
            CartItem {
                id: "p1".to_string(),
                name: "Photocopy".to_string(),
                category: "Print".to_string(),
                price_cents: 1000,
                cost_cents: 400,
                stock: 500,
                min_stock_level: 50,
                quantity: 5,
            },
        ];

        Sale {
            id: id.to_string(),
            date: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, second).unwrap(),
            customer_name: "Jane".to_string(),
            customer_contact: Some("0711111111".to_string()),
            items,
            subtotal_cents: 50000,
            discount_cents: 0,
            tax_cents: 0,
            tax_rate_bps: 0,
            total_cents: 50000,
            payment_method: method,
            payment_status: method.initial_status(),
        }
    }

    #[tokio::test]
    async fn test_save_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let original = sale("1717000000001", PaymentMethod::Card, 1);

        db.sales().save(&original).await.unwrap();

        let fetched = db.sales().get_by_id(&original.id).await.unwrap().unwrap();
        assert_eq!(fetched, original);
        assert_eq!(fetched.items[0].category, "Manual");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.sales().save(&sale("a", PaymentMethod::Cash, 1)).await.unwrap();
        db.sales().save(&sale("b", PaymentMethod::Credit, 3)).await.unwrap();
        db.sales().save(&sale("c", PaymentMethod::Online, 2)).await.unwrap();

        let sales = db.sales().list().await.unwrap();
        let ids: Vec<&str> = sales.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert!(sales.iter().all(|s| s.items.len() == 2));
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected_atomically() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let first = sale("dup", PaymentMethod::Cash, 1);
        db.sales().save(&first).await.unwrap();

        let result = db.sales().save(&sale("dup", PaymentMethod::Card, 2)).await;
        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));

        let stored = db.sales().get_by_id("dup").await.unwrap().unwrap();
        assert_eq!(stored.payment_method, PaymentMethod::Cash);
        assert_eq!(stored.items.len(), 2);
    }

    #[tokio::test]
    async fn test_settlement_renames_sale_and_lines() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pending = sale("1717000000009", PaymentMethod::Credit, 1);
        db.sales().save(&pending).await.unwrap();

        let settled = settle(&pending, SettlementMode::RecordAsCash).unwrap();
        db.sales().update(&pending.id, &settled).await.unwrap();

        assert!(db.sales().get_by_id(&pending.id).await.unwrap().is_none());
        let stored = db
            .sales()
            .get_by_id("settled-1717000000009")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert_eq!(stored.payment_method, PaymentMethod::Cash);
        assert_eq!(stored.items.len(), 2);
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_requires_pending() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let paid = sale("p", PaymentMethod::Cash, 1);
        db.sales().save(&paid).await.unwrap();

        let result = db.sales().update("p", &paid).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));

        let pending = sale("q", PaymentMethod::Credit, 2);
        db.sales().save(&pending).await.unwrap();
        let settled = settle(&pending, SettlementMode::StatusOnly).unwrap();
        db.sales().update("q", &settled).await.unwrap();
        assert!(matches!(
            db.sales().update("q", &settled).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
