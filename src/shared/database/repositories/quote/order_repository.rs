use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::domains::quote::models::{Order, OrderCreate};

const ORDER_COLUMNS: &str = "id, reference, user_id, quote_id, order_type, status, asset, currency, \
     quantity, price, fee, total_amount, created_at, updated_at";

pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 주문 생성 (트랜잭션 안에서 사용, status = PENDING)
    /// Create order inside the caller's transaction
    pub async fn insert(
        conn: &mut PgConnection,
        order_create: &OrderCreate,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        let sql = format!(
            r#"
            INSERT INTO orders (
                id, reference, user_id, quote_id, order_type, status, asset, currency,
                quantity, price, fee, total_amount, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, 'PENDING', $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(&order_create.reference)
            .bind(order_create.user_id as i64)
            .bind(order_create.quote_id)
            .bind(order_create.order_type.as_str())
            .bind(order_create.asset.as_str())
            .bind(order_create.currency.as_str())
            .bind(order_create.quantity)
            .bind(order_create.price)
            .bind(order_create.fee)
            .bind(order_create.total_amount)
            .bind(now)
            .fetch_one(&mut *conn)
            .await
            .context("Failed to create order")?;

        row_to_order(&row)
    }

    /// 주문 ID로 조회
    /// Get order by ID
    pub async fn get_by_id(&self, order_id: Uuid) -> Result<Option<Order>> {
        let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch order by id")?;

        row.as_ref().map(row_to_order).transpose()
    }

    /// 사용자 ID로 모든 주문 조회 (최신순)
    /// Get all orders by user ID
    pub async fn get_all_by_user(
        &self,
        user_id: u64,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Order>> {
        let limit = limit.unwrap_or(100);
        let offset = offset.unwrap_or(0);

        let sql = format!(
            r#"
            SELECT {}
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            ORDER_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(user_id as i64)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch orders by user")?;

        rows.iter().map(row_to_order).collect()
    }
}

fn row_to_order(row: &PgRow) -> Result<Order> {
    let order_type: String = row.get("order_type");
    let status: String = row.get("status");
    let asset: String = row.get("asset");
    let currency: String = row.get("currency");

    Ok(Order {
        id: row.get("id"),
        reference: row.get("reference"),
        user_id: row.get::<i64, _>("user_id") as u64,
        quote_id: row.get("quote_id"),
        order_type: order_type.parse()?,
        status: status.parse()?,
        asset: asset.parse()?,
        currency: currency.parse()?,
        quantity: row.get("quantity"),
        price: row.get("price"),
        fee: row.get("fee"),
        total_amount: row.get("total_amount"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
