use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::domains::quote::models::{Quote, QuoteCreate, QuoteStatus};

const QUOTE_COLUMNS: &str = "id, user_id, currency, crypto, trade_type, rate, input_kind, quantity, \
     gross_amount, fee, fee_rate, net_amount, status, order_id, created_at, expires_at";

pub struct QuoteRepository {
    pool: PgPool,
}

impl QuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 견적 생성 (status = ACTIVE)
    /// Create quote
    pub async fn create(&self, quote_create: &QuoteCreate) -> Result<Quote> {
        let sql = format!(
            r#"
            INSERT INTO quotes (
                id, user_id, currency, crypto, trade_type, rate, input_kind, quantity,
                gross_amount, fee, fee_rate, net_amount, status, created_at, expires_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'ACTIVE', $13, $14, $13)
            RETURNING {}
            "#,
            QUOTE_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(quote_create.user_id as i64)
            .bind(quote_create.currency.as_str())
            .bind(quote_create.crypto.as_str())
            .bind(quote_create.trade_type.as_str())
            .bind(quote_create.rate)
            .bind(quote_create.input_kind.as_str())
            .bind(quote_create.quantity)
            .bind(quote_create.gross_amount)
            .bind(quote_create.fee)
            .bind(quote_create.fee_rate)
            .bind(quote_create.net_amount)
            .bind(quote_create.created_at)
            .bind(quote_create.expires_at)
            .fetch_one(&self.pool)
            .await
            .context("Failed to create quote")?;

        row_to_quote(&row)
    }

    /// 견적 ID로 조회
    /// Get quote by ID
    pub async fn get_by_id(&self, quote_id: Uuid) -> Result<Option<Quote>> {
        let sql = format!("SELECT {} FROM quotes WHERE id = $1", QUOTE_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(quote_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch quote by id")?;

        row.as_ref().map(row_to_quote).transpose()
    }

    /// 목록에 보여줄 견적 조회 (최신순)
    /// List quotes visible to the user
    ///
    /// - ACTIVE 이면서 아직 만료되지 않은 견적
    /// - EXPIRED / ACCEPTED 중 `retain_since` 이후 생성된 견적
    pub async fn list_visible(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
        retain_since: DateTime<Utc>,
    ) -> Result<Vec<Quote>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM quotes
            WHERE user_id = $1
              AND (
                    (status = 'ACTIVE' AND expires_at > $2)
                 OR (status IN ('EXPIRED', 'ACCEPTED') AND created_at >= $3)
              )
            ORDER BY created_at DESC
            "#,
            QUOTE_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(user_id as i64)
            .bind(now)
            .bind(retain_since)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list quotes")?;

        rows.iter().map(row_to_quote).collect()
    }

    /// 만료 시각이 지난 ACTIVE 견적을 EXPIRED 로 변경
    /// Flip due ACTIVE quotes to EXPIRED in one conditional UPDATE
    ///
    /// `user_id` 가 None 이면 전체 사용자 대상
    pub async fn expire_due(&self, user_id: Option<u64>, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE quotes
            SET status = 'EXPIRED', updated_at = $1
            WHERE status = 'ACTIVE'
              AND expires_at <= $1
              AND ($2::BIGINT IS NULL OR user_id = $2)
            "#,
        )
        .bind(now)
        .bind(user_id.map(|id| id as i64))
        .execute(&self.pool)
        .await
        .context("Failed to expire quotes")?;

        Ok(result.rows_affected())
    }

    /// 사용자의 견적 중 주어진 상태인 것 삭제
    /// Delete the user's quotes in the given statuses
    pub async fn delete_by_status(&self, user_id: u64, statuses: &[QuoteStatus]) -> Result<u64> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();

        let result = sqlx::query(
            r#"
            DELETE FROM quotes
            WHERE user_id = $1 AND status = ANY($2)
            "#,
        )
        .bind(user_id as i64)
        .bind(statuses)
        .execute(&self.pool)
        .await
        .context("Failed to delete quotes")?;

        Ok(result.rows_affected())
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 트랜잭션 안에서 사용 (Transaction-scoped)
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// 조건부 수락: ACTIVE 이고 아직 만료되지 않은 경우에만 ACCEPTED 로 변경
    /// Conditional ACTIVE → ACCEPTED transition; returns affected rows (0 or 1)
    pub async fn mark_accepted(
        conn: &mut PgConnection,
        quote_id: Uuid,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE quotes
            SET status = 'ACCEPTED', updated_at = $3
            WHERE id = $1
              AND user_id = $2
              AND status = 'ACTIVE'
              AND expires_at > $3
            "#,
        )
        .bind(quote_id)
        .bind(user_id as i64)
        .bind(now)
        .execute(&mut *conn)
        .await
        .context("Failed to mark quote accepted")?;

        Ok(result.rows_affected())
    }

    /// 수락된 견적에 주문 ID 연결
    /// Link the created order to its quote
    pub async fn link_order(
        conn: &mut PgConnection,
        quote_id: Uuid,
        order_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE quotes
            SET order_id = $2, updated_at = $3
            WHERE id = $1 AND status = 'ACCEPTED' AND order_id IS NULL
            "#,
        )
        .bind(quote_id)
        .bind(order_id)
        .bind(now)
        .execute(&mut *conn)
        .await
        .context("Failed to link order to quote")?;

        anyhow::ensure!(
            result.rows_affected() == 1,
            "Quote {} could not be linked to order {}",
            quote_id,
            order_id
        );
        Ok(())
    }
}

fn row_to_quote(row: &PgRow) -> Result<Quote> {
    let currency: String = row.get("currency");
    let crypto: String = row.get("crypto");
    let trade_type: String = row.get("trade_type");
    let input_kind: String = row.get("input_kind");
    let status: String = row.get("status");

    Ok(Quote {
        id: row.get("id"),
        user_id: row.get::<i64, _>("user_id") as u64,
        currency: currency.parse()?,
        crypto: crypto.parse()?,
        trade_type: trade_type.parse()?,
        rate: row.get("rate"),
        input_kind: input_kind.parse()?,
        quantity: row.get("quantity"),
        gross_amount: row.get("gross_amount"),
        fee: row.get("fee"),
        fee_rate: row.get("fee_rate"),
        net_amount: row.get("net_amount"),
        status: status.parse()?,
        created_at: row.get("created_at"),
        expires_at: row.get("expires_at"),
        order_id: row.get("order_id"),
    })
}
