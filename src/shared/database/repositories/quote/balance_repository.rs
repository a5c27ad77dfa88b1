use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use crate::domains::quote::models::{CryptoAsset, CryptoBalance, FiatBalance, FiatCurrency};

/// 법정화폐 / 암호화폐 잔고 저장소
/// Fiat and crypto balance repository
///
/// 잔고 증감(입금/출금/정산)은 이 서비스에서 하지 않으므로
/// 조회와 0 잔고 초기화만 제공합니다. `set_*` 은 관리/테스트용 시드입니다.
pub struct BalanceRepository {
    pool: PgPool,
}

impl BalanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 법정화폐 잔고 조회
    /// Get fiat balance by user and currency
    pub async fn get_fiat(&self, user_id: u64, currency: FiatCurrency) -> Result<Option<Decimal>> {
        let row = sqlx::query(
            r#"
            SELECT balance
            FROM fiat_balances
            WHERE user_id = $1 AND currency = $2
            "#,
        )
        .bind(user_id as i64)
        .bind(currency.as_str())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch fiat balance")?;

        Ok(row.map(|r| r.get("balance")))
    }

    /// 암호화폐 잔고 조회
    /// Get crypto balance by user and asset
    pub async fn get_crypto(&self, user_id: u64, asset: CryptoAsset) -> Result<Option<Decimal>> {
        let row = sqlx::query(
            r#"
            SELECT balance
            FROM crypto_balances
            WHERE user_id = $1 AND asset = $2
            "#,
        )
        .bind(user_id as i64)
        .bind(asset.as_str())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch crypto balance")?;

        Ok(row.map(|r| r.get("balance")))
    }

    /// 지원하는 모든 통화에 대해 0 잔고 행 생성 (이미 있으면 무시)
    /// Create zero rows for every supported code; existing rows are left untouched
    pub async fn ensure_defaults(&self, user_id: u64, now: DateTime<Utc>) -> Result<()> {
        let currencies: Vec<String> = FiatCurrency::ALL
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
        let assets: Vec<String> = CryptoAsset::ALL
            .iter()
            .map(|a| a.as_str().to_string())
            .collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            INSERT INTO fiat_balances (user_id, currency, balance, created_at, updated_at)
            SELECT $1, code, 0, $3, $3 FROM UNNEST($2::TEXT[]) AS code
            ON CONFLICT (user_id, currency) DO NOTHING
            "#,
        )
        .bind(user_id as i64)
        .bind(currencies)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("Failed to initialize fiat balances")?;

        sqlx::query(
            r#"
            INSERT INTO crypto_balances (user_id, asset, balance, created_at, updated_at)
            SELECT $1, code, 0, $3, $3 FROM UNNEST($2::TEXT[]) AS code
            ON CONFLICT (user_id, asset) DO NOTHING
            "#,
        )
        .bind(user_id as i64)
        .bind(assets)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("Failed to initialize crypto balances")?;

        tx.commit().await.context("Failed to commit balance initialization")?;
        Ok(())
    }

    /// 사용자 법정화폐 잔고 전체 조회
    pub async fn list_fiat(&self, user_id: u64) -> Result<Vec<FiatBalance>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, currency, balance, created_at, updated_at
            FROM fiat_balances
            WHERE user_id = $1
            ORDER BY currency ASC
            "#,
        )
        .bind(user_id as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch fiat balances")?;

        rows.into_iter()
            .map(|row| -> Result<FiatBalance> {
                let currency: String = row.get("currency");
                Ok(FiatBalance {
                    user_id: row.get::<i64, _>("user_id") as u64,
                    currency: currency.parse()?,
                    balance: row.get("balance"),
                    created_at: row.get("created_at"),
                    updated_at: row.get("updated_at"),
                })
            })
            .collect()
    }

    /// 사용자 암호화폐 잔고 전체 조회
    pub async fn list_crypto(&self, user_id: u64) -> Result<Vec<CryptoBalance>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, asset, balance, created_at, updated_at
            FROM crypto_balances
            WHERE user_id = $1
            ORDER BY asset ASC
            "#,
        )
        .bind(user_id as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch crypto balances")?;

        rows.into_iter()
            .map(|row| -> Result<CryptoBalance> {
                let asset: String = row.get("asset");
                Ok(CryptoBalance {
                    user_id: row.get::<i64, _>("user_id") as u64,
                    asset: asset.parse()?,
                    balance: row.get("balance"),
                    created_at: row.get("created_at"),
                    updated_at: row.get("updated_at"),
                })
            })
            .collect()
    }

    /// 법정화폐 잔고 설정 (없으면 생성)
    pub async fn set_fiat(
        &self,
        user_id: u64,
        currency: FiatCurrency,
        balance: Decimal,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO fiat_balances (user_id, currency, balance, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (user_id, currency)
            DO UPDATE SET balance = $3, updated_at = $4
            "#,
        )
        .bind(user_id as i64)
        .bind(currency.as_str())
        .bind(balance)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to set fiat balance")?;

        Ok(())
    }

    /// 암호화폐 잔고 설정 (없으면 생성)
    pub async fn set_crypto(
        &self,
        user_id: u64,
        asset: CryptoAsset,
        balance: Decimal,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO crypto_balances (user_id, asset, balance, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (user_id, asset)
            DO UPDATE SET balance = $3, updated_at = $4
            "#,
        )
        .bind(user_id as i64)
        .bind(asset.as_str())
        .bind(balance)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to set crypto balance")?;

        Ok(())
    }
}
