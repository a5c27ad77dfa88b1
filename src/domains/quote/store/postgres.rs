use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use super::QuoteStore;
use crate::domains::quote::models::{
    CryptoAsset, CryptoBalance, FiatBalance, FiatCurrency, Order, OrderCreate, Quote,
    QuoteCreate, QuoteStatus,
};
use crate::shared::database::{BalanceRepository, Database, OrderRepository, QuoteRepository};

/// PostgreSQL 견적 저장소
/// PostgreSQL-backed quote store
#[derive(Clone)]
pub struct PgQuoteStore {
    db: Database,
}

impl PgQuoteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn quotes(&self) -> QuoteRepository {
        QuoteRepository::new(self.db.pool().clone())
    }

    fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.db.pool().clone())
    }

    fn balances(&self) -> BalanceRepository {
        BalanceRepository::new(self.db.pool().clone())
    }
}

#[async_trait]
impl QuoteStore for PgQuoteStore {
    async fn insert_quote(&self, quote: QuoteCreate) -> Result<Quote> {
        self.quotes().create(&quote).await
    }

    async fn get_quote(&self, quote_id: Uuid) -> Result<Option<Quote>> {
        self.quotes().get_by_id(quote_id).await
    }

    async fn list_quotes(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
        retain_since: DateTime<Utc>,
    ) -> Result<Vec<Quote>> {
        self.quotes().list_visible(user_id, now, retain_since).await
    }

    async fn expire_quotes(&self, user_id: Option<u64>, now: DateTime<Utc>) -> Result<u64> {
        self.quotes().expire_due(user_id, now).await
    }

    async fn delete_quotes(&self, user_id: u64, statuses: &[QuoteStatus]) -> Result<u64> {
        self.quotes().delete_by_status(user_id, statuses).await
    }

    async fn fiat_balance(&self, user_id: u64, currency: FiatCurrency) -> Result<Option<Decimal>> {
        self.balances().get_fiat(user_id, currency).await
    }

    async fn crypto_balance(&self, user_id: u64, asset: CryptoAsset) -> Result<Option<Decimal>> {
        self.balances().get_crypto(user_id, asset).await
    }

    async fn list_balances(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<(Vec<FiatBalance>, Vec<CryptoBalance>)> {
        let balances = self.balances();
        balances.ensure_defaults(user_id, now).await?;

        let fiat = balances.list_fiat(user_id).await?;
        let crypto = balances.list_crypto(user_id).await?;
        Ok((fiat, crypto))
    }

    async fn accept_quote(
        &self,
        quote_id: Uuid,
        user_id: u64,
        now: DateTime<Utc>,
        order: OrderCreate,
    ) -> Result<Option<Order>> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let updated = QuoteRepository::mark_accepted(&mut *tx, quote_id, user_id, now).await?;
        if updated != 1 {
            // 이미 수락/만료됨: 아무것도 쓰지 않고 롤백
            tx.rollback().await.context("Failed to rollback transaction")?;
            debug!(%quote_id, "Conditional accept matched no rows");
            return Ok(None);
        }

        // 여기서 에러가 나면 tx 가 drop 되면서 롤백됨
        let order = OrderRepository::insert(&mut *tx, &order, now).await?;
        QuoteRepository::link_order(&mut *tx, quote_id, order.id, now).await?;

        tx.commit().await.context("Failed to commit quote acceptance")?;
        Ok(Some(order))
    }

    async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>> {
        self.orders().get_by_id(order_id).await
    }

    async fn list_orders(&self, user_id: u64, limit: i64, offset: i64) -> Result<Vec<Order>> {
        self.orders()
            .get_all_by_user(user_id, Some(limit), Some(offset))
            .await
    }
}
