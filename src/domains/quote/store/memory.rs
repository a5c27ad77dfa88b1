use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::QuoteStore;
use crate::domains::quote::models::{
    CryptoAsset, CryptoBalance, FiatBalance, FiatCurrency, Order, OrderCreate, Quote,
    QuoteCreate, QuoteStatus,
};

/// 장애 주입 지점 (테스트용)
/// Failure injection points inside `accept_quote`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// 주문 INSERT 단계에서 실패
    OrderInsert,
    /// 견적에 order_id 를 연결하는 단계에서 실패
    QuoteLink,
}

#[derive(Default)]
struct MemoryState {
    quotes: HashMap<Uuid, Quote>,
    orders: HashMap<Uuid, Order>,
    fiat: HashMap<(u64, FiatCurrency), FiatBalance>,
    crypto: HashMap<(u64, CryptoAsset), CryptoBalance>,
    failure: Option<FailurePoint>,
}

/// 인메모리 견적 저장소
/// In-memory quote store
///
/// 모든 연산은 하나의 Mutex 임계 구역 안에서 실행됩니다.
/// `accept_quote` 는 변경 사항을 먼저 준비한 뒤 마지막에 한 번에 반영하므로
/// 중간에 실패하면 아무것도 반영되지 않습니다 (PostgreSQL 트랜잭션과 같은 결과).
#[derive(Default)]
pub struct InMemoryQuoteStore {
    state: Mutex<MemoryState>,
}

impl InMemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 법정화폐 잔고 설정 (없으면 생성)
    pub fn set_fiat_balance(&self, user_id: u64, currency: FiatCurrency, balance: Decimal) {
        let now = Utc::now();
        let mut state = self.state.lock();
        state
            .fiat
            .entry((user_id, currency))
            .and_modify(|row| {
                row.balance = balance;
                row.updated_at = now;
            })
            .or_insert(FiatBalance {
                user_id,
                currency,
                balance,
                created_at: now,
                updated_at: now,
            });
    }

    /// 암호화폐 잔고 설정 (없으면 생성)
    pub fn set_crypto_balance(&self, user_id: u64, asset: CryptoAsset, balance: Decimal) {
        let now = Utc::now();
        let mut state = self.state.lock();
        state
            .crypto
            .entry((user_id, asset))
            .and_modify(|row| {
                row.balance = balance;
                row.updated_at = now;
            })
            .or_insert(CryptoBalance {
                user_id,
                asset,
                balance,
                created_at: now,
                updated_at: now,
            });
    }

    /// 다음 `accept_quote` 한 번을 지정한 단계에서 실패시킴
    pub fn inject_failure(&self, point: FailurePoint) {
        self.state.lock().failure = Some(point);
    }

    /// 저장된 주문 수 (테스트 검증용)
    pub fn order_count(&self) -> usize {
        self.state.lock().orders.len()
    }
}

#[async_trait]
impl QuoteStore for InMemoryQuoteStore {
    async fn insert_quote(&self, quote: QuoteCreate) -> Result<Quote> {
        let quote = Quote {
            id: Uuid::new_v4(),
            user_id: quote.user_id,
            currency: quote.currency,
            crypto: quote.crypto,
            trade_type: quote.trade_type,
            rate: quote.rate,
            input_kind: quote.input_kind,
            quantity: quote.quantity,
            gross_amount: quote.gross_amount,
            fee: quote.fee,
            fee_rate: quote.fee_rate,
            net_amount: quote.net_amount,
            status: QuoteStatus::Active,
            created_at: quote.created_at,
            expires_at: quote.expires_at,
            order_id: None,
        };

        self.state.lock().quotes.insert(quote.id, quote.clone());
        Ok(quote)
    }

    async fn get_quote(&self, quote_id: Uuid) -> Result<Option<Quote>> {
        Ok(self.state.lock().quotes.get(&quote_id).cloned())
    }

    async fn list_quotes(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
        retain_since: DateTime<Utc>,
    ) -> Result<Vec<Quote>> {
        let state = self.state.lock();

        let mut quotes: Vec<Quote> = state
            .quotes
            .values()
            .filter(|q| q.user_id == user_id)
            .filter(|q| match q.status {
                QuoteStatus::Active => q.expires_at > now,
                QuoteStatus::Expired | QuoteStatus::Accepted => q.created_at >= retain_since,
            })
            .cloned()
            .collect();

        quotes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quotes)
    }

    async fn expire_quotes(&self, user_id: Option<u64>, now: DateTime<Utc>) -> Result<u64> {
        let mut state = self.state.lock();
        let mut expired = 0;

        for quote in state.quotes.values_mut() {
            let owned = user_id.map_or(true, |id| quote.user_id == id);
            if owned && quote.status == QuoteStatus::Active && quote.expires_at <= now {
                quote.status = QuoteStatus::Expired;
                expired += 1;
            }
        }

        Ok(expired)
    }

    async fn delete_quotes(&self, user_id: u64, statuses: &[QuoteStatus]) -> Result<u64> {
        let mut state = self.state.lock();
        let before = state.quotes.len();

        state
            .quotes
            .retain(|_, q| !(q.user_id == user_id && statuses.contains(&q.status)));

        Ok((before - state.quotes.len()) as u64)
    }

    async fn fiat_balance(&self, user_id: u64, currency: FiatCurrency) -> Result<Option<Decimal>> {
        Ok(self
            .state
            .lock()
            .fiat
            .get(&(user_id, currency))
            .map(|row| row.balance))
    }

    async fn crypto_balance(&self, user_id: u64, asset: CryptoAsset) -> Result<Option<Decimal>> {
        Ok(self
            .state
            .lock()
            .crypto
            .get(&(user_id, asset))
            .map(|row| row.balance))
    }

    async fn list_balances(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<(Vec<FiatBalance>, Vec<CryptoBalance>)> {
        let mut state = self.state.lock();

        for currency in FiatCurrency::ALL {
            state
                .fiat
                .entry((user_id, currency))
                .or_insert(FiatBalance {
                    user_id,
                    currency,
                    balance: Decimal::ZERO,
                    created_at: now,
                    updated_at: now,
                });
        }
        for asset in CryptoAsset::ALL {
            state
                .crypto
                .entry((user_id, asset))
                .or_insert(CryptoBalance {
                    user_id,
                    asset,
                    balance: Decimal::ZERO,
                    created_at: now,
                    updated_at: now,
                });
        }

        let mut fiat: Vec<FiatBalance> = state
            .fiat
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        fiat.sort_by(|a, b| a.currency.as_str().cmp(b.currency.as_str()));

        let mut crypto: Vec<CryptoBalance> = state
            .crypto
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        crypto.sort_by(|a, b| a.asset.as_str().cmp(b.asset.as_str()));

        Ok((fiat, crypto))
    }

    async fn accept_quote(
        &self,
        quote_id: Uuid,
        user_id: u64,
        now: DateTime<Utc>,
        order: OrderCreate,
    ) -> Result<Option<Order>> {
        let mut state = self.state.lock();

        // 1. 조건부 전이 확인 (ACTIVE, 소유자, 만료 전)
        let acceptable = state.quotes.get(&quote_id).is_some_and(|q| {
            q.user_id == user_id && q.status == QuoteStatus::Active && q.expires_at > now
        });
        if !acceptable {
            return Ok(None);
        }

        // 2. 주문 준비 (아직 반영하지 않음)
        if state.failure == Some(FailurePoint::OrderInsert) {
            state.failure = None;
            bail!("Failed to create order: injected failure");
        }
        if state
            .orders
            .values()
            .any(|o| o.quote_id == quote_id || o.reference == order.reference)
        {
            bail!("Failed to create order: duplicate quote_id or reference");
        }
        let order = order.into_order(Uuid::new_v4(), now);

        // 3. 연결 준비
        if state.failure == Some(FailurePoint::QuoteLink) {
            state.failure = None;
            bail!("Failed to link order to quote: injected failure");
        }

        // 4. 한 번에 반영 (commit)
        if let Some(quote) = state.quotes.get_mut(&quote_id) {
            quote.status = QuoteStatus::Accepted;
            quote.order_id = Some(order.id);
        }
        state.orders.insert(order.id, order.clone());

        Ok(Some(order))
    }

    async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>> {
        Ok(self.state.lock().orders.get(&order_id).cloned())
    }

    async fn list_orders(&self, user_id: u64, limit: i64, offset: i64) -> Result<Vec<Order>> {
        let state = self.state.lock();

        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(orders
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}
