// 견적 저장소 (Quote Store)
// 역할: 견적/주문/잔고 영속화 인터페이스
//
// 구현:
// - PgQuoteStore: PostgreSQL (운영)
// - InMemoryQuoteStore: 단일 Mutex 기반 (로컬 실행, 테스트)

pub mod memory;
pub mod postgres;

pub use memory::{FailurePoint, InMemoryQuoteStore};
pub use postgres::PgQuoteStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domains::quote::models::{
    CryptoAsset, CryptoBalance, FiatBalance, FiatCurrency, Order, OrderCreate, Quote,
    QuoteCreate, QuoteStatus,
};

/// 견적 저장소 trait
/// Quote store trait
///
/// 서비스 계층은 이 trait 에만 의존합니다.
/// 인프라 에러는 `anyhow::Error` 로 반환되고 서비스 경계에서 `QuoteError::Internal` 로 바뀝니다.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 견적 (Quotes)
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// 견적 저장 (status = ACTIVE, ID 는 저장소가 발급)
    async fn insert_quote(&self, quote: QuoteCreate) -> Result<Quote>;

    async fn get_quote(&self, quote_id: Uuid) -> Result<Option<Quote>>;

    /// 목록용 견적 조회 (최신순)
    ///
    /// # Arguments
    /// * `now` - ACTIVE 견적은 `expires_at > now` 인 것만
    /// * `retain_since` - EXPIRED / ACCEPTED 견적은 이 시각 이후 생성된 것만
    async fn list_quotes(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
        retain_since: DateTime<Utc>,
    ) -> Result<Vec<Quote>>;

    /// ACTIVE 이면서 `expires_at <= now` 인 견적을 EXPIRED 로 변경
    ///
    /// # Returns
    /// 변경된 견적 수 (다시 호출하면 0, 멱등)
    async fn expire_quotes(&self, user_id: Option<u64>, now: DateTime<Utc>) -> Result<u64>;

    /// 사용자의 견적 중 `statuses` 상태인 것 삭제
    async fn delete_quotes(&self, user_id: u64, statuses: &[QuoteStatus]) -> Result<u64>;

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 잔고 (Balances)
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// 잔고 행이 없으면 None
    async fn fiat_balance(&self, user_id: u64, currency: FiatCurrency) -> Result<Option<Decimal>>;

    async fn crypto_balance(&self, user_id: u64, asset: CryptoAsset) -> Result<Option<Decimal>>;

    /// 없는 잔고 행을 0 으로 만든 뒤 전체 잔고 반환
    async fn list_balances(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<(Vec<FiatBalance>, Vec<CryptoBalance>)>;

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 수락 / 주문 (Acceptance & Orders)
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// 견적 수락과 주문 생성을 하나의 원자적 단위로 실행
    /// Atomically transition the quote to ACCEPTED and create its order
    ///
    /// 처리 과정 (하나의 트랜잭션):
    /// 1. `id, user_id, status = ACTIVE, expires_at > now` 조건부 UPDATE
    /// 2. 주문 INSERT (status = PENDING)
    /// 3. 견적에 order_id 연결
    ///
    /// # Returns
    /// * `Ok(Some(order))` - 수락 성공
    /// * `Ok(None)` - 조건부 UPDATE 가 0 행 (이미 수락/만료됨), 아무것도 변경되지 않음
    /// * `Err` - 2, 3 단계 실패, 트랜잭션 전체 롤백
    async fn accept_quote(
        &self,
        quote_id: Uuid,
        user_id: u64,
        now: DateTime<Utc>,
        order: OrderCreate,
    ) -> Result<Option<Order>>;

    async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>>;

    async fn list_orders(&self, user_id: u64, limit: i64, offset: i64) -> Result<Vec<Order>>;
}
