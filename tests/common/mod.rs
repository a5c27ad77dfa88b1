// =====================================================
// 통합 테스트 공통 헬퍼
// =====================================================
// 목적: 인메모리 저장소 + 수동 시계 + 고정 가격 오라클로 앱 상태 구성
//
// 각 테스트는 setup() 으로 독립된 상태를 만들고,
// clock.advance() 로 시간을 직접 움직여 만료를 검증합니다.
// =====================================================
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use quote_server::domains::quote::models::{
    CreateQuoteRequest, CryptoAsset, FiatCurrency, QuoteInput,
};
use quote_server::domains::quote::store::InMemoryQuoteStore;
use quote_server::shared::clients::StaticPriceOracle;
use quote_server::shared::config::QuoteSettings;
use quote_server::shared::services::AppState;
use quote_server::shared::utils::ManualClock;

// 테스트용 상수
pub const TEST_JWT_SECRET: &str = "test-secret";
pub const TEST_USER_ID: u64 = 1;
pub const OTHER_USER_ID: u64 = 2;

pub fn btc_usd_price() -> Decimal {
    dec!(65000)
}

/// 모든 테스트의 시작 시각 (고정)
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

/// 테스트 앱 상태와 조작 가능한 구성 요소
pub struct TestContext {
    pub state: AppState,
    pub store: Arc<InMemoryQuoteStore>,
    pub oracle: Arc<StaticPriceOracle>,
    pub clock: Arc<ManualClock>,
}

/// 기본 설정으로 초기화
pub fn setup() -> TestContext {
    setup_with(QuoteSettings::default())
}

pub fn setup_with(settings: QuoteSettings) -> TestContext {
    let store = Arc::new(InMemoryQuoteStore::new());
    let oracle = Arc::new(
        StaticPriceOracle::new()
            .with_price(CryptoAsset::Btc, FiatCurrency::Usd, btc_usd_price())
            .with_price(CryptoAsset::Eth, FiatCurrency::Usd, dec!(3200))
            .with_price(CryptoAsset::Btc, FiatCurrency::Eur, dec!(60000)),
    );
    let clock = Arc::new(ManualClock::new(start_time()));

    let state = AppState::new(
        TEST_JWT_SECRET,
        store.clone(),
        oracle.clone(),
        clock.clone(),
        &settings,
    )
    .expect("Failed to build AppState");

    TestContext {
        state,
        store,
        oracle,
        clock,
    }
}

/// 수량 기준 견적 요청
pub fn quote_request(
    trade_type: &str,
    crypto: &str,
    currency: &str,
    input: QuoteInput,
) -> CreateQuoteRequest {
    CreateQuoteRequest {
        currency: currency.to_string(),
        crypto: crypto.to_string(),
        trade_type: trade_type.to_string(),
        input: Some(input),
        quantity: None,
        amount: None,
    }
}

/// BTC/USD 매수 견적 요청
pub fn buy_btc(quantity: Decimal) -> CreateQuoteRequest {
    quote_request("BUY", "BTC", "USD", QuoteInput::ByQuantity { quantity })
}

/// BTC/USD 매도 견적 요청
pub fn sell_btc(quantity: Decimal) -> CreateQuoteRequest {
    quote_request("SELL", "BTC", "USD", QuoteInput::ByQuantity { quantity })
}

/// 테스트 사용자용 Access Token 발급
pub fn access_token(ctx: &TestContext, user_id: u64) -> String {
    ctx.state
        .auth_state
        .jwt_service
        .generate_access_token(user_id, format!("user{}@example.com", user_id))
        .expect("Failed to mint token")
}
