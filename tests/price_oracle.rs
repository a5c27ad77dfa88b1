// =====================================================
// 가격 오라클 HTTP 클라이언트 통합 테스트
// =====================================================
// 로컬 axum 서버로 CoinGecko simple/price 응답을 흉내냄

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use quote_server::domains::quote::models::{CryptoAsset, FiatCurrency};
use quote_server::shared::clients::{HttpPriceOracle, OracleError, PriceOracle};
use quote_server::shared::config::OracleSettings;
use quote_server::shared::utils::{Backoff, RetryPolicy};

/// 처음 `failures` 번은 `failure_status` 로 응답하는 모의 서버
#[derive(Clone)]
struct MockOracle {
    calls: Arc<AtomicUsize>,
    failures: usize,
    failure_status: StatusCode,
}

async fn simple_price(
    State(mock): State<MockOracle>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let call = mock.calls.fetch_add(1, Ordering::SeqCst);
    if call < mock.failures {
        return Err(mock.failure_status);
    }

    assert_eq!(params.get("ids").map(String::as_str), Some("bitcoin"));
    assert_eq!(params.get("vs_currencies").map(String::as_str), Some("usd"));

    Ok(Json(json!({
        "bitcoin": { "usd": 65000.5, "last_updated_at": 1_792_324_800 }
    })))
}

async fn spawn_mock(failures: usize, failure_status: StatusCode) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let mock = MockOracle {
        calls: calls.clone(),
        failures,
        failure_status,
    };

    let app = Router::new()
        .route("/simple/price", get(simple_price))
        .with_state(mock);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), calls)
}

fn settings(base_url: String, max_attempts: u32) -> OracleSettings {
    OracleSettings {
        base_url,
        timeout: Duration::from_secs(2),
        retry: RetryPolicy {
            max_attempts,
            delay: Duration::from_millis(10),
            backoff: Backoff::Fixed,
        },
    }
}

/// 테스트: 일시적 장애 (503) 후 재시도로 성공
#[tokio::test]
async fn test_retries_transient_failures() {
    let (base_url, calls) = spawn_mock(2, StatusCode::SERVICE_UNAVAILABLE).await;
    let oracle = HttpPriceOracle::new(&settings(base_url, 3)).unwrap();

    let quote = oracle
        .price(CryptoAsset::Btc, FiatCurrency::Usd)
        .await
        .unwrap();

    assert_eq!(quote.price, dec!(65000.5));
    assert_eq!(quote.as_of.timestamp(), 1_792_324_800);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

/// 테스트: 재시도 횟수를 모두 쓰면 마지막 에러 반환
#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let (base_url, calls) = spawn_mock(10, StatusCode::TOO_MANY_REQUESTS).await;
    let oracle = HttpPriceOracle::new(&settings(base_url, 3)).unwrap();

    let result = oracle.price(CryptoAsset::Btc, FiatCurrency::Usd).await;

    assert!(matches!(result, Err(OracleError::Status { status: 429, .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

/// 테스트: 4xx (429 제외) 는 재시도하지 않음
#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let (base_url, calls) = spawn_mock(10, StatusCode::BAD_REQUEST).await;
    let oracle = HttpPriceOracle::new(&settings(base_url, 3)).unwrap();

    let result = oracle.price(CryptoAsset::Btc, FiatCurrency::Usd).await;

    assert!(matches!(result, Err(OracleError::Status { status: 400, .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// 테스트: 연결 실패는 Transport 에러
#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // 바인드 후 바로 닫아서 사용되지 않는 포트 확보
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let oracle = HttpPriceOracle::new(&settings(format!("http://{}", addr), 2)).unwrap();
    let result = oracle.price(CryptoAsset::Btc, FiatCurrency::Usd).await;

    assert!(matches!(result, Err(OracleError::Transport(_))));
}
