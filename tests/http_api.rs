// =====================================================
// HTTP API 통합 테스트 (라우터 + 인증 + 에러 응답)
// =====================================================
// tower::ServiceExt::oneshot 으로 서버 없이 요청 처리

mod common;
use common::*;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use quote_server::domains::quote::models::{CryptoAsset, FiatCurrency};
use quote_server::routes::create_app;

fn app(ctx: &TestContext) -> Router {
    create_app(ctx.state.clone())
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(ctx: &TestContext, request: Request<Body>) -> (StatusCode, Value) {
    let response = app(ctx).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn buy_body() -> Value {
    json!({
        "currency": "USD",
        "crypto": "BTC",
        "tradeType": "BUY",
        "input": { "kind": "byQuantity", "quantity": "0.1" }
    })
}

/// 테스트: 토큰이 없거나 잘못되면 401
#[tokio::test]
async fn test_requires_bearer_token() {
    let ctx = setup();

    let (status, body) = send(&ctx, request(Method::GET, "/api/quotes", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");

    let (status, _) = send(
        &ctx,
        request(Method::GET, "/api/quotes", Some("not-a-token"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let other = quote_server::domains::auth::services::JwtService::new("other-secret")
        .generate_access_token(TEST_USER_ID, "user@example.com".to_string())
        .unwrap();
    let (status, _) = send(&ctx, request(Method::GET, "/api/balances", Some(&other), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// 테스트: 견적 생성 → 조회 → 수락 → 주문 조회 흐름
#[tokio::test]
async fn test_quote_to_order_flow() {
    let ctx = setup();
    ctx.store
        .set_fiat_balance(TEST_USER_ID, FiatCurrency::Usd, dec!(10000));
    let token = access_token(&ctx, TEST_USER_ID);

    let (status, body) = send(
        &ctx,
        request(Method::POST, "/api/quotes", Some(&token), Some(buy_body())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quote"]["status"], "ACTIVE");
    assert_eq!(body["quote"]["tradeType"], "BUY");
    assert_eq!(body["quote"]["netAmount"], "6532.5");
    assert_eq!(body["quote"]["inputKind"], "byQuantity");
    assert!(body["balanceWarning"].is_null());

    let quote_id = body["quote"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &ctx,
        request(Method::GET, &format!("/api/quotes/{}", quote_id), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quote"]["id"], quote_id.as_str());

    let (status, body) = send(
        &ctx,
        request(
            Method::POST,
            &format!("/api/quotes/{}/accept", quote_id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "PENDING");
    assert_eq!(body["order"]["quoteId"], quote_id.as_str());
    assert_eq!(body["order"]["totalAmount"], "6532.5");
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&ctx, request(Method::GET, "/api/orders", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &ctx,
        request(Method::GET, &format!("/api/orders/{}", order_id), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["id"], order_id.as_str());

    // 두 번째 수락은 invalid_state
    let (status, body) = send(
        &ctx,
        request(
            Method::POST,
            &format!("/api/quotes/{}/accept", quote_id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_state");
}

/// 테스트: 이전 요청 형식 (quantity/amount 필드) 도 허용
#[tokio::test]
async fn test_legacy_request_shape() {
    let ctx = setup();
    let token = access_token(&ctx, TEST_USER_ID);

    let body = json!({
        "currency": "usd",
        "crypto": "btc",
        "tradeType": "sell",
        "amount": "6500"
    });
    let (status, body) = send(
        &ctx,
        request(Method::POST, "/api/quotes", Some(&token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quote"]["quantity"], "0.1");
    assert_eq!(body["quote"]["inputKind"], "byAmount");

    // 잔고가 없으므로 경고 포함
    assert_eq!(body["balanceWarning"]["side"], "CRYPTO");
}

/// 테스트: 검증 에러는 400 + 고정된 kind
#[tokio::test]
async fn test_validation_errors() {
    let ctx = setup();
    let token = access_token(&ctx, TEST_USER_ID);

    let mut body = buy_body();
    body["currency"] = json!("XYZ");
    let (status, response) = send(
        &ctx,
        request(Method::POST, "/api/quotes", Some(&token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["kind"], "invalid_currency");

    let mut body = buy_body();
    body["crypto"] = json!("FOO");
    let (status, response) = send(
        &ctx,
        request(Method::POST, "/api/quotes", Some(&token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["kind"], "invalid_asset");

    // quantity 와 amount 동시 지정
    let body = json!({
        "currency": "USD",
        "crypto": "BTC",
        "tradeType": "BUY",
        "quantity": "0.1",
        "amount": "100"
    });
    let (status, response) = send(
        &ctx,
        request(Method::POST, "/api/quotes", Some(&token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["kind"], "invalid_input");

    // JSON 형식 오류
    let bad_json = Request::builder()
        .method(Method::POST)
        .uri("/api/quotes")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, response) = send(&ctx, bad_json).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["kind"], "invalid_input");

    // 잘못된 UUID
    let (status, response) = send(
        &ctx,
        request(Method::GET, "/api/quotes/not-a-uuid", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["kind"], "invalid_input");

    // 잘못된 페이지네이션
    let (status, response) = send(
        &ctx,
        request(Method::GET, "/api/orders?limit=0", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["kind"], "invalid_input");
}

/// 테스트: 없는 견적/주문, 다른 사용자 견적은 404
#[tokio::test]
async fn test_not_found() {
    let ctx = setup();
    let token = access_token(&ctx, TEST_USER_ID);
    let other_token = access_token(&ctx, OTHER_USER_ID);

    let (status, body) = send(
        &ctx,
        request(
            Method::GET,
            &format!("/api/quotes/{}", uuid::Uuid::new_v4()),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (status, _) = send(
        &ctx,
        request(
            Method::GET,
            &format!("/api/orders/{}", uuid::Uuid::new_v4()),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(
        &ctx,
        request(Method::POST, "/api/quotes", Some(&token), Some(buy_body())),
    )
    .await;
    let quote_id = body["quote"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &ctx,
        request(
            Method::POST,
            &format!("/api/quotes/{}/accept", quote_id),
            Some(&other_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// 테스트: 가격 조회 실패는 503
#[tokio::test]
async fn test_price_unavailable_is_503() {
    let ctx = setup();
    ctx.oracle.remove_price(CryptoAsset::Btc, FiatCurrency::Usd);
    let token = access_token(&ctx, TEST_USER_ID);

    let (status, body) = send(
        &ctx,
        request(Method::POST, "/api/quotes", Some(&token), Some(buy_body())),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "price_unavailable");
}

/// 테스트: 잔고 부족 수락은 400 insufficient_funds + 부족 정보
#[tokio::test]
async fn test_insufficient_funds_response() {
    let ctx = setup();
    ctx.store
        .set_fiat_balance(TEST_USER_ID, FiatCurrency::Usd, dec!(6000));
    let token = access_token(&ctx, TEST_USER_ID);

    let (status, body) = send(
        &ctx,
        request(Method::POST, "/api/quotes", Some(&token), Some(buy_body())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["balanceWarning"]["shortfall"], "532.5");
    let quote_id = body["quote"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &ctx,
        request(
            Method::POST,
            &format!("/api/quotes/{}/accept", quote_id),
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "insufficient_funds");
    assert_eq!(body["shortfall"]["required"], "6532.5");
}

/// 테스트: 만료 후 목록에는 EXPIRED 로 표시, 일괄 삭제는 ACTIVE 만
#[tokio::test]
async fn test_list_and_clear_quotes() {
    let ctx = setup();
    let token = access_token(&ctx, TEST_USER_ID);

    send(
        &ctx,
        request(Method::POST, "/api/quotes", Some(&token), Some(buy_body())),
    )
    .await;
    ctx.clock.advance(Duration::seconds(30));
    send(
        &ctx,
        request(Method::POST, "/api/quotes", Some(&token), Some(buy_body())),
    )
    .await;

    let (status, body) = send(&ctx, request(Method::GET, "/api/quotes", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let quotes = body["quotes"].as_array().unwrap();
    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0]["status"], "ACTIVE");
    assert_eq!(quotes[1]["status"], "EXPIRED");

    let (status, body) = send(&ctx, request(Method::DELETE, "/api/quotes", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);

    let (_, body) = send(&ctx, request(Method::GET, "/api/quotes", Some(&token), None)).await;
    assert_eq!(body["quotes"].as_array().unwrap().len(), 1);
}

/// 테스트: 잔고 조회
#[tokio::test]
async fn test_list_balances() {
    let ctx = setup();
    ctx.store
        .set_crypto_balance(TEST_USER_ID, CryptoAsset::Eth, dec!(1.25));
    let token = access_token(&ctx, TEST_USER_ID);

    let (status, body) = send(&ctx, request(Method::GET, "/api/balances", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fiat"].as_array().unwrap().len(), FiatCurrency::ALL.len());

    let eth = body["crypto"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["asset"] == "ETH")
        .unwrap();
    assert_eq!(eth["balance"], "1.25");
}

/// 테스트: OpenAPI 문서 제공
#[tokio::test]
async fn test_openapi_document() {
    let ctx = setup();

    let (status, body) = send(&ctx, request(Method::GET, "/api-docs/openapi.json", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/quotes"].is_object());
    assert!(body["paths"]["/api/quotes/{id}/accept"].is_object());
    assert!(body["components"]["securitySchemes"]["BearerAuth"].is_object());
}
