// Quote Handler
// 견적 핸들러
// 역할: 견적 생성/조회/수락/삭제 API 엔드포인트 처리

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::domains::quote::models::{
    ClearQuotesResponse, CreateQuoteRequest, CreateQuoteResponse, OrderResponse,
    QuoteDetailResponse, QuotesResponse,
};
use crate::shared::errors::QuoteError;
use crate::shared::middleware::auth::AuthenticatedUser;
use crate::shared::services::AppState;

type ErrorResponse = (StatusCode, Json<serde_json::Value>);

/// 견적 생성 핸들러
/// Create quote handler
///
/// 경로: POST /api/quotes
/// 인증: 필요 (JWT 토큰)
///
/// 잔고가 부족해도 견적은 생성되며 `balanceWarning` 으로 알려줍니다.
/// 실제 잔고 확인은 수락 시 수행합니다.
#[utoipa::path(
    post,
    path = "/api/quotes",
    request_body = CreateQuoteRequest,
    responses(
        (status = 201, description = "Quote created", body = CreateQuoteResponse),
        (status = 400, description = "Invalid input, currency or asset"),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 502, description = "Price oracle returned an invalid price"),
        (status = 503, description = "Price unavailable")
    ),
    tag = "Quotes",
    security(("BearerAuth" = []))
)]
pub async fn create_quote(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    payload: Result<Json<CreateQuoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateQuoteResponse>), ErrorResponse> {
    // 본문 파싱 실패도 같은 에러 형식으로 반환
    let Json(request) = payload.map_err(|rejection| -> ErrorResponse {
        QuoteError::InvalidInput(rejection.body_text()).into()
    })?;

    let response = app_state
        .quote_state
        .quote_service
        .create_quote(authenticated_user.user_id, request)
        .await
        .map_err(|e: QuoteError| -> ErrorResponse { e.into() })?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// 견적 목록 조회 핸들러
/// List quotes handler
///
/// 경로: GET /api/quotes
/// 인증: 필요 (JWT 토큰)
///
/// 조회 전에 만료된 견적을 EXPIRED 로 정리합니다.
/// ACTIVE 견적과 최근 24시간의 EXPIRED/ACCEPTED 견적을 최신순으로 반환합니다.
#[utoipa::path(
    get,
    path = "/api/quotes",
    responses(
        (status = 200, description = "Quotes retrieved", body = QuotesResponse),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Quotes",
    security(("BearerAuth" = []))
)]
pub async fn list_quotes(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<QuotesResponse>, ErrorResponse> {
    let quotes = app_state
        .quote_state
        .quote_service
        .list_quotes(authenticated_user.user_id)
        .await
        .map_err(|e: QuoteError| -> ErrorResponse { e.into() })?;

    Ok(Json(QuotesResponse { quotes }))
}

/// 견적 단건 조회 핸들러
/// Get quote handler
///
/// 경로: GET /api/quotes/{id}
/// 인증: 필요 (JWT 토큰)
#[utoipa::path(
    get,
    path = "/api/quotes/{id}",
    params(
        ("id" = Uuid, Path, description = "Quote ID")
    ),
    responses(
        (status = 200, description = "Quote retrieved", body = QuoteDetailResponse),
        (status = 400, description = "Malformed quote ID"),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 404, description = "Quote not found")
    ),
    tag = "Quotes",
    security(("BearerAuth" = []))
)]
pub async fn get_quote(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    quote_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<QuoteDetailResponse>, ErrorResponse> {
    let quote_id = parse_id(quote_id)?;

    let quote = app_state
        .quote_state
        .quote_service
        .get_quote(authenticated_user.user_id, quote_id)
        .await
        .map_err(|e: QuoteError| -> ErrorResponse { e.into() })?;

    Ok(Json(QuoteDetailResponse { quote }))
}

/// 견적 수락 핸들러
/// Accept quote handler
///
/// 경로: POST /api/quotes/{id}/accept
/// 인증: 필요 (JWT 토큰)
///
/// # Returns
/// * `200 OK` - 주문 생성 (status = PENDING)
/// * `400 Bad Request` - 만료/수락된 견적 (`invalid_state`), 잔고 부족 (`insufficient_funds`)
/// * `404 Not Found` - 견적 없음
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/accept",
    params(
        ("id" = Uuid, Path, description = "Quote ID")
    ),
    responses(
        (status = 200, description = "Quote accepted, order created", body = OrderResponse),
        (status = 400, description = "Quote expired, not active, or insufficient funds"),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 404, description = "Quote not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Quotes",
    security(("BearerAuth" = []))
)]
pub async fn accept_quote(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    quote_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OrderResponse>, ErrorResponse> {
    let quote_id = parse_id(quote_id)?;

    let order = app_state
        .quote_state
        .order_converter
        .accept_quote(authenticated_user.user_id, quote_id)
        .await
        .map_err(|e: QuoteError| -> ErrorResponse { e.into() })?;

    Ok(Json(OrderResponse {
        order,
        message: "Quote accepted".to_string(),
    }))
}

/// 견적 일괄 삭제 핸들러
/// Clear quotes handler
///
/// 경로: DELETE /api/quotes
/// 인증: 필요 (JWT 토큰)
///
/// ACTIVE 견적만 삭제합니다 (설정에 따라 ACCEPTED 포함).
#[utoipa::path(
    delete,
    path = "/api/quotes",
    responses(
        (status = 200, description = "Quotes deleted", body = ClearQuotesResponse),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Quotes",
    security(("BearerAuth" = []))
)]
pub async fn clear_quotes(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<ClearQuotesResponse>, ErrorResponse> {
    let deleted = app_state
        .quote_state
        .quote_service
        .clear_quotes(authenticated_user.user_id)
        .await
        .map_err(|e: QuoteError| -> ErrorResponse { e.into() })?;

    Ok(Json(ClearQuotesResponse {
        deleted,
        message: format!("Deleted {} quote(s)", deleted),
    }))
}

pub(super) fn parse_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ErrorResponse> {
    id.map(|Path(id)| id).map_err(|rejection| -> ErrorResponse {
        QuoteError::InvalidInput(rejection.body_text()).into()
    })
}
