use axum::{http::StatusCode, Json};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

use crate::domains::quote::models::BalanceShortfall;

/// 견적/주문 관련 에러
/// Quote workflow errors
///
/// 모든 에러는 요청 경계에서 HTTP 응답으로 변환됩니다.
/// 응답 본문: `{"error": <메시지>, "kind": <고정된 에러 종류>}`
#[derive(Error, Debug)]
pub enum QuoteError {
    /// 잘못된 요청 (형식 오류, 모순된 입력)
    /// Malformed or contradictory request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 지원하지 않는 법정화폐 코드
    #[error("Unsupported currency: {code}")]
    InvalidCurrency { code: String },

    /// 지원하지 않는 암호화폐 코드
    #[error("Unsupported crypto asset: {code}")]
    InvalidAsset { code: String },

    /// 음수 수수료율
    #[error("Invalid fee rate: {rate}")]
    InvalidFeeRate { rate: Decimal },

    /// 0 이하의 가격
    #[error("Invalid price: {price}")]
    InvalidPrice { price: Decimal },

    /// 가격 조회 실패 (재시도 모두 실패)
    /// Price oracle exhausted its retries
    #[error("Price unavailable for {pair}: {reason}")]
    PriceUnavailable { pair: String, reason: String },

    /// 잔고 부족
    /// Insufficient funds
    #[error("Insufficient funds: {} {} required, {} available", .0.code, .0.required, .0.available)]
    InsufficientFunds(BalanceShortfall),

    /// 리소스 없음 (견적/주문)
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// 견적이 ACTIVE 가 아니거나 만료됨
    /// Quote not ACTIVE or expired
    #[error("{0}")]
    InvalidState(String),

    #[error("Unauthorized")]
    Unauthorized,

    /// 내부 서버 에러 (DB 등)
    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl QuoteError {
    /// 고정된 에러 종류 (클라이언트가 분기할 때 사용)
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            QuoteError::InvalidInput(_) => "invalid_input",
            QuoteError::InvalidCurrency { .. } => "invalid_currency",
            QuoteError::InvalidAsset { .. } => "invalid_asset",
            QuoteError::InvalidFeeRate { .. } => "invalid_fee_rate",
            QuoteError::InvalidPrice { .. } => "invalid_price",
            QuoteError::PriceUnavailable { .. } => "price_unavailable",
            QuoteError::InsufficientFunds(_) => "insufficient_funds",
            QuoteError::NotFound { .. } => "not_found",
            QuoteError::InvalidState(_) => "invalid_state",
            QuoteError::Unauthorized => "unauthorized",
            QuoteError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            QuoteError::InvalidInput(_)
            | QuoteError::InvalidCurrency { .. }
            | QuoteError::InvalidAsset { .. }
            | QuoteError::InvalidFeeRate { .. }
            | QuoteError::InsufficientFunds(_)
            | QuoteError::InvalidState(_) => StatusCode::BAD_REQUEST,
            QuoteError::InvalidPrice { .. } => StatusCode::BAD_GATEWAY,
            QuoteError::PriceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            QuoteError::NotFound { .. } => StatusCode::NOT_FOUND,
            QuoteError::Unauthorized => StatusCode::UNAUTHORIZED,
            QuoteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn quote_not_found(id: impl ToString) -> Self {
        QuoteError::NotFound { resource: "Quote", id: id.to_string() }
    }

    pub fn order_not_found(id: impl ToString) -> Self {
        QuoteError::NotFound { resource: "Order", id: id.to_string() }
    }
}

/// 저장소/클라이언트의 anyhow 에러는 내부 에러로 변환
impl From<anyhow::Error> for QuoteError {
    fn from(err: anyhow::Error) -> Self {
        QuoteError::Internal(format!("{:#}", err))
    }
}

/// QuoteError를 HTTP 응답으로 변환
impl From<QuoteError> for (StatusCode, Json<serde_json::Value>) {
    fn from(err: QuoteError) -> Self {
        let status = err.status_code();

        let body = match &err {
            QuoteError::InsufficientFunds(shortfall) => json!({
                "error": err.to_string(),
                "kind": err.kind(),
                "shortfall": shortfall,
            }),
            _ => json!({ "error": err.to_string(), "kind": err.kind() }),
        };

        (status, Json(body))
    }
}
