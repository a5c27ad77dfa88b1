use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::balance::BalanceShortfall;
use super::currency::{CryptoAsset, FiatCurrency};
use crate::shared::errors::QuoteError;

// =====================================================
// Quote 모델
// =====================================================
// 역할: 일정 시간 동안만 유효한 매수/매도 가격 제안
// 설명: 요청 시점의 가격으로 계산되고, 15초 뒤 만료됩니다.
//
// 상태 전이:
// - ACTIVE → EXPIRED  (만료 시각이 지나고 sweep 실행 시)
// - ACTIVE → ACCEPTED (만료 전 accept 호출 시, Order 생성)
// - EXPIRED, ACCEPTED 는 종료 상태 (다시 ACTIVE 로 돌아가지 않음)
//
// 금액 정의:
// - BUY:  net_amount = gross_amount + fee (구매자가 더 냄)
// - SELL: net_amount = gross_amount - fee (판매자가 덜 받음)
// =====================================================

/// 견적 유효 시간 (초)
/// Quote validity window in seconds
pub const QUOTE_VALIDITY_SECS: i64 = 15;

/// 만료/수락된 견적을 목록에 남겨두는 시간 (시간)
/// Retention for terminal quotes in listings, in hours
pub const QUOTE_RETENTION_HOURS: i64 = 24;

/// 거래 방향
/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "BUY",
            TradeType::Sell => "SELL",
        }
    }
}

impl FromStr for TradeType {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(TradeType::Buy),
            "SELL" => Ok(TradeType::Sell),
            other => Err(QuoteError::InvalidInput(format!(
                "tradeType must be BUY or SELL, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 견적 상태
/// Quote status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuoteStatus {
    Active,
    Accepted,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Active => "ACTIVE",
            QuoteStatus::Accepted => "ACCEPTED",
            QuoteStatus::Expired => "EXPIRED",
        }
    }
}

impl FromStr for QuoteStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(QuoteStatus::Active),
            "ACCEPTED" => Ok(QuoteStatus::Accepted),
            "EXPIRED" => Ok(QuoteStatus::Expired),
            other => anyhow::bail!("Unknown quote status: {}", other),
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 견적 요청 입력 (수량 기준 또는 금액 기준, 둘 중 하나만)
/// Quote input: either a crypto quantity or a fiat amount, never both
///
/// JSON:
/// - `{"kind": "byQuantity", "quantity": "0.1"}`
/// - `{"kind": "byAmount", "amount": "1000"}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QuoteInput {
    ByQuantity { quantity: Decimal },
    ByAmount { amount: Decimal },
}

impl QuoteInput {
    /// 기존 요청 형식 (quantity?, amount? 두 필드) 에서 변환
    /// Resolve the legacy two-optional-fields form; exactly one must be present
    pub fn from_optional(
        quantity: Option<Decimal>,
        amount: Option<Decimal>,
    ) -> Result<Self, QuoteError> {
        match (quantity, amount) {
            (Some(quantity), None) => Ok(QuoteInput::ByQuantity { quantity }),
            (None, Some(amount)) => Ok(QuoteInput::ByAmount { amount }),
            (Some(_), Some(_)) => Err(QuoteError::InvalidInput(
                "Provide either quantity or amount, not both".to_string(),
            )),
            (None, None) => Err(QuoteError::InvalidInput(
                "Either quantity or amount is required".to_string(),
            )),
        }
    }

    pub fn kind(&self) -> QuoteInputKind {
        match self {
            QuoteInput::ByQuantity { .. } => QuoteInputKind::ByQuantity,
            QuoteInput::ByAmount { .. } => QuoteInputKind::ByAmount,
        }
    }
}

/// 사용자가 직접 입력한 값의 종류 (나머지 값은 계산으로 도출)
/// Which value the caller supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum QuoteInputKind {
    ByQuantity,
    ByAmount,
}

impl QuoteInputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteInputKind::ByQuantity => "byQuantity",
            QuoteInputKind::ByAmount => "byAmount",
        }
    }
}

impl FromStr for QuoteInputKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "byQuantity" => Ok(QuoteInputKind::ByQuantity),
            "byAmount" => Ok(QuoteInputKind::ByAmount),
            other => anyhow::bail!("Unknown quote input kind: {}", other),
        }
    }
}

/// 견적 정보 (저장소에서 조회한 견적)
/// Quote information (quote retrieved from the store)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = Quote)]
pub struct Quote {
    /// Quote ID
    /// 견적 ID
    pub id: Uuid,

    /// Owner user ID
    /// 견적 소유자
    pub user_id: u64,

    /// Fiat currency
    /// 법정화폐
    pub currency: FiatCurrency,

    /// Crypto asset
    /// 암호화폐
    pub crypto: CryptoAsset,

    pub trade_type: TradeType,

    /// Price of 1 unit of crypto in fiat at quote time
    /// 견적 시점의 1 단위 가격
    #[schema(value_type = String, example = "65000")]
    pub rate: Decimal,

    pub input_kind: QuoteInputKind,

    /// Crypto quantity
    /// 암호화폐 수량
    #[schema(value_type = String, example = "0.1")]
    pub quantity: Decimal,

    /// quantity × rate
    #[schema(value_type = String, example = "6500")]
    pub gross_amount: Decimal,

    #[schema(value_type = String, example = "32.5")]
    pub fee: Decimal,

    #[schema(value_type = String, example = "0.005")]
    pub fee_rate: Decimal,

    /// BUY: gross + fee (what the buyer pays), SELL: gross - fee (what the seller receives)
    /// BUY: 총 지불액, SELL: 실수령액
    #[schema(value_type = String, example = "6532.5")]
    pub net_amount: Decimal,

    pub status: QuoteStatus,

    pub created_at: DateTime<Utc>,

    /// created_at + 15s
    pub expires_at: DateTime<Utc>,

    /// Order created on acceptance
    /// 수락 시 생성된 주문 ID
    pub order_id: Option<Uuid>,
}

impl Quote {
    /// 주어진 시각에 만료되었는지 (만료 시각 포함)
    /// Whether the quote is past its validity window at `now` (inclusive)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// =====================================================
// 견적 생성용 (Store 에서 사용)
// =====================================================
/// 견적 생성 시 사용하는 내부 모델 (저장용)
/// Internal model for persisting a new quote
#[derive(Debug, Clone)]
pub struct QuoteCreate {
    pub user_id: u64,
    pub currency: FiatCurrency,
    pub crypto: CryptoAsset,
    pub trade_type: TradeType,
    pub rate: Decimal,
    pub input_kind: QuoteInputKind,
    pub quantity: Decimal,
    pub gross_amount: Decimal,
    pub fee: Decimal,
    pub fee_rate: Decimal,
    pub net_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

// =====================================================
// 견적 생성 요청 (Create Quote Request)
// =====================================================
/// 견적 생성 요청 모델
/// Request model for creating a quote
///
/// `input` 을 사용하세요. `quantity` / `amount` 는 이전 클라이언트 호환용이며
/// `input` 이 없을 때만 사용됩니다 (둘 중 정확히 하나).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = CreateQuoteRequest)]
pub struct CreateQuoteRequest {
    /// Fiat currency code
    /// 법정화폐 코드
    #[schema(example = "USD")]
    pub currency: String,

    /// Crypto asset code
    /// 암호화폐 코드
    #[schema(example = "BTC")]
    pub crypto: String,

    /// 'BUY' or 'SELL'
    #[schema(example = "BUY")]
    pub trade_type: String,

    /// `{"kind": "byQuantity", "quantity": "0.1"}` or `{"kind": "byAmount", "amount": "1000"}`
    #[schema(value_type = Option<Object>)]
    pub input: Option<QuoteInput>,

    /// Legacy: crypto quantity
    #[schema(value_type = Option<String>, example = "0.1")]
    pub quantity: Option<Decimal>,

    /// Legacy: fiat amount
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
}

impl CreateQuoteRequest {
    /// 입력 형식 해석 (tagged union 우선)
    /// Resolve the tagged input, falling back to the legacy fields
    pub fn resolve_input(&self) -> Result<QuoteInput, QuoteError> {
        match self.input {
            Some(input) if self.quantity.is_none() && self.amount.is_none() => Ok(input),
            Some(_) => Err(QuoteError::InvalidInput(
                "Use either input or the legacy quantity/amount fields, not both".to_string(),
            )),
            None => QuoteInput::from_optional(self.quantity, self.amount),
        }
    }
}

// =====================================================
// 견적 응답 (Quote Responses)
// =====================================================
/// 견적 생성 응답 모델
/// Response model for quote creation
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = CreateQuoteResponse)]
pub struct CreateQuoteResponse {
    pub quote: Quote,

    /// Advisory: the user's balance does not currently cover this quote
    /// 참고용 경고: 현재 잔고로는 부족 (수락 시 다시 확인)
    pub balance_warning: Option<BalanceShortfall>,

    #[schema(example = "Quote created successfully")]
    pub message: String,
}

/// 단일 견적 응답
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = QuoteDetailResponse)]
pub struct QuoteDetailResponse {
    pub quote: Quote,
}

/// 견적 목록 응답 모델
/// Response model for list of quotes
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = QuotesResponse)]
pub struct QuotesResponse {
    pub quotes: Vec<Quote>,
}

/// 견적 일괄 삭제 응답
/// Response model for clearing quotes
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = ClearQuotesResponse)]
pub struct ClearQuotesResponse {
    /// Number of deleted quotes
    /// 삭제된 견적 수
    pub deleted: u64,

    pub message: String,
}
