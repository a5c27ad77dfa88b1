use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::currency::{CryptoAsset, FiatCurrency};
use super::quote::{Quote, TradeType};

// =====================================================
// Order 모델
// =====================================================
// 역할: 만료 전에 수락된 견적의 기록
// 설명: 견적 수락과 같은 트랜잭션에서 한 번만 생성됩니다.
//       수량/가격/금액은 견적 값을 그대로 복사 (재계산 없음)
//
// 주문 상태:
// - PENDING: 정산 대기 (생성 직후)
// - COMPLETED / FAILED: 정산 프로세스가 변경 (이 서비스 범위 밖)
// =====================================================

/// 주문 상태
/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "FAILED" => Ok(OrderStatus::Failed),
            other => anyhow::bail!("Unknown order status: {}", other),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 주문 정보 (저장소에서 조회한 주문)
/// Order information (order retrieved from the store)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = Order)]
pub struct Order {
    /// Order ID
    /// 주문 ID
    pub id: Uuid,

    /// Human-readable reference code
    /// 사람이 읽을 수 있는 주문 번호
    #[schema(example = "ORD-20261019-7QK2M9XA")]
    pub reference: String,

    pub user_id: u64,

    /// Quote this order was created from
    /// 이 주문을 만든 견적
    pub quote_id: Uuid,

    /// 'BUY' or 'SELL'
    pub order_type: TradeType,

    pub status: OrderStatus,

    pub asset: CryptoAsset,

    pub currency: FiatCurrency,

    #[schema(value_type = String, example = "0.1")]
    pub quantity: Decimal,

    /// Price per unit (quote rate)
    /// 단가 (견적 가격)
    #[schema(value_type = String, example = "65000")]
    pub price: Decimal,

    #[schema(value_type = String, example = "32.5")]
    pub fee: Decimal,

    /// Quote net amount (BUY: paid, SELL: received)
    /// 견적의 net_amount (BUY: 지불액, SELL: 수령액)
    #[schema(value_type = String, example = "6532.5")]
    pub total_amount: Decimal,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

// =====================================================
// 주문 응답 (Order Response)
// =====================================================
/// 주문 응답 모델
/// Response model for order operations
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = OrderResponse)]
pub struct OrderResponse {
    pub order: Order,

    #[schema(example = "Quote accepted")]
    pub message: String,
}

/// 주문 목록 응답 모델
/// Response model for list of orders
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = OrdersResponse)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

/// 주문 목록 조회 파라미터
/// Pagination parameters for order listing
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    /// 최대 개수 (기본값 100)
    pub limit: Option<i64>,
    /// 건너뛸 개수 (기본값 0)
    pub offset: Option<i64>,
}

// =====================================================
// Order 생성용 (Store 에서 사용)
// =====================================================
/// 주문 생성 시 사용하는 내부 모델
/// Internal model for creating orders
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub reference: String,
    pub user_id: u64,
    pub quote_id: Uuid,
    pub order_type: TradeType,
    pub asset: CryptoAsset,
    pub currency: FiatCurrency,
    pub quantity: Decimal,
    pub price: Decimal,
    pub fee: Decimal,
    pub total_amount: Decimal,
}

impl OrderCreate {
    /// 견적 값을 그대로 복사해서 주문 생성 모델 작성
    /// Copy the quote's computed values; no re-pricing
    pub fn from_quote(quote: &Quote, reference: String) -> Self {
        Self {
            reference,
            user_id: quote.user_id,
            quote_id: quote.id,
            order_type: quote.trade_type,
            asset: quote.crypto,
            currency: quote.currency,
            quantity: quote.quantity,
            price: quote.rate,
            fee: quote.fee,
            total_amount: quote.net_amount,
        }
    }

    /// 저장 시각과 ID 로 Order 작성 (상태는 항상 PENDING)
    pub fn into_order(self, id: Uuid, now: DateTime<Utc>) -> Order {
        Order {
            id,
            reference: self.reference,
            user_id: self.user_id,
            quote_id: self.quote_id,
            order_type: self.order_type,
            status: OrderStatus::Pending,
            asset: self.asset,
            currency: self.currency,
            quantity: self.quantity,
            price: self.price,
            fee: self.fee,
            total_amount: self.total_amount,
            created_at: now,
            updated_at: now,
        }
    }
}
