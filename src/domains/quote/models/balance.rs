use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::currency::{CryptoAsset, FiatCurrency};

// =====================================================
// Balance 모델 (법정화폐 / 암호화폐)
// =====================================================
// 역할: 사용자 자산 잔고
// 설명: (사용자, 통화) 조합마다 한 행, 유니크 제약
//
// 주의:
// - 견적 생성 시에는 잔고를 잠그지 않음 (참고용 확인만)
// - 견적 수락 시 다시 확인 (BUY: 법정화폐, SELL: 암호화폐)
// - 입금/출금/정산은 이 서비스 범위 밖
// =====================================================

/// 법정화폐 잔고
/// Fiat balance row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = FiatBalance)]
pub struct FiatBalance {
    pub user_id: u64,

    pub currency: FiatCurrency,

    #[schema(value_type = String, example = "10000.00")]
    pub balance: Decimal,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// 암호화폐 잔고
/// Crypto balance row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = CryptoBalance)]
pub struct CryptoBalance {
    pub user_id: u64,

    pub asset: CryptoAsset,

    #[schema(value_type = String, example = "0.5")]
    pub balance: Decimal,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// 부족한 잔고의 종류
/// Which side of the trade is short
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BalanceSide {
    /// BUY: 법정화폐가 부족
    Fiat,
    /// SELL: 암호화폐가 부족
    Crypto,
}

/// 잔고 부족 정보 (참고용 경고 및 InsufficientFunds 에러에 사용)
/// Balance shortfall details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = BalanceShortfall)]
pub struct BalanceShortfall {
    pub side: BalanceSide,

    /// Fiat code or crypto code of the short balance
    /// 부족한 잔고의 통화 코드
    #[schema(example = "USD")]
    pub code: String,

    #[schema(value_type = String, example = "6532.5")]
    pub required: Decimal,

    /// Missing balance rows count as zero
    /// 잔고 행이 없으면 0
    #[schema(value_type = String, example = "6000")]
    pub available: Decimal,

    /// required - available
    #[schema(value_type = String, example = "532.5")]
    pub shortfall: Decimal,
}

impl BalanceShortfall {
    /// 필요량이 가용량보다 크면 부족 정보 반환
    /// Returns a shortfall when `required` exceeds `available`
    pub fn check(
        side: BalanceSide,
        code: &str,
        required: Decimal,
        available: Decimal,
    ) -> Option<Self> {
        if available >= required {
            return None;
        }

        Some(Self {
            side,
            code: code.to_string(),
            required,
            available,
            shortfall: required - available,
        })
    }
}

// =====================================================
// 잔고 응답 (Balance Response)
// =====================================================
/// 사용자 잔고 목록 응답 모델
/// Balances response model
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = BalancesResponse)]
pub struct BalancesResponse {
    pub fiat: Vec<FiatBalance>,
    pub crypto: Vec<CryptoBalance>,
}
