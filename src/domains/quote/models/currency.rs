use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::errors::QuoteError;

// =====================================================
// 통화/자산 코드
// =====================================================
// 역할: 견적 요청에서 허용하는 법정화폐/암호화폐 코드 목록
// 설명: 요청은 문자열로 들어오고, 여기서 열거형으로 파싱합니다.
//       목록에 없는 코드는 InvalidCurrency / InvalidAsset 에러
//
// 예시:
// - "usd" → FiatCurrency::Usd
// - "btc" → CryptoAsset::Btc
// - "XYZ" → QuoteError::InvalidAsset
// =====================================================

/// 법정화폐 코드
/// Fiat currency code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum FiatCurrency {
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
    Jpy,
    Chf,
    Sgd,
}

impl FiatCurrency {
    pub const ALL: [FiatCurrency; 8] = [
        FiatCurrency::Usd,
        FiatCurrency::Eur,
        FiatCurrency::Gbp,
        FiatCurrency::Cad,
        FiatCurrency::Aud,
        FiatCurrency::Jpy,
        FiatCurrency::Chf,
        FiatCurrency::Sgd,
    ];

    /// DB/응답에 쓰는 대문자 코드
    /// Uppercase code used in the database and responses
    pub fn as_str(&self) -> &'static str {
        match self {
            FiatCurrency::Usd => "USD",
            FiatCurrency::Eur => "EUR",
            FiatCurrency::Gbp => "GBP",
            FiatCurrency::Cad => "CAD",
            FiatCurrency::Aud => "AUD",
            FiatCurrency::Jpy => "JPY",
            FiatCurrency::Chf => "CHF",
            FiatCurrency::Sgd => "SGD",
        }
    }

    /// 가격 API에서 쓰는 소문자 코드 (vs_currencies 파라미터)
    pub fn oracle_code(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

impl FromStr for FiatCurrency {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        FiatCurrency::ALL
            .into_iter()
            .find(|c| c.as_str() == code)
            .ok_or_else(|| QuoteError::InvalidCurrency { code: s.to_string() })
    }
}

impl fmt::Display for FiatCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 암호화폐 코드
/// Crypto asset code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum CryptoAsset {
    Btc,
    Eth,
    Usdt,
    Usdc,
    Sol,
    Xrp,
    Ada,
    Doge,
}

impl CryptoAsset {
    pub const ALL: [CryptoAsset; 8] = [
        CryptoAsset::Btc,
        CryptoAsset::Eth,
        CryptoAsset::Usdt,
        CryptoAsset::Usdc,
        CryptoAsset::Sol,
        CryptoAsset::Xrp,
        CryptoAsset::Ada,
        CryptoAsset::Doge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CryptoAsset::Btc => "BTC",
            CryptoAsset::Eth => "ETH",
            CryptoAsset::Usdt => "USDT",
            CryptoAsset::Usdc => "USDC",
            CryptoAsset::Sol => "SOL",
            CryptoAsset::Xrp => "XRP",
            CryptoAsset::Ada => "ADA",
            CryptoAsset::Doge => "DOGE",
        }
    }

    /// 가격 API의 코인 ID (CoinGecko `ids` 파라미터)
    /// Coin id used by the price API
    pub fn oracle_id(&self) -> &'static str {
        match self {
            CryptoAsset::Btc => "bitcoin",
            CryptoAsset::Eth => "ethereum",
            CryptoAsset::Usdt => "tether",
            CryptoAsset::Usdc => "usd-coin",
            CryptoAsset::Sol => "solana",
            CryptoAsset::Xrp => "ripple",
            CryptoAsset::Ada => "cardano",
            CryptoAsset::Doge => "dogecoin",
        }
    }
}

impl FromStr for CryptoAsset {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        CryptoAsset::ALL
            .into_iter()
            .find(|a| a.as_str() == code)
            .ok_or_else(|| QuoteError::InvalidAsset { code: s.to_string() })
    }
}

impl fmt::Display for CryptoAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
