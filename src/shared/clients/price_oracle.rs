use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::domains::quote::models::{CryptoAsset, FiatCurrency};
use crate::shared::config::OracleSettings;
use crate::shared::utils::{retry, RetryPolicy};

// =====================================================
// 가격 조회 클라이언트 (Price Oracle)
// =====================================================
// 역할: (암호화폐, 법정화폐) 쌍의 현재 가격 조회
//
// 구현:
// - HttpPriceOracle: CoinGecko 형식의 simple/price API 호출
//   GET {base}/simple/price?ids=bitcoin&vs_currencies=usd&include_last_updated_at=true
//   응답: {"bitcoin": {"usd": 65000.12, "last_updated_at": 1760000000}}
// - StaticPriceOracle: 고정 가격 (테스트, 로컬 실행용)
//
// 재시도:
// - 요청 1회마다 타임아웃
// - 전송 실패, 5xx, 429 만 재시도 (RetryPolicy)
// - 응답 형식 오류, 지원하지 않는 쌍은 즉시 실패
// =====================================================

/// 조회된 가격
/// Price of one unit of crypto in fiat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub price: Decimal,
    pub as_of: DateTime<Utc>,
}

/// 가격 조회 에러
/// Price oracle errors
#[derive(Error, Debug)]
pub enum OracleError {
    /// 연결 실패, 타임아웃 등
    #[error("Price oracle request failed: {0}")]
    Transport(String),

    #[error("Price oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed price oracle response: {0}")]
    Malformed(String),

    /// 응답에 해당 쌍의 가격이 없음
    #[error("No price for {pair}")]
    UnsupportedPair { pair: String },
}

impl OracleError {
    /// 재시도해 볼 만한 에러인지
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            OracleError::Transport(_) => true,
            OracleError::Status { status, .. } => *status == 429 || *status >= 500,
            OracleError::Malformed(_) | OracleError::UnsupportedPair { .. } => false,
        }
    }
}

/// 가격 조회 인터페이스
/// Price oracle seam
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn price(
        &self,
        asset: CryptoAsset,
        currency: FiatCurrency,
    ) -> Result<PriceQuote, OracleError>;
}

/// "BTC/USD" 형식 표기
pub fn pair_label(asset: CryptoAsset, currency: FiatCurrency) -> String {
    format!("{}/{}", asset, currency)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HTTP 구현 (CoinGecko simple/price)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// CoinGecko 형식 API 클라이언트
/// HTTP price oracle for CoinGecko-compatible `simple/price` endpoints
pub struct HttpPriceOracle {
    http_client: reqwest::Client,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl HttpPriceOracle {
    pub fn new(settings: &OracleSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent("quote-server/1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            retry_policy: settings.retry,
        })
    }

    /// 한 번만 요청
    /// Single request without retries
    async fn fetch_once(
        &self,
        asset: CryptoAsset,
        currency: FiatCurrency,
    ) -> Result<PriceQuote, OracleError> {
        let url = format!("{}/simple/price", self.base_url);
        let vs_currency = currency.oracle_code();

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("ids", asset.oracle_id()),
                ("vs_currencies", vs_currency.as_str()),
                ("include_last_updated_at", "true"),
            ])
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        parse_simple_price(&body, asset, currency, Utc::now())
    }
}

#[async_trait]
impl PriceOracle for HttpPriceOracle {
    async fn price(
        &self,
        asset: CryptoAsset,
        currency: FiatCurrency,
    ) -> Result<PriceQuote, OracleError> {
        let quote = retry(
            &self.retry_policy,
            |attempt| {
                debug!(%asset, %currency, attempt, "Requesting price");
                self.fetch_once(asset, currency)
            },
            OracleError::is_retryable,
        )
        .await?;

        info!(%asset, %currency, price = %quote.price, "Price fetched");
        Ok(quote)
    }
}

/// simple/price 응답에서 가격 추출
/// Extract the price for one pair from a `simple/price` response body.
/// `fetched_at` is used when the body carries no `last_updated_at`.
pub fn parse_simple_price(
    body: &Value,
    asset: CryptoAsset,
    currency: FiatCurrency,
    fetched_at: DateTime<Utc>,
) -> Result<PriceQuote, OracleError> {
    let entry = body
        .as_object()
        .ok_or_else(|| OracleError::Malformed("expected a JSON object".to_string()))?
        .get(asset.oracle_id())
        .ok_or_else(|| OracleError::UnsupportedPair {
            pair: pair_label(asset, currency),
        })?;

    let price = match entry.get(currency.oracle_code()) {
        Some(Value::Number(number)) => decimal_from_json_number(&number.to_string())?,
        Some(Value::String(text)) => decimal_from_json_number(text)?,
        Some(other) => {
            return Err(OracleError::Malformed(format!(
                "price is not a number: {}",
                other
            )));
        }
        None => {
            return Err(OracleError::UnsupportedPair {
                pair: pair_label(asset, currency),
            });
        }
    };

    let as_of = entry
        .get("last_updated_at")
        .and_then(Value::as_i64)
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or(fetched_at);

    Ok(PriceQuote { price, as_of })
}

// serde_json 은 큰 값/작은 값을 지수 표기로 출력할 수 있음 (예: 1.2e-7)
fn decimal_from_json_number(text: &str) -> Result<Decimal, OracleError> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map(|d| d.normalize())
        .map_err(|e| OracleError::Malformed(format!("invalid price '{}': {}", text, e)))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 고정 가격 구현 (테스트 / 로컬)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 고정 가격 오라클
/// In-process price table
#[derive(Default)]
pub struct StaticPriceOracle {
    prices: RwLock<HashMap<(CryptoAsset, FiatCurrency), Decimal>>,
}

impl StaticPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(self, asset: CryptoAsset, currency: FiatCurrency, price: Decimal) -> Self {
        self.set_price(asset, currency, price);
        self
    }

    pub fn set_price(&self, asset: CryptoAsset, currency: FiatCurrency, price: Decimal) {
        self.prices.write().insert((asset, currency), price);
    }

    pub fn remove_price(&self, asset: CryptoAsset, currency: FiatCurrency) {
        self.prices.write().remove(&(asset, currency));
    }
}

#[async_trait]
impl PriceOracle for StaticPriceOracle {
    async fn price(
        &self,
        asset: CryptoAsset,
        currency: FiatCurrency,
    ) -> Result<PriceQuote, OracleError> {
        self.prices
            .read()
            .get(&(asset, currency))
            .map(|price| PriceQuote {
                price: *price,
                as_of: Utc::now(),
            })
            .ok_or_else(|| OracleError::UnsupportedPair {
                pair: pair_label(asset, currency),
            })
    }
}
