// =====================================================
// 애플리케이션 설정 (Application Configuration)
// =====================================================
// 역할: 환경 변수에서 서버 설정을 읽어옴
//
// 환경 변수:
// - BIND_ADDR                      기본값 0.0.0.0:3002
// - DATABASE_URL                   없으면 인메모리 저장소 사용
// - JWT_SECRET                     없으면 개발용 기본값
// - CORS_ORIGIN                    기본값 http://localhost:3003
// - LOG_LEVEL                      기본값 info (RUST_LOG 가 우선)
// - QUOTE_FEE_RATE                 기본값 0.005
// - QUOTE_CLEAR_INCLUDES_ACCEPTED  기본값 false
// - QUOTE_SWEEP_INTERVAL_SECS      기본값 5, 0 이면 백그라운드 정리 끔
// - PRICE_ORACLE_URL               기본값 CoinGecko API
// - PRICE_ORACLE_TIMEOUT_MS        기본값 3000
// - PRICE_ORACLE_MAX_ATTEMPTS      기본값 3
// - PRICE_ORACLE_RETRY_DELAY_MS    기본값 250
// - PRICE_ORACLE_BACKOFF           fixed | linear, 기본값 fixed
//
// 테스트에서는 from_lookup 에 HashMap 을 넘겨서 프로세스 환경을 건드리지 않음
// =====================================================

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::shared::utils::{Backoff, RetryPolicy};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3002";
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3003";
pub const DEFAULT_ORACLE_URL: &str = "https://api.coingecko.com/api/v3";

/// 기본 수수료율 0.5%
pub const DEFAULT_FEE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// 견적 관련 설정
/// Quote workflow settings
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSettings {
    pub fee_rate: Decimal,
    /// 일괄 삭제 시 ACCEPTED 견적도 삭제 (이전 동작)
    pub clear_includes_accepted: bool,
    /// 백그라운드 만료 정리 주기 (None 이면 실행하지 않음)
    pub sweep_interval: Option<Duration>,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            fee_rate: DEFAULT_FEE_RATE,
            clear_includes_accepted: false,
            sweep_interval: Some(Duration::from_secs(5)),
        }
    }
}

/// 가격 조회 설정
/// Price oracle settings
#[derive(Debug, Clone, PartialEq)]
pub struct OracleSettings {
    pub base_url: String,
    /// 요청 1회당 타임아웃
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ORACLE_URL.to_string(),
            timeout: Duration::from_millis(3000),
            retry: RetryPolicy::default(),
        }
    }
}

/// 전체 서버 설정
/// Server configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub cors_origin: String,
    pub log_level: String,
    pub quote: QuoteSettings,
    pub oracle: OracleSettings,
}

impl AppConfig {
    /// 프로세스 환경 변수에서 설정 읽기
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 조회 함수로 설정 읽기 (빈 문자열은 없는 값으로 취급)
    /// Load configuration through a key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let fee_rate = parse_or(&get, "QUOTE_FEE_RATE", DEFAULT_FEE_RATE)?;
        anyhow::ensure!(
            fee_rate >= Decimal::ZERO,
            "QUOTE_FEE_RATE must not be negative, got {}",
            fee_rate
        );

        let clear_includes_accepted = match get("QUOTE_CLEAR_INCLUDES_ACCEPTED") {
            Some(value) => parse_bool(&value)
                .with_context(|| format!("Invalid QUOTE_CLEAR_INCLUDES_ACCEPTED: {}", value))?,
            None => false,
        };

        let sweep_interval_secs: u64 = parse_or(&get, "QUOTE_SWEEP_INTERVAL_SECS", 5)?;

        let timeout_ms: u64 = parse_or(&get, "PRICE_ORACLE_TIMEOUT_MS", 3000)?;
        anyhow::ensure!(timeout_ms > 0, "PRICE_ORACLE_TIMEOUT_MS must be positive");

        let max_attempts: u32 = parse_or(&get, "PRICE_ORACLE_MAX_ATTEMPTS", 3)?;
        anyhow::ensure!(
            max_attempts >= 1,
            "PRICE_ORACLE_MAX_ATTEMPTS must be at least 1"
        );

        let retry_delay_ms: u64 = parse_or(&get, "PRICE_ORACLE_RETRY_DELAY_MS", 250)?;

        let backoff = match get("PRICE_ORACLE_BACKOFF").as_deref() {
            None => Backoff::Fixed,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "fixed" => Backoff::Fixed,
                "linear" => Backoff::Linear,
                other => anyhow::bail!(
                    "PRICE_ORACLE_BACKOFF must be 'fixed' or 'linear', got '{}'",
                    other
                ),
            },
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: get("DATABASE_URL"),
            jwt_secret: get("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            quote: QuoteSettings {
                fee_rate,
                clear_includes_accepted,
                sweep_interval: (sweep_interval_secs > 0)
                    .then(|| Duration::from_secs(sweep_interval_secs)),
            },
            oracle: OracleSettings {
                base_url: get("PRICE_ORACLE_URL")
                    .unwrap_or_else(|| DEFAULT_ORACLE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                timeout: Duration::from_millis(timeout_ms),
                retry: RetryPolicy {
                    max_attempts,
                    delay: Duration::from_millis(retry_delay_ms),
                    backoff,
                },
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid {}='{}': {}", key, value, e)),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}
