use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domains::quote::models::{
    CreateQuoteRequest, CreateQuoteResponse, CryptoAsset, FiatCurrency, Quote, QuoteCreate,
    QuoteStatus, TradeType, QUOTE_RETENTION_HOURS, QUOTE_VALIDITY_SECS,
};
use crate::domains::quote::services::balance_guard::BalanceGuard;
use crate::domains::quote::services::quote_calculator::QuoteCalculator;
use crate::domains::quote::store::QuoteStore;
use crate::shared::clients::{pair_label, PriceOracle};
use crate::shared::config::QuoteSettings;
use crate::shared::errors::QuoteError;
use crate::shared::utils::Clock;

/// 견적 서비스
/// Quote Service
///
/// 역할:
/// - 견적 생성 (가격 조회 → 참고용 잔고 조회 → 계산 → 저장)
/// - 견적 조회 (조회 전에 만료된 견적 정리)
/// - 만료 처리 (sweep), 일괄 삭제
///
/// 처리 흐름 (생성):
/// 1. 통화/자산/거래 방향/입력 형식 검증
/// 2. PriceOracle 로 현재 가격 조회 (실패 시 PriceUnavailable)
/// 3. BalanceGuard 로 가용 잔고 조회 (참고용, 부족해도 생성)
/// 4. QuoteCalculator 로 금액 계산
/// 5. expires_at = now + 15초 로 저장
#[derive(Clone)]
pub struct QuoteService {
    store: Arc<dyn QuoteStore>,
    oracle: Arc<dyn PriceOracle>,
    clock: Arc<dyn Clock>,
    calculator: QuoteCalculator,
    balance_guard: BalanceGuard,
    clear_includes_accepted: bool,
}

impl QuoteService {
    pub fn new(
        store: Arc<dyn QuoteStore>,
        oracle: Arc<dyn PriceOracle>,
        clock: Arc<dyn Clock>,
        settings: &QuoteSettings,
    ) -> Result<Self, QuoteError> {
        Ok(Self {
            balance_guard: BalanceGuard::new(store.clone()),
            store,
            oracle,
            clock,
            calculator: QuoteCalculator::new(settings.fee_rate)?,
            clear_includes_accepted: settings.clear_includes_accepted,
        })
    }

    /// 견적 생성
    /// Create a quote
    ///
    /// # Returns
    /// 저장된 견적과 참고용 잔고 부족 경고
    ///
    /// # Errors
    /// * `InvalidCurrency` / `InvalidAsset` / `InvalidInput` - 요청 형식 오류
    /// * `PriceUnavailable` - 가격 조회 재시도 모두 실패
    /// * `InvalidPrice` - 조회된 가격이 0 이하
    pub async fn create_quote(
        &self,
        user_id: u64,
        request: CreateQuoteRequest,
    ) -> Result<CreateQuoteResponse, QuoteError> {
        let currency: FiatCurrency = request.currency.parse()?;
        let crypto: CryptoAsset = request.crypto.parse()?;
        let trade_type: TradeType = request.trade_type.parse()?;
        let input = request.resolve_input()?;

        let price = self.oracle.price(crypto, currency).await.map_err(|e| {
            warn!(%crypto, %currency, error = %e, "Price lookup failed");
            QuoteError::PriceUnavailable {
                pair: pair_label(crypto, currency),
                reason: e.to_string(),
            }
        })?;

        let available = self
            .balance_guard
            .available_for(user_id, trade_type, currency, crypto)
            .await?;

        let breakdown =
            self.calculator
                .calculate(trade_type, price.price, input, Some(available))?;

        let created_at = self.clock.now();
        let quote = self
            .store
            .insert_quote(QuoteCreate {
                user_id,
                currency,
                crypto,
                trade_type,
                rate: price.price,
                input_kind: input.kind(),
                quantity: breakdown.quantity,
                gross_amount: breakdown.gross_amount,
                fee: breakdown.fee,
                fee_rate: breakdown.fee_rate,
                net_amount: breakdown.net_amount,
                created_at,
                expires_at: created_at + Duration::seconds(QUOTE_VALIDITY_SECS),
            })
            .await?;

        info!(
            quote_id = %quote.id,
            user_id,
            pair = %pair_label(crypto, currency),
            trade_type = %trade_type,
            net_amount = %quote.net_amount,
            "Quote created"
        );

        let message = if breakdown.insufficient_balance.is_some() {
            "Quote created; current balance does not cover it".to_string()
        } else {
            "Quote created successfully".to_string()
        };

        Ok(CreateQuoteResponse {
            quote,
            balance_warning: breakdown.insufficient_balance,
            message,
        })
    }

    /// 견적 목록 조회 (최신순)
    /// List quotes: sweep the caller's due quotes first, then apply retention
    ///
    /// - ACTIVE 이면서 만료되지 않은 견적
    /// - EXPIRED / ACCEPTED 중 최근 24시간 이내 생성된 견적
    pub async fn list_quotes(&self, user_id: u64) -> Result<Vec<Quote>, QuoteError> {
        let now = self.clock.now();
        self.store.expire_quotes(Some(user_id), now).await?;

        let retain_since = now - Duration::hours(QUOTE_RETENTION_HOURS);
        Ok(self.store.list_quotes(user_id, now, retain_since).await?)
    }

    /// 견적 단건 조회 (다른 사용자의 견적은 NotFound)
    pub async fn get_quote(&self, user_id: u64, quote_id: Uuid) -> Result<Quote, QuoteError> {
        self.store
            .expire_quotes(Some(user_id), self.clock.now())
            .await?;

        self.store
            .get_quote(quote_id)
            .await?
            .filter(|quote| quote.user_id == user_id)
            .ok_or_else(|| QuoteError::quote_not_found(quote_id))
    }

    /// 전체 사용자의 만료 대상 견적을 EXPIRED 로 변경
    /// Sweep every due ACTIVE quote; idempotent
    pub async fn sweep_expired(&self) -> Result<u64, QuoteError> {
        let expired = self.store.expire_quotes(None, self.clock.now()).await?;
        if expired > 0 {
            info!(expired, "Expired quotes swept");
        }
        Ok(expired)
    }

    /// 사용자의 견적 일괄 삭제
    /// Clear the caller's ACTIVE quotes (ACCEPTED too when configured)
    pub async fn clear_quotes(&self, user_id: u64) -> Result<u64, QuoteError> {
        let statuses: &[QuoteStatus] = if self.clear_includes_accepted {
            &[QuoteStatus::Active, QuoteStatus::Accepted]
        } else {
            &[QuoteStatus::Active]
        };

        let deleted = self.store.delete_quotes(user_id, statuses).await?;
        info!(user_id, deleted, "Quotes cleared");
        Ok(deleted)
    }
}
