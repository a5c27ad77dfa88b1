use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::domains::quote::models::{
    BalanceShortfall, BalanceSide, BalancesResponse, CryptoAsset, FiatCurrency, Quote, TradeType,
};
use crate::domains::quote::services::quote_calculator::Available;
use crate::domains::quote::store::QuoteStore;
use crate::shared::errors::QuoteError;

/// 수락 시 필요한 금액
/// Funds a quote needs at acceptance time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequiredFunds {
    /// BUY: 법정화폐로 지불할 총액
    pub net_amount: Decimal,
    /// SELL: 팔 암호화폐 수량
    pub quantity: Decimal,
}

impl From<&Quote> for RequiredFunds {
    fn from(quote: &Quote) -> Self {
        Self {
            net_amount: quote.net_amount,
            quantity: quote.quantity,
        }
    }
}

/// 잔고 확인기
/// Balance Guard
///
/// 역할:
/// - 견적 생성 시: 참고용 가용 잔고 조회 (에러 아님)
/// - 견적 수락 시: 잔고 확인 (부족하면 InsufficientFunds)
///
/// 잔고를 잠그거나 차감하지 않습니다.
/// 참고용 조회에서는 잔고 행이 없으면 0 으로 취급하고,
/// 수락 시 확인에서는 행이 없으면 잔고 부족입니다.
#[derive(Clone)]
pub struct BalanceGuard {
    store: Arc<dyn QuoteStore>,
}

impl BalanceGuard {
    pub fn new(store: Arc<dyn QuoteStore>) -> Self {
        Self { store }
    }

    /// 거래가 사용하는 쪽의 잔고 행 (없으면 None)
    async fn balance_row(
        &self,
        user_id: u64,
        trade_type: TradeType,
        currency: FiatCurrency,
        asset: CryptoAsset,
    ) -> Result<(&'static str, Option<Decimal>), QuoteError> {
        let row = match trade_type {
            TradeType::Buy => (
                currency.as_str(),
                self.store.fiat_balance(user_id, currency).await?,
            ),
            TradeType::Sell => (
                asset.as_str(),
                self.store.crypto_balance(user_id, asset).await?,
            ),
        };
        Ok(row)
    }

    /// 거래가 사용하는 쪽의 가용 잔고 (참고용, 행이 없으면 0)
    /// BUY: 법정화폐 `currency`, SELL: 암호화폐 `asset`
    pub async fn available_for(
        &self,
        user_id: u64,
        trade_type: TradeType,
        currency: FiatCurrency,
        asset: CryptoAsset,
    ) -> Result<Available, QuoteError> {
        let (code, balance) = self
            .balance_row(user_id, trade_type, currency, asset)
            .await?;

        Ok(Available {
            code,
            amount: balance.unwrap_or(Decimal::ZERO),
        })
    }

    /// 잔고 확인 (수락 시)
    /// Authoritative funds check
    ///
    /// # Errors
    /// * `InsufficientFunds` - 잔고 행이 없음,
    ///   BUY: 법정화폐 잔고 < net_amount, SELL: 암호화폐 잔고 < quantity
    pub async fn check_funds(
        &self,
        user_id: u64,
        trade_type: TradeType,
        currency: FiatCurrency,
        asset: CryptoAsset,
        required: RequiredFunds,
    ) -> Result<(), QuoteError> {
        let (code, balance) = self
            .balance_row(user_id, trade_type, currency, asset)
            .await?;

        let (side, required) = match trade_type {
            TradeType::Buy => (BalanceSide::Fiat, required.net_amount),
            TradeType::Sell => (BalanceSide::Crypto, required.quantity),
        };

        let shortfall = match balance {
            Some(amount) => BalanceShortfall::check(side, code, required, amount),
            None => Some(BalanceShortfall {
                side,
                code: code.to_string(),
                required,
                available: Decimal::ZERO,
                shortfall: required,
            }),
        };

        match shortfall {
            Some(shortfall) => {
                debug!(
                    user_id,
                    code,
                    has_row = balance.is_some(),
                    required = %shortfall.required,
                    available = %shortfall.available,
                    "Insufficient funds"
                );
                Err(QuoteError::InsufficientFunds(shortfall))
            }
            None => Ok(()),
        }
    }

    /// 사용자 잔고 전체 조회 (없는 행은 0 으로 생성)
    pub async fn list_balances(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<BalancesResponse, QuoteError> {
        let (fiat, crypto) = self.store.list_balances(user_id, now).await?;
        Ok(BalancesResponse { fiat, crypto })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::quote::store::InMemoryQuoteStore;
    use rust_decimal_macros::dec;

    const USER_ID: u64 = 7;

    fn guard_with(store: &Arc<InMemoryQuoteStore>) -> BalanceGuard {
        BalanceGuard::new(store.clone())
    }

    fn required(net_amount: Decimal, quantity: Decimal) -> RequiredFunds {
        RequiredFunds { net_amount, quantity }
    }

    #[tokio::test]
    async fn test_missing_row_fails_even_when_nothing_is_required() {
        let store = Arc::new(InMemoryQuoteStore::new());
        let guard = guard_with(&store);

        let result = guard
            .check_funds(
                USER_ID,
                TradeType::Sell,
                FiatCurrency::Usd,
                CryptoAsset::Btc,
                required(dec!(0), dec!(0)),
            )
            .await;

        match result {
            Err(QuoteError::InsufficientFunds(shortfall)) => {
                assert_eq!(shortfall.side, BalanceSide::Crypto);
                assert_eq!(shortfall.code, "BTC");
                assert_eq!(shortfall.available, Decimal::ZERO);
            }
            other => panic!("expected InsufficientFunds, got {:?}", other),
        }

        // 참고용 조회는 같은 상황에서 0 반환
        let available = guard
            .available_for(USER_ID, TradeType::Sell, FiatCurrency::Usd, CryptoAsset::Btc)
            .await
            .unwrap();
        assert_eq!(available.amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_existing_row_is_compared_against_required() {
        let store = Arc::new(InMemoryQuoteStore::new());
        store.set_fiat_balance(USER_ID, FiatCurrency::Usd, dec!(6532.5));
        let guard = guard_with(&store);

        // 잔고 == 필요 금액이면 통과
        guard
            .check_funds(
                USER_ID,
                TradeType::Buy,
                FiatCurrency::Usd,
                CryptoAsset::Btc,
                required(dec!(6532.5), dec!(0.1)),
            )
            .await
            .unwrap();

        let result = guard
            .check_funds(
                USER_ID,
                TradeType::Buy,
                FiatCurrency::Usd,
                CryptoAsset::Btc,
                required(dec!(6532.6), dec!(0.1)),
            )
            .await;
        match result {
            Err(QuoteError::InsufficientFunds(shortfall)) => {
                assert_eq!(shortfall.side, BalanceSide::Fiat);
                assert_eq!(shortfall.shortfall, dec!(0.1));
            }
            other => panic!("expected InsufficientFunds, got {:?}", other),
        }
    }
}
