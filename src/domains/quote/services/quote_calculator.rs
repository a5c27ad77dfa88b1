use rust_decimal::Decimal;

use crate::domains::quote::models::{BalanceShortfall, BalanceSide, QuoteInput, TradeType};
use crate::shared::errors::QuoteError;

/// 견적 계산 결과
/// Quote breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteBreakdown {
    pub quantity: Decimal,
    /// quantity × price
    pub gross_amount: Decimal,
    pub fee: Decimal,
    pub fee_rate: Decimal,
    /// BUY: gross + fee, SELL: gross - fee
    pub net_amount: Decimal,
    /// 참고용: 가용 잔고가 부족한 경우
    pub insufficient_balance: Option<BalanceShortfall>,
}

/// 계산 시 참고할 가용 잔고
/// Available balance on the side the trade draws from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Available {
    /// BUY: 법정화폐 코드, SELL: 암호화폐 코드
    pub code: &'static str,
    pub amount: Decimal,
}

/// 견적 계산기
/// Quote Calculator
///
/// 역할:
/// - 수량 기준(byQuantity) 또는 금액 기준(byAmount) 요청을
///   총액(gross), 수수료(fee), 정산액(net) 으로 변환
/// - 부수 효과 없음 (순수 함수)
///
/// 공식:
/// - byQuantity: gross = quantity × price, fee = gross × rate
/// - byAmount BUY: amount 는 구매자가 낼 총액(net)
///   gross = amount / (1 + rate), fee = amount - gross
/// - byAmount SELL: amount 는 수수료 차감 전 총액(gross)
///   fee = gross × rate, net = gross - fee
/// - 두 경우 모두 quantity = gross / price
#[derive(Debug, Clone, Copy)]
pub struct QuoteCalculator {
    fee_rate: Decimal,
}

impl QuoteCalculator {
    pub fn new(fee_rate: Decimal) -> Result<Self, QuoteError> {
        if fee_rate < Decimal::ZERO {
            return Err(QuoteError::InvalidFeeRate { rate: fee_rate });
        }
        Ok(Self { fee_rate })
    }

    pub fn fee_rate(&self) -> Decimal {
        self.fee_rate
    }

    /// 견적 계산
    /// Calculate a quote
    ///
    /// # Arguments
    /// * `trade_type` - BUY / SELL
    /// * `price` - 1 단위 가격 (0 보다 커야 함)
    /// * `input` - 수량 또는 금액 (0 보다 커야 함)
    /// * `available` - 가용 잔고 (있으면 부족 여부를 결과에 표시, 에러 아님)
    ///
    /// # Errors
    /// * `InvalidPrice` - price <= 0
    /// * `InvalidInput` - 수량/금액 <= 0, 계산된 quantity/gross/net <= 0,
    ///   또는 값이 너무 커서 계산 불가
    pub fn calculate(
        &self,
        trade_type: TradeType,
        price: Decimal,
        input: QuoteInput,
        available: Option<Available>,
    ) -> Result<QuoteBreakdown, QuoteError> {
        if price <= Decimal::ZERO {
            return Err(QuoteError::InvalidPrice { price });
        }

        let rate = self.fee_rate;

        let (quantity, gross, fee) = match input {
            QuoteInput::ByQuantity { quantity } => {
                ensure_positive("quantity", quantity)?;
                let gross = mul(quantity, price)?;
                let fee = mul(gross, rate)?;
                (quantity, gross, fee)
            }
            QuoteInput::ByAmount { amount } => {
                ensure_positive("amount", amount)?;
                let (gross, fee) = match trade_type {
                    TradeType::Buy => {
                        let gross = div(amount, Decimal::ONE + rate)?;
                        (gross, amount - gross)
                    }
                    TradeType::Sell => (amount, mul(amount, rate)?),
                };
                (div(gross, price)?, gross, fee)
            }
        };

        let net = match trade_type {
            TradeType::Buy => gross
                .checked_add(fee)
                .ok_or_else(|| QuoteError::InvalidInput("value is too large".to_string()))?,
            TradeType::Sell => gross - fee,
        };

        // 반올림으로 0 이 된 파생 값 거부
        ensure_derived_positive("quantity", quantity)?;
        ensure_derived_positive("gross amount", gross)?;
        ensure_derived_positive("net amount", net)?;

        let insufficient_balance = available.and_then(|available| match trade_type {
            TradeType::Buy => {
                BalanceShortfall::check(BalanceSide::Fiat, available.code, net, available.amount)
            }
            TradeType::Sell => BalanceShortfall::check(
                BalanceSide::Crypto,
                available.code,
                quantity,
                available.amount,
            ),
        });

        Ok(QuoteBreakdown {
            quantity: quantity.normalize(),
            gross_amount: gross.normalize(),
            fee: fee.normalize(),
            fee_rate: rate.normalize(),
            net_amount: net.normalize(),
            insufficient_balance,
        })
    }
}

fn ensure_positive(field: &str, value: Decimal) -> Result<(), QuoteError> {
    if value <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput(format!(
            "{} must be greater than 0, got {}",
            field, value
        )));
    }
    Ok(())
}

fn ensure_derived_positive(field: &str, value: Decimal) -> Result<(), QuoteError> {
    if value <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput(format!(
            "{} rounds to {}, the request is too small",
            field, value
        )));
    }
    Ok(())
}

fn mul(a: Decimal, b: Decimal) -> Result<Decimal, QuoteError> {
    a.checked_mul(b)
        .ok_or_else(|| QuoteError::InvalidInput("value is too large".to_string()))
}

fn div(a: Decimal, b: Decimal) -> Result<Decimal, QuoteError> {
    a.checked_div(b)
        .ok_or_else(|| QuoteError::InvalidInput("value cannot be divided".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn calculator() -> QuoteCalculator {
        QuoteCalculator::new(dec!(0.005)).unwrap()
    }

    #[test]
    fn test_buy_by_quantity_example() {
        // 0.1 BTC @ 65000 USD, 수수료 0.5%
        let breakdown = calculator()
            .calculate(
                TradeType::Buy,
                dec!(65000),
                QuoteInput::ByQuantity { quantity: dec!(0.1) },
                None,
            )
            .unwrap();

        assert_eq!(breakdown.gross_amount, dec!(6500));
        assert_eq!(breakdown.fee, dec!(32.5));
        assert_eq!(breakdown.net_amount, dec!(6532.5));
        assert!(breakdown.insufficient_balance.is_none());
    }

    #[test]
    fn test_sell_by_quantity() {
        let breakdown = calculator()
            .calculate(
                TradeType::Sell,
                dec!(65000),
                QuoteInput::ByQuantity { quantity: dec!(0.1) },
                None,
            )
            .unwrap();

        assert_eq!(breakdown.net_amount, dec!(6467.5));
    }

    #[test]
    fn test_buy_by_amount_treats_amount_as_total_paid() {
        let breakdown = calculator()
            .calculate(
                TradeType::Buy,
                dec!(65000),
                QuoteInput::ByAmount { amount: dec!(6532.5) },
                None,
            )
            .unwrap();

        assert_eq!(breakdown.net_amount, dec!(6532.5));
        assert_eq!(breakdown.gross_amount, dec!(6500));
        assert_eq!(breakdown.fee, dec!(32.5));
        assert_eq!(breakdown.quantity, dec!(0.1));
    }

    #[test]
    fn test_sell_by_amount_treats_amount_as_gross() {
        let breakdown = calculator()
            .calculate(
                TradeType::Sell,
                dec!(65000),
                QuoteInput::ByAmount { amount: dec!(6500) },
                None,
            )
            .unwrap();

        assert_eq!(breakdown.gross_amount, dec!(6500));
        assert_eq!(breakdown.fee, dec!(32.5));
        assert_eq!(breakdown.net_amount, dec!(6467.5));
        assert_eq!(breakdown.quantity, dec!(0.1));
    }

    #[test]
    fn test_insufficient_balance_is_advisory() {
        let breakdown = calculator()
            .calculate(
                TradeType::Buy,
                dec!(65000),
                QuoteInput::ByQuantity { quantity: dec!(0.1) },
                Some(Available { code: "USD", amount: dec!(6000) }),
            )
            .unwrap();

        let shortfall = breakdown.insufficient_balance.unwrap();
        assert_eq!(shortfall.side, BalanceSide::Fiat);
        assert_eq!(shortfall.required, dec!(6532.5));
        assert_eq!(shortfall.shortfall, dec!(532.5));

        // SELL 은 암호화폐 수량 기준
        let breakdown = calculator()
            .calculate(
                TradeType::Sell,
                dec!(65000),
                QuoteInput::ByQuantity { quantity: dec!(0.1) },
                Some(Available { code: "BTC", amount: dec!(0.05) }),
            )
            .unwrap();
        let shortfall = breakdown.insufficient_balance.unwrap();
        assert_eq!(shortfall.side, BalanceSide::Crypto);
        assert_eq!(shortfall.shortfall, dec!(0.05));
    }

    #[test]
    fn test_invalid_inputs() {
        let calc = calculator();
        let input = QuoteInput::ByQuantity { quantity: dec!(1) };

        assert!(matches!(
            calc.calculate(TradeType::Buy, dec!(0), input, None),
            Err(QuoteError::InvalidPrice { .. })
        ));
        assert!(matches!(
            calc.calculate(TradeType::Buy, dec!(-5), input, None),
            Err(QuoteError::InvalidPrice { .. })
        ));
        assert!(matches!(
            calc.calculate(
                TradeType::Buy,
                dec!(100),
                QuoteInput::ByQuantity { quantity: dec!(0) },
                None
            ),
            Err(QuoteError::InvalidInput(_))
        ));
        assert!(matches!(
            calc.calculate(
                TradeType::Sell,
                dec!(100),
                QuoteInput::ByAmount { amount: dec!(-1) },
                None
            ),
            Err(QuoteError::InvalidInput(_))
        ));
        assert!(matches!(
            QuoteCalculator::new(dec!(-0.01)),
            Err(QuoteError::InvalidFeeRate { .. })
        ));
    }

    #[test]
    fn test_amount_too_small_for_any_quantity() {
        // 1e-24 USD / 65000 는 28 자리 정밀도에서 0 으로 반올림됨
        let tiny = Decimal::new(1, 24);
        for trade_type in [TradeType::Buy, TradeType::Sell] {
            let result = calculator().calculate(
                trade_type,
                dec!(65000),
                QuoteInput::ByAmount { amount: tiny },
                None,
            );
            assert!(
                matches!(result, Err(QuoteError::InvalidInput(_))),
                "{:?} accepted a zero-quantity quote",
                trade_type
            );
        }
    }

    #[test]
    fn test_fee_rate_of_one_leaves_nothing_to_sell() {
        let calc = QuoteCalculator::new(Decimal::ONE).unwrap();
        let result = calc.calculate(
            TradeType::Sell,
            dec!(100),
            QuoteInput::ByQuantity { quantity: dec!(1) },
            None,
        );
        assert!(matches!(result, Err(QuoteError::InvalidInput(_))));
    }

    #[test]
    fn test_zero_fee_rate() {
        let calc = QuoteCalculator::new(Decimal::ZERO).unwrap();
        let breakdown = calc
            .calculate(
                TradeType::Buy,
                dec!(100),
                QuoteInput::ByAmount { amount: dec!(50) },
                None,
            )
            .unwrap();

        assert_eq!(breakdown.fee, Decimal::ZERO);
        assert_eq!(breakdown.gross_amount, breakdown.net_amount);
        assert_eq!(breakdown.quantity, dec!(0.5));
    }

    #[test]
    fn test_overflow_is_an_input_error() {
        let result = calculator().calculate(
            TradeType::Buy,
            Decimal::MAX,
            QuoteInput::ByQuantity { quantity: Decimal::MAX },
            None,
        );
        assert!(matches!(result, Err(QuoteError::InvalidInput(_))));
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 속성 테스트 (Property tests)
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..1_000_000_000, 0u32..=8).prop_map(|(n, scale)| Decimal::new(n, scale))
    }

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..10_000_000, 0u32..=2).prop_map(|(n, scale)| Decimal::new(n, scale))
    }

    fn fee_rate_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=1000).prop_map(|n| Decimal::new(n, 4))
    }

    fn close(a: Decimal, b: Decimal) -> bool {
        let tolerance = dec!(0.000000000001) * Decimal::ONE.max(b.abs());
        (a - b).abs() <= tolerance
    }

    proptest! {
        #[test]
        fn prop_round_trip_by_amount_recovers_quantity(
            quantity in quantity_strategy(),
            price in price_strategy(),
            rate in fee_rate_strategy(),
            is_buy in any::<bool>(),
        ) {
            let calc = QuoteCalculator::new(rate).unwrap();
            let trade_type = if is_buy { TradeType::Buy } else { TradeType::Sell };

            let by_quantity = calc
                .calculate(trade_type, price, QuoteInput::ByQuantity { quantity }, None)
                .unwrap();

            // BUY 는 net(총 지불액), SELL 은 gross 를 금액으로 다시 요청
            let amount = match trade_type {
                TradeType::Buy => by_quantity.net_amount,
                TradeType::Sell => by_quantity.gross_amount,
            };
            let by_amount = calc
                .calculate(trade_type, price, QuoteInput::ByAmount { amount }, None)
                .unwrap();

            prop_assert!(close(by_amount.quantity, quantity),
                "quantity {} != {}", by_amount.quantity, quantity);
            prop_assert!(close(by_amount.gross_amount, by_quantity.gross_amount));
            prop_assert!(close(by_amount.fee, by_quantity.fee));
            prop_assert!(close(by_amount.net_amount, by_quantity.net_amount));
        }

        #[test]
        fn prop_fee_sign(
            quantity in quantity_strategy(),
            price in price_strategy(),
            rate in fee_rate_strategy(),
            by_amount in any::<bool>(),
        ) {
            let calc = QuoteCalculator::new(rate).unwrap();
            let input = if by_amount {
                QuoteInput::ByAmount { amount: quantity }
            } else {
                QuoteInput::ByQuantity { quantity }
            };

            let buy = calc.calculate(TradeType::Buy, price, input, None).unwrap();
            prop_assert!(buy.fee >= Decimal::ZERO);
            prop_assert!(buy.net_amount >= buy.gross_amount);

            let sell = calc.calculate(TradeType::Sell, price, input, None).unwrap();
            prop_assert!(sell.fee >= Decimal::ZERO);
            prop_assert!(sell.net_amount <= sell.gross_amount);
        }
    }
}
