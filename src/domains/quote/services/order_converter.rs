use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domains::quote::models::{Order, OrderCreate, QuoteStatus};
use crate::domains::quote::services::balance_guard::{BalanceGuard, RequiredFunds};
use crate::domains::quote::store::QuoteStore;
use crate::shared::errors::QuoteError;
use crate::shared::utils::{Clock, OrderReferenceGenerator};

/// 견적 → 주문 변환기
/// Order Converter
///
/// 역할:
/// - 만료 전 ACTIVE 견적을 수락하고 주문을 생성
/// - 견적 상태 변경과 주문 생성은 저장소에서 하나의 트랜잭션으로 처리
///
/// 처리 과정:
/// 1. 견적 조회 (없거나 다른 사용자 것이면 NotFound)
/// 2. ACTIVE 가 아니거나 만료되었으면 InvalidState
/// 3. BalanceGuard 잔고 확인 (부족하면 InsufficientFunds)
/// 4. 조건부 전이 + 주문 생성 (0 행이면 InvalidState, 그 외 실패는 Internal)
///
/// 잔고는 차감하지 않습니다 (정산은 별도 프로세스).
/// 실패한 전이는 재시도하지 않습니다.
#[derive(Clone)]
pub struct OrderConverter {
    store: Arc<dyn QuoteStore>,
    clock: Arc<dyn Clock>,
    balance_guard: BalanceGuard,
}

impl OrderConverter {
    pub fn new(store: Arc<dyn QuoteStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            balance_guard: BalanceGuard::new(store.clone()),
            store,
            clock,
        }
    }

    /// 견적 수락
    /// Accept a quote and create its order
    pub async fn accept_quote(&self, user_id: u64, quote_id: Uuid) -> Result<Order, QuoteError> {
        let quote = self
            .store
            .get_quote(quote_id)
            .await?
            .filter(|quote| quote.user_id == user_id)
            .ok_or_else(|| QuoteError::quote_not_found(quote_id))?;

        let now = self.clock.now();

        if quote.status != QuoteStatus::Active {
            return Err(QuoteError::InvalidState(format!(
                "Quote is {}, only ACTIVE quotes can be accepted",
                quote.status
            )));
        }
        if quote.is_expired_at(now) {
            return Err(QuoteError::InvalidState("Quote expired".to_string()));
        }

        self.balance_guard
            .check_funds(
                user_id,
                quote.trade_type,
                quote.currency,
                quote.crypto,
                RequiredFunds::from(&quote),
            )
            .await?;

        let order_create = OrderCreate::from_quote(&quote, OrderReferenceGenerator::next(now));

        let order = self
            .store
            .accept_quote(quote_id, user_id, now, order_create)
            .await
            .map_err(|e| {
                let error = QuoteError::from(e);
                warn!(%quote_id, user_id, %error, "Quote acceptance rolled back");
                error
            })?
            .ok_or_else(|| {
                // 확인 이후 다른 요청이 먼저 수락했거나 만료됨
                QuoteError::InvalidState("Quote is no longer active".to_string())
            })?;

        info!(
            %quote_id,
            order_id = %order.id,
            reference = %order.reference,
            user_id,
            "Quote accepted"
        );

        Ok(order)
    }
}
