// Quote domain state
// 견적 도메인 상태
use std::sync::Arc;

use crate::domains::quote::services::{BalanceGuard, OrderConverter, OrderService, QuoteService};
use crate::domains::quote::store::QuoteStore;
use crate::shared::clients::PriceOracle;
use crate::shared::config::QuoteSettings;
use crate::shared::errors::QuoteError;
use crate::shared::utils::Clock;

/// Quote domain state
/// 견적 도메인에서 필요한 서비스들을 포함하는 상태
///
/// 모든 서비스는 같은 저장소/시계 인스턴스를 공유합니다.
#[derive(Clone)]
pub struct QuoteState {
    pub quote_service: QuoteService,
    pub order_converter: OrderConverter,
    pub order_service: OrderService,
    pub balance_guard: BalanceGuard,
    pub clock: Arc<dyn Clock>,
}

impl QuoteState {
    /// Create QuoteState
    /// QuoteState 생성 (저장소, 가격 오라클, 시계 필요)
    pub fn new(
        store: Arc<dyn QuoteStore>,
        oracle: Arc<dyn PriceOracle>,
        clock: Arc<dyn Clock>,
        settings: &QuoteSettings,
    ) -> Result<Self, QuoteError> {
        Ok(Self {
            quote_service: QuoteService::new(store.clone(), oracle, clock.clone(), settings)?,
            order_converter: OrderConverter::new(store.clone(), clock.clone()),
            order_service: OrderService::new(store.clone()),
            balance_guard: BalanceGuard::new(store),
            clock,
        })
    }
}
