use std::sync::Arc;

use anyhow::Result;

use crate::domains::auth::services::state::AuthState;
use crate::domains::quote::services::state::QuoteState;
use crate::domains::quote::store::QuoteStore;
use crate::shared::clients::PriceOracle;
use crate::shared::config::QuoteSettings;
use crate::shared::utils::Clock;

/// Application state (combines all domain states)
/// 애플리케이션 상태 (모든 도메인 상태를 조합)
///
/// 저장소/가격 오라클/시계는 밖에서 주입합니다.
/// main 에서는 PostgreSQL 또는 인메모리 저장소를, 테스트에서는 수동 시계를 넘깁니다.
#[derive(Clone)]
pub struct AppState {
    pub auth_state: AuthState,
    pub quote_state: QuoteState,
}

impl AppState {
    /// 모든 도메인 State를 초기화하고 조합
    pub fn new(
        jwt_secret: &str,
        store: Arc<dyn QuoteStore>,
        oracle: Arc<dyn PriceOracle>,
        clock: Arc<dyn Clock>,
        settings: &QuoteSettings,
    ) -> Result<Self> {
        let auth_state = AuthState::new(jwt_secret);
        let quote_state = QuoteState::new(store, oracle, clock, settings)?;

        Ok(Self {
            auth_state,
            quote_state,
        })
    }
}
