use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::error;

use crate::domains::quote::services::QuoteService;

/// 만료 견적 정리 스케줄러
/// Expiry Sweeper
///
/// 역할:
/// - 일정 주기마다 만료 시각이 지난 ACTIVE 견적을 EXPIRED 로 변경
/// - 조회 API 도 조회 전에 해당 사용자 견적을 정리하므로 이 작업은 보조 수단
///
/// 처리 흐름:
/// 1. start() 시 백그라운드 태스크 실행
/// 2. 주기마다 QuoteService::sweep_expired 호출
/// 3. 비활성화 상태면 건너뜀
#[derive(Clone)]
pub struct ExpirySweeper {
    quote_service: QuoteService,
    period: Duration,
    enabled: Arc<AtomicBool>,
}

impl ExpirySweeper {
    pub fn new(quote_service: QuoteService, period: Duration) -> Self {
        Self {
            quote_service,
            period,
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// 스케줄러 시작
    /// Start the background task
    pub fn start(&self) -> JoinHandle<()> {
        let quote_service = self.quote_service.clone();
        let enabled = self.enabled.clone();
        let period = self.period;

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                if !enabled.load(Ordering::Relaxed) {
                    continue;
                }

                if let Err(e) = quote_service.sweep_expired().await {
                    error!(error = %e, "Failed to sweep expired quotes");
                }
            }
        })
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}
