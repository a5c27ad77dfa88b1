// 제한된 재시도 (Bounded retry)
//
// 역할:
// - 한 번만 시도하는 비동기 함수를 감싸서 최대 N 번까지 재시도
// - 시도 사이 대기: 고정(Fixed) 또는 선형 증가(Linear)
// - 재시도 불가능한 에러는 즉시 반환
//
// 테스트:
// - tokio::time::sleep 을 사용하므로 `#[tokio::test(start_paused = true)]`
//   에서 실제로 기다리지 않고 대기 시간을 검증할 수 있음

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// 재시도 간격 증가 방식
/// Backoff strategy between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// 항상 같은 간격
    Fixed,
    /// delay × 재시도 횟수
    Linear,
}

/// 재시도 정책
/// Retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 첫 시도를 포함한 최대 시도 횟수 (최소 1)
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(250),
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    /// `failed_attempts` 번 실패한 뒤 다음 시도 전에 기다릴 시간
    /// Delay before the next attempt after `failed_attempts` failures (>= 1)
    pub fn delay_after(&self, failed_attempts: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Linear => self.delay * failed_attempts.max(1),
        }
    }
}

/// 재시도 실행
/// Run `operation` until it succeeds, returns a non-retryable error, or the
/// policy's attempts are exhausted. The last error is returned on exhaustion.
pub async fn retry<T, E, Op, Fut, Retryable>(
    policy: &RetryPolicy,
    mut operation: Op,
    is_retryable: Retryable,
) -> Result<T, E>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    Retryable: Fn(&E) -> bool,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && is_retryable(&err) => {
                let delay = policy.delay_after(attempt);
                warn!(attempt, max_attempts, delay_ms = delay.as_millis() as u64, error = %err, "Attempt failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                debug!(attempt, error = %err, "Giving up");
                return Err(err);
            }
        }
    }
}
