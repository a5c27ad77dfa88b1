/// 주문 번호 생성기
/// Order reference generator
///
/// 형식: `ORD-YYYYMMDD-XXXXXXXX`
/// - 날짜: 주문 생성 시각 (UTC)
/// - 뒤 8자리: 대문자 영숫자 랜덤
///
/// 주문 ID (UUID) 와 별개로 사람이 읽기 쉬운 번호입니다.
/// 중복은 DB 의 UNIQUE 제약이 최종적으로 막습니다.
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};

/// 주문 번호 접두사
pub const ORDER_REFERENCE_PREFIX: &str = "ORD";

/// 랜덤 부분 길이
pub const ORDER_REFERENCE_SUFFIX_LEN: usize = 8;

pub struct OrderReferenceGenerator;

impl OrderReferenceGenerator {
    /// 다음 주문 번호 생성
    /// Generate a reference for an order created at `now`
    pub fn next(now: DateTime<Utc>) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ORDER_REFERENCE_SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();

        format!(
            "{}-{}-{}",
            ORDER_REFERENCE_PREFIX,
            now.format("%Y%m%d"),
            suffix
        )
    }
}
