use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

/// JWT Claims
/// Access Token 에 담기는 사용자 정보
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// 사용자 ID
    pub user_id: u64,
    pub email: String,
    /// 만료 시각 (Unix timestamp, 초)
    pub exp: i64,
    /// 발급 시각 (Unix timestamp, 초)
    pub iat: i64,
}

impl Claims {
    /// 지금부터 `expires_in_hours` 시간 동안 유효한 Claims 생성
    /// Create claims valid for the given number of hours
    pub fn new(user_id: u64, email: String, expires_in_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            email,
            exp: (now + Duration::hours(expires_in_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}
