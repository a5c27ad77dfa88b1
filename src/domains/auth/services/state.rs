// Auth domain state
// 인증 도메인 상태
use crate::domains::auth::services::JwtService;

/// Auth domain state
/// 토큰 검증에 필요한 서비스
#[derive(Clone)]
pub struct AuthState {
    pub jwt_service: JwtService,
}

impl AuthState {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            jwt_service: JwtService::new(jwt_secret),
        }
    }
}
