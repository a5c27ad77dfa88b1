// src/domains/auth/services/jwt_service.rs
use crate::shared::errors::AuthError;
use crate::domains::auth::models::jwt::Claims;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Access Token 기본 수명 (시간)
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 1;

/// JWT 서비스
/// JWT Service for token generation and verification (HS256)
///
/// 이 서버는 사용자 관리를 하지 않으므로 토큰 검증이 주 용도이고,
/// 발급은 테스트와 로컬 개발에서 사용합니다.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    /// JWT Service 생성
    /// Create JWT Service
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Access Token 발급 (1시간)
    /// Generate Access Token
    pub fn generate_access_token(&self, user_id: u64, email: String) -> Result<String, AuthError> {
        self.generate_token(Claims::new(user_id, email, ACCESS_TOKEN_TTL_HOURS))
    }

    /// 주어진 Claims 로 토큰 서명
    pub fn generate_token(&self, claims: Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to generate access token: {}", e)))
    }

    /// Access Token 검증
    /// Verify Access Token
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Rejected access token");
                AuthError::InvalidToken
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_verify() {
        let service = JwtService::new("test-secret");
        let token = service
            .generate_access_token(42, "user@example.com".to_string())
            .unwrap();

        let claims = service.verify_access_token(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "user@example.com");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtService::new("secret-a");
        let verifier = JwtService::new("secret-b");
        let token = issuer
            .generate_access_token(1, "a@example.com".to_string())
            .unwrap();

        assert!(matches!(
            verifier.verify_access_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtService::new("test-secret");
        // 기본 leeway(60초)보다 충분히 과거
        let token = service
            .generate_token(Claims::new(1, "a@example.com".to_string(), -2))
            .unwrap();

        assert!(matches!(
            service.verify_access_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = JwtService::new("test-secret");
        assert!(service.verify_access_token("not-a-jwt").is_err());
    }
}
