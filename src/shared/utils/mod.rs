/// 공유 유틸리티 모듈
/// Shared Utilities Module
///
/// 역할:
/// - 시계 추상화 (만료 판단, 테스트용 수동 시계)
/// - 주문 번호 생성기
/// - 제한된 재시도 (가격 조회)
pub mod clock;
pub mod reference;
pub mod retry;

pub use clock::*;
pub use reference::*;
pub use retry::*;
