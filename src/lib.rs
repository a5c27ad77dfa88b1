// quote_server 라이브러리 루트
// main.rs 와 통합 테스트가 같은 모듈을 사용
pub mod domains;
pub mod routes;
pub mod shared;
