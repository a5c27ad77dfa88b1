// 외부 API 클라이언트
// External API clients
pub mod price_oracle;

pub use price_oracle::*;
