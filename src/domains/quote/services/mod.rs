// Quote services module
// 견적 서비스 모듈

pub mod balance_guard;
pub mod expiry_sweeper;
pub mod order_converter;
pub mod order_service;
pub mod quote_calculator;
pub mod quote_service;
pub mod state;

pub use balance_guard::*;
pub use expiry_sweeper::*;
pub use order_converter::*;
pub use order_service::*;
pub use quote_calculator::*;
pub use quote_service::*;
pub use state::*;
