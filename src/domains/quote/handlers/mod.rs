// Quote handlers module
// 견적 핸들러 모듈

pub mod balance_handler;
pub mod order_handler;
pub mod quote_handler;

pub use balance_handler::*;
pub use order_handler::*;
pub use quote_handler::*;
