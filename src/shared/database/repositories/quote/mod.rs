// Quote workflow repositories
pub mod balance_repository;
pub mod order_repository;
pub mod quote_repository;

pub use balance_repository::*;
pub use order_repository::*;
pub use quote_repository::*;
