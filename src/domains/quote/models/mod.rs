// Quote domain models
pub mod balance;
pub mod currency;
pub mod order;
pub mod quote;

pub use balance::*;
pub use currency::*;
pub use order::*;
pub use quote::*;
