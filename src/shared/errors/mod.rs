// Shared errors
pub mod auth_error;
pub mod quote_error;

pub use auth_error::*;
pub use quote_error::*;
