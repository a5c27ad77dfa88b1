// Shared module
pub mod clients;
pub mod config;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod services;
pub mod utils;

pub use clients::*;
pub use database::*;
pub use errors::*;
pub use middleware::*;
pub use services::*;
pub use utils::*;
