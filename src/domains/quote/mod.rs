// Quote domain module
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use models::*;
