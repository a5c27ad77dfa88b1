// All repositories module
pub mod quote;

// Re-export all repositories for convenience
pub use quote::*;
