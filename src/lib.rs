pub mod config;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::core::engine::ModEngine;
pub use crate::core::resolver::PathResolver;
pub use crate::models::error::SError;
