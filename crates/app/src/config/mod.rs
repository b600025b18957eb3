//! Application Config
//!
//! Every setting can come from a flag or the environment; `main` loads an
//! optional `.env` first.

pub mod checkout;
pub mod db;
pub mod logging;

pub use checkout::{CheckoutConfig, ConfigError};
pub use db::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};
