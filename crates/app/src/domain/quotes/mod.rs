//! Quotes

pub mod errors;
pub mod loader;
pub mod service;

pub use errors::QuoteError;
pub use service::*;
