//! Shipping Settings

mod records;
mod repository;

pub use repository::*;
