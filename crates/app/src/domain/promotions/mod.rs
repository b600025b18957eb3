//! Promotions

mod records;
mod repository;

pub use repository::*;
