//! Deals

mod records;
mod repository;

pub use repository::*;
