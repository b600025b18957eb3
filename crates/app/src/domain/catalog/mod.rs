//! Catalog

mod records;
mod repository;

pub use repository::*;
