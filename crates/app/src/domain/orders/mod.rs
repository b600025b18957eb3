//! Orders

mod repository;

pub use repository::*;
