//! Shared test infrastructure.

mod context;
mod db;

pub use context::TestContext;
