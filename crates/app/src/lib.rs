//! Storage-backed quote and checkout services for the tally pricing engine.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod observability;

#[cfg(test)]
mod test;
