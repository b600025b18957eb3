//! Tally
//!
//! Tally prices storefront carts: catalog lookup, time-boxed deals, a coupon, an
//! automatic promotion and destination-based shipping, composed into a quote that
//! checkout recomputes before reserving stock and writing an order.

pub mod cart;
pub mod catalog;
pub mod customers;
pub mod deals;
pub mod discounts;
pub mod ids;
pub mod money;
pub mod orders;
pub mod prelude;
pub mod quote;
pub mod shipping;
