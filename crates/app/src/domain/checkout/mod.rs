//! Checkout

pub mod errors;
pub mod saga;
pub mod service;

pub use errors::{CheckoutError, ValidationError};
pub use saga::{CompensationReport, ReservationError, ReservationSaga, SagaFailure, SagaState};
pub use service::*;
