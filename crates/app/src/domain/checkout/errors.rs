//! Checkout service errors.

use tally::{
    cart::CartError,
    customers::EmailError,
    orders::{AddressError, PaymentConfigurationError},
};
use thiserror::Error;

use crate::{database::StoreError, domain::checkout::saga::ReservationError};

/// A malformed commit request.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("invalid guest email: {0}")]
    Email(#[from] EmailError),
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("invalid checkout request")]
    Validation(#[from] ValidationError),

    /// Neither an authenticated customer nor a guest email was given.
    #[error("sign in or enter an email address to place an order")]
    PayerRequired,

    /// A line is missing, inactive or short on stock.
    #[error("line {line} is unavailable: {reason}")]
    UnavailableLine { line: usize, reason: String },

    #[error(transparent)]
    PaymentConfiguration(#[from] PaymentConfigurationError),

    /// Another checkout took the stock first.
    #[error("insufficient stock for line {line}")]
    InsufficientStock { line: usize },

    /// The order could not be saved; reserved stock was released.
    #[error("failed to place order")]
    Persistence(#[source] StoreError),

    #[error("storage error")]
    Storage(#[source] StoreError),
}

impl From<CartError> for CheckoutError {
    fn from(error: CartError) -> Self {
        Self::Validation(ValidationError::Cart(error))
    }
}

impl From<AddressError> for CheckoutError {
    fn from(error: AddressError) -> Self {
        Self::Validation(ValidationError::Address(error))
    }
}

impl From<EmailError> for CheckoutError {
    fn from(error: EmailError) -> Self {
        Self::Validation(ValidationError::Email(error))
    }
}

impl From<ReservationError> for CheckoutError {
    fn from(error: ReservationError) -> Self {
        match error {
            ReservationError::InsufficientStock { line } => Self::InsufficientStock { line },
            ReservationError::Storage { source, .. } => Self::Storage(source),
        }
    }
}
