//! Quote service errors.

use tally::cart::CartError;
use thiserror::Error;

use crate::database::StoreError;

#[derive(Debug, Error)]
pub enum QuoteError {
    /// The cart is malformed.
    #[error(transparent)]
    Validation(#[from] CartError),

    /// A store could not be read.
    #[error("failed to load quote data")]
    Storage(#[from] StoreError),
}
