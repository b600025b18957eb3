//! Cart lines and structural validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{ProductUuid, VariantUuid};

/// Largest quantity a single line may request.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Largest number of lines a cart may hold.
pub const MAX_CART_LINES: usize = 100;

/// One requested (product, variant, quantity) within a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Requested product.
    pub product: ProductUuid,

    /// Requested variant, if the product has variants.
    #[serde(default)]
    pub variant: Option<VariantUuid>,

    /// Requested quantity.
    pub quantity: u32,
}

impl CartLine {
    /// Build a line for a product without a variant.
    #[must_use]
    pub const fn new(product: ProductUuid, quantity: u32) -> Self {
        Self {
            product,
            variant: None,
            quantity,
        }
    }

    /// Build a line for a specific variant.
    #[must_use]
    pub const fn with_variant(product: ProductUuid, variant: VariantUuid, quantity: u32) -> Self {
        Self {
            product,
            variant: Some(variant),
            quantity,
        }
    }
}

/// Malformed cart input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// A line asked for nothing.
    #[error("line {line} has a quantity of zero")]
    ZeroQuantity {
        /// Zero-based line index.
        line: usize,
    },

    /// A line asked for more than a single order may hold.
    #[error("line {line} requests {quantity}, more than the maximum of {MAX_LINE_QUANTITY}")]
    QuantityTooLarge {
        /// Zero-based line index.
        line: usize,
        /// Requested quantity.
        quantity: u32,
    },

    /// The cart holds too many lines.
    #[error("cart has {0} lines, more than the maximum of {MAX_CART_LINES}")]
    TooManyLines(usize),

    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,
}

/// Check the shape of a cart before any pricing happens.
///
/// An empty cart is valid here; checkout adds its own emptiness check.
///
/// # Errors
///
/// Returns the first [`CartError`] found, scanning lines in request order.
pub fn validate_lines(lines: &[CartLine]) -> Result<(), CartError> {
    if lines.len() > MAX_CART_LINES {
        return Err(CartError::TooManyLines(lines.len()));
    }

    for (index, line) in lines.iter().enumerate() {
        if line.quantity == 0 {
            return Err(CartError::ZeroQuantity { line: index });
        }

        if line.quantity > MAX_LINE_QUANTITY {
            return Err(CartError::QuantityTooLarge {
                line: index,
                quantity: line.quantity,
            });
        }
    }

    Ok(())
}
