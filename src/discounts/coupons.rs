//! Coupons

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    discounts::{CouponLookup, DiscountContext, DiscountKind, DiscountTerms, WindowStatus},
    ids::CouponUuid,
};

/// A customer-entered discount code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    /// Coupon id.
    pub uuid: CouponUuid,

    /// Code as stored; matched case-insensitively.
    pub code: String,

    /// Discount terms.
    pub terms: DiscountTerms,

    /// Total redemptions allowed across all customers.
    pub usage_limit: Option<u32>,

    /// Redemptions so far; only checkout increments it.
    pub used_count: u32,

    /// Redemptions allowed per payer.
    pub usage_limit_per_customer: Option<u32>,
}

/// Why a coupon did not apply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponRejection {
    /// No coupon has this code.
    #[error("Invalid coupon code")]
    UnknownCode,

    /// The coupon is switched off.
    #[error("Coupon is not active")]
    Inactive,

    /// The window has not opened.
    #[error("Coupon is not active yet")]
    NotStarted,

    /// The window has closed.
    #[error("Coupon has expired")]
    Expired,

    /// Every global redemption has been used.
    #[error("Coupon usage limit reached")]
    UsageLimitReached,

    /// A per-customer limit exists but the payer is unknown.
    #[error("Enter your email to use this coupon")]
    IdentityRequired,

    /// This payer has used up their redemptions.
    #[error("You have already used this coupon the maximum number of times")]
    CustomerLimitReached,

    /// The items subtotal is too small.
    #[error("Minimum order amount is {minimum}")]
    BelowMinimum {
        /// Required items subtotal.
        minimum: Decimal,
    },

    /// No line in the cart falls inside the coupon's scope.
    #[error("Coupon does not apply to items in your cart")]
    NothingEligible,
}

/// The coupon echo on a quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouponStatus {
    /// Code as entered (trimmed).
    pub code: String,

    /// Whether the coupon applied.
    pub ok: bool,

    /// Rejection message when `ok` is false.
    pub message: Option<String>,

    /// Applied coupon id.
    pub uuid: Option<CouponUuid>,

    /// Applied coupon kind.
    pub kind: Option<DiscountKind>,

    /// Amount granted.
    pub discount_amount: Decimal,
}

impl CouponStatus {
    fn rejected(code: &str, rejection: &CouponRejection) -> Self {
        Self {
            code: code.to_string(),
            ok: false,
            message: Some(rejection.to_string()),
            uuid: None,
            kind: None,
            discount_amount: Decimal::ZERO,
        }
    }
}

/// Normalise a code for lookup: trimmed and uppercased.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl Coupon {
    /// Whether `code` refers to this coupon.
    #[must_use]
    pub fn matches_code(&self, code: &str) -> bool {
        normalize_code(&self.code) == normalize_code(code)
    }

    /// Validate the coupon against a cart and compute its discount.
    ///
    /// # Errors
    ///
    /// Returns the first [`CouponRejection`] that applies, checked in a fixed
    /// order: activity, window, global limit, payer identity, per-payer limit,
    /// minimum order, then scope.
    pub fn evaluate(
        &self,
        context: &DiscountContext<'_>,
        redemptions: u32,
    ) -> Result<Decimal, CouponRejection> {
        let terms = &self.terms;

        if !terms.is_active {
            return Err(CouponRejection::Inactive);
        }

        match terms.window_status(context.now) {
            WindowStatus::NotStarted => return Err(CouponRejection::NotStarted),
            WindowStatus::Expired => return Err(CouponRejection::Expired),
            WindowStatus::Open => {}
        }

        if self.usage_limit.is_some_and(|limit| self.used_count >= limit) {
            return Err(CouponRejection::UsageLimitReached);
        }

        if let Some(per_customer) = self.usage_limit_per_customer {
            if context.payer.is_none() {
                return Err(CouponRejection::IdentityRequired);
            }

            if redemptions >= per_customer {
                return Err(CouponRejection::CustomerLimitReached);
            }
        }

        if !terms.meets_minimum(context.items_subtotal) {
            return Err(CouponRejection::BelowMinimum {
                minimum: terms.min_order_amount,
            });
        }

        let eligible = terms.eligible_subtotal(context.lines);

        if eligible <= Decimal::ZERO {
            return Err(CouponRejection::NothingEligible);
        }

        Ok(terms.discount_on(eligible))
    }
}

/// Apply a looked-up coupon, producing the status echoed on the quote.
///
/// Returns `None` when no code was entered.
#[must_use]
pub fn apply(context: &DiscountContext<'_>, lookup: CouponLookup<'_>) -> Option<CouponStatus> {
    let code = lookup.code.map(str::trim).filter(|code| !code.is_empty())?;

    let Some(coupon) = lookup.coupon.filter(|coupon| coupon.matches_code(code)) else {
        return Some(CouponStatus::rejected(code, &CouponRejection::UnknownCode));
    };

    let status = match coupon.evaluate(context, lookup.redemptions) {
        Ok(discount_amount) => CouponStatus {
            code: code.to_string(),
            ok: true,
            message: None,
            uuid: Some(coupon.uuid),
            kind: Some(coupon.terms.kind),
            discount_amount,
        },
        Err(rejection) => CouponStatus::rejected(code, &rejection),
    };

    Some(status)
}
