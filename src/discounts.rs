//! Discounts
//!
//! Coupons and promotions share the same shape: a kind, a value, a minimum
//! order, an optional cap, an active window and a scope. This module holds that
//! shared shape and the resolver that stacks at most one coupon with at most
//! one promotion.

use std::collections::BTreeSet;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    customers::Payer,
    ids::{CategoryUuid, ProductUuid},
    money::{clamp_to, percent_of, round_money, sum_rounded},
};

pub mod coupons;
pub mod promotions;

pub use coupons::{Coupon, CouponRejection, CouponStatus};
pub use promotions::{AppliedPromotion, Promotion};

/// How a discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Value is a percentage between 0 and 100.
    Percent,

    /// Value is an amount in the base currency.
    Fixed,
}

impl DiscountKind {
    /// Stable storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percent => "percent",
            Self::Fixed => "fixed",
        }
    }

    /// Parse a storage name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "percent" => Some(Self::Percent),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }
}

/// Which lines a discount applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "applies_to", content = "ids", rename_all = "snake_case")]
pub enum DiscountScope {
    /// Every line.
    #[default]
    All,

    /// Lines whose product belongs to one of these categories.
    Categories(BTreeSet<CategoryUuid>),

    /// Lines for one of these products.
    Products(BTreeSet<ProductUuid>),
}

impl DiscountScope {
    /// Whether a line with this product and category falls inside the scope.
    #[must_use]
    pub fn covers(&self, product: ProductUuid, category: Option<CategoryUuid>) -> bool {
        match self {
            Self::All => true,
            Self::Categories(categories) => {
                category.is_some_and(|category| categories.contains(&category))
            }
            Self::Products(products) => products.contains(&product),
        }
    }
}

/// Where `now` sits relative to an active window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStatus {
    /// Before `starts_at`.
    NotStarted,

    /// Inside the window.
    Open,

    /// At or after `expires_at`.
    Expired,
}

/// Terms shared by coupons and promotions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountTerms {
    /// Percent or fixed.
    pub kind: DiscountKind,

    /// Percent points or amount.
    pub value: Decimal,

    /// Items subtotal required before the discount applies.
    pub min_order_amount: Decimal,

    /// Largest discount this may ever grant.
    pub max_discount_amount: Option<Decimal>,

    /// Inclusive start; open-ended when absent.
    pub starts_at: Option<Timestamp>,

    /// Exclusive end; open-ended when absent.
    pub expires_at: Option<Timestamp>,

    /// Lines the discount is computed over.
    pub scope: DiscountScope,

    /// Disabled terms never apply.
    pub is_active: bool,
}

impl DiscountTerms {
    /// Where `now` falls in the active window.
    #[must_use]
    pub fn window_status(&self, now: Timestamp) -> WindowStatus {
        if self.starts_at.is_some_and(|starts_at| now < starts_at) {
            return WindowStatus::NotStarted;
        }

        if self.expires_at.is_some_and(|expires_at| now >= expires_at) {
            return WindowStatus::Expired;
        }

        WindowStatus::Open
    }

    /// Active and inside the window.
    #[must_use]
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.is_active && self.window_status(now) == WindowStatus::Open
    }

    /// Whether the items subtotal reaches the minimum order amount.
    #[must_use]
    pub fn meets_minimum(&self, items_subtotal: Decimal) -> bool {
        items_subtotal >= self.min_order_amount
    }

    /// Sum of the rounded totals of lines inside the scope.
    #[must_use]
    pub fn eligible_subtotal(&self, lines: &[EligibleLine]) -> Decimal {
        sum_rounded(
            lines
                .iter()
                .filter(|line| self.scope.covers(line.product, line.category))
                .map(|line| line.line_total),
        )
    }

    /// The discount granted on an eligible subtotal.
    ///
    /// Percent or flat value, capped by `max_discount_amount`, then by the
    /// eligible subtotal itself.
    #[must_use]
    pub fn discount_on(&self, eligible: Decimal) -> Decimal {
        let raw = match self.kind {
            DiscountKind::Percent => percent_of(eligible, clamp_to(self.value, Decimal::ONE_HUNDRED)),
            DiscountKind::Fixed => round_money(self.value),
        };

        let capped = match self.max_discount_amount {
            Some(max) => raw.min(max),
            None => raw,
        };

        round_money(clamp_to(capped, eligible))
    }
}

/// The parts of a priced line that discount scoping reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibleLine {
    /// Line product.
    pub product: ProductUuid,

    /// Product category.
    pub category: Option<CategoryUuid>,

    /// Rounded line total after deals.
    pub line_total: Decimal,
}

/// Everything the resolver needs besides the stored coupon and promotions.
#[derive(Debug, Clone, Copy)]
pub struct DiscountContext<'a> {
    /// Priced lines.
    pub lines: &'a [EligibleLine],

    /// Sum of rounded line totals.
    pub items_subtotal: Decimal,

    /// The identified payer, if any.
    pub payer: Option<&'a Payer>,

    /// Evaluation instant.
    pub now: Timestamp,
}

/// What the store returned for a requested coupon code.
#[derive(Debug, Clone, Copy, Default)]
pub struct CouponLookup<'a> {
    /// Code as the customer typed it.
    pub code: Option<&'a str>,

    /// The matching coupon, if the code exists.
    pub coupon: Option<&'a Coupon>,

    /// Orders the payer has already placed with this coupon.
    pub redemptions: u32,
}

/// The combined coupon and promotion result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscountOutcome {
    /// Echo of the requested coupon, absent when none was entered.
    pub coupon: Option<CouponStatus>,

    /// Amount granted by the coupon.
    pub coupon_discount_amount: Decimal,

    /// Winning promotion, if any.
    pub promotion: Option<AppliedPromotion>,

    /// Amount granted by the promotion.
    pub promotion_discount_amount: Decimal,

    /// Coupon plus promotion.
    pub discount_amount: Decimal,
}

impl DiscountOutcome {
    /// The coupon that was actually applied, if any.
    #[must_use]
    pub fn applied_coupon(&self) -> Option<&CouponStatus> {
        self.coupon.as_ref().filter(|status| status.ok)
    }
}

/// Validate the coupon, then pick at most one promotion.
///
/// A valid fixed coupon blocks promotions entirely. Rejections never fail;
/// they zero the coupon amount and explain why on the status.
#[must_use]
pub fn resolve(
    context: &DiscountContext<'_>,
    lookup: CouponLookup<'_>,
    promotions: &[Promotion],
) -> DiscountOutcome {
    let coupon = coupons::apply(context, lookup);

    let coupon_discount_amount = coupon
        .as_ref()
        .map_or(Decimal::ZERO, |status| status.discount_amount);

    let blocks_promotions = coupon
        .as_ref()
        .is_some_and(|status| status.ok && status.kind == Some(DiscountKind::Fixed));

    let promotion = if blocks_promotions {
        None
    } else {
        promotions::select(context, promotions, coupon_discount_amount)
    };

    let promotion_discount_amount = promotion
        .as_ref()
        .map_or(Decimal::ZERO, |applied| applied.discount_amount);

    DiscountOutcome {
        coupon,
        coupon_discount_amount,
        promotion,
        promotion_discount_amount,
        discount_amount: round_money(coupon_discount_amount + promotion_discount_amount),
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;

    fn terms(kind: DiscountKind, value: i64) -> DiscountTerms {
        DiscountTerms {
            kind,
            value: Decimal::from(value),
            min_order_amount: Decimal::ZERO,
            max_discount_amount: None,
            starts_at: None,
            expires_at: None,
            scope: DiscountScope::All,
            is_active: true,
        }
    }

    #[test]
    fn percent_discount_is_capped_by_max_amount() {
        let mut terms = terms(DiscountKind::Percent, 50);
        terms.max_discount_amount = Some(Decimal::from(30));

        assert_eq!(terms.discount_on(Decimal::from(100)), Decimal::from(30));
    }

    #[test]
    fn fixed_discount_is_capped_by_eligible_subtotal() {
        let terms = terms(DiscountKind::Fixed, 80);

        assert_eq!(terms.discount_on(Decimal::from(25)), Decimal::from(25));
    }

    #[test]
    fn category_scope_only_counts_matching_lines() {
        let shirts = CategoryUuid::new();

        let mut terms = terms(DiscountKind::Percent, 10);
        terms.scope = DiscountScope::Categories([shirts].into_iter().collect());

        let lines = [
            EligibleLine {
                product: ProductUuid::new(),
                category: Some(shirts),
                line_total: Decimal::from(40),
            },
            EligibleLine {
                product: ProductUuid::new(),
                category: None,
                line_total: Decimal::from(60),
            },
        ];

        assert_eq!(terms.eligible_subtotal(&lines), Decimal::from(40));
    }

    #[test]
    fn window_is_half_open() {
        let now = Timestamp::now();

        let mut terms = terms(DiscountKind::Fixed, 1);
        terms.starts_at = Some(now);
        terms.expires_at = Some(now + SignedDuration::from_secs(60));

        assert_eq!(terms.window_status(now), WindowStatus::Open);
        assert_eq!(
            terms.window_status(now + SignedDuration::from_secs(60)),
            WindowStatus::Expired
        );
        assert_eq!(
            terms.window_status(now - SignedDuration::from_secs(1)),
            WindowStatus::NotStarted
        );
    }

    #[test]
    fn kind_names_round_trip_through_storage() {
        for kind in [DiscountKind::Percent, DiscountKind::Fixed] {
            assert_eq!(DiscountKind::from_name(kind.as_str()), Some(kind));
        }

        assert_eq!(DiscountKind::from_name("bogus"), None);
    }
}
