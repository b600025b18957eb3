//! Promotions
//!
//! Promotions apply automatically. They are tried in priority order and the
//! first one that grants anything wins; they never stack with each other.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    discounts::{DiscountContext, DiscountKind, DiscountTerms},
    ids::PromotionUuid,
    money::clamp_to,
};

/// An automatically applied, code-less discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    /// Promotion id.
    pub uuid: PromotionUuid,

    /// Display title.
    pub title: String,

    /// Discount terms.
    pub terms: DiscountTerms,

    /// Higher is tried first.
    pub priority: i32,

    /// Recency tie-break.
    pub created_at: Timestamp,
}

/// The promotion echo on a quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedPromotion {
    /// Promotion id.
    pub uuid: PromotionUuid,

    /// Display title.
    pub title: String,

    /// Percent or fixed.
    pub kind: DiscountKind,

    /// Amount granted.
    pub discount_amount: Decimal,
}

/// Pick the promotion to apply, if any.
///
/// Each candidate is capped by what remains of the items subtotal after the
/// coupon discount.
#[must_use]
pub fn select(
    context: &DiscountContext<'_>,
    promotions: &[Promotion],
    coupon_discount_amount: Decimal,
) -> Option<AppliedPromotion> {
    let remaining = clamp_to(
        context.items_subtotal - coupon_discount_amount,
        context.items_subtotal,
    );

    let mut candidates: Vec<&Promotion> = promotions
        .iter()
        .filter(|promotion| promotion.terms.is_live(context.now))
        .filter(|promotion| promotion.terms.meets_minimum(context.items_subtotal))
        .collect();

    candidates.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    candidates.into_iter().find_map(|promotion| {
        let eligible = promotion.terms.eligible_subtotal(context.lines);
        let discount_amount = clamp_to(promotion.terms.discount_on(eligible), remaining);

        (discount_amount > Decimal::ZERO).then(|| AppliedPromotion {
            uuid: promotion.uuid,
            title: promotion.title.clone(),
            kind: promotion.terms.kind,
            discount_amount,
        })
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        discounts::{DiscountScope, EligibleLine},
        ids::ProductUuid,
    };

    use super::*;

    fn promotion(value: i64, priority: i32) -> Promotion {
        Promotion {
            uuid: PromotionUuid::new(),
            title: format!("promo {priority}"),
            terms: DiscountTerms {
                kind: DiscountKind::Percent,
                value: Decimal::from(value),
                min_order_amount: Decimal::ZERO,
                max_discount_amount: None,
                starts_at: None,
                expires_at: None,
                scope: DiscountScope::All,
                is_active: true,
            },
            priority,
            created_at: Timestamp::now(),
        }
    }

    fn context(lines: &[EligibleLine]) -> DiscountContext<'_> {
        DiscountContext {
            lines,
            items_subtotal: Decimal::from(100),
            payer: None,
            now: Timestamp::now(),
        }
    }

    fn lines() -> Vec<EligibleLine> {
        vec![EligibleLine {
            product: ProductUuid::new(),
            category: None,
            line_total: Decimal::from(100),
        }]
    }

    #[test]
    fn highest_priority_promotion_wins() {
        let lines = lines();
        let promotions = [promotion(10, 1), promotion(20, 7)];

        let applied = select(&context(&lines), &promotions, Decimal::ZERO);

        assert_eq!(applied.map(|p| p.discount_amount), Some(Decimal::from(20)));
    }

    #[test]
    fn promotions_granting_nothing_are_skipped() {
        let lines = lines();

        let mut scoped = promotion(50, 9);
        scoped.terms.scope = DiscountScope::Products([ProductUuid::new()].into_iter().collect());

        let promotions = [scoped, promotion(10, 1)];

        let applied = select(&context(&lines), &promotions, Decimal::ZERO);

        assert_eq!(applied.map(|p| p.title), Some("promo 1".to_string()));
    }

    #[test]
    fn promotion_is_capped_by_remaining_subtotal() {
        let lines = lines();
        let promotions = [promotion(50, 1)];

        let applied = select(&context(&lines), &promotions, Decimal::from(90));

        assert_eq!(applied.map(|p| p.discount_amount), Some(Decimal::from(10)));
    }

    #[test]
    fn below_minimum_promotions_are_not_candidates() {
        let lines = lines();
        let mut promotion = promotion(10, 1);
        promotion.terms.min_order_amount = Decimal::from(500);

        assert_eq!(select(&context(&lines), &[promotion], Decimal::ZERO), None);
    }
}
