//! Deal Resolver
//!
//! Deals are time-boxed automatic price overrides. Each product gets at most
//! one: the highest-priority active deal, ties going to the most recent.

use std::collections::{BTreeSet, HashMap};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    discounts::DiscountKind,
    ids::{DealUuid, ProductUuid},
    money::{clamp_to, percent_of, round_money},
};

/// A time-boxed price override on a set of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    /// Deal id.
    pub uuid: DealUuid,

    /// Display title.
    pub title: String,

    /// Products the deal covers.
    pub products: BTreeSet<ProductUuid>,

    /// Percent or fixed amount off the unit price.
    pub kind: DiscountKind,

    /// Percent (0-100) or amount, depending on `kind`.
    pub value: Decimal,

    /// Higher wins.
    pub priority: i32,

    /// Inclusive start of the active window.
    pub starts_at: Timestamp,

    /// Exclusive end of the active window.
    pub expires_at: Timestamp,

    /// Disabled deals never apply.
    pub is_active: bool,

    /// Recency tie-break.
    pub created_at: Timestamp,
}

impl Deal {
    /// Whether the deal is enabled and `now` falls in `[starts_at, expires_at)`.
    #[must_use]
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.is_active && self.starts_at <= now && now < self.expires_at
    }

    /// Apply the deal to an original unit price.
    ///
    /// Percent deals round the result; fixed deals never go below zero.
    #[must_use]
    pub fn apply(&self, original: Decimal) -> Decimal {
        match self.kind {
            DiscountKind::Percent => {
                let kept = Decimal::ONE_HUNDRED - clamp_to(self.value, Decimal::ONE_HUNDRED);
                percent_of(original, kept)
            }
            DiscountKind::Fixed => round_money((original - self.value).max(Decimal::ZERO)),
        }
    }

    /// The public description echoed on quote lines.
    #[must_use]
    pub fn descriptor(&self) -> DealDescriptor {
        DealDescriptor {
            uuid: self.uuid,
            title: self.title.clone(),
            kind: self.kind,
            value: self.value,
        }
    }
}

/// What a quote line shows about the deal that priced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealDescriptor {
    /// Deal id.
    pub uuid: DealUuid,

    /// Display title.
    pub title: String,

    /// Percent or fixed.
    pub kind: DiscountKind,

    /// Deal value.
    pub value: Decimal,
}

/// The best live deal per product, built fresh for each request.
#[derive(Debug, Clone, Default)]
pub struct BestDeals<'a> {
    by_product: HashMap<ProductUuid, &'a Deal>,
}

impl<'a> BestDeals<'a> {
    /// Pick the best deal for each requested product.
    ///
    /// Candidates are sorted once by priority then recency, both descending,
    /// and each product keeps the first deal that mentions it.
    #[must_use]
    pub fn build(deals: &'a [Deal], requested: &BTreeSet<ProductUuid>, now: Timestamp) -> Self {
        let mut candidates: Vec<&Deal> = deals
            .iter()
            .filter(|deal| deal.is_live(now))
            .filter(|deal| !deal.products.is_disjoint(requested))
            .collect();

        candidates.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let mut by_product = HashMap::new();

        for deal in candidates {
            for product in deal.products.intersection(requested) {
                by_product.entry(*product).or_insert(deal);
            }
        }

        Self { by_product }
    }

    /// The deal that applies to `product`, if any.
    #[must_use]
    pub fn for_product(&self, product: ProductUuid) -> Option<&'a Deal> {
        self.by_product.get(&product).copied()
    }

    /// Number of products with a deal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_product.len()
    }

    /// Whether no product has a deal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_product.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;

    fn deal(products: &[ProductUuid], kind: DiscountKind, value: i64, priority: i32) -> Deal {
        let now = Timestamp::now();

        Deal {
            uuid: DealUuid::new(),
            title: format!("deal {priority}"),
            products: products.iter().copied().collect(),
            kind,
            value: Decimal::from(value),
            priority,
            starts_at: now - SignedDuration::from_hours(1),
            expires_at: now + SignedDuration::from_hours(1),
            is_active: true,
            created_at: now,
        }
    }

    #[test]
    fn percent_deal_rounds_unit_price() {
        let deal = deal(&[], DiscountKind::Percent, 15, 0);

        // 19.99 * 0.85 = 16.9915
        assert_eq!(deal.apply(Decimal::new(1999, 2)), Decimal::new(1699, 2));
    }

    #[test]
    fn fixed_deal_never_goes_negative() {
        let deal = deal(&[], DiscountKind::Fixed, 50, 0);

        assert_eq!(deal.apply(Decimal::from(30)), Decimal::ZERO);
    }

    #[test]
    fn highest_priority_wins_per_product() {
        let a = ProductUuid::new();
        let b = ProductUuid::new();

        let deals = vec![
            deal(&[a, b], DiscountKind::Percent, 10, 1),
            deal(&[a], DiscountKind::Percent, 30, 5),
        ];

        let requested = [a, b].into_iter().collect();
        let best = BestDeals::build(&deals, &requested, Timestamp::now());

        assert_eq!(best.for_product(a).map(|d| d.priority), Some(5));
        assert_eq!(best.for_product(b).map(|d| d.priority), Some(1));
    }

    #[test]
    fn equal_priority_prefers_most_recent() {
        let a = ProductUuid::new();

        let mut older = deal(&[a], DiscountKind::Fixed, 1, 3);
        older.created_at -= SignedDuration::from_hours(24);

        let newer = deal(&[a], DiscountKind::Fixed, 2, 3);
        let newer_uuid = newer.uuid;

        let deals = vec![older, newer];
        let requested = [a].into_iter().collect();
        let best = BestDeals::build(&deals, &requested, Timestamp::now());

        assert_eq!(best.for_product(a).map(|d| d.uuid), Some(newer_uuid));
    }

    #[test]
    fn expired_and_inactive_deals_are_ignored() {
        let a = ProductUuid::new();
        let now = Timestamp::now();

        let mut expired = deal(&[a], DiscountKind::Fixed, 1, 9);
        expired.expires_at = now;

        let mut disabled = deal(&[a], DiscountKind::Fixed, 1, 8);
        disabled.is_active = false;

        let deals = vec![expired, disabled];
        let requested = [a].into_iter().collect();

        assert!(BestDeals::build(&deals, &requested, now).is_empty());
    }

    #[test]
    fn deals_for_unrequested_products_are_ignored() {
        let deals = vec![deal(&[ProductUuid::new()], DiscountKind::Fixed, 1, 1)];
        let requested = [ProductUuid::new()].into_iter().collect();

        assert!(BestDeals::build(&deals, &requested, Timestamp::now()).is_empty());
    }
}
