//! Shipping Calculator
//!
//! Fee, free-shipping eligibility and a delivery estimate, driven by global
//! defaults and optional per-city overrides.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::round_money;

/// A delivery estimate in business days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryWindow {
    /// Fastest delivery.
    pub min_days: u32,

    /// Slowest delivery.
    pub max_days: u32,
}

impl DeliveryWindow {
    /// Build a window from two bounds in any order.
    #[must_use]
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            min_days: a.min(b),
            max_days: a.max(b),
        }
    }

    /// Customer-facing label; empty when both bounds are zero.
    #[must_use]
    pub fn label(&self) -> String {
        let (min, max) = (
            self.min_days.min(self.max_days),
            self.min_days.max(self.max_days),
        );

        match (min, max) {
            (0, 0) => String::new(),
            (a, b) if a == b || a == 0 => plural_days(b),
            (a, b) => format!("Delivery in {a}-{b} business days"),
        }
    }
}

fn plural_days(days: u32) -> String {
    if days == 1 {
        "Delivery in 1 business day".to_string()
    } else {
        format!("Delivery in {days} business days")
    }
}

/// Overrides that apply when the destination city matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRule {
    /// City name as configured.
    pub city: String,

    /// Fee override.
    pub fee: Option<Decimal>,

    /// Free-shipping threshold override.
    pub free_above_subtotal: Option<Decimal>,

    /// Delivery estimate override.
    pub eta: Option<DeliveryWindow>,
}

/// Store-wide shipping configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingSettings {
    /// Fee when no city rule overrides it.
    pub default_fee: Decimal,

    /// Threshold at which shipping becomes free; never free when absent.
    pub free_above_subtotal: Option<Decimal>,

    /// Estimate when no city rule overrides it.
    pub default_eta: DeliveryWindow,

    /// Rules tried in order; the first match wins.
    pub city_rules: Vec<CityRule>,
}

/// Result of the shipping calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingQuote {
    /// Amount charged for shipping.
    pub fee: Decimal,

    /// Whether the threshold was reached.
    pub is_free: bool,

    /// How much more the shipping subtotal needs to reach the threshold.
    pub amount_to_free_shipping: Decimal,

    /// The estimate used.
    pub eta: DeliveryWindow,

    /// `eta` rendered for display.
    pub delivery_eta: String,

    /// The configured city of the rule that matched, if any.
    pub matched_city: Option<String>,
}

/// Normalise a city for matching: trimmed, single-spaced, lowercase.
#[must_use]
pub fn normalize_city(city: &str) -> String {
    city.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl ShippingSettings {
    /// The first rule whose city matches `city`.
    #[must_use]
    pub fn rule_for(&self, city: Option<&str>) -> Option<&CityRule> {
        let wanted = normalize_city(city?);

        if wanted.is_empty() {
            return None;
        }

        self.city_rules
            .iter()
            .find(|rule| normalize_city(&rule.city) == wanted)
    }

    /// Quote shipping for a destination.
    ///
    /// `shipping_subtotal` is what the free-shipping threshold is compared
    /// against. Overrides on a matching city take precedence field by field.
    #[must_use]
    pub fn quote(&self, shipping_subtotal: Decimal, city: Option<&str>) -> ShippingQuote {
        let rule = self.rule_for(city);

        let fee = rule
            .and_then(|rule| rule.fee)
            .unwrap_or(self.default_fee)
            .max(Decimal::ZERO);

        let threshold = rule
            .and_then(|rule| rule.free_above_subtotal)
            .or(self.free_above_subtotal);

        let eta = rule.and_then(|rule| rule.eta).unwrap_or(self.default_eta);

        let subtotal = round_money(shipping_subtotal);

        let (is_free, amount_to_free_shipping) = match threshold {
            Some(threshold) if subtotal >= threshold => (true, Decimal::ZERO),
            Some(threshold) => (false, round_money(threshold - subtotal)),
            None => (false, Decimal::ZERO),
        };

        ShippingQuote {
            fee: if is_free { Decimal::ZERO } else { round_money(fee) },
            is_free,
            amount_to_free_shipping,
            eta,
            delivery_eta: eta.label(),
            matched_city: rule.map(|rule| rule.city.clone()),
        }
    }
}
