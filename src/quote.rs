//! Quote Builder
//!
//! Composes catalog lookup, deals, discounts and shipping into a priced
//! preview. Building a quote never mutates anything; it is a pure function of
//! the request and the data loaded for it.

use std::collections::{BTreeSet, HashMap};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    cart::{CartError, CartLine, validate_lines},
    catalog::{CatalogProduct, VariantAttributes, resolve_line},
    customers::Payer,
    deals::{BestDeals, Deal, DealDescriptor},
    discounts::{
        self, AppliedPromotion, Coupon, CouponLookup, CouponStatus, DiscountContext,
        DiscountOutcome, EligibleLine, Promotion,
    },
    ids::{CategoryUuid, ProductUuid, VariantUuid},
    money::{line_total, round_money, sum_rounded},
    orders::PartialAddress,
    shipping::{ShippingQuote, ShippingSettings},
};

/// Message shown on a line that asks for more than is in stock.
pub const INSUFFICIENT_STOCK: &str = "Not enough stock";

/// What the customer asked to price.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Requested lines, in order.
    pub lines: Vec<CartLine>,

    /// Coupon code as typed.
    #[serde(default)]
    pub coupon_code: Option<String>,

    /// Guest email, used to identify the payer when not authenticated.
    #[serde(default)]
    pub guest_email: Option<String>,

    /// Destination, as far as it is known.
    #[serde(default)]
    pub address: Option<PartialAddress>,
}

impl QuoteRequest {
    /// Distinct products the request mentions.
    #[must_use]
    pub fn product_ids(&self) -> BTreeSet<ProductUuid> {
        self.lines.iter().map(|line| line.product).collect()
    }

    /// Destination city, if given.
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.address
            .as_ref()
            .and_then(|address| address.city.as_deref())
    }
}

/// Everything loaded from the stores for one quote.
#[derive(Debug, Clone, Default)]
pub struct QuoteInputs {
    /// Catalog records by id. Missing ids are unavailable lines.
    pub products: HashMap<ProductUuid, CatalogProduct>,

    /// Candidate deals.
    pub deals: Vec<Deal>,

    /// The coupon the requested code resolved to.
    pub coupon: Option<Coupon>,

    /// Prior redemptions of that coupon by this payer.
    pub coupon_redemptions: u32,

    /// Candidate promotions.
    pub promotions: Vec<Promotion>,

    /// Shipping configuration.
    pub shipping: ShippingSettings,

    /// The identified payer, if any.
    pub payer: Option<Payer>,

    /// Evaluation instant for every time window.
    pub now: Timestamp,
}

/// One priced line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteLine {
    /// Requested product.
    pub product: ProductUuid,

    /// Requested variant.
    pub variant: Option<VariantUuid>,

    /// Requested quantity.
    pub quantity: u32,

    /// Product title.
    pub title: String,

    /// Product slug.
    pub slug: String,

    /// Image to show.
    pub image: Option<String>,

    /// Variant title.
    pub variant_title: Option<String>,

    /// Variant sku.
    pub sku: Option<String>,

    /// Variant option values.
    pub attributes: VariantAttributes,

    /// Category, used for discount scoping.
    #[serde(skip)]
    pub category: Option<CategoryUuid>,

    /// Unit price after any deal.
    pub unit_price: Decimal,

    /// Catalog unit price, present only when a deal applied.
    pub original_unit_price: Option<Decimal>,

    /// Unit price times quantity, rounded.
    pub line_total: Decimal,

    /// Units on hand.
    pub available_stock: u32,

    /// Whether the line can be fulfilled.
    pub is_available: bool,

    /// Why the line is unavailable.
    pub message: Option<String>,

    /// The deal that priced the line.
    pub deal: Option<DealDescriptor>,
}

impl QuoteLine {
    /// The cart line this answers.
    #[must_use]
    pub const fn cart_line(&self) -> CartLine {
        CartLine {
            product: self.product,
            variant: self.variant,
            quantity: self.quantity,
        }
    }
}

/// A priced preview of a cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Quote {
    /// Priced lines, in request order.
    pub lines: Vec<QuoteLine>,

    /// Sum of rounded line totals.
    pub items_subtotal: Decimal,

    /// Coupon echo.
    pub coupon: Option<CouponStatus>,

    /// Amount the coupon took off.
    pub coupon_discount_amount: Decimal,

    /// Promotion echo.
    pub promotion: Option<AppliedPromotion>,

    /// Amount the promotion took off.
    pub promotion_discount_amount: Decimal,

    /// Coupon plus promotion.
    pub discount_amount: Decimal,

    /// Shipping charged.
    pub shipping_amount: Decimal,

    /// Shipping details, absent for an empty cart.
    pub shipping: Option<ShippingQuote>,

    /// Always zero.
    pub tax_amount: Decimal,

    /// `items_subtotal - discount_amount + shipping_amount + tax_amount`.
    pub total_amount: Decimal,

    /// Delivery estimate label.
    pub delivery_eta: String,
}

impl Quote {
    /// Lines that cannot be fulfilled as requested.
    pub fn unavailable_lines(&self) -> impl Iterator<Item = (usize, &QuoteLine)> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.is_available)
    }

    /// Whether the quote has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn price_lines(lines: &[CartLine], inputs: &QuoteInputs) -> Vec<QuoteLine> {
    let requested = lines.iter().map(|line| line.product).collect();
    let best = BestDeals::build(&inputs.deals, &requested, inputs.now);

    lines
        .iter()
        .map(|line| {
            let resolved = resolve_line(*line, inputs.products.get(&line.product));

            let deal = if resolved.is_resolved() {
                best.for_product(line.product)
            } else {
                None
            };

            let unit_price = deal.map_or(round_money(resolved.base_price), |deal| {
                deal.apply(resolved.base_price)
            });

            let message = match resolved.unavailable_reason {
                Some(reason) => Some(reason.to_string()),
                None if !resolved.is_available() => Some(INSUFFICIENT_STOCK.to_string()),
                None => None,
            };

            QuoteLine {
                product: line.product,
                variant: line.variant,
                quantity: line.quantity,
                is_available: resolved.is_available(),
                title: resolved.title,
                slug: resolved.slug,
                image: resolved.image,
                variant_title: resolved.variant_title,
                sku: resolved.sku,
                attributes: resolved.attributes,
                category: resolved.category,
                unit_price,
                original_unit_price: deal.map(|_| round_money(resolved.base_price)),
                line_total: line_total(unit_price, line.quantity),
                available_stock: resolved.available_stock,
                message,
                deal: deal.map(Deal::descriptor),
            }
        })
        .collect()
}

/// Price a cart.
///
/// Unavailable lines and rejected coupons are reported on the quote rather
/// than failing it. An empty cart yields an all-zero quote.
///
/// # Errors
///
/// Returns a [`CartError`] when the request is structurally malformed.
pub fn build_quote(request: &QuoteRequest, inputs: &QuoteInputs) -> Result<Quote, CartError> {
    validate_lines(&request.lines)?;

    if request.lines.is_empty() {
        return Ok(Quote::default());
    }

    let lines = price_lines(&request.lines, inputs);

    let items_subtotal = sum_rounded(lines.iter().map(|line| line.line_total));

    let eligible: Vec<EligibleLine> = lines
        .iter()
        .map(|line| EligibleLine {
            product: line.product,
            category: line.category,
            line_total: line.line_total,
        })
        .collect();

    let context = DiscountContext {
        lines: &eligible,
        items_subtotal,
        payer: inputs.payer.as_ref(),
        now: inputs.now,
    };

    let lookup = CouponLookup {
        code: request.coupon_code.as_deref(),
        coupon: inputs.coupon.as_ref(),
        redemptions: inputs.coupon_redemptions,
    };

    let DiscountOutcome {
        coupon,
        coupon_discount_amount,
        promotion,
        promotion_discount_amount,
        discount_amount,
    } = discounts::resolve(&context, lookup, &inputs.promotions);

    // Promotions do not count against the free-shipping threshold.
    let shipping_subtotal = round_money(items_subtotal - coupon_discount_amount);
    let shipping = inputs.shipping.quote(shipping_subtotal, request.city());

    let tax_amount = Decimal::ZERO;
    let total_amount = round_money(items_subtotal - discount_amount + shipping.fee + tax_amount);

    Ok(Quote {
        lines,
        items_subtotal,
        coupon,
        coupon_discount_amount,
        promotion,
        promotion_discount_amount,
        discount_amount,
        shipping_amount: shipping.fee,
        delivery_eta: shipping.delivery_eta.clone(),
        shipping: Some(shipping),
        tax_amount,
        total_amount,
    })
}
