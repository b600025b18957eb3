//! Tally prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartError, CartLine, MAX_CART_LINES, MAX_LINE_QUANTITY, validate_lines},
    catalog::{
        CatalogProduct, CatalogVariant, PRODUCT_NOT_FOUND, ResolvedLine, VARIANT_NOT_FOUND,
        VariantAttribute, VariantAttributes, resolve_line,
    },
    customers::{Email, EmailError, Payer},
    deals::{BestDeals, Deal, DealDescriptor},
    discounts::{
        AppliedPromotion, Coupon, CouponLookup, CouponRejection, CouponStatus, DiscountContext,
        DiscountKind, DiscountOutcome, DiscountScope, DiscountTerms, EligibleLine, Promotion,
        WindowStatus,
    },
    ids::{
        CategoryUuid, CouponUuid, CustomerUuid, DealUuid, OrderUuid, ProductUuid, PromotionUuid,
        TypedUuid, VariantUuid,
    },
    money::{round_money, sum_rounded},
    orders::{
        AddressError, CurrencyPolicy, CurrencySnapshot, NewOrder, OrderDetails, OrderLine,
        OrderStatus, PartialAddress, PaymentConfigurationError, PaymentMethod, PaymentStatus,
        ShippingAddress,
    },
    quote::{Quote, QuoteInputs, QuoteLine, QuoteRequest, build_quote},
    shipping::{CityRule, DeliveryWindow, ShippingQuote, ShippingSettings},
};
