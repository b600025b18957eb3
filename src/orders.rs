//! Orders
//!
//! The frozen order snapshot written at checkout, plus the payment and
//! currency rules checked before any stock is touched.

use std::{collections::BTreeSet, fmt, str::FromStr};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::VariantAttributes,
    customers::Payer,
    deals::DealDescriptor,
    ids::{CouponUuid, OrderUuid, ProductUuid, PromotionUuid, VariantUuid},
    quote::Quote,
};

/// How the customer will pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid to the courier on delivery.
    CashOnDelivery,

    /// Paid by card after the order is placed.
    Card,

    /// Paid by bank transfer after the order is placed.
    BankTransfer,
}

impl PaymentMethod {
    /// Stable storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cash_on_delivery",
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
        }
    }

    /// Payment status a new order starts with.
    #[must_use]
    pub const fn initial_status(self) -> PaymentStatus {
        match self {
            Self::CashOnDelivery => PaymentStatus::CashOnDelivery,
            Self::Card => PaymentStatus::Pending,
            Self::BankTransfer => PaymentStatus::AwaitingTransfer,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognised payment method name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "cash_on_delivery" | "cod" => Ok(Self::CashOnDelivery),
            "card" => Ok(Self::Card),
            "bank_transfer" => Ok(Self::BankTransfer),
            _ => Err(UnknownPaymentMethod(s.to_string())),
        }
    }
}

/// Where payment stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting an online payment.
    Pending,

    /// Collected by the courier.
    CashOnDelivery,

    /// Awaiting a bank transfer.
    AwaitingTransfer,
}

impl PaymentStatus {
    /// Stable storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::CashOnDelivery => "cash_on_delivery",
            Self::AwaitingTransfer => "awaiting_transfer",
        }
    }
}

/// Order lifecycle status. Orders are only ever created here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Newly placed.
    #[default]
    Pending,
}

impl OrderStatus {
    /// Stable storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
        }
    }
}

/// Why a payment/currency combination was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentConfigurationError {
    /// The store does not accept this method.
    #[error("payment method {0} is not enabled")]
    MethodDisabled(PaymentMethod),

    /// The currency is neither the base nor the secondary currency.
    #[error("currency {0} is not supported")]
    UnsupportedCurrency(String),

    /// Cash on delivery only settles in the base currency.
    #[error("cash on delivery is not available when paying in {0}")]
    CashOnDeliveryNotAllowed(String),

    /// A secondary-currency order needs a rate.
    #[error("an exchange rate is required when paying in {0}")]
    MissingExchangeRate(String),

    /// The rate was zero or negative.
    #[error("exchange rate must be positive, got {0}")]
    InvalidExchangeRate(Decimal),
}

/// Currency and rate frozen onto an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySnapshot {
    /// ISO 4217 code.
    pub code: String,

    /// Units of `code` per unit of the base currency.
    pub exchange_rate: Decimal,
}

/// Which currencies and payment methods checkout accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyPolicy {
    /// Currency all amounts are computed in.
    pub base: String,

    /// Optional settlement currency.
    pub secondary: Option<String>,

    /// Accepted methods.
    pub enabled_methods: BTreeSet<PaymentMethod>,

    /// Whether cash on delivery may settle in the secondary currency.
    pub allow_cod_in_secondary: bool,
}

/// Normalise a currency code and check it is a known ISO 4217 currency.
///
/// # Errors
///
/// Returns [`PaymentConfigurationError::UnsupportedCurrency`] for unknown
/// codes.
pub fn iso_currency(code: &str) -> Result<String, PaymentConfigurationError> {
    let code = code.trim().to_uppercase();

    if rusty_money::iso::find(&code).is_none() {
        return Err(PaymentConfigurationError::UnsupportedCurrency(code));
    }

    Ok(code)
}

impl CurrencyPolicy {
    /// Build a policy from configured codes, rejecting unknown currencies.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentConfigurationError::UnsupportedCurrency`] when either
    /// code is not an ISO 4217 currency.
    pub fn new(
        base: &str,
        secondary: Option<&str>,
        enabled_methods: BTreeSet<PaymentMethod>,
        allow_cod_in_secondary: bool,
    ) -> Result<Self, PaymentConfigurationError> {
        Ok(Self {
            base: iso_currency(base)?,
            secondary: secondary.map(iso_currency).transpose()?,
            enabled_methods,
            allow_cod_in_secondary,
        })
    }

    /// A policy that only accepts the base currency, with every method.
    #[must_use]
    pub fn base_only(base: &str) -> Self {
        Self {
            base: base.to_uppercase(),
            secondary: None,
            enabled_methods: [
                PaymentMethod::CashOnDelivery,
                PaymentMethod::Card,
                PaymentMethod::BankTransfer,
            ]
            .into_iter()
            .collect(),
            allow_cod_in_secondary: false,
        }
    }

    /// Decide the currency snapshot for an order.
    ///
    /// No currency means the base currency.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentConfigurationError`] when the method, currency or
    /// rate is not acceptable.
    pub fn settle(
        &self,
        method: PaymentMethod,
        currency: Option<&str>,
        exchange_rate: Option<Decimal>,
    ) -> Result<CurrencySnapshot, PaymentConfigurationError> {
        if !self.enabled_methods.contains(&method) {
            return Err(PaymentConfigurationError::MethodDisabled(method));
        }

        let code = currency
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| self.base.clone());

        if code == self.base {
            return Ok(CurrencySnapshot {
                code,
                exchange_rate: Decimal::ONE,
            });
        }

        if self.secondary.as_deref() != Some(code.as_str()) {
            return Err(PaymentConfigurationError::UnsupportedCurrency(code));
        }

        if method == PaymentMethod::CashOnDelivery && !self.allow_cod_in_secondary {
            return Err(PaymentConfigurationError::CashOnDeliveryNotAllowed(code));
        }

        match exchange_rate {
            None => Err(PaymentConfigurationError::MissingExchangeRate(code)),
            Some(rate) if rate <= Decimal::ZERO => {
                Err(PaymentConfigurationError::InvalidExchangeRate(rate))
            }
            Some(exchange_rate) => Ok(CurrencySnapshot {
                code,
                exchange_rate,
            }),
        }
    }
}

/// The destination as far as a quote needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialAddress {
    /// City, matched against shipping rules.
    #[serde(default)]
    pub city: Option<String>,

    /// State or region.
    #[serde(default)]
    pub state: Option<String>,

    /// Country.
    #[serde(default)]
    pub country: Option<String>,
}

/// A required address field was blank.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("shipping address is missing {0}")]
pub struct AddressError(pub &'static str);

/// A full delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Recipient.
    pub name: String,

    /// Contact phone.
    pub phone: String,

    /// Street line.
    pub line1: String,

    /// Apartment, suite.
    #[serde(default)]
    pub line2: Option<String>,

    /// City.
    pub city: String,

    /// State or region.
    #[serde(default)]
    pub state: Option<String>,

    /// Postal code.
    #[serde(default)]
    pub postal_code: Option<String>,

    /// Country.
    pub country: String,
}

impl ShippingAddress {
    /// Check required fields are present.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressError`] naming the first blank required field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let required = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("line1", &self.line1),
            ("city", &self.city),
            ("country", &self.country),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(AddressError(*field)),
            None => Ok(()),
        }
    }

    /// The parts a quote uses.
    #[must_use]
    pub fn partial(&self) -> PartialAddress {
        PartialAddress {
            city: Some(self.city.clone()),
            state: self.state.clone(),
            country: Some(self.country.clone()),
        }
    }
}

/// A line frozen at commit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product ordered.
    pub product: ProductUuid,

    /// Variant ordered.
    pub variant: Option<VariantUuid>,

    /// Product title at commit.
    pub title: String,

    /// Product slug at commit.
    pub slug: String,

    /// Image at commit.
    pub image: Option<String>,

    /// Variant title at commit.
    pub variant_title: Option<String>,

    /// Variant sku at commit.
    pub sku: Option<String>,

    /// Variant options at commit.
    pub attributes: VariantAttributes,

    /// Unit price charged.
    pub unit_price: Decimal,

    /// Catalog price when a deal applied.
    pub original_unit_price: Option<Decimal>,

    /// Units ordered.
    pub quantity: u32,

    /// Rounded line total.
    pub line_total: Decimal,

    /// Deal that priced the line.
    pub deal: Option<DealDescriptor>,
}

/// Coupon reference kept on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCoupon {
    /// Coupon id.
    pub uuid: CouponUuid,

    /// Code as entered.
    pub code: String,
}

/// Promotion reference kept on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPromotion {
    /// Promotion id.
    pub uuid: PromotionUuid,

    /// Title at commit.
    pub title: String,
}

/// Checkout details that are not part of the quote.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    /// Who pays.
    pub payer: Payer,

    /// Where to deliver.
    pub address: ShippingAddress,

    /// How they pay.
    pub payment_method: PaymentMethod,

    /// Currency snapshot from [`CurrencyPolicy::settle`].
    pub currency: CurrencySnapshot,
}

/// An order ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Order id.
    pub uuid: OrderUuid,

    /// Who pays.
    pub payer: Payer,

    /// Frozen lines.
    pub lines: Vec<OrderLine>,

    /// Delivery address.
    pub address: ShippingAddress,

    /// Payment method.
    pub payment_method: PaymentMethod,

    /// Initial payment status.
    pub payment_status: PaymentStatus,

    /// Initial order status.
    pub order_status: OrderStatus,

    /// Always false on creation.
    pub is_paid: bool,

    /// Settlement currency.
    pub currency: CurrencySnapshot,

    /// Applied coupon.
    pub coupon: Option<OrderCoupon>,

    /// Applied promotion.
    pub promotion: Option<OrderPromotion>,

    /// Sum of line totals.
    pub items_subtotal: Decimal,

    /// Coupon amount.
    pub coupon_discount_amount: Decimal,

    /// Promotion amount.
    pub promotion_discount_amount: Decimal,

    /// Coupon plus promotion.
    pub discount_amount: Decimal,

    /// Shipping charged.
    pub shipping_amount: Decimal,

    /// Tax charged.
    pub tax_amount: Decimal,

    /// Grand total in the base currency.
    pub total_amount: Decimal,

    /// Delivery estimate label.
    pub delivery_eta: String,

    /// Creation instant.
    pub created_at: Timestamp,
}

impl NewOrder {
    /// Freeze a server-computed quote into an order.
    #[must_use]
    pub fn from_quote(quote: &Quote, details: OrderDetails, now: Timestamp) -> Self {
        let lines = quote
            .lines
            .iter()
            .map(|line| OrderLine {
                product: line.product,
                variant: line.variant,
                title: line.title.clone(),
                slug: line.slug.clone(),
                image: line.image.clone(),
                variant_title: line.variant_title.clone(),
                sku: line.sku.clone(),
                attributes: line.attributes.clone(),
                unit_price: line.unit_price,
                original_unit_price: line.original_unit_price,
                quantity: line.quantity,
                line_total: line.line_total,
                deal: line.deal.clone(),
            })
            .collect();

        let coupon = quote.coupon.as_ref().filter(|status| status.ok).and_then(|status| {
            status.uuid.map(|uuid| OrderCoupon {
                uuid,
                code: status.code.clone(),
            })
        });

        let promotion = quote.promotion.as_ref().map(|applied| OrderPromotion {
            uuid: applied.uuid,
            title: applied.title.clone(),
        });

        Self {
            uuid: OrderUuid::new(),
            payer: details.payer,
            lines,
            address: details.address,
            payment_method: details.payment_method,
            payment_status: details.payment_method.initial_status(),
            order_status: OrderStatus::Pending,
            is_paid: false,
            currency: details.currency,
            coupon,
            promotion,
            items_subtotal: quote.items_subtotal,
            coupon_discount_amount: quote.coupon_discount_amount,
            promotion_discount_amount: quote.promotion_discount_amount,
            discount_amount: quote.discount_amount,
            shipping_amount: quote.shipping_amount,
            tax_amount: quote.tax_amount,
            total_amount: quote.total_amount,
            delivery_eta: quote.delivery_eta.clone(),
            created_at: now,
        }
    }
}
