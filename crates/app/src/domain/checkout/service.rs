//! Checkout service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally::{
    cart::{CartError, CartLine, validate_lines},
    customers::{Email, Payer},
    ids::{CustomerUuid, OrderUuid},
    orders::{
        CurrencyPolicy, CurrencySnapshot, NewOrder, OrderDetails, PaymentMethod, ShippingAddress,
    },
    quote::{QuoteRequest, build_quote},
};
use tracing::{Span, error, info, warn};

use crate::domain::{
    Stores,
    checkout::{
        errors::CheckoutError,
        saga::{ReservationSaga, SagaFailure},
    },
    quotes::loader::load_inputs,
};

/// Everything needed to place an order. Prices are never taken from the
/// caller; they are recomputed from the lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    pub lines: Vec<CartLine>,

    pub address: ShippingAddress,

    pub payment_method: PaymentMethod,

    /// Currency to pay in; the base currency when absent.
    #[serde(default)]
    pub currency: Option<String>,

    /// Required when paying in the secondary currency.
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,

    #[serde(default)]
    pub guest_email: Option<String>,

    #[serde(default)]
    pub coupon_code: Option<String>,
}

impl CommitRequest {
    fn quote_request(&self) -> QuoteRequest {
        QuoteRequest {
            lines: self.lines.clone(),
            coupon_code: self.coupon_code.clone(),
            guest_email: self.guest_email.clone(),
            address: Some(self.address.partial()),
        }
    }

    fn validate(&self, customer: Option<CustomerUuid>) -> Result<(), CheckoutError> {
        validate_lines(&self.lines)?;

        if self.lines.is_empty() {
            return Err(CartError::EmptyCart.into());
        }

        self.address.validate()?;

        // A guest email that is present must be usable.
        if customer.is_none()
            && let Some(email) = &self.guest_email
        {
            Email::parse(email)?;
        }

        Ok(())
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitReceipt {
    pub order: OrderUuid,
    pub total_amount: Decimal,
    pub currency: CurrencySnapshot,
}

#[derive(Clone)]
pub struct StorefrontCheckoutService {
    stores: Stores,
    policy: CurrencyPolicy,
}

impl StorefrontCheckoutService {
    #[must_use]
    pub fn new(stores: Stores, policy: CurrencyPolicy) -> Self {
        Self { stores, policy }
    }
}

#[async_trait]
impl CheckoutService for StorefrontCheckoutService {
    #[tracing::instrument(
        name = "checkout.service.commit",
        skip(self, request),
        fields(
            line_count = request.lines.len(),
            payment_method = %request.payment_method,
            order_uuid = tracing::field::Empty,
            total_amount = tracing::field::Empty
        ),
        err
    )]
    async fn commit(
        &self,
        customer: Option<CustomerUuid>,
        request: CommitRequest,
    ) -> Result<CommitReceipt, CheckoutError> {
        request.validate(customer)?;

        let payer = Payer::identify(customer, request.guest_email.as_deref())
            .ok_or(CheckoutError::PayerRequired)?;

        let currency = self.policy.settle(
            request.payment_method,
            request.currency.as_deref(),
            request.exchange_rate,
        )?;

        let now = Timestamp::now();
        let quote_request = request.quote_request();

        let inputs = load_inputs(&self.stores, &quote_request, Some(payer.clone()), now)
            .await
            .map_err(CheckoutError::Storage)?;

        let quote = build_quote(&quote_request, &inputs)?;

        if let Some((line, unavailable)) = quote.unavailable_lines().next() {
            return Err(CheckoutError::UnavailableLine {
                line,
                reason: unavailable.message.clone().unwrap_or_default(),
            });
        }

        let mut saga = ReservationSaga::new(
            self.stores.catalog.clone(),
            quote.lines.iter().map(|line| line.cart_line()).collect(),
        );

        saga.reserve_all().await?;

        let order = NewOrder::from_quote(
            &quote,
            OrderDetails {
                payer,
                address: request.address,
                payment_method: request.payment_method,
                currency: currency.clone(),
            },
            now,
        );

        let coupon = order.coupon.as_ref().map(|coupon| coupon.uuid);

        let order_uuid = match self.stores.orders.create_order(order).await {
            Ok(uuid) => uuid,
            Err(source) => {
                let report = saga.compensate(SagaFailure::Aborted).await;

                error!(
                    error = %source,
                    released = report.released,
                    unreleased = report.unreleased,
                    "failed to persist order"
                );

                return Err(CheckoutError::Persistence(source));
            }
        };

        if let Some(coupon) = coupon {
            match self.stores.coupons.increment_usage(coupon).await {
                Ok(true) => {}
                Ok(false) => warn!(
                    coupon_uuid = %coupon,
                    order_uuid = %order_uuid,
                    "coupon usage limit reached before redemption was recorded"
                ),
                Err(error) => warn!(
                    coupon_uuid = %coupon,
                    order_uuid = %order_uuid,
                    error = %error,
                    "failed to record coupon redemption"
                ),
            }
        }

        let span = Span::current();

        span.record("order_uuid", tracing::field::display(order_uuid));
        span.record("total_amount", tracing::field::display(quote.total_amount));

        info!(
            order_uuid = %order_uuid,
            total_amount = %quote.total_amount,
            currency = %currency.code,
            "order placed"
        );

        Ok(CommitReceipt {
            order: order_uuid,
            total_amount: quote.total_amount,
            currency,
        })
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Price the cart again from scratch, reserve its stock and place the
    /// order.
    ///
    /// Any failure leaves stock as it was before the call.
    async fn commit(
        &self,
        customer: Option<CustomerUuid>,
        request: CommitRequest,
    ) -> Result<CommitReceipt, CheckoutError>;
}
