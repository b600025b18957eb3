//! Quotes service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tally::{
    customers::Payer,
    ids::CustomerUuid,
    quote::{Quote, QuoteRequest, build_quote},
};
use tracing::{Span, debug};

use crate::domain::{
    Stores,
    quotes::{errors::QuoteError, loader::load_inputs},
};

#[derive(Clone)]
pub struct StorefrontQuotesService {
    stores: Stores,
}

impl StorefrontQuotesService {
    #[must_use]
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }
}

#[async_trait]
impl QuotesService for StorefrontQuotesService {
    #[tracing::instrument(
        name = "quotes.service.quote",
        skip(self, request),
        fields(
            line_count = request.lines.len(),
            has_coupon = request.coupon_code.is_some(),
            items_subtotal = tracing::field::Empty,
            total_amount = tracing::field::Empty
        ),
        err
    )]
    async fn quote(
        &self,
        customer: Option<CustomerUuid>,
        request: QuoteRequest,
    ) -> Result<Quote, QuoteError> {
        tally::cart::validate_lines(&request.lines)?;

        let payer = Payer::identify(customer, request.guest_email.as_deref());
        let inputs = load_inputs(&self.stores, &request, payer, Timestamp::now()).await?;

        let quote = build_quote(&request, &inputs)?;

        let span = Span::current();

        span.record("items_subtotal", tracing::field::display(quote.items_subtotal));
        span.record("total_amount", tracing::field::display(quote.total_amount));

        debug!(
            unavailable = quote.unavailable_lines().count(),
            coupon_discount = %quote.coupon_discount_amount,
            promotion_discount = %quote.promotion_discount_amount,
            shipping = %quote.shipping_amount,
            "quote built"
        );

        Ok(quote)
    }
}

#[automock]
#[async_trait]
pub trait QuotesService: Send + Sync {
    /// Price a cart without changing anything.
    ///
    /// `customer` is the authenticated customer, when there is one; otherwise
    /// the request's guest email identifies the payer.
    async fn quote(
        &self,
        customer: Option<CustomerUuid>,
        request: QuoteRequest,
    ) -> Result<Quote, QuoteError>;
}
