//! Loads everything a quote needs from the stores.
//!
//! Quotes and checkout share this so a commit prices the cart exactly the way
//! the preview did.

use std::collections::HashMap;

use jiff::Timestamp;
use tally::{
    customers::Payer,
    discounts::{Coupon, coupons::normalize_code},
    quote::{QuoteInputs, QuoteRequest},
};

use crate::{database::StoreError, domain::Stores};

/// Fetch catalog records, candidate discounts and shipping settings for a
/// request.
///
/// # Errors
///
/// Returns the first [`StoreError`] any store raises.
pub async fn load_inputs(
    stores: &Stores,
    request: &QuoteRequest,
    payer: Option<Payer>,
    now: Timestamp,
) -> Result<QuoteInputs, StoreError> {
    let product_ids = request.product_ids();

    let mut products = HashMap::with_capacity(product_ids.len());

    for uuid in &product_ids {
        if let Some(product) = stores.catalog.get_product(*uuid).await? {
            products.insert(*uuid, product);
        }
    }

    let (deals, promotions, shipping) = tokio::try_join!(
        stores
            .deals
            .list_active_deals(product_ids.into_iter().collect(), now),
        stores.promotions.list_active_promotions(now),
        stores.shipping.get_settings(),
    )?;

    let coupon = find_coupon(stores, request.coupon_code.as_deref()).await?;

    let coupon_redemptions = match (&coupon, &payer) {
        (Some(coupon), Some(payer)) if coupon.usage_limit_per_customer.is_some() => {
            stores
                .coupons
                .count_redemptions(coupon.uuid, payer.clone())
                .await?
        }
        _ => 0,
    };

    Ok(QuoteInputs {
        products,
        deals,
        coupon,
        coupon_redemptions,
        promotions,
        shipping,
        payer,
        now,
    })
}

async fn find_coupon(stores: &Stores, code: Option<&str>) -> Result<Option<Coupon>, StoreError> {
    let Some(code) = code.map(normalize_code).filter(|code| !code.is_empty()) else {
        return Ok(None);
    };

    stores.coupons.find_by_code(code).await
}
