//! Discount terms columns shared by coupons, promotions and deals.

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{Row, postgres::PgRow};
use tally::{
    discounts::{DiscountKind, DiscountScope, DiscountTerms},
    ids::{CategoryUuid, ProductUuid},
};
use uuid::Uuid;

/// Decode a stored discount kind.
pub(crate) fn discount_kind(name: String) -> Result<DiscountKind, sqlx::Error> {
    DiscountKind::from_name(&name)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown discount kind: {name}").into()))
}

/// Decode a stored scope from its `applies_to` name and id list.
pub(crate) fn discount_scope(
    applies_to: &str,
    uuids: Vec<Uuid>,
) -> Result<DiscountScope, sqlx::Error> {
    match applies_to {
        "all" => Ok(DiscountScope::All),
        "categories" => Ok(DiscountScope::Categories(
            uuids.into_iter().map(CategoryUuid::from_uuid).collect(),
        )),
        "products" => Ok(DiscountScope::Products(
            uuids.into_iter().map(ProductUuid::from_uuid).collect(),
        )),
        other => Err(sqlx::Error::Decode(
            format!("unknown discount scope: {other}").into(),
        )),
    }
}

/// Read the shared terms columns from a coupon or promotion row.
pub(crate) fn discount_terms(row: &PgRow) -> sqlx::Result<DiscountTerms> {
    let applies_to: String = row.try_get("applies_to")?;

    Ok(DiscountTerms {
        kind: discount_kind(row.try_get("kind")?)?,
        value: row.try_get::<Decimal, _>("value")?,
        min_order_amount: row.try_get("min_order_amount")?,
        max_discount_amount: row.try_get("max_discount_amount")?,
        starts_at: row
            .try_get::<Option<SqlxTimestamp>, _>("starts_at")?
            .map(SqlxTimestamp::to_jiff),
        expires_at: row
            .try_get::<Option<SqlxTimestamp>, _>("expires_at")?
            .map(SqlxTimestamp::to_jiff),
        scope: discount_scope(&applies_to, row.try_get("scope_uuids")?)?,
        is_active: row.try_get("is_active")?,
    })
}
