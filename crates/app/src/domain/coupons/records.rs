//! Coupon Records

use sqlx::{FromRow, Row, postgres::PgRow};
use tally::{discounts::Coupon, ids::CouponUuid};

use crate::{database::i32_to_quantity, domain::terms::discount_terms};

/// A `coupons` row.
#[derive(Debug, Clone)]
pub(crate) struct CouponRecord(pub Coupon);

fn optional_limit(row: &PgRow, column: &str) -> sqlx::Result<Option<u32>> {
    row.try_get::<Option<i32>, _>(column)?
        .map(|limit| i32_to_quantity(limit, column))
        .transpose()
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(Coupon {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            terms: discount_terms(row)?,
            usage_limit: optional_limit(row, "usage_limit")?,
            used_count: i32_to_quantity(row.try_get("used_count")?, "used_count")?,
            usage_limit_per_customer: optional_limit(row, "usage_limit_per_customer")?,
        }))
    }
}
