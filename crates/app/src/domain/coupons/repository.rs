//! Coupons Repository

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, query_as, query_scalar};
use tally::{customers::Payer, discounts::Coupon, ids::CouponUuid};

use crate::{
    database::{Db, StoreError},
    domain::coupons::records::CouponRecord,
};

const FIND_COUPON_BY_CODE_SQL: &str = include_str!("sql/find_coupon_by_code.sql");
const COUNT_CUSTOMER_REDEMPTIONS_SQL: &str = include_str!("sql/count_customer_redemptions.sql");
const COUNT_GUEST_REDEMPTIONS_SQL: &str = include_str!("sql/count_guest_redemptions.sql");
const INCREMENT_COUPON_USAGE_SQL: &str = include_str!("sql/increment_coupon_usage.sql");

#[derive(Debug, Clone)]
pub struct PgCouponsRepository {
    db: Db,
}

impl PgCouponsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CouponsRepository for PgCouponsRepository {
    async fn find_by_code(&self, code: String) -> Result<Option<Coupon>, StoreError> {
        let coupon = query_as::<Postgres, CouponRecord>(FIND_COUPON_BY_CODE_SQL)
            .bind(code)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(coupon.map(|CouponRecord(coupon)| coupon))
    }

    async fn count_redemptions(&self, coupon: CouponUuid, payer: Payer) -> Result<u32, StoreError> {
        let count: i64 = match payer {
            Payer::Customer(customer) => {
                query_scalar(COUNT_CUSTOMER_REDEMPTIONS_SQL)
                    .bind(coupon.into_uuid())
                    .bind(customer.into_uuid())
                    .fetch_one(self.db.pool())
                    .await?
            }
            Payer::Guest(email) => {
                query_scalar(COUNT_GUEST_REDEMPTIONS_SQL)
                    .bind(coupon.into_uuid())
                    .bind(email.as_str())
                    .fetch_one(self.db.pool())
                    .await?
            }
        };

        u32::try_from(count).map_err(|e| {
            StoreError::Sql(sqlx::Error::ColumnDecode {
                index: "count".to_string(),
                source: Box::new(e),
            })
        })
    }

    async fn increment_usage(&self, coupon: CouponUuid) -> Result<bool, StoreError> {
        let (found, claimed): (bool, bool) = query_as(INCREMENT_COUPON_USAGE_SQL)
            .bind(coupon.into_uuid())
            .fetch_one(self.db.pool())
            .await?;

        if !found {
            return Err(StoreError::NotFound);
        }

        Ok(claimed)
    }
}

#[automock]
#[async_trait]
pub trait CouponsRepository: Send + Sync {
    /// Find a coupon by code, ignoring case and surrounding whitespace.
    async fn find_by_code(&self, code: String) -> Result<Option<Coupon>, StoreError>;

    /// Orders this payer has already placed with the coupon.
    async fn count_redemptions(&self, coupon: CouponUuid, payer: Payer) -> Result<u32, StoreError>;

    /// Record one more redemption unless the global usage limit is already
    /// used up. Returns whether the redemption was counted.
    async fn increment_usage(&self, coupon: CouponUuid) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use sqlx::query;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn lookup_ignores_case_and_whitespace() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = ctx.insert_fixed_coupon("Spring25", 25.into()).await?;

        let found = ctx.coupons.find_by_code("  spring25 ".to_string()).await?;

        assert_eq!(found.map(|coupon| coupon.uuid), Some(uuid));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn increment_usage_bumps_counter() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = ctx.insert_fixed_coupon("ONCE", 5.into()).await?;

        assert!(ctx.coupons.increment_usage(uuid).await?, "first increment");
        assert!(ctx.coupons.increment_usage(uuid).await?, "second increment");

        let found = ctx.coupons.find_by_code("ONCE".to_string()).await?;

        assert_eq!(found.map(|coupon| coupon.used_count), Some(2));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn increment_stops_at_usage_limit() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = ctx.insert_fixed_coupon("TWICE", 5.into()).await?;

        query("UPDATE coupons SET usage_limit = 2, used_count = 1 WHERE uuid = $1")
            .bind(uuid.into_uuid())
            .execute(ctx.db.pool())
            .await?;

        assert!(ctx.coupons.increment_usage(uuid).await?, "last redemption");
        assert!(!ctx.coupons.increment_usage(uuid).await?, "over the limit");

        let found = ctx.coupons.find_by_code("TWICE".to_string()).await?;

        assert_eq!(found.map(|coupon| coupon.used_count), Some(2));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn increment_unknown_coupon_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.coupons.increment_usage(CouponUuid::new()).await;

        assert!(
            matches!(result, Err(StoreError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
