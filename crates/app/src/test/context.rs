//! Test context for repository integration tests.

use rust_decimal::Decimal;
use sqlx::{query, query_scalar};
use tally::ids::{CouponUuid, ProductUuid, VariantUuid};
use testresult::TestResult;
use uuid::Uuid;

use crate::{
    database::Db,
    domain::{
        catalog::PgCatalogRepository, coupons::PgCouponsRepository, orders::PgOrdersRepository,
        promotions::PgPromotionsRepository, shipping::PgShippingSettingsRepository,
    },
};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub catalog: PgCatalogRepository,
    pub coupons: PgCouponsRepository,
    pub orders: PgOrdersRepository,
    pub promotions: PgPromotionsRepository,
    pub shipping: PgShippingSettingsRepository,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            catalog: PgCatalogRepository::new(db.clone()),
            coupons: PgCouponsRepository::new(db.clone()),
            orders: PgOrdersRepository::new(db.clone()),
            promotions: PgPromotionsRepository::new(db.clone()),
            shipping: PgShippingSettingsRepository::new(db),
            db: test_db,
        }
    }

    pub async fn insert_product(&self, price: Decimal, stock: i32) -> TestResult<ProductUuid> {
        let uuid = Uuid::now_v7();

        query(
            "INSERT INTO products (uuid, title, slug, price, stock, is_active) \
             VALUES ($1, $2, $3, $4, $5, TRUE)",
        )
        .bind(uuid)
        .bind(format!("Product {uuid}"))
        .bind(uuid.to_string())
        .bind(price)
        .bind(stock)
        .execute(self.db.pool())
        .await?;

        Ok(ProductUuid::from_uuid(uuid))
    }

    pub async fn insert_variant(
        &self,
        product: ProductUuid,
        price: Decimal,
        stock: i32,
    ) -> TestResult<VariantUuid> {
        let uuid = Uuid::now_v7();

        query(
            "INSERT INTO product_variants (uuid, product_uuid, title, price, stock) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(uuid)
        .bind(product.into_uuid())
        .bind(format!("Variant {uuid}"))
        .bind(price)
        .bind(stock)
        .execute(self.db.pool())
        .await?;

        Ok(VariantUuid::from_uuid(uuid))
    }

    pub async fn insert_fixed_coupon(&self, code: &str, value: Decimal) -> TestResult<CouponUuid> {
        let uuid = Uuid::now_v7();

        query(
            "INSERT INTO coupons (uuid, code, kind, value) \
             VALUES ($1, $2, 'fixed', $3)",
        )
        .bind(uuid)
        .bind(code)
        .bind(value)
        .execute(self.db.pool())
        .await?;

        Ok(CouponUuid::from_uuid(uuid))
    }

    pub async fn count_orders(&self) -> TestResult<i64> {
        let count: i64 = query_scalar("SELECT count(*) FROM orders")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }
}
