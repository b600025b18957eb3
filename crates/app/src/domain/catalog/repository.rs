//! Catalog Repository

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, query, query_as};
use tally::{
    catalog::CatalogProduct,
    ids::{ProductUuid, VariantUuid},
};

use crate::{
    database::{Db, StoreError, quantity_to_i32},
    domain::catalog::records::{ProductRecord, VariantRecord},
};

const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const LIST_VARIANTS_SQL: &str = include_str!("sql/list_variants.sql");
const RESERVE_PRODUCT_STOCK_SQL: &str = include_str!("sql/reserve_product_stock.sql");
const RESERVE_VARIANT_STOCK_SQL: &str = include_str!("sql/reserve_variant_stock.sql");
const RELEASE_PRODUCT_STOCK_SQL: &str = include_str!("sql/release_product_stock.sql");
const RELEASE_VARIANT_STOCK_SQL: &str = include_str!("sql/release_variant_stock.sql");

#[derive(Debug, Clone)]
pub struct PgCatalogRepository {
    db: Db,
}

impl PgCatalogRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn adjust_stock(
        &self,
        product: ProductUuid,
        variant: Option<VariantUuid>,
        quantity: u32,
        product_sql: &'static str,
        variant_sql: &'static str,
    ) -> Result<u64, sqlx::Error> {
        let quantity = quantity_to_i32(quantity, "quantity")?;

        let result = match variant {
            Some(variant) => {
                query(variant_sql)
                    .bind(product.into_uuid())
                    .bind(variant.into_uuid())
                    .bind(quantity)
                    .execute(self.db.pool())
                    .await?
            }
            None => {
                query(product_sql)
                    .bind(product.into_uuid())
                    .bind(quantity)
                    .execute(self.db.pool())
                    .await?
            }
        };

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn get_product(&self, product: ProductUuid) -> Result<Option<CatalogProduct>, StoreError> {
        let Some(record) = query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(self.db.pool())
            .await?
        else {
            return Ok(None);
        };

        let variants = query_as::<Postgres, VariantRecord>(LIST_VARIANTS_SQL)
            .bind(product.into_uuid())
            .fetch_all(self.db.pool())
            .await?;

        Ok(Some(record.with_variants(variants)))
    }

    async fn try_reserve_stock(
        &self,
        product: ProductUuid,
        variant: Option<VariantUuid>,
        quantity: u32,
    ) -> Result<bool, StoreError> {
        let rows_affected = self
            .adjust_stock(
                product,
                variant,
                quantity,
                RESERVE_PRODUCT_STOCK_SQL,
                RESERVE_VARIANT_STOCK_SQL,
            )
            .await?;

        Ok(rows_affected == 1)
    }

    async fn release_stock(
        &self,
        product: ProductUuid,
        variant: Option<VariantUuid>,
        quantity: u32,
    ) -> Result<(), StoreError> {
        let rows_affected = self
            .adjust_stock(
                product,
                variant,
                quantity,
                RELEASE_PRODUCT_STOCK_SQL,
                RELEASE_VARIANT_STOCK_SQL,
            )
            .await?;

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Look up a product with its variants. Missing products are `None`.
    async fn get_product(&self, product: ProductUuid) -> Result<Option<CatalogProduct>, StoreError>;

    /// Take `quantity` units only if at least that many are on hand.
    ///
    /// This is a single conditional update; `false` means nothing changed.
    async fn try_reserve_stock(
        &self,
        product: ProductUuid,
        variant: Option<VariantUuid>,
        quantity: u32,
    ) -> Result<bool, StoreError>;

    /// Put back units taken by [`CatalogRepository::try_reserve_stock`].
    async fn release_stock(
        &self,
        product: ProductUuid,
        variant: Option<VariantUuid>,
        quantity: u32,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn reserve_takes_stock_only_when_enough_is_on_hand() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.insert_product(10.into(), 3).await?;

        assert!(ctx.catalog.try_reserve_stock(product, None, 2).await?);
        assert!(!ctx.catalog.try_reserve_stock(product, None, 2).await?);

        let stored = ctx.catalog.get_product(product).await?;

        assert_eq!(stored.map(|p| p.stock), Some(1));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn variant_stock_is_reserved_and_released_independently() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.insert_product(10.into(), 50).await?;
        let variant = ctx.insert_variant(product, 12.into(), 2).await?;

        assert!(ctx.catalog.try_reserve_stock(product, Some(variant), 2).await?);
        assert!(!ctx.catalog.try_reserve_stock(product, Some(variant), 1).await?);

        ctx.catalog.release_stock(product, Some(variant), 2).await?;

        let stored = ctx.catalog.get_product(product).await?;
        let variant_stock = stored
            .as_ref()
            .and_then(|p| p.variant(variant))
            .map(|v| v.stock);

        assert_eq!(variant_stock, Some(2));
        assert_eq!(stored.map(|p| p.stock), Some(50));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn unknown_product_is_none() -> TestResult {
        let ctx = TestContext::new().await;

        assert_eq!(ctx.catalog.get_product(ProductUuid::new()).await?, None);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn releasing_unknown_product_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.catalog.release_stock(ProductUuid::new(), None, 1).await;

        assert!(
            matches!(result, Err(StoreError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
