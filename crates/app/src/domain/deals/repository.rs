//! Deals Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{Postgres, query_as};
use tally::{deals::Deal, ids::ProductUuid};
use uuid::Uuid;

use crate::{
    database::{Db, StoreError},
    domain::deals::records::DealRecord,
};

const LIST_ACTIVE_DEALS_SQL: &str = include_str!("sql/list_active_deals.sql");

#[derive(Debug, Clone)]
pub struct PgDealsRepository {
    db: Db,
}

impl PgDealsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DealsRepository for PgDealsRepository {
    async fn list_active_deals(
        &self,
        products: Vec<ProductUuid>,
        now: Timestamp,
    ) -> Result<Vec<Deal>, StoreError> {
        let products: Vec<Uuid> = products.into_iter().map(ProductUuid::into_uuid).collect();

        let deals = query_as::<Postgres, DealRecord>(LIST_ACTIVE_DEALS_SQL)
            .bind(products)
            .bind(SqlxTimestamp::from(now))
            .fetch_all(self.db.pool())
            .await?;

        Ok(deals.into_iter().map(|DealRecord(deal)| deal).collect())
    }
}

#[automock]
#[async_trait]
pub trait DealsRepository: Send + Sync {
    /// Deals live at `now` that mention at least one of `products`.
    async fn list_active_deals(
        &self,
        products: Vec<ProductUuid>,
        now: Timestamp,
    ) -> Result<Vec<Deal>, StoreError>;
}
