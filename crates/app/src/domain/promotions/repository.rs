//! Promotions Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{Postgres, query_as};
use tally::discounts::Promotion;

use crate::{
    database::{Db, StoreError},
    domain::promotions::records::PromotionRecord,
};

const LIST_ACTIVE_PROMOTIONS_SQL: &str = include_str!("sql/list_active_promotions.sql");

#[derive(Debug, Clone)]
pub struct PgPromotionsRepository {
    db: Db,
}

impl PgPromotionsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PromotionsRepository for PgPromotionsRepository {
    async fn list_active_promotions(&self, now: Timestamp) -> Result<Vec<Promotion>, StoreError> {
        let promotions = query_as::<Postgres, PromotionRecord>(LIST_ACTIVE_PROMOTIONS_SQL)
            .bind(SqlxTimestamp::from(now))
            .fetch_all(self.db.pool())
            .await?;

        Ok(promotions
            .into_iter()
            .map(|PromotionRecord(promotion)| promotion)
            .collect())
    }
}

#[automock]
#[async_trait]
pub trait PromotionsRepository: Send + Sync {
    /// Enabled promotions whose window contains `now`.
    async fn list_active_promotions(&self, now: Timestamp) -> Result<Vec<Promotion>, StoreError>;
}
