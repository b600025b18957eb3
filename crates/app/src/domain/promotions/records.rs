//! Promotion Records

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Row, postgres::PgRow};
use tally::{discounts::Promotion, ids::PromotionUuid};

use crate::domain::terms::discount_terms;

/// A `promotions` row.
#[derive(Debug, Clone)]
pub(crate) struct PromotionRecord(pub Promotion);

impl<'r> FromRow<'r, PgRow> for PromotionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(Promotion {
            uuid: PromotionUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            terms: discount_terms(row)?,
            priority: row.try_get("priority")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        }))
    }
}
