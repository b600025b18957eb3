//! Deal Records

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{FromRow, Row, postgres::PgRow};
use tally::{
    deals::Deal,
    ids::{DealUuid, ProductUuid},
};
use uuid::Uuid;

use crate::domain::terms::discount_kind;

/// A `deals` row joined with its product ids.
#[derive(Debug, Clone)]
pub(crate) struct DealRecord(pub Deal);

impl<'r> FromRow<'r, PgRow> for DealRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let products: Vec<Uuid> = row.try_get("products")?;

        Ok(Self(Deal {
            uuid: DealUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            products: products.into_iter().map(ProductUuid::from_uuid).collect(),
            kind: discount_kind(row.try_get("kind")?)?,
            value: row.try_get::<Decimal, _>("value")?,
            priority: row.try_get("priority")?,
            starts_at: row.try_get::<SqlxTimestamp, _>("starts_at")?.to_jiff(),
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        }))
    }
}
