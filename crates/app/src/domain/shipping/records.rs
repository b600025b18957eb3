//! Shipping Records

use rust_decimal::Decimal;
use sqlx::{FromRow, Row, postgres::PgRow};
use tally::shipping::{CityRule, DeliveryWindow};

use crate::database::i32_to_quantity;

/// The single `shipping_settings` row.
#[derive(Debug, Clone)]
pub(crate) struct SettingsRecord {
    pub default_fee: Decimal,
    pub free_above_subtotal: Option<Decimal>,
    pub default_eta: DeliveryWindow,
}

impl<'r> FromRow<'r, PgRow> for SettingsRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            default_fee: row.try_get("default_fee")?,
            free_above_subtotal: row.try_get("free_above_subtotal")?,
            default_eta: DeliveryWindow::new(
                i32_to_quantity(row.try_get("eta_min_days")?, "eta_min_days")?,
                i32_to_quantity(row.try_get("eta_max_days")?, "eta_max_days")?,
            ),
        })
    }
}

/// A `shipping_city_rules` row.
#[derive(Debug, Clone)]
pub(crate) struct CityRuleRecord(pub CityRule);

impl<'r> FromRow<'r, PgRow> for CityRuleRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let min: Option<i32> = row.try_get("eta_min_days")?;
        let max: Option<i32> = row.try_get("eta_max_days")?;

        // Either bound alone stands in for both.
        let eta = match (min.or(max), max.or(min)) {
            (Some(min), Some(max)) => Some(DeliveryWindow::new(
                i32_to_quantity(min, "eta_min_days")?,
                i32_to_quantity(max, "eta_max_days")?,
            )),
            _ => None,
        };

        Ok(Self(CityRule {
            city: row.try_get("city")?,
            fee: row.try_get("fee")?,
            free_above_subtotal: row.try_get("free_above_subtotal")?,
            eta,
        }))
    }
}
