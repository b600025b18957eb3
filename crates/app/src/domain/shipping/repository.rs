//! Shipping Settings Repository

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, query_as};
use tally::shipping::ShippingSettings;

use crate::{
    database::{Db, StoreError},
    domain::shipping::records::{CityRuleRecord, SettingsRecord},
};

const GET_SHIPPING_SETTINGS_SQL: &str = include_str!("sql/get_shipping_settings.sql");
const LIST_CITY_RULES_SQL: &str = include_str!("sql/list_city_rules.sql");

#[derive(Debug, Clone)]
pub struct PgShippingSettingsRepository {
    db: Db,
}

impl PgShippingSettingsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ShippingSettingsRepository for PgShippingSettingsRepository {
    async fn get_settings(&self) -> Result<ShippingSettings, StoreError> {
        let settings = query_as::<Postgres, SettingsRecord>(GET_SHIPPING_SETTINGS_SQL)
            .fetch_optional(self.db.pool())
            .await?;

        let city_rules = query_as::<Postgres, CityRuleRecord>(LIST_CITY_RULES_SQL)
            .fetch_all(self.db.pool())
            .await?
            .into_iter()
            .map(|CityRuleRecord(rule)| rule)
            .collect();

        let Some(settings) = settings else {
            return Ok(ShippingSettings {
                city_rules,
                ..ShippingSettings::default()
            });
        };

        Ok(ShippingSettings {
            default_fee: settings.default_fee,
            free_above_subtotal: settings.free_above_subtotal,
            default_eta: settings.default_eta,
            city_rules,
        })
    }
}

#[automock]
#[async_trait]
pub trait ShippingSettingsRepository: Send + Sync {
    /// Current shipping configuration. An unconfigured store ships for free
    /// with no estimate.
    async fn get_settings(&self) -> Result<ShippingSettings, StoreError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sqlx::query;
    use tally::shipping::DeliveryWindow;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn unconfigured_store_ships_free_without_estimate() -> TestResult {
        let ctx = TestContext::new().await;

        let settings = ctx.shipping.get_settings().await?;

        assert_eq!(settings, ShippingSettings::default());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon"]
    async fn settings_and_rules_are_loaded_in_order() -> TestResult {
        let ctx = TestContext::new().await;

        query(
            "INSERT INTO shipping_settings (default_fee, free_above_subtotal, eta_min_days, eta_max_days) \
             VALUES (150, 1000, 3, 5)",
        )
        .execute(ctx.db.pool())
        .await?;

        query(
            "INSERT INTO shipping_city_rules (uuid, position, city, fee, eta_max_days) \
             VALUES (gen_random_uuid(), 2, 'Reno', 20, NULL), \
                    (gen_random_uuid(), 1, 'Austin', NULL, 2)",
        )
        .execute(ctx.db.pool())
        .await?;

        let settings = ctx.shipping.get_settings().await?;

        let cities: Vec<&str> = settings.city_rules.iter().map(|r| r.city.as_str()).collect();

        assert_eq!(settings.default_fee, Decimal::from(150));
        assert_eq!(settings.free_above_subtotal, Some(Decimal::from(1000)));
        assert_eq!(settings.default_eta, DeliveryWindow::new(3, 5));
        assert_eq!(cities, ["Austin", "Reno"]);
        assert_eq!(
            settings.city_rules.first().and_then(|r| r.eta),
            Some(DeliveryWindow::new(2, 2))
        );

        Ok(())
    }
}
