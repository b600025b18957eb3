//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::{CheckoutConfig, ConfigError},
    database::{self, Db},
    domain::{
        Stores,
        checkout::{CheckoutService, StorefrontCheckoutService},
        quotes::{QuotesService, StorefrontQuotesService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("invalid checkout configuration")]
    Config(#[from] ConfigError),
}

#[derive(Clone)]
pub struct AppContext {
    pub quotes: Arc<dyn QuotesService>,
    pub checkout: Arc<dyn CheckoutService>,
}

impl AppContext {
    /// Wire the services over a set of stores.
    ///
    /// # Errors
    ///
    /// Returns an error when the checkout configuration is invalid.
    pub fn new(stores: Stores, checkout: &CheckoutConfig) -> Result<Self, AppInitError> {
        let policy = checkout.currency_policy()?;

        Ok(Self {
            quotes: Arc::new(StorefrontQuotesService::new(stores.clone())),
            checkout: Arc::new(StorefrontCheckoutService::new(stores, policy)),
        })
    }

    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails or the
    /// checkout configuration is invalid.
    pub async fn from_database_url(
        url: &str,
        checkout: &CheckoutConfig,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Self::new(Stores::postgres(&Db::new(pool)), checkout)
    }
}
