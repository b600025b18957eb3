//! Checkout Config

use clap::Args;
use tally::orders::{CurrencyPolicy, PaymentConfigurationError, PaymentMethod};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid checkout currency")]
    Currency(#[from] PaymentConfigurationError),

    #[error("at least one payment method must be enabled")]
    NoPaymentMethods,
}

/// Currencies and payment methods checkout accepts.
#[derive(Debug, Args)]
pub struct CheckoutConfig {
    /// Currency catalog prices are stored in
    #[arg(long, env = "BASE_CURRENCY", default_value = "USD")]
    pub base_currency: String,

    /// Optional second currency customers may pay in
    #[arg(long, env = "SECONDARY_CURRENCY")]
    pub secondary_currency: Option<String>,

    /// Enabled payment methods (cash_on_delivery, card, bank_transfer)
    #[arg(
        long,
        env = "PAYMENT_METHODS",
        value_delimiter = ',',
        default_value = "cash_on_delivery,card,bank_transfer"
    )]
    pub payment_methods: Vec<PaymentMethod>,

    /// Allow cash on delivery when paying in the secondary currency
    #[arg(long, env = "ALLOW_COD_IN_SECONDARY", default_value_t = false)]
    pub allow_cod_in_secondary: bool,
}

impl CheckoutConfig {
    /// Build the policy checkout enforces.
    ///
    /// # Errors
    ///
    /// Returns an error when a currency is not ISO 4217 or no payment method
    /// is enabled.
    pub fn currency_policy(&self) -> Result<CurrencyPolicy, ConfigError> {
        if self.payment_methods.is_empty() {
            return Err(ConfigError::NoPaymentMethods);
        }

        let policy = CurrencyPolicy::new(
            &self.base_currency,
            self.secondary_currency.as_deref(),
            self.payment_methods.iter().copied().collect(),
            self.allow_cod_in_secondary,
        )?;

        Ok(policy)
    }
}
