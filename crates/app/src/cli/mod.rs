use clap::{Parser, Subcommand};
use tally_app::{config::LoggingConfig, observability};

mod checkout;
mod db;
mod quote;

#[derive(Debug, Parser)]
#[command(name = "tally-app", about = "Tally CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Quote(quote::QuoteArgs),
    Checkout(checkout::CheckoutArgs),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init_subscriber(&self.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        match self.command {
            Commands::Quote(args) => quote::run(args).await,
            Commands::Checkout(args) => checkout::run(args).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}
